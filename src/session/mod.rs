//! The debugging session: turns source-level requests into JDWP commands and
//! VM events back into source positions.

use std::{
    collections::{HashMap, HashSet},
    fmt::{self, Debug},
    future::Future,
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use log::debug;
use tokio::sync::mpsc;

use crate::{
    codec,
    config::SessionConfig,
    error::{Error, Result},
    notify::{Notification, Notifier},
    source::{PositionLookup, SourceIndex, SourcePosition},
    spec::{
        event::{Composite, Event},
        event_request::{Modifier, Set},
        virtual_machine::Resume,
        EventKind, JdwpId, StepDepth, StepSize, SuspendPolicy, ThreadID,
    },
    transport::{send, Transport},
};

mod breakpoint;
mod events;
mod inspect;

pub use breakpoint::{BreakpointStatus, PendingBreakpoint};
pub use inspect::{DisplayValue, ValueKind, VariableValue};

/// The thread stepping and inspection target until the VM reports a real one.
const SEED_THREAD: u64 = 1;

/// Mutable state shared by all operations of a session.
#[derive(Debug)]
pub struct SessionState {
    current_thread: ThreadID,
    /// Keyed by class signature, at most one breakpoint per class waits for it
    /// to be prepared.
    pending: HashMap<String, PendingBreakpoint>,
    files: SourceIndex,
}

impl SessionState {
    fn new(files: SourceIndex) -> Self {
        Self {
            current_thread: ThreadID::from_raw(SEED_THREAD),
            pending: HashMap::new(),
            files,
        }
    }
}

/// A debugging session with one target VM.
///
/// Operations that wait on the VM are bounded by
/// [SessionConfig::operation_timeout]. A timeout does not undo anything the VM
/// was already asked to do, in particular a suspended VM stays suspended.
pub struct Session<T, P> {
    transport: T,
    positions: P,
    config: SessionConfig,
    state: SessionState,
    notifier: Notifier,
}

impl<T, P> Debug for Session<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<T: Transport, P: PositionLookup> Session<T, P> {
    /// Creates a session, indexing the source files under the configured
    /// roots.
    pub fn new(
        transport: T,
        positions: P,
        config: SessionConfig,
    ) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let files = SourceIndex::scan(&config.source_roots, &config.source_extension);
        Self::with_index(transport, positions, config, files)
    }

    /// Creates a session with an already built source index.
    pub fn with_index(
        transport: T,
        positions: P,
        config: SessionConfig,
        files: SourceIndex,
    ) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (notifier, notifications) = Notifier::channel();
        let session = Self {
            transport,
            positions,
            config,
            state: SessionState::new(files),
            notifier,
        };
        (session, notifications)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The thread that stepping and inspection act on.
    pub fn current_thread(&self) -> ThreadID {
        self.state.current_thread
    }

    /// Breakpoints waiting for their class to be prepared, keyed by class
    /// signature.
    pub fn pending_breakpoints(&self) -> &HashMap<String, PendingBreakpoint> {
        &self.state.pending
    }

    pub fn source_index(&self) -> &SourceIndex {
        &self.state.files
    }

    /// Waits for the VM to report that it has started.
    ///
    /// Event packets received before the VM start event are handled as usual.
    pub async fn start(&mut self, events: &mut mpsc::Receiver<Vec<u8>>) -> Result<()> {
        let limit = self.config.operation_timeout;
        with_timeout(limit, async {
            loop {
                let Some(packet) = events.recv().await else {
                    return Err(closed());
                };
                let composite = self.decode_packet(&packet)?;
                let started = composite
                    .events
                    .iter()
                    .any(|event| event.kind() == EventKind::VmStart);
                self.dispatch(composite).await?;
                if started {
                    return Ok(());
                }
            }
        })
        .await
    }

    /// Handles event packets until the VM dies or the event stream ends.
    ///
    /// Each packet is bounded by the operation timeout on its own, the wait
    /// between packets is not.
    pub async fn run(&mut self, events: &mut mpsc::Receiver<Vec<u8>>) -> Result<()> {
        while let Some(packet) = events.recv().await {
            let composite = self.decode_packet(&packet)?;
            let died = composite
                .events
                .iter()
                .any(|event| event.kind() == EventKind::VmDeath);

            let limit = self.config.operation_timeout;
            with_timeout(limit, self.dispatch(composite)).await?;
            if died {
                break;
            }
        }
        Ok(())
    }

    /// Continues the whole VM.
    pub async fn resume(&self) -> Result<()> {
        let limit = self.config.operation_timeout;
        with_timeout(limit, send(&self.transport, &Resume)).await
    }

    /// Steps to the next line, entering called methods.
    pub async fn step_in(&self) -> Result<()> {
        self.step(StepDepth::Into).await
    }

    /// Steps to the next line, over called methods.
    pub async fn step_over(&self) -> Result<()> {
        self.step(StepDepth::Over).await
    }

    async fn step(&self, depth: StepDepth) -> Result<()> {
        let thread = self.state.current_thread;
        let mut modifiers = vec![Modifier::Step(thread, StepSize::Line, depth)];
        modifiers.extend(
            self.config
                .step_exclusions
                .iter()
                .map(|pattern| Modifier::ClassExclude(pattern.clone())),
        );
        modifiers.push(Modifier::Count(1));

        let limit = self.config.operation_timeout;
        with_timeout(limit, async {
            let request = Set::new(EventKind::SingleStep, SuspendPolicy::All, modifiers);
            let id = send(&self.transport, &request).await?;
            debug!("step {depth:?} on {thread:?} requested as {id:?}");
            send(&self.transport, &Resume).await
        })
        .await
    }

    fn decode_packet(&self, packet: &[u8]) -> Result<Composite> {
        Ok(codec::decode(packet, self.transport.id_sizes())?)
    }

    async fn dispatch(&mut self, composite: Composite) -> Result<()> {
        // a step and a breakpoint at the same place arrive together but are a
        // single stop
        let mut stops = HashSet::new();
        for event in composite.events {
            match event {
                Event::SingleStep {
                    thread, location, ..
                }
                | Event::Breakpoint {
                    thread, location, ..
                } => {
                    if stops.insert((thread, location)) {
                        self.on_location(thread, location).await?;
                    } else {
                        debug!("{thread:?} already stopped at {location:?} in this packet");
                    }
                }
                Event::ClassPrepare {
                    ref_type,
                    signature,
                    ..
                } => {
                    self.on_class_prepare(ref_type, &signature, composite.suspend_policy)
                        .await?
                }
                Event::VmStart { thread, .. } => {
                    debug!("VM started, main thread {thread:?}");
                    self.notifier.send(Notification::SessionStarted);
                }
                Event::VmDeath { .. } => {
                    self.notifier.send(Notification::ProcessExited { code: None });
                }
                other => debug!("ignoring {:?} event", other.kind()),
            }
        }
        Ok(())
    }

    /// The class and method enclosing `file:line`.
    async fn position_at(&self, file: &Path, line: u32) -> Result<SourcePosition> {
        self.positions
            .position_at_line(file, line)
            .await?
            .ok_or_else(|| unresolved(file, line))
    }
}

async fn with_timeout<F, R>(limit: Duration, fut: F) -> Result<R>
where
    F: Future<Output = Result<R>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res,
        Err(_elapsed) => Err(Error::TransportTimeout(limit)),
    }
}

fn closed() -> Error {
    Error::Io(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "event stream closed",
    ))
}

fn unresolved(file: &Path, line: u32) -> Error {
    Error::UnresolvedLocation {
        file: PathBuf::from(file),
        line,
    }
}
