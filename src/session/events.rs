use std::path::PathBuf;

use log::{debug, warn};

use super::{with_timeout, Session};
use crate::{
    error::Result,
    notify::Notification,
    source::PositionLookup,
    spec::{
        method::LineTable,
        reference_type::SourceFile,
        virtual_machine::{AllClassesWithGeneric, Resume},
        ErrorCode, Location, SuspendPolicy, TaggedReferenceTypeID, ThreadID,
    },
    transport::{send, Transport},
};

/// Missing debug information is an expected condition, not a failure.
fn absent_as_none<T>(res: Result<T>) -> Result<Option<T>> {
    match res {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.error_code() == Some(ErrorCode::AbsentInformation) => Ok(None),
        Err(err) => Err(err),
    }
}

impl<T: Transport, P: PositionLookup> Session<T, P> {
    /// Handles one composite event packet the VM sent.
    ///
    /// The whole packet is decoded before any event in it is acted upon, so a
    /// malformed packet or an unknown event kind fails without side effects.
    pub async fn handle_event_packet(&mut self, packet: &[u8]) -> Result<()> {
        let composite = self.decode_packet(packet)?;
        let limit = self.config.operation_timeout;
        with_timeout(limit, self.dispatch(composite)).await
    }

    /// The VM stopped at a location: report it as a source position.
    pub(super) async fn on_location(&mut self, thread: ThreadID, location: Location) -> Result<()> {
        if self.state.current_thread != thread {
            debug!("current thread is now {thread:?}");
            self.state.current_thread = thread;
        }

        let class = location.reference_id.id;
        let (classes, short_name, table) = tokio::try_join!(
            send(&self.transport, &AllClassesWithGeneric),
            async { absent_as_none(send(&self.transport, &SourceFile::new(class)).await) },
            async {
                absent_as_none(
                    send(&self.transport, &LineTable::new(class, location.method_id)).await,
                )
            },
        )?;

        let path = match short_name {
            Some(short_name) => {
                let signature = classes
                    .iter()
                    .find(|record| record.ref_type.id == class)
                    .map(|record| record.signature.as_str());
                match signature {
                    Some(signature) => self.state.files.resolve(signature, &short_name)?,
                    None => None,
                }
            }
            None => None,
        };
        let Some(path) = path else {
            warn!("no known source file for {class:?}, resuming");
            return self.resume_after_event().await;
        };

        let line = table.and_then(|table| table.line_for(location.index));
        let Some(line) = line else {
            warn!(
                "no line for index {} of {:?} in {}, resuming",
                location.index,
                location.method_id,
                path.display()
            );
            return self.resume_after_event().await;
        };

        self.notify_position(path, line);
        Ok(())
    }

    /// A class we may have been waiting for got prepared.
    pub(super) async fn on_class_prepare(
        &mut self,
        class: TaggedReferenceTypeID,
        signature: &str,
        suspend_policy: SuspendPolicy,
    ) -> Result<()> {
        // the class prepare request was one-shot, the entry can't resolve later
        let bound = match self.state.pending.remove(signature) {
            Some(pending) => {
                let res = self.bind(class, &pending).await;
                match &res {
                    Ok(()) => debug!("pending breakpoint in {signature} resolved"),
                    Err(err) => warn!(
                        "pending breakpoint at {}:{} dropped: {err}",
                        pending.file.display(),
                        pending.line
                    ),
                }
                res
            }
            None => {
                debug!("{signature} prepared, nothing pending for it");
                Ok(())
            }
        };

        // resumed whatever the outcome of binding
        if suspend_policy != SuspendPolicy::None {
            self.resume_after_event().await?;
        }
        bound
    }

    async fn resume_after_event(&self) -> Result<()> {
        send(&self.transport, &Resume).await
    }

    fn notify_position(&self, path: PathBuf, line: u32) {
        debug!("stopped at {}:{line}", path.display());
        self.notifier.send(Notification::PositionChanged { path, line });
    }
}
