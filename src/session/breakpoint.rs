use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use log::{debug, Level};

use super::{unresolved, with_timeout, Session};
use crate::{
    error::{Error, Result},
    signature::class_to_signature,
    source::PositionLookup,
    spec::{
        event_request::{Modifier, Set},
        method::LineTable,
        reference_type::MethodsWithGeneric,
        virtual_machine::AllClassesWithGeneric,
        EventKind, Location, SuspendPolicy, TaggedReferenceTypeID,
    },
    transport::{send, Transport},
};

/// Outcome of a breakpoint request that was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakpointStatus {
    /// The class is loaded and the breakpoint is set in the VM.
    Bound,
    /// The class is not loaded yet, the breakpoint is set once it is prepared.
    Pending,
}

/// A breakpoint waiting for its class to be prepared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingBreakpoint {
    pub file: PathBuf,
    pub line: u32,
    pub method_name: String,
}

impl<T: Transport, P: PositionLookup> Session<T, P> {
    /// Sets a breakpoint at `file:line`.
    ///
    /// Files without the configured source extension are rejected before
    /// anything is sent to the VM.
    pub async fn set_breakpoint(&mut self, file: &Path, line: u32) -> Result<BreakpointStatus> {
        let expected = &self.config.source_extension;
        if file.extension() != Some(OsStr::new(expected)) {
            self.notifier
                .log(Level::Error, format!("Bad Filename: {}", file.display()));
            return Err(Error::BadSourceFile {
                file: file.to_owned(),
                expected: expected.clone(),
            });
        }

        let limit = self.config.operation_timeout;
        with_timeout(limit, self.resolve_breakpoint(file, line)).await
    }

    async fn resolve_breakpoint(&mut self, file: &Path, line: u32) -> Result<BreakpointStatus> {
        let (classes, position) = tokio::try_join!(
            send(&self.transport, &AllClassesWithGeneric),
            self.position_at(file, line),
        )?;
        let signature = class_to_signature(&position.class_name);
        let pending = PendingBreakpoint {
            file: file.to_owned(),
            line,
            method_name: position.method_name,
        };

        if let Some(class) = classes.iter().find(|class| class.signature == signature) {
            self.bind(class.ref_type, &pending).await?;
            return Ok(BreakpointStatus::Bound);
        }

        // one-shot, so that the VM only stops for the first class of that
        // name
        let request = Set::new(
            EventKind::ClassPrepare,
            SuspendPolicy::All,
            vec![
                Modifier::ClassMatch(position.class_name),
                Modifier::Count(1),
            ],
        );
        let id = send(&self.transport, &request).await?;
        debug!("breakpoint in {signature} pending on class prepare {id:?}");

        if let Some(replaced) = self.state.pending.insert(signature, pending) {
            debug!("replaced pending breakpoint at {}:{}", replaced.file.display(), replaced.line);
        }
        Ok(BreakpointStatus::Pending)
    }

    /// Sets the breakpoint in a loaded class.
    pub(super) async fn bind(
        &self,
        class: TaggedReferenceTypeID,
        breakpoint: &PendingBreakpoint,
    ) -> Result<()> {
        let methods = send(&self.transport, &MethodsWithGeneric::new(class.id)).await?;
        let Some(method) = methods
            .iter()
            .find(|method| method.name == breakpoint.method_name)
        else {
            return Err(unresolved(&breakpoint.file, breakpoint.line));
        };

        let index = if self.config.line_accurate_breakpoints {
            let table = send(&self.transport, &LineTable::new(class.id, method.method_id)).await?;
            table.index_for_line(breakpoint.line).unwrap_or(0)
        } else {
            0
        };

        let location = Location {
            reference_id: class,
            method_id: method.method_id,
            index,
        };
        let request = Set::new(
            EventKind::Breakpoint,
            SuspendPolicy::All,
            vec![Modifier::LocationOnly(location)],
        );
        let id = send(&self.transport, &request).await?;
        debug!(
            "breakpoint {id:?} bound in {:?}.{} at index {index}",
            class.id, method.name
        );
        Ok(())
    }
}
