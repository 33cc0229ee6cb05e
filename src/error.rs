use std::{io, path::PathBuf, time::Duration};

use thiserror::Error;

use crate::spec::{event::UnknownEventKind, CommandId, ErrorCode};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no reply within {0:?}")]
    TransportTimeout(Duration),
    #[error("command {command} failed with error code {code}{}", describe(.code))]
    Wire { command: CommandId, code: u16 },
    #[error("malformed class signature `{0}`")]
    MalformedSignature(String),
    #[error("{file}:{line} does not map to a known class and method")]
    UnresolvedLocation { file: PathBuf, line: u32 },
    #[error("`{relative}` matches more than one source file: {candidates:?}")]
    AmbiguousPath {
        relative: PathBuf,
        candidates: Vec<PathBuf>,
    },
    #[error("unknown event kind {0}")]
    UnknownEventKind(u8),
    #[error("not a {expected} source file: {file}")]
    BadSourceFile { file: PathBuf, expected: String },
    #[error("no variable `{name}` in {class}.{method}")]
    UnknownVariable {
        name: String,
        class: String,
        method: String,
    },
    #[error("the current thread has no frames")]
    NoFrames,
    #[error(transparent)]
    Io(io::Error),
}

fn describe(code: &u16) -> String {
    match ErrorCode::try_from(*code) {
        Ok(known) => format!(" ({known})"),
        Err(_) => String::new(),
    }
}

impl Error {
    /// The wire error code as a known [ErrorCode], if this is a wire error
    /// with a code this crate knows about.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Error::Wire { code, .. } => ErrorCode::try_from(*code).ok(),
            _ => None,
        }
    }
}

/// Decoding errors that carry an [UnknownEventKind] become
/// [Error::UnknownEventKind], everything else stays an I/O error.
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        let kind = err
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<UnknownEventKind>())
            .map(|unknown| unknown.0);
        match kind {
            Some(kind) => Error::UnknownEventKind(kind),
            None => Error::Io(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_event_kind_is_lifted() {
        let io = io::Error::new(io::ErrorKind::InvalidData, UnknownEventKind(77));
        assert!(matches!(Error::from(io), Error::UnknownEventKind(77)));

        let io = io::Error::new(io::ErrorKind::UnexpectedEof, "short read");
        assert!(matches!(Error::from(io), Error::Io(_)));
    }

    #[test]
    fn wire_errors_name_known_codes() {
        let err = Error::Wire {
            command: CommandId::new(2, 7),
            code: 101,
        };
        assert_eq!(err.error_code(), Some(ErrorCode::AbsentInformation));
        assert_eq!(
            err.to_string(),
            "command 2.7 failed with error code 101 (Desired information is not available)"
        );

        let err = Error::Wire {
            command: CommandId::new(1, 9),
            code: 9999,
        };
        assert_eq!(err.error_code(), None);
        assert_eq!(err.to_string(), "command 1.9 failed with error code 9999");
    }
}
