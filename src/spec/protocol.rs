use crate::codec::{JdwpReadable, JdwpWritable};
use std::{fmt, fmt::Display};

/// A command the debugger can send to the target VM.
///
/// The payload is the command value itself, the reply is decoded into
/// [Command::Output].
pub trait Command: JdwpWritable {
    const ID: CommandId;

    type Output: JdwpReadable;
}

/// A command set and command pair, e.g. `15.1` for setting an event request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CommandId {
    command_set: u8,
    command: u8,
}

impl CommandId {
    pub const fn new(command_set: u8, command: u8) -> CommandId {
        CommandId {
            command_set,
            command,
        }
    }

    pub const fn command_set(&self) -> u8 {
        self.command_set
    }

    pub const fn command(&self) -> u8 {
        self.command
    }
}

impl Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.command_set, self.command)
    }
}
