use std::{future::Future, io};

use log::trace;

use crate::{
    codec::{self, IdSizes},
    error::{Error, Result},
    spec::{Command, CommandId},
};

/// A decoded reply packet, before its data is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Zero on success, otherwise one of the JDWP error codes.
    pub error_code: u16,
    pub data: Vec<u8>,
}

impl Reply {
    pub fn ok(data: impl Into<Vec<u8>>) -> Self {
        Self {
            error_code: 0,
            data: data.into(),
        }
    }

    pub fn error(error_code: u16) -> Self {
        Self {
            error_code,
            data: Vec::new(),
        }
    }
}

/// The connection to the target VM.
///
/// Implementations own the socket, the handshake and the packet framing,
/// including assigning request ids and matching replies to them. Composite
/// event packets the VM sends on its own are delivered separately, as raw
/// payloads, to [Session::handle_event_packet](crate::session::Session::handle_event_packet).
pub trait Transport {
    /// The identifier widths negotiated with the VM.
    fn id_sizes(&self) -> IdSizes;

    /// Sends a command with an already encoded payload and waits for its reply.
    fn request(
        &self,
        command: CommandId,
        payload: Vec<u8>,
    ) -> impl Future<Output = io::Result<Reply>> + Send;
}

/// Encodes a command, round-trips it and decodes the reply.
///
/// A nonzero error code in the reply becomes [Error::Wire].
pub(crate) async fn send<T, C>(transport: &T, command: &C) -> Result<C::Output>
where
    T: Transport + ?Sized,
    C: Command,
{
    let id_sizes = transport.id_sizes();
    let payload = codec::encode(command, id_sizes)?;
    trace!("-> {} ({} bytes)", C::ID, payload.len());

    let reply = transport.request(C::ID, payload).await?;
    trace!("<- {} error code {}, {} bytes", C::ID, reply.error_code, reply.data.len());

    if reply.error_code != 0 {
        return Err(Error::Wire {
            command: C::ID,
            code: reply.error_code,
        });
    }
    Ok(codec::decode(&reply.data, id_sizes)?)
}
