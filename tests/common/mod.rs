#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet, VecDeque},
    error::Error,
    future::Future,
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use jdwp_bridge::{
    codec::IdSizes,
    spec::CommandId,
    transport::{Reply, Transport},
    PositionLookup, SessionConfig, SourcePosition,
};

pub type Result<T = ()> = std::result::Result<T, Box<dyn Error>>;

pub const ALL_CLASSES: CommandId = CommandId::new(1, 20);
pub const RESUME: CommandId = CommandId::new(1, 9);
pub const SOURCE_FILE: CommandId = CommandId::new(2, 7);
pub const METHODS: CommandId = CommandId::new(2, 15);
pub const LINE_TABLE: CommandId = CommandId::new(6, 1);
pub const VARIABLE_TABLE: CommandId = CommandId::new(6, 5);
pub const STRING_VALUE: CommandId = CommandId::new(10, 1);
pub const FRAMES: CommandId = CommandId::new(11, 6);
pub const SET_EVENT: CommandId = CommandId::new(15, 1);
pub const GET_VALUES: CommandId = CommandId::new(16, 1);

pub fn init_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Trace)
        .try_init();
}

/// A transport that records every request and answers from canned replies.
///
/// Replies are queued per command, the last one sticks around for any further
/// requests. Event requests and resumes get a default reply when nothing is
/// queued for them.
#[derive(Debug, Default)]
pub struct MockTransport {
    id_sizes: IdSizes,
    replies: Mutex<HashMap<CommandId, VecDeque<Reply>>>,
    hanging: HashSet<CommandId>,
    sent: Mutex<Vec<(CommandId, Vec<u8>)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id_sizes(mut self, id_sizes: IdSizes) -> Self {
        self.id_sizes = id_sizes;
        self
    }

    pub fn reply(self, command: CommandId, data: impl Into<Vec<u8>>) -> Self {
        self.push(command, Reply::ok(data));
        self
    }

    pub fn reply_error(self, command: CommandId, code: u16) -> Self {
        self.push(command, Reply::error(code));
        self
    }

    /// Requests for this command never get a reply.
    pub fn hang(mut self, command: CommandId) -> Self {
        self.hanging.insert(command);
        self
    }

    pub fn push(&self, command: CommandId, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(command)
            .or_default()
            .push_back(reply);
    }

    pub fn sent(&self) -> Vec<(CommandId, Vec<u8>)> {
        self.sent.lock().unwrap().clone()
    }

    /// The sent commands as `set.command` strings.
    pub fn commands(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(command, _)| command.to_string())
            .collect()
    }

    /// Payloads of all requests of the given command.
    pub fn payloads(&self, command: CommandId) -> Vec<Vec<u8>> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(sent, _)| *sent == command)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    fn answer(&self, command: CommandId) -> io::Result<Reply> {
        let mut replies = self.replies.lock().unwrap();
        if let Some(queue) = replies.get_mut(&command) {
            let reply = if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            };
            if let Some(reply) = reply {
                return Ok(reply);
            }
        }
        match command {
            SET_EVENT => Ok(Reply::ok(1i32.to_be_bytes())),
            RESUME => Ok(Reply::ok(Vec::new())),
            _ => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no reply for {command}"),
            )),
        }
    }
}

impl Transport for MockTransport {
    fn id_sizes(&self) -> IdSizes {
        self.id_sizes
    }

    fn request(
        &self,
        command: CommandId,
        payload: Vec<u8>,
    ) -> impl Future<Output = io::Result<Reply>> + Send {
        self.sent.lock().unwrap().push((command, payload));
        let hang = self.hanging.contains(&command);
        let answer = self.answer(command);
        async move {
            if hang {
                std::future::pending::<()>().await;
            }
            answer
        }
    }
}

/// Answers every line of every file with the same position.
#[derive(Debug, Clone, Default)]
pub struct MockPositions {
    position: Option<SourcePosition>,
}

impl MockPositions {
    pub fn at(class_name: &str, method_name: &str) -> Self {
        Self {
            position: Some(SourcePosition::new(class_name, method_name)),
        }
    }

    pub fn nowhere() -> Self {
        Self { position: None }
    }
}

impl PositionLookup for MockPositions {
    fn position_at_line(
        &self,
        _file: &Path,
        _line: u32,
    ) -> impl Future<Output = io::Result<Option<SourcePosition>>> + Send {
        let position = self.position.clone();
        async move { Ok(position) }
    }
}

pub fn config() -> SessionConfig {
    SessionConfig::default()
}

pub fn path(s: &str) -> PathBuf {
    PathBuf::from(s)
}

/// Builds big-endian payloads the way the VM lays them out, with 8-byte ids.
#[derive(Debug, Default, Clone)]
pub struct Bytes(Vec<u8>);

impl Bytes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(mut self, v: u8) -> Self {
        self.0.push(v);
        self
    }

    pub fn u16(mut self, v: u16) -> Self {
        self.0.extend(v.to_be_bytes());
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.0.extend(v.to_be_bytes());
        self
    }

    pub fn i32(mut self, v: i32) -> Self {
        self.0.extend(v.to_be_bytes());
        self
    }

    pub fn u64(mut self, v: u64) -> Self {
        self.0.extend(v.to_be_bytes());
        self
    }

    pub fn i64(mut self, v: i64) -> Self {
        self.0.extend(v.to_be_bytes());
        self
    }

    pub fn str(self, s: &str) -> Self {
        let mut this = self.u32(s.len() as u32);
        this.0.extend(s.as_bytes());
        this
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.0.extend(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.0
    }
}

impl From<Bytes> for Vec<u8> {
    fn from(bytes: Bytes) -> Self {
        bytes.0
    }
}

/// Reply to 1.20: `(ref type id, signature)`, all loaded and initialized
/// classes.
pub fn classes(entries: &[(u64, &str)]) -> Vec<u8> {
    let mut bytes = Bytes::new().u32(entries.len() as u32);
    for &(id, signature) in entries {
        bytes = bytes.u8(1).u64(id).str(signature).str("").u32(7);
    }
    bytes.build()
}

/// Reply to 2.15: `(method id, name, signature)`.
pub fn methods(entries: &[(u64, &str, &str)]) -> Vec<u8> {
    let mut bytes = Bytes::new().u32(entries.len() as u32);
    for &(id, name, signature) in entries {
        bytes = bytes.u64(id).str(name).str(signature).str("").u32(1);
    }
    bytes.build()
}

/// Reply to 6.1: `(code index, line)`.
pub fn line_table(entries: &[(u64, u32)]) -> Vec<u8> {
    let mut bytes = Bytes::new().i64(0).i64(0x40).u32(entries.len() as u32);
    for &(index, line) in entries {
        bytes = bytes.u64(index).u32(line);
    }
    bytes.build()
}

/// Reply to 6.5: `(name, signature, slot)`, each visible for the whole method.
pub fn variables(entries: &[(&str, &str, u32)]) -> Vec<u8> {
    let mut bytes = Bytes::new().u32(1).u32(entries.len() as u32);
    for &(name, signature, slot) in entries {
        bytes = bytes
            .u64(0)
            .str(name)
            .str(signature)
            .str("")
            .u32(0x40)
            .u32(slot);
    }
    bytes.build()
}

/// Reply to 11.6 with a single frame stopped in `class.method` at `index`.
pub fn frame(frame_id: u64, class: u64, method: u64, index: u64) -> Vec<u8> {
    Bytes::new()
        .u32(1)
        .u64(frame_id)
        .u8(1)
        .u64(class)
        .u64(method)
        .u64(index)
        .build()
}

pub fn string(s: &str) -> Vec<u8> {
    Bytes::new().str(s).build()
}

/// A composite event packet with the given events, each starting with its
/// kind byte.
pub fn composite(suspend_policy: u8, events: &[Vec<u8>]) -> Vec<u8> {
    let mut bytes = Bytes::new().u8(suspend_policy).u32(events.len() as u32);
    for event in events {
        bytes = bytes.raw(event);
    }
    bytes.build()
}

pub fn breakpoint_event(request: i32, thread: u64, class: u64, method: u64, index: u64) -> Vec<u8> {
    Bytes::new()
        .u8(2)
        .i32(request)
        .u64(thread)
        .u8(1)
        .u64(class)
        .u64(method)
        .u64(index)
        .build()
}

pub fn step_event(request: i32, thread: u64, class: u64, method: u64, index: u64) -> Vec<u8> {
    let mut event = breakpoint_event(request, thread, class, method, index);
    event[0] = 1;
    event
}

pub fn class_prepare_event(request: i32, thread: u64, class: u64, signature: &str) -> Vec<u8> {
    Bytes::new()
        .u8(8)
        .i32(request)
        .u64(thread)
        .u8(1)
        .u64(class)
        .str(signature)
        .u32(7)
        .build()
}

pub fn vm_start_event(thread: u64) -> Vec<u8> {
    Bytes::new().u8(90).i32(0).u64(thread).build()
}

pub fn vm_death_event() -> Vec<u8> {
    Bytes::new().u8(99).i32(0).build()
}
