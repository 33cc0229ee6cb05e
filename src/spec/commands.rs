use std::io::{self, Read};

use crate::{
    codec::{JdwpReadable, JdwpReader, JdwpWritable},
    jdwp_command,
    spec::*,
};

/// VirtualMachine Command Set (1)
pub mod virtual_machine {
    use super::*;

    /// Resumes execution of the application after the suspend command or an
    /// event has stopped it.
    ///
    /// Suspensions of the Virtual Machine and individual threads are counted.
    #[jdwp_command((), 1, 9)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct Resume;

    /// Returns reference types for all classes currently loaded by the target
    /// VM, with both the JNI and the generic signature of each.
    #[jdwp_command(Vec<ClassRecord>, 1, 20)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct AllClassesWithGeneric;

    #[derive(Debug, Clone, JdwpReadable)]
    pub struct ClassRecord {
        /// Loaded reference type
        pub ref_type: TaggedReferenceTypeID,
        /// The JNI signature of the loaded reference type
        pub signature: String,
        /// The generic signature of the loaded reference type, or an empty
        /// string if there is none
        pub generic_signature: String,
        /// The current class status
        pub status: ClassStatus,
    }
}

/// ReferenceType Command Set (2)
pub mod reference_type {
    use super::*;

    /// Returns the source file name in which a reference type was declared.
    ///
    /// This is only the short name, e.g. `Main.java`, without any directory.
    #[jdwp_command(String, 2, 7)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct SourceFile {
        /// The reference type ID
        ref_type: ReferenceTypeID,
    }

    /// Returns information, including the generic signature if any, for each
    /// method in a reference type.
    ///
    /// Inherited methods are not included.
    #[jdwp_command(Vec<MethodRecord>, 2, 15)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct MethodsWithGeneric {
        /// The reference type ID
        ref_type: ReferenceTypeID,
    }

    #[derive(Debug, Clone, JdwpReadable)]
    pub struct MethodRecord {
        /// The method ID
        pub method_id: MethodID,
        /// The name of the method
        pub name: String,
        /// The JNI signature of the method
        pub signature: String,
        /// The generic signature of the method, or an empty string if there is
        /// none
        pub generic_signature: String,
        /// The modifier bit flags (also known as access flags)
        pub mod_bits: MethodModifiers,
    }
}

/// Method Command Set (6)
pub mod method {
    use super::*;

    /// Returns line number information for the method, if present.
    ///
    /// The line table maps source line numbers to the initial code index of the
    /// line and is ordered by code index (from lowest to highest).
    #[jdwp_command(6, 1)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct LineTable {
        /// The class.
        reference_type_id: ReferenceTypeID,
        /// The method.
        method_id: MethodID,
    }

    #[derive(Debug, Clone, JdwpReadable)]
    pub struct LineTableReply {
        /// Lowest valid code index for the method, >=0, or -1 if the method is
        /// native
        pub start: i64,
        /// Highest valid code index for the method, >=0, or -1 if the method is
        /// native
        pub end: i64,
        /// The entries of the line table for this method.
        pub lines: Vec<LineTableEntry>,
    }

    #[derive(Debug, Clone, PartialEq, Eq, JdwpReadable)]
    pub struct LineTableEntry {
        /// Initial code index of the line, start <= code_index < end
        pub code_index: u64,
        /// Line number.
        pub line_number: u32,
    }

    impl LineTableReply {
        /// The line a code index belongs to: the entry with the greatest code
        /// index not exceeding `index`.
        ///
        /// The table is not trusted to be sorted.
        pub fn line_for(&self, index: u64) -> Option<u32> {
            self.lines
                .iter()
                .filter(|entry| entry.code_index <= index)
                .max_by_key(|entry| entry.code_index)
                .map(|entry| entry.line_number)
        }

        /// The first code index of `line`, or of the nearest line after it if
        /// `line` itself has no code.
        pub fn index_for_line(&self, line: u32) -> Option<u64> {
            let nearest = self
                .lines
                .iter()
                .filter(|entry| entry.line_number >= line)
                .map(|entry| entry.line_number)
                .min()?;
            self.lines
                .iter()
                .filter(|entry| entry.line_number == nearest)
                .map(|entry| entry.code_index)
                .min()
        }
    }

    /// Returns variable information for the method, including generic
    /// signatures for the variables.
    ///
    /// The variable table includes arguments and locals declared within the
    /// method. For instance methods, the "this" reference is included in
    /// the table. Also, synthetic variables may be present.
    #[jdwp_command(6, 5)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct VariableTableWithGeneric {
        /// The class.
        reference_type_id: ReferenceTypeID,
        /// The method.
        method_id: MethodID,
    }

    #[derive(Debug, Clone, JdwpReadable)]
    pub struct VariableTableWithGenericReply {
        /// The number of words in the frame used by arguments. Eight-byte
        /// arguments use two words; all others use one.
        pub arg_cnt: u32,
        /// The variables.
        pub variables: Vec<VariableRecord>,
    }

    #[derive(Debug, Clone, JdwpReadable)]
    pub struct VariableRecord {
        /// First code index at which the variable is visible.
        ///
        /// The variable can be get or set only when the current
        /// code_index <= frame code index < code_index + length
        pub code_index: u64,
        /// The variable's name.
        pub name: String,
        /// The variable type's JNI signature.
        pub signature: String,
        /// The variable type's generic signature or an empty string if there is
        /// none.
        pub generic_signature: String,
        /// Unsigned value used in conjunction with code_index.
        pub length: u32,
        /// The local variable's index in its frame
        pub slot: u32,
    }

    impl VariableRecord {
        pub fn is_visible_at(&self, index: u64) -> bool {
            index >= self.code_index && index - self.code_index < u64::from(self.length)
        }
    }
}

/// StringReference Command Set (10)
pub mod string_reference {
    use super::*;

    /// Returns the characters contained in the string.
    #[jdwp_command(String, 10, 1)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct Value {
        /// The String object ID
        string_object: StringID,
    }
}

/// ThreadReference Command Set (11)
pub mod thread_reference {
    use super::*;

    /// Returns the current call stack of a suspended thread.
    ///
    /// The sequence of frames starts with the currently executing frame,
    /// followed by its caller, and so on. The thread must be suspended, and
    /// the returned frameID is valid only while the thread is suspended.
    #[jdwp_command(Vec<(FrameID, Location)>, 11, 6)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct Frames {
        /// The thread object ID.
        pub thread: ThreadID,
        /// The index of the first frame to retrieve.
        pub start_frame: u32,
        /// The amount of frames to retrieve.
        pub limit: u32,
    }
}

/// EventRequest Command Set (15)
pub mod event_request {
    use super::*;

    /// Filters applied to an event request, in the order they are written.
    ///
    /// The reply to [Set] does not name the modifiers, so the order they are
    /// given in is the order the VM applies them in.
    #[derive(Debug, Clone, PartialEq, Eq, Hash, JdwpWritable)]
    #[repr(u8)]
    pub enum Modifier {
        /// Limit the requested event to be reported at most once after a given
        /// number of occurrences.
        ///
        /// To request a one-off event, use a count of 1.
        Count(
            /// Count before event. One for one-off
            i32,
        ) = ModifierKind::Count as u8,

        /// Restricts reported events to those in the given thread.
        ThreadOnly(
            /// Required thread
            ThreadID,
        ) = ModifierKind::ThreadOnly as u8,

        /// Restricts reported events to those in the given reference type and
        /// its subtypes.
        ClassOnly(
            /// Required class
            ReferenceTypeID,
        ) = ModifierKind::ClassOnly as u8,

        /// Restricts reported events to those for classes whose name matches
        /// the given restricted regular expression.
        ///
        /// Matches are limited to exact matches of the given class pattern and
        /// matches of patterns that begin or end with `*`, for example
        /// `*.Foo` or `java.*`.
        ClassMatch(
            /// Required class pattern
            String,
        ) = ModifierKind::ClassMatch as u8,

        /// Restricts reported events to those for classes whose name does not
        /// match the given restricted regular expression.
        ClassExclude(
            /// Disallowed class pattern
            String,
        ) = ModifierKind::ClassExclude as u8,

        /// Restricts reported events to those that occur at the given location.
        LocationOnly(
            /// Required location
            Location,
        ) = ModifierKind::LocationOnly as u8,

        /// Restricts reported step events to those which satisfy depth and size
        /// constraints.
        Step(
            /// Thread in which to step
            ThreadID,
            /// Size of each step
            StepSize,
            /// Relative call stack limit
            StepDepth,
        ) = ModifierKind::Step as u8,
    }

    /// Set an event request.
    ///
    /// When the event described by this request occurs, an event is sent from
    /// the target VM.
    ///
    /// The VM Start Event and the VM Death Event are sent without being
    /// requested.
    #[jdwp_command(RequestID, 15, 1)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct Set {
        /// Event kind to request.
        event_kind: EventKind,
        /// What threads are suspended when this event occurs?
        suspend_policy: SuspendPolicy,
        /// Constraints used to control the number of generated events.
        ///
        /// An empty list means there are no modifiers in the request.
        modifiers: Vec<Modifier>,
    }
}

/// StackFrame Command Set (16)
pub mod stack_frame {
    use super::*;

    /// Returns the value of one or more local variables in a given frame.
    ///
    /// Each variable must be visible at the frame's code index. The tag of
    /// each slot decides how the VM reports the value, so object slots that
    /// hold strings should be requested with [Tag::String].
    #[jdwp_command(Vec<Value>, 16, 1)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct GetValues {
        /// The frame's thread.
        pub thread_id: ThreadID,
        /// The frame ID.
        pub frame_id: FrameID,
        /// Local variable indices and types to get.
        pub slots: Vec<(u32, Tag)>,
    }
}

/// Event Command Set (64)
pub mod event {
    use super::*;

    /// An event kind this crate has no payload shape for.
    ///
    /// Nothing after such an event in the same packet can be decoded, so it
    /// aborts decoding of the whole packet. It travels inside the
    /// [io::Error] returned by the reader.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
    #[error("unknown event kind {0}")]
    pub struct UnknownEventKind(pub u8);

    #[derive(Debug, Clone, PartialEq)]
    pub enum Event {
        /// Notification of step completion in the target VM.
        ///
        /// The step event is generated before the code at its location is
        /// executed.
        SingleStep {
            request_id: RequestID,
            thread: ThreadID,
            location: Location,
        },
        /// Notification of a breakpoint in the target VM.
        ///
        /// The breakpoint event is generated before the code at its location is
        /// executed.
        Breakpoint {
            request_id: RequestID,
            thread: ThreadID,
            location: Location,
        },
        /// Notification of a method invocation in the target VM.
        MethodEntry {
            request_id: RequestID,
            thread: ThreadID,
            location: Location,
        },
        /// Notification of a method return in the target VM.
        ///
        /// The location is of the last executed instruction of the method.
        MethodExit {
            request_id: RequestID,
            thread: ThreadID,
            location: Location,
        },
        /// Notification of a method return with the returned value.
        MethodExitWithReturnValue {
            request_id: RequestID,
            thread: ThreadID,
            location: Location,
            value: Value,
        },
        /// A thread is attempting to enter a monitor already held by another
        /// thread.
        MonitorContendedEnter {
            request_id: RequestID,
            thread: ThreadID,
            object: TaggedObjectID,
            location: Location,
        },
        /// A thread entered a monitor after waiting for it to be released.
        MonitorContendedEntered {
            request_id: RequestID,
            thread: ThreadID,
            object: TaggedObjectID,
            location: Location,
        },
        /// A thread is about to wait on a monitor object.
        MonitorWait {
            request_id: RequestID,
            thread: ThreadID,
            object: TaggedObjectID,
            location: Location,
            /// Milliseconds to wait
            timeout: i64,
        },
        /// A thread finished waiting on a monitor object.
        MonitorWaited {
            request_id: RequestID,
            thread: ThreadID,
            object: TaggedObjectID,
            location: Location,
            timed_out: bool,
        },
        /// Notification of an exception in the target VM.
        Exception {
            request_id: RequestID,
            thread: ThreadID,
            /// Location of the exception throw
            location: Location,
            exception: TaggedObjectID,
            /// Location of the catch, none if the exception is uncaught
            catch_location: Option<Location>,
        },
        /// Notification of a new running thread in the target VM.
        ThreadStart {
            request_id: RequestID,
            thread: ThreadID,
        },
        /// Notification of a completed thread in the target VM.
        ThreadDeath {
            request_id: RequestID,
            thread: ThreadID,
        },
        /// Notification of a class prepare in the target VM.
        ///
        /// The reported thread is the one which is preparing the class, it is
        /// suspended according to the request's suspend policy.
        ClassPrepare {
            request_id: RequestID,
            thread: ThreadID,
            ref_type: TaggedReferenceTypeID,
            signature: String,
            status: ClassStatus,
        },
        /// Notification of a class unload in the target VM.
        ClassUnload {
            request_id: RequestID,
            signature: String,
        },
        /// Notification of a field access in the target VM.
        FieldAccess {
            request_id: RequestID,
            thread: ThreadID,
            location: Location,
            ref_type: TaggedReferenceTypeID,
            field_id: FieldID,
            /// The object whose field was accessed, null for statics
            object: TaggedObjectID,
        },
        /// Notification of a field modification in the target VM.
        FieldModification {
            request_id: RequestID,
            thread: ThreadID,
            location: Location,
            ref_type: TaggedReferenceTypeID,
            field_id: FieldID,
            object: TaggedObjectID,
            value_to_be: Value,
        },
        /// Notification of initialization of a target VM.
        ///
        /// Sent without a request, so the request id is usually none.
        VmStart {
            request_id: Option<RequestID>,
            thread: ThreadID,
        },
        /// The target VM is terminating.
        VmDeath { request_id: Option<RequestID> },
    }

    impl Event {
        pub fn kind(&self) -> EventKind {
            match self {
                Event::SingleStep { .. } => EventKind::SingleStep,
                Event::Breakpoint { .. } => EventKind::Breakpoint,
                Event::MethodEntry { .. } => EventKind::MethodEntry,
                Event::MethodExit { .. } => EventKind::MethodExit,
                Event::MethodExitWithReturnValue { .. } => EventKind::MethodExitWithReturnValue,
                Event::MonitorContendedEnter { .. } => EventKind::MonitorContendedEnter,
                Event::MonitorContendedEntered { .. } => EventKind::MonitorContendedEntered,
                Event::MonitorWait { .. } => EventKind::MonitorWait,
                Event::MonitorWaited { .. } => EventKind::MonitorWaited,
                Event::Exception { .. } => EventKind::Exception,
                Event::ThreadStart { .. } => EventKind::ThreadStart,
                Event::ThreadDeath { .. } => EventKind::ThreadDeath,
                Event::ClassPrepare { .. } => EventKind::ClassPrepare,
                Event::ClassUnload { .. } => EventKind::ClassUnload,
                Event::FieldAccess { .. } => EventKind::FieldAccess,
                Event::FieldModification { .. } => EventKind::FieldModification,
                Event::VmStart { .. } => EventKind::VmStart,
                Event::VmDeath { .. } => EventKind::VmDeath,
            }
        }
    }

    impl JdwpReadable for Event {
        fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
            // struct expression fields are evaluated in the order written,
            // which keeps the reads in wire order
            macro_rules! event {
                ($variant:ident { $($field:ident),* $(,)? }) => {
                    Event::$variant { $($field: JdwpReadable::read(read)?),* }
                };
            }

            let kind = u8::read(read)?;
            let event = match EventKind::try_from(kind) {
                Ok(EventKind::SingleStep) => event!(SingleStep { request_id, thread, location }),
                Ok(EventKind::Breakpoint) => event!(Breakpoint { request_id, thread, location }),
                Ok(EventKind::MethodEntry) => event!(MethodEntry { request_id, thread, location }),
                Ok(EventKind::MethodExit) => event!(MethodExit { request_id, thread, location }),
                Ok(EventKind::MethodExitWithReturnValue) => {
                    event!(MethodExitWithReturnValue { request_id, thread, location, value })
                }
                Ok(EventKind::MonitorContendedEnter) => {
                    event!(MonitorContendedEnter { request_id, thread, object, location })
                }
                Ok(EventKind::MonitorContendedEntered) => {
                    event!(MonitorContendedEntered { request_id, thread, object, location })
                }
                Ok(EventKind::MonitorWait) => {
                    event!(MonitorWait { request_id, thread, object, location, timeout })
                }
                Ok(EventKind::MonitorWaited) => {
                    event!(MonitorWaited { request_id, thread, object, location, timed_out })
                }
                Ok(EventKind::Exception) => event!(Exception {
                    request_id,
                    thread,
                    location,
                    exception,
                    catch_location,
                }),
                Ok(EventKind::ThreadStart) => event!(ThreadStart { request_id, thread }),
                Ok(EventKind::ThreadDeath) => event!(ThreadDeath { request_id, thread }),
                Ok(EventKind::ClassPrepare) => event!(ClassPrepare {
                    request_id,
                    thread,
                    ref_type,
                    signature,
                    status,
                }),
                Ok(EventKind::ClassUnload) => event!(ClassUnload { request_id, signature }),
                Ok(EventKind::FieldAccess) => event!(FieldAccess {
                    request_id,
                    thread,
                    location,
                    ref_type,
                    field_id,
                    object,
                }),
                Ok(EventKind::FieldModification) => event!(FieldModification {
                    request_id,
                    thread,
                    location,
                    ref_type,
                    field_id,
                    object,
                    value_to_be,
                }),
                Ok(EventKind::VmStart) => event!(VmStart { request_id, thread }),
                Ok(EventKind::VmDeath) => event!(VmDeath { request_id }),
                // the rest are either internal to the VM or never delivered
                // through a composite packet
                Ok(
                    EventKind::FramePop
                    | EventKind::UserDefined
                    | EventKind::ClassLoad
                    | EventKind::ExceptionCatch
                    | EventKind::VmDisconnected,
                )
                | Err(_) => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        UnknownEventKind(kind),
                    ))
                }
            };
            Ok(event)
        }
    }

    /// Several events may be grouped in a single packet sent by the VM.
    ///
    /// All events in the set share the suspend policy, which is the most
    /// restrictive of their requests' policies.
    #[derive(Debug, Clone, JdwpReadable)]
    pub struct Composite {
        /// Which threads were suspended by this composite event?
        pub suspend_policy: SuspendPolicy,
        /// Events in set.
        pub events: Vec<Event>,
    }
}
