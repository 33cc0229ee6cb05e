use std::{
    fmt::{Display, Formatter},
    io::{self, Error, ErrorKind, Read, Write},
};

use bitflags::bitflags;

use crate::codec::{JdwpReadable, JdwpReader, JdwpWritable, JdwpWriter};

macro_rules! jdwp_enum {
    (
        #[repr($repr:ident)]
        pub enum $e:ident {
            $($(#[doc = $string:literal])* $name:ident = $id:literal),*
            $(,)?
        }
    ) => {
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        #[repr($repr)]
        pub enum $e {
            $($(#[doc = $string])* $name = $id,)*
        }

        impl TryFrom<$repr> for $e {
            type Error = $repr;

            fn try_from(value: $repr) -> Result<Self, Self::Error> {
                match value {
                    $($id => Ok($e::$name),)*
                    other => Err(other),
                }
            }
        }

        impl JdwpReadable for $e {
            fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
                let raw = $repr::read(read)?;
                Self::try_from(raw).map_err(|raw| {
                    Error::new(
                        ErrorKind::InvalidData,
                        format!(concat!("unknown ", stringify!($e), " {}"), raw),
                    )
                })
            }
        }

        impl JdwpWritable for $e {
            fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
                (*self as $repr).write(write)
            }
        }
    };
    (
        #[derive(Display)]
        #[repr($repr:ident)]
        pub enum $e:ident {
            $(#[doc = $string:literal] $name:ident = $id:literal),*
            $(,)?
        }
    ) => {
        jdwp_enum! {
            #[repr($repr)]
            pub enum $e {
                $(#[doc = $string] $name = $id,)*
            }
        }

        impl Display for $e {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(match self {
                    $($e::$name => $string.trim(),)*
                })
            }
        }
    };
}

jdwp_enum! {
    #[derive(Display)]
    #[repr(u16)]
    pub enum ErrorCode {
        /// No error has occurred
        None = 0,
        /// Passed thread is null, is not a valid thread or has exited
        InvalidThread = 10,
        /// Thread is not suspended by an event
        ThreadNotSuspended = 13,
        /// Thread has not been started or is now dead
        ThreadNotAlive = 15,
        /// Object has been garbage collected or was never valid
        InvalidObject = 20,
        /// Invalid class
        InvalidClass = 21,
        /// Class has been loaded but not yet prepared
        ClassNotPrepared = 22,
        /// Invalid method
        InvalidMethodid = 23,
        /// Invalid location
        InvalidLocation = 24,
        /// Invalid frame
        InvalidFrameid = 30,
        /// There are no more Java or JNI frames on the call stack
        NoMoreFrames = 31,
        /// Information about the frame is not available
        OpaqueFrame = 32,
        /// The variable is not an appropriate type for the function used
        TypeMismatch = 34,
        /// Invalid slot
        InvalidSlot = 35,
        /// Desired element not found
        NotFound = 41,
        /// The functionality is not implemented in this virtual machine
        NotImplemented = 99,
        /// Desired information is not available
        AbsentInformation = 101,
        /// The specified event type id is not recognized
        InvalidEventType = 102,
        /// Illegal argument
        IllegalArgument = 103,
        /// The virtual machine is not running
        VmDead = 112,
        /// An unexpected internal error has occurred
        Internal = 113,
        /// Object type id or class tag
        InvalidTag = 500,
        /// The string is invalid
        InvalidString = 506,
        /// The count is invalid
        InvalidCount = 512,
    }
}

jdwp_enum! {
    #[repr(u8)]
    pub enum EventKind {
        SingleStep = 1,
        Breakpoint = 2,
        FramePop = 3,
        Exception = 4,
        UserDefined = 5,
        ThreadStart = 6,
        ThreadDeath = 7,
        ClassPrepare = 8,
        ClassUnload = 9,
        ClassLoad = 10,
        FieldAccess = 20,
        FieldModification = 21,
        ExceptionCatch = 30,
        MethodEntry = 40,
        MethodExit = 41,
        MethodExitWithReturnValue = 42,
        MonitorContendedEnter = 43,
        MonitorContendedEntered = 44,
        MonitorWait = 45,
        MonitorWaited = 46,
        VmStart = 90,
        VmDeath = 99,
        /// Never sent across JDWP
        VmDisconnected = 100,
    }
}

jdwp_enum! {
    #[repr(u8)]
    pub enum TypeTag {
        /// ReferenceType is a class
        Class = 1,
        /// ReferenceType is an interface
        Interface = 2,
        /// ReferenceType is an array
        Array = 3,
    }
}

jdwp_enum! {
    #[repr(u8)]
    pub enum Tag {
        /// '[' - an array object (object ID size).
        Array = 91,
        /// 'B' - a byte value (1 byte).
        Byte = 66,
        /// 'C' - a character value (2 bytes).
        Char = 67,
        /// 'L' - an object (object ID size).
        Object = 76,
        /// 'F' - a float value (4 bytes).
        Float = 70,
        /// 'D' - a double value (8 bytes).
        Double = 68,
        /// 'I' - an int value (4 bytes).
        Int = 73,
        /// 'J' - a long value (8 bytes).
        Long = 74,
        /// 'S' - a short value (2 bytes).
        Short = 83,
        /// 'V' - a void value (no bytes).
        Void = 86,
        /// 'Z' - a boolean value (1 byte).
        Boolean = 90,
        /// 's' - a String object (object ID size).
        String = 115,
        /// 't' - a Thread object (object ID size).
        Thread = 116,
        /// 'g' - a ThreadGroup object (object ID size).
        ThreadGroup = 103,
        /// 'l' - a ClassLoader object (object ID size).
        ClassLoader = 108,
        /// 'c' - a class object object (object ID size).
        ClassObject = 99,
    }
}

impl Tag {
    /// The tag a value of the given JNI type signature is requested with.
    ///
    /// `java.lang.String` gets the dedicated string tag so that the VM hands
    /// out a string reference instead of a plain object one.
    pub fn for_signature(signature: &str) -> Option<Tag> {
        if signature == "Ljava/lang/String;" {
            return Some(Tag::String);
        }
        let first = *signature.as_bytes().first()?;
        Tag::try_from(first).ok()
    }
}

jdwp_enum! {
    #[repr(u32)]
    pub enum StepDepth {
        /// Step into any method calls that occur before the end of the step
        Into = 0,
        /// Step over any method calls that occur before the end of the step
        Over = 1,
        /// Step out of the current method
        Out = 2,
    }
}

jdwp_enum! {
    #[repr(u32)]
    pub enum StepSize {
        /// Step by the minimum possible amount (often a byte code instruction)
        Min = 0,
        /// Step to the next source line unless there is no line number
        /// information in which case a MIN step is done instead
        Line = 1,
    }
}

jdwp_enum! {
    #[repr(u8)]
    pub enum SuspendPolicy {
        /// Suspend no threads when this event is encountered
        None = 0,
        /// Suspend the event thread when this event is encountered
        EventThread = 1,
        /// Suspend all threads when this event is encountered
        All = 2,
    }
}

jdwp_enum! {
    #[repr(u8)]
    pub enum ModifierKind {
        /// Report the event at most once, after the given number of hits
        Count = 1,
        /// Reserved for conditional expressions, never implemented by VMs
        Conditional = 2,
        /// Only events on the given thread
        ThreadOnly = 3,
        /// Only events in the given reference type and its subtypes
        ClassOnly = 4,
        /// Only classes whose name matches the pattern
        ClassMatch = 5,
        /// Only classes whose name does not match the pattern
        ClassExclude = 6,
        /// Only events at the given location
        LocationOnly = 7,
        /// Only exceptions of the given type, caught and/or uncaught
        ExceptionOnly = 8,
        /// Only accesses of the given field
        FieldOnly = 9,
        /// Step size and depth constraints for a thread
        Step = 10,
        /// Only events whose `this` is the given object
        InstanceOnly = 11,
        /// Only classes whose source name matches the pattern
        SourceNameMatch = 12,
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ClassStatus: u32 {
        const VERIFIED = 1;
        const PREPARED = 2;
        const INITIALIZED = 4;
        const ERROR = 8;

        const OK = Self::VERIFIED.bits() | Self::PREPARED.bits() | Self::INITIALIZED.bits();
    }
}

bitflags! {
    /// Access flags of a method, as found in the class file.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MethodModifiers: u32 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const BRIDGE = 0x0040;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        /// JDWP marks synthetic methods with this bit when the VM has the
        /// synthetic attribute capability
        const VM_SYNTHETIC = 0xf000_0000;
    }
}

macro_rules! bitflags_io {
    ($($flags:ident),*) => {
        $(
            // unknown bits are kept, newer VMs may set more of them
            impl JdwpReadable for $flags {
                fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
                    u32::read(read).map(Self::from_bits_retain)
                }
            }

            impl JdwpWritable for $flags {
                fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
                    self.bits().write(write)
                }
            }
        )*
    };
}

bitflags_io![ClassStatus, MethodModifiers];
