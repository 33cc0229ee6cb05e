use std::{
    fmt::{self, Debug},
    io::{self, Read, Write},
    ops::Deref,
};

use byteorder::{ReadBytesExt, WriteBytesExt, BE};

use crate::codec::*;

use super::{Tag, TypeTag};

pub trait JdwpId: Clone + Copy {
    /// Type of the underlying raw ID.
    type Raw;

    /// Creates an instance of Self from an arbitrary number.
    ///
    /// Invalid IDs do not cause UB, but it is up to the caller to ensure that
    /// the id is valid for the target VM.
    fn from_raw(raw: Self::Raw) -> Self;

    /// The underlying raw value.
    fn raw(self) -> Self::Raw;
}

/// Uniquely identifies an object in the target VM.
///
/// A particular object will be identified by exactly one [ObjectID] throughout
/// its lifetime, but the existence of an object ID does not prevent the
/// garbage collection of the object.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ObjectID(u64);

/// Uniquely identifies a method in some class in the target VM.
///
/// A [MethodID] is not unique on its own, it is always paired with a
/// [ReferenceTypeID] to identify one method.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct MethodID(u64);

/// Uniquely identifies a field in some class in the target VM.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct FieldID(u64);

/// Uniquely identifies a frame in the target VM.
///
/// The [FrameID] is only valid while its thread is suspended.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct FrameID(u64);

/// Uniquely identifies a reference type in the target VM.
///
/// It is not reused for a different reference type, even after the class is
/// unloaded.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ReferenceTypeID(u64);

macro_rules! ids {
    ($($id:ident: $tpe:ident),* $(,)?) => {
        $(
            impl JdwpId for $tpe {
                type Raw = u64;

                fn from_raw(raw: u64) -> Self {
                    Self(raw)
                }

                fn raw(self) -> u64 {
                    self.0
                }
            }

            impl Debug for $tpe {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, concat!(stringify!($tpe), "({})"), self.0)
                }
            }

            impl JdwpReadable for $tpe {
                fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
                    let id_size = read.id_sizes.$id as usize;
                    read.read_uint::<BE>(id_size).map($tpe)
                }
            }

            impl JdwpWritable for $tpe {
                fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
                    let id_size = write.id_sizes.$id as usize;
                    write.write_uint::<BE>(self.0, id_size)
                }
            }
        )*
    };
}

ids! {
    field_id_size: FieldID,
    method_id_size: MethodID,
    object_id_size: ObjectID,
    reference_type_id_size: ReferenceTypeID,
    frame_id_size: FrameID,
}

/// Uniquely identifies an object in the target VM that is known to be a thread.
#[derive(Copy, Clone, PartialEq, Eq, Hash, JdwpReadable, JdwpWritable)]
#[repr(transparent)]
pub struct ThreadID(ObjectID);

/// Uniquely identifies an object in the target VM that is known to be a string
/// object.
///
/// Note: this is very different from string, which is a value.
#[derive(Copy, Clone, PartialEq, Eq, Hash, JdwpReadable, JdwpWritable)]
#[repr(transparent)]
pub struct StringID(ObjectID);

macro_rules! wrapper_ids {
    ($($tpe:ident),* $(,)?) => {
        $(
            impl JdwpId for $tpe {
                type Raw = u64;

                fn from_raw(raw: u64) -> Self {
                    Self(ObjectID::from_raw(raw))
                }

                fn raw(self) -> u64 {
                    self.0.0
                }
            }

            impl Debug for $tpe {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, concat!(stringify!($tpe), "({})"), self.0.0)
                }
            }

            impl From<$tpe> for ObjectID {
                fn from(id: $tpe) -> ObjectID {
                    id.0
                }
            }

            impl Deref for $tpe {
                type Target = ObjectID;

                fn deref(&self) -> &Self::Target {
                    &self.0
                }
            }
        )*
    };
}

wrapper_ids![ThreadID, StringID];

/// An opaque type for the event request id, which the VM hands out as a raw
/// integer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, JdwpReadable, JdwpWritable)]
pub struct RequestID(i32);

impl JdwpId for RequestID {
    type Raw = i32;

    fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    fn raw(self) -> i32 {
        self.0
    }
}

/// Automatically generated events carry a zero request id.
impl JdwpReadable for Option<RequestID> {
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        match i32::read(read)? {
            0 => Ok(None),
            x => Ok(Some(RequestID(x))),
        }
    }
}

/// A [ReferenceTypeID] paired with the kind of type it refers to.
///
/// On the wire this is a [TypeTag] byte followed by the reference type id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, JdwpReadable, JdwpWritable)]
pub struct TaggedReferenceTypeID {
    pub tag: TypeTag,
    pub id: ReferenceTypeID,
}

impl TaggedReferenceTypeID {
    pub fn class(id: ReferenceTypeID) -> Self {
        Self {
            tag: TypeTag::Class,
            id,
        }
    }
}

impl Deref for TaggedReferenceTypeID {
    type Target = ReferenceTypeID;

    fn deref(&self) -> &Self::Target {
        &self.id
    }
}

/// An [ObjectID] prefixed with the [Tag] of the runtime type of the object.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, JdwpReadable, JdwpWritable)]
pub struct TaggedObjectID {
    pub tag: Tag,
    pub id: ObjectID,
}

impl Deref for TaggedObjectID {
    type Target = ObjectID;

    fn deref(&self) -> &Self::Target {
        &self.id
    }
}

/// An executable location.
///
/// The location is identified by one byte type tag followed by a class id
/// followed by a method id followed by an unsigned eight-byte index, which
/// identifies the location within the method.
///
/// Index values within a method are monotonically increasing from the first
/// executable point in the method to the last. If a line number table exists
/// for a method, locations that belong to a particular line fall between the
/// line's location index and the location index of the next line in the
/// table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, JdwpReadable, JdwpWritable)]
pub struct Location {
    pub reference_id: TaggedReferenceTypeID,
    pub method_id: MethodID,
    pub index: u64,
}

/// A missing location (e.g. the catch location of an uncaught exception) is
/// sent as a location with a zero type tag and zeroed ids.
impl JdwpReadable for Option<Location> {
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        let tag = u8::read(read)?;
        let reference_id = ReferenceTypeID::read(read)?;
        let method_id = MethodID::read(read)?;
        let index = u64::read(read)?;
        if tag == 0 {
            return Ok(None);
        }
        let tag = TypeTag::try_from(tag).map_err(|tag| {
            io::Error::new(io::ErrorKind::InvalidData, format!("unknown TypeTag {tag}"))
        })?;
        Ok(Some(Location {
            reference_id: TaggedReferenceTypeID {
                tag,
                id: reference_id,
            },
            method_id,
            index,
        }))
    }
}

/// A value retrieved from the target VM, prefixed on the wire with its [Tag].
#[derive(Debug, Copy, Clone, PartialEq, JdwpReadable, JdwpWritable)]
#[repr(u8)]
pub enum Value {
    /// a byte value (1 byte)
    Byte(i8) = Tag::Byte as u8,
    /// a character value (2 bytes)
    Char(u16) = Tag::Char as u8,
    /// a short value (2 bytes)
    Short(i16) = Tag::Short as u8,
    /// an int value (4 bytes)
    Int(i32) = Tag::Int as u8,
    /// a long value (8 bytes)
    Long(i64) = Tag::Long as u8,
    /// a float value (4 bytes)
    Float(f32) = Tag::Float as u8,
    /// a double value (8 bytes)
    Double(f64) = Tag::Double as u8,
    /// a boolean value (1 byte)
    Boolean(bool) = Tag::Boolean as u8,
    /// a void value (no bytes)
    Void = Tag::Void as u8,
    /// an object ([ObjectID] size)
    Object(ObjectID) = Tag::Object as u8,
    /// an array object
    Array(ObjectID) = Tag::Array as u8,
    /// a String object
    String(StringID) = Tag::String as u8,
    /// a Thread object
    Thread(ThreadID) = Tag::Thread as u8,
    /// a ThreadGroup object
    ThreadGroup(ObjectID) = Tag::ThreadGroup as u8,
    /// a ClassLoader object
    ClassLoader(ObjectID) = Tag::ClassLoader as u8,
    /// a class object object
    ClassObject(ObjectID) = Tag::ClassObject as u8,
}

impl Value {
    pub fn tag(&self) -> Tag {
        match self {
            Value::Byte(_) => Tag::Byte,
            Value::Char(_) => Tag::Char,
            Value::Short(_) => Tag::Short,
            Value::Int(_) => Tag::Int,
            Value::Long(_) => Tag::Long,
            Value::Float(_) => Tag::Float,
            Value::Double(_) => Tag::Double,
            Value::Boolean(_) => Tag::Boolean,
            Value::Void => Tag::Void,
            Value::Object(_) => Tag::Object,
            Value::Array(_) => Tag::Array,
            Value::String(_) => Tag::String,
            Value::Thread(_) => Tag::Thread,
            Value::ThreadGroup(_) => Tag::ThreadGroup,
            Value::ClassLoader(_) => Tag::ClassLoader,
            Value::ClassObject(_) => Tag::ClassObject,
        }
    }
}
