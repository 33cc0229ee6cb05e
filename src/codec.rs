use std::{
    borrow::Cow,
    io::{self, Cursor, Error, ErrorKind, Read, Write},
    ops::{Deref, DerefMut},
};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use paste::paste;

pub use jdwp_bridge_macros::{JdwpReadable, JdwpWritable};

/// Byte widths of the opaque identifiers used by a particular target VM.
///
/// They are fixed for the lifetime of a session, but differ between VMs, so
/// every reader and writer carries them around.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct IdSizes {
    pub field_id_size: u8,
    pub method_id_size: u8,
    pub object_id_size: u8,
    pub reference_type_id_size: u8,
    pub frame_id_size: u8,
}

impl Default for IdSizes {
    fn default() -> Self {
        Self {
            field_id_size: 8,
            method_id_size: 8,
            object_id_size: 8,
            reference_type_id_size: 8,
            frame_id_size: 8,
        }
    }
}

impl IdSizes {
    /// All identifiers share the same width.
    pub const fn uniform(size: u8) -> Self {
        Self {
            field_id_size: size,
            method_id_size: size,
            object_id_size: size,
            reference_type_id_size: size,
            frame_id_size: size,
        }
    }
}

#[derive(Debug)]
pub struct JdwpWriter<W: Write> {
    write: W,
    pub(crate) id_sizes: IdSizes,
}

impl<W: Write> JdwpWriter<W> {
    pub fn new(write: W, id_sizes: IdSizes) -> Self {
        Self { write, id_sizes }
    }
}

impl<W: Write> Deref for JdwpWriter<W> {
    type Target = W;

    fn deref(&self) -> &Self::Target {
        &self.write
    }
}

impl<W: Write> DerefMut for JdwpWriter<W> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.write
    }
}

#[derive(Debug)]
pub struct JdwpReader<R: Read> {
    read: R,
    pub(crate) id_sizes: IdSizes,
}

impl<R: Read> JdwpReader<R> {
    pub fn new(read: R, id_sizes: IdSizes) -> Self {
        Self { read, id_sizes }
    }
}

impl<R: Read> Deref for JdwpReader<R> {
    type Target = R;

    fn deref(&self) -> &Self::Target {
        &self.read
    }
}

impl<R: Read> DerefMut for JdwpReader<R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.read
    }
}

pub trait JdwpReadable: Sized {
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self>;
}

pub trait JdwpWritable {
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()>;
}

/// Encodes a value into a fresh buffer.
pub fn encode<T: JdwpWritable + ?Sized>(value: &T, id_sizes: IdSizes) -> io::Result<Vec<u8>> {
    let mut data = Vec::new();
    value.write(&mut JdwpWriter::new(&mut data, id_sizes))?;
    Ok(data)
}

/// Decodes a value from a payload.
///
/// Trailing bytes are tolerated, the VM is allowed to append fields in newer
/// protocol versions.
pub fn decode<T: JdwpReadable>(data: &[u8], id_sizes: IdSizes) -> io::Result<T> {
    let mut reader = JdwpReader::new(Cursor::new(data), id_sizes);
    let value = T::read(&mut reader)?;
    let consumed = reader.position() as usize;
    if consumed < data.len() {
        log::trace!("{} trailing bytes left after decoding", data.len() - consumed);
    }
    Ok(value)
}

impl JdwpReadable for () {
    #[inline]
    fn read<R: Read>(_: &mut JdwpReader<R>) -> io::Result<Self> {
        Ok(())
    }
}

impl JdwpWritable for () {
    #[inline]
    fn write<W: Write>(&self, _: &mut JdwpWriter<W>) -> io::Result<()> {
        Ok(())
    }
}

impl JdwpReadable for bool {
    #[inline]
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        read.read_u8().map(|n| n != 0)
    }
}

impl JdwpWritable for bool {
    #[inline]
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        write.write_u8(u8::from(*self))
    }
}

// single bytes have no endianness, so they are not part of the macro below

impl JdwpReadable for i8 {
    #[inline]
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        read.read_i8()
    }
}

impl JdwpWritable for i8 {
    #[inline]
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        write.write_i8(*self)
    }
}

impl JdwpReadable for u8 {
    #[inline]
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        read.read_u8()
    }
}

impl JdwpWritable for u8 {
    #[inline]
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        write.write_u8(*self)
    }
}

macro_rules! int_io {
    ($($types:ident),* $(,)?) => {
        $(
            impl JdwpReadable for $types {
                #[inline]
                fn read<R: Read>(reader: &mut JdwpReader<R>) -> io::Result<Self> {
                    paste! {
                        reader.[<read_ $types>]::<BigEndian>()
                    }
                }
            }

            impl JdwpWritable for $types {
                #[inline]
                fn write<W: Write>(&self, writer: &mut JdwpWriter<W>) -> io::Result<()> {
                    paste! {
                        writer.[<write_ $types>]::<BigEndian>(*self)
                    }
                }
            }
        )*
    };
}

int_io![i16, u16, i32, u32, i64, u64, f32, f64];

/// Strings are a 4-byte big-endian byte count followed by the bytes.
///
/// The VM is supposed to send UTF-8, but HotSpot emits Java's modified UTF-8
/// for nulls and supplementary characters, so that is accepted as well.
impl JdwpReadable for String {
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        let len = u32::read(read)?;
        // the length comes from the wire, let the data bound the allocation
        let mut bytes = Vec::new();
        read.by_ref().take(u64::from(len)).read_to_end(&mut bytes)?;
        if bytes.len() as u64 != u64::from(len) {
            return Err(Error::new(
                ErrorKind::UnexpectedEof,
                format!("string of {len} bytes cut short at {}", bytes.len()),
            ));
        }
        match String::from_utf8(bytes) {
            Ok(s) => Ok(s),
            Err(e) => cesu8::from_java_cesu8(e.as_bytes())
                .map(Cow::into_owned)
                .map_err(|_| Error::new(ErrorKind::InvalidData, "string is not valid UTF-8")),
        }
    }
}

impl JdwpWritable for String {
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        self.as_str().write(write)
    }
}

impl JdwpWritable for str {
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        (self.len() as u32).write(write)?;
        write.write_all(self.as_bytes())
    }
}

impl<T: JdwpReadable> JdwpReadable for Vec<T> {
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        let len = u32::read(read)?;
        // the count comes from the wire, don't trust it for preallocation
        let mut res = Vec::with_capacity(len.min(1024) as usize);
        for _ in 0..len {
            res.push(T::read(read)?);
        }
        Ok(res)
    }
}

impl<T: JdwpWritable> JdwpWritable for Vec<T> {
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        self.as_slice().write(write)
    }
}

impl<T: JdwpWritable> JdwpWritable for [T] {
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        (self.len() as u32).write(write)?;
        for item in self {
            item.write(write)?;
        }
        Ok(())
    }
}

impl<A: JdwpReadable, B: JdwpReadable> JdwpReadable for (A, B) {
    fn read<R: Read>(read: &mut JdwpReader<R>) -> io::Result<Self> {
        Ok((A::read(read)?, B::read(read)?))
    }
}

impl<A: JdwpWritable, B: JdwpWritable> JdwpWritable for (A, B) {
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        self.0.write(write)?;
        self.1.write(write)
    }
}

impl<T: JdwpWritable + ?Sized> JdwpWritable for &T {
    fn write<W: Write>(&self, write: &mut JdwpWriter<W>) -> io::Result<()> {
        (**self).write(write)
    }
}
