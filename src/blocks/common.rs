use std::fmt;
use std::str::FromStr;

use crate::error::Vb2Error;

/// Common behaviour of the fixed-size header records stored at the start of a VB2 file.
pub trait RecordParse: Sized {
    /// Serialized size of the record in bytes. Always a multiple of 8.
    const SIZE: usize;

    fn from_bytes(bytes: &[u8]) -> Result<Self, Vb2Error>;

    fn to_bytes(&self) -> Result<Vec<u8>, Vb2Error>;

    /// Ensures `bytes` can hold a whole record.
    fn check_len(bytes: &[u8]) -> Result<(), Vb2Error> {
        if bytes.len() < Self::SIZE {
            return Err(Vb2Error::TooShortBuffer {
                actual:   bytes.len(),
                expected: Self::SIZE,
                file:     file!(),
                line:     line!(),
            });
        }
        Ok(())
    }
}

/// Advisory type tag stored with each column.
///
/// The tag only describes how a reader should interpret the samples; the
/// registered byte width alone drives the file layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// `int`: 32-bit signed integer
    Int,
    /// `float`: 32-bit IEEE-754
    Float,
    /// `double`: 64-bit IEEE-754
    Double,
    /// `long`: 64-bit signed integer
    Long,
}

impl TypeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Double => "double",
            TypeTag::Long => "long",
        }
    }

    /// Width in bytes a reader expects for this tag.
    pub fn natural_width(&self) -> usize {
        match self {
            TypeTag::Int | TypeTag::Float => 4,
            TypeTag::Double | TypeTag::Long => 8,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = Vb2Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(TypeTag::Int),
            "float" => Ok(TypeTag::Float),
            "double" => Ok(TypeTag::Double),
            "long" => Ok(TypeTag::Long),
            other => Err(Vb2Error::InvalidArgument(format!("unknown type tag '{}'", other))),
        }
    }
}

/// Writes `text` into a zero-filled field of `len` bytes, truncating so that
/// at least one trailing NUL always remains.
pub fn write_fixed_str(buffer: &mut Vec<u8>, text: &str, len: usize) {
    let mut end = text.len().min(len - 1);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    buffer.extend_from_slice(&text.as_bytes()[..end]);
    buffer.resize(buffer.len() + (len - end), 0);
}

/// Reads a NUL-terminated string out of a fixed-size field.
pub fn read_fixed_str(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}
