use byteorder::{ByteOrder, LittleEndian};

use crate::blocks::common::{read_fixed_str, write_fixed_str, RecordParse, TypeTag};
use crate::error::Vb2Error;

pub const NAME_LEN: usize = 256;
pub const UNIT_LEN: usize = 32;
pub const DESCRIPTION_LEN: usize = 512;
pub const TYPE_LEN: usize = 16;

const UNIT_START: usize = NAME_LEN;
const DESCRIPTION_START: usize = UNIT_START + UNIT_LEN;
const TYPE_START: usize = DESCRIPTION_START + DESCRIPTION_LEN;
const OFFSET_START: usize = TYPE_START + TYPE_LEN;
const COUNT_START: usize = OFFSET_START + 8;

/// Per-column header record: descriptive metadata plus the position and
/// sample count of the column's data region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHeader {
    pub name: String,
    pub unit: String,
    pub description: String,
    pub type_tag: TypeTag,
    /// Absolute file offset of the first sample.
    pub offset: u64,
    /// Number of samples written. Only authoritative after a clean session end.
    pub count: u64,
}

impl ColumnHeader {
    pub fn new(name: &str, unit: &str, description: &str, type_tag: TypeTag) -> Self {
        ColumnHeader {
            name: name.to_string(),
            unit: unit.to_string(),
            description: description.to_string(),
            type_tag,
            offset: 0,
            count: 0,
        }
    }
}

impl RecordParse for ColumnHeader {
    const SIZE: usize = COUNT_START + 8;

    fn from_bytes(bytes: &[u8]) -> Result<Self, Vb2Error> {
        Self::check_len(bytes)?;

        Ok(Self {
            name: read_fixed_str(&bytes[0..UNIT_START]),
            unit: read_fixed_str(&bytes[UNIT_START..DESCRIPTION_START]),
            description: read_fixed_str(&bytes[DESCRIPTION_START..TYPE_START]),
            type_tag: read_fixed_str(&bytes[TYPE_START..OFFSET_START]).parse()?,
            offset: LittleEndian::read_u64(&bytes[OFFSET_START..COUNT_START]),
            count: LittleEndian::read_u64(&bytes[COUNT_START..Self::SIZE]),
        })
    }

    /// Serializes the header.
    ///
    /// # Structure (832 bytes total):
    /// - name (256), unit (32), description (512), type (16): NUL-padded text
    /// - offset (8 bytes)
    /// - count (8 bytes)
    fn to_bytes(&self) -> Result<Vec<u8>, Vb2Error> {
        let mut buffer = Vec::with_capacity(Self::SIZE);
        write_fixed_str(&mut buffer, &self.name, NAME_LEN);
        write_fixed_str(&mut buffer, &self.unit, UNIT_LEN);
        write_fixed_str(&mut buffer, &self.description, DESCRIPTION_LEN);
        write_fixed_str(&mut buffer, self.type_tag.as_str(), TYPE_LEN);
        buffer.extend_from_slice(&self.offset.to_le_bytes());
        buffer.extend_from_slice(&self.count.to_le_bytes());

        if buffer.len() != Self::SIZE {
            return Err(Vb2Error::InvalidArgument(format!(
                "ColumnHeader must be exactly {} bytes, got {}",
                Self::SIZE,
                buffer.len()
            )));
        }
        debug_assert_eq!(buffer.len() % 8, 0, "ColumnHeader size is not 8-byte aligned");
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_832_bytes() {
        assert_eq!(ColumnHeader::SIZE, 832);
    }

    #[test]
    fn long_name_is_truncated_to_field() {
        let header = ColumnHeader::new(&"x".repeat(300), "m", "", TypeTag::Double);
        let bytes = header.to_bytes().unwrap();
        assert_eq!(bytes[NAME_LEN - 1], 0);
        let parsed = ColumnHeader::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.name.len(), NAME_LEN - 1);
        assert_eq!(parsed.unit, "m");
        assert_eq!(parsed.type_tag, TypeTag::Double);
    }

    #[test]
    fn offset_and_count_follow_the_text_fields() {
        let mut header = ColumnHeader::new("a", "", "", TypeTag::Int);
        header.offset = 0x1122;
        header.count = 7;
        let bytes = header.to_bytes().unwrap();
        assert_eq!(&bytes[816..824], &0x1122u64.to_le_bytes());
        assert_eq!(&bytes[824..832], &7u64.to_le_bytes());
        assert_eq!(&bytes[TYPE_START..TYPE_START + 4], b"int\0");
    }

    #[test]
    fn short_buffer_is_reported() {
        let err = ColumnHeader::from_bytes(&[0u8; 100]).unwrap_err();
        assert!(matches!(err, Vb2Error::TooShortBuffer { actual: 100, expected: 832, .. }));
    }
}
