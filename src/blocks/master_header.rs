use byteorder::{ByteOrder, LittleEndian};

use crate::blocks::common::RecordParse;
use crate::error::Vb2Error;

pub const MAGIC: [u8; 4] = *b"VB2\0";
pub const VERSION_MAJOR: u64 = 1;
pub const VERSION_MINOR: u64 = 0;
/// Combined format version as stored in the file (`major * 1000 + minor`).
pub const VERSION: u64 = VERSION_MAJOR * 1000 + VERSION_MINOR;

/// File-leading record describing the column count and the row capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterHeader {
    pub magic: [u8; 4],
    pub version: u64,
    pub column_count: u64,
    pub max_history: u64,
    pub reserved: [u64; 3],
}

impl MasterHeader {
    pub fn new(column_count: u64, max_history: u64) -> Self {
        MasterHeader {
            magic: MAGIC,
            version: VERSION,
            column_count,
            max_history,
            reserved: [0; 3],
        }
    }

    pub fn version_major(&self) -> u64 {
        self.version / 1000
    }
}

impl RecordParse for MasterHeader {
    const SIZE: usize = 56;

    /// Parse a `MasterHeader` from the first 56 bytes of a file.
    ///
    /// Fails if the magic does not read `VB2` or if the major version is not
    /// one this crate writes.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Vb2Error> {
        Self::check_len(bytes)?;

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        if magic != MAGIC {
            return Err(Vb2Error::FileIdentifierError(
                String::from_utf8_lossy(&magic).trim_end_matches('\0').to_string(),
            ));
        }

        let header = MasterHeader {
            magic,
            version: LittleEndian::read_u64(&bytes[8..16]),
            column_count: LittleEndian::read_u64(&bytes[16..24]),
            max_history: LittleEndian::read_u64(&bytes[24..32]),
            reserved: [
                LittleEndian::read_u64(&bytes[32..40]),
                LittleEndian::read_u64(&bytes[40..48]),
                LittleEndian::read_u64(&bytes[48..56]),
            ],
        };
        if header.version_major() != VERSION_MAJOR {
            return Err(Vb2Error::FileVersioningError(header.version));
        }
        Ok(header)
    }

    /// Serializes the header.
    ///
    /// # Structure (56 bytes total):
    /// - magic (4 bytes) followed by 4 bytes of zero padding
    /// - version, column_count, max_history (8 bytes each)
    /// - reserved (3 x 8 bytes)
    fn to_bytes(&self) -> Result<Vec<u8>, Vb2Error> {
        let mut buffer = Vec::with_capacity(Self::SIZE);
        buffer.extend_from_slice(&self.magic);
        buffer.extend_from_slice(&[0u8; 4]);
        buffer.extend_from_slice(&self.version.to_le_bytes());
        buffer.extend_from_slice(&self.column_count.to_le_bytes());
        buffer.extend_from_slice(&self.max_history.to_le_bytes());
        for word in &self.reserved {
            buffer.extend_from_slice(&word.to_le_bytes());
        }

        debug_assert_eq!(buffer.len(), Self::SIZE);
        debug_assert_eq!(buffer.len() % 8, 0, "MasterHeader size is not 8-byte aligned");
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_and_version_are_placed_at_fixed_offsets() {
        let bytes = MasterHeader::new(3, 100).to_bytes().unwrap();
        assert_eq!(bytes.len(), MasterHeader::SIZE);
        assert_eq!(&bytes[0..4], b"VB2\0");
        assert_eq!(&bytes[4..8], &[0, 0, 0, 0]);
        assert_eq!(LittleEndian::read_u64(&bytes[8..16]), 1000);
        assert_eq!(LittleEndian::read_u64(&bytes[16..24]), 3);
        assert_eq!(LittleEndian::read_u64(&bytes[24..32]), 100);
    }

    #[test]
    fn rejects_foreign_magic() {
        let mut bytes = MasterHeader::new(1, 1).to_bytes().unwrap();
        bytes[0..4].copy_from_slice(b"MDF ");
        assert!(matches!(
            MasterHeader::from_bytes(&bytes),
            Err(Vb2Error::FileIdentifierError(m)) if m == "MDF "
        ));
    }

    #[test]
    fn rejects_future_major_version() {
        let mut header = MasterHeader::new(1, 1);
        header.version = 2000;
        let bytes = header.to_bytes().unwrap();
        assert!(matches!(
            MasterHeader::from_bytes(&bytes),
            Err(Vb2Error::FileVersioningError(2000))
        ));
    }
}
