//! Placement of the column data regions behind the header region.

use crate::blocks::column_header::ColumnHeader;
use crate::blocks::common::RecordParse;
use crate::blocks::master_header::MasterHeader;
use crate::error::Vb2Error;

/// Size of the master header plus `column_count` column headers.
pub fn header_region_size(column_count: usize) -> u64 {
    (MasterHeader::SIZE + column_count * ColumnHeader::SIZE) as u64
}

/// Frozen byte layout of one recording session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub header_region_size: u64,
    /// Start offset of each column's data region, in registration order.
    pub offsets: Vec<u64>,
    /// Total file size: header region plus every data region.
    pub file_size: u64,
}

impl ColumnLayout {
    /// Lays out one region of `width * max_history` bytes per column,
    /// back to back, starting right after the header region.
    pub fn compute<I>(widths: I, max_history: u64) -> Result<Self, Vb2Error>
    where
        I: IntoIterator<Item = usize>,
        I::IntoIter: ExactSizeIterator,
    {
        let widths = widths.into_iter();
        let header_region_size = header_region_size(widths.len());
        let mut offsets = Vec::with_capacity(widths.len());
        let mut offset = header_region_size;
        for width in widths {
            offsets.push(offset);
            offset = (width as u64)
                .checked_mul(max_history)
                .and_then(|region| offset.checked_add(region))
                .ok_or_else(|| {
                    Vb2Error::InvalidArgument(format!(
                        "max_history {} does not fit in a 64-bit file size",
                        max_history
                    ))
                })?;
        }
        Ok(Self { header_region_size, offsets, file_size: offset })
    }
}
