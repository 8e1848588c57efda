//! Ordered set of recorded columns.

use tracing::{debug, warn};

use crate::blocks::column_header::ColumnHeader;
use crate::blocks::common::TypeTag;
use crate::config::RecorderConfig;
use crate::error::Vb2Error;
use crate::probe::Probe;
use crate::writer::buffer::ColumnBuffer;

/// One registered variable: its header record, its probe and its staging buffer.
pub struct Column<'a> {
    header: ColumnHeader,
    width: u8,
    probe: Box<dyn Probe + 'a>,
    pub(crate) buffer: ColumnBuffer,
}

impl<'a> Column<'a> {
    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn unit(&self) -> &str {
        &self.header.unit
    }

    pub fn description(&self) -> &str {
        &self.header.description
    }

    pub fn type_tag(&self) -> TypeTag {
        self.header.type_tag
    }

    /// Bytes per sample.
    pub fn width(&self) -> usize {
        self.width as usize
    }

    /// Start of the column's data region; zero until a session starts.
    pub fn offset(&self) -> u64 {
        self.header.offset
    }

    /// Samples recorded in the current session.
    pub fn count(&self) -> u64 {
        self.header.count
    }

    pub fn header(&self) -> &ColumnHeader {
        &self.header
    }

    pub(crate) fn header_mut(&mut self) -> &mut ColumnHeader {
        &mut self.header
    }

    /// Stages the probe's current value. Returns `true` if the buffer must be flushed.
    pub(crate) fn sample(&mut self) -> Result<bool, Vb2Error> {
        let full = self.buffer.push(self.probe.as_ref(), self.width as usize)?;
        self.header.count += 1;
        Ok(full)
    }
}

pub struct Registry<'a> {
    columns: Vec<Column<'a>>,
    flush_threshold: usize,
    max_var_width: u8,
}

impl<'a> Registry<'a> {
    pub fn new(config: &RecorderConfig) -> Self {
        Registry {
            columns: Vec::new(),
            flush_threshold: config.flush_threshold(),
            max_var_width: config.max_var_width,
        }
    }

    /// Appends a column. Registration order is the on-disk column order.
    ///
    /// # Arguments
    /// * `width` - Bytes per sample, in `1..=max_var_width`, and equal to the probe's width
    /// * `probe` - Accessor the recorder reads on every tick
    pub fn push(
        &mut self,
        name: &str,
        unit: &str,
        description: &str,
        type_tag: TypeTag,
        probe: Box<dyn Probe + 'a>,
        width: usize,
    ) -> Result<usize, Vb2Error> {
        if name.is_empty() {
            return Err(Vb2Error::InvalidArgument("column name must not be empty".into()));
        }
        if width == 0 || width > self.max_var_width as usize {
            return Err(Vb2Error::InvalidArgument(format!(
                "width of '{}' must be in 1..={}, got {}",
                name, self.max_var_width, width
            )));
        }
        if probe.width() != width {
            return Err(Vb2Error::InvalidArgument(format!(
                "width of '{}' is {} but its probe yields {} bytes",
                name,
                width,
                probe.width()
            )));
        }
        if type_tag.natural_width() != width {
            warn!(column = name, tag = %type_tag, width, "type tag does not match sample width");
        }

        let buffer = ColumnBuffer::new(self.flush_threshold, self.max_var_width as usize)?;
        let index = self.columns.len();
        self.columns.push(Column {
            header: ColumnHeader::new(name, unit, description, type_tag),
            // bounded by max_var_width above
            width: width as u8,
            probe,
            buffer,
        });
        debug!(column = name, index, width, tag = %type_tag, "registered column");
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[Column<'a>] {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column<'a>] {
        &mut self.columns
    }

    pub fn widths(&self) -> impl ExactSizeIterator<Item = usize> + '_ {
        self.columns.iter().map(Column::width)
    }

    pub fn clear(&mut self) {
        self.columns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn push_validates_width() {
        let value = Cell::new(0u64);
        let mut registry = Registry::new(&RecorderConfig::default());
        let err = registry
            .push("v", "", "", TypeTag::Long, Box::new(&value), 9)
            .unwrap_err();
        assert!(matches!(err, Vb2Error::InvalidArgument(_)));
        let err = registry
            .push("v", "", "", TypeTag::Long, Box::new(&value), 4)
            .unwrap_err();
        assert!(matches!(err, Vb2Error::InvalidArgument(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn push_rejects_empty_name() {
        let value = Cell::new(0i32);
        let mut registry = Registry::new(&RecorderConfig::default());
        assert!(registry.push("", "", "", TypeTag::Int, Box::new(&value), 4).is_err());
    }

    #[test]
    fn columns_keep_registration_order() -> Result<(), Vb2Error> {
        let a = Cell::new(0i32);
        let b = Cell::new(0f64);
        let mut registry = Registry::new(&RecorderConfig::default());
        assert_eq!(registry.push("a", "", "", TypeTag::Int, Box::new(&a), 4)?, 0);
        assert_eq!(registry.push("b", "", "", TypeTag::Double, Box::new(&b), 8)?, 1);
        let names: Vec<_> = registry.columns().iter().map(Column::name).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(registry.widths().collect::<Vec<_>>(), [4, 8]);
        Ok(())
    }
}
