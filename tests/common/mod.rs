//! Decoding helpers shared by the integration tests.
#![allow(dead_code)]

use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use vb2_rs::blocks::column_header::ColumnHeader;
use vb2_rs::blocks::common::RecordParse;
use vb2_rs::blocks::master_header::MasterHeader;
use vb2_rs::error::Vb2Error;

/// A VB2 file loaded fully into memory.
pub struct Vb2File {
    pub bytes: Vec<u8>,
    pub master: MasterHeader,
    pub columns: Vec<ColumnHeader>,
}

impl Vb2File {
    pub fn read(path: &Path) -> Result<Self, Vb2Error> {
        let bytes = std::fs::read(path)?;
        let master = MasterHeader::from_bytes(&bytes)?;
        let mut columns = Vec::with_capacity(master.column_count as usize);
        for i in 0..master.column_count as usize {
            let start = MasterHeader::SIZE + i * ColumnHeader::SIZE;
            columns.push(ColumnHeader::from_bytes(&bytes[start..])?);
        }
        Ok(Self { bytes, master, columns })
    }

    pub fn column(&self, name: &str) -> &ColumnHeader {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("no column named {}", name))
    }

    /// The whole data region of a column: `width * max_history` bytes.
    pub fn region(&self, name: &str, width: usize) -> &[u8] {
        let start = self.column(name).offset as usize;
        &self.bytes[start..start + width * self.master.max_history as usize]
    }

    /// The recorded samples of a column, as reported by its header count.
    pub fn samples(&self, name: &str, width: usize) -> &[u8] {
        let header = self.column(name);
        &self.region(name, width)[..width * header.count as usize]
    }

    pub fn i32s(&self, name: &str) -> Vec<i32> {
        self.samples(name, 4).chunks_exact(4).map(LittleEndian::read_i32).collect()
    }

    pub fn f64s(&self, name: &str) -> Vec<f64> {
        self.samples(name, 8).chunks_exact(8).map(LittleEndian::read_f64).collect()
    }

    pub fn u16s(&self, name: &str) -> Vec<u16> {
        self.samples(name, 2).chunks_exact(2).map(LittleEndian::read_u16).collect()
    }
}
