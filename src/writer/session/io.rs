// File lifecycle of a Session: open, header I/O, sizing, end and close
use super::*;
use std::io::{Seek, SeekFrom, Write};

use tracing::debug;

use crate::blocks::column_header::ColumnHeader;
use crate::blocks::common::RecordParse;
use crate::blocks::master_header::MasterHeader;

impl<'a> Session<'a> {
    /// Creates (or truncates) the output file.
    ///
    /// Allowed while closed, open or ended. Reopening keeps the registered
    /// columns, so one registry can record into several files in turn.
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Vb2Error> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Vb2Error::InvalidArgument("file path must not be empty".into()));
        }
        if self.state == SessionState::Armed {
            return Err(Vb2Error::PreconditionViolation(
                "cannot open a new file while a session is recording".into(),
            ));
        }

        self.file = None;
        self.path = None;
        self.state = SessionState::Closed;
        let file = File::create(path)?;
        debug!(path = %path.display(), "opened recording file");
        self.file = Some(file);
        self.path = Some(path.to_path_buf());
        self.state = SessionState::Open;
        Ok(())
    }

    /// Freezes the column layout and prepares the file for `max_history` rows.
    ///
    /// Writes the master and column headers, then sizes the file to its final
    /// length. The data regions are zeroed, so nothing from an earlier session
    /// on the same file survives. If sizing fails the file is released and the
    /// session is closed; a new `open` is required.
    pub fn start(&mut self, max_history: u64) -> Result<(), Vb2Error> {
        if !matches!(self.state, SessionState::Open | SessionState::Ended) {
            return Err(Vb2Error::PreconditionViolation(format!(
                "start requires an open file, session is {:?}",
                self.state
            )));
        }
        if self.registry.is_empty() {
            return Err(Vb2Error::PreconditionViolation(
                "start requires at least one registered column".into(),
            ));
        }

        let layout = ColumnLayout::compute(self.registry.widths(), max_history)?;
        for (column, &offset) in self.registry.columns_mut().iter_mut().zip(&layout.offsets) {
            let header = column.header_mut();
            header.offset = offset;
            header.count = 0;
            column.buffer.reset(offset);
        }
        self.max_history = max_history;
        self.current_row = 0;
        self.poisoned = false;
        debug!(
            columns = self.registry.len(),
            max_history,
            file_size = layout.file_size,
            "laid out columns"
        );

        self.write_headers()?;
        if let Err(e) = self.resize(&layout) {
            warn!(error = %e, size = layout.file_size, "failed to size recording file, closing it");
            self.file = None;
            self.path = None;
            self.state = SessionState::Closed;
            return Err(e);
        }

        self.layout = Some(layout);
        self.state = SessionState::Armed;
        Ok(())
    }

    /// Finishes the running session.
    ///
    /// Flushes every partially filled buffer, rewrites the column headers with
    /// their final sample counts and rewinds all write cursors, leaving the
    /// file and registry ready for another `start`. After a failed tick the
    /// per-column counts written here may differ by one.
    pub fn end(&mut self) -> Result<(), Vb2Error> {
        if self.state != SessionState::Armed {
            return Err(Vb2Error::PreconditionViolation(format!(
                "end requires a recording session, session is {:?}",
                self.state
            )));
        }

        self.flush_all()?;
        self.rewrite_counts()?;
        self.file_mut()?.flush()?;
        debug!(rows = self.current_row, max_history = self.max_history, "ended session");

        for column in self.registry.columns_mut() {
            let offset = column.offset();
            column.buffer.reset(offset);
        }
        self.current_row = 0;
        self.poisoned = false;
        self.state = SessionState::Ended;
        Ok(())
    }

    /// Releases the file and every registered column. Valid in any state.
    ///
    /// Closing an armed session does not flush it; call [`Session::end`] first.
    pub fn close(&mut self) -> Result<(), Vb2Error> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
        }
        self.registry.clear();
        self.path = None;
        self.layout = None;
        self.max_history = 0;
        self.current_row = 0;
        self.poisoned = false;
        self.state = SessionState::Closed;
        debug!("closed session");
        Ok(())
    }

    pub(super) fn file_mut(&mut self) -> Result<&mut File, Vb2Error> {
        self.file
            .as_mut()
            .ok_or_else(|| Vb2Error::PreconditionViolation("no file is open".into()))
    }

    /// Serializes the master header followed by every column header at position 0.
    fn write_headers(&mut self) -> Result<(), Vb2Error> {
        let master = MasterHeader::new(self.registry.len() as u64, self.max_history);
        let mut bytes = master.to_bytes()?;
        bytes.extend_from_slice(&self.column_header_bytes()?);

        let file = self.file_mut()?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&bytes)?;
        Ok(())
    }

    /// Rewrites the column header records in place; the master header is untouched.
    fn rewrite_counts(&mut self) -> Result<(), Vb2Error> {
        let bytes = self.column_header_bytes()?;
        let file = self.file_mut()?;
        file.seek(SeekFrom::Start(MasterHeader::SIZE as u64))?;
        file.write_all(&bytes)?;
        Ok(())
    }

    fn column_header_bytes(&self) -> Result<Vec<u8>, Vb2Error> {
        let mut bytes = Vec::with_capacity(self.registry.len() * ColumnHeader::SIZE);
        for column in self.registry.columns() {
            bytes.extend_from_slice(&column.header().to_bytes()?);
        }
        Ok(bytes)
    }

    /// Cuts the file back to the header region, then extends it with zeros to
    /// its final size.
    fn resize(&mut self, layout: &ColumnLayout) -> Result<(), Vb2Error> {
        let file = self.file_mut()?;
        file.set_len(layout.header_region_size)?;
        file.set_len(layout.file_size)?;
        Ok(())
    }
}
