//! Recording session: owns the output file, the registry and the row counter.

use std::cell::Cell;
use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::blocks::common::TypeTag;
use crate::blocks::layout::ColumnLayout;
use crate::config::RecorderConfig;
use crate::error::Vb2Error;
use crate::probe::{Probe, Scalar, TypedProbe};
use crate::registry::{Column, Registry};

mod data;
mod io;

/// Lifecycle state of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No file handle.
    Closed,
    /// File created, columns may be registered.
    Open,
    /// Layout frozen, accepting `record_all`.
    Armed,
    /// Finished a recording; behaves like `Open` except that registration stays locked.
    Ended,
}

/// Outcome of one [`Session::record_all`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Every column got a sample for the given row (0-based).
    Recorded(u64),
    /// The session already holds `max_history` rows; nothing was recorded.
    Saturated { max_history: u64 },
}

impl Tick {
    pub fn is_saturated(&self) -> bool {
        matches!(self, Tick::Saturated { .. })
    }

    /// Turns saturation into [`Vb2Error::CapacityExceeded`].
    pub fn into_result(self) -> Result<u64, Vb2Error> {
        match self {
            Tick::Recorded(row) => Ok(row),
            Tick::Saturated { max_history } => Err(Vb2Error::CapacityExceeded { max_history }),
        }
    }
}

/// Telemetry recorder writing one VB2 file per session.
///
/// Variables are tracked through borrowed [`Probe`]s, so a `Session<'a>` cannot
/// outlive them. The session is neither `Send` nor `Sync`; every operation
/// takes `&mut self`, which makes it the single owner of its file.
///
/// Header sample counts are only written by [`Session::end`]. A session that
/// is dropped while armed leaves its data regions partially written and its
/// header counts at zero.
pub struct Session<'a> {
    config: RecorderConfig,
    state: SessionState,
    path: Option<PathBuf>,
    file: Option<File>,
    registry: Registry<'a>,
    layout: Option<ColumnLayout>,
    max_history: u64,
    current_row: u64,
    /// Set when a tick failed after some columns were already sampled.
    poisoned: bool,
}

impl<'a> Session<'a> {
    /// Creates a closed session with the default configuration.
    pub fn new() -> Self {
        Self::build(RecorderConfig::default())
    }

    pub fn with_config(config: RecorderConfig) -> Result<Self, Vb2Error> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: RecorderConfig) -> Self {
        Session {
            registry: Registry::new(&config),
            config,
            state: SessionState::Closed,
            path: None,
            file: None,
            layout: None,
            max_history: 0,
            current_row: 0,
            poisoned: false,
        }
    }

    /// Registers a variable to record.
    ///
    /// # Arguments
    /// * `name` - Column name, non-empty; truncated to 255 bytes in the file
    /// * `unit` / `description` - Free text, truncated to 31 / 511 bytes
    /// * `type_tag` - How readers should interpret the samples
    /// * `probe` - Accessor read on every tick, borrowed for the session's lifetime
    /// * `width` - Bytes per sample; must match the probe
    ///
    /// # Returns
    /// The column index, which is also its position in the file.
    pub fn register<P>(
        &mut self,
        name: &str,
        unit: &str,
        description: &str,
        type_tag: TypeTag,
        probe: P,
        width: usize,
    ) -> Result<usize, Vb2Error>
    where
        P: Probe + 'a,
    {
        if matches!(self.state, SessionState::Armed | SessionState::Ended) {
            return Err(Vb2Error::PreconditionViolation(format!(
                "cannot register '{}': the column layout is frozen",
                name
            )));
        }
        self.registry.push(name, unit, description, type_tag, Box::new(probe), width)
    }

    /// Registers a variable whose type tag and width follow from its Rust type.
    pub fn track<P>(&mut self, name: &str, unit: &str, description: &str, probe: P) -> Result<usize, Vb2Error>
    where
        P: TypedProbe + 'a,
    {
        let width = probe.width();
        self.register(name, unit, description, P::TAG, probe, width)
    }

    /// Shorthand for tracking a `Cell`, the usual way to share a plain variable.
    pub fn track_cell<T>(&mut self, name: &str, unit: &str, description: &str, cell: &'a Cell<T>) -> Result<usize, Vb2Error>
    where
        T: Scalar + 'a,
    {
        self.track(name, unit, description, cell)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn columns(&self) -> &[Column<'a>] {
        self.registry.columns()
    }

    pub fn column_count(&self) -> usize {
        self.registry.len()
    }

    /// Row capacity of the running (or last) session.
    pub fn max_history(&self) -> u64 {
        self.max_history
    }

    /// Rows recorded so far in the running session.
    pub fn current_row(&self) -> u64 {
        self.current_row
    }

    /// Layout frozen by the last successful `start`.
    pub fn layout(&self) -> Option<&ColumnLayout> {
        self.layout.as_ref()
    }

    /// File size `start(max_history)` would produce for the registered columns.
    pub fn file_size_for(&self, max_history: u64) -> Result<u64, Vb2Error> {
        Ok(ColumnLayout::compute(self.registry.widths(), max_history)?.file_size)
    }
}

impl Default for Session<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if self.state == SessionState::Armed {
            warn!(
                rows = self.current_row,
                "session dropped without end(); header sample counts are stale"
            );
        }
    }
}
