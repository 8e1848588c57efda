//! VB2 recording module for vb2-rs
//!
//! This module turns per-tick samples of registered variables into a fixed-size
//! VB2 file, staging each column in its own page buffer so that the file sees
//! a few large sequential writes instead of one small write per sample.

pub(crate) mod buffer;
pub mod session;
pub use session::{Session, SessionState, Tick};
