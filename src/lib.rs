pub mod blocks;
pub mod config;
pub mod error;
pub mod probe;
pub mod registry;
pub mod writer;

pub use blocks::common::TypeTag;
pub use config::{FlushPolicy, RecorderConfig};
pub use error::Vb2Error;
pub use probe::{probe_fn, Probe, Scalar, TypedProbe};
pub use writer::{Session, SessionState, Tick};
