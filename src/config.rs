//! Recorder tuning knobs.
//!
//! The defaults reproduce the classic VB2 writer: one 4 KiB page of staging per
//! column and scalars of at most 8 bytes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Vb2Error;

pub const DEFAULT_PAGE_SIZE: usize = 0x1000;
pub const DEFAULT_MAX_VAR_WIDTH: u8 = 8;
/// Largest accepted `page_size`; every column allocates one page up front.
pub const MAX_PAGE_SIZE: usize = 1 << 30;

/// When a column's staging buffer is written to the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushPolicy {
    /// Stage samples until a page is full, then write the page in one call.
    #[default]
    Paged,
    /// Seek and write after every sample. Only worth it for very short
    /// histories or very wide rows.
    PerSample,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Nominal staging capacity of each column buffer, in bytes.
    pub page_size: usize,
    /// Largest accepted variable width, in bytes.
    pub max_var_width: u8,
    pub flush_policy: FlushPolicy,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        RecorderConfig {
            page_size: DEFAULT_PAGE_SIZE,
            max_var_width: DEFAULT_MAX_VAR_WIDTH,
            flush_policy: FlushPolicy::default(),
        }
    }
}

impl RecorderConfig {
    /// Parses a JSON document; missing fields take their default value.
    pub fn from_json_str(json: &str) -> Result<Self, Vb2Error> {
        let config: RecorderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, Vb2Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), Vb2Error> {
        if self.page_size == 0 {
            return Err(Vb2Error::InvalidArgument("page_size must be greater than zero".into()));
        }
        if self.page_size > MAX_PAGE_SIZE {
            return Err(Vb2Error::InvalidArgument(format!(
                "page_size must be at most {} bytes, got {}",
                MAX_PAGE_SIZE, self.page_size
            )));
        }
        if self.max_var_width == 0 {
            return Err(Vb2Error::InvalidArgument("max_var_width must be greater than zero".into()));
        }
        Ok(())
    }

    /// Fill level at which a column buffer gets written out.
    pub(crate) fn flush_threshold(&self) -> usize {
        match self.flush_policy {
            FlushPolicy::Paged => self.page_size,
            FlushPolicy::PerSample => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = RecorderConfig::from_json_str(r#"{ "flush_policy": "per_sample" }"#).unwrap();
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.max_var_width, DEFAULT_MAX_VAR_WIDTH);
        assert_eq!(config.flush_policy, FlushPolicy::PerSample);
        assert_eq!(config.flush_threshold(), 1);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = RecorderConfig::from_json_str(r#"{ "page_size": 0 }"#).unwrap_err();
        assert!(matches!(err, Vb2Error::InvalidArgument(_)));
    }

    #[test]
    fn oversized_page_is_rejected() {
        let config = RecorderConfig { page_size: usize::MAX, ..Default::default() };
        assert!(matches!(config.validate(), Err(Vb2Error::InvalidArgument(_))));

        let json = format!(r#"{{ "page_size": {} }}"#, MAX_PAGE_SIZE + 1);
        let err = RecorderConfig::from_json_str(&json).unwrap_err();
        assert!(matches!(err, Vb2Error::InvalidArgument(_)));

        let largest = RecorderConfig { page_size: MAX_PAGE_SIZE, ..Default::default() };
        assert!(largest.validate().is_ok());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = RecorderConfig::from_json_str("{ page_size: ").unwrap_err();
        assert!(matches!(err, Vb2Error::ConfigError(_)));
    }
}
