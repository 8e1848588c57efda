// src/blocks/mod.rs
pub mod common;
pub mod master_header;
pub mod column_header;
pub mod layout;
