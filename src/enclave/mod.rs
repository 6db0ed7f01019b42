//! Enclave build configuration helpers.

pub mod heap_config;

pub use heap_config::{HeapConfigError, parse_heap_size, set_heap};
