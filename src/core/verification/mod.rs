//! Integrity checks for exported payloads

pub mod checksum;

pub use checksum::calculate_checksum;
