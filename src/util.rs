//! Shared utility modules used across wordstat components.

pub mod atomic_file;
pub mod cancel;
