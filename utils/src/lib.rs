//! Shared infrastructure utilities for EventHorizon.
//!
//! - **`atomic_write`**: crash-safe file persistence (temp + rename), used for
//!   the config file and run exports.

pub mod atomic_write;

pub use atomic_write::{
    AtomicWriteOptions, ExistingFile, FileSyncPolicy, atomic_write, atomic_write_with_options,
    ensure_parent_dir, recover_bak_file,
};
