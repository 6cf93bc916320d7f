//! Command-line frontend: system registry, snapshot directories, PNG files
//! and settings around the decoding pipeline.

pub mod commands;
pub mod image_io;
pub mod registry;
pub mod settings;
pub mod snapshot_dir;

pub use registry::{lookup, SystemAdapter};
pub use settings::Settings;
