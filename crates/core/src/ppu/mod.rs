//! Reusable video-hardware building blocks shared by the system decoders.
//!
//! Each system crate layers its own register and memory-layout knowledge on
//! top of these palette and tile primitives.

pub mod palette;
pub mod tile;

pub use palette::{IndexedPalette, ResolvedPalette};
pub use tile::{TileDecoder, TileFormat};
