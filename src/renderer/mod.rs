//! Rendering module
//!
//! The simulation is captured into a [`FrameSnapshot`] each frame; painters
//! only ever read snapshots, never the world.

pub mod snapshot;

pub use snapshot::{DrawItem, FrameSnapshot, Hud, Layer, SCREEN_FLASH_OPACITY, Shape, puff_offsets, rgba};
