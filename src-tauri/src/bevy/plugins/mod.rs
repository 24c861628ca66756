//! Bevy plugins
//!
//! This module contains custom Bevy plugins that extend the engine's
//! functionality for our specific use case.

pub mod frame_copy;

pub use frame_copy::FrameCopyPlugin;
