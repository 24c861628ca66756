//! Bevy engine integration
//!
//! This module contains all Bevy-related code: the scene state (star field,
//! orbit controller, model loader, animation driver), the frame loop,
//! components, resources, systems, plugins and application setup.

pub mod animation_driver;
pub mod app;
pub mod components;
pub mod frame_loop;
pub mod loader;
pub mod material;
pub mod orbit;
pub mod plugins;
pub mod resources;
pub mod star_field;
pub mod systems;

// Re-export commonly used items
pub use app::{start_bevy, BevyBridge};
