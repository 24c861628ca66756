//! Bevy component definitions
//!
//! This module contains all component markers used to tag and identify
//! entities in the Bevy ECS (Entity Component System).

use bevy::prelude::*;

/// Marker component for the offscreen rendering camera
///
/// Entities with this component are cameras that render to an offscreen
/// texture instead of a window.
#[derive(Component)]
pub struct OffscreenCamera;

/// Marker component for cameras driven by the orbit controller
#[derive(Component)]
pub struct OrbitCamera;

/// Marker component for the star field point cloud
#[derive(Component)]
pub struct StarPoints;

/// Marker component for the root of the loaded solar system model
#[derive(Component)]
pub struct SolarSystemModel;
