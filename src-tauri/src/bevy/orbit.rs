//! Orbit camera controller
//!
//! Spherical-coordinate camera around a fixed target. Input accumulates into
//! pending rotation deltas and a dolly scale; [`OrbitController::update`]
//! applies a damped fraction of the rotation each tick, clamps the result and
//! yields the new camera pose.

use bevy::prelude::*;
use std::f32::consts::TAU;

use crate::config::camera::*;

/// Bounds and tuning of the orbit controller
#[derive(Debug, Clone, Copy)]
pub struct OrbitSettings {
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            min_distance: MIN_DISTANCE,
            max_distance: MAX_DISTANCE,
            min_polar_angle: MIN_POLAR_ANGLE,
            max_polar_angle: MAX_POLAR_ANGLE,
            damping_factor: DAMPING_FACTOR,
            rotate_speed: ROTATE_SPEED,
            zoom_speed: ZOOM_SPEED,
        }
    }
}

/// Orbit camera state
#[derive(Resource, Debug, Clone)]
pub struct OrbitController {
    pub target: Vec3,
    /// Distance from the target
    pub radius: f32,
    /// Polar angle from +Y (radians)
    pub phi: f32,
    /// Azimuth around +Y, measured from +Z toward +X (radians)
    pub theta: f32,
    pending_theta: f32,
    pending_phi: f32,
    pending_scale: f32,
    pub settings: OrbitSettings,
}

impl OrbitController {
    /// Controller looking from `position` at `target`
    pub fn new(position: Vec3, target: Vec3, settings: OrbitSettings) -> Self {
        let offset = position - target;
        let radius = offset.length();
        let (phi, theta) = if radius > 0.0 {
            (
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
                offset.x.atan2(offset.z),
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            target,
            radius,
            phi,
            theta,
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_scale: 1.0,
            settings,
        }
    }

    /// Map a pointer drag (in pixels) over a viewport of `viewport_height`
    /// pixels to pending rotation; a full-height drag turns a full circle
    pub fn rotate_by_pointer(&mut self, delta: Vec2, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        let speed = TAU * self.settings.rotate_speed / viewport_height;
        self.pending_theta -= delta.x * speed;
        self.pending_phi -= delta.y * speed;
    }

    /// Positive `scroll` moves the camera away from the target
    pub fn dolly(&mut self, scroll: f32) {
        self.pending_scale *= 0.95_f32.powf(-scroll * self.settings.zoom_speed);
    }

    /// Apply damped rotation and pending dolly, clamp to bounds
    pub fn update(&mut self) {
        let damping = self.settings.damping_factor;

        self.theta += self.pending_theta * damping;
        self.phi += self.pending_phi * damping;
        self.phi = self
            .phi
            .clamp(self.settings.min_polar_angle, self.settings.max_polar_angle);

        self.radius = (self.radius * self.pending_scale)
            .clamp(self.settings.min_distance, self.settings.max_distance);

        self.pending_theta *= 1.0 - damping;
        self.pending_phi *= 1.0 - damping;
        self.pending_scale = 1.0;
    }

    /// Camera position for the current spherical coordinates
    pub fn position(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        self.target
            + Vec3::new(
                self.radius * sin_phi * self.theta.sin(),
                self.radius * self.phi.cos(),
                self.radius * sin_phi * self.theta.cos(),
            )
    }

    /// Camera transform looking at the target
    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position()).looking_at(self.target, Vec3::Y)
    }

    /// Rotation still to be applied by future updates
    pub fn pending_rotation(&self) -> Vec2 {
        Vec2::new(self.pending_theta, self.pending_phi)
    }
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::new(
            Vec3::from_array(START_POSITION),
            Vec3::from_array(TARGET),
            OrbitSettings::default(),
        )
    }
}
