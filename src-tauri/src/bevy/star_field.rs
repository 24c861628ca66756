//! Star field store
//!
//! A fixed buffer of point positions that drifts leftward every tick and
//! wraps back to the right edge of the bounds.

use bevy::prelude::*;
use rand::Rng;

/// Positions of every star; allocated once, mutated in place
#[derive(Resource, Debug, Clone)]
pub struct StarField {
    positions: Vec<[f32; 3]>,
    bounds_min: f32,
    bounds_max: f32,
}

impl StarField {
    /// Allocate `count` stars uniformly distributed in `[bounds_min, bounds_max)`
    /// on each axis
    pub fn initialize(count: usize, bounds_min: f32, bounds_max: f32, rng: &mut impl Rng) -> Self {
        let positions = (0..count)
            .map(|_| {
                [
                    rng.random_range(bounds_min..bounds_max),
                    rng.random_range(bounds_min..bounds_max),
                    rng.random_range(bounds_min..bounds_max),
                ]
            })
            .collect();

        Self {
            positions,
            bounds_min,
            bounds_max,
        }
    }

    /// Build a field from explicit positions
    pub fn from_positions(positions: Vec<[f32; 3]>, bounds_min: f32, bounds_max: f32) -> Self {
        Self {
            positions,
            bounds_min,
            bounds_max,
        }
    }

    /// Move every star `step` to the left; a star that falls below the lower
    /// bound is reset to exactly the upper bound
    pub fn advance(&mut self, step: f32) {
        for position in &mut self.positions {
            let x = position[0] - step;
            position[0] = if x < self.bounds_min { self.bounds_max } else { x };
        }
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
