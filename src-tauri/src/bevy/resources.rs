//! Bevy resource definitions
//!
//! This module contains the global resources that bridge Bevy systems to the
//! Tauri side and to the render world. The scene state proper (star field,
//! orbit controller, load tracker, animation driver) lives in its own module.

use bevy::prelude::*;
use crossbeam_channel::{Receiver, Sender};
use std::time::{Duration, Instant};

use crate::bevy::plugins::frame_copy::RawFrame;
use crate::tauri_bridge::shared_state::{
    SharedFrameBuffer, SharedLoadStatus, SharedPerfStats, SharedPointerInput,
    SharedViewport, ViewerNotice,
};

// =============================================================================
// Bridge State
// =============================================================================

/// Pointer input written by the frontend
#[derive(Resource)]
pub struct PointerInputRes(pub SharedPointerInput);

/// Viewport size and pending resize requests
#[derive(Resource)]
pub struct ViewportRes(pub SharedViewport);

/// Model load status readable by the frontend
#[derive(Resource)]
pub struct LoadStatusRes(pub SharedLoadStatus);

/// Outgoing notices to the webview
#[derive(Resource, Deref)]
pub struct NoticeSender(pub Sender<ViewerNotice>);

// =============================================================================
// Rendering
// =============================================================================

/// Handle to the offscreen render target texture
#[derive(Resource)]
pub struct RenderTargetHandle(pub Handle<Image>);

/// Handle to the point-list mesh mirroring the star field
#[derive(Resource)]
pub struct StarFieldMesh(pub Handle<Mesh>);

/// Shared frame buffer resource for Bevy
#[derive(Resource, Clone)]
pub struct FrameBufferRes(pub SharedFrameBuffer);

// =============================================================================
// Frame Management
// =============================================================================

/// Counter for total frames published
#[derive(Resource, Default)]
pub struct FrameCount(pub u32);

/// Number of pre-roll frames to skip before starting output
#[derive(Resource, Default)]
pub struct PreRollFrames(pub u32);

/// Frame rate limiter to control output FPS
#[derive(Resource)]
pub struct FrameRateLimiter {
    pub last_frame_time: Instant,
    pub min_frame_interval: Duration,
}

impl FrameRateLimiter {
    pub fn new(target_fps: f64) -> Self {
        Self {
            last_frame_time: Instant::now(),
            min_frame_interval: Duration::from_secs_f64(1.0 / target_fps),
        }
    }

    /// True when enough time has passed since the last accepted frame
    pub fn accept(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last_frame_time) < self.min_frame_interval {
            return false;
        }
        self.last_frame_time = now;
        true
    }
}

// =============================================================================
// Performance Monitoring
// =============================================================================

/// Performance timing tracker for frame processing
#[derive(Resource, Default)]
pub struct FrameTimings {
    pub last_print_time: f64,
    pub frame_times: Vec<f64>,
}

impl FrameTimings {
    /// Record one sample, keeping only the last `capacity`
    pub fn push(&mut self, sample_ms: f64, capacity: usize) {
        self.frame_times.push(sample_ms);
        if self.frame_times.len() > capacity {
            let excess = self.frame_times.len() - capacity;
            self.frame_times.drain(..excess);
        }
    }

    pub fn average(&self) -> Option<f64> {
        if self.frame_times.is_empty() {
            return None;
        }
        Some(self.frame_times.iter().sum::<f64>() / self.frame_times.len() as f64)
    }
}

/// Shared performance statistics resource
#[derive(Resource)]
pub struct PerfStatsRes(pub SharedPerfStats);

// =============================================================================
// Channel Communication (Main World <-> Render World)
// =============================================================================

/// Receives frames from render world
#[derive(Resource, Deref)]
pub struct MainWorldReceiver(pub Receiver<RawFrame>);

/// Sends frames to main world
#[derive(Resource, Deref)]
pub struct RenderWorldSender(pub Sender<RawFrame>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limiter_rejects_early_frames() {
        let mut limiter = FrameRateLimiter::new(60.0);
        let start = limiter.last_frame_time;
        assert!(!limiter.accept(start + Duration::from_millis(5)));
        assert!(limiter.accept(start + Duration::from_millis(20)));
        assert!(!limiter.accept(start + Duration::from_millis(25)));
    }

    #[test]
    fn timings_keep_a_bounded_window() {
        let mut timings = FrameTimings::default();
        assert_eq!(timings.average(), None);
        for i in 0..10 {
            timings.push(f64::from(i), 4);
        }
        assert_eq!(timings.frame_times, vec![6.0, 7.0, 8.0, 9.0]);
        assert_eq!(timings.average(), Some(7.5));
    }
}
