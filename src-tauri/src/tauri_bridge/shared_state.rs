//! Shared state structures for communication between Tauri and Bevy
//!
//! This module defines thread-safe data structures that allow bidirectional
//! communication between the Tauri frontend and the Bevy render backend.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::{RENDER_HEIGHT, RENDER_WIDTH};
use crate::error::{ViewerError, ViewerResult};

fn lock<'a, T>(mutex: &'a Mutex<T>, name: &'static str) -> ViewerResult<MutexGuard<'a, T>> {
    mutex.lock().map_err(|_| ViewerError::StatePoisoned(name))
}

// =============================================================================
// Frame Buffer
// =============================================================================

/// One rendered frame as tightly packed RGBA8 rows
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedFrame {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Thread-safe holder of the latest frame, shared between Bevy and Tauri
#[derive(Clone, Default)]
pub struct SharedFrameBuffer(pub Arc<Mutex<Option<CapturedFrame>>>);

impl SharedFrameBuffer {
    pub fn publish(&self, frame: CapturedFrame) -> ViewerResult<()> {
        *lock(&self.0, "frame buffer")? = Some(frame);
        Ok(())
    }

    /// Clone of the latest frame, or [`ViewerError::FrameNotReady`]
    pub fn latest(&self) -> ViewerResult<CapturedFrame> {
        lock(&self.0, "frame buffer")?
            .clone()
            .ok_or(ViewerError::FrameNotReady)
    }
}

/// Frame response containing Base64-encoded RGBA pixel data
#[derive(Serialize, Deserialize)]
pub struct FrameResponse {
    /// Base64-encoded RGBA pixel data (avoids slow JSON array serialization)
    pub data: String,
    pub width: u32,
    pub height: u32,
}

// =============================================================================
// Pointer Input
// =============================================================================

/// Pointer input accumulated from the frontend between two ticks
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerInput {
    /// Accumulated X movement delta (CSS pixels)
    pub delta_x: f32,
    /// Accumulated Y movement delta (CSS pixels)
    pub delta_y: f32,
    /// Accumulated scroll wheel delta, positive moves the camera away
    pub scroll_delta: f32,
    /// Primary button is pressed
    pub primary_button: bool,
}

impl PointerInput {
    pub fn is_idle(&self) -> bool {
        self.delta_x == 0.0 && self.delta_y == 0.0 && self.scroll_delta == 0.0
    }
}

/// Thread-safe pointer input shared between Tauri and Bevy
#[derive(Clone, Default)]
pub struct SharedPointerInput(pub Arc<Mutex<PointerInput>>);

impl SharedPointerInput {
    /// Add deltas to the pending input; button state is just the latest state
    pub fn accumulate(&self, input: PointerInput) -> ViewerResult<()> {
        let mut guard = lock(&self.0, "pointer input")?;
        guard.delta_x += input.delta_x;
        guard.delta_y += input.delta_y;
        guard.scroll_delta += input.scroll_delta;
        guard.primary_button = input.primary_button;
        Ok(())
    }

    /// Read the accumulated input and clear its deltas
    pub fn drain(&self) -> ViewerResult<PointerInput> {
        let mut guard = lock(&self.0, "pointer input")?;
        let input = *guard;
        guard.delta_x = 0.0;
        guard.delta_y = 0.0;
        guard.scroll_delta = 0.0;
        Ok(input)
    }
}

// =============================================================================
// Viewport
// =============================================================================

/// Pixel dimensions of the viewport surface
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: RENDER_WIDTH,
            height: RENDER_HEIGHT,
        }
    }
}

#[derive(Default)]
pub struct ViewportState {
    /// Size the render target currently has
    pub current: ViewportSize,
    /// Latest size requested by the frontend, applied on the next tick
    pub pending: Option<ViewportSize>,
}

/// Thread-safe viewport state shared between Tauri and Bevy
#[derive(Clone, Default)]
pub struct SharedViewport(pub Arc<Mutex<ViewportState>>);

impl SharedViewport {
    /// Queue a resize; later requests overwrite earlier ones
    pub fn request_resize(&self, width: u32, height: u32) -> ViewerResult<()> {
        if width == 0 || height == 0 {
            return Err(ViewerError::InvalidViewport { width, height });
        }
        let mut guard = lock(&self.0, "viewport")?;
        let size = ViewportSize { width, height };
        guard.pending = (size != guard.current).then_some(size);
        Ok(())
    }

    /// Take the pending request and record it as the current size
    pub fn take_pending(&self) -> ViewerResult<Option<ViewportSize>> {
        let mut guard = lock(&self.0, "viewport")?;
        let pending = guard.pending.take();
        if let Some(size) = pending {
            guard.current = size;
        }
        Ok(pending)
    }

    pub fn current(&self) -> ViewerResult<ViewportSize> {
        Ok(lock(&self.0, "viewport")?.current)
    }
}

// =============================================================================
// Model Load Status
// =============================================================================

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoadPhase {
    #[default]
    Loading,
    Loaded,
    Failed,
}

/// Load status of the solar system model as seen by the frontend
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct LoadStatus {
    pub phase: LoadPhase,
    /// Last reported progress fraction in `[0, 1]`
    pub progress: f32,
    /// Failure message, if the load failed
    pub error: Option<String>,
}

/// Thread-safe load status
#[derive(Clone, Default)]
pub struct SharedLoadStatus(pub Arc<Mutex<LoadStatus>>);

impl SharedLoadStatus {
    pub fn update(&self, apply: impl FnOnce(&mut LoadStatus)) -> ViewerResult<()> {
        apply(&mut *lock(&self.0, "load status")?);
        Ok(())
    }

    pub fn snapshot(&self) -> ViewerResult<LoadStatus> {
        Ok(lock(&self.0, "load status")?.clone())
    }
}

// =============================================================================
// Performance Statistics
// =============================================================================

/// Performance statistics for debugging and monitoring
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct PerformanceStats {
    // Backend (Bevy/Rust) timings
    pub gpu_transfer_ms: f64,
    pub data_processing_ms: f64,
    pub frame_encoding_ms: f64,
    pub bevy_fps: f64,
    pub frame_count: u32,
    pub data_size_kb: f64,
    pub tick_count: u64,
    // Tauri command timings
    pub tauri_get_frame_ms: f64,
    pub tauri_serialize_ms: f64,
}

/// Thread-safe performance statistics
#[derive(Clone, Default)]
pub struct SharedPerfStats(pub Arc<Mutex<PerformanceStats>>);

impl SharedPerfStats {
    pub fn update(&self, apply: impl FnOnce(&mut PerformanceStats)) -> ViewerResult<()> {
        apply(&mut *lock(&self.0, "performance stats")?);
        Ok(())
    }

    pub fn snapshot(&self) -> ViewerResult<PerformanceStats> {
        Ok(lock(&self.0, "performance stats")?.clone())
    }
}

// =============================================================================
// Notices (Bevy -> Tauri)
// =============================================================================

/// One-shot notifications sent from the Bevy thread to the webview
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewerNotice {
    /// The model finished loading; hide the progress element
    ProgressHidden,
}
