//! Tauri command handlers
//!
//! This module contains all the Tauri command functions that can be invoked
//! from the frontend JavaScript/TypeScript code.

use base64::{engine::general_purpose::STANDARD, Engine};
use tauri::State;

use super::shared_state::{
    FrameResponse, LoadStatus, PerformanceStats, PointerInput, SharedFrameBuffer,
    SharedLoadStatus, SharedPerfStats, SharedPointerInput, SharedViewport, ViewportSize,
};
use crate::error::ViewerResult;

/// Get the current rendered frame as Base64-encoded RGBA data
#[tauri::command]
pub fn get_frame(
    state: State<SharedFrameBuffer>,
    perf_state: State<SharedPerfStats>,
) -> ViewerResult<FrameResponse> {
    let cmd_start = std::time::Instant::now();

    let frame = state.latest()?;
    let data_fetch_time = cmd_start.elapsed().as_secs_f64() * 1000.0;

    // Measure Base64 encoding time
    let encode_start = std::time::Instant::now();
    let base64_data = STANDARD.encode(&frame.rgba);
    let encode_time = encode_start.elapsed().as_secs_f64() * 1000.0;

    perf_state.update(|stats| {
        stats.tauri_get_frame_ms = data_fetch_time;
        stats.tauri_serialize_ms = encode_time;
    })?;

    Ok(FrameResponse {
        data: base64_data,
        width: frame.width,
        height: frame.height,
    })
}

/// Get the current render resolution
#[tauri::command]
pub fn get_render_size(viewport: State<SharedViewport>) -> ViewerResult<ViewportSize> {
    viewport.current()
}

/// Get performance statistics
#[tauri::command]
pub fn get_performance_stats(state: State<SharedPerfStats>) -> ViewerResult<PerformanceStats> {
    state.snapshot()
}

/// Get the load status of the solar system model
#[tauri::command]
pub fn get_load_status(state: State<SharedLoadStatus>) -> ViewerResult<LoadStatus> {
    state.snapshot()
}

/// Receive pointer input from frontend for camera control
/// Input deltas are accumulated until consumed by Bevy
#[tauri::command]
pub fn send_pointer_input(
    state: State<SharedPointerInput>,
    delta_x: f32,
    delta_y: f32,
    scroll_delta: f32,
    primary_button: bool,
) -> ViewerResult<()> {
    state.accumulate(PointerInput {
        delta_x,
        delta_y,
        scroll_delta,
        primary_button,
    })
}

/// Request a new viewport size; applied before the next frame renders
#[tauri::command]
pub fn resize_viewport(state: State<SharedViewport>, width: u32, height: u32) -> ViewerResult<()> {
    state.request_resize(width, height)
}
