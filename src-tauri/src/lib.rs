//! Solar Viewer: a star field and an animated solar system model
//!
//! Bevy renders the scene headless in a background thread and Tauri shows
//! the frames in a webview.
//!
//! Architecture:
//! - Bevy runs in a background thread with NO window (true headless mode)
//! - A render graph node copies the camera target into a mappable buffer
//! - GPU texture -> Buffer -> CPU channel -> shared frame buffer
//! - The webview pulls frames over the `frame://` protocol (JPEG) or the
//!   `get_frame` command (Base64-encoded RGBA) and pushes pointer input and
//!   resize requests back through commands
//!
//! # Module Structure
//!
//! - `config`: Configuration constants and settings
//! - `error`: Error type shared by commands, protocol and loader
//! - `tauri_bridge`: Bridge layer between Tauri and Bevy
//!   - `shared_state`: Thread-safe data structures
//!   - `commands`: Tauri command handlers
//!   - `protocol`: Custom protocol handlers
//!   - `notices`: Bevy -> webview event forwarding
//! - `bevy`: Bevy engine integration
//!   - `star_field`, `orbit`, `material`, `loader`, `animation_driver`: scene state
//!   - `frame_loop`: tick state machine and step ordering
//!   - `components`, `resources`: ECS data
//!   - `plugins`: GPU -> CPU frame copy
//!   - `systems`: ECS systems
//!   - `app`: Application setup

// Module declarations
mod bevy;
mod config;
mod error;
mod tauri_bridge;

use ::bevy::log::info;
use std::{thread, time::Duration};

use crate::bevy::BevyBridge;
use crate::tauri_bridge::protocol::ProtocolState;
use crate::tauri_bridge::{
    SharedFrameBuffer, SharedLoadStatus, SharedPerfStats, SharedPointerInput, SharedViewport,
};

/// Main entry point for the Tauri application
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Create shared state
    let frames = SharedFrameBuffer::default();
    let perf_stats = SharedPerfStats::default();
    let pointer_input = SharedPointerInput::default();
    let viewport = SharedViewport::default();
    let load_status = SharedLoadStatus::default();
    let (notice_tx, notice_rx) = crossbeam_channel::unbounded();

    // Start Bevy in background thread
    bevy::start_bevy(BevyBridge {
        frames: frames.clone(),
        perf_stats: perf_stats.clone(),
        pointer_input: pointer_input.clone(),
        viewport: viewport.clone(),
        load_status: load_status.clone(),
        notices: notice_tx,
    });

    // Wait for Bevy to initialize
    thread::sleep(Duration::from_millis(1000));
    info!("[Tauri] Starting...");

    let protocol_state = ProtocolState {
        frames: frames.clone(),
        perf_stats: perf_stats.clone(),
        load_status: load_status.clone(),
    };

    // Build and run Tauri application
    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(move |app| {
            tauri_bridge::notices::spawn_forwarder(notice_rx, app.handle().clone());
            Ok(())
        })
        .manage(frames)
        .manage(perf_stats)
        .manage(pointer_input)
        .manage(viewport)
        .manage(load_status)
        // Register custom protocol "frame://" for direct binary transfer
        .register_asynchronous_uri_scheme_protocol("frame", move |_ctx, request, responder| {
            let state = protocol_state.clone();

            // Handle the request in a separate thread to avoid blocking
            thread::spawn(move || {
                // For Tauri v2, URL format is: http://frame.localhost/path
                let response =
                    tauri_bridge::protocol::handle_frame_protocol(request.uri().path(), &state);
                responder.respond(response);
            });
        })
        .invoke_handler(tauri::generate_handler![
            tauri_bridge::commands::get_frame,
            tauri_bridge::commands::get_render_size,
            tauri_bridge::commands::get_performance_stats,
            tauri_bridge::commands::get_load_status,
            tauri_bridge::commands::send_pointer_input,
            tauri_bridge::commands::resize_viewport
        ])
        .run(tauri::generate_context!())
        .expect("Tauri error");
}
