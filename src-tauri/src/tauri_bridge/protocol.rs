//! Custom protocol handlers for efficient data transfer
//!
//! This module implements the `frame://` custom protocol for direct binary
//! transfer of render frames, bypassing Tauri's IPC JSON serialization.

use bevy::log::{debug, warn};
use image::{codecs::jpeg::JpegEncoder, ImageBuffer, ImageEncoder, Rgba};
use tauri::http::{
    header::{ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, CONTENT_TYPE},
    HeaderValue, Response as HttpResponse, StatusCode,
};

use super::shared_state::{CapturedFrame, SharedFrameBuffer, SharedLoadStatus, SharedPerfStats};
use crate::config::compression::JPEG_QUALITY;
use crate::error::{ViewerError, ViewerResult};

type Response = HttpResponse<Vec<u8>>;

/// Shared state the protocol reads from
#[derive(Clone)]
pub struct ProtocolState {
    pub frames: SharedFrameBuffer,
    pub perf_stats: SharedPerfStats,
    pub load_status: SharedLoadStatus,
}

/// Handle requests to the custom `frame://` protocol
///
/// Supported endpoints:
/// - `frame` or `frame.jpg`: JPEG-compressed frame (~50-100KB)
/// - `frame.raw`: Raw RGBA frame (~1.8MB at 800x600)
/// - `stats`: Performance statistics as JSON
/// - `status`: Model load status as JSON
pub fn handle_frame_protocol(uri_path: &str, state: &ProtocolState) -> Response {
    let resource = uri_path.trim_start_matches('/');

    debug!("[Protocol] Resolved resource: {}", resource);

    let result = match resource {
        // JPEG compressed frame - much smaller data size!
        "frame" | "frame.jpg" => state.frames.latest().and_then(|f| jpeg_response(&f)),

        // Raw RGBA frame (for comparison/debugging)
        "frame.raw" => state.frames.latest().map(raw_response),

        "stats" => state.perf_stats.snapshot().and_then(|s| json_response(&s)),

        "status" => state.load_status.snapshot().and_then(|s| json_response(&s)),

        _ => return text_response(StatusCode::NOT_FOUND, "Not Found"),
    };

    result.unwrap_or_else(|err| error_response(&err))
}

fn respond(status: StatusCode, content_type: &'static str, body: Vec<u8>) -> Response {
    let mut response = HttpResponse::new(body);
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

fn text_response(status: StatusCode, message: &str) -> Response {
    respond(status, "text/plain", message.as_bytes().to_vec())
}

fn error_response(err: &ViewerError) -> Response {
    let status = match err {
        ViewerError::FrameNotReady => StatusCode::SERVICE_UNAVAILABLE,
        _ => {
            warn!("[Protocol] {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    text_response(status, &err.to_string())
}

fn with_frame_size(mut response: Response, width: u32, height: u32) -> Response {
    let headers = response.headers_mut();
    headers.insert("x-frame-width", HeaderValue::from(width));
    headers.insert("x-frame-height", HeaderValue::from(height));
    headers.insert(
        ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("X-Frame-Width, X-Frame-Height"),
    );
    response
}

/// Compress the frame to JPEG; reduces ~1.8MB to ~50-100KB
fn jpeg_response(frame: &CapturedFrame) -> ViewerResult<Response> {
    let img: ImageBuffer<Rgba<u8>, &[u8]> =
        ImageBuffer::from_raw(frame.width, frame.height, frame.rgba.as_slice())
            .ok_or(ViewerError::CorruptFrame {
                width: frame.width,
                height: frame.height,
                expected: frame.width as usize * frame.height as usize * 4,
                actual: frame.rgba.len(),
            })?;

    // Convert RGBA to RGB for JPEG (no alpha channel)
    let rgb: Vec<u8> = img.pixels().flat_map(|p| [p[0], p[1], p[2]]).collect();

    let mut jpeg_data = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg_data, JPEG_QUALITY).write_image(
        &rgb,
        frame.width,
        frame.height,
        image::ExtendedColorType::Rgb8,
    )?;

    Ok(with_frame_size(
        respond(StatusCode::OK, "image/jpeg", jpeg_data),
        frame.width,
        frame.height,
    ))
}

fn raw_response(frame: CapturedFrame) -> Response {
    let (width, height) = (frame.width, frame.height);
    let response = respond(StatusCode::OK, "application/octet-stream", frame.rgba);
    with_frame_size(response, width, height)
}

fn json_response<T: serde::Serialize>(value: &T) -> ViewerResult<Response> {
    let json = serde_json::to_vec(value)?;
    Ok(respond(StatusCode::OK, "application/json", json))
}
