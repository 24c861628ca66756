//! Frame extraction system
//!
//! This module handles extracting rendered frames from the GPU and
//! preparing them for transfer to the Tauri frontend.

use bevy::{prelude::*, render::renderer::RenderDevice, time::Time};
use std::time::Instant;

use crate::bevy::frame_loop::TickCount;
use crate::bevy::plugins::frame_copy::RawFrame;
use crate::bevy::resources::{
    FrameBufferRes, FrameCount, FrameRateLimiter, FrameTimings, MainWorldReceiver, PerfStatsRes,
    PreRollFrames,
};
use crate::config::performance::{FRAME_TIMING_SAMPLES, STATS_PRINT_INTERVAL};
use crate::tauri_bridge::shared_state::CapturedFrame;

/// Extract and process frame data from the render pipeline
pub fn extract_and_process_frame(
    receiver: Res<MainWorldReceiver>,
    buffer: Option<Res<FrameBufferRes>>,
    perf_stats: Option<Res<PerfStatsRes>>,
    ticks: Res<TickCount>,
    mut count: ResMut<FrameCount>,
    mut pre_roll: ResMut<PreRollFrames>,
    mut timings: ResMut<FrameTimings>,
    mut frame_limiter: ResMut<FrameRateLimiter>,
    time: Res<Time>,
) {
    let Some(buffer) = buffer else { return };

    // Wait for scene to be fully rendered
    if pre_roll.0 > 0 {
        while receiver.try_recv().is_ok() {}
        pre_roll.0 -= 1;
        if pre_roll.0 % 10 == 0 && pre_roll.0 > 0 {
            debug!("[Bevy] Pre-roll frames remaining: {}", pre_roll.0);
        }
        return;
    }

    let frame_start = Instant::now();
    if !frame_limiter.accept(frame_start) {
        // Too early for the next frame; drop what arrived
        while receiver.try_recv().is_ok() {}
        return;
    }

    // Keep only the newest frame from the render world
    let receive_start = Instant::now();
    let Some(raw) = receiver.try_iter().last() else {
        return;
    };
    let receive_time = receive_start.elapsed().as_secs_f64() * 1000.0;

    let process_start = Instant::now();
    let Some(frame) = remove_row_padding(raw) else {
        return;
    };
    let process_time = process_start.elapsed().as_secs_f64() * 1000.0;
    let data_size = frame.rgba.len();
    let (width, height) = (frame.width, frame.height);

    if let Err(err) = buffer.0.publish(frame) {
        warn!("[Bevy] Dropping frame: {}", err);
        return;
    }
    count.0 += 1;

    let total_time = frame_start.elapsed().as_secs_f64() * 1000.0;
    timings.push(total_time, FRAME_TIMING_SAMPLES);
    let avg_time = timings.average().unwrap_or(0.0);

    if let Some(perf_res) = &perf_stats {
        let result = perf_res.0.update(|stats| {
            stats.gpu_transfer_ms = receive_time;
            stats.data_processing_ms = process_time;
            stats.frame_encoding_ms = total_time;
            stats.frame_count = count.0;
            stats.data_size_kb = data_size as f64 / 1024.0;
            stats.tick_count = ticks.0;
            stats.bevy_fps = if avg_time > 0.0 { 1000.0 / avg_time } else { 0.0 };
        });
        if let Err(err) = result {
            warn!("[Bevy] {}", err);
        }
    }

    // Print detailed stats periodically
    let current_time = time.elapsed_secs_f64();
    if current_time - timings.last_print_time >= STATS_PRINT_INTERVAL {
        let max_time = timings.frame_times.iter().copied().fold(0.0f64, f64::max);
        let min_time = timings.frame_times.iter().copied().fold(f64::MAX, f64::min);

        info!(
            "[Bevy] Frame {} | Tick {} | {}x{} | Receive: {:.2}ms | Process: {:.2}ms | Total: {:.2}ms | Avg: {:.2}ms (Min: {:.2}ms, Max: {:.2}ms) | Size: {:.1}KB",
            count.0,
            ticks.0,
            width,
            height,
            receive_time,
            process_time,
            total_time,
            avg_time,
            min_time,
            max_time,
            data_size as f64 / 1024.0
        );
        timings.last_print_time = current_time;
    }
}

/// Remove GPU buffer row padding alignment, returning tightly packed RGBA
pub fn remove_row_padding(raw: RawFrame) -> Option<CapturedFrame> {
    let row_bytes = raw.width as usize * 4;
    let aligned_row_bytes = RenderDevice::align_copy_bytes_per_row(row_bytes);
    let packed_len = row_bytes * raw.height as usize;

    if raw.data.len() < aligned_row_bytes * (raw.height as usize).saturating_sub(1) + row_bytes
        || packed_len == 0
    {
        return None;
    }

    let rgba = if row_bytes == aligned_row_bytes {
        let mut data = raw.data;
        data.truncate(packed_len);
        data
    } else {
        raw.data
            .chunks(aligned_row_bytes)
            .take(raw.height as usize)
            .flat_map(|row| &row[..row_bytes])
            .copied()
            .collect()
    };

    Some(CapturedFrame {
        rgba,
        width: raw.width,
        height: raw.height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_rows_pass_through() {
        // 64 px * 4 bytes = 256, already aligned
        let raw = RawFrame {
            data: vec![7; 256 * 3],
            width: 64,
            height: 3,
        };
        let frame = remove_row_padding(raw).unwrap();
        assert_eq!(frame.rgba.len(), 256 * 3);
        assert_eq!((frame.width, frame.height), (64, 3));
    }

    #[test]
    fn padding_is_stripped_from_every_row() {
        let width = 10u32;
        let height = 2u32;
        let aligned = RenderDevice::align_copy_bytes_per_row(40);
        let mut data = vec![0u8; aligned * height as usize];
        for row in 0..height as usize {
            data[row * aligned..row * aligned + 40].fill(row as u8 + 1);
        }

        let frame = remove_row_padding(RawFrame { data, width, height }).unwrap();
        assert_eq!(frame.rgba.len(), 80);
        assert!(frame.rgba[..40].iter().all(|&b| b == 1));
        assert!(frame.rgba[40..].iter().all(|&b| b == 2));
    }

    #[test]
    fn short_or_empty_buffers_are_rejected() {
        let empty = RawFrame {
            data: Vec::new(),
            width: 800,
            height: 600,
        };
        assert!(remove_row_padding(empty).is_none());

        let short = RawFrame {
            data: vec![0; 100],
            width: 800,
            height: 600,
        };
        assert!(remove_row_padding(short).is_none());
    }
}
