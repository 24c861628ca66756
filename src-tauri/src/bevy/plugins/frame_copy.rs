//! Frame copy plugin (render world)
//!
//! Flow:
//! 1. The camera renders into the offscreen target image
//! 2. `FrameCopyDriver` (a render graph node after the camera driver) copies
//!    the image into a mappable buffer
//! 3. After `RenderSystems::Render` the buffer is mapped and its bytes are sent
//!    to the main world over a channel
//! 4. `extract_and_process_frame` strips row padding and publishes the frame

use bevy::{
    prelude::*,
    render::{
        render_asset::RenderAssets,
        render_graph::{self, NodeRunError, RenderGraph, RenderGraphContext, RenderLabel},
        render_resource::{
            Buffer, BufferDescriptor, BufferUsages, CommandEncoderDescriptor, Extent3d, MapMode,
            PollType, TexelCopyBufferInfo, TexelCopyBufferLayout,
        },
        renderer::{RenderContext, RenderDevice, RenderQueue},
        texture::GpuImage,
        Extract, Render, RenderApp, RenderSystems,
    },
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::bevy::resources::{MainWorldReceiver, RenderWorldSender};

/// Mapped buffer contents of one frame, rows padded to the copy alignment
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

pub struct FrameCopyPlugin;

impl Plugin for FrameCopyPlugin {
    fn build(&self, app: &mut App) {
        let (s, r) = crossbeam_channel::unbounded();

        let render_app = app
            .insert_resource(MainWorldReceiver(r))
            .sub_app_mut(RenderApp);

        let mut graph = render_app.world_mut().resource_mut::<RenderGraph>();
        graph.add_node(FrameCopy, FrameCopyDriver);
        graph.add_node_edge(bevy::render::graph::CameraDriverLabel, FrameCopy);

        render_app
            .insert_resource(RenderWorldSender(s))
            .add_systems(ExtractSchedule, frame_copy_extract)
            .add_systems(
                Render,
                receive_frame_from_buffer.after(RenderSystems::Render),
            );
    }
}

#[derive(Clone, Default, Resource, Deref, DerefMut)]
struct FrameCopiers(pub Vec<FrameCopier>);

/// Copies `src_image` into a CPU-mappable buffer every frame
///
/// Replaced wholesale when the viewport is resized, so the buffer always
/// matches `size`.
#[derive(Clone, Component)]
pub struct FrameCopier {
    buffer: Buffer,
    enabled: Arc<AtomicBool>,
    // Set by the graph node when a copy was submitted this frame
    copied: Arc<AtomicBool>,
    src_image: Handle<Image>,
    size: Extent3d,
}

impl FrameCopier {
    pub fn new(src_image: Handle<Image>, size: Extent3d, render_device: &RenderDevice) -> Self {
        let padded_bytes_per_row = RenderDevice::align_copy_bytes_per_row(size.width as usize * 4);

        let cpu_buffer = render_device.create_buffer(&BufferDescriptor {
            label: Some("frame_copy_buffer"),
            size: padded_bytes_per_row as u64 * size.height as u64,
            usage: BufferUsages::MAP_READ | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            buffer: cpu_buffer,
            src_image,
            size,
            enabled: Arc::new(AtomicBool::new(true)),
            copied: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn size(&self) -> Extent3d {
        self.size
    }
}

fn frame_copy_extract(mut commands: Commands, frame_copiers: Extract<Query<&FrameCopier>>) {
    commands.insert_resource(FrameCopiers(frame_copiers.iter().cloned().collect()));
}

#[derive(Debug, PartialEq, Eq, Clone, Hash, RenderLabel)]
struct FrameCopy;

#[derive(Default)]
struct FrameCopyDriver;

impl render_graph::Node for FrameCopyDriver {
    fn run(
        &self,
        _graph: &mut RenderGraphContext,
        render_context: &mut RenderContext,
        world: &World,
    ) -> Result<(), NodeRunError> {
        let (Some(frame_copiers), Some(gpu_images), Some(render_queue)) = (
            world.get_resource::<FrameCopiers>(),
            world.get_resource::<RenderAssets<GpuImage>>(),
            world.get_resource::<RenderQueue>(),
        ) else {
            return Ok(());
        };

        for frame_copier in frame_copiers.iter().filter(|c| c.enabled()) {
            let Some(src_image) = gpu_images.get(&frame_copier.src_image) else {
                continue;
            };
            // Right after a resize the GPU texture may lag one frame behind
            if src_image.size != frame_copier.size {
                continue;
            }
            let Some(block_size) = src_image.texture_format.block_copy_size(None) else {
                continue;
            };
            let block_dimensions = src_image.texture_format.block_dimensions();

            let padded_bytes_per_row = RenderDevice::align_copy_bytes_per_row(
                (src_image.size.width as usize / block_dimensions.0 as usize) * block_size as usize,
            );

            let mut encoder = render_context
                .render_device()
                .create_command_encoder(&CommandEncoderDescriptor::default());

            encoder.copy_texture_to_buffer(
                src_image.texture.as_image_copy(),
                TexelCopyBufferInfo {
                    buffer: &frame_copier.buffer,
                    layout: TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(padded_bytes_per_row as u32),
                        rows_per_image: None,
                    },
                },
                src_image.size,
            );

            render_queue.submit(std::iter::once(encoder.finish()));
            frame_copier.copied.store(true, Ordering::Relaxed);
        }

        Ok(())
    }
}

fn receive_frame_from_buffer(
    frame_copiers: Res<FrameCopiers>,
    render_device: Res<RenderDevice>,
    sender: Res<RenderWorldSender>,
) {
    for frame_copier in frame_copiers.0.iter() {
        if !frame_copier.enabled() || !frame_copier.copied.swap(false, Ordering::Relaxed) {
            continue;
        }

        let buffer_slice = frame_copier.buffer.slice(..);

        let (s, r) = crossbeam_channel::bounded(1);
        buffer_slice.map_async(MapMode::Read, move |result| {
            let _ = s.send(result);
        });

        if let Err(err) = render_device.poll(PollType::wait()) {
            warn!("[Bevy] Failed to poll device for frame copy: {}", err);
            continue;
        }

        match r.recv() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!("[Bevy] Failed to map frame buffer: {}", err);
                continue;
            }
            Err(_) => continue,
        }

        let data = buffer_slice.get_mapped_range().to_vec();
        frame_copier.buffer.unmap();

        let _ = sender.send(RawFrame {
            data,
            width: frame_copier.size.width,
            height: frame_copier.size.height,
        });
    }
}
