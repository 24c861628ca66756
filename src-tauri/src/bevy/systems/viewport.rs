//! Viewport resize system
//!
//! Applies the latest resize request from the frontend at the start of a
//! tick, so the frame rendered at the end of that same tick already uses the
//! new aspect ratio and target size.

use bevy::{prelude::*, render::renderer::RenderDevice};

use crate::bevy::components::OffscreenCamera;
use crate::bevy::plugins::frame_copy::FrameCopier;
use crate::bevy::resources::{RenderTargetHandle, ViewportRes};
use crate::bevy::systems::scene::extent;

pub fn apply_viewport_resize(
    viewport: Option<Res<ViewportRes>>,
    render_target: Option<Res<RenderTargetHandle>>,
    render_device: Option<Res<RenderDevice>>,
    mut images: ResMut<Assets<Image>>,
    mut cameras: Query<&mut Projection, With<OffscreenCamera>>,
    mut frame_copiers: Query<&mut FrameCopier>,
) {
    let Some(viewport) = viewport else { return };
    let size = match viewport.0.take_pending() {
        Ok(Some(size)) => size,
        Ok(None) => return,
        Err(err) => {
            warn!("[Bevy] Skipping resize: {}", err);
            return;
        }
    };

    for mut projection in &mut cameras {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.aspect_ratio = size.aspect_ratio();
        }
    }

    if let Some(target) = render_target {
        if let Some(image) = images.get_mut(&target.0) {
            image.resize(extent(size));
        }
        // The mapped buffer is sized for the old target; replace the copier
        if let Some(render_device) = render_device {
            for mut frame_copier in &mut frame_copiers {
                *frame_copier = FrameCopier::new(target.0.clone(), extent(size), &render_device);
            }
        }
    }

    info!("[Bevy] Viewport resized to {}x{}", size.width, size.height);
}
