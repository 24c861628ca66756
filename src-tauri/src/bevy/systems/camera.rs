//! Camera control system
//!
//! This module implements orbit camera controls that respond to pointer
//! input from the frontend, allowing users to rotate and zoom the camera.

use bevy::{math::Vec2, prelude::*};

use crate::bevy::components::OrbitCamera;
use crate::bevy::orbit::OrbitController;
use crate::bevy::resources::{PointerInputRes, ViewportRes};

/// Feed accumulated pointer input into the orbit controller, run its damped
/// update and write the resulting pose into the camera
/// - Primary button drag: rotate camera (azimuth/polar)
/// - Scroll wheel: dolly (adjust distance)
pub fn update_orbit_camera(
    pointer_input: Option<Res<PointerInputRes>>,
    viewport: Option<Res<ViewportRes>>,
    mut orbit: ResMut<OrbitController>,
    mut camera_query: Query<&mut Transform, With<OrbitCamera>>,
) {
    // Read and clear accumulated input
    if let Some(input) = pointer_input.and_then(|res| res.0.drain().ok()) {
        if input.primary_button && (input.delta_x != 0.0 || input.delta_y != 0.0) {
            let height = viewport
                .and_then(|res| res.0.current().ok())
                .map_or(0.0, |size| size.height as f32);
            orbit.rotate_by_pointer(Vec2::new(input.delta_x, input.delta_y), height);
        }

        if input.scroll_delta != 0.0 {
            orbit.dolly(input.scroll_delta);
        }
    }

    orbit.update();

    let pose = orbit.transform();
    for mut transform in camera_query.iter_mut() {
        *transform = pose;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tauri_bridge::shared_state::{PointerInput, SharedPointerInput, SharedViewport};

    #[test]
    fn drag_moves_camera_and_drains_input() {
        let input = SharedPointerInput::default();
        let mut app = App::new();
        app.insert_resource(PointerInputRes(input.clone()))
            .insert_resource(ViewportRes(SharedViewport::default()))
            .init_resource::<OrbitController>()
            .add_systems(Update, update_orbit_camera);
        let camera = app
            .world_mut()
            .spawn((Transform::default(), OrbitCamera))
            .id();

        app.update();
        let rest = *app.world().get::<Transform>(camera).unwrap();
        assert!(rest
            .translation
            .abs_diff_eq(Vec3::new(0.0, 5.0, 20.0), 1e-3));

        input
            .accumulate(PointerInput {
                delta_x: 120.0,
                delta_y: 0.0,
                scroll_delta: 0.0,
                primary_button: true,
            })
            .unwrap();
        app.update();

        let moved = *app.world().get::<Transform>(camera).unwrap();
        assert!(moved.translation.x < 0.0, "{}", moved.translation);
        assert!(input.drain().unwrap().is_idle());

        // Damping keeps turning the camera after the input stops
        app.update();
        let later = *app.world().get::<Transform>(camera).unwrap();
        assert!(later.translation.x < moved.translation.x);
    }
}
