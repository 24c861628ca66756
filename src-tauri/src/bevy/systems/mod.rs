//! Bevy systems
//!
//! This module contains all the systems that operate on entities
//! and resources in the Bevy ECS.

pub mod animation;
pub mod camera;
pub mod frame_extraction;
pub mod loading;
pub mod scene;
pub mod stars;
pub mod viewport;

pub use animation::{advance_animation, bind_animation_player};
pub use camera::update_orbit_camera;
pub use frame_extraction::extract_and_process_frame;
pub use loading::poll_model_load;
pub use scene::setup_scene;
pub use stars::advance_star_field;
pub use viewport::apply_viewport_resize;

use bevy::prelude::*;

use crate::bevy::animation_driver::AnimationDriver;
use crate::bevy::frame_loop::FrameStep;

/// Register the per-tick systems in their ordered steps
pub fn add_tick_systems(app: &mut App) {
    app.add_systems(
        Update,
        (
            apply_viewport_resize.in_set(FrameStep::Viewport),
            update_orbit_camera.in_set(FrameStep::Controls),
            advance_star_field.in_set(FrameStep::Stars),
            advance_animation
                .in_set(FrameStep::Animation)
                .run_if(resource_exists::<AnimationDriver>),
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::state::app::StatesPlugin;

    use crate::bevy::components::{OffscreenCamera, OrbitCamera};
    use crate::bevy::frame_loop::{start_frame_loop, FrameLoopPlugin, TickCount};
    use crate::bevy::orbit::OrbitController;
    use crate::bevy::resources::{PointerInputRes, ViewportRes};
    use crate::bevy::star_field::StarField;
    use crate::config::stars::DRIFT_STEP;
    use crate::tauri_bridge::shared_state::{SharedPointerInput, SharedViewport};

    fn app(viewport: SharedViewport) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin, FrameLoopPlugin))
            .init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<Image>>()
            .init_resource::<OrbitController>()
            .insert_resource(StarField::from_positions(vec![[0.0, 1.0, 2.0]], -1000.0, 1000.0))
            .insert_resource(PointerInputRes(SharedPointerInput::default()))
            .insert_resource(ViewportRes(viewport))
            .add_systems(Startup, start_frame_loop);
        add_tick_systems(&mut app);
        app.world_mut().spawn((
            Projection::Perspective(PerspectiveProjection::default()),
            Transform::default(),
            OffscreenCamera,
            OrbitCamera,
        ));
        app
    }

    fn aspect(app: &mut App) -> f32 {
        let mut query = app
            .world_mut()
            .query_filtered::<&Projection, With<OffscreenCamera>>();
        match query.single(app.world()) {
            Ok(Projection::Perspective(p)) => p.aspect_ratio,
            _ => panic!("camera projection missing"),
        }
    }

    fn star_x(app: &App) -> f32 {
        app.world().resource::<StarField>().positions()[0][0]
    }

    #[test]
    fn resize_between_ticks_keeps_one_step_per_tick() {
        let viewport = SharedViewport::default();
        let mut app = app(viewport.clone());

        app.update();
        assert_eq!(*app.world().resource::<TickCount>(), TickCount(1));

        viewport.request_resize(1920, 1080).unwrap();
        app.update();
        assert!((aspect(&mut app) - 1920.0 / 1080.0).abs() < 1e-6);
        assert_eq!(viewport.current().unwrap().width, 1920);

        viewport.request_resize(800, 600).unwrap();
        app.update();
        assert!((aspect(&mut app) - 800.0 / 600.0).abs() < 1e-6);

        assert_eq!(*app.world().resource::<TickCount>(), TickCount(3));
        assert!((star_x(&app) + 3.0 * DRIFT_STEP).abs() < 1e-5);
    }

    #[test]
    fn device_pixel_resize_keeps_the_window_aspect() {
        // 800x600 CSS pixels at a pixel ratio of 2
        let viewport = SharedViewport::default();
        let mut app = app(viewport.clone());

        viewport.request_resize(1600, 1200).unwrap();
        app.update();

        let size = viewport.current().unwrap();
        assert_eq!((size.width, size.height), (1600, 1200));
        assert!((aspect(&mut app) - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn scene_keeps_ticking_without_a_model() {
        let mut app = app(SharedViewport::default());
        for _ in 0..100 {
            app.update();
        }
        assert!(app.world().get_resource::<AnimationDriver>().is_none());
        assert_eq!(*app.world().resource::<TickCount>(), TickCount(100));
        assert!((star_x(&app) + 100.0 * DRIFT_STEP).abs() < 1e-3);
    }
}
