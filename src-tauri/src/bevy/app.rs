//! Bevy application setup and execution
//!
//! This module handles the creation and configuration of the Bevy app,
//! including plugin registration and system scheduling.

use bevy::{
    app::{App, ScheduleRunnerPlugin},
    prelude::*,
    window::ExitCondition,
};
use crossbeam_channel::Sender;
use std::thread;
use std::time::Duration;

use crate::bevy::frame_loop::{start_frame_loop, FrameLoopPlugin};
use crate::bevy::loader::ProgressIndicator;
use crate::bevy::orbit::OrbitController;
use crate::bevy::plugins::FrameCopyPlugin;
use crate::bevy::resources::*;
use crate::bevy::star_field::StarField;
use crate::bevy::systems::*;
use crate::config::{model, stars, PRE_ROLL_FRAMES, TARGET_FPS};
use crate::tauri_bridge::shared_state::{
    SharedFrameBuffer, SharedLoadStatus, SharedPerfStats, SharedPointerInput, SharedViewport,
    ViewerNotice,
};

/// State shared between the Bevy thread and the Tauri side
#[derive(Clone)]
pub struct BevyBridge {
    pub frames: SharedFrameBuffer,
    pub perf_stats: SharedPerfStats,
    pub pointer_input: SharedPointerInput,
    pub viewport: SharedViewport,
    pub load_status: SharedLoadStatus,
    pub notices: Sender<ViewerNotice>,
}

/// Create and configure the Bevy application
pub fn create_app(bridge: BevyBridge) -> App {
    let mut app = App::new();

    // Use DefaultPlugins but configure for headless operation
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: None,
                exit_condition: ExitCondition::DontExit,
                ..default()
            })
            .set(AssetPlugin {
                file_path: model::ASSET_ROOT.to_string(),
                ..default()
            }),
    );

    // Add schedule runner for controlled frame rate
    app.add_plugins(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
        1.0 / TARGET_FPS,
    )));

    // Add custom plugins
    app.add_plugins((FrameCopyPlugin, FrameLoopPlugin));

    // Scene state
    app.insert_resource(StarField::initialize(
        stars::COUNT,
        stars::BOUNDS_MIN,
        stars::BOUNDS_MAX,
        &mut rand::rng(),
    ));
    app.init_resource::<OrbitController>();
    app.init_resource::<ProgressIndicator>();

    // Bridge resources
    app.insert_resource(FrameBufferRes(bridge.frames));
    app.insert_resource(PerfStatsRes(bridge.perf_stats));
    app.insert_resource(PointerInputRes(bridge.pointer_input));
    app.insert_resource(ViewportRes(bridge.viewport));
    app.insert_resource(LoadStatusRes(bridge.load_status));
    app.insert_resource(NoticeSender(bridge.notices));

    // Frame output
    app.insert_resource(FrameCount::default());
    app.insert_resource(PreRollFrames(PRE_ROLL_FRAMES));
    app.insert_resource(FrameTimings::default());
    app.insert_resource(FrameRateLimiter::new(TARGET_FPS));

    // Register systems
    app.add_systems(Startup, (setup_scene, start_frame_loop).chain());
    app.add_systems(PreUpdate, (poll_model_load, bind_animation_player).chain());
    add_tick_systems(&mut app);
    app.add_systems(Last, extract_and_process_frame);

    info!("[Bevy] App configured (headless, {} stars)", stars::COUNT);
    app
}

/// Start Bevy in a background thread
pub fn start_bevy(bridge: BevyBridge) {
    thread::spawn(move || {
        let mut app = create_app(bridge);
        info!("[Bevy] Running render loop...");
        app.run();
    });
}
