//! Configuration constants and settings for the solar system viewer
//!
//! This module contains all configurable parameters such as the initial
//! viewport size, frame cadence, scene layout and camera bounds.

/// Initial width of the offscreen render target in pixels
pub const RENDER_WIDTH: u32 = 800;

/// Initial height of the offscreen render target in pixels
pub const RENDER_HEIGHT: u32 = 600;

/// Target frames per second for the Bevy render loop
pub const TARGET_FPS: f64 = 60.0;

/// Number of pre-roll frames to skip before starting output
/// This allows the scene to fully load and stabilize
pub const PRE_ROLL_FRAMES: u32 = 30;

/// Star field backdrop
pub mod stars {
    /// Number of stars allocated at startup
    pub const COUNT: usize = 10_000;

    /// Lower bound of every star coordinate
    pub const BOUNDS_MIN: f32 = -1000.0;

    /// Upper bound of every star coordinate, also the wrap target
    pub const BOUNDS_MAX: f32 = 1000.0;

    /// Leftward drift applied to every star each tick
    pub const DRIFT_STEP: f32 = 0.05;
}

/// Animation playback
pub mod animation {
    /// Playback advance per tick, in clip seconds
    pub const TICK_DELTA: f32 = 0.01;
}

/// Loaded solar system model
pub mod model {
    /// Root directory the asset server reads from
    pub const ASSET_ROOT: &str = "assets";

    /// Directory holding the glTF and its buffers/textures
    pub const BASE_PATH: &str = "solar_system_animation";

    /// glTF scene file inside [`BASE_PATH`]
    pub const FILE_NAME: &str = "scene.gltf";

    /// Uniform scale applied to the model root
    pub const SCALE: f32 = 0.5;

    /// Resource id handed to the asset server
    pub fn resource_id() -> String {
        format!("{BASE_PATH}/{FILE_NAME}")
    }
}

/// Scene lighting
pub mod lighting {
    /// Ambient light color (0x404040)
    pub const AMBIENT_RGB: [u8; 3] = [0x40, 0x40, 0x40];

    /// Ambient light brightness
    pub const AMBIENT_BRIGHTNESS: f32 = 400.0;

    /// Directional light illuminance
    pub const DIRECTIONAL_ILLUMINANCE: f32 = 4000.0;

    /// Directional light position; it shines toward the origin
    pub const DIRECTIONAL_POSITION: [f32; 3] = [5.0, 10.0, 7.5];
}

/// Camera control settings
pub mod camera {
    /// Vertical field of view in degrees
    pub const FOV_DEGREES: f32 = 45.0;

    /// Near clipping plane
    pub const NEAR: f32 = 1.0;

    /// Far clipping plane
    pub const FAR: f32 = 1000.0;

    /// Initial camera position
    pub const START_POSITION: [f32; 3] = [0.0, 5.0, 20.0];

    /// The point the camera orbits around
    pub const TARGET: [f32; 3] = [0.0, 1.0, 0.0];

    /// Rotation speed multiplier for pointer drag
    pub const ROTATE_SPEED: f32 = 1.0;

    /// Zoom speed multiplier for scroll wheel
    pub const ZOOM_SPEED: f32 = 1.0;

    /// Fraction of the pending rotation applied per update
    pub const DAMPING_FACTOR: f32 = 0.05;

    /// Minimum camera distance from the target
    pub const MIN_DISTANCE: f32 = 5.0;

    /// Maximum camera distance from the target
    pub const MAX_DISTANCE: f32 = 30.0;

    /// Minimum polar angle (radians, measured from +Y)
    pub const MIN_POLAR_ANGLE: f32 = 0.5;

    /// Maximum polar angle (radians, measured from +Y)
    pub const MAX_POLAR_ANGLE: f32 = 1.5;
}

/// Performance monitoring settings
pub mod performance {
    /// Interval for printing performance stats (seconds)
    pub const STATS_PRINT_INTERVAL: f64 = 2.0;

    /// Number of frame timing samples to keep for averaging
    pub const FRAME_TIMING_SAMPLES: usize = 60;
}

/// Image compression settings
pub mod compression {
    /// JPEG quality level (0-100, higher = better quality but larger size)
    pub const JPEG_QUALITY: u8 = 85;
}
