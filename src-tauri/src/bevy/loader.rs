//! Asset loader adapter
//!
//! Wraps the asset server's asynchronous glTF load in an explicit tracker
//! that is polled once per tick and resolves exactly once, plus the
//! progress element state that goes from visible to hidden on success.

use bevy::{
    animation::graph::{AnimationGraph, AnimationNodeIndex},
    asset::{LoadState, RecursiveDependencyLoadState},
    gltf::Gltf,
    prelude::*,
};

use crate::error::ViewerError;

/// One observation of an in-flight load
#[derive(Debug, Clone, PartialEq)]
pub enum LoadPoll {
    /// Still loading; `progress` is an estimate in `[0, 1]`
    Pending { progress: f32 },
    /// The asset and all of its dependencies are available
    Ready,
    /// The asset or one of its dependencies failed
    Failed(String),
}

/// Observe the load of `handle` through the asset server
///
/// Only a failed root is fatal. A dependency that fails after the root has
/// parsed (typically a missing or undecodable texture) is logged and the
/// model is used without it.
pub fn poll_gltf(asset_server: &AssetServer, handle: &Handle<Gltf>) -> LoadPoll {
    let root = asset_server.load_state(handle);
    if let LoadState::Failed(err) = &root {
        return LoadPoll::Failed(err.to_string());
    }
    let root_loaded = matches!(root, LoadState::Loaded);

    match asset_server.recursive_dependency_load_state(handle) {
        RecursiveDependencyLoadState::Loaded => LoadPoll::Ready,
        RecursiveDependencyLoadState::Failed(err) if root_loaded => {
            warn!("[Loader] Couldn't load a dependency, continuing without it: {}", err);
            LoadPoll::Ready
        }
        // Root parsed, buffers and textures still streaming in
        _ if root_loaded => LoadPoll::Pending { progress: 0.5 },
        _ => LoadPoll::Pending { progress: 0.0 },
    }
}

/// Monotonic progress reporting
#[derive(Debug, Default, Clone, Copy)]
pub struct LoadProgress {
    reported: Option<f32>,
}

impl LoadProgress {
    /// Record an observed fraction; returns the value to report when it moved
    /// forward (or on the first observation), `None` otherwise
    pub fn observe(&mut self, fraction: f32) -> Option<f32> {
        let fraction = fraction.clamp(0.0, 1.0);
        match self.reported {
            Some(last) if fraction <= last => None,
            _ => {
                self.reported = Some(fraction);
                Some(fraction)
            }
        }
    }

    pub fn last(&self) -> f32 {
        self.reported.unwrap_or(0.0)
    }
}

/// In-flight load of the solar system model
#[derive(Resource, Debug)]
pub struct ModelLoad {
    pub handle: Handle<Gltf>,
    pub resource: String,
    pub progress: LoadProgress,
    resolved: bool,
}

impl ModelLoad {
    /// Issue the load through the asset server
    pub fn start(asset_server: &AssetServer, resource: String) -> Self {
        info!("[Loader] Loading {}", resource);
        Self::new(asset_server.load(resource.clone()), resource)
    }

    pub fn new(handle: Handle<Gltf>, resource: String) -> Self {
        Self {
            handle,
            resource,
            progress: LoadProgress::default(),
            resolved: false,
        }
    }

    /// Feed one observation. Returns the outcome the first time the load
    /// settles and `None` while pending and on every call afterwards.
    pub fn resolve(&mut self, poll: LoadPoll) -> Option<Result<(), ViewerError>> {
        if self.resolved {
            return None;
        }
        match poll {
            LoadPoll::Pending { progress } => {
                if let Some(fraction) = self.progress.observe(progress) {
                    info!("[Loader] loading {:.0}%", fraction * 100.0);
                }
                None
            }
            LoadPoll::Ready => {
                self.resolved = true;
                self.progress.observe(1.0);
                Some(Ok(()))
            }
            LoadPoll::Failed(cause) => {
                self.resolved = true;
                Some(Err(ViewerError::LoadFailure {
                    resource: self.resource.clone(),
                    cause,
                }))
            }
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }
}

/// State of the frontend's progress element
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressIndicator {
    visible: bool,
}

impl Default for ProgressIndicator {
    fn default() -> Self {
        Self { visible: true }
    }
}

impl ProgressIndicator {
    /// Hide the element; true only for the call that actually hid it
    pub fn hide(&mut self) -> bool {
        std::mem::replace(&mut self.visible, false)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Animation graph of a freshly spawned model, waiting for its player
#[derive(Resource, Debug, Clone)]
pub struct PendingAnimation {
    pub graph: Handle<AnimationGraph>,
    /// Graph node and clip duration per clip
    pub clips: Vec<(AnimationNodeIndex, f32)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load() -> ModelLoad {
        ModelLoad::new(Handle::default(), "solar_system_animation/scene.gltf".into())
    }

    #[test]
    fn progress_never_goes_backwards() {
        let mut progress = LoadProgress::default();
        assert_eq!(progress.observe(0.0), Some(0.0));
        assert_eq!(progress.observe(0.0), None);
        assert_eq!(progress.observe(0.5), Some(0.5));
        assert_eq!(progress.observe(0.2), None);
        assert_eq!(progress.last(), 0.5);
        assert_eq!(progress.observe(3.0), Some(1.0));
    }

    #[test]
    fn success_resolves_exactly_once() {
        let mut load = load();
        assert!(load.resolve(LoadPoll::Pending { progress: 0.0 }).is_none());
        assert!(load.resolve(LoadPoll::Pending { progress: 0.5 }).is_none());
        assert!(matches!(load.resolve(LoadPoll::Ready), Some(Ok(()))));
        assert!(load.is_resolved());
        assert!(load.resolve(LoadPoll::Ready).is_none());
        assert_eq!(load.progress.last(), 1.0);
    }

    #[test]
    fn failure_carries_resource_and_cause() {
        let mut load = load();
        let outcome = load.resolve(LoadPoll::Failed("Path not found".into()));
        match outcome {
            Some(Err(ViewerError::LoadFailure { resource, cause })) => {
                assert_eq!(resource, "solar_system_animation/scene.gltf");
                assert_eq!(cause, "Path not found");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        // A later success cannot flip a failed load
        assert!(load.resolve(LoadPoll::Ready).is_none());
    }

    #[test]
    fn progress_indicator_hides_once() {
        let mut indicator = ProgressIndicator::default();
        assert!(indicator.is_visible());
        assert!(indicator.hide());
        assert!(!indicator.hide());
        assert!(!indicator.is_visible());
    }
}
