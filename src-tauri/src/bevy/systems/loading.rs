//! Model loading systems
//!
//! Polls the in-flight glTF load once per tick. On success the scene's
//! materials are normalized, the model is spawned at half scale, its clips
//! are queued for the animation player and the progress element is hidden.
//! On failure the error is logged and the rest of the scene keeps running.

use bevy::{
    animation::graph::AnimationGraph,
    gltf::Gltf,
    pbr::StandardMaterial,
    prelude::*,
    scene::{Scene, SceneRoot},
};

use crate::bevy::components::SolarSystemModel;
use crate::bevy::loader::{poll_gltf, ModelLoad, PendingAnimation, ProgressIndicator};
use crate::bevy::material::normalize_scene_materials;
use crate::bevy::resources::{LoadStatusRes, NoticeSender};
use crate::config::model;
use crate::error::{ViewerError, ViewerResult};
use crate::tauri_bridge::shared_state::{LoadPhase, SharedLoadStatus, ViewerNotice};

pub fn poll_model_load(
    mut commands: Commands,
    load: Option<ResMut<ModelLoad>>,
    asset_server: Res<AssetServer>,
    gltfs: Res<Assets<Gltf>>,
    mut scenes: ResMut<Assets<Scene>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    clips: Res<Assets<AnimationClip>>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
    mut indicator: ResMut<ProgressIndicator>,
    notices: Option<Res<NoticeSender>>,
    load_status: Option<Res<LoadStatusRes>>,
) {
    let Some(mut load) = load else { return };
    let load_status = load_status.map(|status| status.0.clone());

    let poll = poll_gltf(&asset_server, &load.handle);
    let Some(outcome) = load.resolve(poll) else {
        if let Some(status) = &load_status {
            let progress = load.progress.last();
            if let Err(err) = status.update(|s| s.progress = progress) {
                warn!("[Loader] {}", err);
            }
        }
        return;
    };

    let outcome = outcome.and_then(|()| {
        let gltf = gltfs.get(&load.handle).ok_or_else(|| ViewerError::LoadFailure {
            resource: load.resource.clone(),
            cause: "asset missing after load".into(),
        })?;
        attach_model(
            &mut commands,
            gltf,
            &load.resource,
            &mut scenes,
            &mut materials,
            &clips,
            &mut graphs,
        )
    });

    report_outcome(
        &outcome,
        &mut indicator,
        notices.as_deref().map(|n| &n.0),
        load_status.as_ref(),
    );
    commands.remove_resource::<ModelLoad>();
}

/// Normalize, spawn and queue the animations of a loaded model
fn attach_model(
    commands: &mut Commands,
    gltf: &Gltf,
    resource: &str,
    scenes: &mut Assets<Scene>,
    materials: &mut Assets<StandardMaterial>,
    clips: &Assets<AnimationClip>,
    graphs: &mut Assets<AnimationGraph>,
) -> ViewerResult<()> {
    let scene_handle = gltf
        .default_scene
        .clone()
        .or_else(|| gltf.scenes.first().cloned())
        .ok_or_else(|| ViewerError::LoadFailure {
            resource: resource.to_owned(),
            cause: "file contains no scene".into(),
        })?;

    let meshes = scenes
        .get_mut(&scene_handle)
        .map(|scene| normalize_scene_materials(scene, materials))
        .unwrap_or(0);

    commands.spawn((
        SceneRoot(scene_handle),
        Transform::from_scale(Vec3::splat(model::SCALE)),
        SolarSystemModel,
    ));

    if !gltf.animations.is_empty() {
        let (graph, nodes) = AnimationGraph::from_clips(gltf.animations.iter().cloned());
        let durations = gltf
            .animations
            .iter()
            .map(|clip| clips.get(clip).map_or(0.0, AnimationClip::duration));
        commands.insert_resource(PendingAnimation {
            graph: graphs.add(graph),
            clips: nodes.into_iter().zip(durations).collect(),
        });
    }

    info!(
        "[Loader] Model ready: {} mesh(es) normalized, {} animation clip(s)",
        meshes,
        gltf.animations.len()
    );
    Ok(())
}

/// Publish a settled load to the progress element and the status snapshot
pub fn report_outcome(
    outcome: &ViewerResult<()>,
    indicator: &mut ProgressIndicator,
    notices: Option<&crossbeam_channel::Sender<ViewerNotice>>,
    load_status: Option<&SharedLoadStatus>,
) {
    let status_update = match outcome {
        Ok(()) => {
            if indicator.hide() {
                if let Some(Err(err)) = notices.map(|n| n.send(ViewerNotice::ProgressHidden)) {
                    warn!("[Loader] Progress notice not delivered: {}", err);
                }
            }
            load_status.map(|status| {
                status.update(|s| {
                    s.phase = LoadPhase::Loaded;
                    s.progress = 1.0;
                })
            })
        }
        Err(err) => {
            error!("[Loader] {}", err);
            let message = err.to_string();
            load_status.map(|status| {
                status.update(|s| {
                    s.phase = LoadPhase::Failed;
                    s.error = Some(message);
                })
            })
        }
    };

    if let Some(Err(err)) = status_update {
        warn!("[Loader] {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure() -> ViewerResult<()> {
        Err(ViewerError::LoadFailure {
            resource: "solar_system_animation/scene.gltf".into(),
            cause: "Path not found".into(),
        })
    }

    #[test]
    fn success_hides_progress_and_notifies_once() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let status = SharedLoadStatus::default();
        let mut indicator = ProgressIndicator::default();

        report_outcome(&Ok(()), &mut indicator, Some(&tx), Some(&status));
        report_outcome(&Ok(()), &mut indicator, Some(&tx), Some(&status));

        assert!(!indicator.is_visible());
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![ViewerNotice::ProgressHidden]);
        let snapshot = status.snapshot().unwrap();
        assert_eq!(snapshot.phase, LoadPhase::Loaded);
        assert_eq!(snapshot.progress, 1.0);
    }

    #[test]
    fn failure_keeps_progress_visible() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let status = SharedLoadStatus::default();
        let mut indicator = ProgressIndicator::default();

        report_outcome(&failure(), &mut indicator, Some(&tx), Some(&status));

        assert!(indicator.is_visible());
        assert!(rx.try_recv().is_err());
        let snapshot = status.snapshot().unwrap();
        assert_eq!(snapshot.phase, LoadPhase::Failed);
        assert!(snapshot
            .error
            .as_deref()
            .is_some_and(|e| e.contains("Path not found")));
    }

    #[test]
    fn closed_notice_channel_still_completes_the_load() {
        let (tx, rx) = crossbeam_channel::unbounded();
        drop(rx);
        let status = SharedLoadStatus::default();
        let mut indicator = ProgressIndicator::default();

        report_outcome(&Ok(()), &mut indicator, Some(&tx), Some(&status));

        assert!(!indicator.is_visible());
        assert_eq!(status.snapshot().unwrap().phase, LoadPhase::Loaded);
    }

    #[test]
    fn works_without_bridge() {
        let mut indicator = ProgressIndicator::default();
        report_outcome(&Ok(()), &mut indicator, None, None);
        assert!(!indicator.is_visible());
    }

    /// Loads real glTF files through the asset server
    mod asset_pipeline {
        use super::*;
        use bevy::{animation::AnimationPlugin, gltf::GltfPlugin, state::app::StatesPlugin};
        use crossbeam_channel::Receiver;
        use std::{thread, time::Duration};

        use crate::bevy::animation_driver::AnimationDriver;
        use crate::bevy::frame_loop::{start_frame_loop, FrameLoopPlugin, TickCount};
        use crate::bevy::systems::animation::bind_animation_player;

        struct Harness {
            app: App,
            notices: Receiver<ViewerNotice>,
            status: SharedLoadStatus,
        }

        fn harness(resource: &str) -> Harness {
            let (tx, notices) = crossbeam_channel::unbounded();
            let status = SharedLoadStatus::default();

            let mut app = App::new();
            app.add_plugins((
                MinimalPlugins,
                StatesPlugin,
                AssetPlugin {
                    file_path: "test_assets".to_string(),
                    ..default()
                },
                AnimationPlugin,
                GltfPlugin::default(),
                FrameLoopPlugin,
            ))
            // Normally registered by the render plugins
            .init_asset::<Mesh>()
            .init_asset::<Image>()
            .init_asset::<StandardMaterial>()
            .init_asset::<Scene>()
            .init_resource::<ProgressIndicator>()
            .insert_resource(NoticeSender(tx))
            .insert_resource(LoadStatusRes(status.clone()))
            .add_systems(Startup, start_frame_loop)
            .add_systems(PreUpdate, (poll_model_load, bind_animation_player).chain());
            app.finish();
            app.cleanup();

            let load = ModelLoad::start(app.world().resource::<AssetServer>(), resource.into());
            app.insert_resource(load);

            Harness {
                app,
                notices,
                status,
            }
        }

        fn run_until_resolved(app: &mut App) {
            for _ in 0..500 {
                app.update();
                if app.world().get_resource::<ModelLoad>().is_none() {
                    return;
                }
                thread::sleep(Duration::from_millis(10));
            }
            panic!("model load never resolved");
        }

        fn models(app: &mut App) -> Vec<(Entity, Vec3)> {
            let mut query = app
                .world_mut()
                .query_filtered::<(Entity, &Transform), With<SolarSystemModel>>();
            query
                .iter(app.world())
                .map(|(entity, transform)| (entity, transform.scale))
                .collect()
        }

        #[test]
        fn fixture_model_spawns_and_binds_its_clip() {
            let Harness {
                mut app,
                notices,
                status,
            } = harness("orbit_fixture/scene.gltf");
            run_until_resolved(&mut app);

            let models = models(&mut app);
            assert_eq!(models.len(), 1);
            let (root, scale) = models[0];
            assert_eq!(scale, Vec3::splat(model::SCALE));

            let pending = app.world().resource::<PendingAnimation>();
            assert_eq!(pending.clips.len(), 1);
            assert!((pending.clips[0].1 - 1.0).abs() < 1e-6);

            // No scene spawner in this app: add the node carrying the player the
            // instantiated scene would have
            let node = app.world_mut().spawn(ChildOf(root)).id();
            app.world_mut()
                .spawn((AnimationPlayer::default(), ChildOf(node)));
            app.update();
            app.update();

            assert_eq!(app.world().resource::<AnimationDriver>().cursors().len(), 1);
            assert!(app.world().get_resource::<PendingAnimation>().is_none());
            assert!(!app.world().resource::<ProgressIndicator>().is_visible());
            assert_eq!(
                notices.try_iter().collect::<Vec<_>>(),
                vec![ViewerNotice::ProgressHidden]
            );
            assert_eq!(status.snapshot().unwrap().phase, LoadPhase::Loaded);
        }

        #[test]
        fn missing_texture_still_attaches_the_model() {
            let Harness {
                mut app,
                notices,
                status,
            } = harness("orbit_fixture/missing_texture.gltf");
            run_until_resolved(&mut app);

            assert_eq!(models(&mut app).len(), 1);
            assert!(app.world().get_resource::<PendingAnimation>().is_some());
            assert_eq!(notices.try_iter().count(), 1);
            assert_eq!(status.snapshot().unwrap().phase, LoadPhase::Loaded);
        }

        #[test]
        fn missing_model_fails_and_the_loop_keeps_ticking() {
            let Harness {
                mut app,
                notices,
                status,
            } = harness("orbit_fixture/does_not_exist.gltf");
            run_until_resolved(&mut app);

            let ticks = app.world().resource::<TickCount>().0;
            for _ in 0..10 {
                app.update();
            }
            assert_eq!(app.world().resource::<TickCount>().0, ticks + 10);

            assert!(models(&mut app).is_empty());
            assert!(app.world().get_resource::<PendingAnimation>().is_none());
            assert!(app.world().get_resource::<AnimationDriver>().is_none());
            assert!(app.world().resource::<ProgressIndicator>().is_visible());
            assert!(notices.try_recv().is_err());

            let snapshot = status.snapshot().unwrap();
            assert_eq!(snapshot.phase, LoadPhase::Failed);
            assert!(snapshot
                .error
                .as_deref()
                .is_some_and(|e| e.contains("orbit_fixture/does_not_exist.gltf")));
        }
    }
}
