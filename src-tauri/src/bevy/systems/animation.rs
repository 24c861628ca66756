//! Animation systems
//!
//! Binds the loaded model's animation player to an [`AnimationDriver`] once,
//! then advances the driver by a fixed step every tick.

use bevy::{animation::graph::AnimationGraphHandle, prelude::*};

use crate::bevy::animation_driver::AnimationDriver;
use crate::bevy::components::SolarSystemModel;
use crate::bevy::loader::PendingAnimation;
use crate::config::animation::TICK_DELTA;

/// Attach the pending animation graph to the model's player and start every
/// clip. Runs until the player shows up, then never binds again.
pub fn bind_animation_player(
    mut commands: Commands,
    pending: Option<Res<PendingAnimation>>,
    mut players: Query<(Entity, &mut AnimationPlayer)>,
    parents: Query<&ChildOf>,
    models: Query<(), With<SolarSystemModel>>,
) {
    let Some(pending) = pending else { return };

    let Some((entity, mut player)) = players
        .iter_mut()
        .find(|(entity, _)| parents.iter_ancestors(*entity).any(|a| models.contains(a)))
    else {
        return;
    };

    let driver = AnimationDriver::bind(entity, pending.clips.iter().copied());
    driver.start(&mut player);
    commands
        .entity(entity)
        .insert(AnimationGraphHandle(pending.graph.clone()));

    info!(
        "[Bevy] Animation bound: {} clip(s) looping",
        driver.cursors().len()
    );
    commands.insert_resource(driver);
    commands.remove_resource::<PendingAnimation>();
}

/// Advance every clip cursor by the fixed tick delta
pub fn advance_animation(
    mut driver: ResMut<AnimationDriver>,
    mut players: Query<&mut AnimationPlayer>,
) {
    driver.advance(TICK_DELTA);
    if let Ok(mut player) = players.get_mut(driver.player()) {
        driver.sync(&mut player);
    }
}
