//! Animation driver
//!
//! Owns one play cursor per clip of the loaded model and advances them by a
//! fixed step per tick. The engine's animation player still evaluates the
//! clips, but its own clock is paused: each tick the cursor position is
//! pushed into the player with a seek.

use bevy::{animation::graph::AnimationNodeIndex, prelude::*};

/// Playback position of one looping clip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayCursor {
    pub node: AnimationNodeIndex,
    /// Current position in clip seconds, in `[0, duration)`
    pub position: f32,
    pub duration: f32,
}

impl PlayCursor {
    pub fn new(node: AnimationNodeIndex, duration: f32) -> Self {
        Self {
            node,
            position: 0.0,
            duration,
        }
    }

    /// Move forward by `delta`, looping at the clip end
    pub fn advance(&mut self, delta: f32) {
        self.position += delta;
        if self.duration > 0.0 {
            self.position = self.position.rem_euclid(self.duration);
        }
    }
}

/// Binding of the model's animation player to its clip cursors
///
/// Inserted once, when the player first appears; it lives for the rest of
/// the process.
#[derive(Resource, Debug, Clone)]
pub struct AnimationDriver {
    player: Entity,
    cursors: Vec<PlayCursor>,
}

impl AnimationDriver {
    /// Start one looping cursor per clip
    pub fn bind(player: Entity, clips: impl IntoIterator<Item = (AnimationNodeIndex, f32)>) -> Self {
        Self {
            player,
            cursors: clips
                .into_iter()
                .map(|(node, duration)| PlayCursor::new(node, duration))
                .collect(),
        }
    }

    pub fn advance(&mut self, delta: f32) {
        for cursor in &mut self.cursors {
            cursor.advance(delta);
        }
    }

    pub fn player(&self) -> Entity {
        self.player
    }

    pub fn cursors(&self) -> &[PlayCursor] {
        &self.cursors
    }

    /// Start every clip on `player`, looping forever with the engine clock
    /// paused so only [`AnimationDriver::advance`] moves them
    pub fn start(&self, player: &mut AnimationPlayer) {
        for cursor in &self.cursors {
            player.play(cursor.node).repeat().pause();
        }
    }

    /// Push cursor positions into the engine's player
    pub fn sync(&self, player: &mut AnimationPlayer) {
        for cursor in &self.cursors {
            if let Some(active) = player.animation_mut(cursor.node) {
                active.seek_to(cursor.position);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver(durations: &[f32]) -> AnimationDriver {
        AnimationDriver::bind(
            Entity::PLACEHOLDER,
            durations
                .iter()
                .enumerate()
                .map(|(i, &d)| (AnimationNodeIndex::new(i + 1), d)),
        )
    }

    #[test]
    fn bind_creates_one_cursor_per_clip_at_start() {
        let driver = driver(&[2.0, 5.0, 0.5]);
        assert_eq!(driver.cursors().len(), 3);
        assert!(driver.cursors().iter().all(|c| c.position == 0.0));
    }

    #[test]
    fn binding_without_clips_is_empty() {
        let mut driver = driver(&[]);
        driver.advance(0.01);
        assert!(driver.cursors().is_empty());
    }

    #[test]
    fn advance_moves_every_cursor_by_delta() {
        let mut driver = driver(&[2.0, 5.0]);
        for _ in 0..10 {
            driver.advance(0.01);
        }
        for cursor in driver.cursors() {
            assert!((cursor.position - 0.1).abs() < 1e-5);
        }
    }

    #[test]
    fn cursors_loop_at_clip_end() {
        let mut driver = driver(&[1.0]);
        for _ in 0..150 {
            driver.advance(0.01);
        }
        let position = driver.cursors()[0].position;
        assert!((position - 0.5).abs() < 1e-3, "{position}");
        assert!(position < 1.0);
    }

    #[test]
    fn zero_length_clip_does_not_produce_nan() {
        let mut cursor = PlayCursor::new(AnimationNodeIndex::new(1), 0.0);
        cursor.advance(0.01);
        assert!(cursor.position.is_finite());
    }

    #[test]
    fn start_and_sync_drive_the_player() {
        let driver = driver(&[2.0]);
        let mut player = AnimationPlayer::default();
        driver.start(&mut player);

        let node = driver.cursors()[0].node;
        let active = player.animation(node).unwrap();
        assert!(active.is_paused());
        assert_eq!(active.repeat_mode(), bevy::animation::RepeatAnimation::Forever);

        let mut driver = driver;
        driver.advance(0.25);
        driver.sync(&mut player);
        assert_eq!(player.animation(node).unwrap().seek_time(), 0.25);
    }
}
