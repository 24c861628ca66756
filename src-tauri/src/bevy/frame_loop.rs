//! Frame loop
//!
//! The schedule runner re-enters the main schedule once per frame. This
//! module gates the per-tick work behind a two-state machine and fixes the
//! order of the steps inside `Update`:
//!
//! 1. [`FrameStep::Viewport`]: apply a pending resize
//! 2. [`FrameStep::Controls`]: orbit controller update
//! 3. [`FrameStep::Stars`]: star field drift
//! 4. [`FrameStep::Animation`]: animation driver, when bound
//!
//! Rendering follows in the render sub-app.

use bevy::prelude::*;

/// Frame loop state; there is no terminal state
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrameLoopState {
    /// Before the first tick is scheduled
    #[default]
    Idle,
    /// Steady state, re-entered every frame
    Running,
}

/// Ordered steps of one tick
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameStep {
    Viewport,
    Controls,
    Stars,
    Animation,
}

/// Number of Running ticks executed so far
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickCount(pub u64);

/// Registers the frame loop state, its ordered step sets and the tick counter
pub struct FrameLoopPlugin;

impl Plugin for FrameLoopPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<FrameLoopState>()
            .init_resource::<TickCount>()
            .configure_sets(
                Update,
                (
                    FrameStep::Viewport,
                    FrameStep::Controls,
                    FrameStep::Stars,
                    FrameStep::Animation,
                )
                    .chain()
                    .run_if(in_state(FrameLoopState::Running)),
            )
            .add_systems(
                Update,
                count_tick
                    .before(FrameStep::Viewport)
                    .run_if(in_state(FrameLoopState::Running)),
            )
            .add_systems(OnEnter(FrameLoopState::Running), log_running);
    }
}

/// Idle -> Running; runs once, after scene setup
pub fn start_frame_loop(mut next_state: ResMut<NextState<FrameLoopState>>) {
    next_state.set(FrameLoopState::Running);
}

fn count_tick(mut ticks: ResMut<TickCount>) {
    ticks.0 += 1;
}

fn log_running() {
    info!("[Bevy] Frame loop running");
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::state::app::StatesPlugin;

    #[derive(Resource, Default)]
    struct Trace(Vec<FrameStep>);

    fn record(step: FrameStep) -> impl FnMut(ResMut<Trace>) + Send + Sync + 'static {
        move |mut trace: ResMut<Trace>| trace.0.push(step)
    }

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin, FrameLoopPlugin))
            .init_resource::<Trace>();
        // Registered out of order on purpose; the sets impose the order
        app.add_systems(Update, record(FrameStep::Animation).in_set(FrameStep::Animation))
            .add_systems(Update, record(FrameStep::Stars).in_set(FrameStep::Stars))
            .add_systems(Update, record(FrameStep::Viewport).in_set(FrameStep::Viewport))
            .add_systems(Update, record(FrameStep::Controls).in_set(FrameStep::Controls));
        app
    }

    #[test]
    fn idle_loop_does_no_tick_work() {
        let mut app = app();
        app.update();
        app.update();
        assert!(app.world().resource::<Trace>().0.is_empty());
        assert_eq!(*app.world().resource::<TickCount>(), TickCount(0));
        assert_eq!(
            *app.world().resource::<State<FrameLoopState>>().get(),
            FrameLoopState::Idle
        );
    }

    #[test]
    fn running_tick_runs_steps_in_order_once() {
        let mut app = app();
        app.add_systems(Startup, start_frame_loop);

        app.update();
        assert_eq!(
            app.world().resource::<Trace>().0,
            vec![
                FrameStep::Viewport,
                FrameStep::Controls,
                FrameStep::Stars,
                FrameStep::Animation
            ]
        );

        for _ in 0..9 {
            app.update();
        }
        assert_eq!(app.world().resource::<Trace>().0.len(), 40);
        assert_eq!(*app.world().resource::<TickCount>(), TickCount(10));
    }
}
