use bevy::prelude::*;
use std::sync::{Arc, RwLock};

use crate::engine::config::SimConfig;
use crate::engine::simulation::Simulation;
use crate::fx::{Effect, Frontend, VisualHandle, VisualKind};
use crate::input::{Action, InputState};

/// Runs a [`Simulation`] inside a bevy app: keyboard → input, then one
/// frame step per `Update`, with presentation calls buffered for a renderer.
#[derive(Default)]
pub struct HordePlugin {
    pub config: SimConfig,
}

impl Plugin for HordePlugin {
    fn build(&self, app: &mut App) {
        let mut queue = PresentationQueue::default();
        let sim = Simulation::new(self.config.clone(), &mut queue);

        app.insert_resource(SimulationResource(Arc::new(RwLock::new(sim))))
            .insert_resource(queue)
            .init_resource::<HordeInput>()
            .add_systems(Update, (keyboard_input_system, simulation_tick_system).chain());
    }
}

#[derive(Resource)]
pub struct SimulationResource(pub Arc<RwLock<Simulation>>);

#[derive(Resource, Debug, Default)]
pub struct HordeInput(pub InputState);

/// Presentation calls of the frames since the last drain.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PresentationBatch {
    pub created: Vec<(VisualHandle, VisualKind)>,
    pub destroyed: Vec<VisualHandle>,
    pub effects: Vec<Effect>,
}

/// [`Frontend`] that buffers everything for a renderer system to drain.
#[derive(Resource, Debug, Default)]
pub struct PresentationQueue {
    next_handle: u64,
    pending: PresentationBatch,
}

impl PresentationQueue {
    pub fn drain(&mut self) -> PresentationBatch {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.created.is_empty()
            && self.pending.destroyed.is_empty()
            && self.pending.effects.is_empty()
    }
}

impl Frontend for PresentationQueue {
    fn create_visual(&mut self, kind: &VisualKind) -> VisualHandle {
        self.next_handle += 1;
        let handle = VisualHandle(self.next_handle);
        self.pending.created.push((handle, *kind));
        handle
    }

    fn destroy_visual(&mut self, handle: VisualHandle) {
        self.pending.destroyed.push(handle);
    }

    fn spawn_effect(&mut self, effect: &Effect) {
        self.pending.effects.push(effect.clone());
    }
}

const KEY_BINDINGS: [(Action, &[KeyCode]); 8] = [
    (Action::Up, &[KeyCode::KeyW, KeyCode::ArrowUp]),
    (Action::Down, &[KeyCode::KeyS, KeyCode::ArrowDown]),
    (Action::Left, &[KeyCode::KeyA, KeyCode::ArrowLeft]),
    (Action::Right, &[KeyCode::KeyD, KeyCode::ArrowRight]),
    (Action::Choose1, &[KeyCode::Digit1]),
    (Action::Choose2, &[KeyCode::Digit2]),
    (Action::Choose3, &[KeyCode::Digit3]),
    (Action::Confirm, &[KeyCode::Enter, KeyCode::KeyR]),
];

fn keyboard_input_system(keys: Option<Res<ButtonInput<KeyCode>>>, mut input: ResMut<HordeInput>) {
    // headless apps have no keyboard; input is then driven through HordeInput directly
    let Some(keys) = keys else {
        return;
    };
    let held = KEY_BINDINGS
        .iter()
        .filter(|(_, codes)| codes.iter().any(|k| keys.pressed(*k)))
        .map(|(action, _)| *action);
    input.0.sync_held(held);
}

fn simulation_tick_system(
    time: Res<Time>,
    sim_res: Res<SimulationResource>,
    mut input: ResMut<HordeInput>,
    mut queue: ResMut<PresentationQueue>,
) {
    if let Ok(mut sim) = sim_res.0.write() {
        sim.update(time.delta_secs(), &mut input.0, &mut *queue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let mut app = App::new();
        app.init_resource::<Time>();
        app.add_plugins(HordePlugin::default());
        app
    }

    #[test]
    fn test_plugin_creates_player_visual() {
        let mut app = app();
        let mut queue = app.world_mut().resource_mut::<PresentationQueue>();
        let batch = queue.drain();
        assert_eq!(batch.created.len(), 1);
        assert_eq!(batch.created[0].1, VisualKind::Player);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_update_steps_simulation() {
        let mut app = app();
        app.update();
        app.update();
        let sim = app.world().resource::<SimulationResource>().0.clone();
        let frames = sim.read().map(|s| s.frame()).unwrap_or(0);
        assert_eq!(frames, 2);
    }

    #[test]
    fn test_headless_input_passes_through() {
        let mut app = app();
        app.world_mut()
            .resource_mut::<HordeInput>()
            .0
            .press(Action::Confirm);
        app.update();
        // consumed at the end of the frame
        assert!(!app
            .world()
            .resource::<HordeInput>()
            .0
            .was_pressed(Action::Confirm));
    }

    #[test]
    fn test_queue_as_frontend() {
        let mut queue = PresentationQueue::default();
        let a = queue.create_visual(&VisualKind::Player);
        let b = queue.create_visual(&VisualKind::XpOrb { amount: 3 });
        assert_ne!(a, b);
        queue.destroy_visual(a);
        let batch = queue.drain();
        assert_eq!(batch.created.len(), 2);
        assert_eq!(batch.destroyed, vec![a]);
        assert!(queue.drain().created.is_empty());
    }
}
