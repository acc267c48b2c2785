//! Presentation boundary
//!
//! The core never draws anything. It asks a [`Frontend`] for opaque visual
//! handles when entities appear, releases them when entities are removed, and
//! fires decorative [`Effect`]s it never waits on.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::equipment::Rarity;

/// Opaque token for an on-screen representation. The core never reads it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisualHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileShape {
    Orb,
    Shard,
}

/// What a visual should depict. Indices refer to asset tables resolved before the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualKind {
    Player,
    Monster { variant: u32 },
    Projectile { color: u32, shape: ProjectileShape },
    XpOrb { amount: u32 },
    Equipment { rarity: Rarity, icon: u32 },
}

/// Fire-and-forget decorative effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    Spark {
        pos: Vec2,
        color: u32,
        strength: f32,
    },
    DamageNumber {
        pos: Vec2,
        value: f32,
        color: u32,
        size: f32,
    },
    Shockwave {
        pos: Vec2,
        radius: f32,
        color: u32,
        life: f32,
    },
    Implosion {
        pos: Vec2,
        radius: f32,
        color: u32,
        life: f32,
    },
    LightningArc {
        from: Vec2,
        to: Vec2,
        color: u32,
        life: f32,
        width: f32,
        segments: u32,
        chaos: f32,
        branches: u32,
    },
    BladeSlash {
        pos: Vec2,
        angle: f32,
        color: u32,
        life: f32,
    },
    FlamePuff {
        pos: Vec2,
        color: u32,
        life: f32,
        size: f32,
    },
    BurstGlyph {
        pos: Vec2,
        glyph: char,
        color: u32,
        count: u32,
        speed: f32,
        life: f32,
    },
}

/// Effects raised during a frame, flushed to the frontend at the end of it.
#[derive(Debug, Clone, Default)]
pub struct EffectQueue {
    effects: Vec<Effect>,
}

impl EffectQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn spark(&mut self, pos: Vec2, color: u32, strength: f32) {
        self.push(Effect::Spark {
            pos,
            color,
            strength,
        });
    }

    pub fn damage_number(&mut self, pos: Vec2, value: f32, color: u32, size: f32) {
        self.push(Effect::DamageNumber {
            pos,
            value,
            color,
            size,
        });
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }

    pub fn flush(&mut self, frontend: &mut dyn Frontend) {
        for effect in self.effects.drain(..) {
            frontend.spawn_effect(&effect);
        }
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }
}

/// Host-side hooks for visuals and effects.
pub trait Frontend {
    fn create_visual(&mut self, kind: &VisualKind) -> VisualHandle;
    fn destroy_visual(&mut self, handle: VisualHandle);
    fn spawn_effect(&mut self, effect: &Effect);
}

/// Allocates handles and discards everything else. Used for balance runs and benches.
#[derive(Debug, Default)]
pub struct HeadlessFrontend {
    next_handle: u64,
    live: usize,
}

impl HeadlessFrontend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_visuals(&self) -> usize {
        self.live
    }
}

impl Frontend for HeadlessFrontend {
    fn create_visual(&mut self, _kind: &VisualKind) -> VisualHandle {
        self.next_handle += 1;
        self.live += 1;
        VisualHandle(self.next_handle)
    }

    fn destroy_visual(&mut self, _handle: VisualHandle) {
        self.live = self.live.saturating_sub(1);
    }

    fn spawn_effect(&mut self, _effect: &Effect) {}
}

/// Keeps a full log of presentation calls, for assertions in tests and replays.
#[derive(Debug, Default)]
pub struct RecordingFrontend {
    next_handle: u64,
    pub created: Vec<(VisualHandle, VisualKind)>,
    pub destroyed: Vec<VisualHandle>,
    pub effects: Vec<Effect>,
}

impl RecordingFrontend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.created.len() - self.destroyed.len()
    }

    pub fn created_of(&self, pred: impl Fn(&VisualKind) -> bool) -> usize {
        self.created.iter().filter(|(_, k)| pred(k)).count()
    }

    pub fn kind_of(&self, handle: VisualHandle) -> Option<VisualKind> {
        self.created
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, k)| *k)
    }
}

impl Frontend for RecordingFrontend {
    fn create_visual(&mut self, kind: &VisualKind) -> VisualHandle {
        self.next_handle += 1;
        let handle = VisualHandle(self.next_handle);
        self.created.push((handle, *kind));
        handle
    }

    fn destroy_visual(&mut self, handle: VisualHandle) {
        self.destroyed.push(handle);
    }

    fn spawn_effect(&mut self, effect: &Effect) {
        self.effects.push(effect.clone());
    }
}
