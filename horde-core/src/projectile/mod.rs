//! Projectile entity.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::engine::pool::{Entity, EntityId};
use crate::fx::{Effect, EffectQueue, ProjectileShape, VisualHandle, VisualKind};

/// Extra behavior triggered when a projectile connects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OnHit {
    /// Scatter glyph sparks at the impact point.
    Sparks { glyph: char, color: u32, count: u32 },
}

impl OnHit {
    pub fn apply(&self, at: Vec2, effects: &mut EffectQueue) {
        match *self {
            OnHit::Sparks {
                glyph,
                color,
                count,
            } => effects.push(Effect::BurstGlyph {
                pos: at,
                glyph,
                color,
                count,
                speed: 160.0,
                life: 0.2,
            }),
        }
    }
}

/// Everything a weapon decides about a projectile. The simulation turns specs
/// into pooled [`Projectile`]s when it drains the spawn queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSpec {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    /// Extra monsters this projectile may pass through.
    pub pierce: u32,
    pub life: f32,
    pub color: u32,
    pub shape: ProjectileShape,
    pub knock_dir: Vec2,
    pub knockback: f32,
    pub on_hit: Option<OnHit>,
}

impl ProjectileSpec {
    pub fn visual_kind(&self) -> VisualKind {
        VisualKind::Projectile {
            color: self.color,
            shape: self.shape,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub visual: VisualHandle,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub pierce: u32,
    pub life: f32,
    pub color: u32,
    pub knock_dir: Vec2,
    pub knockback: f32,
    pub on_hit: Option<OnHit>,
    pub dead: bool,
}

impl Projectile {
    pub fn from_spec(id: EntityId, visual: VisualHandle, spec: ProjectileSpec) -> Self {
        Self {
            id,
            visual,
            pos: spec.pos,
            vel: spec.vel,
            radius: spec.radius,
            damage: spec.damage,
            pierce: spec.pierce,
            life: spec.life,
            color: spec.color,
            knock_dir: spec.knock_dir,
            knockback: spec.knockback,
            on_hit: spec.on_hit,
            dead: false,
        }
    }

    pub fn update(&mut self, dt: f32) {
        if self.dead {
            return;
        }
        self.life -= dt;
        if self.life <= 0.0 {
            self.dead = true;
            return;
        }
        self.pos += self.vel * dt;
    }

    /// Spends one pierce charge; kills the projectile when none are left.
    pub fn consume_pierce(&mut self) {
        if self.pierce == 0 {
            self.dead = true;
        } else {
            self.pierce -= 1;
        }
    }
}

impl Entity for Projectile {
    fn id(&self) -> EntityId {
        self.id
    }

    fn is_dead(&self) -> bool {
        self.dead
    }

    fn visual(&self) -> VisualHandle {
        self.visual
    }
}
