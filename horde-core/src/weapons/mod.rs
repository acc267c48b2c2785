//! Weapon System
//!
//! Every weapon is a value: an id, a level, and a [`WeaponState`] variant that
//! holds its private timers and sub-entities (embers, wells, cores). A single
//! entry point, [`Weapon::update`], dispatches to the per-kind behavior.
//!
//! Weapons never touch the entity pools directly. They read a [`Caster`]
//! snapshot of the player, damage monsters in place through a mutable slice,
//! and request new projectiles through the [`SpawnQueue`].
//!
//! Damage, radii and cooldowns are derived from the caster's multipliers on
//! every cast, so stat changes apply on the next tick.

mod chain;
mod orbit;
mod projectile;
mod pulse;
mod zone;

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::fx::EffectQueue;
use crate::math::SimRng;
use crate::monster::Monster;
use crate::player::Player;
use crate::projectile::ProjectileSpec;

pub use orbit::{AstralState, OrbitState};
pub use zone::{TrailState, Zone, ZoneField};

pub const MAX_WEAPON_LEVEL: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeaponId {
    ArcaneBolt,
    OrbitBlades,
    Nova,
    ChainLightning,
    FireTrail,
    FrostShards,
    GravityWell,
    Stormcaller,
    AstralBlades,
    GlacialSingularity,
}

impl WeaponId {
    /// Catalogue order; new-weapon offers follow it.
    pub const ALL: [WeaponId; 10] = [
        WeaponId::ArcaneBolt,
        WeaponId::OrbitBlades,
        WeaponId::Nova,
        WeaponId::ChainLightning,
        WeaponId::FireTrail,
        WeaponId::FrostShards,
        WeaponId::GravityWell,
        WeaponId::Stormcaller,
        WeaponId::AstralBlades,
        WeaponId::GlacialSingularity,
    ];

    /// Only obtainable through a fusion upgrade.
    pub fn is_fusion(self) -> bool {
        matches!(
            self,
            WeaponId::Stormcaller | WeaponId::AstralBlades | WeaponId::GlacialSingularity
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            WeaponId::ArcaneBolt => "Arcane Bolt",
            WeaponId::OrbitBlades => "Orbit Blades",
            WeaponId::Nova => "Nova",
            WeaponId::ChainLightning => "Chain Lightning",
            WeaponId::FireTrail => "Fire Trail",
            WeaponId::FrostShards => "Frost Shards",
            WeaponId::GravityWell => "Gravity Well",
            WeaponId::Stormcaller => "Stormcaller",
            WeaponId::AstralBlades => "Astral Blades",
            WeaponId::GlacialSingularity => "Glacial Singularity",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            WeaponId::ArcaneBolt => "Seeks the nearest enemy, piercing and knocking back.",
            WeaponId::OrbitBlades => "Blades circle you and cut down anything that gets close.",
            WeaponId::Nova => "Periodically releases a shockwave that damages and repels enemies.",
            WeaponId::ChainLightning => "Strikes the nearest enemy and arcs to several more.",
            WeaponId::FireTrail => "Leaves a burning path while moving that scorches enemies.",
            WeaponId::FrostShards => "Fires a fan of ice shards toward the nearest enemy.",
            WeaponId::GravityWell => "Opens gravity wells that drag in and crush enemies.",
            WeaponId::Stormcaller => "Evolution: lightning rains down in forking chains.",
            WeaponId::AstralBlades => "Evolution: an astral blade ring that fires radial volleys.",
            WeaponId::GlacialSingularity => {
                "Evolution: a collapsing frost core that bursts into ice shards."
            }
        }
    }
}

/// Countdown shared by the cooldown-driven weapons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cooldown {
    pub remaining: f32,
}

impl Cooldown {
    /// Counts down and reports whether the weapon may fire this frame.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }

    pub fn reset(&mut self, secs: f32) {
        self.remaining = secs;
    }
}

/// Per-kind private state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WeaponState {
    ArcaneBolt(Cooldown),
    OrbitBlades(OrbitState),
    Nova(Cooldown),
    ChainLightning(Cooldown),
    FireTrail(TrailState),
    FrostShards(Cooldown),
    GravityWell(ZoneField),
    Stormcaller(Cooldown),
    AstralBlades(AstralState),
    GlacialSingularity(ZoneField),
}

impl WeaponState {
    pub fn fresh(id: WeaponId) -> Self {
        match id {
            WeaponId::ArcaneBolt => WeaponState::ArcaneBolt(Cooldown::default()),
            WeaponId::OrbitBlades => WeaponState::OrbitBlades(OrbitState::default()),
            WeaponId::Nova => WeaponState::Nova(Cooldown::default()),
            WeaponId::ChainLightning => WeaponState::ChainLightning(Cooldown::default()),
            WeaponId::FireTrail => WeaponState::FireTrail(TrailState::default()),
            WeaponId::FrostShards => WeaponState::FrostShards(Cooldown::default()),
            WeaponId::GravityWell => WeaponState::GravityWell(ZoneField::default()),
            WeaponId::Stormcaller => WeaponState::Stormcaller(Cooldown::default()),
            WeaponId::AstralBlades => WeaponState::AstralBlades(AstralState::default()),
            WeaponId::GlacialSingularity => {
                WeaponState::GlacialSingularity(ZoneField::default())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub id: WeaponId,
    pub level: u32,
    pub max_level: u32,
    pub state: WeaponState,
}

impl Weapon {
    pub fn new(id: WeaponId) -> Self {
        Self {
            id,
            level: 1,
            max_level: MAX_WEAPON_LEVEL,
            state: WeaponState::fresh(id),
        }
    }

    pub fn is_maxed(&self) -> bool {
        self.level >= self.max_level
    }

    pub fn level_up(&mut self) {
        self.level = (self.level + 1).min(self.max_level);
    }

    pub fn update(&mut self, dt: f32, ctx: &mut WeaponCtx<'_>) {
        let level = self.level;
        match &mut self.state {
            WeaponState::ArcaneBolt(cd) => projectile::arcane_bolt(level, cd, dt, ctx),
            WeaponState::FrostShards(cd) => projectile::frost_shards(level, cd, dt, ctx),
            WeaponState::OrbitBlades(st) => orbit::orbit_blades(level, st, dt, ctx),
            WeaponState::AstralBlades(st) => orbit::astral_blades(level, st, dt, ctx),
            WeaponState::Nova(cd) => pulse::nova(level, cd, dt, ctx),
            WeaponState::ChainLightning(cd) => chain::chain_lightning(level, cd, dt, ctx),
            WeaponState::Stormcaller(cd) => chain::stormcaller(level, cd, dt, ctx),
            WeaponState::FireTrail(st) => zone::fire_trail(level, st, dt, ctx),
            WeaponState::GravityWell(st) => zone::gravity_well(level, st, dt, ctx),
            WeaponState::GlacialSingularity(st) => {
                zone::glacial_singularity(level, st, dt, ctx)
            }
        }
    }
}

/// Read-only view of the player at cast time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Caster {
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage_mult: f32,
    pub cooldown_mult: f32,
    pub area_mult: f32,
}

impl Caster {
    pub fn of(player: &Player) -> Self {
        Self {
            pos: player.pos,
            vel: player.vel,
            damage_mult: player.damage_mult,
            cooldown_mult: player.cooldown_mult,
            area_mult: player.area_mult,
        }
    }
}

/// Projectile requests raised during a frame.
#[derive(Debug, Clone, Default)]
pub struct SpawnQueue {
    projectiles: Vec<ProjectileSpec>,
}

impl SpawnQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn_projectile(&mut self, spec: ProjectileSpec) {
        self.projectiles.push(spec);
    }

    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, ProjectileSpec> {
        self.projectiles.drain(..)
    }
}

pub struct WeaponCtx<'a> {
    pub caster: Caster,
    pub monsters: &'a mut [Monster],
    pub spawns: &'a mut SpawnQueue,
    pub effects: &'a mut EffectQueue,
    pub rng: &'a mut SimRng,
}

/// Index of the closest live monster to `from` within `max_dist`, skipping any
/// index `skip` rejects. Ties keep the earlier monster.
pub fn nearest_monster(
    monsters: &[Monster],
    from: Vec2,
    max_dist: f32,
    skip: impl Fn(usize) -> bool,
) -> Option<usize> {
    let mut best = None;
    let mut best_d = f32::INFINITY;
    for (i, m) in monsters.iter().enumerate() {
        if m.dead || skip(i) {
            continue;
        }
        let d = m.pos.distance(from);
        if d < best_d && d <= max_dist {
            best_d = d;
            best = Some(i);
        }
    }
    best
}

/// Damage + knockback + floating number in one call.
pub(crate) fn strike(
    monster: &mut Monster,
    damage: f32,
    dir: Vec2,
    knockback: f32,
    effects: &mut EffectQueue,
    color: u32,
    size: f32,
) {
    monster.hit(damage, dir, knockback);
    effects.damage_number(monster.pos, damage, color, size);
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::engine::pool::EntityId;
    use crate::fx::VisualHandle;
    use crate::math::rng_from_seed;

    pub struct Arena {
        pub monsters: Vec<Monster>,
        pub spawns: SpawnQueue,
        pub effects: EffectQueue,
        pub rng: SimRng,
    }

    impl Arena {
        pub fn new(positions: &[Vec2]) -> Self {
            let mut rng = rng_from_seed(17);
            let monsters = positions
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    Monster::new(EntityId(i as u64 + 1), VisualHandle(0), 0, *p, 1, &mut rng)
                })
                .collect();
            Self {
                monsters,
                spawns: SpawnQueue::new(),
                effects: EffectQueue::new(),
                rng,
            }
        }

        pub fn step(&mut self, weapon: &mut Weapon, caster: Caster, dt: f32) {
            let mut ctx = WeaponCtx {
                caster,
                monsters: &mut self.monsters,
                spawns: &mut self.spawns,
                effects: &mut self.effects,
                rng: &mut self.rng,
            };
            weapon.update(dt, &mut ctx);
        }

        pub fn damaged(&self) -> usize {
            self.monsters.iter().filter(|m| m.hp < m.max_hp).count()
        }
    }

    pub fn caster_at(pos: Vec2) -> Caster {
        Caster {
            pos,
            vel: Vec2::ZERO,
            damage_mult: 1.0,
            cooldown_mult: 1.0,
            area_mult: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_fusion_flags() {
        let fusions: Vec<_> = WeaponId::ALL.iter().filter(|w| w.is_fusion()).collect();
        assert_eq!(fusions.len(), 3);
        assert!(!WeaponId::ArcaneBolt.is_fusion());
    }

    #[test]
    fn test_level_up_clamps() {
        let mut w = Weapon::new(WeaponId::Nova);
        for _ in 0..10 {
            w.level_up();
        }
        assert_eq!(w.level, MAX_WEAPON_LEVEL);
        assert!(w.is_maxed());
    }

    #[test]
    fn test_nearest_skips_dead_and_excluded() {
        let mut arena = Arena::new(&[
            Vec2::new(10.0, 0.0),
            Vec2::new(20.0, 0.0),
            Vec2::new(30.0, 0.0),
        ]);
        arena.monsters[0].dead = true;
        let idx = nearest_monster(&arena.monsters, Vec2::ZERO, f32::INFINITY, |i| i == 1);
        assert_eq!(idx, Some(2));
        assert_eq!(nearest_monster(&arena.monsters, Vec2::ZERO, 5.0, |_| false), None);
    }

    #[test]
    fn test_every_weapon_is_silent_without_targets() {
        for id in WeaponId::ALL {
            let mut arena = Arena::new(&[]);
            let mut w = Weapon::new(id);
            for _ in 0..40 {
                arena.step(&mut w, caster_at(Vec2::ZERO), 0.05);
            }
            // radial volleys and the singularity burst need no target
            if !matches!(id, WeaponId::AstralBlades | WeaponId::GlacialSingularity) {
                assert!(arena.spawns.is_empty(), "{id:?} spawned without targets");
            }
        }
    }

    #[test]
    fn test_cooldown_tick() {
        let mut cd = Cooldown::default();
        assert!(cd.tick(0.01));
        cd.reset(0.5);
        assert!(!cd.tick(0.25));
        assert!(cd.tick(0.25));
    }
}
