//! Projectile launchers: arcane bolt and frost shards.

use bevy::math::Vec2;

use super::{nearest_monster, Cooldown, WeaponCtx};
use crate::fx::{Effect, ProjectileShape};
use crate::math::{clamp, VecExt};
use crate::projectile::{OnHit, ProjectileSpec};

const BOLT_COLOR: u32 = 0x7ad1ff;
const FROST_COLOR: u32 = 0xbfe8ff;

/// Spawn offset from the caster's center.
const MUZZLE_OFFSET: f32 = 54.0;

fn pierce_for(level: u32) -> u32 {
    ((level.max(1) - 1) / 2).min(2)
}

pub(super) fn arcane_bolt(level: u32, cd: &mut Cooldown, dt: f32, ctx: &mut WeaponCtx<'_>) {
    if !cd.tick(dt) {
        return;
    }
    let lvl = level as f32;
    let c = ctx.caster;
    // the cooldown restarts even when nothing is in range
    cd.reset(clamp((0.85 - (lvl - 1.0) * 0.08) * c.cooldown_mult, 0.18, 0.95));

    let Some(target) = nearest_monster(ctx.monsters, c.pos, f32::INFINITY, |_| false) else {
        return;
    };

    let dir = (ctx.monsters[target].pos - c.pos).safe_norm();
    let speed = (720.0 + lvl * 45.0) * (0.95 + c.area_mult * 0.05);
    let damage = ((10.0 + lvl * 5.0) * c.damage_mult).round();

    ctx.spawns.spawn_projectile(ProjectileSpec {
        pos: c.pos + dir * MUZZLE_OFFSET,
        vel: dir * speed,
        radius: 10.0,
        damage,
        pierce: pierce_for(level),
        life: 1.2,
        color: BOLT_COLOR,
        shape: ProjectileShape::Orb,
        knock_dir: dir,
        knockback: 520.0 + lvl * 60.0,
        on_hit: Some(OnHit::Sparks {
            glyph: '✧',
            color: BOLT_COLOR,
            count: 4,
        }),
    });

    ctx.effects.push(Effect::BurstGlyph {
        pos: c.pos + dir * 36.0,
        glyph: '✧',
        color: BOLT_COLOR,
        count: 6,
        speed: 180.0,
        life: 0.18,
    });
}

pub(super) fn frost_shards(level: u32, cd: &mut Cooldown, dt: f32, ctx: &mut WeaponCtx<'_>) {
    if !cd.tick(dt) {
        return;
    }
    let lvl = level as f32;
    let c = ctx.caster;
    cd.reset(clamp((1.2 - lvl * 0.09) * c.cooldown_mult, 0.45, 1.25));

    let Some(target) = nearest_monster(ctx.monsters, c.pos, f32::INFINITY, |_| false) else {
        return;
    };

    let base = (ctx.monsters[target].pos - c.pos).safe_norm();
    let shards = (4 + level / 2).clamp(4, 8);
    let spread = 0.26 + lvl * 0.02;
    let speed = 680.0 + lvl * 30.0;
    let damage = ((10.0 + lvl * 5.0) * c.damage_mult).round();

    for dir in fan_directions(base, shards, spread) {
        ctx.spawns.spawn_projectile(ProjectileSpec {
            pos: c.pos + dir * MUZZLE_OFFSET,
            vel: dir * speed,
            radius: 9.0,
            damage,
            pierce: pierce_for(level),
            life: 1.05,
            color: BOLT_COLOR,
            shape: ProjectileShape::Shard,
            knock_dir: dir,
            knockback: 420.0,
            on_hit: Some(OnHit::Sparks {
                glyph: '❄',
                color: FROST_COLOR,
                count: 3,
            }),
        });
    }

    let muzzle = c.pos + base * 44.0;
    ctx.effects.spark(muzzle, BOLT_COLOR, 1.25);
    ctx.effects.push(Effect::BurstGlyph {
        pos: muzzle,
        glyph: '❄',
        color: FROST_COLOR,
        count: 3,
        speed: 80.0,
        life: 0.22,
    });
}

/// `count` directions evenly spread over `spread` radians, centered on `base`.
fn fan_directions(base: Vec2, count: u32, spread: f32) -> Vec<Vec2> {
    (0..count)
        .map(|i| {
            let u = if count <= 1 {
                0.0
            } else {
                i as f32 / (count - 1) as f32
            };
            base.rotated((u - 0.5) * spread)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::{Weapon, WeaponId};
    use super::*;

    #[test]
    fn test_bolt_targets_nearest() {
        let mut arena = Arena::new(&[Vec2::new(0.0, 400.0), Vec2::new(200.0, 0.0)]);
        let mut w = Weapon::new(WeaponId::ArcaneBolt);
        arena.step(&mut w, caster_at(Vec2::ZERO), 0.016);

        assert_eq!(arena.spawns.len(), 1);
        let spec = arena.spawns.drain().next().unwrap();
        assert!(spec.vel.x > 0.0 && spec.vel.y.abs() < 1e-3);
        assert_eq!(spec.damage, 15.0);
        assert_eq!(spec.pierce, 0);
        assert!((spec.pos.x - 54.0).abs() < 1e-3);
    }

    #[test]
    fn test_bolt_respects_cooldown() {
        let mut arena = Arena::new(&[Vec2::new(200.0, 0.0)]);
        let mut w = Weapon::new(WeaponId::ArcaneBolt);
        arena.step(&mut w, caster_at(Vec2::ZERO), 0.016);
        for _ in 0..10 {
            arena.step(&mut w, caster_at(Vec2::ZERO), 0.05);
        }
        // 0.516s elapsed < 0.85s cooldown
        assert_eq!(arena.spawns.len(), 1);
    }

    #[test]
    fn test_bolt_damage_scales_with_mult() {
        let mut arena = Arena::new(&[Vec2::new(200.0, 0.0)]);
        let mut w = Weapon::new(WeaponId::ArcaneBolt);
        w.level = 5;
        let mut caster = caster_at(Vec2::ZERO);
        caster.damage_mult = 1.5;
        arena.step(&mut w, caster, 0.016);
        let spec = arena.spawns.drain().next().unwrap();
        assert_eq!(spec.damage, 53.0);
        assert_eq!(spec.pierce, 2);
    }

    #[test]
    fn test_frost_fan_is_symmetric() {
        let mut arena = Arena::new(&[Vec2::new(300.0, 0.0)]);
        let mut w = Weapon::new(WeaponId::FrostShards);
        arena.step(&mut w, caster_at(Vec2::ZERO), 0.016);

        let specs: Vec<_> = arena.spawns.drain().collect();
        assert_eq!(specs.len(), 4);
        let first = specs[0].vel.y;
        let last = specs[3].vel.y;
        assert!((first + last).abs() < 1e-2);
        assert!(specs.iter().all(|s| s.vel.x > 0.0));
    }

    #[test]
    fn test_fan_directions_single() {
        let dirs = fan_directions(Vec2::X, 1, 1.0);
        assert_eq!(dirs.len(), 1);
        assert!((dirs[0].y + 0.5f32.sin()).abs() < 1e-5);
    }
}
