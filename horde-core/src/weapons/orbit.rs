//! Orbiting blade rings: orbit blades and astral blades.
//!
//! Blade positions are recomputed every frame from the ring phase; damage is
//! contact-style and only applied on the ring's own damage tick.

use std::f32::consts::{FRAC_PI_2, TAU};

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use super::{strike, WeaponCtx};
use crate::fx::{Effect, ProjectileShape};
use crate::math::{clamp, rand_range, VecExt};
use crate::projectile::ProjectileSpec;

const ORBIT_COLOR: u32 = 0xd8ff6a;
const ASTRAL_COLOR: u32 = 0x9cf8ff;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrbitState {
    /// Ring phase clock.
    pub t: f32,
    pub tick: f32,
    pub vfx_tick: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AstralState {
    pub ring: OrbitState,
    pub shot_cd: f32,
}

struct Ring {
    blades: u32,
    radius: f32,
    rot_speed: f32,
    damage: f32,
    /// Blade-to-monster distance that counts as contact.
    reach: f32,
    knockback: f32,
    color: u32,
    spark: f32,
    vfx_period: f32,
}

/// Advances the ring and returns whether this frame was a damage tick.
fn spin(ring: &Ring, st: &mut OrbitState, dt: f32, ctx: &mut WeaponCtx<'_>) -> bool {
    st.t += dt;
    st.tick -= dt;
    st.vfx_tick -= dt;

    let do_vfx = st.vfx_tick <= 0.0;
    if do_vfx {
        st.vfx_tick = ring.vfx_period;
    }
    let damage_tick = st.tick <= 0.0;
    let center = ctx.caster.pos;

    for i in 0..ring.blades {
        let a = i as f32 / ring.blades as f32 * TAU + st.t * ring.rot_speed;
        let pos = center + Vec2::from_angle(a) * ring.radius;

        if do_vfx {
            ctx.effects.push(Effect::BladeSlash {
                pos,
                angle: a + FRAC_PI_2,
                color: ring.color,
                life: 0.14,
            });
        }

        if !damage_tick {
            continue;
        }
        for m in ctx.monsters.iter_mut() {
            if m.dead || m.pos.distance(pos) >= ring.reach {
                continue;
            }
            let knock = (m.pos - center).safe_norm();
            strike(m, ring.damage, knock, ring.knockback, ctx.effects, ring.color, 18.0);
            ctx.effects.spark(pos, ring.color, ring.spark);
        }
    }
    damage_tick
}

pub(super) fn orbit_blades(level: u32, st: &mut OrbitState, dt: f32, ctx: &mut WeaponCtx<'_>) {
    let lvl = level as f32;
    let c = ctx.caster;
    let ring = Ring {
        blades: (2 + (level.max(1) - 1) / 2).clamp(2, 6),
        radius: (84.0 + lvl * 6.0) * c.area_mult,
        rot_speed: 2.2 + lvl * 0.18,
        damage: ((6.0 + lvl * 4.0) * c.damage_mult).round(),
        reach: 44.0,
        knockback: 260.0,
        color: ORBIT_COLOR,
        spark: 0.8,
        vfx_period: 0.05,
    };
    if spin(&ring, st, dt, ctx) {
        st.tick = clamp((0.18 - lvl * 0.015) * c.cooldown_mult, 0.045, 0.22);
    }
}

pub(super) fn astral_blades(level: u32, st: &mut AstralState, dt: f32, ctx: &mut WeaponCtx<'_>) {
    let lvl = level as f32;
    let c = ctx.caster;
    let ring = Ring {
        blades: (6 + level * 2).clamp(6, 10),
        radius: (98.0 + lvl * 10.0) * c.area_mult,
        rot_speed: 2.6 + lvl * 0.25,
        damage: ((10.0 + lvl * 6.0) * c.damage_mult).round(),
        reach: 46.0,
        knockback: 360.0,
        color: ASTRAL_COLOR,
        spark: 0.95,
        vfx_period: 0.045,
    };
    if spin(&ring, &mut st.ring, dt, ctx) {
        st.ring.tick = clamp(0.12 * c.cooldown_mult, 0.06, 0.16);
    }

    st.shot_cd -= dt;
    if st.shot_cd > 0.0 {
        return;
    }
    st.shot_cd = clamp(1.35 * c.cooldown_mult, 0.7, 1.6);

    let shots = (6 + level * 2).clamp(6, 12);
    let damage = ((18.0 + lvl * 8.0) * c.damage_mult).round();
    for i in 0..shots {
        let a = i as f32 / shots as f32 * TAU + rand_range(ctx.rng, -0.08, 0.08);
        let dir = Vec2::from_angle(a);
        ctx.spawns.spawn_projectile(ProjectileSpec {
            pos: c.pos + dir * 54.0,
            vel: dir * 760.0,
            radius: 9.0,
            damage,
            pierce: 1,
            life: 1.0,
            color: ASTRAL_COLOR,
            shape: ProjectileShape::Orb,
            knock_dir: dir,
            knockback: 560.0,
            on_hit: None,
        });
        if i % 2 == 0 {
            ctx.effects.spark(c.pos + dir * 38.0, ASTRAL_COLOR, 0.6);
        }
    }
}
