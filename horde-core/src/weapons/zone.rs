//! Lingering area weapons: fire trail embers, gravity wells and the glacial
//! singularity core. Each cast leaves a [`Zone`] that lives on in the weapon
//! state and ticks damage on its own clock.

use std::f32::consts::TAU;

use bevy::math::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{nearest_monster, strike, Cooldown, WeaponCtx};
use crate::fx::{Effect, ProjectileShape};
use crate::math::{clamp, rand_range, VecExt};
use crate::projectile::ProjectileSpec;

const EMBER_COLOR: u32 = 0xff7a2a;
const EMBER_NUMBER_COLOR: u32 = 0xffc36b;
const EMBER_SPARK_COLOR: u32 = 0xffa34a;
const WELL_COLOR: u32 = 0xb39bff;
const FROST_COLOR: u32 = 0x7ad1ff;
const SHATTER_COLOR: u32 = 0xbfe8ff;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub pos: Vec2,
    pub life: f32,
    /// Time until the next damage tick; a fresh zone ticks immediately.
    pub tick: f32,
    /// Glacial cores only: terminal burst already fired.
    pub burst: bool,
}

impl Zone {
    fn at(pos: Vec2, life: f32) -> Self {
        Self {
            pos,
            life,
            tick: 0.0,
            burst: false,
        }
    }
}

/// Cooldown plus the zones it has dropped so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneField {
    pub cd: Cooldown,
    pub zones: Vec<Zone>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrailState {
    pub spawn: f32,
    pub embers: Vec<Zone>,
}

pub(super) fn fire_trail(level: u32, st: &mut TrailState, dt: f32, ctx: &mut WeaponCtx<'_>) {
    let lvl = level as f32;
    let c = ctx.caster;
    st.spawn -= dt;

    let moving = c.vel.length() > 1.0;
    let base_interval = if moving { 0.07 } else { 0.18 };
    let interval = clamp(base_interval * c.cooldown_mult, 0.04, 0.22);
    let radius = (54.0 + lvl * 6.0) * c.area_mult;
    let damage = ((4.0 + lvl * 3.0) * c.damage_mult).round();

    if st.spawn <= 0.0 && moving {
        st.spawn = interval;
        st.embers.push(Zone::at(c.pos, 1.15));
        ctx.effects.push(Effect::FlamePuff {
            pos: c.pos,
            color: EMBER_COLOR,
            life: 0.55,
            size: 26.0,
        });
    }

    for ember in st.embers.iter_mut() {
        ember.life -= dt;
        ember.tick -= dt;
        if ember.tick <= 0.0 {
            ember.tick = 0.2;
            for m in ctx.monsters.iter_mut() {
                if m.dead || m.pos.distance(ember.pos) > radius {
                    continue;
                }
                let dir = (m.pos - ember.pos).safe_norm();
                strike(m, damage, dir, 120.0, ctx.effects, EMBER_NUMBER_COLOR, 16.0);
                ctx.effects.spark(m.pos, EMBER_SPARK_COLOR, 0.65);
            }
        }
        if ctx.rng.gen::<f32>() < dt * 3.0 {
            ctx.effects.push(Effect::FlamePuff {
                pos: ember.pos,
                color: EMBER_COLOR,
                life: 0.42,
                size: 22.0,
            });
        }
    }

    st.embers.retain(|e| e.life > 0.0);
}

/// Per-frame behavior shared by wells and cores.
struct Field {
    radius: f32,
    pull: f32,
    damage: f32,
    tick: f32,
    color: u32,
    number_size: f32,
    /// Per-victim spark on damage ticks, if any.
    hit_spark: Option<f32>,
    /// Chance per second of an idle pulse spark.
    pulse_rate: f32,
}

fn drag_and_tick(field: &Field, zone: &mut Zone, dt: f32, ctx: &mut WeaponCtx<'_>) {
    zone.life -= dt;
    zone.tick -= dt;

    if ctx.rng.gen::<f32>() < dt * field.pulse_rate {
        ctx.effects.spark(zone.pos, field.color, 0.55);
    }

    let ticking = zone.tick <= 0.0;
    for m in ctx.monsters.iter_mut() {
        if m.dead || m.pos.distance(zone.pos) > field.radius {
            continue;
        }
        let dir = m.pull_toward(zone.pos, field.pull, field.radius, dt);
        if ticking {
            strike(m, field.damage, dir, 0.0, ctx.effects, field.color, field.number_size);
            if let Some(strength) = field.hit_spark {
                ctx.effects.spark(m.pos, field.color, strength);
            }
        }
    }
    if ticking {
        zone.tick = field.tick;
    }
}

pub(super) fn gravity_well(level: u32, st: &mut ZoneField, dt: f32, ctx: &mut WeaponCtx<'_>) {
    let lvl = level as f32;
    let c = ctx.caster;

    if st.cd.tick(dt) {
        st.cd.reset(clamp((5.2 - lvl * 0.55) * c.cooldown_mult, 1.9, 5.8));
        st.zones.push(Zone::at(c.pos, 1.15));
        ctx.effects.push(Effect::Implosion {
            pos: c.pos,
            radius: 260.0 * c.area_mult,
            color: WELL_COLOR,
            life: 0.55,
        });
    }

    let field = Field {
        radius: (220.0 + lvl * 26.0) * c.area_mult,
        pull: 720.0 + lvl * 120.0,
        damage: ((10.0 + lvl * 6.0) * c.damage_mult).round(),
        tick: 0.22,
        color: WELL_COLOR,
        number_size: 17.0,
        hit_spark: Some(0.9),
        pulse_rate: 5.0,
    };
    for zone in st.zones.iter_mut() {
        drag_and_tick(&field, zone, dt, ctx);
    }
    st.zones.retain(|z| z.life > 0.0);
}

pub(super) fn glacial_singularity(
    level: u32,
    st: &mut ZoneField,
    dt: f32,
    ctx: &mut WeaponCtx<'_>,
) {
    let lvl = level as f32;
    let c = ctx.caster;

    if st.cd.tick(dt) {
        st.cd.reset(clamp((4.6 - lvl * 0.45) * c.cooldown_mult, 1.6, 5.2));
        let pos = nearest_monster(ctx.monsters, c.pos, f32::INFINITY, |_| false)
            .map(|i| ctx.monsters[i].pos)
            .unwrap_or(c.pos);
        st.zones.push(Zone::at(pos, 1.25));
        ctx.effects.push(Effect::Implosion {
            pos,
            radius: 320.0 * c.area_mult,
            color: FROST_COLOR,
            life: 0.65,
        });
        ctx.effects.spark(pos, FROST_COLOR, 1.1);
    }

    let field = Field {
        radius: (290.0 + lvl * 28.0) * c.area_mult,
        pull: 920.0 + lvl * 160.0,
        damage: ((14.0 + lvl * 7.0) * c.damage_mult).round(),
        tick: 0.2,
        color: FROST_COLOR,
        number_size: 18.0,
        hit_spark: None,
        pulse_rate: 4.0,
    };
    for zone in st.zones.iter_mut() {
        drag_and_tick(&field, zone, dt, ctx);
        if !zone.burst && zone.life <= 0.001 {
            zone.burst = true;
            shatter(level, zone.pos, ctx);
        }
    }
    st.zones.retain(|z| z.life > 0.0);
}

/// Terminal radial burst of a collapsing core.
fn shatter(level: u32, at: Vec2, ctx: &mut WeaponCtx<'_>) {
    let c = ctx.caster;
    let shots = (10 + level * 2).clamp(10, 18);
    let damage = ((18.0 + level as f32 * 8.0) * c.damage_mult).round();

    ctx.effects.push(Effect::Shockwave {
        pos: at,
        radius: 360.0 * c.area_mult,
        color: SHATTER_COLOR,
        life: 0.42,
    });
    ctx.effects.spark(at, SHATTER_COLOR, 1.8);

    for i in 0..shots {
        let a = i as f32 / shots as f32 * TAU + rand_range(ctx.rng, -0.1, 0.1);
        let dir = Vec2::from_angle(a);
        ctx.spawns.spawn_projectile(ProjectileSpec {
            pos: at + dir * 26.0,
            vel: dir * 820.0,
            radius: 9.0,
            damage,
            pierce: 1,
            life: 1.0,
            color: FROST_COLOR,
            shape: ProjectileShape::Orb,
            knock_dir: dir,
            knockback: 520.0,
            on_hit: None,
        });
    }
}
