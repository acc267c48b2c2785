//! Chain lightning and its fusion, stormcaller.
//!
//! Targets are tracked by slice index within one cast. A monster killed by an
//! earlier link (or by another weapon this frame) is never picked again: both
//! the jump search and the stormcaller strike bases re-check `dead`.

use bevy::math::Vec2;
use rand::Rng;

use super::{nearest_monster, strike, Cooldown, WeaponCtx};
use crate::fx::{Effect, EffectQueue};
use crate::math::{clamp, rand_range, VecExt};

const CHAIN_COLOR: u32 = 0x9cf8ff;
const STORM_COLOR: u32 = 0xbfe8ff;

/// Fraction of stormcaller strike damage dealt by its local chain links.
const STORM_CHAIN_FACTOR: f32 = 0.62;

fn arc(effects: &mut EffectQueue, from: Vec2, to: Vec2, color: u32, heavy: bool) {
    let (life, width, segments, chaos, branches) = if heavy {
        (0.18, 3.2, 14, 30.0, 3)
    } else {
        (0.14, 2.6, 12, 22.0, 2)
    };
    effects.push(Effect::LightningArc {
        from,
        to,
        color,
        life,
        width,
        segments,
        chaos,
        branches,
    });
}

pub(super) fn chain_lightning(level: u32, cd: &mut Cooldown, dt: f32, ctx: &mut WeaponCtx<'_>) {
    if !cd.tick(dt) {
        return;
    }
    let lvl = level as f32;
    let c = ctx.caster;
    cd.reset(clamp((3.8 - lvl * 0.35) * c.cooldown_mult, 1.05, 4.2));

    let Some(first) = nearest_monster(ctx.monsters, c.pos, f32::INFINITY, |_| false) else {
        return;
    };

    let jumps = (2 + (level.max(1) - 1) / 2).clamp(2, 6);
    let range = (260.0 + lvl * 40.0) * c.area_mult;
    let damage = ((14.0 + lvl * 7.0) * c.damage_mult).round();

    let mut hit: Vec<usize> = Vec::with_capacity(jumps as usize);
    let mut from = c.pos;
    let mut current = Some(first);

    for _ in 0..jumps {
        let Some(idx) = current else { break };
        hit.push(idx);

        let m = &mut ctx.monsters[idx];
        let dir = (m.pos - from).safe_norm();
        strike(m, damage, dir, 420.0, ctx.effects, CHAIN_COLOR, 19.0);
        let to = m.pos;
        arc(ctx.effects, from, to, CHAIN_COLOR, false);
        ctx.effects.spark(to, CHAIN_COLOR, 1.35);

        from = to;
        current = nearest_monster(ctx.monsters, from, range, |i| hit.contains(&i));
    }
}

pub(super) fn stormcaller(level: u32, cd: &mut Cooldown, dt: f32, ctx: &mut WeaponCtx<'_>) {
    if !cd.tick(dt) {
        return;
    }
    let lvl = level as f32;
    let c = ctx.caster;
    cd.reset(clamp((2.2 - lvl * 0.25) * c.cooldown_mult, 1.0, 2.4));

    let range = 520.0 * c.area_mult;
    let strikes = (2 + level).clamp(2, 5);
    let damage = ((26.0 + lvl * 10.0) * c.damage_mult).round();
    let link_damage = (damage * STORM_CHAIN_FACTOR).round();
    let link_range = 320.0 * c.area_mult;
    let jumps = (2 + level).clamp(2, 4) as usize;

    // nearest first, so the random pick favors close targets
    let mut candidates: Vec<(usize, f32)> = ctx
        .monsters
        .iter()
        .enumerate()
        .filter(|(_, m)| !m.dead)
        .map(|(i, m)| (i, m.pos.distance(c.pos)))
        .filter(|(_, d)| *d <= range)
        .collect();
    if candidates.is_empty() {
        return;
    }
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
    let candidates: Vec<usize> = candidates.into_iter().map(|(i, _)| i).collect();
    let window = candidates.len().min(10 + level as usize * 4);

    for _ in 0..strikes {
        let base = candidates[ctx.rng.gen_range(0..window)];
        if ctx.monsters[base].dead {
            continue;
        }

        let m = &mut ctx.monsters[base];
        let dir = (m.pos - c.pos).safe_norm();
        strike(m, damage, dir, 520.0, ctx.effects, STORM_COLOR, 22.0);
        let impact = m.pos;
        ctx.effects.spark(impact, STORM_COLOR, 1.8);

        let sky = impact
            + Vec2::new(
                rand_range(ctx.rng, -40.0, 40.0),
                -260.0 - rand_range(ctx.rng, 0.0, 140.0),
            );
        arc(ctx.effects, sky, impact, STORM_COLOR, true);

        let mut already = vec![base];
        let mut from = impact;
        for _ in 0..jumps {
            let next = candidates
                .iter()
                .copied()
                .filter(|&i| !ctx.monsters[i].dead && !already.contains(&i))
                .map(|i| (i, ctx.monsters[i].pos.distance(from)))
                .filter(|(_, d)| *d <= link_range)
                .min_by(|a, b| a.1.total_cmp(&b.1));
            let Some((idx, _)) = next else { break };
            already.push(idx);

            let m = &mut ctx.monsters[idx];
            let dir = (m.pos - from).safe_norm();
            strike(m, link_damage, dir, 420.0, ctx.effects, CHAIN_COLOR, 18.0);
            let to = m.pos;
            arc(ctx.effects, from, to, CHAIN_COLOR, false);
            ctx.effects.spark(to, CHAIN_COLOR, 1.2);
            from = to;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::{Weapon, WeaponId};
    use super::*;

    #[test]
    fn test_chain_jumps_within_range() {
        // level 1: 2 jumps, range 300
        let mut arena = Arena::new(&[
            Vec2::new(100.0, 0.0),
            Vec2::new(350.0, 0.0),
            Vec2::new(600.0, 0.0),
        ]);
        let mut w = Weapon::new(WeaponId::ChainLightning);
        arena.step(&mut w, caster_at(Vec2::ZERO), 0.016);

        assert_eq!(arena.damaged(), 2);
        assert_eq!(arena.monsters[2].hp, arena.monsters[2].max_hp);
        assert_eq!(arena.monsters[0].max_hp - arena.monsters[0].hp, 21.0);
    }

    #[test]
    fn test_chain_stops_when_out_of_range() {
        let mut arena = Arena::new(&[Vec2::new(100.0, 0.0), Vec2::new(900.0, 0.0)]);
        let mut w = Weapon::new(WeaponId::ChainLightning);
        arena.step(&mut w, caster_at(Vec2::ZERO), 0.016);
        assert_eq!(arena.damaged(), 1);
    }

    #[test]
    fn test_chain_never_revisits_dead() {
        let mut arena = Arena::new(&[Vec2::new(100.0, 0.0), Vec2::new(150.0, 0.0)]);
        arena.monsters[1].dead = true;
        let mut w = Weapon::new(WeaponId::ChainLightning);
        w.level = 5;
        arena.step(&mut w, caster_at(Vec2::ZERO), 0.016);
        assert_eq!(arena.monsters[1].hp, arena.monsters[1].max_hp);
        let arcs = arena
            .effects
            .iter()
            .filter(|e| matches!(e, Effect::LightningArc { .. }))
            .count();
        assert_eq!(arcs, 1);
    }

    #[test]
    fn test_stormcaller_strikes_in_range() {
        let mut arena = Arena::new(&[Vec2::new(200.0, 0.0), Vec2::new(2000.0, 0.0)]);
        let mut w = Weapon::new(WeaponId::Stormcaller);
        arena.step(&mut w, caster_at(Vec2::ZERO), 0.016);
        assert!(arena.monsters[0].dead);
        assert_eq!(arena.monsters[1].hp, arena.monsters[1].max_hp);
    }

    #[test]
    fn test_stormcaller_local_chain() {
        let mut arena = Arena::new(&[Vec2::new(100.0, 0.0), Vec2::new(300.0, 0.0)]);
        for m in arena.monsters.iter_mut() {
            m.max_hp = 10_000.0;
            m.hp = 10_000.0;
        }

        let mut w = Weapon::new(WeaponId::Stormcaller);
        arena.step(&mut w, caster_at(Vec2::ZERO), 0.016);
        // every strike lands on one of the two and chains to the other
        assert_eq!(arena.damaged(), 2);
    }
}
