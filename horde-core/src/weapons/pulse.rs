use super::{strike, Cooldown, WeaponCtx};
use crate::fx::Effect;
use crate::math::{clamp, VecExt};

const NOVA_COLOR: u32 = 0xbfe8ff;

/// Radial shockwave around the caster.
pub(super) fn nova(level: u32, cd: &mut Cooldown, dt: f32, ctx: &mut WeaponCtx<'_>) {
    if !cd.tick(dt) {
        return;
    }
    let lvl = level as f32;
    let c = ctx.caster;
    cd.reset(clamp((6.5 - lvl * 0.7) * c.cooldown_mult, 1.8, 7.2));

    let radius = (180.0 + lvl * 55.0) * c.area_mult;
    let damage = ((16.0 + lvl * 10.0) * c.damage_mult).round();

    ctx.effects.push(Effect::Shockwave {
        pos: c.pos,
        radius,
        color: NOVA_COLOR,
        life: 0.45,
    });
    ctx.effects.push(Effect::BurstGlyph {
        pos: c.pos,
        glyph: '✺',
        color: NOVA_COLOR,
        count: 10,
        speed: 260.0,
        life: 0.25,
    });

    for m in ctx.monsters.iter_mut() {
        if m.dead {
            continue;
        }
        let d = m.pos - c.pos;
        if d.length() <= radius {
            strike(m, damage, d.safe_norm(), 760.0, ctx.effects, NOVA_COLOR, 20.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy::math::Vec2;

    use super::super::test_support::*;
    use super::super::{Weapon, WeaponId};

    #[test]
    fn test_nova_hits_inside_radius_only() {
        // level 1 radius: 235
        let mut arena = Arena::new(&[Vec2::new(200.0, 0.0), Vec2::new(300.0, 0.0)]);
        let mut w = Weapon::new(WeaponId::Nova);
        arena.step(&mut w, caster_at(Vec2::ZERO), 0.016);

        assert_eq!(arena.monsters[0].max_hp - arena.monsters[0].hp, 26.0);
        assert_eq!(arena.monsters[1].hp, arena.monsters[1].max_hp);
        assert!(arena.monsters[0].knock_vel.x > 700.0);
    }

    #[test]
    fn test_nova_area_mult_extends_reach() {
        let mut arena = Arena::new(&[Vec2::new(300.0, 0.0)]);
        let mut w = Weapon::new(WeaponId::Nova);
        let mut caster = caster_at(Vec2::ZERO);
        caster.area_mult = 1.5;
        arena.step(&mut w, caster, 0.016);
        assert_eq!(arena.damaged(), 1);
    }

    #[test]
    fn test_nova_cooldown_floor() {
        let mut arena = Arena::new(&[Vec2::new(100.0, 0.0)]);
        let mut w = Weapon::new(WeaponId::Nova);
        let mut caster = caster_at(Vec2::ZERO);
        caster.cooldown_mult = 0.1;
        arena.step(&mut w, caster, 0.016);
        let hp = arena.monsters[0].hp;
        // 1.8s floor: nothing before it elapses
        for _ in 0..35 {
            arena.step(&mut w, caster, 0.05);
        }
        assert_eq!(arena.monsters[0].hp, hp);
        arena.step(&mut w, caster, 0.1);
        assert!(arena.monsters[0].hp < hp);
    }
}
