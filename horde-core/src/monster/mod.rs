//! Monster entity.
//!
//! Monsters seek the player with a small sinusoidal heading wobble. Knockback
//! is a separate velocity that decays geometrically and is integrated on top
//! of the seek motion. Stats are fixed at spawn from the director's intensity.

use bevy::math::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    KNOCKBACK_DECAY, MONSTER_MAX_SPEED, MONSTER_MIN_SPEED, MONSTER_RADIUS, XP_DROP_MAX,
    XP_DROP_MIN,
};
use crate::engine::pool::{Entity, EntityId};
use crate::fx::VisualHandle;
use crate::math::{clamp, rand_range, VecExt};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monster {
    pub id: EntityId,
    pub visual: VisualHandle,
    /// Sprite variant index into the monster asset table.
    pub variant: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub knock_vel: Vec2,
    pub radius: f32,
    pub max_hp: f32,
    pub hp: f32,
    pub contact_damage: f32,
    /// Director intensity at spawn time.
    pub level: u32,
    pub dead: bool,
    /// Wobble phase; randomized so a batch does not move in lockstep.
    phase: f32,
}

impl Monster {
    pub fn new<R: Rng + ?Sized>(
        id: EntityId,
        visual: VisualHandle,
        variant: u32,
        pos: Vec2,
        level: u32,
        rng: &mut R,
    ) -> Self {
        let max_hp = Self::max_hp_for_level(level);
        Self {
            id,
            visual,
            variant,
            pos,
            vel: Vec2::ZERO,
            knock_vel: Vec2::ZERO,
            radius: MONSTER_RADIUS,
            max_hp,
            hp: max_hp,
            contact_damage: Self::contact_damage_for_level(level),
            level,
            dead: false,
            phase: rand_range(rng, 0.0, 10.0),
        }
    }

    pub fn max_hp_for_level(level: u32) -> f32 {
        28.0 + level as f32 * 9.0
    }

    pub fn contact_damage_for_level(level: u32) -> f32 {
        clamp(6.0 + level as f32 * 1.2, 6.0, 28.0)
    }

    /// Seek speed grows with the player's level and the monster's own bulk.
    pub fn seek_speed(&self, player_level: u32) -> f32 {
        let lvl = player_level.max(1) as f32;
        clamp(
            MONSTER_MIN_SPEED + (lvl - 1.0) * 6.0 + self.max_hp * 0.15,
            MONSTER_MIN_SPEED,
            MONSTER_MAX_SPEED,
        )
    }

    pub fn update(&mut self, dt: f32, player_pos: Vec2, player_level: u32) {
        if self.dead {
            return;
        }
        self.phase += dt;

        let dir = (player_pos - self.pos).safe_norm();
        let wobble = (self.phase * 6.0).sin() * 0.35;
        self.vel = dir.rotated(wobble * 0.2) * self.seek_speed(player_level);

        self.knock_vel *= KNOCKBACK_DECAY.powf(dt);
        self.pos += self.vel * dt + self.knock_vel * dt;
    }

    /// Applies damage and knockback. Returns true if this hit was the killing blow.
    /// Hits on an already-dead monster are ignored.
    pub fn hit(&mut self, damage: f32, knock_dir: Vec2, knockback: f32) -> bool {
        if self.dead {
            return false;
        }
        self.hp = clamp(self.hp - damage, 0.0, self.max_hp);
        self.knock_vel += knock_dir * knockback;
        if self.hp <= 0.0 {
            self.dead = true;
            return true;
        }
        false
    }

    /// Pull toward a point, scaled by `1 - dist/radius`. Used by gravity zones.
    pub fn pull_toward(&mut self, center: Vec2, strength: f32, radius: f32, dt: f32) -> Vec2 {
        let d = center - self.pos;
        let dist = d.length();
        let dir = if dist <= 1.0 { Vec2::X } else { d / dist };
        self.knock_vel += dir * strength * dt * (1.0 - dist / radius);
        dir
    }

    /// XP orb value dropped on death.
    pub fn xp_value(&self) -> u32 {
        let raw = 1 + (self.max_hp / 20.0).floor() as u32;
        raw.clamp(XP_DROP_MIN, XP_DROP_MAX)
    }
}

impl Entity for Monster {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::rng_from_seed;

    fn monster_at(pos: Vec2, level: u32) -> Monster {
        let mut rng = rng_from_seed(1);
        Monster::new(EntityId(1), VisualHandle(1), 0, pos, level, &mut rng)
    }

    #[test]
    fn test_stats_scale_with_level() {
        let m = monster_at(Vec2::ZERO, 1);
        assert_eq!(m.max_hp, 37.0);
        assert_eq!(m.hp, 37.0);
        assert!((m.contact_damage - 7.2).abs() < 1e-5);
        assert_eq!(Monster::contact_damage_for_level(40), 28.0);
    }

    #[test]
    fn test_seek_speed_bounds() {
        let m = monster_at(Vec2::ZERO, 1);
        // 120 + 0 + 37 * 0.15
        assert!((m.seek_speed(1) - 125.55).abs() < 1e-3);
        assert_eq!(m.seek_speed(100), MONSTER_MAX_SPEED);
    }

    #[test]
    fn test_moves_toward_player() {
        let mut m = monster_at(Vec2::new(500.0, 0.0), 1);
        let before = m.pos.distance(Vec2::ZERO);
        m.update(0.05, Vec2::ZERO, 1);
        assert!(m.pos.distance(Vec2::ZERO) < before);
    }

    #[test]
    fn test_knockback_decays() {
        let mut m = monster_at(Vec2::new(500.0, 0.0), 1);
        m.hit(1.0, Vec2::X, 600.0);
        let k0 = m.knock_vel.length();
        m.update(0.05, Vec2::ZERO, 1);
        let k1 = m.knock_vel.length();
        assert!(k1 < k0);
        assert!((k1 - 600.0 * 0.001f32.powf(0.05)).abs() < 1e-2);
    }

    #[test]
    fn test_hit_kills_once() {
        let mut m = monster_at(Vec2::ZERO, 1);
        assert!(!m.hit(10.0, Vec2::X, 0.0));
        assert!(m.hit(100.0, Vec2::X, 0.0));
        assert!(m.dead);
        assert_eq!(m.hp, 0.0);
        assert!(!m.hit(100.0, Vec2::X, 0.0));
    }

    #[test]
    fn test_dead_monster_does_not_move() {
        let mut m = monster_at(Vec2::new(100.0, 0.0), 1);
        m.hit(1000.0, Vec2::ZERO, 0.0);
        m.update(0.05, Vec2::ZERO, 1);
        assert_eq!(m.pos, Vec2::new(100.0, 0.0));
    }

    #[test]
    fn test_pull_degenerate_center() {
        let mut m = monster_at(Vec2::new(0.5, 0.0), 1);
        let dir = m.pull_toward(Vec2::ZERO, 100.0, 200.0, 0.1);
        assert_eq!(dir, Vec2::X);
        assert!(m.knock_vel.x > 0.0);
    }

    #[test]
    fn test_xp_value_clamped() {
        assert_eq!(monster_at(Vec2::ZERO, 1).xp_value(), 2);
        assert_eq!(monster_at(Vec2::ZERO, 50).xp_value(), XP_DROP_MAX);
    }
}
