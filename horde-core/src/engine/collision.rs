//! Brute-force overlap tests run once per frame after every entity moved.
//!
//! All passes walk the arena slices in storage order, so hit order (and with
//! it pierce spending) is deterministic for a given arena.

use crate::fx::EffectQueue;
use crate::monster::Monster;
use crate::pickup::Pickup;
use crate::player::Player;
use crate::projectile::Projectile;

const CONTACT_COLOR: u32 = 0xff5263;

/// Monster bodies touching the player. At most one hit lands per
/// invulnerability window. Returns the total damage dealt.
pub fn resolve_contact_damage(
    player: &mut Player,
    monsters: &[Monster],
    now: f32,
    effects: &mut EffectQueue,
) -> f32 {
    let mut total = 0.0;
    for m in monsters {
        if m.dead || player.dead {
            continue;
        }
        if m.pos.distance(player.pos) >= m.radius + player.radius {
            continue;
        }
        if !player.can_take_contact_hit(now) {
            continue;
        }
        let dealt = player.take_damage(m.contact_damage, now);
        effects.damage_number(player.pos, dealt, CONTACT_COLOR, 22.0);
        effects.spark(player.pos, CONTACT_COLOR, 0.8);
        total += dealt;
    }
    total
}

/// Projectile against monster, `distance <= r1 + r2`. A projectile keeps
/// hitting down the monster list until its pierce budget runs out.
/// Returns the number of hits.
pub fn resolve_projectile_hits(
    projectiles: &mut [Projectile],
    monsters: &mut [Monster],
    effects: &mut EffectQueue,
) -> usize {
    let mut hits = 0;
    for p in projectiles.iter_mut() {
        if p.dead {
            continue;
        }
        for m in monsters.iter_mut() {
            if m.dead || m.pos.distance(p.pos) > m.radius + p.radius {
                continue;
            }
            m.hit(p.damage, p.knock_dir, p.knockback);
            effects.damage_number(m.pos, p.damage, p.color, 18.0);
            effects.spark(p.pos, p.color, 1.0);
            if let Some(on_hit) = &p.on_hit {
                on_hit.apply(m.pos, effects);
            }
            hits += 1;

            p.consume_pierce();
            if p.dead {
                break;
            }
        }
    }
    hits
}

/// Player against pickups, `distance < r + pickup_radius`. Pickups that
/// cannot be taken (equipment with full slots) stay on the ground.
/// Returns the number collected.
pub fn resolve_pickups(player: &mut Player, pickups: &mut [Pickup]) -> usize {
    let mut collected = 0;
    for x in pickups.iter_mut() {
        if x.dead {
            continue;
        }
        if x.pos.distance(player.pos) < x.radius + player.pickup_radius && x.collect(player) {
            collected += 1;
        }
    }
    collected
}

#[cfg(test)]
mod tests {
    use bevy::math::Vec2;

    use super::*;
    use crate::engine::pool::EntityId;
    use crate::fx::{ProjectileShape, VisualHandle};
    use crate::math::rng_from_seed;
    use crate::pickup::PickupPayload;
    use crate::projectile::ProjectileSpec;

    fn monsters(xs: &[f32]) -> Vec<Monster> {
        let mut rng = rng_from_seed(2);
        xs.iter()
            .enumerate()
            .map(|(i, x)| {
                Monster::new(
                    EntityId(i as u64 + 1),
                    VisualHandle(0),
                    0,
                    Vec2::new(*x, 0.0),
                    1,
                    &mut rng,
                )
            })
            .collect()
    }

    fn bolt(pierce: u32) -> Projectile {
        Projectile::from_spec(
            EntityId(100),
            VisualHandle(0),
            ProjectileSpec {
                pos: Vec2::ZERO,
                vel: Vec2::X,
                radius: 10.0,
                damage: 5.0,
                pierce,
                life: 1.0,
                color: 0xffffff,
                shape: ProjectileShape::Orb,
                knock_dir: Vec2::X,
                knockback: 0.0,
                on_hit: None,
            },
        )
    }

    #[test]
    fn test_pierce_budget_limits_hits() {
        let mut ms = monsters(&[0.0, 5.0, 10.0, 15.0]);
        let mut ps = vec![bolt(1)];
        let mut fx = EffectQueue::new();
        let hits = resolve_projectile_hits(&mut ps, &mut ms, &mut fx);
        assert_eq!(hits, 2);
        assert!(ps[0].dead);
        assert_eq!(ms.iter().filter(|m| m.hp < m.max_hp).count(), 2);
        // list order decides who is hit
        assert!(ms[0].hp < ms[0].max_hp && ms[1].hp < ms[1].max_hp);
    }

    #[test]
    fn test_touching_edge_counts() {
        // radii 34 + 10
        let mut ms = monsters(&[44.0]);
        let mut ps = vec![bolt(0)];
        let mut fx = EffectQueue::new();
        assert_eq!(resolve_projectile_hits(&mut ps, &mut ms, &mut fx), 1);
    }

    #[test]
    fn test_dead_monsters_are_skipped() {
        let mut ms = monsters(&[0.0, 5.0]);
        ms[0].dead = true;
        let mut ps = vec![bolt(0)];
        let mut fx = EffectQueue::new();
        resolve_projectile_hits(&mut ps, &mut ms, &mut fx);
        assert_eq!(ms[0].hp, ms[0].max_hp);
        assert!(ms[1].hp < ms[1].max_hp);
    }

    #[test]
    fn test_contact_respects_iframes() {
        let ms = monsters(&[10.0, 20.0]);
        let mut player = Player::new(VisualHandle(0), Vec2::ZERO);
        let mut fx = EffectQueue::new();
        let dealt = resolve_contact_damage(&mut player, &ms, 1.0, &mut fx);
        assert_eq!(dealt, ms[0].contact_damage.round());
        assert_eq!(resolve_contact_damage(&mut player, &ms, 1.2, &mut fx), 0.0);
        assert!(resolve_contact_damage(&mut player, &ms, 1.8, &mut fx) > 0.0);
    }

    #[test]
    fn test_contact_needs_overlap() {
        // 34 + 34 = 68 is not strictly less than 68
        let ms = monsters(&[68.0]);
        let mut player = Player::new(VisualHandle(0), Vec2::ZERO);
        let mut fx = EffectQueue::new();
        assert_eq!(resolve_contact_damage(&mut player, &ms, 1.0, &mut fx), 0.0);
    }

    #[test]
    fn test_pickup_radius_strict() {
        let mut player = Player::new(VisualHandle(0), Vec2::ZERO);
        // 18 + 90 = 108
        let mut xs = vec![
            Pickup::new(EntityId(1), VisualHandle(1), Vec2::new(107.0, 0.0), PickupPayload::Xp(2)),
            Pickup::new(EntityId(2), VisualHandle(2), Vec2::new(108.0, 0.0), PickupPayload::Xp(2)),
        ];
        assert_eq!(resolve_pickups(&mut player, &mut xs), 1);
        assert!(xs[0].dead);
        assert!(!xs[1].dead);
        assert_eq!(player.xp, 2);
    }
}
