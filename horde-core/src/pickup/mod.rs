//! Pickups dropped by dying monsters: XP orbs and equipment.
//!
//! Inside the magnet radius a pickup slides toward the player, faster the
//! closer it gets. Outside it stays put; the idle bob is a presentation
//! concern and never moves `pos`.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::{EQUIPMENT_PICKUP_RADIUS, MAGNET_RADIUS_MIN, XP_PICKUP_RADIUS};
use crate::engine::pool::{Entity, EntityId};
use crate::equipment::EquipmentItem;
use crate::fx::{VisualHandle, VisualKind};
use crate::math::{clamp, VecExt};
use crate::player::Player;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PickupPayload {
    Xp(u32),
    Equipment(Box<EquipmentItem>),
}

impl PickupPayload {
    pub fn radius(&self) -> f32 {
        match self {
            PickupPayload::Xp(_) => XP_PICKUP_RADIUS,
            PickupPayload::Equipment(_) => EQUIPMENT_PICKUP_RADIUS,
        }
    }

    pub fn visual_kind(&self) -> VisualKind {
        match self {
            PickupPayload::Xp(amount) => VisualKind::XpOrb { amount: *amount },
            PickupPayload::Equipment(item) => VisualKind::Equipment {
                rarity: item.rarity,
                icon: item.icon,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: EntityId,
    pub visual: VisualHandle,
    pub pos: Vec2,
    pub radius: f32,
    pub payload: PickupPayload,
    pub dead: bool,
    /// Age in seconds, for the presentation bob.
    pub t: f32,
}

impl Pickup {
    pub fn new(id: EntityId, visual: VisualHandle, pos: Vec2, payload: PickupPayload) -> Self {
        Self {
            id,
            visual,
            pos,
            radius: payload.radius(),
            payload,
            dead: false,
            t: 0.0,
        }
    }

    pub fn is_equipment(&self) -> bool {
        matches!(self.payload, PickupPayload::Equipment(_))
    }

    /// Vertical bob offset for renderers.
    pub fn bob(&self) -> f32 {
        (self.t * 4.0).sin() * 3.0
    }

    pub fn magnet_radius(player_pickup_radius: f32) -> f32 {
        MAGNET_RADIUS_MIN.max(player_pickup_radius * 3.0)
    }

    pub fn update(&mut self, dt: f32, player_pos: Vec2, player_pickup_radius: f32) {
        if self.dead {
            return;
        }
        self.t += dt;

        let to_player = player_pos - self.pos;
        let dist = to_player.length();
        let mag = Self::magnet_radius(player_pickup_radius);
        if dist < mag {
            let pull = clamp((mag - dist) / mag, 0.0, 1.0);
            self.pos += to_player.safe_norm() * (120.0 + pull * 520.0) * dt;
        }
    }

    /// Hands the payload to `player`. XP always succeeds; equipment fails
    /// while every slot is taken, leaving the pickup on the ground.
    pub fn collect(&mut self, player: &mut Player) -> bool {
        if self.dead {
            return false;
        }
        let taken = match &self.payload {
            PickupPayload::Xp(amount) => {
                player.gain_xp(*amount);
                true
            }
            PickupPayload::Equipment(item) => player.try_equip((**item).clone()).is_ok(),
        };
        if taken {
            self.dead = true;
        }
        taken
    }
}

impl Entity for Pickup {
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
    use crate::constants::EQUIPMENT_SLOTS;
    use crate::equipment::{ItemId, Rarity, StatMods};

    fn gear() -> EquipmentItem {
        EquipmentItem {
            id: ItemId(7),
            rarity: Rarity::Rare,
            icon: 2,
            name: "Rare Equipment".into(),
            mods: StatMods::default(),
            lines: vec![],
        }
    }

    fn player() -> Player {
        Player::new(VisualHandle(0), Vec2::ZERO)
    }

    #[test]
    fn test_radius_by_payload() {
        let xp = Pickup::new(EntityId(1), VisualHandle(1), Vec2::ZERO, PickupPayload::Xp(3));
        let eq = Pickup::new(
            EntityId(2),
            VisualHandle(2),
            Vec2::ZERO,
            PickupPayload::Equipment(Box::new(gear())),
        );
        assert_eq!(xp.radius, 18.0);
        assert_eq!(eq.radius, 22.0);
        assert!(eq.is_equipment());
    }

    #[test]
    fn test_magnet_pulls_inside_radius() {
        let mut p = Pickup::new(EntityId(1), VisualHandle(1), Vec2::new(200.0, 0.0), PickupPayload::Xp(1));
        p.update(0.1, Vec2::ZERO, 90.0);
        assert!(p.pos.x < 200.0);
        assert_eq!(p.pos.y, 0.0);
    }

    #[test]
    fn test_outside_magnet_stays_put() {
        let start = Vec2::new(400.0, 0.0);
        let mut p = Pickup::new(EntityId(1), VisualHandle(1), start, PickupPayload::Xp(1));
        p.update(0.1, Vec2::ZERO, 90.0);
        assert_eq!(p.pos, start);
        assert!(p.bob().abs() <= 3.0);
    }

    #[test]
    fn test_magnet_scales_with_pickup_radius() {
        assert_eq!(Pickup::magnet_radius(50.0), 260.0);
        assert_eq!(Pickup::magnet_radius(120.0), 360.0);
    }

    #[test]
    fn test_collect_xp() {
        let mut pl = player();
        let mut p = Pickup::new(EntityId(1), VisualHandle(1), Vec2::ZERO, PickupPayload::Xp(5));
        assert!(p.collect(&mut pl));
        assert!(p.dead);
        assert_eq!(pl.xp, 5);
        assert!(!p.collect(&mut pl));
    }

    #[test]
    fn test_equipment_waits_for_free_slot() {
        let mut pl = player();
        for _ in 0..EQUIPMENT_SLOTS {
            pl.try_equip(gear()).unwrap();
        }
        let mut p = Pickup::new(
            EntityId(1),
            VisualHandle(1),
            Vec2::ZERO,
            PickupPayload::Equipment(Box::new(gear())),
        );
        assert!(!p.collect(&mut pl));
        assert!(!p.dead);

        pl.discard_equipment(3);
        assert!(p.collect(&mut pl));
        assert!(p.dead);
    }
}
