//! Player character.
//!
//! Owns the weapon list, the equipment slots and the permanent stat-track
//! levels. Every derived stat is recomputed from [`BaseStats`] plus the
//! aggregated equipment modifiers whenever either side changes, so the
//! fields read by weapons and the HUD are always current.

use std::collections::BTreeMap;

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::*;
use crate::equipment::{aggregate, EquipmentItem, StatKey};
use crate::fx::VisualHandle;
use crate::math::clamp;
use crate::weapons::{Weapon, WeaponId};

pub mod loadout;

pub use loadout::EquipmentSlots;

/// Undecorated stat values before equipment is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub max_hp: f32,
    pub pickup_radius: f32,
    pub move_speed: f32,
    pub damage_mult: f32,
    pub cooldown_mult: f32,
    pub area_mult: f32,
    pub hp_regen: f32,
    pub armor: f32,
    pub luck: f32,
}

impl Default for BaseStats {
    fn default() -> Self {
        Self {
            max_hp: PLAYER_BASE_MAX_HP,
            pickup_radius: PLAYER_BASE_PICKUP_RADIUS,
            move_speed: PLAYER_BASE_MOVE_SPEED,
            damage_mult: 1.0,
            cooldown_mult: 1.0,
            area_mult: 1.0,
            hp_regen: 0.0,
            armor: 0.0,
            luck: 0.0,
        }
    }
}

impl BaseStats {
    pub fn get(&self, key: StatKey) -> f32 {
        match key {
            StatKey::MaxHp => self.max_hp,
            StatKey::PickupRadius => self.pickup_radius,
            StatKey::MoveSpeed => self.move_speed,
            StatKey::DamageMult => self.damage_mult,
            StatKey::CooldownMult => self.cooldown_mult,
            StatKey::AreaMult => self.area_mult,
            StatKey::HpRegen => self.hp_regen,
            StatKey::Armor => self.armor,
            StatKey::Luck => self.luck,
        }
    }

    pub fn get_mut(&mut self, key: StatKey) -> &mut f32 {
        match key {
            StatKey::MaxHp => &mut self.max_hp,
            StatKey::PickupRadius => &mut self.pickup_radius,
            StatKey::MoveSpeed => &mut self.move_speed,
            StatKey::DamageMult => &mut self.damage_mult,
            StatKey::CooldownMult => &mut self.cooldown_mult,
            StatKey::AreaMult => &mut self.area_mult,
            StatKey::HpRegen => &mut self.hp_regen,
            StatKey::Armor => &mut self.armor,
            StatKey::Luck => &mut self.luck,
        }
    }
}

/// Whether a weapon offer adds a new weapon or levels an owned one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OfferKind {
    New,
    Upgrade,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub visual: VisualHandle,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub pickup_radius: f32,

    pub max_hp: f32,
    pub hp: f32,
    pub hp_regen: f32,
    pub armor: f32,
    pub luck: f32,
    pub move_speed: f32,

    pub damage_mult: f32,
    pub cooldown_mult: f32,
    pub area_mult: f32,

    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub kills: u32,
    pub dead: bool,

    pub weapons: Vec<Weapon>,
    /// Permanent stat-track levels bought through upgrades.
    pub stat_levels: BTreeMap<StatKey, u32>,

    base: BaseStats,
    slots: EquipmentSlots,
    pending_level_ups: u32,
    last_contact_hit_at: f32,
}

impl Player {
    pub fn new(visual: VisualHandle, pos: Vec2) -> Self {
        let base = BaseStats::default();
        let mut player = Self {
            visual,
            pos,
            vel: Vec2::ZERO,
            radius: PLAYER_RADIUS,
            pickup_radius: base.pickup_radius,
            max_hp: base.max_hp,
            hp: base.max_hp,
            hp_regen: 0.0,
            armor: 0.0,
            luck: 0.0,
            move_speed: base.move_speed,
            damage_mult: 1.0,
            cooldown_mult: 1.0,
            area_mult: 1.0,
            level: 1,
            xp: 0,
            xp_to_next: PLAYER_BASE_XP_TO_NEXT,
            kills: 0,
            dead: false,
            weapons: Vec::new(),
            stat_levels: BTreeMap::new(),
            base,
            slots: EquipmentSlots::new(),
            pending_level_ups: 0,
            last_contact_hit_at: -999.0,
        };
        player.recompute_stats();
        player
    }

    /// Moves along `axis` (unit or zero) and applies out-of-combat regen.
    /// `now` is the run clock used for the contact and regen windows.
    pub fn update(&mut self, dt: f32, axis: Vec2, now: f32) {
        if self.dead {
            return;
        }
        self.vel = axis.clamp_length_max(1.0) * self.move_speed;
        self.pos += self.vel * dt;

        if self.hp < self.max_hp
            && self.hp_regen > 0.0
            && now - self.last_contact_hit_at >= REGEN_DELAY
        {
            self.hp = clamp(self.hp + self.hp_regen * dt, 0.0, self.max_hp);
        }
    }

    pub fn base(&self) -> &BaseStats {
        &self.base
    }

    // ---------------------------------------------------------------
    // Damage
    // ---------------------------------------------------------------

    pub fn can_take_contact_hit(&self, now: f32) -> bool {
        now - self.last_contact_hit_at >= CONTACT_IFRAMES
    }

    pub fn damage_reduction(&self) -> f32 {
        clamp(self.armor * ARMOR_REDUCTION_PER_POINT, 0.0, MAX_DAMAGE_REDUCTION)
    }

    /// Applies a hit after armor and returns the damage actually dealt.
    /// Every landed hit deals at least 1.
    pub fn take_damage(&mut self, amount: f32, now: f32) -> f32 {
        if self.dead {
            return 0.0;
        }
        self.last_contact_hit_at = now;

        let dealt = (amount * (1.0 - self.damage_reduction())).round().max(1.0);
        self.hp = clamp(self.hp - dealt, 0.0, self.max_hp);
        if self.hp <= 0.0 {
            self.dead = true;
        }
        dealt
    }

    pub fn heal(&mut self, amount: f32) {
        if self.dead {
            return;
        }
        self.hp = clamp(self.hp + amount, 0.0, self.max_hp);
    }

    // ---------------------------------------------------------------
    // Experience
    // ---------------------------------------------------------------

    /// Adds XP and converts any overflow into level-ups. Returns how many
    /// levels were gained; each one queues an upgrade prompt.
    pub fn gain_xp(&mut self, amount: u32) -> u32 {
        if self.dead {
            return 0;
        }
        self.xp += amount;

        let mut gained = 0;
        while self.xp >= self.xp_to_next {
            self.xp -= self.xp_to_next;
            self.level += 1;
            self.pending_level_ups += 1;
            self.xp_to_next = (self.xp_to_next as f32 * XP_CURVE_MULT + XP_CURVE_ADD).floor() as u32;

            self.base.max_hp += LEVEL_UP_MAX_HP;
            self.recompute_stats();
            self.hp = clamp(self.hp + LEVEL_UP_HEAL, 0.0, self.max_hp);
            gained += 1;
        }
        gained
    }

    pub fn pending_level_ups(&self) -> u32 {
        self.pending_level_ups
    }

    /// Takes one queued level-up, if any.
    pub fn try_consume_level_up(&mut self) -> bool {
        if self.pending_level_ups == 0 {
            return false;
        }
        self.pending_level_ups -= 1;
        true
    }

    // ---------------------------------------------------------------
    // Weapons
    // ---------------------------------------------------------------

    pub fn has_weapon(&self, id: WeaponId) -> bool {
        self.weapons.iter().any(|w| w.id == id)
    }

    pub fn weapon_level(&self, id: WeaponId) -> Option<u32> {
        self.weapons.iter().find(|w| w.id == id).map(|w| w.level)
    }

    pub fn add_weapon(&mut self, id: WeaponId) {
        self.weapons.push(Weapon::new(id));
    }

    /// Levels an owned weapon, or adds it at level 1 when missing.
    pub fn upgrade_weapon(&mut self, id: WeaponId) {
        match self.weapons.iter_mut().find(|w| w.id == id) {
            Some(w) => w.level_up(),
            None => self.add_weapon(id),
        }
    }

    /// Drops every weapon whose id is listed.
    pub fn remove_weapons(&mut self, ids: &[WeaponId]) {
        self.weapons.retain(|w| !ids.contains(&w.id));
    }

    /// Weapon offers: upgrades of owned weapons below max, then every
    /// non-fusion weapon not yet owned, in catalogue order.
    pub fn weapon_offers(&self) -> Vec<(WeaponId, OfferKind)> {
        let mut offers: Vec<(WeaponId, OfferKind)> = self
            .weapons
            .iter()
            .filter(|w| !w.is_maxed())
            .map(|w| (w.id, OfferKind::Upgrade))
            .collect();

        offers.extend(
            WeaponId::ALL
                .iter()
                .filter(|id| !id.is_fusion() && !self.has_weapon(**id))
                .map(|id| (*id, OfferKind::New)),
        );
        offers
    }

    // ---------------------------------------------------------------
    // Equipment
    // ---------------------------------------------------------------

    pub fn equipment(&self) -> &EquipmentSlots {
        &self.slots
    }

    /// Equips into the first free slot. A full row returns the item.
    pub fn try_equip(&mut self, item: EquipmentItem) -> Result<usize, EquipmentItem> {
        let slot = self.slots.insert(item)?;
        debug!(slot, "equipped item");
        self.recompute_stats();
        Ok(slot)
    }

    pub fn discard_equipment(&mut self, slot: usize) -> Option<EquipmentItem> {
        let item = self.slots.remove(slot)?;
        debug!(slot, item = %item.name, "discarded item");
        self.recompute_stats();
        Some(item)
    }

    // ---------------------------------------------------------------
    // Stats
    // ---------------------------------------------------------------

    pub fn stat_level(&self, key: StatKey) -> u32 {
        self.stat_levels.get(&key).copied().unwrap_or(0)
    }

    pub fn add_base(&mut self, key: StatKey, amount: f32) {
        *self.base.get_mut(key) += amount;
        self.recompute_stats();
    }

    pub fn mul_base(&mut self, key: StatKey, factor: f32) {
        *self.base.get_mut(key) *= factor;
        self.recompute_stats();
    }

    /// Derives every stat as `(base + Σadd) × Πmult` with per-stat bounds,
    /// then clamps hp into the new range.
    pub fn recompute_stats(&mut self) {
        let mods = aggregate(self.slots.items());
        let derived = |key: StatKey| (self.base.get(key) + mods.add_of(key)) * mods.mult_of(key);

        let max_hp = derived(StatKey::MaxHp).round().max(1.0);
        let pickup_radius = derived(StatKey::PickupRadius).round().max(0.0);
        let move_speed = derived(StatKey::MoveSpeed).round().max(10.0);
        let hp_regen = derived(StatKey::HpRegen).max(0.0);
        let armor = derived(StatKey::Armor).max(0.0);
        let luck = derived(StatKey::Luck).max(0.0);
        let damage_mult = derived(StatKey::DamageMult).max(0.1);
        let cooldown_mult = clamp(derived(StatKey::CooldownMult), 0.35, 2.5);
        let area_mult = clamp(derived(StatKey::AreaMult), 0.4, 3.0);

        self.max_hp = max_hp;
        self.pickup_radius = pickup_radius;
        self.move_speed = move_speed;
        self.hp_regen = hp_regen;
        self.armor = armor;
        self.luck = luck;
        self.damage_mult = damage_mult;
        self.cooldown_mult = cooldown_mult;
        self.area_mult = area_mult;

        self.hp = clamp(self.hp, 0.0, self.max_hp);
    }
}
