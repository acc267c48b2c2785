//! Level-up rewards.
//!
//! Builds the upgrade pool for a player, samples the three presented choices
//! and applies the one picked. Pool order is fixed: fusions first, then weapon
//! upgrades and new weapons, then stat tracks.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants::{FUSION_MIN_LEVEL, UPGRADE_CHOICES};
use crate::equipment::StatKey;
use crate::math::{pick_n, sample};
use crate::player::{OfferKind, Player};
use crate::weapons::WeaponId;

/// Permanent stat upgrades offered on level-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatTrack {
    MaxHp,
    PickupRadius,
    MoveSpeed,
    Damage,
    Cooldown,
    Area,
}

impl StatTrack {
    pub const ALL: [StatTrack; 6] = [
        StatTrack::MaxHp,
        StatTrack::PickupRadius,
        StatTrack::MoveSpeed,
        StatTrack::Damage,
        StatTrack::Cooldown,
        StatTrack::Area,
    ];

    /// Base stat this track modifies; also the key of its level counter.
    pub fn stat(self) -> StatKey {
        match self {
            StatTrack::MaxHp => StatKey::MaxHp,
            StatTrack::PickupRadius => StatKey::PickupRadius,
            StatTrack::MoveSpeed => StatKey::MoveSpeed,
            StatTrack::Damage => StatKey::DamageMult,
            StatTrack::Cooldown => StatKey::CooldownMult,
            StatTrack::Area => StatKey::AreaMult,
        }
    }

    pub fn max_level(self) -> u32 {
        match self {
            StatTrack::MoveSpeed | StatTrack::Area => 8,
            _ => 10,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StatTrack::MaxHp => "Max HP",
            StatTrack::PickupRadius => "Pickup Radius",
            StatTrack::MoveSpeed => "Move Speed",
            StatTrack::Damage => "Damage",
            StatTrack::Cooldown => "Cooldown",
            StatTrack::Area => "Area",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StatTrack::MaxHp => "Max HP +18 and heal 18 immediately.",
            StatTrack::PickupRadius => "Pickup radius +18.",
            StatTrack::MoveSpeed => "Move speed +24.",
            StatTrack::Damage => "All spell damage +10%.",
            StatTrack::Cooldown => "All spell cooldowns -8%.",
            StatTrack::Area => "Area and range +10%.",
        }
    }

    fn apply(self, player: &mut Player) {
        let key = self.stat();
        match self {
            StatTrack::MaxHp => {
                player.add_base(key, 18.0);
                player.heal(18.0);
            }
            StatTrack::PickupRadius => player.add_base(key, 18.0),
            StatTrack::MoveSpeed => player.add_base(key, 24.0),
            StatTrack::Damage => player.mul_base(key, 1.1),
            StatTrack::Cooldown => player.mul_base(key, 0.92),
            StatTrack::Area => player.mul_base(key, 1.1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FusionId {
    Stormcaller,
    AstralBlades,
    GlacialSingularity,
}

impl FusionId {
    pub const ALL: [FusionId; 3] = [
        FusionId::Stormcaller,
        FusionId::AstralBlades,
        FusionId::GlacialSingularity,
    ];

    /// Ingredients consumed by the fusion.
    pub fn requires(self) -> [WeaponId; 2] {
        match self {
            FusionId::Stormcaller => [WeaponId::ChainLightning, WeaponId::Nova],
            FusionId::AstralBlades => [WeaponId::ArcaneBolt, WeaponId::OrbitBlades],
            FusionId::GlacialSingularity => [WeaponId::FrostShards, WeaponId::GravityWell],
        }
    }

    pub fn grants(self) -> WeaponId {
        match self {
            FusionId::Stormcaller => WeaponId::Stormcaller,
            FusionId::AstralBlades => WeaponId::AstralBlades,
            FusionId::GlacialSingularity => WeaponId::GlacialSingularity,
        }
    }

    /// Both ingredients at the fusion level and the result not yet owned.
    pub fn is_available(self, player: &Player) -> bool {
        !player.has_weapon(self.grants())
            && self
                .requires()
                .iter()
                .all(|id| player.weapon_level(*id).is_some_and(|l| l >= FUSION_MIN_LEVEL))
    }

    pub fn description(self) -> String {
        let [a, b] = self.requires();
        format!(
            "Fusion (both Lv{FUSION_MIN_LEVEL}+): {} + {} -> {}.",
            a.name(),
            b.name(),
            self.grants().name()
        )
    }
}

/// One entry of the level-up offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeChoice {
    Weapon { id: WeaponId, kind: OfferKind },
    Stat { track: StatTrack, next_level: u32 },
    Fusion(FusionId),
}

impl UpgradeChoice {
    /// Offered when the pool is empty.
    pub const FALLBACK: UpgradeChoice = UpgradeChoice::Weapon {
        id: WeaponId::ArcaneBolt,
        kind: OfferKind::Upgrade,
    };

    pub fn title(&self) -> String {
        match self {
            UpgradeChoice::Weapon { id, kind: OfferKind::New } => format!("Learn: {}", id.name()),
            UpgradeChoice::Weapon { id, kind: OfferKind::Upgrade } => {
                format!("Upgrade: {}", id.name())
            }
            UpgradeChoice::Stat { track, next_level } => {
                format!("Upgrade: {} Lv{next_level}", track.name())
            }
            UpgradeChoice::Fusion(f) => format!("Fusion: {}", f.grants().name()),
        }
    }

    pub fn description(&self) -> String {
        match self {
            UpgradeChoice::Weapon { id, .. } => id.description().to_string(),
            UpgradeChoice::Stat { track, .. } => track.description().to_string(),
            UpgradeChoice::Fusion(f) => f.description(),
        }
    }

    pub fn is_fusion(&self) -> bool {
        matches!(self, UpgradeChoice::Fusion(_))
    }
}

impl fmt::Display for UpgradeChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title())
    }
}

/// Every upgrade currently open to `player`, highest priority first.
pub fn upgrade_pool(player: &Player) -> Vec<UpgradeChoice> {
    let mut pool: Vec<UpgradeChoice> = FusionId::ALL
        .iter()
        .filter(|f| f.is_available(player))
        .map(|f| UpgradeChoice::Fusion(*f))
        .collect();

    pool.extend(
        player
            .weapon_offers()
            .into_iter()
            .map(|(id, kind)| UpgradeChoice::Weapon { id, kind }),
    );

    for track in StatTrack::ALL {
        let level = player.stat_level(track.stat());
        if level < track.max_level() {
            pool.push(UpgradeChoice::Stat {
                track,
                next_level: level + 1,
            });
        }
    }
    pool
}

/// Three choices: distinct while the pool allows, then repeats drawn with
/// replacement, then the fallback when the pool is empty.
pub fn roll_choices<R: Rng + ?Sized>(pool: &[UpgradeChoice], rng: &mut R) -> Vec<UpgradeChoice> {
    let mut picked = pick_n(rng, pool, UPGRADE_CHOICES);
    while picked.len() < UPGRADE_CHOICES {
        let extra = sample(rng, pool).copied().unwrap_or(UpgradeChoice::FALLBACK);
        picked.push(extra);
    }
    picked
}

pub fn apply_upgrade_choice(player: &mut Player, choice: &UpgradeChoice) {
    match *choice {
        UpgradeChoice::Weapon { id, kind: OfferKind::New } => {
            if player.has_weapon(id) {
                player.upgrade_weapon(id);
            } else {
                player.add_weapon(id);
            }
        }
        UpgradeChoice::Weapon { id, kind: OfferKind::Upgrade } => player.upgrade_weapon(id),
        UpgradeChoice::Stat { track, .. } => {
            let next = player.stat_level(track.stat()) + 1;
            player.stat_levels.insert(track.stat(), next);
            track.apply(player);
        }
        UpgradeChoice::Fusion(fusion) => {
            player.remove_weapons(&fusion.requires());
            if !player.has_weapon(fusion.grants()) {
                player.add_weapon(fusion.grants());
            }
            info!(weapon = fusion.grants().name(), "fusion complete");
        }
    }
    debug!(choice = %choice, level = player.level, "upgrade applied");
}
