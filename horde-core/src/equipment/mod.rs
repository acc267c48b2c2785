//! Equipment rolls & stat aggregation
//!
//! Items are rolled from a luck-weighted rarity table and carry 1-4 distinct
//! affixes. Each affix is either additive (flat stat delta) or multiplicative
//! (stored as `1 + pct` on one of the three global multipliers).
//!
//! Aggregation over equipped items is commutative: contributions are sorted
//! before being summed/multiplied, so slot order never changes a derived stat.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::math::{clamp, rand_range, weighted_index};

/// Item rarity tier, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Magic,
    Rare,
    Legend,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [Rarity::Common, Rarity::Magic, Rarity::Rare, Rarity::Legend];

    pub fn index(self) -> usize {
        match self {
            Rarity::Common => 0,
            Rarity::Magic => 1,
            Rarity::Rare => 2,
            Rarity::Legend => 3,
        }
    }

    pub fn affix_count(self) -> usize {
        self.index() + 1
    }

    pub fn label(self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Magic => "Magic",
            Rarity::Rare => "Rare",
            Rarity::Legend => "Legendary",
        }
    }

    /// Frame tint for pickups and slot icons.
    pub fn color(self) -> u32 {
        match self {
            Rarity::Common => 0xc7d0df,
            Rarity::Magic => 0x6aa8ff,
            Rarity::Rare => 0xffd45a,
            Rarity::Legend => 0xff8a3d,
        }
    }
}

/// Player stats that equipment may modify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatKey {
    MaxHp,
    PickupRadius,
    MoveSpeed,
    DamageMult,
    CooldownMult,
    AreaMult,
    HpRegen,
    Armor,
    Luck,
}

impl StatKey {
    pub const ALL: [StatKey; 9] = [
        StatKey::MaxHp,
        StatKey::PickupRadius,
        StatKey::MoveSpeed,
        StatKey::DamageMult,
        StatKey::CooldownMult,
        StatKey::AreaMult,
        StatKey::HpRegen,
        StatKey::Armor,
        StatKey::Luck,
    ];

    /// Additive rolls on these keep their fractional part; the rest round.
    pub fn keeps_fraction(self) -> bool {
        matches!(self, StatKey::HpRegen | StatKey::Armor | StatKey::Luck)
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatKey::MaxHp => "Max HP",
            StatKey::PickupRadius => "Pickup Radius",
            StatKey::MoveSpeed => "Move Speed",
            StatKey::DamageMult => "Damage",
            StatKey::CooldownMult => "Cooldown",
            StatKey::AreaMult => "Area",
            StatKey::HpRegen => "HP Regen",
            StatKey::Armor => "Armor",
            StatKey::Luck => "Luck",
        };
        f.write_str(name)
    }
}

/// Per-item stat modifiers. `add` holds flat deltas, `mult` holds factors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatMods {
    pub add: BTreeMap<StatKey, f32>,
    pub mult: BTreeMap<StatKey, f32>,
}

impl StatMods {
    pub fn add_of(&self, key: StatKey) -> f32 {
        self.add.get(&key).copied().unwrap_or(0.0)
    }

    pub fn mult_of(&self, key: StatKey) -> f32 {
        self.mult.get(&key).copied().unwrap_or(1.0)
    }

    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.mult.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentItem {
    pub id: ItemId,
    pub rarity: Rarity,
    /// Index into the per-rarity icon table handed to the core at startup.
    pub icon: u32,
    pub name: String,
    pub mods: StatMods,
    /// Human-readable affix lines, one per rolled affix.
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AffixKind {
    Add,
    Mult,
}

struct AffixDef {
    stat: StatKey,
    kind: AffixKind,
    /// Roll range per rarity, indexed by `Rarity::index`. Mult ranges are pct deltas.
    ranges: [(f32, f32); 4],
}

const MOVE_RANGES: [(f32, f32); 4] = [(10.0, 18.0), (16.0, 28.0), (24.0, 42.0), (38.0, 62.0)];
const PCT_RANGES: [(f32, f32); 4] = [(0.03, 0.06), (0.05, 0.09), (0.08, 0.13), (0.12, 0.18)];

const AFFIXES: [AffixDef; 9] = [
    AffixDef {
        stat: StatKey::MaxHp,
        kind: AffixKind::Add,
        ranges: [(10.0, 18.0), (18.0, 32.0), (30.0, 55.0), (50.0, 85.0)],
    },
    AffixDef {
        stat: StatKey::HpRegen,
        kind: AffixKind::Add,
        ranges: [(0.25, 0.45), (0.4, 0.75), (0.7, 1.15), (1.1, 1.8)],
    },
    AffixDef {
        stat: StatKey::Armor,
        kind: AffixKind::Add,
        ranges: [(0.6, 1.2), (1.0, 2.0), (1.8, 3.2), (3.0, 4.8)],
    },
    AffixDef {
        stat: StatKey::MoveSpeed,
        kind: AffixKind::Add,
        ranges: MOVE_RANGES,
    },
    AffixDef {
        stat: StatKey::PickupRadius,
        kind: AffixKind::Add,
        ranges: MOVE_RANGES,
    },
    AffixDef {
        stat: StatKey::DamageMult,
        kind: AffixKind::Mult,
        ranges: PCT_RANGES,
    },
    AffixDef {
        stat: StatKey::CooldownMult,
        kind: AffixKind::Mult,
        ranges: [(-0.03, -0.05), (-0.04, -0.07), (-0.06, -0.1), (-0.09, -0.14)],
    },
    AffixDef {
        stat: StatKey::AreaMult,
        kind: AffixKind::Mult,
        ranges: PCT_RANGES,
    },
    AffixDef {
        stat: StatKey::Luck,
        kind: AffixKind::Add,
        ranges: [(0.2, 0.5), (0.4, 0.9), (0.8, 1.5), (1.2, 2.4)],
    },
];

fn affix_line(stat: StatKey, kind: AffixKind, value: f32) -> String {
    match (kind, stat) {
        (AffixKind::Mult, StatKey::CooldownMult) => {
            let sign = if value < 0.0 { '-' } else { '+' };
            format!("{stat} {sign}{}%", (value.abs() * 100.0).round())
        }
        (AffixKind::Mult, _) => format!("{stat} +{}%", (value * 100.0).round()),
        (AffixKind::Add, StatKey::HpRegen) => format!("{stat} +{value:.2}/s"),
        (AffixKind::Add, StatKey::Armor) | (AffixKind::Add, StatKey::Luck) => {
            format!("{stat} +{value:.1}")
        }
        (AffixKind::Add, _) => format!("{stat} +{}", value.round()),
    }
}

/// Rarity weights after the luck shift and per-tier clamps (not yet normalized).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RarityWeights {
    pub common: f32,
    pub magic: f32,
    pub rare: f32,
    pub legend: f32,
}

impl RarityWeights {
    pub const MAX_LUCK: f32 = 12.0;

    pub fn for_luck(luck: f32) -> Self {
        let l = clamp(luck, 0.0, Self::MAX_LUCK);
        Self {
            common: clamp(0.74 - l * 0.02, 0.45, 0.85),
            magic: clamp(0.22 + l * 0.012, 0.12, 0.32),
            rare: clamp(0.038 + l * 0.006, 0.02, 0.16),
            legend: clamp(0.002 + l * 0.002, 0.001, 0.04),
        }
    }

    pub fn as_array(&self) -> [f32; 4] {
        [self.common, self.magic, self.rare, self.legend]
    }

    pub fn total(&self) -> f32 {
        self.as_array().iter().sum()
    }

    /// Probabilities in `Rarity::ALL` order; always sums to 1.
    pub fn normalized(&self) -> [f32; 4] {
        let total = self.total();
        self.as_array().map(|w| w / total)
    }

    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Rarity {
        Rarity::ALL[weighted_index(rng, &self.as_array())]
    }
}

pub fn roll_rarity<R: Rng + ?Sized>(luck: f32, rng: &mut R) -> Rarity {
    RarityWeights::for_luck(luck).roll(rng)
}

/// Rolls `rarity.affix_count()` distinct affixes.
pub fn roll_affixes<R: Rng + ?Sized>(rarity: Rarity, rng: &mut R) -> (StatMods, Vec<String>) {
    let mut pool: Vec<&AffixDef> = AFFIXES.iter().collect();
    let mut mods = StatMods::default();
    let mut lines = Vec::with_capacity(rarity.affix_count());

    while lines.len() < rarity.affix_count() && !pool.is_empty() {
        let def = pool.swap_remove(rng.gen_range(0..pool.len()));
        let (lo, hi) = def.ranges[rarity.index()];
        let raw = rand_range(rng, lo, hi);

        match def.kind {
            AffixKind::Add => {
                let v = if def.stat.keeps_fraction() { raw } else { raw.round() };
                *mods.add.entry(def.stat).or_insert(0.0) += v;
                lines.push(affix_line(def.stat, def.kind, v));
            }
            AffixKind::Mult => {
                *mods.mult.entry(def.stat).or_insert(1.0) *= 1.0 + raw;
                lines.push(affix_line(def.stat, def.kind, raw));
            }
        }
    }

    (mods, lines)
}

/// Rolls a complete item. `icons_per_rarity` sizes the icon table (at least 1).
pub fn roll_equipment<R: Rng + ?Sized>(
    id: ItemId,
    luck: f32,
    icons_per_rarity: u32,
    rng: &mut R,
) -> EquipmentItem {
    let rarity = roll_rarity(luck, rng);
    let icon = rng.gen_range(0..icons_per_rarity.max(1));
    let (mods, lines) = roll_affixes(rarity, rng);

    EquipmentItem {
        id,
        rarity,
        icon,
        name: format!("{} Equipment", rarity.label()),
        mods,
        lines,
    }
}

/// Combined modifiers of all items: per-key sum of `add`, per-key product of `mult`.
pub fn aggregate<'a, I>(items: I) -> StatMods
where
    I: IntoIterator<Item = &'a EquipmentItem>,
{
    let mut adds: BTreeMap<StatKey, Vec<f32>> = BTreeMap::new();
    let mut mults: BTreeMap<StatKey, Vec<f32>> = BTreeMap::new();

    for item in items {
        for (k, v) in &item.mods.add {
            adds.entry(*k).or_default().push(*v);
        }
        for (k, v) in &item.mods.mult {
            mults.entry(*k).or_default().push(*v);
        }
    }

    let mut out = StatMods::default();
    for (k, mut vals) in adds {
        vals.sort_by(f32::total_cmp);
        out.add.insert(k, vals.iter().sum());
    }
    for (k, mut vals) in mults {
        vals.sort_by(f32::total_cmp);
        out.mult.insert(k, vals.iter().product());
    }
    out
}
