use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::weapons::WeaponId;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid RON config: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Asset counts resolved by the host before the run; the core only indexes into them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetTable {
    pub monster_variants: u32,
    pub equipment_icons_per_rarity: u32,
}

impl Default for AssetTable {
    fn default() -> Self {
        Self {
            monster_variants: MONSTER_VARIANTS,
            equipment_icons_per_rarity: EQUIPMENT_ICONS_PER_RARITY,
        }
    }
}

/// Equipment drop chance per kill: `min(base + luck * per_luck, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropConfig {
    pub base_chance: f32,
    pub luck_bonus_per_point: f32,
    pub max_chance: f32,
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            base_chance: EQUIPMENT_DROP_BASE,
            luck_bonus_per_point: EQUIPMENT_DROP_PER_LUCK,
            max_chance: EQUIPMENT_DROP_MAX,
        }
    }
}

impl DropConfig {
    pub fn chance_for_luck(&self, luck: f32) -> f32 {
        (self.base_chance + luck.max(0.0) * self.luck_bonus_per_point).min(self.max_chance)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed: u64,
    pub max_frame_dt: f32,
    pub starting_weapon: WeaponId,
    pub assets: AssetTable,
    pub equipment_drops: DropConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_frame_dt: MAX_FRAME_DT,
            starting_weapon: WeaponId::ArcaneBolt,
            assets: AssetTable::default(),
            equipment_drops: DropConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `.json` or `.ron` by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            Some("ron") => Self::from_ron_str(&text),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_frame_dt > 0.0 && self.max_frame_dt <= MAX_FRAME_DT) {
            return Err(ConfigError::Invalid(format!(
                "max_frame_dt must be in (0, {MAX_FRAME_DT}], got {}",
                self.max_frame_dt
            )));
        }
        if self.starting_weapon.is_fusion() {
            return Err(ConfigError::Invalid(format!(
                "starting_weapon cannot be the fusion weapon {:?}",
                self.starting_weapon
            )));
        }
        if self.assets.monster_variants == 0 || self.assets.equipment_icons_per_rarity == 0 {
            return Err(ConfigError::Invalid(
                "asset tables need at least one entry".into(),
            ));
        }
        let d = &self.equipment_drops;
        for (name, v) in [
            ("base_chance", d.base_chance),
            ("luck_bonus_per_point", d.luck_bonus_per_point),
            ("max_chance", d.max_chance),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(ConfigError::Invalid(format!("{name} must be in [0, 1], got {v}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.seed, 42);
        assert_eq!(config.assets.monster_variants, 24);
    }

    #[test]
    fn test_json_partial_uses_defaults() {
        let config = SimConfig::from_json_str(r#"{ "seed": 7 }"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.max_frame_dt, MAX_FRAME_DT);
        assert_eq!(config.starting_weapon, WeaponId::ArcaneBolt);
    }

    #[test]
    fn test_ron_roundtrip_fields() {
        let config = SimConfig::from_ron_str(
            "(seed: 9, starting_weapon: Nova, equipment_drops: (base_chance: 0.5))",
        )
        .unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.starting_weapon, WeaponId::Nova);
        assert_eq!(config.equipment_drops.base_chance, 0.5);
        assert_eq!(config.equipment_drops.max_chance, EQUIPMENT_DROP_MAX);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            SimConfig::from_json_str(r#"{ "max_frame_dt": 0.5 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SimConfig::from_json_str(r#"{ "starting_weapon": "Stormcaller" }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SimConfig::from_json_str(r#"{ "assets": { "monster_variants": 0 } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SimConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_drop_chance_caps() {
        let drops = DropConfig::default();
        assert!((drops.chance_for_luck(0.0) - 0.025).abs() < 1e-6);
        assert!((drops.chance_for_luck(5.0) - 0.045).abs() < 1e-6);
        assert_eq!(drops.chance_for_luck(100.0), 0.08);
    }

    #[test]
    fn test_load_from_file() {
        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(json, r#"{{ "seed": 1234 }}"#).unwrap();
        assert_eq!(SimConfig::load(json.path()).unwrap().seed, 1234);

        let mut ron_file = tempfile::Builder::new().suffix(".ron").tempfile().unwrap();
        write!(ron_file, "(seed: 77)").unwrap();
        assert_eq!(SimConfig::load(ron_file.path()).unwrap().seed, 77);

        let toml = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        assert!(matches!(
            SimConfig::load(toml.path()),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
