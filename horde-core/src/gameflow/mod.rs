//! Run state machine and the read-only views handed to the presentation layer.
//!
//! A run is Running until a level-up is waiting (ChoosingUpgrade) or the
//! player dies (GameOver). Upgrade prompts return to Running once answered;
//! GameOver only leaves through an explicit restart.

use std::fmt;

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::equipment::Rarity;
use crate::player::Player;
use crate::progression::UpgradeChoice;
use crate::weapons::WeaponId;

/// Final numbers of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub elapsed_secs: f32,
    pub level: u32,
    pub kills: u32,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "survived {} | level {} | kills {}",
            format_clock(self.elapsed_secs),
            self.level,
            self.kills
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunMode {
    Running,
    /// Paused on a level-up prompt. Always holds exactly three choices.
    ChoosingUpgrade { choices: Vec<UpgradeChoice> },
    GameOver(RunSummary),
}

impl RunMode {
    pub fn is_running(&self) -> bool {
        matches!(self, RunMode::Running)
    }

    pub fn is_paused(&self) -> bool {
        !self.is_running()
    }

    pub fn choices(&self) -> Option<&[UpgradeChoice]> {
        match self {
            RunMode::ChoosingUpgrade { choices } => Some(choices.as_slice()),
            _ => None,
        }
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        match self {
            RunMode::GameOver(summary) => Some(summary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponLine {
    pub id: WeaponId,
    pub name: String,
    pub level: u32,
    pub max_level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentLine {
    pub slot: usize,
    pub name: String,
    pub rarity: Rarity,
    pub affixes: Vec<String>,
}

/// Everything a HUD draws, refreshed every frame including while paused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub hp: f32,
    pub max_hp: f32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub kills: u32,
    pub elapsed_secs: f32,
    /// World point the camera centers on.
    pub camera: Vec2,
    pub weapons: Vec<WeaponLine>,
    pub equipment: Vec<EquipmentLine>,
}

impl HudSnapshot {
    pub fn capture(player: &Player, elapsed_secs: f32, camera: Vec2) -> Self {
        Self {
            hp: player.hp,
            max_hp: player.max_hp,
            level: player.level,
            xp: player.xp,
            xp_to_next: player.xp_to_next,
            kills: player.kills,
            elapsed_secs,
            camera,
            weapons: player
                .weapons
                .iter()
                .map(|w| WeaponLine {
                    id: w.id,
                    name: w.id.name().to_string(),
                    level: w.level,
                    max_level: w.max_level,
                })
                .collect(),
            equipment: player
                .equipment()
                .slots()
                .iter()
                .enumerate()
                .filter_map(|(slot, item)| {
                    item.as_ref().map(|it| EquipmentLine {
                        slot,
                        name: it.name.clone(),
                        rarity: it.rarity,
                        affixes: it.lines.clone(),
                    })
                })
                .collect(),
        }
    }

    pub fn hp_fraction(&self) -> f32 {
        if self.max_hp <= 0.0 {
            0.0
        } else {
            (self.hp / self.max_hp).clamp(0.0, 1.0)
        }
    }

    pub fn xp_fraction(&self) -> f32 {
        if self.xp_to_next == 0 {
            0.0
        } else {
            (self.xp as f32 / self.xp_to_next as f32).clamp(0.0, 1.0)
        }
    }
}

/// `mm:ss` run clock.
pub fn format_clock(secs: f32) -> String {
    let total = secs.max(0.0).floor() as u32;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::VisualHandle;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "00:00");
        assert_eq!(format_clock(75.9), "01:15");
        assert_eq!(format_clock(-3.0), "00:00");
    }

    #[test]
    fn test_mode_queries() {
        assert!(RunMode::Running.is_running());
        let over = RunMode::GameOver(RunSummary {
            elapsed_secs: 61.0,
            level: 4,
            kills: 20,
        });
        assert!(over.is_paused());
        assert_eq!(over.summary().map(|s| s.kills), Some(20));
        assert!(over.choices().is_none());
    }

    #[test]
    fn test_hud_capture() {
        let mut player = Player::new(VisualHandle(0), Vec2::new(5.0, 6.0));
        player.add_weapon(WeaponId::Nova);
        player.kills = 3;
        let hud = HudSnapshot::capture(&player, 12.5, player.pos);
        assert_eq!(hud.weapons.len(), 1);
        assert_eq!(hud.weapons[0].name, "Nova");
        assert_eq!(hud.kills, 3);
        assert!(hud.equipment.is_empty());
        assert_eq!(hud.hp_fraction(), 1.0);
        assert_eq!(hud.xp_fraction(), 0.0);
        assert_eq!(hud.camera, Vec2::new(5.0, 6.0));
    }

    #[test]
    fn test_summary_display() {
        let s = RunSummary {
            elapsed_secs: 125.0,
            level: 7,
            kills: 88,
        };
        assert_eq!(s.to_string(), "survived 02:05 | level 7 | kills 88");
    }
}
