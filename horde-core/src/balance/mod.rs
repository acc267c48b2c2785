//! Monte-Carlo Balance Runs
//!
//! Plays many complete headless runs with a scripted autopilot and
//! summarizes how long each starting weapon survives. Runs are independent,
//! so they fan out across cores with rayon; per-run seeds come from SHA3 of
//! the base seed and run index, which keeps the report identical for a given
//! config no matter how the work is scheduled.

use bevy::math::Vec2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use tracing::info;

use crate::engine::{SimConfig, Simulation};
use crate::fx::HeadlessFrontend;
use crate::gameflow::RunMode;
use crate::input::InputState;
use crate::math::VecExt;
use crate::player::OfferKind;
use crate::progression::{StatTrack, UpgradeChoice};
use crate::weapons::WeaponId;

/// Monsters closer than this push the autopilot away.
const THREAT_RADIUS: f32 = 260.0;
/// Distance from the origin at which the autopilot fully steers home.
const LEASH_RADIUS: f32 = 700.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    pub run_count: u64,
    pub base_seed: u64,
    /// Runs that survive this long count as survived.
    pub max_secs: f32,
    pub frame_dt: f32,
    /// Template for every run; seed and starting weapon are overridden.
    pub sim: SimConfig,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            run_count: 64,
            base_seed: 42,
            max_secs: 300.0,
            frame_dt: 1.0 / 60.0,
            sim: SimConfig::default(),
        }
    }
}

/// Scripted player: circles the origin, backs off from crowds, and takes
/// fusions first, then weapon upgrades, then damage.
#[derive(Debug, Clone, Copy, Default)]
pub struct Autopilot;

impl Autopilot {
    pub fn steer(&self, sim: &Simulation) -> Vec2 {
        let pos = sim.player().pos;

        let mut away = Vec2::ZERO;
        for m in sim.monsters() {
            let d = pos - m.pos;
            let dist = d.length();
            if dist < THREAT_RADIUS {
                away += d.safe_norm() * (1.0 - dist / THREAT_RADIUS);
            }
        }

        let tangent = Vec2::new(-pos.y, pos.x).safe_norm();
        let home = -pos.safe_norm() * (pos.length() / LEASH_RADIUS).min(1.0);
        let dir = away * 2.0 + tangent + home;
        if dir == Vec2::ZERO {
            Vec2::X
        } else {
            dir.safe_norm()
        }
    }

    pub fn pick(&self, choices: &[UpgradeChoice]) -> usize {
        choices
            .iter()
            .position(|c| c.is_fusion())
            .or_else(|| {
                choices.iter().position(|c| {
                    matches!(c, UpgradeChoice::Weapon { kind: OfferKind::Upgrade, .. })
                })
            })
            .or_else(|| {
                choices.iter().position(|c| {
                    matches!(c, UpgradeChoice::Stat { track: StatTrack::Damage, .. })
                })
            })
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub seed: u64,
    pub starting_weapon: WeaponId,
    pub survived_secs: f32,
    pub level: u32,
    pub kills: u32,
    pub died: bool,
    pub fusions: u32,
    pub final_weapons: Vec<WeaponId>,
}

/// Weapons a run may start with.
pub fn starting_weapons() -> Vec<WeaponId> {
    WeaponId::ALL
        .iter()
        .copied()
        .filter(|w| !w.is_fusion())
        .collect()
}

/// Per-run seed: first 8 bytes of SHA3-256(base_seed ‖ index).
pub fn derive_run_seed(base_seed: u64, index: u64) -> u64 {
    let mut hasher = Sha3_256::new();
    hasher.update(base_seed.to_le_bytes());
    hasher.update(index.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Plays one run to death or `max_secs`, whichever comes first.
pub fn play_run(seed: u64, starting_weapon: WeaponId, config: &BalanceConfig) -> RunOutcome {
    let sim_config = SimConfig {
        seed,
        starting_weapon,
        ..config.sim.clone()
    };
    let pilot = Autopilot;
    let mut frontend = HeadlessFrontend::new();
    let mut sim = Simulation::new(sim_config, &mut frontend);
    let mut input = InputState::new();
    let mut fusions = 0;

    // paused frames do not advance the clock; the cap keeps a stuck run finite
    let frame_cap = (config.max_secs / config.frame_dt.max(1e-3)).ceil() as u64 * 4;
    for _ in 0..frame_cap {
        match sim.mode() {
            RunMode::GameOver(_) => break,
            RunMode::ChoosingUpgrade { choices } => {
                let index = pilot.pick(choices);
                if let Ok(choice) = sim.choose_upgrade(index) {
                    if choice.is_fusion() {
                        fusions += 1;
                    }
                }
                continue;
            }
            RunMode::Running => {}
        }
        if sim.elapsed() >= config.max_secs {
            break;
        }
        input.set_analog(Some(pilot.steer(&sim)));
        sim.update(config.frame_dt, &mut input, &mut frontend);
    }

    let player = sim.player();
    RunOutcome {
        seed,
        starting_weapon,
        survived_secs: sim.elapsed(),
        level: player.level,
        kills: player.kills,
        died: player.dead,
        fusions,
        final_weapons: player.weapons.iter().map(|w| w.id).collect(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponScore {
    pub weapon: String,
    pub runs: usize,
    pub avg_survival_secs: f32,
    pub death_rate: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceReport {
    pub total_runs: u64,
    pub avg_survival_secs: f32,
    pub std_survival_secs: f32,
    pub min_survival_secs: f32,
    pub max_survival_secs: f32,
    pub avg_level: f32,
    pub avg_kills: f32,
    pub death_rate: f32,
    /// Share of runs that completed at least one fusion.
    pub fusion_rate: f32,
    pub weapon_scores: Vec<WeaponScore>,
    /// Best / worst average survival across starting weapons; ideally < 2.0.
    pub survival_range_ratio: f32,
    pub balance_grade: BalanceGrade,
}

/// Overall balance assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceGrade {
    Excellent, // range ratio < 1.5
    Good,      // range ratio < 2.0
    Fair,      // range ratio < 3.0
    Poor,      // range ratio < 5.0
    Critical,  // range ratio >= 5.0
}

impl BalanceGrade {
    pub fn from_ratio(ratio: f32) -> Self {
        if ratio < 1.5 {
            BalanceGrade::Excellent
        } else if ratio < 2.0 {
            BalanceGrade::Good
        } else if ratio < 3.0 {
            BalanceGrade::Fair
        } else if ratio < 5.0 {
            BalanceGrade::Poor
        } else {
            BalanceGrade::Critical
        }
    }
}

/// Plays `run_count` runs in parallel, cycling through the starting weapons.
pub fn run_balance_simulation(config: &BalanceConfig) -> BalanceReport {
    let weapons = starting_weapons();
    let jobs: Vec<(u64, WeaponId)> = (0..config.run_count)
        .map(|i| {
            let weapon = weapons[(i % weapons.len() as u64) as usize];
            (derive_run_seed(config.base_seed, i), weapon)
        })
        .collect();

    let outcomes: Vec<RunOutcome> = jobs
        .par_iter()
        .map(|(seed, weapon)| play_run(*seed, *weapon, config))
        .collect();

    let report = analyze_outcomes(&outcomes);
    info!(
        runs = report.total_runs,
        avg_survival = report.avg_survival_secs,
        death_rate = report.death_rate,
        grade = ?report.balance_grade,
        "balance run finished"
    );
    report
}

fn mean(xs: &[f32]) -> f32 {
    if xs.is_empty() {
        0.0
    } else {
        xs.iter().sum::<f32>() / xs.len() as f32
    }
}

fn analyze_outcomes(outcomes: &[RunOutcome]) -> BalanceReport {
    if outcomes.is_empty() {
        return BalanceReport {
            total_runs: 0,
            avg_survival_secs: 0.0,
            std_survival_secs: 0.0,
            min_survival_secs: 0.0,
            max_survival_secs: 0.0,
            avg_level: 0.0,
            avg_kills: 0.0,
            death_rate: 0.0,
            fusion_rate: 0.0,
            weapon_scores: vec![],
            survival_range_ratio: 1.0,
            balance_grade: BalanceGrade::Good,
        };
    }

    let n = outcomes.len() as f32;
    let survival: Vec<f32> = outcomes.iter().map(|o| o.survived_secs).collect();
    let avg = mean(&survival);
    let variance = survival.iter().map(|s| (s - avg).powi(2)).sum::<f32>() / n;
    let min = survival.iter().cloned().fold(f32::MAX, f32::min);
    let max = survival.iter().cloned().fold(f32::MIN, f32::max);

    let levels: Vec<f32> = outcomes.iter().map(|o| o.level as f32).collect();
    let kills: Vec<f32> = outcomes.iter().map(|o| o.kills as f32).collect();
    let deaths = outcomes.iter().filter(|o| o.died).count() as f32;
    let fused = outcomes.iter().filter(|o| o.fusions > 0).count() as f32;

    let weapon_scores: Vec<WeaponScore> = starting_weapons()
        .into_iter()
        .filter_map(|w| {
            let runs: Vec<&RunOutcome> =
                outcomes.iter().filter(|o| o.starting_weapon == w).collect();
            if runs.is_empty() {
                return None;
            }
            let secs: Vec<f32> = runs.iter().map(|o| o.survived_secs).collect();
            let died = runs.iter().filter(|o| o.died).count() as f32;
            Some(WeaponScore {
                weapon: w.name().to_string(),
                runs: runs.len(),
                avg_survival_secs: mean(&secs),
                death_rate: died / runs.len() as f32,
            })
        })
        .collect();

    let best = weapon_scores
        .iter()
        .map(|s| s.avg_survival_secs)
        .fold(f32::MIN, f32::max);
    let worst = weapon_scores
        .iter()
        .map(|s| s.avg_survival_secs)
        .fold(f32::MAX, f32::min);
    let range_ratio = if worst > 0.001 { best / worst } else { 999.0 };

    BalanceReport {
        total_runs: outcomes.len() as u64,
        avg_survival_secs: avg,
        std_survival_secs: variance.sqrt(),
        min_survival_secs: min,
        max_survival_secs: max,
        avg_level: mean(&levels),
        avg_kills: mean(&kills),
        death_rate: deaths / n,
        fusion_rate: fused / n,
        weapon_scores,
        survival_range_ratio: range_ratio,
        balance_grade: BalanceGrade::from_ratio(range_ratio),
    }
}
