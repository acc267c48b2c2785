//! Spawn director.
//!
//! Owns the run clock and turns it into an integer intensity that drives
//! batch size, spawn ring radius and the monsters' own stats. Spawns pause
//! while the population sits at the soft cap.

use bevy::math::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::*;
use crate::math::{clamp, rand_range};

/// A monster the simulation should create this frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRequest {
    pub pos: Vec2,
    /// Intensity at spawn time; fixes the monster's stats.
    pub level: u32,
    pub variant: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnDirector {
    elapsed: f32,
    timer: f32,
    intensity: u32,
    monster_variants: u32,
}

impl SpawnDirector {
    pub fn new(monster_variants: u32) -> Self {
        Self {
            elapsed: 0.0,
            timer: 0.0,
            intensity: 1,
            monster_variants: monster_variants.max(1),
        }
    }

    /// Seconds of unpaused play.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn intensity(&self) -> u32 {
        self.intensity
    }

    pub fn intensity_at(elapsed: f32) -> u32 {
        1 + (elapsed.max(0.0) / INTENSITY_PERIOD_SECS).floor() as u32
    }

    pub fn population_cap(intensity: u32) -> usize {
        SPAWN_CAP_BASE + intensity as usize * SPAWN_CAP_PER_INTENSITY
    }

    pub fn batch_size(intensity: u32) -> u32 {
        (1 + intensity / 2).clamp(1, 4)
    }

    pub fn spawn_radius(intensity: u32) -> f32 {
        clamp(
            SPAWN_RADIUS_MIN + intensity as f32 * 30.0,
            SPAWN_RADIUS_MIN,
            SPAWN_RADIUS_MAX,
        )
    }

    pub fn spawn_interval(elapsed: f32) -> f32 {
        clamp(
            SPAWN_INTERVAL_MAX - elapsed / SPAWN_INTERVAL_RAMP_SECS,
            SPAWN_INTERVAL_MIN,
            SPAWN_INTERVAL_MAX,
        )
    }

    /// Advances the clock by `dt` and returns this frame's spawns around
    /// `player_pos`. `population` counts monsters currently alive.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        population: usize,
        player_pos: Vec2,
        rng: &mut R,
    ) -> Vec<SpawnRequest> {
        self.elapsed += dt;
        self.timer -= dt;
        self.intensity = Self::intensity_at(self.elapsed);

        if population >= Self::population_cap(self.intensity) {
            self.timer = self.timer.max(SPAWN_CAP_BACKOFF);
            return Vec::new();
        }
        if self.timer > 0.0 {
            return Vec::new();
        }

        let count = Self::batch_size(self.intensity);
        let radius = Self::spawn_radius(self.intensity);
        let batch: Vec<SpawnRequest> = (0..count)
            .map(|_| {
                let angle = rand_range(rng, 0.0, std::f32::consts::TAU);
                let jitter = Vec2::new(
                    rand_range(rng, -SPAWN_JITTER, SPAWN_JITTER),
                    rand_range(rng, -SPAWN_JITTER, SPAWN_JITTER),
                );
                SpawnRequest {
                    pos: player_pos + Vec2::from_angle(angle) * radius + jitter,
                    level: self.intensity,
                    variant: rng.gen_range(0..self.monster_variants),
                }
            })
            .collect();

        self.timer = Self::spawn_interval(self.elapsed);
        debug!(
            count,
            intensity = self.intensity,
            population,
            next_in = self.timer,
            "spawn batch"
        );
        batch
    }
}
