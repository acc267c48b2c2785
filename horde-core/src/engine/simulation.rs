use bevy::math::Vec2;
use rand::Rng;
use tracing::{debug, info, trace, warn};

use crate::constants::CAMERA_FOLLOW_RATE;
use crate::engine::collision::{resolve_contact_damage, resolve_pickups, resolve_projectile_hits};
use crate::engine::config::SimConfig;
use crate::engine::pool::EntityPool;
use crate::engine::SimError;
use crate::equipment::{roll_equipment, EquipmentItem, ItemId};
use crate::director::SpawnDirector;
use crate::fx::{Effect, EffectQueue, Frontend, VisualKind};
use crate::gameflow::{HudSnapshot, RunMode, RunSummary};
use crate::input::{Action, InputState};
use crate::logging::TimingSpan;
use crate::math::{rand_range, random_unit, rng_from_seed, SimRng};
use crate::monster::Monster;
use crate::pickup::{Pickup, PickupPayload};
use crate::player::Player;
use crate::progression::{apply_upgrade_choice, roll_choices, upgrade_pool, UpgradeChoice};
use crate::projectile::Projectile;
use crate::weapons::{Caster, SpawnQueue, WeaponCtx};

const FUSION_COLOR: u32 = 0xbfe8ff;
const EQUIPMENT_DROP_SCATTER: f32 = 24.0;

/// Clamps a host frame delta into `[0, max]`. NaN and negative deltas become 0.
pub fn clamp_dt(dt: f32, max: f32) -> f32 {
    if !(dt > 0.0) {
        return 0.0;
    }
    dt.min(max)
}

/// One complete run: player, arenas, director, and the single RNG stream.
pub struct Simulation {
    config: SimConfig,
    rng: SimRng,
    mode: RunMode,
    player: Player,
    monsters: EntityPool<Monster>,
    projectiles: EntityPool<Projectile>,
    pickups: EntityPool<Pickup>,
    director: SpawnDirector,
    spawns: SpawnQueue,
    effects: EffectQueue,
    camera: Vec2,
    hud: HudSnapshot,
    next_item_id: u64,
    frame: u64,
    runs_started: u32,
}

impl Simulation {
    pub fn new(config: SimConfig, frontend: &mut dyn Frontend) -> Self {
        let player = Self::fresh_player(&config, frontend);
        let camera = player.pos;
        let hud = HudSnapshot::capture(&player, 0.0, camera);
        info!(
            seed = config.seed,
            weapon = config.starting_weapon.name(),
            "run started"
        );
        Self {
            rng: rng_from_seed(config.seed),
            director: SpawnDirector::new(config.assets.monster_variants),
            mode: RunMode::Running,
            player,
            monsters: EntityPool::new(),
            projectiles: EntityPool::new(),
            pickups: EntityPool::new(),
            spawns: SpawnQueue::new(),
            effects: EffectQueue::new(),
            camera,
            hud,
            next_item_id: 1,
            frame: 0,
            runs_started: 1,
            config,
        }
    }

    fn fresh_player(config: &SimConfig, frontend: &mut dyn Frontend) -> Player {
        let visual = frontend.create_visual(&VisualKind::Player);
        let mut player = Player::new(visual, Vec2::ZERO);
        player.add_weapon(config.starting_weapon);
        player
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn mode(&self) -> &RunMode {
        &self.mode
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Direct player access for hosts and scripted scenarios.
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn monsters(&self) -> &[Monster] {
        self.monsters.as_slice()
    }

    pub fn projectiles(&self) -> &[Projectile] {
        self.projectiles.as_slice()
    }

    pub fn pickups(&self) -> &[Pickup] {
        self.pickups.as_slice()
    }

    pub fn director(&self) -> &SpawnDirector {
        &self.director
    }

    /// Unpaused seconds of the current run.
    pub fn elapsed(&self) -> f32 {
        self.director.elapsed()
    }

    pub fn camera(&self) -> Vec2 {
        self.camera
    }

    pub fn hud(&self) -> &HudSnapshot {
        &self.hud
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn runs_started(&self) -> u32 {
        self.runs_started
    }

    // ---------------------------------------------------------------
    // Frame step
    // ---------------------------------------------------------------

    /// Advances one host frame. Paused modes only refresh the camera and HUD
    /// and listen for the choice / restart keys.
    pub fn update(&mut self, dt: f32, input: &mut InputState, frontend: &mut dyn Frontend) {
        let _span = TimingSpan::new("frame");
        let dt = clamp_dt(dt, self.config.max_frame_dt);
        self.frame += 1;

        match self.mode {
            RunMode::Running => self.step_running(dt, input, frontend),
            RunMode::ChoosingUpgrade { .. } => {
                if let Some(index) = input.chosen_index() {
                    if let Err(err) = self.choose_upgrade(index) {
                        warn!(%err, index, "upgrade choice rejected");
                    }
                }
            }
            RunMode::GameOver(_) => {
                if input.was_pressed(Action::Confirm) {
                    self.reset(frontend);
                }
            }
        }

        self.follow_camera(dt);
        self.refresh_hud();
        self.effects.flush(frontend);
        input.end_frame();
        trace!(frame = self.frame, dt, "frame done");
    }

    fn step_running(&mut self, dt: f32, input: &InputState, frontend: &mut dyn Frontend) {
        // spawns
        let requests = self.director.tick(
            dt,
            self.monsters.alive_count(),
            self.player.pos,
            &mut self.rng,
        );
        for req in requests {
            let visual = frontend.create_visual(&VisualKind::Monster {
                variant: req.variant,
            });
            let rng = &mut self.rng;
            self.monsters
                .insert_with(|id| Monster::new(id, visual, req.variant, req.pos, req.level, rng));
        }
        let now = self.director.elapsed();

        // player and weapons
        self.player.update(dt, input.move_axis(), now);
        if !self.player.dead {
            let caster = Caster::of(&self.player);
            let mut weapons = std::mem::take(&mut self.player.weapons);
            let mut ctx = WeaponCtx {
                caster,
                monsters: self.monsters.as_mut_slice(),
                spawns: &mut self.spawns,
                effects: &mut self.effects,
                rng: &mut self.rng,
            };
            for weapon in weapons.iter_mut() {
                weapon.update(dt, &mut ctx);
            }
            self.player.weapons = weapons;
        }
        for spec in self.spawns.drain() {
            let visual = frontend.create_visual(&spec.visual_kind());
            self.projectiles
                .insert_with(|id| Projectile::from_spec(id, visual, spec));
        }

        // monsters and contact
        let (player_pos, player_level) = (self.player.pos, self.player.level);
        for m in self.monsters.iter_mut() {
            m.update(dt, player_pos, player_level);
        }
        resolve_contact_damage(
            &mut self.player,
            self.monsters.as_slice(),
            now,
            &mut self.effects,
        );

        for p in self.projectiles.iter_mut() {
            p.update(dt);
        }
        let pickup_radius = self.player.pickup_radius;
        for x in self.pickups.iter_mut() {
            x.update(dt, player_pos, pickup_radius);
        }

        resolve_projectile_hits(
            self.projectiles.as_mut_slice(),
            self.monsters.as_mut_slice(),
            &mut self.effects,
        );
        resolve_pickups(&mut self.player, self.pickups.as_mut_slice());

        self.cleanup(frontend);

        if self.player.dead {
            let summary = RunSummary {
                elapsed_secs: now,
                level: self.player.level,
                kills: self.player.kills,
            };
            info!(%summary, "game over");
            self.mode = RunMode::GameOver(summary);
        } else {
            self.offer_pending_upgrade();
        }
    }

    fn cleanup(&mut self, frontend: &mut dyn Frontend) {
        for m in self.monsters.sweep_dead() {
            frontend.destroy_visual(m.visual);
            self.player.kills += 1;
            self.effects.push(Effect::BurstGlyph {
                pos: m.pos,
                glyph: '✦',
                color: FUSION_COLOR,
                count: 10,
                speed: 220.0,
                life: 0.35,
            });
            self.spawn_pickup(frontend, m.pos, PickupPayload::Xp(m.xp_value()));

            let chance = self
                .config
                .equipment_drops
                .chance_for_luck(self.player.luck);
            if self.rng.gen::<f32>() < chance {
                let item = self.roll_drop();
                let offset = random_unit(&mut self.rng) * EQUIPMENT_DROP_SCATTER;
                debug!(rarity = item.rarity.label(), "equipment dropped");
                self.spawn_pickup(frontend, m.pos + offset, PickupPayload::Equipment(Box::new(item)));
            }
        }
        for p in self.projectiles.sweep_dead() {
            frontend.destroy_visual(p.visual);
        }
        for x in self.pickups.sweep_dead() {
            frontend.destroy_visual(x.visual);
        }
    }

    fn roll_drop(&mut self) -> EquipmentItem {
        let id = ItemId(self.next_item_id);
        self.next_item_id += 1;
        roll_equipment(
            id,
            self.player.luck,
            self.config.assets.equipment_icons_per_rarity,
            &mut self.rng,
        )
    }

    fn spawn_pickup(&mut self, frontend: &mut dyn Frontend, pos: Vec2, payload: PickupPayload) {
        let visual = frontend.create_visual(&payload.visual_kind());
        self.pickups
            .insert_with(|id| Pickup::new(id, visual, pos, payload));
    }

    fn follow_camera(&mut self, dt: f32) {
        let t = 1.0 - (-CAMERA_FOLLOW_RATE * dt).exp();
        self.camera += (self.player.pos - self.camera) * t;
    }

    fn refresh_hud(&mut self) {
        self.hud = HudSnapshot::capture(&self.player, self.director.elapsed(), self.camera);
    }

    // ---------------------------------------------------------------
    // Upgrades
    // ---------------------------------------------------------------

    /// Opens the next queued level-up prompt, if any.
    fn offer_pending_upgrade(&mut self) {
        if !self.player.try_consume_level_up() {
            return;
        }
        let pool = upgrade_pool(&self.player);
        let choices = roll_choices(&pool, &mut self.rng);
        info!(
            level = self.player.level,
            pool = pool.len(),
            queued = self.player.pending_level_ups(),
            "level up"
        );
        self.mode = RunMode::ChoosingUpgrade { choices };
    }

    /// Applies the choice at `index` of the open prompt. Further queued
    /// level-ups open the next prompt immediately.
    pub fn choose_upgrade(&mut self, index: usize) -> Result<UpgradeChoice, SimError> {
        let choices = self.mode.choices().ok_or(SimError::NotChoosingUpgrade)?;
        let choice = *choices.get(index).ok_or(SimError::ChoiceOutOfRange {
            index,
            available: choices.len(),
        })?;

        apply_upgrade_choice(&mut self.player, &choice);
        if choice.is_fusion() {
            self.celebrate_fusion();
        }
        self.mode = RunMode::Running;
        self.offer_pending_upgrade();
        self.refresh_hud();
        Ok(choice)
    }

    fn celebrate_fusion(&mut self) {
        let pos = self.player.pos;
        self.effects.push(Effect::Shockwave {
            pos,
            radius: 440.0,
            color: FUSION_COLOR,
            life: 0.65,
        });
        for _ in 0..3 {
            let from = pos
                + Vec2::new(
                    rand_range(&mut self.rng, -160.0, 160.0),
                    -320.0 - rand_range(&mut self.rng, 0.0, 120.0),
                );
            self.effects.push(Effect::LightningArc {
                from,
                to: pos,
                color: FUSION_COLOR,
                life: 0.22,
                width: 3.2,
                segments: 14,
                chaos: 34.0,
                branches: 3,
            });
        }
        self.effects.spark(pos, FUSION_COLOR, 2.1);
    }

    /// Drops the equipment in `slot`; the item is gone, not put back on the ground.
    pub fn discard_equipment(&mut self, slot: usize) -> Option<EquipmentItem> {
        let item = self.player.discard_equipment(slot);
        self.refresh_hud();
        item
    }

    // ---------------------------------------------------------------
    // Restart
    // ---------------------------------------------------------------

    /// Starts a fresh run after a game over. The RNG stream continues.
    pub fn restart_after_game_over(&mut self, frontend: &mut dyn Frontend) -> Result<(), SimError> {
        if !matches!(self.mode, RunMode::GameOver(_)) {
            return Err(SimError::RunNotOver);
        }
        self.reset(frontend);
        Ok(())
    }

    fn reset(&mut self, frontend: &mut dyn Frontend) {
        for m in self.monsters.drain_all() {
            frontend.destroy_visual(m.visual);
        }
        for p in self.projectiles.drain_all() {
            frontend.destroy_visual(p.visual);
        }
        for x in self.pickups.drain_all() {
            frontend.destroy_visual(x.visual);
        }
        frontend.destroy_visual(self.player.visual);

        self.player = Self::fresh_player(&self.config, frontend);
        self.director = SpawnDirector::new(self.config.assets.monster_variants);
        self.spawns = SpawnQueue::new();
        self.effects.clear();
        self.camera = self.player.pos;
        self.mode = RunMode::Running;
        self.runs_started += 1;
        self.refresh_hud();
        info!(run = self.runs_started, "run restarted");
    }
}
