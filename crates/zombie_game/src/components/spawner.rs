// crates/zombie_game/src/components/spawner.rs
//! Zombie waves.
//!
//! The manager's round loop runs as one [`RoundTask`] per round:
//! `Starting` waits out the pre-round delay, `Spawning` arms each spawner
//! after its own random stagger, `Active` and `Checking` poll until every
//! spawner is spent and no zombie is left, and the next round starts.
//! Every armed spawner emits its budget through its own [`SpawnerTask`].

use std::time::Duration;

use engine_ecs::{Component, ComponentCtx, EntityId, Level, Step, Task};
use engine_shared::glam::Vec3;
use engine_shared::{text_ids, ModelSource};
use rand::Rng;
use tracing::{debug, info};

use super::zombie::make_zombie;
use super::{any_plumbing, ZOMBIE};
use crate::config::{ms, RoundConfig, ZombieConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Idle,
    Starting,
    Spawning,
    Active,
    Checking,
}

/// True once nothing is left to spawn and no zombie is alive.
pub fn round_over(remaining: u32, zombies: usize) -> bool {
    remaining == 0 && zombies == 0
}

#[derive(Debug, Clone)]
pub struct ZombieSpawner {
    name: String,
    position: Vec3,
    remaining: u32,
    round: u32,
    should_spawn: bool,
}

impl ZombieSpawner {
    pub const HEIGHT: f32 = 1.0;

    pub fn new(index: usize, mut position: Vec3) -> Self {
        position.y = Self::HEIGHT;
        Self {
            name: format!("ZombieSpawner{index}"),
            position,
            remaining: 0,
            round: 0,
            should_spawn: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn arm(&mut self, round: u32, budget: u32) {
        self.round = round;
        self.remaining = budget;
    }

    pub fn is_paused(&self) -> bool {
        !self.should_spawn
    }

    pub fn pause(&mut self) {
        self.should_spawn = false;
    }

    pub fn resume(&mut self) {
        self.should_spawn = true;
    }

    pub fn spawn_point(&self, jitter: f32, height: f32) -> Vec3 {
        Vec3::new(self.position.x + jitter, height, self.position.z)
    }

    fn take_one(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

#[derive(Clone)]
pub struct SpawnerManager {
    round: u32,
    phase: RoundPhase,
    spawners: Vec<ZombieSpawner>,
    rounds: RoundConfig,
    zombies: ZombieConfig,
    models: ModelSource,
}

impl SpawnerManager {
    pub fn new(rounds: RoundConfig, zombies: ZombieConfig, models: ModelSource) -> Self {
        Self {
            round: 0,
            phase: RoundPhase::Idle,
            spawners: Vec::new(),
            rounds,
            zombies,
            models,
        }
    }

    pub fn add_spawner(&mut self, position: Vec3) -> usize {
        let index = self.spawners.len();
        self.spawners.push(ZombieSpawner::new(index, position));
        index
    }

    pub fn spawners(&self) -> &[ZombieSpawner] {
        &self.spawners
    }

    pub fn spawners_mut(&mut self) -> &mut [ZombieSpawner] {
        &mut self.spawners
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_started(&self) -> bool {
        self.phase != RoundPhase::Idle
    }

    pub fn remaining_total(&self) -> u32 {
        self.spawners.iter().map(ZombieSpawner::remaining).sum()
    }

    pub fn pause_all(&mut self) {
        self.spawners.iter_mut().for_each(ZombieSpawner::pause);
    }

    pub fn resume_all(&mut self) {
        self.spawners.iter_mut().for_each(ZombieSpawner::resume);
    }

    /// Advances to the next round unless one is already running.
    pub fn begin_round(&mut self) -> Option<u32> {
        if self.is_started() {
            return None;
        }
        self.round += 1;
        self.phase = RoundPhase::Starting;
        info!(round = self.round, "round is starting");
        Some(self.round)
    }

    fn finish_round(&mut self) {
        info!(round = self.round, "round over");
        self.phase = RoundPhase::Idle;
    }
}

impl Component for SpawnerManager {
    fn update(&mut self, cx: &mut ComponentCtx<'_>, _dt: f32) {
        let Some(manager) = cx.entity() else {
            return;
        };
        if let Some(round) = self.begin_round() {
            cx.services().set_text(text_ids::ROUND, &round.to_string());
            let delay = self.rounds.pre_round_delay(round);
            cx.scheduler().spawn(delay, Some(manager), RoundTask::new(manager, round));
        }
    }

    fn clone_box(&self) -> Box<dyn Component> {
        let mut copy = self.clone();
        copy.round = 0;
        copy.phase = RoundPhase::Idle;
        for spawner in &mut copy.spawners {
            spawner.arm(0, 0);
            spawner.resume();
        }
        Box::new(copy)
    }

    any_plumbing!();
}

/// Starts the next round of the manager on `manager`. No-op while a round
/// is running.
pub fn start_round(level: &mut Level, manager: EntityId) -> bool {
    let Some(spawners) = level.component_mut::<SpawnerManager>(manager) else {
        return false;
    };
    let Some(round) = spawners.begin_round() else {
        return false;
    };
    let delay = spawners.rounds.pre_round_delay(round);
    level.services().set_text(text_ids::ROUND, &round.to_string());
    level.scheduler_mut().spawn(delay, Some(manager), RoundTask::new(manager, round));
    true
}

enum RoundStage {
    Starting,
    Arming(usize),
    Polling,
}

pub struct RoundTask {
    manager: EntityId,
    round: u32,
    stage: RoundStage,
}

impl RoundTask {
    fn new(manager: EntityId, round: u32) -> Self {
        Self { manager, round, stage: RoundStage::Starting }
    }

    /// Waits the stagger of spawner `next`, or switches to polling once
    /// every spawner is armed.
    fn stagger(&mut self, level: &mut Level, next: usize) -> Step {
        let Some(spawners) = level.component_mut::<SpawnerManager>(self.manager) else {
            return Step::Done;
        };
        let (lo, hi) = (spawners.rounds.stagger_min_ms, spawners.rounds.stagger_max_ms);

        if next >= spawners.spawners.len() {
            spawners.phase = RoundPhase::Active;
            self.stage = RoundStage::Polling;
            return Step::Wait(ms(spawners.rounds.poll_ms));
        }

        let stagger = if hi > lo { level.rng().gen_range(lo..hi) } else { lo };
        self.stage = RoundStage::Arming(next);
        Step::Wait(ms(stagger))
    }
}

impl Task for RoundTask {
    fn resume(&mut self, level: &mut Level) -> Step {
        let manager = self.manager;
        let round = self.round;
        let Some(spawners) = level.component_mut::<SpawnerManager>(manager) else {
            return Step::Done;
        };

        match self.stage {
            RoundStage::Starting => {
                spawners.phase = RoundPhase::Spawning;
                info!(round, "round started");
                self.stagger(level, 0)
            }
            RoundStage::Arming(index) => {
                let budget = spawners.rounds.wave_budget(round);
                let pace = ms(spawners.rounds.pace_ms);
                let (jitter, height) = (spawners.rounds.jitter, spawners.rounds.spawn_height);
                if let Some(spawner) = spawners.spawners.get_mut(index) {
                    spawner.arm(round, budget);
                    debug!(spawner = spawner.name(), budget, "spawner armed");
                    let task = SpawnerTask { manager, index, pace, jitter, height };
                    level.scheduler_mut().spawn(Duration::ZERO, Some(manager), task);
                }
                self.stagger(level, index + 1)
            }
            RoundStage::Polling => {
                let remaining = spawners.remaining_total();
                if remaining == 0 && spawners.phase == RoundPhase::Active {
                    spawners.phase = RoundPhase::Checking;
                }
                let poll = ms(spawners.rounds.poll_ms);

                if !round_over(remaining, level.count_by_name_prefix(ZOMBIE)) {
                    return Step::Wait(poll);
                }
                if let Some(spawners) = level.component_mut::<SpawnerManager>(manager) {
                    spawners.finish_round();
                }
                start_round(level, manager);
                Step::Done
            }
        }
    }
}

/// Emits one zombie per pace interval until the spawner's budget is spent.
/// A paused spawner keeps its budget and retries after each interval.
pub struct SpawnerTask {
    manager: EntityId,
    index: usize,
    pace: Duration,
    jitter: f32,
    height: f32,
}

impl Task for SpawnerTask {
    fn resume(&mut self, level: &mut Level) -> Step {
        let jitter = if self.jitter > 0.0 { level.rng().gen_range(0.0..self.jitter) } else { 0.0 };

        let Some(spawners) = level.component_mut::<SpawnerManager>(self.manager) else {
            return Step::Done;
        };
        let zombies = spawners.zombies.clone();
        let models = spawners.models.clone();
        let Some(spawner) = spawners.spawners.get_mut(self.index) else {
            return Step::Done;
        };
        if spawner.remaining() == 0 {
            return Step::Done;
        }
        if spawner.is_paused() {
            return Step::Wait(self.pace);
        }

        let position = spawner.spawn_point(jitter, self.height);
        let round = spawner.round();
        spawner.take_one();
        let left = spawner.remaining();
        debug!(spawner = spawner.name(), left, "zombie spawned");

        level.add(make_zombie(position, round, &zombies, &*models));
        if left == 0 {
            Step::Done
        } else {
            Step::Wait(self.pace)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::rc::Rc;

    use engine_shared::ModelAsset;

    use super::*;

    fn manager() -> SpawnerManager {
        let models: ModelSource = Rc::new(HashMap::<String, ModelAsset>::new());
        SpawnerManager::new(RoundConfig::default(), ZombieConfig::default(), models)
    }

    #[test]
    fn begin_round_is_guarded_while_started() {
        let mut manager = manager();
        assert_eq!(manager.begin_round(), Some(1));
        assert_eq!(manager.begin_round(), None);
        assert_eq!(manager.round(), 1);
        assert_eq!(manager.phase(), RoundPhase::Starting);

        manager.finish_round();
        assert_eq!(manager.begin_round(), Some(2));
    }

    #[test]
    fn round_needs_spent_spawners_and_no_zombies() {
        assert!(round_over(0, 0));
        assert!(!round_over(1, 0));
        assert!(!round_over(0, 1));
    }

    #[test]
    fn spawners_sit_at_fixed_height_and_jitter_on_x() {
        let mut manager = manager();
        manager.add_spawner(Vec3::new(4.0, 7.0, -2.0));
        let spawner = &manager.spawners()[0];
        assert_eq!(spawner.name(), "ZombieSpawner0");
        assert_eq!(spawner.position().y, ZombieSpawner::HEIGHT);
        assert_eq!(spawner.spawn_point(1.5, 1.5), Vec3::new(5.5, 1.5, -2.0));
    }

    #[test]
    fn pause_keeps_the_budget() {
        let mut manager = manager();
        manager.add_spawner(Vec3::ZERO);
        manager.add_spawner(Vec3::X);
        for spawner in manager.spawners_mut() {
            spawner.arm(2, 5);
        }
        manager.pause_all();
        assert!(manager.spawners().iter().all(ZombieSpawner::is_paused));
        assert_eq!(manager.remaining_total(), 10);
        manager.resume_all();
        assert!(!manager.spawners()[1].is_paused());
    }
}
