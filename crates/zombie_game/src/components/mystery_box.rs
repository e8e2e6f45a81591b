// crates/zombie_game/src/components/mystery_box.rs

use std::f32::consts::FRAC_PI_2;

use engine_ecs::{Component, ComponentCtx, EntityId, Level, Step, Task};
use engine_shared::glam::Vec3;
use engine_shared::{RenderHandle, Transform, Visual};
use rand::Rng;
use tracing::{debug, info, warn};

use super::any_plumbing;
use super::player::PlayerController;
use super::spawner::SpawnerManager;
use super::zombie::ZombieAi;
use super::ZOMBIE;
use crate::config::{ms, LootConfig};

pub const BOX_MODEL: &str = "box";
pub const DANCE_BOMB: &str = "danceBomb";
const LOOT_HEIGHT: f32 = 1.5;

/// Weighted loot names. A draw in `[0, 1)` walks the cumulative weights.
#[derive(Debug, Clone, PartialEq)]
pub struct LootTable {
    entries: Vec<(String, f64)>,
}

impl LootTable {
    pub fn new(entries: Vec<(String, f64)>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    /// Falls back to the last entry when rounding leaves the draw past the
    /// total weight.
    pub fn select(&self, draw: f64) -> Option<&str> {
        let mut cumulative = 0.0;
        for (name, weight) in &self.entries {
            cumulative += weight;
            if cumulative >= draw {
                return Some(name);
            }
        }
        self.entries.last().map(|(name, _)| name.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct MysteryBox {
    table: LootTable,
    cfg: LootConfig,
    opened: bool,
    loot: Option<RenderHandle>,
    dancing: bool,
}

impl MysteryBox {
    pub fn new(cfg: LootConfig) -> Self {
        Self {
            table: LootTable::new(cfg.entries.clone()),
            cfg,
            opened: false,
            loot: None,
            dancing: false,
        }
    }

    pub fn is_opened(&self) -> bool {
        self.opened
    }

    /// True while a dance bomb holds the spawners.
    pub fn is_dancing(&self) -> bool {
        self.dancing
    }

    pub fn table(&self) -> &LootTable {
        &self.table
    }

    /// Locks the box and picks the loot. `None` while already open.
    pub fn try_open(&mut self, draw: f64) -> Option<String> {
        if self.opened {
            return None;
        }
        let loot = self.table.select(draw)?.to_owned();
        self.opened = true;
        Some(loot)
    }

    /// Unlocks the box, handing back the loot visual to take down.
    pub fn finish(&mut self) -> Option<RenderHandle> {
        self.opened = false;
        self.dancing = false;
        self.loot.take()
    }
}

impl Component for MysteryBox {
    /// A box removed mid-sequence takes its loot down and releases the
    /// spawners it was holding.
    fn remove(&mut self, cx: &mut ComponentCtx<'_>) {
        let dancing = self.dancing;
        if let Some(handle) = self.finish() {
            cx.detach(handle);
        }
        if dancing {
            debug!("mystery box removed during a dance bomb");
            set_dancing(cx.level(), false);
        }
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(Self::new(self.cfg.clone()))
    }

    any_plumbing!();
}

/// Opens the box on `box_entity`, showing the drawn loot above it.
/// Returns false when the box is missing or already open.
pub fn open(level: &mut Level, box_entity: EntityId) -> bool {
    let draw: f64 = level.rng().gen();
    let Some(position) = level.object(box_entity).map(|o| o.position()) else {
        return false;
    };
    let Some(mystery) = level.component_mut::<MysteryBox>(box_entity) else {
        return false;
    };
    let Some(loot) = mystery.try_open(draw) else {
        return false;
    };
    let cfg = mystery.cfg.clone();
    info!(%loot, draw, "mystery box opened");

    let mut shown = Transform::from_position(Vec3::new(position.x, LOOT_HEIGHT, position.z));
    shown.rotation.y = FRAC_PI_2;
    shown.scale = Vec3::splat(0.25);
    let handle = {
        let render = level.render();
        let mut render = render.borrow_mut();
        let handle = render.attach(Visual::Model { asset: loot.clone() });
        render.set_transform(handle, &shown);
        handle
    };

    if let Some(mystery) = level.component_mut::<MysteryBox>(box_entity) {
        mystery.loot = Some(handle);
    }

    let stage = if loot == DANCE_BOMB { LootStage::Arm } else { LootStage::Show };
    let delay = match stage {
        LootStage::Arm => ms(cfg.bomb_delay_ms),
        _ => ms(cfg.show_ms),
    };
    let task = LootTask { box_entity, cfg, stage };
    level.scheduler_mut().spawn(delay, Some(box_entity), task);
    true
}

enum LootStage {
    Show,
    Arm,
    Dancing,
}

/// Keeps the box locked until the loot sequence is over.
struct LootTask {
    box_entity: EntityId,
    cfg: LootConfig,
    stage: LootStage,
}

impl LootTask {
    fn close(&self, level: &mut Level) -> Step {
        let handle = level.component_mut::<MysteryBox>(self.box_entity).and_then(MysteryBox::finish);
        if let Some(handle) = handle {
            level.render().borrow_mut().detach(handle);
        }
        debug!("mystery box closed");
        Step::Done
    }
}

impl Task for LootTask {
    fn resume(&mut self, level: &mut Level) -> Step {
        match self.stage {
            LootStage::Show => self.close(level),
            LootStage::Arm => {
                level.services().play("dancebomb", 0.1);
                if let Some(mystery) = level.component_mut::<MysteryBox>(self.box_entity) {
                    mystery.dancing = true;
                }
                set_dancing(level, true);
                self.stage = LootStage::Dancing;
                Step::Wait(ms(self.cfg.bomb_duration_ms))
            }
            LootStage::Dancing => {
                let zombies = level.find_by_name(ZOMBIE);
                info!(count = zombies.len(), "dance bomb went off");
                for zombie in zombies {
                    level.remove(zombie);
                }
                set_dancing(level, false);
                match level.player() {
                    Some(player) => {
                        if let Some(controller) = level.component_mut::<PlayerController>(player) {
                            controller.add_score(self.cfg.bomb_bonus);
                        }
                    }
                    None => warn!("dance bomb finished without a player"),
                }
                self.close(level)
            }
        }
    }
}

/// Freezes every zombie and holds the spawners, or lets both go again.
fn set_dancing(level: &mut Level, dancing: bool) {
    if let Some(spawners) = level.find_component_mut::<SpawnerManager>() {
        if dancing {
            spawners.pause_all();
        } else {
            spawners.resume_all();
        }
    }
    for zombie in level.find_by_name(ZOMBIE) {
        if let Some(ai) = level.component_mut::<ZombieAi>(zombie) {
            if dancing {
                ai.set_speed(0.0);
            } else {
                ai.restore_speed();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> LootTable {
        LootTable::new(LootConfig::default().entries)
    }

    #[test]
    fn draws_walk_the_cumulative_weights() {
        let table = table();
        assert_eq!(table.select(0.0), Some("gun"));
        assert_eq!(table.select(0.36), Some("rifle"));
        assert_eq!(table.select(0.999), Some(DANCE_BOMB));
    }

    #[test]
    fn every_draw_resolves() {
        let table = table();
        for step in 0..1000 {
            assert!(table.select(step as f64 / 1000.0).is_some());
        }
        assert_eq!(table.select(1.5), Some(DANCE_BOMB));
        assert_eq!(LootTable::new(Vec::new()).select(0.5), None);
    }

    #[test]
    fn box_stays_locked_until_finished() {
        let mut mystery = MysteryBox::new(LootConfig::default());
        assert_eq!(mystery.try_open(0.5).as_deref(), Some("rpg"));
        assert!(mystery.is_opened());
        assert_eq!(mystery.try_open(0.1), None);
        assert_eq!(mystery.finish(), None);
        assert_eq!(mystery.try_open(0.1).as_deref(), Some("gun"));
    }
}
