// crates/zombie_game/tests/combat.rs
mod common;

use common::{models, Session};
use engine_ecs::{DamageOutcome, Damageable};
use engine_shared::glam::Vec3;
use engine_shared::{text_ids, Action};
use zombie_game::combat::deal_damage;
use zombie_game::config::{PlayerConfig, ZombieConfig};
use zombie_game::{make_zombie, PlayerController, PlayerGun};

#[test]
fn trigger_needs_a_fresh_press() {
    let mut s = Session::new();
    let player = s.add_player(Vec3::new(0.0, 1.0, 0.0));
    s.level.create().expect("player present");

    s.press(Action::Shoot, true);
    s.run(1.0);
    let gun = s.level.component::<PlayerGun>(player).expect("gun");
    assert_eq!(gun.mag(), 19, "holding the trigger fires once");
    assert!(!gun.has_shot());
    assert_eq!(s.headless.audio.borrow().count("gunFire"), 1);

    s.press(Action::Shoot, false);
    s.run(0.125);
    s.press(Action::Shoot, true);
    s.run(0.125);
    assert_eq!(s.level.component::<PlayerGun>(player).expect("gun").mag(), 18);
}

#[test]
fn reload_blocks_shots_until_refilled() {
    let mut s = Session::new();
    let player = s.add_player(Vec3::new(0.0, 1.0, 0.0));
    s.level.create().expect("player present");

    s.press(Action::Reload, true);
    s.run(0.25);
    assert!(!s.level.component::<PlayerGun>(player).expect("gun").is_reloading(), "full magazine");
    s.press(Action::Reload, false);

    s.press(Action::Shoot, true);
    s.run(0.5);
    s.press(Action::Shoot, false);
    s.press(Action::Reload, true);
    s.run(0.25);
    s.press(Action::Reload, false);
    s.press(Action::Shoot, true);
    s.run(0.5);

    let gun = s.level.component::<PlayerGun>(player).expect("gun");
    assert!(gun.is_reloading());
    assert_eq!(gun.mag(), 19);

    s.press(Action::Shoot, false);
    s.run(1.0);
    let gun = s.level.component::<PlayerGun>(player).expect("gun");
    assert!(!gun.is_reloading());
    assert_eq!(gun.mag(), 20);
    assert_eq!(s.headless.audio.borrow().count("gunReload"), 1);
}

#[test]
fn two_shots_kill_a_first_round_zombie() {
    let mut s = Session::new();
    let player = s.add_player(Vec3::new(0.0, 1.0, 0.0));
    let zombie = s.level.add(make_zombie(
        Vec3::new(0.0, 1.5, -8.0),
        1,
        &ZombieConfig::default(),
        &*models(),
    ));
    s.level.create().expect("player present");

    for _ in 0..2 {
        s.press(Action::Shoot, true);
        s.run(0.5);
        s.press(Action::Shoot, false);
        s.run(0.125);
    }

    assert!(!s.level.contains(zombie));
    let controller = s.level.component::<PlayerController>(player).expect("controller");
    assert_eq!(controller.score(), 70);
    assert_eq!(s.headless.text(text_ids::SCORE), "70");
    assert_eq!(s.headless.audio.borrow().count("hit"), 2);
}

#[test]
fn obstacles_stop_shots() {
    let mut s = Session::new();
    let player = s.add_player(Vec3::new(0.0, 1.0, 0.0));
    let zombie = s.level.add(make_zombie(
        Vec3::new(0.0, 1.5, -8.0),
        1,
        &ZombieConfig::default(),
        &*models(),
    ));
    s.level.add_obstacle(
        engine_shared::Aabb::from_center_size(Vec3::new(0.0, 1.0, -3.0), Vec3::ONE),
        None,
    );
    s.level.create().expect("player present");

    s.press(Action::Shoot, true);
    s.run(0.5);

    assert!(s.level.contains(zombie));
    assert_eq!(s.level.component::<PlayerController>(player).expect("controller").score(), 0);
}

#[test]
fn lethal_damage_despawns_once() {
    let mut s = Session::new();
    let zombie = s.level.add(make_zombie(Vec3::ZERO, 1, &ZombieConfig::default(), &*models()));
    let _ = s.level.create();

    assert_eq!(deal_damage(&mut s.level, zombie, 1), DamageOutcome::Wounded { immunity: None });
    assert!(s.level.contains(zombie));
    let outcome = deal_damage(&mut s.level, zombie, 1);
    assert!(outcome.is_lethal());
    assert!(!s.level.contains(zombie));
    assert_eq!(deal_damage(&mut s.level, zombie, 1), DamageOutcome::Ignored);
}

#[test]
fn player_immunity_window() {
    let mut s = Session::new();
    let player = s.add_player(Vec3::new(0.0, 1.0, 0.0));
    s.level.create().expect("player present");

    let wound = deal_damage(&mut s.level, player, 1);
    assert!(matches!(wound, DamageOutcome::Wounded { immunity: Some(_) }));
    assert_eq!(deal_damage(&mut s.level, player, 1), DamageOutcome::Ignored);

    s.run(1.25);
    assert_eq!(deal_damage(&mut s.level, player, 1), DamageOutcome::Wounded {
        immunity: Some(std::time::Duration::from_millis(PlayerConfig::default().immunity_ms)),
    });
    s.run(1.25);
    assert_eq!(deal_damage(&mut s.level, player, 1), DamageOutcome::Lethal { despawn: false });

    let controller = s.level.component::<PlayerController>(player).expect("controller");
    assert!(controller.is_dead());
    assert_eq!(controller.health(), 0);
    assert!(s.level.contains(player), "a dead player stays in the level");
}

#[test]
fn zombies_bite_within_reach() {
    let mut s = Session::new();
    let player = s.add_player(Vec3::new(0.0, 1.0, 0.0));
    s.level.add(make_zombie(Vec3::new(0.2, 1.5, 0.0), 1, &ZombieConfig::default(), &*models()));
    s.level.create().expect("player present");

    s.run(0.25);
    let controller = s.level.component::<PlayerController>(player).expect("controller");
    assert_eq!(controller.health(), PlayerConfig::default().health - 1);
    assert!(controller.is_immune());
    assert_eq!(s.headless.audio.borrow().count("playerHit"), 1);
}
