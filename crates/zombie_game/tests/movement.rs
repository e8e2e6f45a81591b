// crates/zombie_game/tests/movement.rs
mod common;

use std::f32::consts::{FRAC_PI_2, PI};

use common::{Session, DT};
use engine_ecs::EntityId;
use engine_shared::glam::Vec3;
use engine_shared::{Aabb, Action};
use zombie_game::PlayerController;

/// A player at `position` turned to `yaw`, with the level created.
fn spawn(s: &mut Session, position: Vec3, yaw: f32) -> EntityId {
    let player = s.add_player(position);
    s.level.object_mut(player).expect("player").transform_mut().rotation.y = yaw;
    s.level.create().expect("player present");
    player
}

fn at(s: &Session, player: EntityId) -> Vec3 {
    s.level.object(player).expect("player").position()
}

fn yaw(s: &Session, player: EntityId) -> f32 {
    s.level.object(player).expect("player").transform().yaw()
}

fn walk_phase(s: &Session, player: EntityId) -> f32 {
    s.level.component::<PlayerController>(player).expect("controller").walk_phase()
}

#[test]
fn crates_stop_forward_walking() {
    let mut s = Session::new();
    s.level.add_obstacle(Aabb::from_center_size(Vec3::new(1.0, 1.0, 0.0), Vec3::ONE), None);
    let player = spawn(&mut s, Vec3::new(-2.0, 1.0, 0.0), -FRAC_PI_2);

    s.press(Action::Up, true);
    for _ in 0..64 {
        s.level.advance(0.03125);
    }
    let position = at(&s, player);
    assert!(position.x > -0.1 && position.x < 0.2, "stopped short of the crate at {position}");
    assert!(position.z.abs() < 1e-3);

    s.press(Action::Up, false);
    s.press(Action::Down, true);
    s.run(0.5);
    assert!(at(&s, player).x < position.x - 1.0, "backing away is never blocked");
}

#[test]
fn players_stay_inside_the_world_bound() {
    let mut s = Session::new();
    let player = spawn(&mut s, Vec3::new(74.0, 1.0, 0.0), -FRAC_PI_2);

    s.press(Action::Up, true);
    s.run(2.0);
    let position = at(&s, player);
    assert!((position.x - 74.5).abs() < 1e-3);
    assert!(position.x < 75.0);
}

#[test]
fn pointer_drag_turns_the_player() {
    let mut s = Session::new();
    let player = spawn(&mut s, Vec3::new(0.0, 1.0, 0.0), 0.0);

    {
        let mut input = s.input.borrow_mut();
        input.set_pointer_held(true);
        input.push_pointer_delta(100.0);
    }
    s.level.advance(DT);
    assert!((yaw(&s, player) + 1.0).abs() < 1e-5);

    s.level.advance(DT);
    assert!((yaw(&s, player) + 1.0).abs() < 1e-5, "a drag is consumed once");
}

#[test]
fn look_keys_turn_at_look_speed() {
    let mut s = Session::new();
    let player = spawn(&mut s, Vec3::new(0.0, 1.0, 0.0), 0.0);

    s.press(Action::LookLeft, true);
    s.run(1.0);
    assert!((yaw(&s, player) - 2.0).abs() < 1e-4);

    s.press(Action::LookLeft, false);
    s.press(Action::LookRight, true);
    s.run(0.5);
    assert!((yaw(&s, player) - 1.0).abs() < 1e-4);
    assert_eq!(at(&s, player), Vec3::new(0.0, 1.0, 0.0));
}

#[test]
fn forward_wins_over_other_directions() {
    let mut s = Session::new();
    let player = spawn(&mut s, Vec3::new(0.0, 1.0, 0.0), 0.0);

    s.press(Action::Up, true);
    s.press(Action::Down, true);
    s.press(Action::Left, true);
    s.run(1.0);
    let position = at(&s, player);
    assert!((position.z + 4.0).abs() < 1e-4);
    assert!(position.x.abs() < 1e-4);

    s.press(Action::Up, false);
    s.run(1.0);
    assert!((at(&s, player).z).abs() < 1e-4, "down beats left");
}

#[test]
fn walk_bob_wraps_and_settles() {
    let mut s = Session::new();
    let player = spawn(&mut s, Vec3::new(0.0, 1.0, 0.0), 0.0);

    s.press(Action::Down, true);
    s.run(1.5);
    assert!((walk_phase(&s, player) - 1.5).abs() < 1e-5);
    s.level.advance(DT);
    assert_eq!(walk_phase(&s, player), 0.0, "wrapped at a quarter turn");

    s.run(0.5);
    s.press(Action::Down, false);
    s.level.advance(DT);
    assert!((walk_phase(&s, player) - 0.25).abs() < 1e-5);
    s.run(0.5);
    assert_eq!(walk_phase(&s, player), 0.0);

    let pitch = s.level.object(player).expect("player").transform().rotation.x;
    assert!(pitch.abs() <= PI / 320.0);
}
