//! Guard Patrol State Machine
//!
//! This example drives an NPC guard through a simulated game loop.
//!
//! Key concepts:
//! - Timer-gated transitions (idle, then patrol)
//! - A nested machine (the patrol route) acting as a single state
//! - An any-state interrupt (spotting the player) that wins from anywhere
//! - A multi-frame transition (drawing a weapon)
//!
//! Run with: cargo run --example guard_patrol

use statecraft::builder::{any_state_transition, guarded_transition};
use statecraft::core::{State, StateMachine};
use std::cell::Cell;
use std::rc::Rc;

const FRAME: f32 = 0.25;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    println!("=== Guard Patrol State Machine ===\n");

    let idle = State::new("Idle");
    let alert = State::new("Alert");

    // Patrol route: walk between two waypoints, two seconds each.
    let north = State::new("WalkNorth");
    let south = State::new("WalkSouth");
    let patrol = StateMachine::new("Patrol", Some(&north));
    patrol.add_state(&south);
    for (from, to) in [(&north, &south), (&south, &north)] {
        let clock = from.downgrade();
        from.add_transition(&guarded_transition("turn_around", from, to, move || {
            clock.upgrade().is_some_and(|leg| leg.timer() >= 2.0)
        }));
    }

    let guard = StateMachine::new("Guard", Some(&idle));
    guard.add_state(&patrol);
    guard.add_state(&alert);

    let idle_clock = idle.downgrade();
    idle.add_transition(&guarded_transition("start_patrol", &idle, &patrol, move || {
        idle_clock.upgrade().is_some_and(|idle| idle.timer() >= 1.0)
    }));

    let player_visible = Rc::new(Cell::new(false));
    let spot = any_state_transition("spot_player", &alert, {
        let player_visible = Rc::clone(&player_visible);
        move || player_visible.get()
    });
    let draw_frames = Rc::new(Cell::new(0));
    spot.on_transition({
        let draw_frames = Rc::clone(&draw_frames);
        move || {
            draw_frames.set(draw_frames.get() + 1);
            println!("  ...drawing weapon ({}/3)", draw_frames.get());
            draw_frames.get() >= 3
        }
    });
    guard.add_any_state(&spot);

    alert.on_enter(|prev| {
        let prev = prev.map_or("nowhere", |s| s.name());
        println!("  Guard: \"Halt!\" (was in {prev})");
    });

    for frame in 0..30 {
        if frame == 24 {
            println!("\n  [player steps into view]");
            player_visible.set(true);
        }

        guard.update(FRAME);
        guard.late_update(FRAME);
        guard.fixed_update();

        let leaf = patrol
            .current_state()
            .filter(|_| guard.current_state().as_ref() == Some(patrol.as_state()));
        let top = guard
            .current_state()
            .map_or_else(|| "-".to_string(), |s| s.name().to_string());
        let leaf = leaf.map(|s| format!("/ {}", s.name())).unwrap_or_default();
        println!("frame {frame:>2}: {top:<7} {leaf}");
    }

    println!("\nVisited: {}", guard.history().get_path().join(" -> "));
    println!("\n=== Example Complete ===");
}
