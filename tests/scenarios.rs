//! End-to-end scenarios driving machines the way a game loop would.

use statecraft::builder::{any_state_transition, guarded_transition, simple_transition};
use statecraft::core::{State, StateMachine, Transition};
use statecraft::{StateMachineBuilder, TransitionBuilder};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

type Log = Rc<RefCell<Vec<String>>>;

fn log_lifecycle(state: &State, log: &Log) {
    let name = state.name().to_string();
    {
        let log = Rc::clone(log);
        let name = name.clone();
        state.on_enter(move |prev| {
            let prev = prev.map_or("none", |s| s.name()).to_string();
            log.borrow_mut().push(format!("enter {name} from {prev}"));
        });
    }
    {
        let log = Rc::clone(log);
        state.on_exit(move |next| {
            log.borrow_mut().push(format!("exit {name} to {}", next.name()));
        });
    }
}

#[test]
fn timed_transition_fires_once_timer_reaches_threshold() {
    init_tracing();

    let a = State::new("A");
    let b = State::new("B");
    let machine = StateMachine::new("M", Some(&a));
    machine.add_state(&b);

    // The machine timer accumulates before transitions are evaluated.
    let clock = machine.downgrade();
    a.add_transition(&guarded_transition("a_to_b", &a, &b, move || {
        clock.upgrade().is_some_and(|m| m.timer() >= 1.0)
    }));

    machine.update(0.5);
    assert_eq!(machine.current_state(), Some(a.clone()));
    assert_eq!(machine.timer(), 0.5);
    assert_eq!(a.timer(), 0.5);

    machine.update(0.5);
    assert_eq!(machine.current_state(), Some(b.clone()));
    assert!(!machine.is_transitioning());
    assert_eq!(a.timer(), 0.0);
    assert_eq!(b.timer(), 0.0);
}

#[test]
fn child_timer_predicate_is_seen_one_tick_late() {
    init_tracing();

    let a = State::new("A");
    let b = State::new("B");
    let machine = StateMachine::new("M", Some(&a));
    machine.add_state(&b);

    let own_clock = a.downgrade();
    a.add_transition(&guarded_transition("a_to_b", &a, &b, move || {
        own_clock.upgrade().is_some_and(|a| a.timer() >= 1.0)
    }));

    machine.update(0.5);
    machine.update(0.5);
    assert_eq!(machine.current_state(), Some(a.clone()));
    assert_eq!(a.timer(), 1.0);

    machine.update(0.5);
    assert_eq!(machine.current_state(), Some(b));
    assert_eq!(a.timer(), 0.0);
}

#[test]
fn any_state_interrupt_reaches_target_from_every_state() {
    init_tracing();

    for start_in_b in [false, true] {
        let a = State::new("A");
        let b = State::new("B");
        let c = State::new("C");
        let machine = StateMachine::new("M", Some(&a));
        machine.add_state(&b);
        machine.add_state(&c);
        if start_in_b {
            machine.set_default_state(&b);
        }
        machine.update(0.1);
        let before = machine.current_state();

        let log: Log = Rc::default();
        log_lifecycle(&c, &log);
        let t2 = Transition::new("t2", Some(&a), &c);
        t2.when(|| true);
        machine.add_any_state(&t2);

        machine.update(0.1);

        assert_eq!(machine.current_state(), Some(c.clone()));
        assert!(t2.from().is_none());
        let expected_prev = before.map(|s| s.name().to_string()).unwrap_or_default();
        assert_eq!(*log.borrow(), vec![format!("enter C from {expected_prev}")]);
    }
}

#[test]
fn multi_tick_transition_plays_out_before_entering_target() {
    init_tracing();

    let idle = State::new("Idle");
    let attack = State::new("Attack");
    let log: Log = Rc::default();
    log_lifecycle(&idle, &log);
    log_lifecycle(&attack, &log);

    let windup_frames = Rc::new(Cell::new(0));
    let swing = TransitionBuilder::new()
        .name("swing")
        .from(&idle)
        .to(&attack)
        .when(|| true)
        .on_transition({
            let windup_frames = Rc::clone(&windup_frames);
            move || {
                windup_frames.set(windup_frames.get() + 1);
                windup_frames.get() == 3
            }
        })
        .build()
        .unwrap();
    idle.add_transition(&swing);

    let machine = StateMachineBuilder::new("Fighter")
        .state(&idle)
        .state(&attack)
        .build()
        .unwrap();

    machine.update(0.016);
    assert!(machine.is_transitioning());
    machine.late_update(0.016);
    assert!(machine.is_transitioning());
    assert!(log.borrow().is_empty());

    machine.fixed_update();
    assert!(!machine.is_transitioning());
    assert_eq!(machine.current_state(), Some(attack));
    assert_eq!(
        *log.borrow(),
        vec!["exit Idle to Attack", "enter Attack from Idle"]
    );
    assert_eq!(machine.history().last().map(|r| r.ticks), Some(3));
}

#[test]
fn nested_locomotion_inside_character_machine() {
    init_tracing();

    let log: Log = Rc::default();

    let stand = State::new("Stand");
    let run = State::new("Run");
    let locomotion = StateMachine::new("Locomotion", Some(&stand));
    locomotion.add_state(&run);

    let ragdoll = State::new("Ragdoll");
    let character = StateMachine::new("Character", Some(&locomotion));
    character.add_state(&ragdoll);

    for state in [&stand, &run, &ragdoll, locomotion.as_state()] {
        log_lifecycle(state, &log);
    }

    let speed = Rc::new(Cell::new(0.0f32));
    stand.add_transition(&guarded_transition("start_run", &stand, &run, {
        let speed = Rc::clone(&speed);
        move || speed.get() > 1.0
    }));
    let knocked_out = Rc::new(Cell::new(false));
    character.add_any_state(&any_state_transition("knock_out", &ragdoll, {
        let knocked_out = Rc::clone(&knocked_out);
        move || knocked_out.get()
    }));
    ragdoll.add_transition(&simple_transition("get_up", &ragdoll, &locomotion));

    character.update(0.016);
    assert_eq!(character.current_state(), Some(locomotion.as_state().clone()));
    assert_eq!(locomotion.current_state(), Some(stand.clone()));

    speed.set(3.0);
    character.update(0.016);
    assert_eq!(locomotion.current_state(), Some(run.clone()));

    knocked_out.set(true);
    character.update(0.016);
    assert_eq!(character.current_state(), Some(ragdoll.clone()));

    knocked_out.set(false);
    character.update(0.016);
    assert_eq!(character.current_state(), Some(locomotion.as_state().clone()));
    // Locomotion resumes the child it left.
    assert_eq!(locomotion.current_state(), Some(run.clone()));

    assert_eq!(
        *log.borrow(),
        vec![
            "exit Stand to Run",
            "enter Run from Stand",
            "exit Locomotion to Ragdoll",
            "exit Run to Ragdoll",
            "enter Ragdoll from Locomotion",
            "exit Ragdoll to Locomotion",
            "enter Locomotion from Ragdoll",
            "enter Run from Ragdoll",
        ]
    );

    assert_eq!(character.get_state_with_tag("unused"), None);
    run.set_tag("fast");
    assert_eq!(character.get_state_with_tag("fast"), Some(run));
}

#[test]
fn removed_state_is_detached_but_alive() {
    init_tracing();

    let a = State::new("A");
    let b = State::new("B");
    let machine = StateMachine::new("M", Some(&a));
    machine.add_state(&b);
    machine.update(0.1);

    machine.remove_state(&b);
    assert!(b.parent().is_none());
    assert!(!machine.contains(&b));

    machine.remove_state(&a);
    assert!(machine.contains(&a));
}
