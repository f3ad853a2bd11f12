//! End-to-end scenarios across machines, runners and spec loading.

use automata::builder::{HookRegistry, MachineBuilder, MachineSpec};
use automata::core::{Hook, Reaction, StateDescriptor, StateOptions};
use automata::runner::{FiniteRunner, HierarchicalRunner};
use automata::{CopyMode, FiniteMachine, HierarchicalMachine, MachineError};
use std::cell::RefCell;
use std::rc::Rc;

fn up_down() -> FiniteMachine {
    let mut machine = FiniteMachine::new();
    machine.add_state("down", StateOptions::new()).unwrap();
    machine.add_state("up", StateOptions::new()).unwrap();
    machine.add_transition("down", "up", "jump").unwrap();
    machine.add_transition("up", "down", "fall").unwrap();
    machine
        .add_reaction("up", "jump", Reaction::emit("fall"))
        .unwrap();
    machine
        .add_reaction("down", "fall", Reaction::emit("jump"))
        .unwrap();
    machine
}

#[test]
fn up_down_machine_oscillates() {
    let mut machine = up_down();
    machine.initialize(Some("down")).unwrap();
    assert_eq!(machine.current_state(), Some("down"));

    let effect = machine.process_event("jump").unwrap();
    assert_eq!(machine.current_state(), Some("up"));
    let next = effect.reaction().unwrap().invoke("down", "up", "jump");
    assert_eq!(next, "fall");

    let effect = machine.process_event(&next).unwrap();
    assert_eq!(machine.current_state(), Some("down"));
    let next = effect.reaction().unwrap().invoke("up", "down", "fall");
    assert_eq!(next, "jump");
    assert!(!machine.terminated());
}

#[test]
fn falling_over_terminates() {
    let mut machine = FiniteMachine::new();
    machine.add_state("down", StateOptions::new()).unwrap();
    machine
        .add_state("fell_over", StateOptions::new().terminal())
        .unwrap();
    machine.add_transition("down", "fell_over", "jump").unwrap();

    machine.initialize(Some("down")).unwrap();
    machine.process_event("jump").unwrap();

    assert_eq!(machine.current_state(), Some("fell_over"));
    assert!(machine.terminated());
    for event in ["jump", "fall", "anything"] {
        assert!(matches!(
            machine.process_event(event),
            Err(MachineError::InvalidState { .. })
        ));
    }
}

#[test]
fn copies_of_a_running_machine_start_fresh() {
    let mut machine = up_down();
    machine.initialize(Some("down")).unwrap();
    machine.process_event("jump").unwrap();

    let deep = machine.copy(CopyMode::Deep, false);
    let shallow = machine.copy(CopyMode::Shallow, false);
    assert!(deep.current_state().is_none());
    assert!(shallow.current_state().is_none());
    assert_eq!(machine.current_state(), Some("up"));
}

#[test]
fn shallow_copies_run_independently_over_shared_topology() {
    let mut template = up_down();
    template.freeze();

    let mut first = template.copy(CopyMode::Shallow, false);
    let mut second = template.copy(CopyMode::Shallow, false);
    first.initialize(Some("down")).unwrap();
    second.initialize(Some("up")).unwrap();

    first.process_event("jump").unwrap();
    second.process_event("fall").unwrap();

    assert_eq!(first.current_state(), Some("up"));
    assert_eq!(second.current_state(), Some("down"));
}

#[test]
fn hooks_follow_transitions_through_a_run() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let hook = |kind: &'static str| {
        let log = Rc::clone(&log);
        Hook::named(kind, move |state, event| {
            log.borrow_mut().push(format!("{kind} {state} {event}"));
        })
    };

    let mut machine = MachineBuilder::new()
        .state(
            StateDescriptor::new("idle")
                .next_state("start", "busy")
                .on_exit(hook("exit")),
        )
        .state(
            StateDescriptor::new("busy")
                .next_state("finish", "done")
                .on_enter(hook("enter")),
        )
        .state(StateDescriptor::new("done").terminal().on_enter(hook("enter")))
        .reaction("busy", "start", Reaction::emit("finish"))
        .initial("idle")
        .build()
        .unwrap();

    let history = FiniteRunner::new(&mut machine).run("start", true).unwrap();

    assert_eq!(history.get_path(), ["idle", "busy", "done"]);
    // The cursor in "busy" carries the exit hook captured by idle --start--> busy.
    assert_eq!(
        log.borrow().as_slice(),
        [
            "exit idle start",
            "enter busy start",
            "exit busy finish",
            "enter done finish"
        ]
    );
}

#[test]
fn three_level_hierarchy_initializes_in_cascade() {
    let mut n2 = HierarchicalMachine::new();
    n2.add_state("leaf", StateOptions::new()).unwrap();
    n2.set_default_start_state("leaf").unwrap();
    let n2 = n2.into_ref();

    let mut n = HierarchicalMachine::new();
    n.add_nested_state("branch", StateOptions::new(), n2.clone())
        .unwrap();
    n.set_default_start_state("branch").unwrap();
    let n = n.into_ref();

    let mut h = HierarchicalMachine::new();
    h.add_nested_state("root", StateOptions::new(), n.clone())
        .unwrap();
    h.initialize(Some("root")).unwrap();

    assert!(n.borrow().current_state().is_some());
    assert!(n2.borrow().current_state().is_some());
    assert_eq!(h.nested_machines().len(), 1);
    assert_eq!(n.borrow().nested_machines().len(), 1);
}

#[test]
fn hierarchical_runner_walks_down_and_back_up() {
    let mut door = HierarchicalMachine::new();
    door.add_state("closed", StateOptions::new()).unwrap();
    door.add_state("open", StateOptions::new()).unwrap();
    door.add_transition("closed", "open", "open_door").unwrap();
    door.add_reaction("open", "open_door", Reaction::emit("leave"))
        .unwrap();
    door.set_default_start_state("closed").unwrap();
    let door = door.into_ref();

    let mut house = HierarchicalMachine::new();
    house.add_state("outside", StateOptions::new()).unwrap();
    house
        .add_nested_state("hallway", StateOptions::new(), door.clone())
        .unwrap();
    house.add_state("garden", StateOptions::new()).unwrap();
    house
        .add_transition("outside", "hallway", "enter")
        .unwrap();
    house.add_transition("hallway", "garden", "leave").unwrap();
    house
        .add_reaction("hallway", "enter", Reaction::emit("open_door"))
        .unwrap();
    house.set_default_start_state("outside").unwrap();
    let house = house.into_ref();

    let runner = HierarchicalRunner::new(house.clone());
    let history = runner.run("enter", true).unwrap();

    assert_eq!(history.events(), ["enter", "open_door", "leave"]);
    let depths: Vec<_> = history.transitions().iter().map(|t| t.depth).collect();
    assert_eq!(depths, [0, 1, 0]);
    assert_eq!(house.borrow().current_state(), Some("garden"));
    assert!(door.borrow().current_state().is_none());
}

#[test]
fn json_spec_loads_into_running_machine() {
    let spec = MachineSpec::from_json(
        r#"{
            "states": [
                {"name": "down", "next_states": {"jump": "up"}},
                {"name": "up", "next_states": {"fall": "down", "trip": "fell_over"}},
                {"name": "fell_over", "is_terminal": true}
            ],
            "default_start_state": "down",
            "reactions": [
                {"state": "up", "event": "jump", "reaction": "choose", "args": ["trip"]}
            ]
        }"#,
    )
    .unwrap();
    let registry = HookRegistry::new().reaction("choose", |call| {
        call.args[0].as_str().unwrap_or("fall").to_string()
    });

    let mut machine = registry.load(&spec).unwrap();
    let history = FiniteRunner::new(&mut machine).run("jump", true).unwrap();

    assert_eq!(history.get_path(), ["down", "up", "fell_over"]);
    assert!(machine.terminated());
}

#[test]
fn transition_table_is_readable_for_rendering() {
    let enter = Hook::named("on_up", |_, _| {});
    let mut machine = FiniteMachine::new();
    machine.add_state("down", StateOptions::new()).unwrap();
    machine
        .add_state("up", StateOptions::new().on_enter(enter))
        .unwrap();
    machine.add_transition("down", "up", "jump").unwrap();

    let rows: Vec<_> = machine
        .jumps()
        .into_iter()
        .map(|(start, event, jump)| {
            (
                start,
                event,
                jump.target().to_string(),
                jump.on_enter().map(|h| h.label().to_string()),
            )
        })
        .collect();

    assert_eq!(
        rows,
        [(
            "down".to_string(),
            "jump".to_string(),
            "up".to_string(),
            Some("on_up".to_string())
        )]
    );
    assert_eq!(machine.is_terminal_state("up"), Some(false));
    assert_eq!(machine.is_terminal_state("sideways"), None);
}
