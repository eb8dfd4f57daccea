mod common;

use btree::{ActionStatus, BehaviourTree, CallData, Decorator, Node, RuntimeError, State};
use btree_core::{BbKey, MemoryBlackboard};
use common::{board, calls, entries, fixed, hook, scripted, tick};
use serde_json::json;

const ALLOWED: BbKey<bool> = BbKey::new("allowed");

fn guarded_board() -> MemoryBlackboard {
    let mut board = board();
    board.values_mut().set(ALLOWED, true);
    board.add_condition("allowed", |values| values.get(ALLOWED).copied().unwrap_or(false));
    board
}

fn set_allowed(board: &mut MemoryBlackboard, allowed: bool) {
    board.values_mut().set(ALLOWED, allowed);
}

fn logged(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[test]
fn hooks_fire_around_the_node_logic() {
    let mut board = board();
    for name in ["enter", "step", "leave"] {
        hook(&mut board, name);
    }
    scripted(&mut board, "work", vec![ActionStatus::Running, ActionStatus::Success]);

    let node = Node::action("work").with_decorators([
        Decorator::entry("enter"),
        Decorator::step("step"),
        Decorator::exit("leave"),
    ]);
    let mut tree = BehaviourTree::new(node);

    assert_eq!(tick(&mut tree, &mut board, 0), State::Running);
    assert_eq!(entries(&board), logged(&["enter", "step", "work"]));

    assert_eq!(tick(&mut tree, &mut board, 1), State::Succeeded);
    assert_eq!(
        entries(&board),
        logged(&["enter", "step", "work", "step", "work", "leave"])
    );

    // Finished nodes are not updated, so no hook fires again.
    tick(&mut tree, &mut board, 2);
    assert_eq!(entries(&board).len(), 6);
}

#[test]
fn entry_fires_again_after_reset() {
    let mut board = board();
    hook(&mut board, "enter");
    fixed(&mut board, "work", ActionStatus::Success);
    let mut tree = BehaviourTree::new(Node::action("work").with_decorator(Decorator::entry("enter")));

    tick(&mut tree, &mut board, 0);
    tree.reset();
    tick(&mut tree, &mut board, 1);
    assert_eq!(calls(&board, "enter"), 2);
}

#[test]
fn while_guard_fails_a_ready_node_without_running_it() {
    let mut board = guarded_board();
    set_allowed(&mut board, false);
    hook(&mut board, "enter");
    hook(&mut board, "leave");
    fixed(&mut board, "work", ActionStatus::Success);

    let node = Node::action("work").with_decorators([
        Decorator::guard_while("allowed"),
        Decorator::entry("enter"),
        Decorator::exit("leave"),
    ]);
    let mut tree = BehaviourTree::new(node);

    assert_eq!(tick(&mut tree, &mut board, 0), State::Failed);
    assert!(entries(&board).is_empty());
}

#[test]
fn while_guard_aborts_a_running_node_and_fires_exit() {
    let mut board = guarded_board();
    hook(&mut board, "leave");
    fixed(&mut board, "work", ActionStatus::Running);

    let node = Node::action("work").with_decorators([Decorator::guard_while("allowed"), Decorator::exit("leave")]);
    let mut tree = BehaviourTree::new(node);

    assert_eq!(tick(&mut tree, &mut board, 0), State::Running);
    set_allowed(&mut board, false);
    assert_eq!(tick(&mut tree, &mut board, 1), State::Failed);

    assert_eq!(calls(&board, "work"), 1);
    assert_eq!(calls(&board, "leave"), 1);
}

#[test]
fn until_guard_succeeds_once_condition_holds() {
    let mut board = guarded_board();
    set_allowed(&mut board, false);
    fixed(&mut board, "work", ActionStatus::Running);

    let mut tree = BehaviourTree::new(Node::action("work").with_decorator(Decorator::guard_until("allowed")));

    assert_eq!(tick(&mut tree, &mut board, 0), State::Running);
    assert_eq!(tick(&mut tree, &mut board, 1), State::Running);
    set_allowed(&mut board, true);
    assert_eq!(tick(&mut tree, &mut board, 2), State::Succeeded);
    assert_eq!(calls(&board, "work"), 2);
}

#[test]
fn guards_on_a_composite_stop_its_children() {
    let mut board = guarded_board();
    fixed(&mut board, "patrol", ActionStatus::Running);

    let node = Node::sequence(vec![Node::action("patrol")]).with_decorator(Decorator::guard_while("allowed"));
    let mut tree = BehaviourTree::new(node);

    assert_eq!(tick(&mut tree, &mut board, 0), State::Running);
    set_allowed(&mut board, false);
    assert_eq!(tick(&mut tree, &mut board, 1), State::Failed);
    assert_eq!(tick(&mut tree, &mut board, 2), State::Failed);
    assert_eq!(calls(&board, "patrol"), 1);
}

#[test]
fn first_forcing_guard_wins() {
    let mut board = guarded_board();
    board.add_condition("done", |_| true);
    fixed(&mut board, "work", ActionStatus::Running);

    let node = Node::action("work").with_decorators([Decorator::guard_until("done"), Decorator::guard_while("missing")]);
    let mut tree = BehaviourTree::new(node);
    assert_eq!(tick(&mut tree, &mut board, 0), State::Succeeded);
}

#[test]
fn missing_guard_condition_is_an_error() {
    let mut board = board();
    fixed(&mut board, "work", ActionStatus::Success);
    let mut tree = BehaviourTree::new(Node::action("work").with_decorator(Decorator::guard_while("nope")));

    let err = tree.tick(&mut board, 0).unwrap_err();
    assert_eq!(err, RuntimeError::ConditionNotFound { name: "nope".into() });
    assert_eq!(calls(&board, "work"), 0);
}

#[test]
fn missing_hook_operation_is_an_error() {
    let mut board = board();
    fixed(&mut board, "work", ActionStatus::Success);
    let mut tree = BehaviourTree::new(Node::action("work").with_decorator(Decorator::exit("cleanup")));

    let err = tree.tick(&mut board, 0).unwrap_err();
    assert_eq!(err, RuntimeError::OperationNotFound { name: "cleanup".into() });
}

#[test]
fn entry_fires_once_when_a_failed_tick_resumes() {
    let mut board = board();
    hook(&mut board, "enter");
    fixed(&mut board, "first", ActionStatus::Success);
    let node = Node::sequence(vec![Node::action("first"), Node::action("second")])
        .with_decorator(Decorator::entry("enter"));
    let mut tree = BehaviourTree::new(node);

    let err = tree.tick(&mut board, 0).unwrap_err();
    assert_eq!(err, RuntimeError::OperationNotFound { name: "second".into() });

    fixed(&mut board, "second", ActionStatus::Success);
    assert_eq!(tick(&mut tree, &mut board, 1), State::Succeeded);
    assert_eq!(calls(&board, "enter"), 1);
    assert_eq!(calls(&board, "first"), 1);
    assert_eq!(calls(&board, "second"), 1);
}

#[test]
fn failing_exit_hook_keeps_the_finished_result() {
    let mut board = board();
    fixed(&mut board, "work", ActionStatus::Success);
    let mut tree = BehaviourTree::new(Node::action("work").with_decorator(Decorator::exit("leave")));

    let err = tree.tick(&mut board, 0).unwrap_err();
    assert_eq!(err, RuntimeError::OperationNotFound { name: "leave".into() });
    assert_eq!(tree.state(), State::Succeeded);

    hook(&mut board, "leave");
    assert_eq!(tick(&mut tree, &mut board, 1), State::Succeeded);
    assert_eq!(calls(&board, "work"), 1);
}

#[test]
fn guard_abort_after_a_failed_tick_still_fires_exit() {
    let mut board = guarded_board();
    for name in ["enter", "leave"] {
        hook(&mut board, name);
    }
    let node = Node::sequence(vec![Node::action("missing")]).with_decorators([
        Decorator::guard_while("allowed"),
        Decorator::entry("enter"),
        Decorator::exit("leave"),
    ]);
    let mut tree = BehaviourTree::new(node);

    assert!(tree.tick(&mut board, 0).is_err());
    assert_eq!(tree.state(), State::Ready);

    set_allowed(&mut board, false);
    assert_eq!(tick(&mut tree, &mut board, 1), State::Failed);
    assert_eq!(entries(&board), logged(&["enter", "leave"]));
}

#[test]
fn hook_return_values_are_ignored() {
    let mut board = board();
    fixed(&mut board, "grumpy", ActionStatus::Failure);
    fixed(&mut board, "work", ActionStatus::Success);
    let mut tree = BehaviourTree::new(Node::action("work").with_decorator(Decorator::entry("grumpy")));

    assert_eq!(tick(&mut tree, &mut board, 0), State::Succeeded);
}

#[test]
fn hook_data_is_passed_to_the_operation() {
    let mut board = board();
    board.add_operation("announce", |values, data| {
        if let Some(message) = data.get("message").and_then(|m| m.as_str()) {
            common::log(values, message);
        }
        ActionStatus::Success
    });
    fixed(&mut board, "work", ActionStatus::Success);

    let mut data = CallData::new();
    data.insert("message".to_string(), json!("starting"));
    let node = Node::action("work").with_decorator(Decorator::entry("announce").with_data(data));
    let mut tree = BehaviourTree::new(node);

    tick(&mut tree, &mut board, 0);
    assert_eq!(entries(&board), logged(&["starting", "work"]));
}
