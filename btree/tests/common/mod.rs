#![allow(dead_code)]

use btree::{ActionStatus, BehaviourTree, State};
use btree_core::{BbKey, MemoryBlackboard, Values};

pub const LOG: BbKey<Vec<String>> = BbKey::new("log");

pub fn board() -> MemoryBlackboard {
    let mut board = MemoryBlackboard::new();
    board.values_mut().set(LOG, Vec::new());
    board
}

pub fn log(values: &mut Values, entry: &str) {
    if let Some(log) = values.get_mut(LOG) {
        log.push(entry.to_string());
    }
}

/// Register an operation that logs its name and always returns `status`.
pub fn fixed(board: &mut MemoryBlackboard, name: impl Into<String>, status: ActionStatus) {
    let name = name.into();
    let entry = name.clone();
    board.add_operation(name, move |values, _| {
        log(values, &entry);
        status
    });
}

/// Register an operation that logs its name and returns `script` entries on
/// successive calls, repeating the last one.
pub fn scripted(board: &mut MemoryBlackboard, name: impl Into<String>, script: Vec<ActionStatus>) {
    let name = name.into();
    let entry = name.clone();
    let mut calls = 0usize;
    board.add_operation(name, move |values, _| {
        log(values, &entry);
        let status = script
            .get(calls)
            .or_else(|| script.last())
            .copied()
            .unwrap_or(ActionStatus::Failure);
        calls += 1;
        status
    });
}

/// Register a hook operation that only logs.
pub fn hook(board: &mut MemoryBlackboard, name: impl Into<String>) {
    fixed(board, name, ActionStatus::Success);
}

pub fn entries(board: &MemoryBlackboard) -> Vec<String> {
    board.values().get(LOG).cloned().unwrap_or_default()
}

pub fn calls(board: &MemoryBlackboard, name: &str) -> usize {
    entries(board).iter().filter(|e| e.as_str() == name).count()
}

pub fn clear(board: &mut MemoryBlackboard) {
    if let Some(log) = board.values_mut().get_mut(LOG) {
        log.clear();
    }
}

pub fn tick(tree: &mut BehaviourTree, board: &mut MemoryBlackboard, now_ms: u64) -> State {
    tree.tick(board, now_ms).expect("tick failed")
}
