//! Runner configuration, loaded from YAML.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use btree::TreeOptions;
use btree_core::{ActionStatus, MemoryBlackboard};
use serde::{Deserialize, Serialize};

/// How to drive a tree from the command line: clock, seed, and the scripted
/// answers of every blackboard function the tree calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Maximum number of ticks before giving up
    #[serde(default = "default_ticks")]
    pub ticks: u64,

    /// Simulated milliseconds between ticks
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Seed for lotto draws and randomized waits
    pub seed: u64,

    /// Reset the tree after it finishes instead of stopping
    pub restart_on_completion: bool,

    /// Fixed answer of each named condition
    pub conditions: BTreeMap<String, bool>,

    /// Statuses returned by each named operation on successive calls; the
    /// last one repeats
    pub operations: BTreeMap<String, Vec<ActionStatus>>,
}

fn default_ticks() -> u64 {
    100
}

fn default_tick_interval_ms() -> u64 {
    100
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            ticks: default_ticks(),
            tick_interval_ms: default_tick_interval_ms(),
            seed: 0,
            restart_on_completion: false,
            conditions: BTreeMap::new(),
            operations: BTreeMap::new(),
        }
    }
}

impl RunnerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read runner config from {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse runner config from {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn tree_options(&self) -> TreeOptions {
        TreeOptions {
            seed: self.seed,
            restart_on_completion: self.restart_on_completion,
        }
    }

    /// A blackboard answering every configured condition and operation.
    pub fn blackboard(&self) -> MemoryBlackboard {
        let mut board = MemoryBlackboard::new();

        for (name, value) in &self.conditions {
            let value = *value;
            board.add_condition(name.clone(), move |_| value);
        }

        for (name, script) in &self.operations {
            let script = script.clone();
            let mut calls = 0usize;
            board.add_operation(name.clone(), move |_, _| {
                let status = script
                    .get(calls)
                    .or_else(|| script.last())
                    .copied()
                    .unwrap_or(ActionStatus::Success);
                calls = calls.saturating_add(1);
                status
            });
        }

        board
    }
}

#[cfg(test)]
mod tests {
    use btree::{Blackboard, CallData};

    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = RunnerConfig::from_yaml("").unwrap();
        assert_eq!(config, RunnerConfig::default());
        assert_eq!(config.ticks, 100);
        assert_eq!(config.tick_interval_ms, 100);
    }

    #[test]
    fn partial_config_keeps_remaining_defaults() {
        let config = RunnerConfig::from_yaml(
            r#"
seed: 42
conditions:
  isReady: true
operations:
  doWork: [running, success]
"#,
        )
        .unwrap();

        assert_eq!(config.seed, 42);
        assert_eq!(config.ticks, 100);
        assert!(!config.restart_on_completion);
        assert_eq!(config.conditions.get("isReady"), Some(&true));
        assert_eq!(
            config.operations.get("doWork"),
            Some(&vec![ActionStatus::Running, ActionStatus::Success])
        );
        assert_eq!(config.tree_options().seed, 42);
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(RunnerConfig::from_yaml("operations:\n  doWork: [maybe]\n").is_err());
    }

    #[test]
    fn scripted_operations_repeat_their_last_status() {
        let mut config = RunnerConfig::default();
        config
            .operations
            .insert("walk".into(), vec![ActionStatus::Running, ActionStatus::Failure]);
        config.conditions.insert("tired".into(), false);

        let mut board = config.blackboard();
        let data = CallData::new();
        assert_eq!(board.call_operation("walk", &data), ActionStatus::Running);
        assert_eq!(board.call_operation("walk", &data), ActionStatus::Failure);
        assert_eq!(board.call_operation("walk", &data), ActionStatus::Failure);
        assert!(board.has_condition("tired"));
        assert!(!board.evaluate_condition("tired"));
        assert!(!board.has_operation("run"));
    }
}
