//! Loading definitions and driving a tree on a simulated clock.

use std::path::Path;

use anyhow::{Context, Result};
use btree::{BehaviourTree, State};
use btree_builder::Definition;
use btree_core::MemoryBlackboard;
use btree_tools::{TraceEvent, TraceSink};

use crate::config::RunnerConfig;

/// Read a definition, as YAML when the file says so and JSON otherwise.
pub fn load_definition(path: &Path) -> Result<Definition> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read tree definition from {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse tree definition from {}", path.display()))
    } else {
        Definition::from_json(&content)
            .with_context(|| format!("Failed to parse tree definition from {}", path.display()))
    }
}

/// Forwards node transitions to the log.
#[derive(Debug, Default)]
pub struct LoggingSink;

impl TraceSink for LoggingSink {
    fn emit(&mut self, event: TraceEvent) {
        tracing::info!(
            tick = event.tick,
            node = event.node,
            from = %event.from,
            to = %event.to,
            "{}",
            event.tag()
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub ticks: u64,
    pub elapsed_ms: u64,
    pub state: State,
}

/// Tick until the tree finishes or the tick limit is reached. With
/// `restart_on_completion` the tree never finishes, so the whole limit runs.
pub fn run(tree: &mut BehaviourTree, board: &mut MemoryBlackboard, config: &RunnerConfig) -> Result<RunReport> {
    let mut report = RunReport {
        ticks: 0,
        elapsed_ms: 0,
        state: tree.state(),
    };

    while report.ticks < config.ticks {
        let now = report.ticks.saturating_mul(config.tick_interval_ms);
        report.state = tree
            .tick(board, now)
            .with_context(|| format!("Tick {} failed", report.ticks))?;
        report.ticks += 1;
        report.elapsed_ms = now;

        if report.state.is_terminal() && !config.restart_on_completion {
            break;
        }
    }

    tracing::debug!(ticks = report.ticks, state = %report.state, "run finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use btree_builder::TreeBuilder;
    use btree_core::ActionStatus;

    use super::*;

    const WAIT_THEN_WORK: &str = r#"[{
        "$type": "$$.Root",
        "children": {
            "$type": "$$.Sequence",
            "children": [
                { "$type": "$$.Wait", "$data.duration": 250 },
                { "$type": "$$.Actions.doWork" }
            ]
        }
    }]"#;

    fn tree(config: &RunnerConfig) -> BehaviourTree {
        TreeBuilder::new()
            .with_options(config.tree_options())
            .build_json(WAIT_THEN_WORK)
            .unwrap()
    }

    #[test]
    fn run_stops_when_the_tree_finishes() {
        let mut config = RunnerConfig::default();
        config.operations.insert("doWork".into(), vec![ActionStatus::Success]);

        let mut tree = tree(&config);
        let mut board = config.blackboard();
        let report = run(&mut tree, &mut board, &config).unwrap();

        assert_eq!(report.state, State::Succeeded);
        assert_eq!(report.ticks, 4);
        assert_eq!(report.elapsed_ms, 300);
    }

    #[test]
    fn run_gives_up_at_the_tick_limit() {
        let mut config = RunnerConfig {
            ticks: 2,
            ..RunnerConfig::default()
        };
        config.operations.insert("doWork".into(), vec![ActionStatus::Success]);

        let mut tree = tree(&config);
        let mut board = config.blackboard();
        let report = run(&mut tree, &mut board, &config).unwrap();

        assert_eq!(report.state, State::Running);
        assert_eq!(report.ticks, 2);
    }

    #[test]
    fn missing_operation_aborts_the_run() {
        let config = RunnerConfig::default();
        let mut tree = tree(&config);
        let mut board = config.blackboard();

        let err = run(&mut tree, &mut board, &config).unwrap_err();
        assert!(format!("{err:#}").contains("doWork"));
    }

    #[test]
    fn yaml_definitions_load_by_extension() {
        let dir = std::env::temp_dir().join(format!("btree-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tree.yaml");
        std::fs::write(
            &path,
            r#"
- $type: "$$.Root"
  children:
    $type: "$$.Lotto"
    $data.tickets: "1,3"
    children:
      - $type: "$$.Actions.left"
      - $type: "$$.Actions.right"
"#,
        )
        .unwrap();

        let definition = load_definition(&path).unwrap();
        let tree = TreeBuilder::new().build(&definition).unwrap();
        assert_eq!(tree.root().children()[0].name(), "LOTTO [1,3]");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
