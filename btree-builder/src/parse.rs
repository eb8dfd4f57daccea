//! Mapping from definition items to AST descriptors.

use btree::{Decorator, DecoratorKind};
use serde_json::{Map, Value};

use crate::definition::{DefinitionItem, HookDefinition};
use crate::{AstKind, AstNode, BuildError};

const ACTION_PREFIX: &str = "$$.Actions.";

const TREE_NAME: &str = "$data.treeName";
const BRANCH_NAME: &str = "$data.branchName";
const TICKETS: &str = "$data.tickets";
const DURATION: &str = "$data.duration";
const LONGEST_DURATION: &str = "$data.longestDuration";
const TIMES: &str = "$data.times";
const MAXIMUM_ITERATIONS: &str = "$data.maximumIterations";

/// Parse one item and, recursively, its children.
pub fn parse_item(item: &DefinitionItem) -> Result<AstNode, BuildError> {
    let kind = parse_kind(item)?;
    let children = item
        .children()
        .iter()
        .map(parse_item)
        .collect::<Result<Vec<_>, _>>()?;
    let decorators = item
        .hooks
        .iter()
        .map(parse_hook)
        .collect::<Result<Vec<_>, _>>()?;

    tracing::trace!(
        kind = kind.type_name(),
        children = children.len(),
        hooks = decorators.len(),
        "parsed definition item"
    );

    Ok(AstNode::new(kind)
        .with_children(children)
        .with_decorators(decorators)
        .with_collapsed(item.collapsed))
}

fn parse_kind(item: &DefinitionItem) -> Result<AstKind, BuildError> {
    let props = &item.properties;
    let kind = match item.kind.as_str() {
        "$$.Root" => AstKind::Root {
            name: optional_string(props, "root", TREE_NAME)?,
        },
        "$$.Branch" => AstKind::Branch {
            name: optional_string(props, "branch", BRANCH_NAME)?.unwrap_or_default(),
        },
        "$$.Sequence" => AstKind::Sequence,
        "$$.Selector" => AstKind::Selector,
        "$$.Parallel" => AstKind::Parallel,
        "$$.Flip" => AstKind::Flip,
        "$$.Lotto" => AstKind::Lotto {
            tickets: tickets(props)?,
        },
        "$$.Repeat" => AstKind::Repeat {
            iterations: optional_integer(props, "repeat", TIMES)?,
            maximum_iterations: optional_integer(props, "repeat", MAXIMUM_ITERATIONS)?,
        },
        "$$.Wait" => AstKind::Wait {
            duration: optional_integer(props, "wait", DURATION)?.ok_or_else(|| BuildError::InvalidProperty {
                node: "wait",
                property: DURATION,
                reason: "a duration is required".to_string(),
            })?,
            longest_duration: optional_integer(props, "wait", LONGEST_DURATION)?,
        },
        "$$.Condition" => match item.condition.as_ref().map(|c| function_name(&c.name)) {
            Some(function) if !function.is_empty() => AstKind::Condition {
                function: function.to_string(),
            },
            _ => {
                return Err(BuildError::InvalidProperty {
                    node: "condition",
                    property: "condition",
                    reason: "a condition function name is required".to_string(),
                })
            }
        },
        other => match other.strip_prefix(ACTION_PREFIX) {
            Some(function) if !function.is_empty() => AstKind::Action {
                function: function.to_string(),
                data: props.clone(),
            },
            _ => return Err(BuildError::UnknownNodeType(other.to_string())),
        },
    };
    Ok(kind)
}

fn parse_hook(hook: &HookDefinition) -> Result<Decorator, BuildError> {
    let kind = match hook.kind.as_str() {
        "$$.Hooks.While" => DecoratorKind::While,
        "$$.Hooks.Until" => DecoratorKind::Until,
        "$$.Hooks.Entry" => DecoratorKind::Entry,
        "$$.Hooks.Step" => DecoratorKind::Step,
        "$$.Hooks.Exit" => DecoratorKind::Exit,
        other => return Err(BuildError::UnknownHookType(other.to_string())),
    };

    let (property, function) = if kind.is_guard() {
        ("condition", hook.condition.as_ref())
    } else {
        ("action", hook.action.as_ref())
    };
    let function = function
        .filter(|f| !function_name(&f.name).is_empty())
        .ok_or_else(|| BuildError::InvalidProperty {
            node: "hook",
            property,
            reason: format!("a {} hook needs a function name", kind.as_str()),
        })?;

    Ok(Decorator::new(kind, function_name(&function.name)).with_data(function.data.clone()))
}

/// Blackboard function names may be written with or without the action prefix.
fn function_name(name: &str) -> &str {
    name.strip_prefix(ACTION_PREFIX).unwrap_or(name)
}

fn optional_string(
    props: &Map<String, Value>,
    node: &'static str,
    property: &'static str,
) -> Result<Option<String>, BuildError> {
    match props.get(property) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(BuildError::InvalidProperty {
            node,
            property,
            reason: format!("expected a string, found {other}"),
        }),
    }
}

/// Integers may be written as numbers or as numeric strings; an empty
/// string counts as unset.
fn optional_integer(
    props: &Map<String, Value>,
    node: &'static str,
    property: &'static str,
) -> Result<Option<i64>, BuildError> {
    match props.get(property) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(value) => integer(value).map(Some).ok_or_else(|| BuildError::InvalidProperty {
            node,
            property,
            reason: format!("expected an integer, found {value}"),
        }),
    }
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Tickets as an array, a comma-separated string, or a single number.
fn tickets(props: &Map<String, Value>) -> Result<Vec<i64>, BuildError> {
    let invalid = |value: &Value| BuildError::InvalidProperty {
        node: "lotto",
        property: TICKETS,
        reason: format!("expected ticket counts, found {value}"),
    };

    let Some(value) = props.get(TICKETS) else {
        return Ok(Vec::new());
    };
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items.iter().map(|v| integer(v).ok_or_else(|| invalid(v))).collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.parse().map_err(|_| invalid(value)))
            .collect(),
        Value::Number(_) => integer(value).map(|t| vec![t]).ok_or_else(|| invalid(value)),
        other => Err(invalid(other)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn props(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn tickets_accept_every_written_form() {
        assert_eq!(tickets(&props(json!({ TICKETS: [1, 2, "3"] }))).unwrap(), vec![1, 2, 3]);
        assert_eq!(tickets(&props(json!({ TICKETS: "4, 5,,6" }))).unwrap(), vec![4, 5, 6]);
        assert_eq!(tickets(&props(json!({ TICKETS: 7 }))).unwrap(), vec![7]);
        assert_eq!(tickets(&props(json!({}))).unwrap(), Vec::<i64>::new());
        assert!(tickets(&props(json!({ TICKETS: "a,b" }))).is_err());
        assert!(tickets(&props(json!({ TICKETS: true }))).is_err());
    }

    #[test]
    fn integers_accept_numeric_strings() {
        let map = props(json!({ DURATION: "250", TIMES: 3.0, MAXIMUM_ITERATIONS: "" }));
        assert_eq!(optional_integer(&map, "wait", DURATION).unwrap(), Some(250));
        assert_eq!(optional_integer(&map, "repeat", TIMES).unwrap(), Some(3));
        assert_eq!(optional_integer(&map, "repeat", MAXIMUM_ITERATIONS).unwrap(), None);

        let bad = props(json!({ DURATION: "soon" }));
        assert!(matches!(
            optional_integer(&bad, "wait", DURATION),
            Err(BuildError::InvalidProperty { property: DURATION, .. })
        ));
    }

    #[test]
    fn hook_functions_drop_the_action_prefix() {
        let hook: HookDefinition = serde_json::from_value(json!({
            "$type": "$$.Hooks.Entry",
            "action": { "$type": "$$.Actions.announce", "volume": 3 }
        }))
        .unwrap();
        let decorator = parse_hook(&hook).unwrap();
        assert_eq!(decorator.kind(), DecoratorKind::Entry);
        assert_eq!(decorator.function(), "announce");
        assert_eq!(decorator.data().get("volume"), Some(&json!(3)));
    }

    #[test]
    fn condition_and_guard_names_agree_on_the_prefix() {
        let item: DefinitionItem = serde_json::from_value(json!({
            "$type": "$$.Condition",
            "condition": { "$type": "$$.Actions.isReady" },
            "hooks": [{ "$type": "$$.Hooks.While", "condition": { "$type": "$$.Actions.isReady" } }]
        }))
        .unwrap();
        let node = parse_item(&item).unwrap();
        assert_eq!(node.kind, AstKind::Condition { function: "isReady".to_string() });
        assert_eq!(node.decorators[0].function(), "isReady");

        let bare: DefinitionItem = serde_json::from_value(json!({
            "$type": "$$.Condition",
            "condition": { "$type": "$$.Actions." }
        }))
        .unwrap();
        assert!(matches!(
            parse_item(&bare),
            Err(BuildError::InvalidProperty { property: "condition", .. })
        ));
    }

    #[test]
    fn guard_without_condition_is_invalid() {
        let hook: HookDefinition = serde_json::from_value(json!({ "$type": "$$.Hooks.While" })).unwrap();
        assert!(matches!(
            parse_hook(&hook),
            Err(BuildError::InvalidProperty { property: "condition", .. })
        ));
    }
}
