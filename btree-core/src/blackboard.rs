use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use crate::ActionStatus;

/// Static data attached to an action or hook in a tree definition.
pub type CallData = serde_json::Map<String, serde_json::Value>;

/// The capability a tree is ticked against.
///
/// Every side effect and every decision predicate is a named lookup. The
/// engine checks `has_operation` / `has_condition` before calling, and
/// treats a missing name as a runtime error.
pub trait Blackboard {
    fn has_operation(&self, name: &str) -> bool;

    fn call_operation(&mut self, name: &str, data: &CallData) -> ActionStatus;

    fn has_condition(&self, name: &str) -> bool;

    fn evaluate_condition(&mut self, name: &str) -> bool;
}

impl<B: Blackboard + ?Sized> Blackboard for &mut B {
    fn has_operation(&self, name: &str) -> bool {
        (**self).has_operation(name)
    }

    fn call_operation(&mut self, name: &str, data: &CallData) -> ActionStatus {
        (**self).call_operation(name, data)
    }

    fn has_condition(&self, name: &str) -> bool {
        (**self).has_condition(name)
    }

    fn evaluate_condition(&mut self, name: &str) -> bool {
        (**self).evaluate_condition(name)
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BbKey<T: 'static> {
    name: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: 'static> Copy for BbKey<T> {}

impl<T: 'static> Clone for BbKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> BbKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _phantom: PhantomData,
        }
    }

    pub fn name(self) -> &'static str {
        self.name
    }
}

/// Typed named values shared by blackboard operations.
///
/// # Panics
///
/// Reading a key with a different type than the one stored under its name
/// panics: that is a programming error, not a runtime condition.
#[derive(Default)]
pub struct Values {
    values: BTreeMap<&'static str, Box<dyn Any>>,
}

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn contains<T: 'static>(&self, key: BbKey<T>) -> bool {
        self.values.contains_key(key.name)
    }

    pub fn set<T: 'static>(&mut self, key: BbKey<T>, value: T) {
        self.values.insert(key.name, Box::new(value));
    }

    pub fn get<T: 'static>(&self, key: BbKey<T>) -> Option<&T> {
        let value = self.values.get(key.name)?;
        value.downcast_ref::<T>().or_else(|| {
            panic!(
                "blackboard type mismatch for key '{}' (stored type differs from requested)",
                key.name
            )
        })
    }

    pub fn get_mut<T: 'static>(&mut self, key: BbKey<T>) -> Option<&mut T> {
        let value = self.values.get_mut(key.name)?;
        value.downcast_mut::<T>().or_else(|| {
            panic!(
                "blackboard type mismatch for key '{}' (stored type differs from requested)",
                key.name
            )
        })
    }
}

impl fmt::Debug for Values {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

type OperationFn = Box<dyn FnMut(&mut Values, &CallData) -> ActionStatus>;
type ConditionFn = Box<dyn FnMut(&Values) -> bool>;

/// In-memory blackboard: named closures over a typed value store.
#[derive(Default)]
pub struct MemoryBlackboard {
    values: Values,
    operations: BTreeMap<String, OperationFn>,
    conditions: BTreeMap<String, ConditionFn>,
}

impl MemoryBlackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operation(
        mut self,
        name: impl Into<String>,
        operation: impl FnMut(&mut Values, &CallData) -> ActionStatus + 'static,
    ) -> Self {
        self.add_operation(name, operation);
        self
    }

    pub fn with_condition(
        mut self,
        name: impl Into<String>,
        condition: impl FnMut(&Values) -> bool + 'static,
    ) -> Self {
        self.add_condition(name, condition);
        self
    }

    pub fn add_operation(
        &mut self,
        name: impl Into<String>,
        operation: impl FnMut(&mut Values, &CallData) -> ActionStatus + 'static,
    ) {
        self.operations.insert(name.into(), Box::new(operation));
    }

    pub fn add_condition(
        &mut self,
        name: impl Into<String>,
        condition: impl FnMut(&Values) -> bool + 'static,
    ) {
        self.conditions.insert(name.into(), Box::new(condition));
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut Values {
        &mut self.values
    }
}

impl Blackboard for MemoryBlackboard {
    fn has_operation(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    fn call_operation(&mut self, name: &str, data: &CallData) -> ActionStatus {
        match self.operations.get_mut(name) {
            Some(operation) => operation(&mut self.values, data),
            None => ActionStatus::Failure,
        }
    }

    fn has_condition(&self, name: &str) -> bool {
        self.conditions.contains_key(name)
    }

    fn evaluate_condition(&mut self, name: &str) -> bool {
        match self.conditions.get_mut(name) {
            Some(condition) => condition(&self.values),
            None => false,
        }
    }
}

impl fmt::Debug for MemoryBlackboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryBlackboard")
            .field("values", &self.values)
            .field("operations", &self.operations.keys().collect::<Vec<_>>())
            .field("conditions", &self.conditions.keys().collect::<Vec<_>>())
            .finish()
    }
}
