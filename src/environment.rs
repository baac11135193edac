use crate::core;
use crate::types::{Procedure, Value, ZERO_VALUE};
use std::collections::HashMap;

/// The single name table of a session. Variables, functions and the
/// parameters of user-defined procedures all live here side by side.
#[derive(Debug)]
pub struct Environment {
    bindings: HashMap<String, Value>,
}

impl Environment {
    pub fn define<T>(&mut self, key: T, value: Value) -> Option<Value>
    where
        T: Into<String>,
    {
        self.bindings.insert(key.into(), value)
    }

    /// Never fails: unbound names evaluate to the zero value.
    pub fn lookup(&self, key: &str) -> Value {
        self.bindings.get(key).cloned().unwrap_or(ZERO_VALUE)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.bindings.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.bindings.contains_key(key)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// Throw away everything but the built-ins.
    pub fn reset(&mut self) {
        log::trace!("reset environment ({} bindings)", self.bindings.len());
        *self = Self::default();
    }
}

impl Default for Environment {
    fn default() -> Self {
        let mut env = Self {
            bindings: HashMap::new(),
        };
        for (&name, &func) in core::CORE.iter() {
            env.define(name, Value::Procedure(Procedure::Native(func)));
        }
        env.define("t", Value::Bool(true));
        env.define("nil", Value::Bool(false));
        env
    }
}
