//! Named host callbacks, reachable from scripts through `(host NAME args...)`.
//!
//! This is the only way a script can reach outside the interpreter. The table
//! is closed: a script can call what the embedding program registered and
//! nothing else.

use crate::environment::Environment;
use crate::evaluator;
use crate::types::{Arity, Int, Value};
use std::collections::HashMap;
use std::time::SystemTime;

pub type HostFn = fn(&[Value], &Environment) -> evaluator::Result;

struct Capability {
    arity: Arity,
    fn_ptr: HostFn,
}

pub struct HostCapabilities {
    table: HashMap<String, Capability>,
}

impl HostCapabilities {
    /// A table with nothing registered.
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Register `fn_ptr` under `name`, taking exactly `arg_count` arguments.
    /// Replaces any existing registration with the same name.
    pub fn register(&mut self, name: &str, arg_count: usize, fn_ptr: HostFn) {
        self.insert(name, Arity::exactly(arg_count), fn_ptr);
    }

    /// Like [`register`](Self::register), for callbacks taking any number of
    /// arguments from `min_args` upwards.
    pub fn register_variadic(&mut self, name: &str, min_args: usize, fn_ptr: HostFn) {
        self.insert(name, Arity::at_least(min_args), fn_ptr);
    }

    fn insert(&mut self, name: &str, arity: Arity, fn_ptr: HostFn) {
        log::debug!("register host capability {} taking {} arguments", name, arity);
        self.table.insert(name.into(), Capability { arity, fn_ptr });
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.table.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn call(&self, name: &str, args: &[Value], env: &Environment) -> evaluator::Result {
        let capability = self
            .table
            .get(name)
            .ok_or_else(|| evaluator::Error::UnknownCapability(name.into()))?;
        capability.arity.validate_for(args.len(), name)?;
        log::trace!("host capability {} called with {} args", name, args.len());
        (capability.fn_ptr)(args, env)
    }
}

impl Default for HostCapabilities {
    fn default() -> Self {
        let mut table = Self::empty();
        table.register("time-ms", 0, time_ms_);
        table.register("getenv", 1, getenv_);
        table.register("bindings", 0, bindings_);
        table
    }
}

fn time_ms_(_args: &[Value], _env: &Environment) -> evaluator::Result {
    let millis = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|duration| duration.as_millis())
        .unwrap_or(0);
    Ok(Value::Integer(millis as Int))
}

fn getenv_(args: &[Value], _env: &Environment) -> evaluator::Result {
    let name = args[0].as_key()?;
    Ok(std::env::var(name)
        .map(Value::Symbol)
        .unwrap_or(Value::Nil))
}

fn bindings_(_args: &[Value], env: &Environment) -> evaluator::Result {
    let mut names: Vec<&str> = env.names().collect();
    names.sort_unstable();
    Ok(Value::wrap_list(
        names.into_iter().map(Value::new_symbol).collect(),
    ))
}
