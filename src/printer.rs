use crate::types::{Procedure, Value};
use itertools::Itertools;
use std::fmt;

pub fn pr_str(object: &Value) -> String {
    match object {
        Value::List(elements) => format!("({})", elements.iter().map(pr_str).join(" ")),
        Value::Map(map) => format!(
            "({})",
            map.iter()
                .map(|(key, value)| format!("{}:{}", key, pr_str(value)))
                .join(" ")
        ),
        Value::Integer(value) => value.to_string(),
        Value::Float(value) => float_repr(*value),
        Value::Symbol(name) => name.clone(),
        Value::Bool(true) => String::from("T"),
        Value::Bool(false) | Value::Nil => String::from("NIL"),
        Value::Procedure(Procedure::Native(f)) => format!("#<builtin {}>", f.name),
        Value::Procedure(Procedure::UserDefined(lambda)) => lambda.to_string(),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", pr_str(self))
    }
}

/// Floats always show that they are floats: `2.0`, not `2`. Very large and
/// very small magnitudes switch to exponent form (`1e+16`, `1e-05`).
pub(crate) fn float_repr(x: f64) -> String {
    if x.is_nan() {
        return String::from("nan");
    }
    if x.is_infinite() {
        return String::from(if x > 0.0 { "inf" } else { "-inf" });
    }
    let scientific = format!("{:e}", x);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some(parts) => parts,
        None => return scientific,
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if x == 0.0 || (-4..16).contains(&exponent) {
        let plain = x.to_string();
        if plain.contains('.') {
            plain
        } else {
            format!("{}.0", plain)
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}
