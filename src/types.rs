use crate::evaluator;
use crate::interpreter::Session;
use crate::reader::{Ast, Atom};
use derive_more::{Deref, DerefMut};
use itertools::Itertools;
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Formatter;
use std::ops::{RangeFrom, RangeInclusive};
use std::rc::Rc;

pub type Int = i64;

#[derive(Deref, DerefMut, Debug, Clone, Default)]
pub struct ValueList(pub Vec<Value>);

// Keys are kept sorted so that maps print the same way every time.
#[derive(Deref, DerefMut, Debug, Clone, Default)]
pub struct ValueMap(pub BTreeMap<String, Value>);

#[derive(Debug, Clone)]
pub enum Arity {
    Between(RangeInclusive<usize>),
    AtLeast(RangeFrom<usize>),
}

#[derive(Debug)]
pub struct BadArgCount {
    name: String,
    expected: Arity,
    got: usize,
}

impl fmt::Display for BadArgCount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "When evaluating {} expected {} arguments, but received {} arguments",
            self.name, self.expected, self.got
        )
    }
}

impl Arity {
    pub(crate) const fn exactly(n: usize) -> Self {
        Self::Between(n..=n)
    }

    pub(crate) const fn at_least(n: usize) -> Self {
        Self::AtLeast(n..)
    }

    pub(crate) fn contains(&self, n: usize) -> bool {
        match self {
            Self::Between(range) => range.contains(&n),
            Self::AtLeast(range) => range.contains(&n),
        }
    }

    pub(crate) fn validate_for(&self, n: usize, name: &str) -> Result<(), BadArgCount> {
        match self.contains(n) {
            true => Ok(()),
            false => Err(BadArgCount {
                name: name.into(),
                expected: self.clone(),
                got: n,
            }),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Between(r) => {
                if r.start() == r.end() {
                    write!(f, "exactly {}", r.start())
                } else {
                    write!(f, "from {} to {}", r.start(), r.end())
                }
            }
            Arity::AtLeast(r) => write!(f, "at least {}", r.start),
        }
    }
}

pub struct PrimitiveFn {
    pub name: &'static str,
    pub arity: Arity,
    pub fn_ptr: fn(&mut Session, &[Value]) -> evaluator::Result,
    /// Position of an argument that is taken literally when written as a bare
    /// symbol, the way `dict` keys are. Every other argument is evaluated.
    pub literal_arg: Option<usize>,
}

impl fmt::Debug for PrimitiveFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "primitive function #<{}>", self.name)
    }
}

/// A user-defined procedure. There is deliberately no parent environment:
/// free variables in `body` are looked up in the session at call time.
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub params: Vec<String>,
    pub body: Ast,
}

impl Lambda {
    pub fn arity(&self) -> Arity {
        Arity::exactly(self.params.len())
    }
}

impl fmt::Display for Lambda {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<lambda ({})>", self.params.iter().join(" "))
    }
}

#[derive(Debug, Clone)]
pub enum Procedure {
    Native(&'static PrimitiveFn),
    UserDefined(Rc<Lambda>),
}

impl PartialEq for Procedure {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Procedure::Native(x), Procedure::Native(y)) => std::ptr::eq(*x, *y),
            (Procedure::UserDefined(x), Procedure::UserDefined(y)) => Rc::ptr_eq(x, y),
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Integer(Int),
    Float(f64),
    Bool(bool),
    Symbol(String),
    List(Rc<ValueList>),
    Map(Rc<ValueMap>),
    Procedure(Procedure),
}

/// What an unbound symbol evaluates to.
pub const ZERO_VALUE: Value = Value::Integer(0);

pub(crate) fn truthy(obj: &Value) -> bool {
    use Value::*;
    match obj {
        Nil => false,
        Bool(t) => *t,
        Integer(x) => *x != 0,
        Float(x) => *x != 0.0,
        Symbol(s) => !s.is_empty(),
        List(l) => !l.is_empty(),
        Map(m) => !m.is_empty(),
        Procedure(_) => true,
    }
}

#[derive(Debug)]
pub enum TypeMismatch {
    NotANumber,
    NotAnInt,
    NotAList,
    NotAMap,
    NotAValidKey,
    NotComparable,
    NotAddable,
}

impl Value {
    pub(crate) fn as_int(&self) -> Result<Int, TypeMismatch> {
        match self {
            Value::Integer(x) => Ok(*x),
            _ => Err(TypeMismatch::NotAnInt),
        }
    }

    pub(crate) fn as_float(&self) -> Result<f64, TypeMismatch> {
        match self {
            Value::Integer(x) => Ok(*x as f64),
            Value::Float(x) => Ok(*x),
            _ => Err(TypeMismatch::NotANumber),
        }
    }

    pub(crate) fn as_list(&self) -> Result<&[Value], TypeMismatch> {
        match self {
            Value::List(x) => Ok(x),
            _ => Err(TypeMismatch::NotAList),
        }
    }

    pub(crate) fn as_map(&self) -> Result<&ValueMap, TypeMismatch> {
        match self {
            Value::Map(x) => Ok(x),
            _ => Err(TypeMismatch::NotAMap),
        }
    }

    /// The text of a value usable as a map key or capability name.
    pub(crate) fn as_key(&self) -> Result<String, TypeMismatch> {
        match self {
            Value::Symbol(s) => Ok(s.clone()),
            Value::Integer(_) | Value::Float(_) => Ok(self.to_string()),
            _ => Err(TypeMismatch::NotAValidKey),
        }
    }

    pub(crate) fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    pub fn wrap_list(elements: Vec<Value>) -> Self {
        Self::List(Rc::new(ValueList(elements)))
    }

    pub fn wrap_map(map: ValueMap) -> Self {
        Self::Map(Rc::new(map))
    }

    pub fn new_symbol(name: &str) -> Self {
        Self::Symbol(name.into())
    }
}

impl From<&Atom> for Value {
    fn from(atom: &Atom) -> Self {
        match atom {
            Atom::Integer(x) => Value::Integer(*x),
            Atom::Float(x) => Value::Float(*x),
            Atom::Symbol(s) => Value::Symbol(s.clone()),
        }
    }
}

/// Quoted code becomes data: atoms keep their literal value, nodes become lists.
impl From<&Ast> for Value {
    fn from(ast: &Ast) -> Self {
        match ast {
            Ast::Atom(atom) => atom.into(),
            Ast::Node(elements) => Value::wrap_list(elements.iter().map(Value::from).collect()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match [self, other] {
            [Integer(x), Integer(y)] => x == y,
            [Integer(_), Float(_)] | [Float(_), Integer(_)] | [Float(_), Float(_)] => {
                self.as_float().ok() == other.as_float().ok()
            }
            [Bool(x), Bool(y)] => x == y,
            [Symbol(x), Symbol(y)] => x == y,
            [List(x), List(y)] => x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| a == b),
            [Map(x), Map(y)] => x.0 == y.0,
            [Procedure(x), Procedure(y)] => x == y,
            [Nil, Nil] => true,
            [_, _] => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(!truthy(&Value::Nil));
        assert!(!truthy(&Value::Bool(false)));
        assert!(!truthy(&ZERO_VALUE));
        assert!(!truthy(&Value::Float(0.0)));
        assert!(!truthy(&Value::new_symbol("")));
        assert!(!truthy(&Value::wrap_list(vec![])));
        assert!(truthy(&Value::Integer(-1)));
        assert!(truthy(&Value::new_symbol("x")));
        assert!(truthy(&Value::wrap_list(vec![Value::Nil])));
    }

    #[test]
    fn numeric_equality_crosses_types() {
        assert_eq!(Value::Integer(1), Value::Float(1.0));
        assert_ne!(Value::Integer(1), Value::Float(1.5));
        assert_ne!(Value::Integer(1), Value::new_symbol("1"));
    }

    #[test]
    fn lists_compare_elementwise() {
        let a = Value::wrap_list(vec![Value::Integer(1), Value::new_symbol("b")]);
        let b = Value::wrap_list(vec![Value::Integer(1), Value::new_symbol("b")]);
        assert_eq!(a, b);
        assert_ne!(a, Value::wrap_list(vec![Value::Integer(1)]));
    }

    #[test]
    fn arity_validation() {
        assert!(Arity::exactly(2).validate_for(2, "f").is_ok());
        assert!(Arity::at_least(1).validate_for(5, "f").is_ok());
        let err = Arity::exactly(2).validate_for(3, "f").unwrap_err();
        assert_eq!(
            err.to_string(),
            "When evaluating f expected exactly 2 arguments, but received 3 arguments"
        );
    }

    #[test]
    fn quoted_ast_becomes_data() {
        let ast = Ast::Node(vec![Ast::symbol("a"), Ast::integer(1)]);
        assert_eq!(
            Value::from(&ast),
            Value::wrap_list(vec![Value::new_symbol("a"), Value::Integer(1)])
        );
    }
}
