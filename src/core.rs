use crate::evaluator;
use crate::interpreter::Session;
use crate::printer;
use crate::types::{Arity, Int, PrimitiveFn, TypeMismatch, Value};
use itertools::Itertools;
use std::collections::HashMap;
use std::convert::TryFrom;

/// Integer arithmetic when both sides are integers, float arithmetic otherwise.
fn arithmetic_(
    args: &[Value],
    int_op: fn(Int, Int) -> Option<Int>,
    float_op: fn(f64, f64) -> f64,
) -> evaluator::Result {
    match args {
        [Value::Integer(x), Value::Integer(y)] => int_op(*x, *y)
            .map(Value::Integer)
            .ok_or(evaluator::Error::IntegerOverflow),
        [x, y] => Ok(Value::Float(float_op(x.as_float()?, y.as_float()?))),
        _ => unreachable!(),
    }
}

const SUM: PrimitiveFn = PrimitiveFn {
    name: "+",
    fn_ptr: sum_,
    arity: Arity::exactly(2),
    literal_arg: None,
};

fn sum_(_: &mut Session, args: &[Value]) -> evaluator::Result {
    match args {
        [Value::Symbol(x), Value::Symbol(y)] => Ok(Value::Symbol(format!("{}{}", x, y))),
        [Value::List(x), Value::List(y)] => Ok(Value::wrap_list(
            x.iter().chain(y.iter()).cloned().collect(),
        )),
        [x, y] if x.is_number() && y.is_number() => {
            arithmetic_(args, Int::checked_add, |x, y| x + y)
        }
        _ => Err(TypeMismatch::NotAddable.into()),
    }
}

const SUB: PrimitiveFn = PrimitiveFn {
    name: "-",
    fn_ptr: |_, args| arithmetic_(args, Int::checked_sub, |x, y| x - y),
    arity: Arity::exactly(2),
    literal_arg: None,
};

const MUL: PrimitiveFn = PrimitiveFn {
    name: "*",
    fn_ptr: |_, args| arithmetic_(args, Int::checked_mul, |x, y| x * y),
    arity: Arity::exactly(2),
    literal_arg: None,
};

const DIV: PrimitiveFn = PrimitiveFn {
    name: "/",
    fn_ptr: div_,
    arity: Arity::exactly(2),
    literal_arg: None,
};

/// True division: the result is always a float.
fn div_(_: &mut Session, args: &[Value]) -> evaluator::Result {
    let x = args[0].as_float()?;
    let y = args[1].as_float()?;
    if y == 0.0 {
        return Err(evaluator::Error::DivideByZero);
    }
    Ok(Value::Float(x / y))
}

fn comparison_(args: &[Value], comp: fn(&f64, &f64) -> bool) -> evaluator::Result {
    match args {
        // Symbols order lexicographically: compare the ordering against zero
        [Value::Symbol(x), Value::Symbol(y)] => {
            Ok(Value::Bool(comp(&(x.cmp(y) as i8 as f64), &0.0)))
        }
        [x, y] => match (x.as_float(), y.as_float()) {
            (Ok(x), Ok(y)) => Ok(Value::Bool(comp(&x, &y))),
            _ => Err(TypeMismatch::NotComparable.into()),
        },
        _ => unreachable!(),
    }
}

macro_rules! comparison_primitive {
    ($SYMBOL:tt, $NAME:ident) => {
        paste::item! {
            const $NAME: PrimitiveFn = PrimitiveFn {
                name: stringify!($SYMBOL),
                fn_ptr: |_, args: &[Value]| comparison_(args, f64:: [<$NAME:lower>]),
                arity: Arity::exactly(2),
                literal_arg: None,
            };
        }
    };
}

comparison_primitive!(<, LT);
comparison_primitive!(>, GT);

const EQUAL: PrimitiveFn = PrimitiveFn {
    name: "=",
    fn_ptr: |_, args| Ok(Value::Bool(args[0] == args[1])),
    arity: Arity::exactly(2),
    literal_arg: None,
};

const NOT_EQUAL: PrimitiveFn = PrimitiveFn {
    name: "/=",
    fn_ptr: |_, args| Ok(Value::Bool(args[0] != args[1])),
    arity: Arity::exactly(2),
    literal_arg: None,
};

const LIST: PrimitiveFn = PrimitiveFn {
    name: "list",
    fn_ptr: |_, args| Ok(Value::wrap_list(args.to_vec())),
    arity: Arity::at_least(0),
    literal_arg: None,
};

const NTH: PrimitiveFn = PrimitiveFn {
    name: "nth",
    fn_ptr: nth_,
    arity: Arity::exactly(2),
    literal_arg: None,
};

fn nth_(_: &mut Session, args: &[Value]) -> evaluator::Result {
    let seq = args[0].as_list()?;
    let index = args[1].as_int()?;
    nth_internal(seq, index)
}

/// Negative indices count back from the end of the list.
fn nth_internal(seq: &[Value], orig_index: Int) -> evaluator::Result {
    let len = Int::try_from(seq.len()).unwrap_or(Int::MAX);
    let index = if orig_index < 0 {
        orig_index + len
    } else {
        orig_index
    };
    usize::try_from(index)
        .ok()
        .and_then(|index| seq.get(index))
        .cloned()
        .ok_or(evaluator::Error::BadIndex(orig_index, seq.len()))
}

const CAR: PrimitiveFn = PrimitiveFn {
    name: "car",
    fn_ptr: |_, args| nth_internal(args[0].as_list()?, 0),
    arity: Arity::exactly(1),
    literal_arg: None,
};

const CDR: PrimitiveFn = PrimitiveFn {
    name: "cdr",
    fn_ptr: cdr_,
    arity: Arity::exactly(1),
    literal_arg: None,
};

fn cdr_(_: &mut Session, args: &[Value]) -> evaluator::Result {
    match args[0].as_list()? {
        [] => Err(evaluator::Error::BadIndex(0, 0)),
        [_, rest @ ..] => Ok(Value::wrap_list(rest.to_vec())),
    }
}

const CONS: PrimitiveFn = PrimitiveFn {
    name: "cons",
    fn_ptr: cons_,
    arity: Arity::exactly(2),
    literal_arg: None,
};

fn cons_(_: &mut Session, args: &[Value]) -> evaluator::Result {
    let head = &args[0];
    let tail = args[1].as_list()?;

    let mut elements = Vec::with_capacity(tail.len() + 1);
    elements.push(head.clone());
    elements.extend(tail.iter().cloned());
    Ok(Value::wrap_list(elements))
}

const APPEND: PrimitiveFn = PrimitiveFn {
    name: "append",
    fn_ptr: append_,
    arity: Arity::exactly(2),
    literal_arg: None,
};

fn append_(_: &mut Session, args: &[Value]) -> evaluator::Result {
    let mut elements = args[0].as_list()?.to_vec();
    elements.push(args[1].clone());
    Ok(Value::wrap_list(elements))
}

const REMOVE: PrimitiveFn = PrimitiveFn {
    name: "remove",
    fn_ptr: remove_,
    arity: Arity::exactly(2),
    literal_arg: None,
};

fn remove_(_: &mut Session, args: &[Value]) -> evaluator::Result {
    let seq = args[0].as_list()?;
    let target = &args[1];
    let position = seq
        .iter()
        .position(|element| element == target)
        .ok_or_else(|| evaluator::Error::NotInList(target.to_string()))?;
    let mut elements = seq.to_vec();
    elements.remove(position);
    Ok(Value::wrap_list(elements))
}

const GETK: PrimitiveFn = PrimitiveFn {
    name: "getk",
    fn_ptr: getk_,
    arity: Arity::exactly(2),
    literal_arg: Some(1),
};

fn getk_(_: &mut Session, args: &[Value]) -> evaluator::Result {
    let map = args[0].as_map()?;
    let key = args[1].as_key()?;
    map.get(&key)
        .cloned()
        .ok_or(evaluator::Error::KeyNotFound(key))
}

const PRINC: PrimitiveFn = PrimitiveFn {
    name: "princ",
    fn_ptr: princ_,
    arity: Arity::at_least(0),
    literal_arg: None,
};

fn princ_(session: &mut Session, args: &[Value]) -> evaluator::Result {
    let text = args.iter().map(printer::pr_str).join(" ");
    session.emit(&text);
    Ok(Value::Nil)
}

const HOST: PrimitiveFn = PrimitiveFn {
    name: "host",
    fn_ptr: host_,
    arity: Arity::at_least(1),
    literal_arg: Some(0),
};

fn host_(session: &mut Session, args: &[Value]) -> evaluator::Result {
    let name = args[0].as_key()?;
    session.host.call(&name, &args[1..], &session.env)
}

static PRIMITIVES: &[&PrimitiveFn] = &[
    // Arithmetic
    &SUM,
    &SUB,
    &MUL,
    &DIV,
    // Comparisons
    &GT,
    &LT,
    &EQUAL,
    &NOT_EQUAL,
    // Working with lists
    &LIST,
    &NTH,
    &CAR,
    &CDR,
    &CONS,
    &APPEND,
    &REMOVE,
    // Working with maps
    &GETK,
    // Other
    &PRINC,
    &HOST,
];

type Namespace = HashMap<&'static str, &'static PrimitiveFn>;
lazy_static! {
    pub static ref CORE: Namespace = PRIMITIVES.iter().map(|&func| (func.name, func)).collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{Error, ErrorKind, EVAL};
    use crate::reader::read_str;

    fn eval_str(input: &str) -> evaluator::Result {
        let mut session = Session::with_output(Box::new(std::io::sink()));
        let ast = read_str(input)?;
        EVAL(&ast, &mut session)
    }

    fn list(values: Vec<Int>) -> Value {
        Value::wrap_list(values.into_iter().map(Value::Integer).collect())
    }

    #[test]
    fn arithmetic() {
        assert_eq!(eval_str("(+ 1 2)").unwrap(), Value::Integer(3));
        assert_eq!(eval_str("(- 1 2)").unwrap(), Value::Integer(-1));
        assert_eq!(eval_str("(* 4 2.5)").unwrap(), Value::Float(10.0));
        assert_eq!(eval_str("(+ 0.5 1)").unwrap(), Value::Float(1.5));
    }

    #[test]
    fn division_is_true_division() {
        assert_eq!(eval_str("(/ 7 2)").unwrap(), Value::Float(3.5));
        assert!(matches!(eval_str("(/ 4 2)").unwrap(), Value::Float(x) if x == 2.0));
    }

    #[test]
    fn division_by_zero() {
        let err = eval_str("(/ 1 0)").unwrap_err();
        assert!(matches!(err, Error::DivideByZero));
        assert_eq!(err.kind(), ErrorKind::Arithmetic);
        assert!(eval_str("(/ 1.5 0.0)").is_err());
    }

    #[test]
    fn overflow_is_reported() {
        let err = eval_str("(* 9223372036854775807 2)").unwrap_err();
        assert!(matches!(err, Error::IntegerOverflow));
    }

    #[test]
    fn adding_symbols_and_lists() {
        assert_eq!(
            eval_str("(+ (quote ab) (quote cd))").unwrap(),
            Value::new_symbol("abcd")
        );
        assert_eq!(
            eval_str("(+ (list 1) (list 2 3))").unwrap(),
            list(vec![1, 2, 3])
        );
        assert!(matches!(
            eval_str("(+ (list 1) 2)"),
            Err(Error::TypeMismatch(TypeMismatch::NotAddable))
        ));
    }

    #[test]
    fn comparisons() {
        assert_eq!(eval_str("(> 3 2)").unwrap(), Value::Bool(true));
        assert_eq!(eval_str("(< 3 2)").unwrap(), Value::Bool(false));
        assert_eq!(eval_str("(< 1 1.5)").unwrap(), Value::Bool(true));
        assert_eq!(eval_str("(= 2 2.0)").unwrap(), Value::Bool(true));
        assert_eq!(eval_str("(/= 2 3)").unwrap(), Value::Bool(true));
        assert_eq!(
            eval_str("(= (list 1 2) (list 1 2))").unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            eval_str("(< (quote abc) (quote abd))").unwrap(),
            Value::Bool(true)
        );
        assert!(eval_str("(< (list) 1)").is_err());
    }

    #[test]
    fn list_operations() {
        assert_eq!(eval_str("(list 1 2 3)").unwrap(), list(vec![1, 2, 3]));
        assert_eq!(eval_str("(list)").unwrap(), list(vec![]));
        assert_eq!(eval_str("(nth (list 1 2 3) 1)").unwrap(), Value::Integer(2));
        assert_eq!(eval_str("(nth (list 1 2 3) -1)").unwrap(), Value::Integer(3));
        assert_eq!(eval_str("(car (list 1 2 3))").unwrap(), Value::Integer(1));
        assert_eq!(eval_str("(cdr (list 1 2 3))").unwrap(), list(vec![2, 3]));
        assert_eq!(eval_str("(cons 0 (list 1 2))").unwrap(), list(vec![0, 1, 2]));
        assert_eq!(eval_str("(append (list 1 2) 3)").unwrap(), list(vec![1, 2, 3]));
        assert_eq!(
            eval_str("(remove (list 1 2 1) 1)").unwrap(),
            list(vec![2, 1])
        );
    }

    #[test]
    fn list_lookup_failures() {
        for input in &[
            "(nth (list 1 2 3) 3)",
            "(nth (list 1 2 3) -4)",
            "(car (list))",
            "(cdr (list))",
            "(remove (list 1 2) 5)",
        ] {
            let err = eval_str(input).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Lookup, "{}", input);
        }
    }

    #[test]
    fn list_operations_do_not_mutate_their_arguments() {
        let mut session = Session::with_output(Box::new(std::io::sink()));
        let mut eval = |input: &str| EVAL(&read_str(input).unwrap(), &mut session);
        eval("(def l (list 1 2 3))").unwrap();
        eval("(cdr l)").unwrap();
        eval("(remove l 2)").unwrap();
        eval("(append l 4)").unwrap();
        assert_eq!(eval("l").unwrap(), list(vec![1, 2, 3]));
    }

    #[test]
    fn getk_uses_literal_keys() {
        assert_eq!(
            eval_str("(getk (dict (a 1) (b 2)) b)").unwrap(),
            Value::Integer(2)
        );
        assert_eq!(
            eval_str("(getk (dict (a 1) (b 2)) (quote a))").unwrap(),
            Value::Integer(1)
        );
        assert_eq!(
            eval_str("(getk (dict (1 one)) 1)").unwrap(),
            Value::Integer(0)
        );
    }

    #[test]
    fn getk_missing_key() {
        let err = eval_str("(getk (dict (a 1)) z)").unwrap_err();
        assert!(matches!(&err, Error::KeyNotFound(key) if key == "z"));
        assert_eq!(err.kind(), ErrorKind::Lookup);
    }

    #[test]
    fn type_mismatches() {
        assert!(matches!(
            eval_str("(car 1)"),
            Err(Error::TypeMismatch(TypeMismatch::NotAList))
        ));
        assert!(matches!(
            eval_str("(getk (list) a)"),
            Err(Error::TypeMismatch(TypeMismatch::NotAMap))
        ));
    }

    #[test]
    fn every_builtin_is_registered() {
        for name in &[
            "+", "-", "*", "/", ">", "<", "=", "/=", "list", "nth", "car", "cdr", "cons",
            "append", "remove", "getk", "princ", "host",
        ] {
            assert!(CORE.contains_key(name), "{} missing", name);
        }
    }
}
