use crate::evaluator::{Error, Result, EVAL};
use crate::interpreter::{self, Session};
use crate::reader::{Ast, Atom};
use crate::types::{truthy, Arity, Lambda, Procedure, Value, ValueMap};
use itertools::Itertools;
use std::path::PathBuf;
use std::rc::Rc;

/// The text of a literal atom used as a name: `def` targets, `dict` keys and
/// `with` paths.
fn atom_text(ast: &Ast) -> Option<String> {
    match ast {
        Ast::Atom(Atom::Symbol(s)) => Some(s.clone()),
        Ast::Atom(atom) => Some(atom.to_string()),
        Ast::Node(_) => None,
    }
}

/// Only the chosen branch is evaluated, and only once.
pub fn apply_if(args: &[Ast], session: &mut Session) -> Result {
    Arity::Between(2..=3).validate_for(args.len(), "if")?;
    let condition = EVAL(&args[0], session)?;
    if truthy(&condition) {
        EVAL(&args[1], session)
    } else if args.len() == 3 {
        EVAL(&args[2], session)
    } else {
        Ok(Value::Nil)
    }
}

#[derive(Debug)]
pub enum WithError {
    PathNotAnAtom,
}

pub fn apply_with(args: &[Ast], session: &mut Session) -> Result {
    Arity::exactly(1).validate_for(args.len(), "with")?;
    let name = atom_text(&args[0]).ok_or(Error::With(WithError::PathNotAnAtom))?;
    let path = PathBuf::from(format!("{}.lsp", name));
    log::info!("including {}", path.display());
    let text = std::fs::read_to_string(&path).map_err(|e| Error::IOError(path.clone(), e))?;
    for line in interpreter::source_lines(&text) {
        let printed = interpreter::rep(line, session)?;
        session.emit(&printed);
    }
    // Neither the file's bindings nor the including line's survive the include
    session.env.reset();
    Ok(Value::Nil)
}

#[derive(Debug)]
pub enum DefError {
    WrongArgCount(usize),
    KeyNotAnAtom,
}

pub fn apply_def(args: &[Ast], session: &mut Session) -> Result {
    let (key, value) = match args {
        [key, value] => Ok((key, value)),
        _ => Err(Error::Def(DefError::WrongArgCount(args.len()))),
    }?;
    let key = atom_text(key).ok_or(Error::Def(DefError::KeyNotAnAtom))?;
    let value = EVAL(value, session)?;
    log::debug!("define {} as {}", key, value);
    session.env.define(key, value);
    Ok(Value::Nil)
}

#[derive(Debug)]
pub enum LambdaError {
    WrongArgCount(usize),
    ParameterNotASymbol,
}

pub fn apply_lambda(args: &[Ast]) -> Result {
    // A parameter list and a body. A lone symbol is shorthand for a
    // one-element parameter list.
    let (parameters, body) = match args {
        [parameters, body] => Ok((parameters, body)),
        _ => Err(Error::Lambda(LambdaError::WrongArgCount(args.len()))),
    }?;
    let parameters = match parameters {
        Ast::Node(elements) => elements.as_slice(),
        symbol => std::slice::from_ref(symbol),
    };
    let params = parameters
        .iter()
        .map(|ast| ast.as_symbol().map(String::from))
        .collect::<Option<Vec<_>>>()
        .ok_or(Error::Lambda(LambdaError::ParameterNotASymbol))?;
    let lambda = Lambda {
        params,
        body: body.clone(),
    };
    Ok(Value::Procedure(Procedure::UserDefined(Rc::new(lambda))))
}

/// Prints the arguments instead of evaluating them.
pub fn apply_quote(args: &[Ast]) -> Value {
    Value::Symbol(args.iter().join(" "))
}

pub fn apply_begin(args: &[Ast], session: &mut Session) -> Result {
    let mut result = Value::Nil;
    for ast in args {
        result = EVAL(ast, session)?;
    }
    Ok(result)
}

#[derive(Debug)]
pub enum DictError {
    PairNotAList,
    PairWrongLength(usize),
    KeyNotAnAtom,
}

pub fn apply_dict(args: &[Ast], session: &mut Session) -> Result {
    let mut map = ValueMap::default();
    for pair in args {
        let (key, value) = match pair {
            Ast::Node(elements) => match elements.as_slice() {
                [key, value] => Ok((key, value)),
                _ => Err(Error::Dict(DictError::PairWrongLength(elements.len()))),
            },
            Ast::Atom(_) => Err(Error::Dict(DictError::PairNotAList)),
        }?;
        let key = atom_text(key).ok_or(Error::Dict(DictError::KeyNotAnAtom))?;
        let value = EVAL(value, session)?;
        map.insert(key, value);
    }
    Ok(Value::wrap_map(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::ErrorKind;
    use crate::reader::read_str;

    fn session() -> Session {
        Session::with_output(Box::new(std::io::sink()))
    }

    fn eval_in(session: &mut Session, input: &str) -> Result {
        let ast = read_str(input)?;
        EVAL(&ast, session)
    }

    #[test]
    fn if_picks_a_branch() {
        let mut s = session();
        assert_eq!(eval_in(&mut s, "(if (> 3 2) 1 2)").unwrap(), Value::Integer(1));
        assert_eq!(eval_in(&mut s, "(if (< 3 2) 1 2)").unwrap(), Value::Integer(2));
        assert_eq!(eval_in(&mut s, "(if (< 3 2) 1)").unwrap(), Value::Nil);
    }

    #[test]
    fn if_evaluates_only_the_chosen_branch_once() {
        let mut s = session();
        assert_eq!(eval_in(&mut s, "(if (t) 1 (/ 1 0))").unwrap(), Value::Integer(1));
        eval_in(&mut s, "(def count 0)").unwrap();
        eval_in(
            &mut s,
            "(if (t) (begin (def count (+ count 1)) count) (def count 100))",
        )
        .unwrap();
        assert_eq!(eval_in(&mut s, "count").unwrap(), Value::Integer(1));
    }

    #[test]
    fn if_uses_truthiness() {
        let mut s = session();
        assert_eq!(eval_in(&mut s, "(if 0 1 2)").unwrap(), Value::Integer(2));
        assert_eq!(eval_in(&mut s, "(if (list) 1 2)").unwrap(), Value::Integer(2));
        assert_eq!(eval_in(&mut s, "(if nil 1 2)").unwrap(), Value::Integer(2));
        assert_eq!(eval_in(&mut s, "(if (list 0) 1 2)").unwrap(), Value::Integer(1));
    }

    #[test]
    fn def_binds_and_returns_nil() {
        let mut s = session();
        assert_eq!(eval_in(&mut s, "(def x (* 2 3))").unwrap(), Value::Nil);
        assert_eq!(s.env.lookup("x"), Value::Integer(6));
    }

    #[test]
    fn def_rejects_bad_forms() {
        let mut s = session();
        assert!(matches!(
            eval_in(&mut s, "(def x)"),
            Err(Error::Def(DefError::WrongArgCount(1)))
        ));
        assert!(matches!(
            eval_in(&mut s, "(def (x) 1)"),
            Err(Error::Def(DefError::KeyNotAnAtom))
        ));
    }

    #[test]
    fn lambda_accepts_a_bare_parameter() {
        let mut s = session();
        let value = eval_in(&mut s, "(lambda x (+ x 1))").unwrap();
        match value {
            Value::Procedure(Procedure::UserDefined(lambda)) => {
                assert_eq!(lambda.params, vec![String::from("x")]);
                assert_eq!(lambda.body.to_string(), "(+ x 1)");
            }
            other => panic!("expected a lambda, got {:?}", other),
        }
    }

    #[test]
    fn lambda_rejects_non_symbol_parameters() {
        let mut s = session();
        let err = eval_in(&mut s, "(lambda (x 1) x)").unwrap_err();
        assert!(matches!(err, Error::Lambda(LambdaError::ParameterNotASymbol)));
        assert_eq!(err.kind(), ErrorKind::Form);
    }

    #[test]
    fn quote_prints_without_evaluating() {
        let mut s = session();
        assert_eq!(eval_in(&mut s, "(quote 1 2 3)").unwrap(), Value::new_symbol("1 2 3"));
        assert_eq!(eval_in(&mut s, "(quote (/ 1 0))").unwrap(), Value::new_symbol("(/ 1 0)"));
        assert_eq!(eval_in(&mut s, "(quote)").unwrap(), Value::new_symbol(""));
    }

    #[test]
    fn begin_returns_last() {
        let mut s = session();
        assert_eq!(eval_in(&mut s, "(begin 1 2 3)").unwrap(), Value::Integer(3));
        assert_eq!(eval_in(&mut s, "(begin)").unwrap(), Value::Nil);
        assert_eq!(eval_in(&mut s, "(begin (def x 5) x)").unwrap(), Value::Integer(5));
    }

    #[test]
    fn dict_builds_a_map() {
        let mut s = session();
        let value = eval_in(&mut s, "(dict (a 1) (b (+ 1 1)) (3 x))").unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.get("a"), Some(&Value::Integer(1)));
        assert_eq!(map.get("b"), Some(&Value::Integer(2)));
        assert_eq!(map.get("3"), Some(&Value::Integer(0)));
    }

    #[test]
    fn dict_rejects_bad_pairs() {
        let mut s = session();
        assert!(matches!(
            eval_in(&mut s, "(dict a)"),
            Err(Error::Dict(DictError::PairNotAList))
        ));
        assert!(matches!(
            eval_in(&mut s, "(dict (a 1 2))"),
            Err(Error::Dict(DictError::PairWrongLength(3)))
        ));
    }

    #[test]
    fn with_reports_missing_files() {
        let mut s = session();
        let err = eval_in(&mut s, "(with surely/not/a/real/file)").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
