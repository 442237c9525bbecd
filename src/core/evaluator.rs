//! Contract with the external expression compiler, plus the default
//! `evalexpr`-backed implementation.
//!
//! The plot model only relies on two calls: `compile(text)` returning an
//! evaluator, and `evaluate(x)` returning a number or failing.

use std::cell::RefCell;
use std::f64::consts::{E, PI};

use evalexpr::{
    ContextWithMutableFunctions, ContextWithMutableVariables, EvalexprResult, Function,
    HashMapContext, Node, Operator, Value, build_operator_tree,
};
use thiserror::Error;

/// Per-sample evaluation failure (domain error, unknown symbol, bad type).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("evaluation failed: {0}")]
pub struct EvalError(pub String);

/// Compiled single-variable function `y = f(x)`.
pub trait Evaluator {
    fn evaluate(&self, x: f64) -> Result<f64, EvalError>;
}

/// Turns the right-hand side of an expression into an `Evaluator`.
pub trait ExpressionCompiler {
    /// Returns the compiler's message on syntax errors.
    fn compile(&self, source: &str) -> Result<Box<dyn Evaluator>, String>;
}

const FREE_VARIABLE: &str = "x";
const CONSTANTS: [(&str, f64); 2] = [("pi", PI), ("e", E)];
const FUNCTIONS: [(&str, fn(f64) -> f64); 21] = [
    ("sin", f64::sin),
    ("cos", f64::cos),
    ("tan", f64::tan),
    ("asin", f64::asin),
    ("acos", f64::acos),
    ("atan", f64::atan),
    ("sinh", f64::sinh),
    ("cosh", f64::cosh),
    ("tanh", f64::tanh),
    ("sqrt", f64::sqrt),
    ("cbrt", f64::cbrt),
    ("abs", f64::abs),
    ("exp", f64::exp),
    ("ln", f64::ln),
    ("log", f64::log10),
    ("log10", f64::log10),
    ("log2", f64::log2),
    ("floor", f64::floor),
    ("ceil", f64::ceil),
    ("round", f64::round),
    ("sign", f64::signum),
];

/// Default compiler built on `evalexpr`.
///
/// Integer literals are promoted to floats and implicit multiplication
/// (`2x`, `3(x+1)`, `(x)(x)`) is made explicit before parsing.
#[derive(Debug, Default, Clone, Copy)]
pub struct EvalexprCompiler;

impl ExpressionCompiler for EvalexprCompiler {
    fn compile(&self, source: &str) -> Result<Box<dyn Evaluator>, String> {
        let prepared = prepare_source(source);
        let node = build_operator_tree(&prepared).map_err(|err| err.to_string())?;
        check_structure(&node)?;

        if let Some(unknown) = node
            .iter_variable_identifiers()
            .find(|name| *name != FREE_VARIABLE && !CONSTANTS.iter().any(|(c, _)| c == name))
        {
            return Err(format!("unknown variable `{unknown}`"));
        }

        let context = math_context().map_err(|err| err.to_string())?;
        Ok(Box::new(EvalexprEvaluator {
            node,
            context: RefCell::new(context),
        }))
    }
}

struct EvalexprEvaluator {
    node: Node,
    context: RefCell<HashMapContext>,
}

impl Evaluator for EvalexprEvaluator {
    fn evaluate(&self, x: f64) -> Result<f64, EvalError> {
        let mut context = self
            .context
            .try_borrow_mut()
            .map_err(|err| EvalError(err.to_string()))?;
        context
            .set_value(FREE_VARIABLE.into(), Value::Float(x))
            .map_err(|err| EvalError(err.to_string()))?;

        match self.node.eval_with_context(&*context) {
            Ok(Value::Float(value)) => Ok(value),
            Ok(Value::Int(value)) => Ok(value as f64),
            Ok(other) => Err(EvalError(format!(
                "expression result `{other}` is not a number"
            ))),
            Err(err) => Err(EvalError(err.to_string())),
        }
    }
}

/// Rejects trees that `evalexpr` accepts but can never evaluate: operators
/// missing operands, calls to unregistered functions, and assignments.
fn check_structure(node: &Node) -> Result<(), String> {
    let children = node.children().len();
    let expected = match node.operator() {
        Operator::RootNode | Operator::Neg | Operator::Not => Some(1),
        Operator::Add
        | Operator::Sub
        | Operator::Mul
        | Operator::Div
        | Operator::Mod
        | Operator::Exp
        | Operator::Eq
        | Operator::Neq
        | Operator::Gt
        | Operator::Lt
        | Operator::Geq
        | Operator::Leq
        | Operator::And
        | Operator::Or => Some(2),
        Operator::Const { .. } | Operator::VariableIdentifierRead { .. } => Some(0),
        Operator::FunctionIdentifier { identifier } => {
            if !FUNCTIONS.iter().any(|(name, _)| name == identifier) {
                return Err(format!("unknown function `{identifier}`"));
            }
            Some(1)
        }
        Operator::Tuple | Operator::Chain => None,
        Operator::Assign
        | Operator::AddAssign
        | Operator::SubAssign
        | Operator::MulAssign
        | Operator::DivAssign
        | Operator::ModAssign
        | Operator::ExpAssign
        | Operator::AndAssign
        | Operator::OrAssign
        | Operator::VariableIdentifierWrite { .. } => {
            return Err("assignments are not supported".to_owned());
        }
    };

    match expected {
        Some(count) if count != children => Err(format!(
            "`{}` expects {count} operand(s), found {children}",
            node.operator()
        )),
        None if children == 0 => Err(format!("empty `{}`", node.operator())),
        _ => node.children().iter().try_for_each(check_structure),
    }
}

fn math_context() -> EvalexprResult<HashMapContext> {
    let mut context = HashMapContext::new();

    for (name, func) in FUNCTIONS {
        context.set_function(
            name.into(),
            Function::new(move |argument| Ok(Value::Float(func(argument.as_number()?)))),
        )?;
    }
    for (name, value) in CONSTANTS {
        context.set_value(name.into(), Value::Float(value))?;
    }
    context.set_value(FREE_VARIABLE.into(), Value::Float(0.0))?;
    Ok(context)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Number,
    Identifier,
    Close,
}

/// Rewrites user math into the `evalexpr` dialect.
fn prepare_source(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len() + 8);
    let mut previous: Option<TokenKind> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let starts_number = c.is_ascii_digit()
            || (c == '.' && chars.get(i + 1).is_some_and(char::is_ascii_digit));

        if starts_number {
            let start = i;
            let mut is_float = false;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            if chars.get(i) == Some(&'.') {
                is_float = true;
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
            }
            if matches!(chars.get(i), Some('e' | 'E')) {
                let exponent_digit = |at: usize| chars.get(at).is_some_and(char::is_ascii_digit);
                let signed = matches!(chars.get(i + 1), Some('+' | '-')) && exponent_digit(i + 2);
                if exponent_digit(i + 1) || signed {
                    is_float = true;
                    i += if signed { 2 } else { 1 };
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
            }
            if matches!(previous, Some(TokenKind::Number | TokenKind::Close)) {
                out.push('*');
            }
            if chars[start] == '.' {
                out.push('0');
            }
            out.extend(&chars[start..i]);
            if !is_float {
                out.push_str(".0");
            }
            previous = Some(TokenKind::Number);
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            if matches!(previous, Some(TokenKind::Number | TokenKind::Close)) {
                out.push('*');
            }
            out.extend(&chars[start..i]);
            previous = Some(TokenKind::Identifier);
            continue;
        }

        match c {
            '(' => {
                if matches!(previous, Some(TokenKind::Number | TokenKind::Close)) {
                    out.push('*');
                }
                previous = None;
            }
            ')' => previous = Some(TokenKind::Close),
            c if c.is_whitespace() => {}
            _ => previous = None,
        }
        out.push(c);
        i += 1;
    }
    out
}
