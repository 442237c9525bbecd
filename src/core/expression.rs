use std::fmt;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::evaluator::Evaluator;
use crate::render::Color;

const FUNCTION_PREFIX: &str = "f(x)";
const ID_SUFFIX_LEN: usize = 6;
const ID_SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Default categorical palette assigned round-robin to new expressions.
pub const DEFAULT_PALETTE: [Color; 8] = [
    Color::rgb(0.145, 0.388, 0.922),
    Color::rgb(0.863, 0.149, 0.149),
    Color::rgb(0.086, 0.639, 0.290),
    Color::rgb(0.576, 0.200, 0.918),
    Color::rgb(0.918, 0.345, 0.047),
    Color::rgb(0.031, 0.569, 0.698),
    Color::rgb(0.859, 0.153, 0.467),
    Color::rgb(0.396, 0.639, 0.051),
];

/// Opaque expression identifier: creation timestamp plus a random suffix.
///
/// Uniqueness is best effort.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExpressionId(String);

impl ExpressionId {
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| char::from(ID_SUFFIX_ALPHABET[rng.gen_range(0..ID_SUFFIX_ALPHABET.len())]))
            .collect();
        Self(format!("{}-{suffix}", Utc::now().timestamp_millis()))
    }

    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExpressionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// User input after normalization: display label and the body to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedExpression {
    pub label: String,
    pub body: String,
}

/// Normalizes raw user input.
///
/// - trims surrounding whitespace
/// - maps `×` and `·` to `*`
/// - case-folds the free variable `X` to `x`
/// - rewrites a leading `y =` to `f(x)=`
/// - wraps input without `=` as `f(x)=<input>`
///
/// Returns `None` when nothing plottable remains.
#[must_use]
pub fn normalize_expression(raw: &str) -> Option<NormalizedExpression> {
    let text: String = raw
        .trim()
        .chars()
        .map(|c| match c {
            '×' | '·' => '*',
            other => other,
        })
        .collect();
    let text = fold_free_variable(&text);
    if text.is_empty() {
        return None;
    }

    let (lhs, body) = match text.split_once('=') {
        Some((lhs, body)) => {
            let lhs = lhs.trim();
            let lhs = if lhs.is_empty() || lhs.eq_ignore_ascii_case("y") {
                FUNCTION_PREFIX
            } else {
                lhs
            };
            (lhs.to_owned(), body.trim().to_owned())
        }
        None => (FUNCTION_PREFIX.to_owned(), text.clone()),
    };
    if body.is_empty() {
        return None;
    }

    Some(NormalizedExpression {
        label: format!("{lhs}={body}"),
        body,
    })
}

fn fold_free_variable(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let is_word = |c: Option<&char>| c.is_some_and(|c| c.is_alphanumeric() || *c == '_');
    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let standalone = !is_word(i.checked_sub(1).and_then(|p| chars.get(p)))
                && !is_word(chars.get(i + 1));
            if c == 'X' && standalone { 'x' } else { c }
        })
        .collect()
}

/// A plottable function owned by the plot model.
pub struct Expression {
    id: ExpressionId,
    label: String,
    color: Color,
    color_index: usize,
    evaluator: Box<dyn Evaluator>,
    visible: bool,
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("color_index", &self.color_index)
            .field("visible", &self.visible)
            .finish_non_exhaustive()
    }
}

impl Expression {
    pub(crate) fn new(
        id: ExpressionId,
        label: String,
        color: Color,
        color_index: usize,
        evaluator: Box<dyn Evaluator>,
    ) -> Self {
        Self {
            id,
            label,
            color,
            color_index,
            evaluator,
            visible: true,
        }
    }

    #[must_use]
    pub fn id(&self) -> &ExpressionId {
        &self.id
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    #[must_use]
    pub fn color_index(&self) -> usize {
        self.color_index
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Finite value at `x`, or `None` when evaluation fails or is not finite.
    #[must_use]
    pub fn value_at(&self, x: f64) -> Option<f64> {
        self.evaluator.evaluate(x).ok().filter(|y| y.is_finite())
    }
}
