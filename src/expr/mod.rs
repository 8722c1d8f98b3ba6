// ============================================================================
// spark-components - Condition Expressions
// A sandboxed boolean-expression language for `v-if` / `v-else-if`
// ============================================================================
//
// Expressions are parsed once and evaluated against an [`Environment`]; they
// can read names and members but cannot call anything or assign.
// ============================================================================

pub mod eval;
pub mod lexer;
pub mod parser;

use thiserror::Error;

pub use eval::{display_value, evaluate, Environment, JsValue};
pub use parser::Expr;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("unexpected character {ch:?} at {position}")]
    UnexpectedChar { ch: char, position: usize },

    #[error("unterminated string starting at {position}")]
    UnterminatedString { position: usize },

    #[error("unexpected token `{token}` at {position}")]
    UnexpectedToken { token: String, position: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unknown name: {name}")]
    UnknownName { name: String },

    #[error("cannot read property `{property}` of null or undefined")]
    NotAnObject { property: String },
}

/// A parsed condition.
///
/// # Example
///
/// ```
/// use spark_components::expr::{Environment, Expression, JsValue};
///
/// struct Count(f64);
///
/// impl Environment for Count {
///     fn lookup(&self, name: &str) -> Option<JsValue> {
///         (name == "count").then(|| JsValue::Number(self.0))
///     }
/// }
///
/// let expr = Expression::parse("count > 1 && count < 10").unwrap();
/// assert!(expr.is_truthy(&Count(5.0)).unwrap());
/// assert!(!expr.is_truthy(&Count(0.0)).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Expr,
}

impl Expression {
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        Ok(Self {
            source: source.to_string(),
            root: parser::parse(source)?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &Expr {
        &self.root
    }

    pub fn evaluate(&self, env: &dyn Environment) -> Result<JsValue, ExprError> {
        evaluate(&self.root, env)
    }

    pub fn is_truthy(&self, env: &dyn Environment) -> Result<bool, ExprError> {
        Ok(self.evaluate(env)?.truthy())
    }
}
