// ============================================================================
// spark-components - Expression Evaluation
// Script-style value semantics over JSON state
// ============================================================================
//
// Truthiness, loose vs strict equality, `+` concatenation and relational
// comparison follow the usual browser-script rules. Lists and objects compare
// structurally (values read from state are copies, so there is no identity to
// compare).
// ============================================================================

use serde_json::{Map, Value};

use super::lexer::Op;
use super::parser::{Expr, Literal, UnaryOp};
use super::ExprError;

// =============================================================================
// VALUES
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum JsValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    List(Vec<Value>),
    Object(Map<String, Value>),
}

impl From<Value> for JsValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => JsValue::Null,
            Value::Bool(b) => JsValue::Bool(b),
            Value::Number(n) => JsValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => JsValue::Str(s),
            Value::Array(items) => JsValue::List(items),
            Value::Object(map) => JsValue::Object(map),
        }
    }
}

impl From<Option<Value>> for JsValue {
    fn from(value: Option<Value>) -> Self {
        value.map_or(JsValue::Undefined, JsValue::from)
    }
}

impl JsValue {
    pub fn truthy(&self) -> bool {
        match self {
            JsValue::Undefined | JsValue::Null => false,
            JsValue::Bool(b) => *b,
            JsValue::Number(n) => *n != 0.0 && !n.is_nan(),
            JsValue::Str(s) => !s.is_empty(),
            JsValue::List(_) | JsValue::Object(_) => true,
        }
    }

    fn is_nullish(&self) -> bool {
        matches!(self, JsValue::Undefined | JsValue::Null)
    }

    pub fn to_number(&self) -> f64 {
        match self {
            JsValue::Undefined => f64::NAN,
            JsValue::Null => 0.0,
            JsValue::Bool(b) => f64::from(u8::from(*b)),
            JsValue::Number(n) => *n,
            JsValue::Str(s) => string_to_number(s),
            JsValue::List(_) | JsValue::Object(_) => string_to_number(&self.to_display_string()),
        }
    }

    /// The string form used by concatenation and interpolation.
    pub fn to_display_string(&self) -> String {
        match self {
            JsValue::Undefined => "undefined".to_string(),
            JsValue::Null => "null".to_string(),
            JsValue::Bool(b) => b.to_string(),
            JsValue::Number(n) => format_number(*n),
            JsValue::Str(s) => s.clone(),
            JsValue::List(items) => join_list(items),
            JsValue::Object(_) => "[object Object]".to_string(),
        }
    }

    /// Lists and objects become strings; everything else is already primitive.
    fn to_primitive(self) -> JsValue {
        match self {
            JsValue::List(_) | JsValue::Object(_) => JsValue::Str(self.to_display_string()),
            primitive => primitive,
        }
    }

    /// `value.property`
    pub fn member(&self, property: &str) -> Result<JsValue, ExprError> {
        Ok(match self {
            JsValue::Undefined | JsValue::Null => {
                return Err(ExprError::NotAnObject {
                    property: property.to_string(),
                });
            }
            JsValue::Object(map) => map.get(property).cloned().into(),
            JsValue::List(items) => match property {
                "length" => JsValue::Number(items.len() as f64),
                index => index
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| items.get(i).cloned())
                    .into(),
            },
            JsValue::Str(s) => match property {
                "length" => JsValue::Number(s.chars().count() as f64),
                index => index
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| s.chars().nth(i))
                    .map_or(JsValue::Undefined, |c| JsValue::Str(c.to_string())),
            },
            JsValue::Bool(_) | JsValue::Number(_) => JsValue::Undefined,
        })
    }
}

/// Display form of a state value (`1` not `1.0`, lists comma-joined).
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => format_number(f),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => join_list(items),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn join_list(items: &[Value]) -> String {
    items
        .iter()
        .map(|item| match item {
            Value::Null => String::new(),
            other => display_value(other),
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        (if n > 0.0 { "Infinity" } else { "-Infinity" }).to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n == n.trunc() && n.abs() < 1e21 {
        format!("{n:.0}")
    } else {
        format!("{n}")
    }
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

// =============================================================================
// COMPARISON
// =============================================================================

pub fn strict_equals(a: &JsValue, b: &JsValue) -> bool {
    match (a, b) {
        (JsValue::Number(x), JsValue::Number(y)) => x == y,
        _ => a == b,
    }
}

pub fn loose_equals(a: &JsValue, b: &JsValue) -> bool {
    use JsValue::*;
    match (a, b) {
        _ if a.is_nullish() || b.is_nullish() => a.is_nullish() && b.is_nullish(),
        (Number(_), Number(_))
        | (Str(_), Str(_))
        | (Bool(_), Bool(_))
        | (List(_), List(_))
        | (Object(_), Object(_)) => strict_equals(a, b),
        (Bool(_), _) => loose_equals(&Number(a.to_number()), b),
        (_, Bool(_)) => loose_equals(a, &Number(b.to_number())),
        (Number(_), Str(_)) | (Str(_), Number(_)) => a.to_number() == b.to_number(),
        (List(_) | Object(_), _) => loose_equals(&a.clone().to_primitive(), b),
        (_, List(_) | Object(_)) => loose_equals(a, &b.clone().to_primitive()),
        _ => false,
    }
}

fn compare(op: Op, a: JsValue, b: JsValue) -> bool {
    let (a, b) = (a.to_primitive(), b.to_primitive());
    if let (JsValue::Str(x), JsValue::Str(y)) = (&a, &b) {
        return match op {
            Op::Lt => x < y,
            Op::Le => x <= y,
            Op::Gt => x > y,
            _ => x >= y,
        };
    }
    let (x, y) = (a.to_number(), b.to_number());
    match op {
        Op::Lt => x < y,
        Op::Le => x <= y,
        Op::Gt => x > y,
        _ => x >= y,
    }
}

fn add(a: JsValue, b: JsValue) -> JsValue {
    let (a, b) = (a.to_primitive(), b.to_primitive());
    if matches!(a, JsValue::Str(_)) || matches!(b, JsValue::Str(_)) {
        JsValue::Str(a.to_display_string() + &b.to_display_string())
    } else {
        JsValue::Number(a.to_number() + b.to_number())
    }
}

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Names visible to an expression.
///
/// `field` exists so an implementation can serve `name.field` without
/// materializing all of `name` (a reactive state reads just that field).
pub trait Environment {
    /// Value bound to `name`, or `None` when the name is unbound.
    fn lookup(&self, name: &str) -> Option<JsValue>;

    /// `name.field`, or `None` when `name` is unbound.
    fn field(&self, name: &str, field: &str) -> Option<Result<JsValue, ExprError>> {
        self.lookup(name).map(|value| value.member(field))
    }
}

// =============================================================================
// EVALUATION
// =============================================================================

pub fn evaluate(expr: &Expr, env: &dyn Environment) -> Result<JsValue, ExprError> {
    match expr {
        Expr::Literal(Literal::Undefined) => Ok(JsValue::Undefined),
        Expr::Literal(Literal::Value(value)) => Ok(JsValue::from(value.clone())),
        Expr::Ident(name) => env.lookup(name).ok_or_else(|| ExprError::UnknownName {
            name: name.clone(),
        }),
        Expr::Member(object, property) => member_of(object, property, env),
        Expr::Index(object, index) => {
            let key = match evaluate(index, env)? {
                JsValue::Number(n) if n >= 0.0 && n == n.trunc() => format!("{}", n as u64),
                other => other.to_display_string(),
            };
            member_of(object, &key, env)
        }
        Expr::Unary(UnaryOp::Not, operand) => Ok(JsValue::Bool(!evaluate(operand, env)?.truthy())),
        Expr::Unary(UnaryOp::Neg, operand) => {
            Ok(JsValue::Number(-evaluate(operand, env)?.to_number()))
        }
        Expr::Binary(Op::And, left, right) => {
            let left = evaluate(left, env)?;
            if left.truthy() { evaluate(right, env) } else { Ok(left) }
        }
        Expr::Binary(Op::Or, left, right) => {
            let left = evaluate(left, env)?;
            if left.truthy() { Ok(left) } else { evaluate(right, env) }
        }
        Expr::Binary(op, left, right) => {
            let (a, b) = (evaluate(left, env)?, evaluate(right, env)?);
            Ok(match op {
                Op::Eq => JsValue::Bool(loose_equals(&a, &b)),
                Op::Ne => JsValue::Bool(!loose_equals(&a, &b)),
                Op::StrictEq => JsValue::Bool(strict_equals(&a, &b)),
                Op::StrictNe => JsValue::Bool(!strict_equals(&a, &b)),
                Op::Lt | Op::Le | Op::Gt | Op::Ge => JsValue::Bool(compare(*op, a, b)),
                Op::Add => add(a, b),
                Op::Sub => JsValue::Number(a.to_number() - b.to_number()),
                Op::Mul => JsValue::Number(a.to_number() * b.to_number()),
                Op::Div => JsValue::Number(a.to_number() / b.to_number()),
                Op::Rem => JsValue::Number(a.to_number() % b.to_number()),
                Op::And | Op::Or | Op::Not => {
                    return Err(ExprError::UnexpectedToken {
                        token: op.as_str().to_string(),
                        position: 0,
                    });
                }
            })
        }
    }
}

fn member_of(object: &Expr, property: &str, env: &dyn Environment) -> Result<JsValue, ExprError> {
    if let Expr::Ident(name) = object {
        return env.field(name, property).unwrap_or_else(|| {
            Err(ExprError::UnknownName { name: name.clone() })
        });
    }
    evaluate(object, env)?.member(property)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parser::parse;
    use serde_json::json;

    struct Vars(Map<String, Value>);

    impl Environment for Vars {
        fn lookup(&self, name: &str) -> Option<JsValue> {
            self.0.get(name).cloned().map(JsValue::from)
        }
    }

    fn env() -> Vars {
        let mut vars = Map::new();
        vars.insert(
            "state".into(),
            json!({
                "count": 3,
                "name": "Ada",
                "empty": "",
                "items": [{ "price": 2 }, { "price": 5 }],
                "flags": { "on": true },
                "none": null
            }),
        );
        Vars(vars)
    }

    fn eval(source: &str) -> Result<JsValue, ExprError> {
        evaluate(&parse(source)?, &env())
    }

    fn truthy(source: &str) -> bool {
        eval(source).unwrap().truthy()
    }

    #[test]
    fn comparisons_against_state() {
        assert!(truthy("state.count > 2"));
        assert!(truthy("state.count === 3"));
        assert!(!truthy("state.count === '3'"));
        assert!(truthy("state.count == '3'"));
        assert!(truthy("state.items.length == 2 && state.items[1].price >= 5"));
        assert!(truthy("state.flags.on"));
        assert!(truthy("state['name'] === 'Ada'"));
    }

    #[test]
    fn truthiness() {
        assert!(!truthy("state.empty"));
        assert!(!truthy("state.none"));
        assert!(!truthy("state.missing"));
        assert!(truthy("state.items"));
        assert!(!truthy("0"));
        assert!(truthy("!0"));
    }

    #[test]
    fn logical_operators_return_operands() {
        assert_eq!(eval("state.empty || 'fallback'").unwrap(), JsValue::Str("fallback".into()));
        assert_eq!(eval("state.count && state.name").unwrap(), JsValue::Str("Ada".into()));
        // short-circuit: the right side would fail
        assert_eq!(eval("false && nope").unwrap(), JsValue::Bool(false));
    }

    #[test]
    fn loose_equality_rules() {
        assert!(truthy("null == undefined"));
        assert!(!truthy("null === undefined"));
        assert!(!truthy("null == 0"));
        assert!(truthy("true == 1"));
        assert!(truthy("'' == 0"));
        assert!(!truthy("(0 / 0) == (0 / 0)"));
    }

    #[test]
    fn arithmetic_and_concatenation() {
        assert_eq!(eval("1 + 2 * 3").unwrap(), JsValue::Number(7.0));
        assert_eq!(eval("'n=' + state.count").unwrap(), JsValue::Str("n=3".into()));
        assert_eq!(eval("state.count % 2").unwrap(), JsValue::Number(1.0));
        assert_eq!(eval("-state.count").unwrap(), JsValue::Number(-3.0));
        assert!(truthy("'b' > 'a'"));
        assert!(truthy("'10' < 9 == false"));
    }

    #[test]
    fn failures() {
        assert_eq!(
            eval("window.alert"),
            Err(ExprError::UnknownName { name: "window".into() })
        );
        assert_eq!(
            eval("state.none.deep"),
            Err(ExprError::NotAnObject { property: "deep".into() })
        );
        assert!(eval("state.count >").is_err());
    }

    #[test]
    fn display_forms() {
        assert_eq!(display_value(&json!(1)), "1");
        assert_eq!(display_value(&json!(1.5)), "1.5");
        assert_eq!(display_value(&json!(2.0)), "2");
        assert_eq!(display_value(&json!([1, "a", null, true])), "1,a,,true");
        assert_eq!(display_value(&json!({ "a": 1 })), "[object Object]");
        assert_eq!(display_value(&json!(null)), "null");
        assert_eq!(JsValue::Undefined.to_display_string(), "undefined");
    }

    #[test]
    fn large_whole_numbers_print_every_digit() {
        assert_eq!(display_value(&json!(1e20)), "100000000000000000000");
        assert_eq!(display_value(&json!(-0.0)), "0");
        assert_eq!(
            add(JsValue::Number(1e20), JsValue::Str("!".into())),
            JsValue::Str("100000000000000000000!".into())
        );
    }
}
