// This file is part of Nitrogen.
//
// Nitrogen is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// Nitrogen is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with Nitrogen.  If not, see <http://www.gnu.org/licenses/>.
use crate::value::Value;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    And,
    Or,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Match,
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Eq => "=",
            BinaryOp::Neq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::Match => "=~",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        };
        write!(f, "{}", s)
    }
}

/// An expression tree. Immutable once built; nodes are shared via `Rc`
/// rather than owned uniquely, since the same sub-expression (a variable's
/// value, say) is frequently referenced by many properties.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Const(Value),
    FieldOrVar { is_field: bool, name: String },
    List(Vec<Rc<Expression>>),
    Unary(UnaryOp, Rc<Expression>),
    Binary(BinaryOp, Rc<Expression>, Rc<Expression>),
    Conditional(Rc<Expression>, Rc<Expression>, Rc<Expression>),
    Function(String, Vec<Rc<Expression>>),
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Const(v) => write!(f, "{}", v),
            Expression::FieldOrVar { is_field, name } => {
                write!(f, "{}{}", if *is_field { "" } else { "@" }, name)
            }
            Expression::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Expression::Unary(_, e) => write!(f, "(!{})", e),
            Expression::Binary(op, a, b) => write!(f, "({} {} {})", a, op, b),
            Expression::Conditional(c, a, b) => write!(f, "({} ? {} : {})", c, a, b),
            Expression::Function(name, args) => {
                write!(f, "{}(", name)?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", a)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// The four name-maps an expression may be evaluated against: built-in and
/// user variables, built-in and per-feature fields. All four are optional
/// so a context can be constructed for, say, map-level compilation (no
/// fields at all).
#[derive(Default)]
pub struct ExpressionContext<'a> {
    pub predefined_variables: Option<&'a HashMap<String, Value>>,
    pub variables: Option<&'a HashMap<String, Rc<Expression>>>,
    pub predefined_fields: Option<&'a HashMap<String, Value>>,
    pub fields: Option<&'a HashMap<String, Value>>,
}

/// Partial-evaluation result: either a concrete value, or a (possibly
/// partially reduced) expression still depending on unavailable context.
#[derive(Debug, Clone)]
pub enum Reduced {
    Value(Value),
    Expr(Rc<Expression>),
}

impl Reduced {
    pub fn into_value(self) -> Option<Value> {
        match self {
            Reduced::Value(v) => Some(v),
            Reduced::Expr(_) => None,
        }
    }

    pub fn as_expr(&self) -> Rc<Expression> {
        match self {
            Reduced::Value(v) => Rc::new(Expression::Const(v.clone())),
            Reduced::Expr(e) => e.clone(),
        }
    }
}

pub fn evaluate(expr: &Rc<Expression>, ctx: &ExpressionContext) -> Reduced {
    match expr.as_ref() {
        Expression::Const(v) => Reduced::Value(v.clone()),

        Expression::FieldOrVar { is_field, name } => {
            if *is_field {
                if let Some(v) = ctx.predefined_fields.and_then(|m| m.get(name)) {
                    return Reduced::Value(v.clone());
                }
                if let Some(v) = ctx.fields.and_then(|m| m.get(name)) {
                    return Reduced::Value(v.clone());
                }
            } else {
                if let Some(v) = ctx.predefined_variables.and_then(|m| m.get(name)) {
                    return Reduced::Value(v.clone());
                }
                if let Some(e) = ctx.variables.and_then(|m| m.get(name)) {
                    return evaluate(e, ctx);
                }
            }
            Reduced::Expr(expr.clone())
        }

        Expression::List(items) => {
            let reduced: Vec<Reduced> = items.iter().map(|e| evaluate(e, ctx)).collect();
            if reduced.iter().all(|r| matches!(r, Reduced::Value(_))) {
                let values = reduced.into_iter().map(|r| r.into_value().unwrap()).collect();
                Reduced::Value(Value::List(values))
            } else {
                let rebuilt = reduced.iter().map(Reduced::as_expr).collect();
                Reduced::Expr(Rc::new(Expression::List(rebuilt)))
            }
        }

        Expression::Unary(op, inner) => {
            let r = evaluate(inner, ctx);
            match (&r, op) {
                (Reduced::Value(v), UnaryOp::Not) => match v.as_bool() {
                    Some(b) => Reduced::Value(Value::Boolean(!b)),
                    None => Reduced::Expr(Rc::new(Expression::Unary(*op, r.as_expr()))),
                },
                (Reduced::Value(v), UnaryOp::Neg) => {
                    if let Some(i) = v.as_i64() {
                        Reduced::Value(Value::Integer(-i))
                    } else if let Some(f) = v.as_f64() {
                        Reduced::Value(Value::float(-f))
                    } else {
                        Reduced::Expr(Rc::new(Expression::Unary(*op, r.as_expr())))
                    }
                }
                _ => Reduced::Expr(Rc::new(Expression::Unary(*op, r.as_expr()))),
            }
        }

        Expression::Binary(op, lhs, rhs) => {
            let rl = evaluate(lhs, ctx);
            let rr = evaluate(rhs, ctx);
            if let (Reduced::Value(a), Reduced::Value(b)) = (&rl, &rr) {
                if let Some(result) = apply_binary(*op, a, b) {
                    return Reduced::Value(result);
                }
            }
            Reduced::Expr(Rc::new(Expression::Binary(*op, rl.as_expr(), rr.as_expr())))
        }

        Expression::Conditional(cond, then_e, else_e) => {
            let rc = evaluate(cond, ctx);
            // Both branches are evaluated eagerly regardless of whether
            // `cond` itself reduces, mirroring the original's eager
            // evaluation of both arms before inspecting the condition.
            let rt = evaluate(then_e, ctx);
            let re = evaluate(else_e, ctx);
            if let Reduced::Value(Value::Boolean(b)) = rc {
                return if b { rt } else { re };
            }
            Reduced::Expr(Rc::new(Expression::Conditional(
                rc.as_expr(),
                rt.as_expr(),
                re.as_expr(),
            )))
        }

        Expression::Function(name, args) => {
            let reduced: Vec<Reduced> = args.iter().map(|a| evaluate(a, ctx)).collect();
            if reduced.iter().all(|r| matches!(r, Reduced::Value(_))) {
                let values: Vec<Value> = reduced.iter().map(|r| r.clone().into_value().unwrap()).collect();
                if let Some(v) = apply_function(name, &values) {
                    return Reduced::Value(v);
                }
            }
            let rebuilt = reduced.iter().map(Reduced::as_expr).collect();
            Reduced::Expr(Rc::new(Expression::Function(name.clone(), rebuilt)))
        }
    }
}

fn apply_binary(op: BinaryOp, a: &Value, b: &Value) -> Option<Value> {
    use BinaryOp::*;
    match op {
        And => Some(Value::Boolean(a.as_bool()? && b.as_bool()?)),
        Or => Some(Value::Boolean(a.as_bool()? || b.as_bool()?)),
        Eq | Neq | Lt | Lte | Gt | Gte => Some(Value::Boolean(compare(op, a, b))),
        Match => {
            let (s, pat) = (a.as_str(), b.as_str());
            Some(Value::Boolean(match (s, pat) {
                (Some(s), Some(pat)) => Regex::new(pat).map(|re| re.is_match(s)).unwrap_or(false),
                _ => false,
            }))
        }
        Add => apply_add(a, b),
        Sub => apply_arith(a, b, |x, y| x - y, |c1, c2| c1.sub(c2)),
        Mul => apply_mul(a, b),
        Div => apply_div(a, b),
    }
}

/// EQ/NEQ/LT/LTE/GT/GTE: null-vs-null and mismatched-type defaults mirror
/// the original's `CompOp<OpImpl, NullResult, MismatchResult>` template;
/// same-variant (or int/float-promoted) pairs use the real comparison.
pub(crate) fn compare(op: BinaryOp, a: &Value, b: &Value) -> bool {
    use BinaryOp::*;
    let null_result = matches!(op, Eq | Lte | Gte);
    let mismatch_result = matches!(op, Neq);

    if matches!(a, Value::Null) && matches!(b, Value::Null) {
        return null_result;
    }
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return match op {
            Eq => x == y,
            Neq => x != y,
            Lt => x < y,
            Lte => x <= y,
            Gt => x > y,
            Gte => x >= y,
            _ => unreachable!(),
        };
    }
    if let (Value::String(x), Value::String(y)) = (a, b) {
        return match op {
            Eq => x == y,
            Neq => x != y,
            Lt => x < y,
            Lte => x <= y,
            Gt => x > y,
            Gte => x >= y,
            _ => unreachable!(),
        };
    }
    if let (Value::Boolean(x), Value::Boolean(y)) = (a, b) {
        return match op {
            Eq => x == y,
            Neq => x != y,
            _ => mismatch_result,
        };
    }
    if let (Value::Color(x), Value::Color(y)) = (a, b) {
        return match op {
            Eq => x == y,
            Neq => x != y,
            _ => mismatch_result,
        };
    }
    mismatch_result
}

fn apply_add(a: &Value, b: &Value) -> Option<Value> {
    // String coercion takes priority over arithmetic, exactly as in the
    // original: if either side is a string, concatenate the coerced other.
    if matches!(a, Value::String(_)) {
        return Some(Value::String(format!(
            "{}{}",
            a.as_str().unwrap(),
            b.to_coerced_string()
        )));
    }
    if matches!(b, Value::String(_)) {
        return Some(Value::String(format!(
            "{}{}",
            a.to_coerced_string(),
            b.as_str().unwrap()
        )));
    }
    if let (Value::Color(x), Value::Color(y)) = (a, b) {
        return Some(Value::Color(x.add(*y)));
    }
    apply_arith(a, b, |x, y| x + y, |_, _| unreachable!())
}

fn apply_arith(
    a: &Value,
    b: &Value,
    f: impl Fn(f64, f64) -> f64,
    color_f: impl Fn(crate::color::Color, crate::color::Color) -> crate::color::Color,
) -> Option<Value> {
    if let (Value::Color(x), Value::Color(y)) = (a, b) {
        return Some(Value::Color(color_f(*x, *y)));
    }
    if let (Value::Integer(x), Value::Integer(y)) = (a, b) {
        return Some(Value::Integer(f(*x as f64, *y as f64) as i64));
    }
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return Some(Value::float(f(x, y)));
    }
    None
}

fn apply_mul(a: &Value, b: &Value) -> Option<Value> {
    if let (Value::Color(c), Some(k)) = (a, b.as_f64()) {
        return Some(Value::Color(c.scale(k as f32)));
    }
    if let (Some(k), Value::Color(c)) = (a.as_f64(), b) {
        return Some(Value::Color(c.scale(k as f32)));
    }
    apply_arith(a, b, |x, y| x * y, |_, _| unreachable!())
}

/// Only integer division by zero is left unreduced; float and `Color`
/// division by zero divides through to `inf`, matching the original's
/// `DivOp` which guards only the `long long / long long` case.
fn apply_div(a: &Value, b: &Value) -> Option<Value> {
    if let (Value::Integer(x), Value::Integer(y)) = (a, b) {
        if *y == 0 {
            return None;
        }
        return Some(Value::Integer(x / y));
    }
    if let (Value::Color(c), Some(k)) = (a, b.as_f64()) {
        return Some(Value::Color(c.scale(1.0 / k as f32)));
    }
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return Some(Value::float(x / y));
    }
    None
}

/// `url`, `rgb`, `rgba`, `mix`, `lighten`, `darken`, `saturate`,
/// `desaturate`, `fadein`, `fadeout`. Unknown function/arity falls through
/// to `None`, which the caller turns into "stays unreduced" rather than a
/// hard parse failure — the same swallow-and-rebuild behavior the original
/// applies uniformly to function calls.
fn apply_function(name: &str, args: &[Value]) -> Option<Value> {
    use crate::color::Color;
    let get_color = |v: &Value| v.as_color();
    let get_float = |v: &Value| v.as_f64().map(|f| f as f32);
    match (name, args.len()) {
        ("url", 1) => Some(Value::String(args[0].to_coerced_string())),
        ("rgb", 3) => {
            let r = get_float(&args[0])? / 255.0;
            let g = get_float(&args[1])? / 255.0;
            let b = get_float(&args[2])? / 255.0;
            Some(Value::Color(Color::from_rgba(r, g, b, 1.0)))
        }
        ("rgba", 4) => {
            let r = get_float(&args[0])? / 255.0;
            let g = get_float(&args[1])? / 255.0;
            let b = get_float(&args[2])? / 255.0;
            let a = get_float(&args[3])?;
            Some(Value::Color(Color::from_rgba(r, g, b, a)))
        }
        ("mix", 3) => {
            let c1 = get_color(&args[0])?;
            let c2 = get_color(&args[1])?;
            let w = get_float(&args[2])?;
            Some(Value::Color(c1.mix(c2, w)))
        }
        ("lighten", 2) => Some(Value::Color(get_color(&args[0])?.lighten(get_float(&args[1])?))),
        ("darken", 2) => Some(Value::Color(
            get_color(&args[0])?.lighten(-get_float(&args[1])?),
        )),
        ("saturate", 2) => Some(Value::Color(
            get_color(&args[0])?.saturate(get_float(&args[1])?),
        )),
        ("desaturate", 2) => Some(Value::Color(
            get_color(&args[0])?.saturate(-get_float(&args[1])?),
        )),
        ("fadein", 2) => Some(Value::Color(get_color(&args[0])?.fade(get_float(&args[1])?))),
        ("fadeout", 2) => Some(Value::Color(
            get_color(&args[0])?.fade(-get_float(&args[1])?),
        )),
        _ => None,
    }
}
