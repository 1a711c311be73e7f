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
use crate::expression::{self, BinaryOp, ExpressionContext};
use crate::value::Value;
use regex::Regex;

/// Three-valued logic: `Indeterminate` means "depends on data we don't have
/// here" and must flow through the compiler without being treated as
/// either `True` or `False`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tribool {
    True,
    False,
    Indeterminate,
}

impl Tribool {
    pub fn from_bool(b: bool) -> Self {
        if b {
            Tribool::True
        } else {
            Tribool::False
        }
    }

    pub fn is_true(self) -> bool {
        self == Tribool::True
    }

    pub fn is_false(self) -> bool {
        self == Tribool::False
    }

    pub fn not(self) -> Self {
        match self {
            Tribool::True => Tribool::False,
            Tribool::False => Tribool::True,
            Tribool::Indeterminate => Tribool::Indeterminate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Match,
}

/// A single selector predicate. `Selector`s in a `RuleSet` require ALL of
/// their predicates to hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches only at the map (root) level, i.e. no enclosing layer.
    Map,
    Layer(String),
    Class(String),
    /// Never evaluated at runtime: the compiler strips it out of the
    /// filter list and folds its name into the attachment string.
    Attachment(String),
    Op {
        op: PredicateOp,
        is_field: bool,
        name: String,
        value: Value,
    },
}

pub struct PredicateContext<'a> {
    pub layer_name: Option<&'a str>,
    pub expr: ExpressionContext<'a>,
}

fn resolve_field_or_var(ctx: &PredicateContext, is_field: bool, name: &str) -> Option<Value> {
    if is_field {
        if let Some(v) = ctx.expr.predefined_fields.and_then(|m| m.get(name)) {
            return Some(v.clone());
        }
        ctx.expr.fields.and_then(|m| m.get(name)).cloned()
    } else {
        if let Some(v) = ctx.expr.predefined_variables.and_then(|m| m.get(name)) {
            return Some(v.clone());
        }
        ctx.expr
            .variables
            .and_then(|m| m.get(name))
            .and_then(|e| expression::evaluate(e, &ctx.expr).into_value())
    }
}

fn as_binary_op(op: PredicateOp) -> Option<BinaryOp> {
    Some(match op {
        PredicateOp::Eq => BinaryOp::Eq,
        PredicateOp::Neq => BinaryOp::Neq,
        PredicateOp::Lt => BinaryOp::Lt,
        PredicateOp::Lte => BinaryOp::Lte,
        PredicateOp::Gt => BinaryOp::Gt,
        PredicateOp::Gte => BinaryOp::Gte,
        PredicateOp::Match => return None,
    })
}

impl Predicate {
    pub fn evaluate(&self, ctx: &PredicateContext) -> Tribool {
        match self {
            Predicate::Map => Tribool::from_bool(ctx.layer_name.is_none()),
            Predicate::Layer(name) => Tribool::from_bool(ctx.layer_name == Some(name.as_str())),
            Predicate::Class(cls) => {
                let field = ctx
                    .expr
                    .predefined_fields
                    .and_then(|m| m.get("class"))
                    .or_else(|| ctx.expr.fields.and_then(|m| m.get("class")));
                match field {
                    None => Tribool::Indeterminate,
                    Some(Value::String(s)) => Tribool::from_bool(s == cls),
                    Some(_) => Tribool::False,
                }
            }
            Predicate::Attachment(_) => Tribool::Indeterminate,
            Predicate::Op {
                op,
                is_field,
                name,
                value,
            } => match resolve_field_or_var(ctx, *is_field, name) {
                None => Tribool::Indeterminate,
                Some(resolved) => match op {
                    PredicateOp::Match => {
                        let (s, pat) = (resolved.as_str(), value.as_str());
                        Tribool::from_bool(match (s, pat) {
                            (Some(s), Some(pat)) => {
                                Regex::new(pat).map(|re| re.is_match(s)).unwrap_or(false)
                            }
                            _ => false,
                        })
                    }
                    _ => Tribool::from_bool(expression::compare(
                        as_binary_op(*op).unwrap(),
                        &resolved,
                        value,
                    )),
                },
            },
        }
    }

    /// `true` iff every context in which `other` holds also satisfies
    /// `self`. Used by the compiler to dedupe and fold property sets.
    pub fn contains(&self, other: &Predicate) -> Tribool {
        match (self, other) {
            (Predicate::Layer(a), Predicate::Layer(b)) => Tribool::from_bool(a == b),
            (Predicate::Class(a), Predicate::Class(b)) => {
                if a == b {
                    Tribool::True
                } else {
                    Tribool::False
                }
            }
            (
                Predicate::Op {
                    op: op1,
                    is_field: f1,
                    name: n1,
                    value: v1,
                },
                Predicate::Op {
                    op: op2,
                    is_field: f2,
                    name: n2,
                    value: v2,
                },
            ) if f1 == f2 && n1 == n2 => op_contains(*op1, v1, *op2, v2),
            (Predicate::Map, Predicate::Map) => Tribool::True,
            _ => Tribool::Indeterminate,
        }
    }

    /// `false` iff no context satisfies both `self` and `other`.
    pub fn intersects(&self, other: &Predicate) -> Tribool {
        match (self, other) {
            (Predicate::Layer(a), Predicate::Layer(b)) => self.contains(other).and(|| {
                let _ = (a, b);
                Tribool::Indeterminate
            }),
            (Predicate::Class(a), Predicate::Class(b)) => Tribool::from_bool(a == b),
            (
                Predicate::Op {
                    op: op1,
                    is_field: f1,
                    name: n1,
                    value: v1,
                },
                Predicate::Op {
                    op: op2,
                    is_field: f2,
                    name: n2,
                    value: v2,
                },
            ) if f1 == f2 && n1 == n2 => op_intersects(*op1, v1, *op2, v2),
            _ => Tribool::Indeterminate,
        }
    }
}

// Small helper so `intersects`'s Layer arm can reuse `contains`'s result
// (a Layer predicate can only intersect something it is equal to).
trait TriboolAndThen {
    fn and(self, f: impl FnOnce() -> Tribool) -> Tribool;
}
impl TriboolAndThen for Tribool {
    fn and(self, f: impl FnOnce() -> Tribool) -> Tribool {
        match self {
            Tribool::True => Tribool::True,
            Tribool::False => Tribool::False,
            Tribool::Indeterminate => f(),
        }
    }
}

fn op_contains(op1: PredicateOp, v1: &Value, op2: PredicateOp, v2: &Value) -> Tribool {
    use PredicateOp::*;
    let num = |v: &Value| v.as_f64();
    match (op1, op2) {
        (Eq, Eq) => Tribool::from_bool(v1 == v2),
        (Eq, _) => Tribool::False,
        (Neq, Eq) => Tribool::from_bool(v1 != v2),
        (Neq, Neq) => Tribool::from_bool(v1 == v2),
        (Neq, _) => Tribool::Indeterminate,
        (Lt, Lt) | (Lt, Lte) => match (num(v1), num(v2)) {
            (Some(a), Some(b)) => Tribool::from_bool(if op2 == Lte { a > b } else { a >= b }),
            _ => Tribool::Indeterminate,
        },
        (Lte, Lt) | (Lte, Lte) => match (num(v1), num(v2)) {
            (Some(a), Some(b)) => Tribool::from_bool(a >= b),
            _ => Tribool::Indeterminate,
        },
        (Gt, Gt) | (Gt, Gte) => match (num(v1), num(v2)) {
            (Some(a), Some(b)) => Tribool::from_bool(if op2 == Gte { a < b } else { a <= b }),
            _ => Tribool::Indeterminate,
        },
        (Gte, Gt) | (Gte, Gte) => match (num(v1), num(v2)) {
            (Some(a), Some(b)) => Tribool::from_bool(a <= b),
            _ => Tribool::Indeterminate,
        },
        _ => Tribool::Indeterminate,
    }
}

fn op_intersects(op1: PredicateOp, v1: &Value, op2: PredicateOp, v2: &Value) -> Tribool {
    use PredicateOp::*;
    let num = |v: &Value| v.as_f64();
    match (op1, op2) {
        (Match, _) | (_, Match) => Tribool::Indeterminate,
        (Eq, Eq) => Tribool::from_bool(v1 == v2),
        (Eq, Neq) => Tribool::from_bool(v1 != v2),
        (Neq, Eq) => Tribool::from_bool(v1 != v2),
        (Neq, Neq) => Tribool::True,
        (Lt, Gt) | (Lt, Gte) | (Lte, Gt) | (Lte, Gte) => match (num(v1), num(v2)) {
            (Some(a), Some(b)) => Tribool::from_bool(a > b),
            _ => Tribool::Indeterminate,
        },
        (Gt, Lt) | (Gt, Lte) | (Gte, Lt) | (Gte, Lte) => match (num(v1), num(v2)) {
            (Some(a), Some(b)) => Tribool::from_bool(b > a),
            _ => Tribool::Indeterminate,
        },
        (Lt, Lt) | (Lt, Lte) | (Lte, Lt) | (Lte, Lte) => Tribool::True,
        (Gt, Gt) | (Gt, Gte) | (Gte, Gt) | (Gte, Gte) => Tribool::True,
        _ => Tribool::Indeterminate,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn op(op: PredicateOp, name: &str, value: Value) -> Predicate {
        Predicate::Op {
            op,
            is_field: true,
            name: name.into(),
            value,
        }
    }

    #[test]
    fn test_eq_predicates_on_disjoint_values_are_disjoint() {
        let p1 = op(PredicateOp::Eq, "x", Value::Integer(1));
        let p2 = op(PredicateOp::Eq, "x", Value::Integer(2));
        assert_eq!(p1.intersects(&p2), Tribool::False);
        assert_eq!(p1.contains(&p2), Tribool::False);
    }

    #[test]
    fn test_lt_contains_tighter_lt() {
        let wide = op(PredicateOp::Lt, "x", Value::Integer(5));
        let tight = op(PredicateOp::Lt, "x", Value::Integer(3));
        assert_eq!(wide.contains(&tight), Tribool::True);
        assert_eq!(tight.contains(&wide), Tribool::False);
    }

    #[test]
    fn test_lt_and_gt_intersect_when_ranges_overlap() {
        let lt5 = op(PredicateOp::Lt, "x", Value::Integer(5));
        let gt3 = op(PredicateOp::Gt, "x", Value::Integer(3));
        assert_eq!(lt5.intersects(&gt3), Tribool::True);
        let gt10 = op(PredicateOp::Gt, "x", Value::Integer(10));
        assert_eq!(lt5.intersects(&gt10), Tribool::False);
    }

    #[test]
    fn test_match_is_always_indeterminate() {
        let m = op(PredicateOp::Match, "x", Value::String("a.*".into()));
        let eq = op(PredicateOp::Eq, "x", Value::String("abc".into()));
        assert_eq!(m.contains(&eq), Tribool::Indeterminate);
        assert_eq!(m.intersects(&eq), Tribool::Indeterminate);
    }

    #[test]
    fn test_class_predicate_indeterminate_without_field() {
        let ctx = PredicateContext {
            layer_name: Some("roads"),
            expr: ExpressionContext::default(),
        };
        assert_eq!(Predicate::Class("foo".into()).evaluate(&ctx), Tribool::Indeterminate);
    }
}
