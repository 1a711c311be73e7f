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
use crate::color::Color;
use ordered_float::OrderedFloat;
use std::fmt;

/// A runtime stylesheet value: the tagged union every `Expression` reduces
/// to once it no longer depends on unavailable context. Variant order
/// mirrors the original `boost::variant<blank, bool, long long, double,
/// Color, string, vector<Value>>`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(OrderedFloat<f64>),
    Color(Color),
    String(String),
    List(Vec<Value>),
}

impl Value {
    pub fn float(v: f64) -> Self {
        Value::Float(OrderedFloat(v))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(f.0),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Value::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// Stringify for the `+` operator's string-coercion rule: numbers
    /// render without the `Value(...)` wrapper, matching the original's use
    /// of `lexical_cast<string>`.
    pub fn to_coerced_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.0.to_string(),
            Value::Color(c) => c.to_string(),
            Value::String(s) => s.clone(),
            Value::List(items) => items
                .iter()
                .map(Value::to_coerced_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_coerced_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Color> for Value {
    fn from(v: Color) -> Self {
        Value::Color(v)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(Value::Integer(3).as_f64(), Some(3.0));
        assert_eq!(Value::float(3.5).as_f64(), Some(3.5));
        assert_eq!(Value::Boolean(true).as_f64(), None);
    }

    #[test]
    fn test_string_coercion_of_number() {
        assert_eq!(Value::Integer(3).to_coerced_string(), "3");
        assert_eq!(Value::float(3.5).to_coerced_string(), "3.5");
    }

    #[test]
    fn test_equality_is_exact_per_variant() {
        assert_ne!(Value::Integer(3), Value::float(3.0));
        assert_eq!(Value::Integer(3), Value::Integer(3));
    }
}
