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
use crate::compiler::{LayerAttachment, Property, PropertySet};
use crate::error::TranslatorError;
use crate::expression::{evaluate, ExpressionContext};
use crate::predicate::Predicate;
use crate::value::Value;
use log::warn;
use std::collections::HashMap;

/// The symbolizer families a property name prefix dispatches to. Mirrors
/// Mapnik's `*_SYMBOLIZER` property namespaces (`line-*`, `polygon-*`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolizerKind {
    Line,
    Polygon,
    Polygon3d,
    Point,
    Text,
    ShieldText,
    Marker,
}

fn symbolizer_prefix(kind: SymbolizerKind) -> &'static str {
    match kind {
        SymbolizerKind::Line => "line-",
        SymbolizerKind::Polygon => "polygon-",
        SymbolizerKind::Polygon3d => "building-",
        SymbolizerKind::Point => "point-",
        SymbolizerKind::Text => "text-",
        SymbolizerKind::ShieldText => "shield-",
        SymbolizerKind::Marker => "marker-",
    }
}

/// One translated symbolizer: the resolved values for every property that
/// had the matching prefix, prefix stripped, still keyed by zoom-dependent
/// expression where the property didn't reduce to a constant.
#[derive(Debug, Clone, Default)]
pub struct Symbolizer {
    pub kind: Option<SymbolizerKind>,
    pub values: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default)]
pub struct Rule {
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub filter: Vec<Predicate>,
    pub symbolizers: Vec<Symbolizer>,
}

/// Property-name-prefix dispatch into Mapnik-shaped symbolizers, the same
/// role `CartoCSSCompiler`'s Mapnik-targeting translator plays in the
/// original: a style property set says nothing about *how* it groups into
/// draw calls until a translator decides.
pub struct MapnikTranslator {
    predefined_fields: Option<HashMap<String, Value>>,
}

impl MapnikTranslator {
    pub fn new() -> Self {
        Self {
            predefined_fields: None,
        }
    }

    /// One `Rule` per `PropertySet` in the attachment: each `PropertySet`'s
    /// active filters become that rule's runtime condition.
    pub fn translate_attachment(
        &self,
        attachment: &LayerAttachment,
    ) -> Result<Vec<Rule>, TranslatorError> {
        attachment
            .property_sets
            .iter()
            .map(|set| self.translate_property_set(set))
            .collect()
    }

    fn translate_property_set(&self, set: &PropertySet) -> Result<Rule, TranslatorError> {
        let properties: Vec<&Property> = set.properties.values().collect();
        let (min_zoom, max_zoom) = self.zoom_range(&properties);
        let mut by_kind: HashMap<Option<SymbolizerKind>, Symbolizer> = HashMap::new();

        for prop in &properties {
            if prop.name == "min-zoom" || prop.name == "max-zoom" {
                continue;
            }
            let (kind, short_name) = self.classify(&prop.name);
            let value = self.resolve_constant(prop)?;
            let entry = by_kind.entry(kind).or_insert_with(|| Symbolizer {
                kind,
                values: HashMap::new(),
            });
            entry.values.insert(short_name.to_string(), value);
        }

        Ok(Rule {
            min_zoom,
            max_zoom,
            filter: set.filters.clone(),
            symbolizers: by_kind.into_values().collect(),
        })
    }

    fn classify<'a>(&self, name: &'a str) -> (Option<SymbolizerKind>, &'a str) {
        for kind in [
            SymbolizerKind::Line,
            SymbolizerKind::Polygon3d,
            SymbolizerKind::Polygon,
            SymbolizerKind::ShieldText,
            SymbolizerKind::Text,
            SymbolizerKind::Marker,
            SymbolizerKind::Point,
        ] {
            let prefix = symbolizer_prefix(kind);
            if let Some(short) = name.strip_prefix(prefix) {
                return (Some(kind), short);
            }
        }
        (None, name)
    }

    fn resolve_constant(&self, prop: &Property) -> Result<Value, TranslatorError> {
        let ctx = ExpressionContext {
            predefined_fields: self.predefined_fields.as_ref(),
            ..Default::default()
        };
        match evaluate(&prop.value, &ctx).into_value() {
            Some(v) => Ok(v),
            None => {
                warn!("property '{}' did not reduce to a constant; skipping", prop.name);
                Err(TranslatorError::UnreducedExpression(prop.name.clone()))
            }
        }
    }

    fn zoom_range(&self, properties: &[&Property]) -> (u8, u8) {
        let ctx = ExpressionContext::default();
        let min = properties
            .iter()
            .find(|p| p.name == "min-zoom")
            .and_then(|p| evaluate(&p.value, &ctx).into_value())
            .and_then(|v| v.as_i64())
            .map(|z| z.clamp(0, 24) as u8)
            .unwrap_or(0);
        let max = properties
            .iter()
            .find(|p| p.name == "max-zoom")
            .and_then(|p| evaluate(&p.value, &ctx).into_value())
            .and_then(|v| v.as_i64())
            .map(|z| z.clamp(0, 24) as u8)
            .unwrap_or(24);
        (min, max)
    }
}

impl Default for MapnikTranslator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn value_as_color(values: &HashMap<String, Value>, name: &str) -> Option<Color> {
    values.get(name).and_then(Value::as_color)
}

pub fn value_as_f32(values: &HashMap<String, Value>, name: &str) -> Option<f32> {
    values.get(name).and_then(Value::as_f64).map(|f| f as f32)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compiler::{calculate_rule_specificity, RuleSpecificity};
    use crate::expression::Expression;
    use std::rc::Rc;

    fn prop(name: &str, value: Value, spec: RuleSpecificity) -> Property {
        Property {
            name: name.to_string(),
            value: Rc::new(Expression::Const(value)),
            specificity: spec,
        }
    }

    fn single_property_set(properties: HashMap<String, Property>) -> LayerAttachment {
        LayerAttachment {
            name: None,
            order: 0,
            property_sets: vec![PropertySet {
                filters: vec![],
                properties,
            }],
        }
    }

    #[test]
    fn test_classifies_line_properties_by_prefix() {
        let translator = MapnikTranslator::new();
        let spec = calculate_rule_specificity(&[], 0);
        let attachment = single_property_set(HashMap::from([(
            "line-width".to_string(),
            prop("line-width", Value::Integer(2), spec),
        )]));
        let rules = translator.translate_attachment(&attachment).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].symbolizers.len(), 1);
        assert_eq!(rules[0].symbolizers[0].kind, Some(SymbolizerKind::Line));
        assert_eq!(
            rules[0].symbolizers[0].values.get("width"),
            Some(&Value::Integer(2))
        );
    }

    #[test]
    fn test_zoom_range_defaults_to_full_span() {
        let translator = MapnikTranslator::new();
        let attachment = single_property_set(HashMap::new());
        let rules = translator.translate_attachment(&attachment).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!((rules[0].min_zoom, rules[0].max_zoom), (0, 24));
    }

    #[test]
    fn test_one_rule_is_emitted_per_property_set() {
        let translator = MapnikTranslator::new();
        let spec = calculate_rule_specificity(&[], 0);
        let attachment = LayerAttachment {
            name: None,
            order: 0,
            property_sets: vec![
                PropertySet {
                    filters: vec![],
                    properties: HashMap::from([(
                        "line-width".to_string(),
                        prop("line-width", Value::Integer(1), spec),
                    )]),
                },
                PropertySet {
                    filters: vec![Predicate::Op {
                        op: crate::predicate::PredicateOp::Gte,
                        is_field: true,
                        name: "zoom".to_string(),
                        value: Value::Integer(14),
                    }],
                    properties: HashMap::from([(
                        "line-width".to_string(),
                        prop("line-width", Value::Integer(3), spec),
                    )]),
                },
            ],
        };
        let rules = translator.translate_attachment(&attachment).unwrap();
        assert_eq!(rules.len(), 2);
        assert!(rules.iter().any(|r| r.filter.is_empty()));
        assert!(rules.iter().any(|r| !r.filter.is_empty()));
    }
}
