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
use crate::expression::{evaluate, Expression, ExpressionContext};
use crate::predicate::{Predicate, PredicateContext, Tribool};
use crate::stylesheet::{Block, BlockElement, RuleSet, StyleSheet};
use crate::value::Value;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// One compiled `name: expr` pair, tagged with the specificity of the rule
/// that produced it so later (more specific) declarations of the same name
/// win the cascade.
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub value: Rc<Expression>,
    pub specificity: RuleSpecificity,
}

/// `(layer-count, class-count, other-filter-count, source-order)`, compared
/// lexicographically in that order; higher wins. Layer and class predicates
/// are counted separately from field/op filters (`[zoom>=5]`, `[x=1]`, ...)
/// because a layer or class match is meant to outweigh any number of field
/// filters, the same way an id selector outweighs classes in CSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RuleSpecificity {
    pub layer_count: u32,
    pub class_count: u32,
    pub other_filter_count: u32,
    pub order: u32,
}

pub fn calculate_rule_specificity(predicates: &[Predicate], order: u32) -> RuleSpecificity {
    let mut layer_count = 0;
    let mut class_count = 0;
    let mut other_filter_count = 0;
    for p in predicates {
        match p {
            Predicate::Layer(_) => layer_count += 1,
            Predicate::Class(_) => class_count += 1,
            Predicate::Op { .. } => other_filter_count += 1,
            Predicate::Map | Predicate::Attachment(_) => {}
        }
    }
    RuleSpecificity {
        layer_count,
        class_count,
        other_filter_count,
        order,
    }
}

/// An ordered list of active filter predicates plus the fields they guard.
/// One `PropertySet` becomes exactly one translated `Rule`: its filters are
/// the rule's runtime condition, its properties are the rule's symbolizer
/// inputs.
#[derive(Debug, Clone, Default)]
pub struct PropertySet {
    pub filters: Vec<Predicate>,
    pub properties: HashMap<String, Property>,
}

/// A layer's attachments, each with its own folded, cascade-ordered list of
/// `PropertySet`s.
#[derive(Debug, Clone)]
pub struct LayerAttachment {
    pub name: Option<String>,
    pub order: u32,
    pub property_sets: Vec<PropertySet>,
}

/// A property as gathered during descent, still tagged with the runtime
/// filters active at its declaration site. Consumed by `fold_into_property_sets`.
#[derive(Debug, Clone)]
struct CollectedProperty {
    property: Property,
    filters: Vec<Predicate>,
}

/// Reduces a whole stylesheet to the per-layer, per-attachment property
/// lists a translator can turn into symbolizers. Mirrors the original
/// CartoCSS compiler's two passes: gather every matching rule's
/// declarations (with their still-live runtime filters), then fold same-named
/// declarations by specificity into a minimal set of filtered `PropertySet`s.
pub struct StyleCompiler<'a> {
    sheet: &'a StyleSheet,
    variables: HashMap<String, Rc<Expression>>,
    predefined_variables: Option<&'a HashMap<String, Value>>,
}

impl<'a> StyleCompiler<'a> {
    pub fn new(sheet: &'a StyleSheet, predefined_variables: Option<&'a HashMap<String, Value>>) -> Self {
        let variables = sheet
            .variables()
            .map(|v| (v.name.clone(), v.value.clone()))
            .collect();
        Self {
            sheet,
            variables,
            predefined_variables,
        }
    }

    fn expr_context(&self) -> ExpressionContext {
        ExpressionContext {
            predefined_variables: self.predefined_variables,
            variables: Some(&self.variables),
            predefined_fields: None,
            fields: None,
        }
    }

    /// Rule sets that could apply anywhere inside `layer_name` (or, if
    /// `layer_name` is `None`, at the map root), regardless of class/field
    /// filters that can only be resolved per-feature.
    pub fn compile_layer(&self, layer_name: Option<&str>) -> Vec<LayerAttachment> {
        let mut raw: HashMap<Option<String>, Vec<CollectedProperty>> = HashMap::new();
        for rule_set in self.sheet.rule_sets() {
            self.walk_rule_set(rule_set, &[], &None, layer_name, &mut raw);
        }
        raw.into_iter()
            .map(|(name, props)| {
                let order = props
                    .iter()
                    .map(|cp| cp.property.specificity.order)
                    .min()
                    .unwrap_or(0);
                LayerAttachment {
                    name,
                    order,
                    property_sets: fold_into_property_sets(props),
                }
            })
            .collect()
    }

    /// Compiles only the `Map`-scoped rule sets (background color, etc).
    /// Unlike `compile_layer`, properties are not folded into `PropertySet`s:
    /// only properties with no remaining runtime filter and a fully-constant
    /// value make it into `mapProperties`, since there is no per-feature
    /// filter evaluation at the map level.
    pub fn compile_map(&self) -> Vec<Property> {
        let mut raw: HashMap<Option<String>, Vec<CollectedProperty>> = HashMap::new();
        for rule_set in self.sheet.rule_sets() {
            self.walk_rule_set(rule_set, &[], &None, None, &mut raw);
        }
        raw.remove(&None)
            .unwrap_or_default()
            .into_iter()
            .filter(|cp| cp.filters.is_empty())
            .filter_map(|cp| {
                evaluate(&cp.property.value, &ExpressionContext::default()).into_value()?;
                Some(cp.property)
            })
            .collect()
    }

    /// Descend one `RuleSet`'s selectors. `caller_filters` is the cumulative,
    /// *unoptimized* predicate chain from every enclosing selector (§4.4
    /// step 4): each selector here re-evaluates the whole chain against
    /// `layer_name` so that predicates already known `true` higher up still
    /// count toward specificity without leaking into the runtime filter.
    fn walk_rule_set(
        &self,
        rule_set: &RuleSet,
        caller_filters: &[Predicate],
        caller_attachment: &Option<String>,
        layer_name: Option<&str>,
        raw: &mut HashMap<Option<String>, Vec<CollectedProperty>>,
    ) {
        let ctx = PredicateContext {
            layer_name,
            expr: self.expr_context(),
        };
        for selector in &rule_set.selectors {
            let mut cumulative = caller_filters.to_vec();
            cumulative.extend(selector.predicates.iter().cloned());

            let mut runtime_filter = Vec::new();
            let mut attachment = caller_attachment.clone();
            let mut unreachable = false;
            for predicate in &cumulative {
                match predicate {
                    Predicate::Attachment(name) => {
                        attachment = Some(match attachment {
                            Some(existing) => format!("{existing}::{name}"),
                            None => name.clone(),
                        });
                    }
                    other => match other.evaluate(&ctx) {
                        Tribool::False => unreachable = true,
                        Tribool::True => {}
                        Tribool::Indeterminate => runtime_filter.push(other.clone()),
                    },
                }
            }
            if unreachable {
                continue;
            }

            self.collect_block(&rule_set.block, &attachment, &cumulative, &runtime_filter, layer_name, raw);
        }
    }

    fn collect_block(
        &self,
        block: &Block,
        attachment: &Option<String>,
        cumulative: &[Predicate],
        runtime_filter: &[Predicate],
        layer_name: Option<&str>,
        raw: &mut HashMap<Option<String>, Vec<CollectedProperty>>,
    ) {
        let mut seen_fields: HashSet<&str> = HashSet::new();
        for elem in &block.elements {
            match elem {
                BlockElement::Property(p) => {
                    // First declaration of a field wins within one block.
                    if !seen_fields.insert(p.name.as_str()) {
                        continue;
                    }
                    // Resolve local and predefined variables now, while
                    // still leaving field references (per-feature, unknown
                    // until render time) as an unreduced expression tree.
                    let value = evaluate(&p.value, &self.expr_context()).as_expr();
                    let specificity = calculate_rule_specificity(cumulative, p.order);
                    raw.entry(attachment.clone()).or_default().push(CollectedProperty {
                        property: Property {
                            name: p.name.clone(),
                            value,
                            specificity,
                        },
                        filters: runtime_filter.to_vec(),
                    });
                }
                BlockElement::Nested(nested) => {
                    self.walk_rule_set(nested, cumulative, attachment, layer_name, raw);
                }
                BlockElement::Variable(_) => {}
            }
        }
    }
}

/// §4.4: sort by descending specificity, then for each property try to
/// extend every compatible existing `PropertySet` before also considering a
/// fresh singleton set of its own.
fn fold_into_property_sets(mut items: Vec<CollectedProperty>) -> Vec<PropertySet> {
    items.sort_by(|a, b| b.property.specificity.cmp(&a.property.specificity));

    let mut sets: Vec<PropertySet> = Vec::new();
    for item in items {
        let CollectedProperty { property, filters } = item;

        let mut idx = 0;
        while idx < sets.len() {
            if sets[idx].properties.contains_key(&property.name) {
                idx += 1;
                continue;
            }
            if let Some(combined) = combine_filters(&sets[idx].filters, &filters) {
                if combined == sets[idx].filters {
                    sets[idx].properties.insert(property.name.clone(), property.clone());
                } else {
                    let mut properties = sets[idx].properties.clone();
                    properties.insert(property.name.clone(), property.clone());
                    sets.insert(idx, PropertySet { filters: combined, properties });
                    idx += 1; // don't re-visit the set we just inserted
                }
            }
            idx += 1;
        }

        if !is_redundant_fresh_set(&sets, &filters, &property) {
            let mut properties = HashMap::new();
            properties.insert(property.name.clone(), property);
            sets.push(PropertySet { filters, properties });
        }
    }
    sets
}

/// Combines two filter-predicate conjunctions, deduplicating by containment
/// (keeping the tighter of two comparable filters) and aborting (`None`) if
/// any pair of filters is provably disjoint.
fn combine_filters(existing: &[Predicate], incoming: &[Predicate]) -> Option<Vec<Predicate>> {
    let mut combined = existing.to_vec();
    for p in incoming {
        if combined.iter().any(|q| p.intersects(q) == Tribool::False) {
            return None;
        }
        if let Some(idx) = combined.iter().position(|q| q.contains(p) == Tribool::True) {
            combined[idx] = p.clone();
            continue;
        }
        if combined.iter().any(|q| p.contains(q) == Tribool::True) {
            continue;
        }
        combined.push(p.clone());
    }
    Some(combined)
}

/// A fresh singleton set for `property` is redundant if some earlier
/// (higher-specificity) set already assigns the same field the same
/// expression under filters the candidate's filters already imply.
fn is_redundant_fresh_set(sets: &[PropertySet], filters: &[Predicate], property: &Property) -> bool {
    sets.iter().any(|earlier| {
        let same_value = earlier
            .properties
            .get(&property.name)
            .is_some_and(|p| *p.value == *property.value);
        same_value
            && earlier
                .filters
                .iter()
                .all(|ef| filters.iter().any(|cf| cf == ef || cf.contains(ef) == Tribool::True))
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_more_specific_rule_wins_within_its_own_filter() {
        let sheet = parse(
            "#roads { line-width: 1; } \
             #roads[zoom>=14] { line-width: 3; }",
        )
        .unwrap();
        let compiler = StyleCompiler::new(&sheet, None);
        let attachments = compiler.compile_layer(Some("roads"));
        let default = attachments.iter().find(|a| a.name.is_none()).unwrap();
        assert_eq!(default.property_sets.len(), 2);

        let filtered = default
            .property_sets
            .iter()
            .find(|ps| !ps.filters.is_empty())
            .unwrap();
        assert_eq!(
            crate::expression::evaluate(&filtered.properties["line-width"].value, &ExpressionContext::default())
                .into_value(),
            Some(Value::Integer(3))
        );

        let unconditional = default
            .property_sets
            .iter()
            .find(|ps| ps.filters.is_empty())
            .unwrap();
        assert_eq!(
            crate::expression::evaluate(&unconditional.properties["line-width"].value, &ExpressionContext::default())
                .into_value(),
            Some(Value::Integer(1))
        );
    }

    #[test]
    fn test_disjoint_layer_is_skipped() {
        let sheet = parse("#water { polygon-fill: #0000ff; }").unwrap();
        let compiler = StyleCompiler::new(&sheet, None);
        let attachments = compiler.compile_layer(Some("roads"));
        assert!(attachments.is_empty());
    }

    #[test]
    fn test_attachments_are_split() {
        let sheet = parse(
            "#roads { line-width: 1; } \
             #roads::case { line-width: 3; }",
        )
        .unwrap();
        let compiler = StyleCompiler::new(&sheet, None);
        let attachments = compiler.compile_layer(Some("roads"));
        assert_eq!(attachments.len(), 2);
        assert!(attachments.iter().any(|a| a.name.as_deref() == Some("case")));
    }

    /// Worked example S1: a layer plus a single op-filter folds into one
    /// `PropertySet` with specificity `(1, 0, 1, order)`.
    #[test]
    fn test_worked_example_s1_folds_into_single_filtered_property_set() {
        let sheet = parse("@c: red; #roads[zoom>=5] { line-color: @c; line-width: 2; }").unwrap();
        let compiler = StyleCompiler::new(&sheet, None);
        let attachments = compiler.compile_layer(Some("roads"));
        let default = attachments.iter().find(|a| a.name.is_none()).unwrap();

        assert_eq!(default.property_sets.len(), 1);
        let set = &default.property_sets[0];
        assert_eq!(set.filters.len(), 1);
        assert_eq!(set.properties.len(), 2);

        let spec = set.properties["line-width"].specificity;
        assert_eq!(
            (spec.layer_count, spec.class_count, spec.other_filter_count),
            (1, 0, 1)
        );
    }

    /// Worked example S2: two disjoint op-filters under a shared
    /// unconditional property fold into three distinct `PropertySet`s.
    #[test]
    fn test_worked_example_s2_produces_three_disjoint_property_sets() {
        let sheet = parse(
            "#r { line-color: red; [x=1] { line-width: 1; } [x=2] { line-width: 2; } }",
        )
        .unwrap();
        let compiler = StyleCompiler::new(&sheet, None);
        let attachments = compiler.compile_layer(Some("r"));
        let default = attachments.iter().find(|a| a.name.is_none()).unwrap();

        assert_eq!(default.property_sets.len(), 3);
        for set in &default.property_sets {
            assert!(set.properties.contains_key("line-color"));
        }
    }

    #[test]
    fn test_compile_map_only_keeps_unfiltered_constant_properties() {
        let sheet = parse("@bg: #f0f0f0; Map { background-color: @bg; } #roads[zoom>=5] { line-width: 1; }")
            .unwrap();
        let compiler = StyleCompiler::new(&sheet, None);
        let map_properties = compiler.compile_map();
        assert_eq!(map_properties.len(), 1);
        assert_eq!(map_properties[0].name, "background-color");
    }
}
