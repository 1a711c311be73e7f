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
use crate::predicate::Predicate;
use std::rc::Rc;

use crate::expression::Expression;

/// `@name: expr;` at the top level or inside a rule set.
#[derive(Debug, Clone)]
pub struct VariableDeclaration {
    pub name: String,
    pub value: Rc<Expression>,
}

/// `name: expr;` inside a rule set's block.
///
/// `order` is the property's position in the whole stylesheet, assigned by
/// [`StyleSheet::assign_property_order`] once parsing finishes; it is the
/// innermost tiebreak in `RuleSpecificity`.
#[derive(Debug, Clone)]
pub struct PropertyDeclaration {
    pub name: String,
    pub value: Rc<Expression>,
    pub order: u32,
}

/// One comma-free selector chain, e.g. `#roads[class='highway']::fill`.
/// Stored as the flat list of predicates it compiles down to; attachment
/// (`::name`) is also folded in as a `Predicate::Attachment` for uniform
/// specificity counting and then stripped before runtime evaluation.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    pub predicates: Vec<Predicate>,
}

impl Selector {
    pub fn attachment(&self) -> Option<&str> {
        self.predicates.iter().find_map(|p| match p {
            Predicate::Attachment(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

/// A nested `{ ... }` block may itself contain declarations, nested rule
/// sets (for `&`-style combinators), or further nesting; we only need the
/// two leaf kinds CartoCSS actually uses at the tile-styling level.
#[derive(Debug, Clone)]
pub enum BlockElement {
    Variable(VariableDeclaration),
    Property(PropertyDeclaration),
    Nested(RuleSet),
}

#[derive(Debug, Clone, Default)]
pub struct Block {
    pub elements: Vec<BlockElement>,
}

#[derive(Debug, Clone)]
pub struct RuleSet {
    pub selectors: Vec<Selector>,
    pub block: Block,
}

#[derive(Debug, Clone)]
pub enum StyleSheetElement {
    Variable(VariableDeclaration),
    RuleSet(RuleSet),
}

/// One parsed `.mss` document.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    pub elements: Vec<StyleSheetElement>,
}

impl StyleSheet {
    pub fn rule_sets(&self) -> impl Iterator<Item = &RuleSet> {
        self.elements.iter().filter_map(|e| match e {
            StyleSheetElement::RuleSet(rs) => Some(rs),
            _ => None,
        })
    }

    pub fn variables(&self) -> impl Iterator<Item = &VariableDeclaration> {
        self.elements.iter().filter_map(|e| match e {
            StyleSheetElement::Variable(v) => Some(v),
            _ => None,
        })
    }

    /// Walk every `PropertyDecl` in source (depth-first) order and number it
    /// monotonically. The grammar builds declarations bottom-up, so this
    /// runs as a pass after parsing rather than inline in a grammar action.
    pub fn assign_property_order(&mut self) {
        let mut next = 0u32;
        for element in &mut self.elements {
            if let StyleSheetElement::RuleSet(rule_set) = element {
                assign_block_order(&mut rule_set.block, &mut next);
            }
        }
    }
}

fn assign_block_order(block: &mut Block, next: &mut u32) {
    for element in &mut block.elements {
        match element {
            BlockElement::Property(p) => {
                p.order = *next;
                *next += 1;
            }
            BlockElement::Nested(rule_set) => assign_block_order(&mut rule_set.block, next),
            BlockElement::Variable(_) => {}
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::predicate::Predicate;

    #[test]
    fn test_selector_attachment_lookup() {
        let sel = Selector {
            predicates: vec![
                Predicate::Layer("roads".into()),
                Predicate::Attachment("fill".into()),
            ],
        };
        assert_eq!(sel.attachment(), Some("fill"));
    }

    #[test]
    fn test_selector_without_attachment_is_none() {
        let sel = Selector {
            predicates: vec![Predicate::Layer("roads".into())],
        };
        assert_eq!(sel.attachment(), None);
    }
}
