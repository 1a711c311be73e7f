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
//! CartoCSS stylesheet parsing, cascade compilation, and translation into
//! a Mapnik-shaped property model that a renderer can consume directly.

mod color;
mod compiler;
mod error;
mod expression;
mod loader;
mod parser;
mod predicate;
mod stylesheet;
mod translator;
mod value;

pub use color::Color;
pub use compiler::{
    calculate_rule_specificity, LayerAttachment, Property, PropertySet, RuleSpecificity,
    StyleCompiler,
};
pub use error::{LoaderError, ParseError, TranslatorError};
pub use expression::{evaluate, BinaryOp, Expression, ExpressionContext, Reduced, UnaryOp};
pub use loader::{MapDescriptor, NutiParameter};
pub use parser::parse;
pub use predicate::{Predicate, PredicateContext, PredicateOp, Tribool};
pub use stylesheet::{
    Block, BlockElement, PropertyDeclaration, RuleSet, Selector, StyleSheet, StyleSheetElement,
    VariableDeclaration,
};
pub use translator::{MapnikTranslator, Rule, Symbolizer, SymbolizerKind};
pub use value::Value;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_end_to_end_compiles_a_small_stylesheet() {
        let sheet = parse(
            "@main-color: #336699;\n\
             #roads[zoom>=12] { line-color: @main-color; line-width: 2; }",
        )
        .unwrap();
        let compiler = StyleCompiler::new(&sheet, None);
        let attachments = compiler.compile_layer(Some("roads"));
        assert_eq!(attachments.len(), 1);
        let translator = MapnikTranslator::new();
        let rules = translator.translate_attachment(&attachments[0]).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].symbolizers.len(), 1);
        assert_eq!(rules[0].symbolizers[0].kind, Some(SymbolizerKind::Line));
    }
}
