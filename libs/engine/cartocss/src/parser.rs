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
use crate::error::ParseError;
use crate::stylesheet::StyleSheet;

lalrpop_util::lalrpop_mod!(
    #[allow(clippy::all)]
    grammar,
    "/grammar.rs"
);

/// Parse one `.mss` document. Line/column are recovered from the byte
/// offset lalrpop reports, since the grammar itself is offset-only.
pub fn parse(source: &str) -> Result<StyleSheet, ParseError> {
    let mut sheet = grammar::StyleSheetParser::new()
        .parse(source)
        .map_err(|e| to_parse_error(source, &e))?;
    sheet.assign_property_order();
    Ok(sheet)
}

fn to_parse_error<T: std::fmt::Debug>(
    source: &str,
    err: &lalrpop_util::ParseError<usize, T, &str>,
) -> ParseError {
    let offset = match err {
        lalrpop_util::ParseError::InvalidToken { location } => *location,
        lalrpop_util::ParseError::UnrecognizedEof { location, .. } => *location,
        lalrpop_util::ParseError::UnrecognizedToken { token, .. } => token.0,
        lalrpop_util::ParseError::ExtraToken { token } => token.0,
        lalrpop_util::ParseError::User { .. } => 0,
    };
    let (line, col) = line_col(source, offset);
    ParseError {
        line,
        col,
        message: format!("{:?}", err),
    }
}

fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for ch in source[..offset.min(source.len())].chars() {
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parses_empty_stylesheet() {
        let sheet = parse("").unwrap();
        assert!(sheet.elements.is_empty());
    }

    #[test]
    fn test_parses_variable_declaration() {
        let sheet = parse("@line-color: #ff0000;").unwrap();
        assert_eq!(sheet.variables().count(), 1);
    }

    #[test]
    fn test_parses_simple_rule_set() {
        let sheet = parse("#roads[zoom>=10] { line-color: #333333; line-width: 2; }").unwrap();
        assert_eq!(sheet.rule_sets().count(), 1);
    }

    #[test]
    fn test_rejects_unterminated_block() {
        assert!(parse("#roads { line-width: 2;").is_err());
    }

    #[test]
    fn test_parses_ternary_conditional_into_expression() {
        use crate::expression::Expression;
        use crate::stylesheet::{BlockElement, StyleSheetElement};

        let sheet = parse("#roads { line-width: zoom >= 10 ? 4 : 1; }").unwrap();
        let StyleSheetElement::RuleSet(rule_set) = &sheet.elements[0] else {
            panic!("expected a rule set");
        };
        let BlockElement::Property(prop) = &rule_set.block.elements[0] else {
            panic!("expected a property declaration");
        };
        assert!(matches!(prop.value.as_ref(), Expression::Conditional(..)));
    }
}
