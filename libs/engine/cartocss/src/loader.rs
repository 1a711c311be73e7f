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
use crate::error::LoaderError;
use crate::parser::parse;
use crate::stylesheet::StyleSheet;
use crate::value::Value;
use serde::Deserialize;
use std::collections::HashMap;

/// One `nutiparameters` entry: a default value plus an optional named-enum
/// table a host UI can offer the user (e.g. `{ "basic": "#336699", "dark":
/// "#112233" }`). Only `default` feeds compilation here; resolving a named
/// variant is a host concern (spec §1 Non-goals: no CLI/config UI).
#[derive(Debug, Clone, Deserialize)]
pub struct NutiParameter {
    pub default: serde_json::Value,
    #[serde(default)]
    pub values: HashMap<String, serde_json::Value>,
}

/// The raw JSON shape from spec §6: `styles` (file paths to concatenate in
/// order), `layers` (names in reverse drawing order), `nutiparameters`
/// (parameter defaults available as stylesheet variables).
#[derive(Debug, Clone, Deserialize)]
pub struct MapDescriptor {
    #[serde(default)]
    pub styles: Vec<String>,
    #[serde(default)]
    pub layers: Vec<String>,
    #[serde(default)]
    pub nutiparameters: HashMap<String, NutiParameter>,
}

impl MapDescriptor {
    pub fn parse(source: &str) -> Result<Self, LoaderError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Layers in the draw order the renderer wants (spec: the descriptor
    /// lists them in *reverse* drawing order).
    pub fn draw_order(&self) -> Vec<&str> {
        self.layers.iter().rev().map(String::as_str).collect()
    }

    /// `nutiparameters` defaults as predefined stylesheet variables, ready
    /// to pass to `StyleCompiler::new`'s `predefined_variables`.
    pub fn predefined_variables(&self) -> HashMap<String, Value> {
        self.nutiparameters
            .iter()
            .map(|(name, param)| (name.clone(), json_to_value(&param.default)))
            .collect()
    }

    /// Reads and concatenates every referenced stylesheet, in order, via
    /// `read` (a host-supplied asset loader — §1 Non-goals excludes any
    /// concrete filesystem/network access from this crate). A stylesheet
    /// that fails to parse is wrapped in `LoaderError::Stylesheet` naming
    /// its path and aborts the whole load, matching spec §7.
    pub fn load_stylesheet(
        &self,
        mut read: impl FnMut(&str) -> Result<String, LoaderError>,
    ) -> Result<StyleSheet, LoaderError> {
        let mut elements = Vec::new();
        for path in &self.styles {
            let source = read(path)?;
            let sheet = parse(&source).map_err(|source| LoaderError::Stylesheet {
                path: path.clone(),
                source,
            })?;
            elements.extend(sheet.elements);
        }
        Ok(StyleSheet { elements })
    }
}

fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else {
                Value::float(n.as_f64().unwrap_or(0.0))
            }
        }
        serde_json::Value::String(s) => crate::color::Color::parse(s)
            .map_or_else(|_| Value::String(s.clone()), Value::Color),
        serde_json::Value::Array(items) => Value::List(items.iter().map(json_to_value).collect()),
        serde_json::Value::Object(_) => Value::Null,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::stylesheet::StyleSheetElement;

    #[test]
    fn test_parses_descriptor_with_layers_and_parameters() {
        let descriptor = MapDescriptor::parse(
            r#"{"styles": ["a.mss"], "layers": ["water", "roads", "buildings"],
                "nutiparameters": {"main-color": {"default": "#336699"}}}"#,
        )
        .unwrap();
        assert_eq!(descriptor.draw_order(), vec!["buildings", "roads", "water"]);
        let vars = descriptor.predefined_variables();
        assert!(matches!(vars["main-color"], Value::Color(_)));
    }

    #[test]
    fn test_malformed_json_is_a_loader_error() {
        assert!(MapDescriptor::parse("not json").is_err());
    }

    #[test]
    fn test_concatenates_stylesheets_in_order() {
        let descriptor = MapDescriptor::parse(r#"{"styles": ["a.mss", "b.mss"]}"#).unwrap();
        let sources: HashMap<&str, &str> = [
            ("a.mss", "@x: 1;"),
            ("b.mss", "#roads { line-width: 2; }"),
        ]
        .into_iter()
        .collect();
        let sheet = descriptor
            .load_stylesheet(|path| {
                sources
                    .get(path)
                    .map(|s| s.to_string())
                    .ok_or_else(|| LoaderError::MissingAsset(path.to_string()))
            })
            .unwrap();
        assert_eq!(sheet.elements.len(), 2);
        assert!(matches!(sheet.elements[1], StyleSheetElement::RuleSet(_)));
    }

    #[test]
    fn test_missing_stylesheet_surfaces_missing_asset() {
        let descriptor = MapDescriptor::parse(r#"{"styles": ["missing.mss"]}"#).unwrap();
        let err = descriptor
            .load_stylesheet(|path| Err(LoaderError::MissingAsset(path.to_string())))
            .unwrap_err();
        assert!(matches!(err, LoaderError::MissingAsset(_)));
    }
}
