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
use thiserror::Error;

/// A stylesheet failed to parse. Fatal for that stylesheet; recoverable for
/// the host, which may fall back to a previous version or surface the
/// message to a user.
#[derive(Debug, Error)]
#[error("parse error at {line}:{col}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub col: usize,
    pub message: String,
}

/// A map descriptor referenced a missing asset, contained malformed JSON, or
/// one of its stylesheets failed to parse. Fatal for the whole map load.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("malformed map descriptor: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("stylesheet {path} failed to parse: {source}")]
    Stylesheet { path: String, source: ParseError },
    #[error("missing asset: {0}")]
    MissingAsset(String),
}

/// An expression inside a compiled property could not be reduced to a form
/// the Mapnik-style translator understands (unsupported operator, a
/// symbolizer missing a required property). Logged and the offending
/// symbolizer/parameter is skipped; the surrounding style still loads.
#[derive(Debug, Error)]
pub enum TranslatorError {
    #[error("unsupported property '{0}' for symbolizer '{1}'")]
    UnsupportedProperty(String, &'static str),
    #[error("symbolizer '{0}' is missing required property '{1}'")]
    MissingRequiredProperty(&'static str, &'static str),
    #[error("expression for '{0}' did not reduce to a constant value")]
    UnreducedExpression(String),
}
