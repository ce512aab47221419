//! Convert SVG documents into Android VectorDrawable XML.
//!
//! ```
//! let out = svg2vd::convert(
//!     r#"<svg viewBox="0 0 100 100"><rect x="10" y="10" width="50" height="30" fill="red"/></svg>"#,
//! )
//! .unwrap();
//! assert!(out.warnings.is_empty());
//! assert!(out.document.to_xml().contains(r#"android:pathData="M10,10 L60,10 L60,40 L10,40 Z""#));
//! ```
//!
//! Conversion is lenient: anything a VectorDrawable cannot express is
//! dropped with a [`Warning`] and the rest of the document still converts.
//! Only an unreadable document is a [`ConvertError`].

use pest::iterators::Pair;
use pest_derive::Parser;

#[cfg(feature = "cli")]
pub mod batch;
pub mod color;
pub mod document;
pub mod dom;
pub mod errors;
pub mod log;
pub mod path;
pub mod shapes;
pub mod style;
pub mod transform;
pub mod types;
pub mod units;
pub mod vector_drawable;

pub use document::{Conversion, DocumentMapper};
pub use errors::{ConvertError, Warning};
pub use vector_drawable::{OutputDocument, PathNode};

/// Grammar for the SVG micro-syntaxes: path data, transforms, point lists,
/// lengths, viewBox and functional colors
#[derive(Parser)]
#[grammar = "svg.pest"]
pub struct SvgGrammar;

/// Value of a `number` pair. The grammar only admits valid floats.
pub(crate) fn number(pair: &Pair<'_, Rule>) -> f64 {
    pair.as_str().parse().unwrap_or_default()
}

/// Convert SVG source text into a VectorDrawable.
pub fn convert(source: &str) -> Result<Conversion, ConvertError> {
    let root = dom::parse(source)?;
    DocumentMapper::map(&root)
}
