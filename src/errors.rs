//! Error types with rich diagnostics using miette
//!
//! Document-level failures abort a single conversion. Element-level problems
//! are [`Warning`]s: the element is dropped or patched and conversion goes on.
//! Both carry byte spans into the SVG source so the CLI can point at them.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

// ============================================================================
// Document Errors
// ============================================================================

/// Errors that stop a whole document from converting
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum ConvertError {
    #[error("malformed XML: {message}")]
    #[diagnostic(code(svg2vd::document::xml))]
    Xml {
        message: String,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("root element is <{found}>, expected <svg>")]
    #[diagnostic(code(svg2vd::document::not_svg))]
    NotSvg {
        found: String,
        #[label("root element")]
        span: SourceSpan,
    },

    #[error("document has no root element")]
    #[diagnostic(code(svg2vd::document::empty))]
    EmptyDocument,

    #[error("cannot determine canvas dimensions")]
    #[diagnostic(
        code(svg2vd::document::missing_dimensions),
        help("give the root element a viewBox, or both width and height")
    )]
    MissingDimensions {
        #[label("no usable viewBox, width or height")]
        span: SourceSpan,
    },
}

// ============================================================================
// Element Warnings
// ============================================================================

/// Recoverable problems found while converting a single element
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum Warning {
    #[error("invalid length in `{attribute}`: {value:?}")]
    #[diagnostic(
        code(svg2vd::element::invalid_length),
        severity(Warning),
        help("supported units are px, pt, pc, in, mm, cm, dp or none")
    )]
    InvalidLength {
        attribute: String,
        value: String,
        #[label("attribute ignored")]
        span: SourceSpan,
    },

    #[error("unknown color {value:?}, using black")]
    #[diagnostic(code(svg2vd::element::unknown_color), severity(Warning))]
    UnknownColor {
        value: String,
        #[label("unrecognized color")]
        span: SourceSpan,
    },

    #[error("unsupported path command `{command}` dropped")]
    #[diagnostic(code(svg2vd::element::unsupported_path_command), severity(Warning))]
    UnsupportedPathCommand {
        command: String,
        #[label("in this path")]
        span: SourceSpan,
    },

    #[error("path data truncated: {detail}")]
    #[diagnostic(
        code(svg2vd::element::malformed_path_data),
        severity(Warning),
        help("everything up to the first error is kept")
    )]
    MalformedPathData {
        detail: String,
        #[label("in this path")]
        span: SourceSpan,
    },

    #[error("malformed point list: {detail}")]
    #[diagnostic(code(svg2vd::element::malformed_points), severity(Warning))]
    MalformedPoints {
        detail: String,
        #[label("in this element")]
        span: SourceSpan,
    },

    #[error("skipped <{element}>: {reason}")]
    #[diagnostic(code(svg2vd::element::skipped), severity(Warning))]
    SkippedElement {
        element: String,
        reason: String,
        #[label("not converted")]
        span: SourceSpan,
    },

    #[error("ignored `{attribute}`: {reason}")]
    #[diagnostic(code(svg2vd::element::unsupported_attribute), severity(Warning))]
    UnsupportedAttribute {
        attribute: String,
        reason: String,
        #[label("attribute ignored")]
        span: SourceSpan,
    },
}

impl Warning {
    /// Byte span of the offending element in the source document
    pub fn span(&self) -> SourceSpan {
        match self {
            Warning::InvalidLength { span, .. }
            | Warning::UnknownColor { span, .. }
            | Warning::UnsupportedPathCommand { span, .. }
            | Warning::MalformedPathData { span, .. }
            | Warning::MalformedPoints { span, .. }
            | Warning::SkippedElement { span, .. }
            | Warning::UnsupportedAttribute { span, .. } => *span,
        }
    }

    pub(crate) fn skipped(element: &str, reason: impl Into<String>, span: SourceSpan) -> Self {
        Warning::SkippedElement {
            element: element.to_string(),
            reason: reason.into(),
            span,
        }
    }
}

// ============================================================================
// Component Errors
// ============================================================================

/// Failure to interpret a length value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LengthError {
    #[error("not a number: {0:?}")]
    NotANumber(String),

    #[error("unsupported unit `{unit}`")]
    UnsupportedUnit { unit: String },

    #[error("value is not finite")]
    NotFinite,
}

/// Failure to interpret a color value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColorError {
    #[error("unknown color {0:?}")]
    UnknownColor(String),
}

impl ColorError {
    pub(crate) fn into_warning(self, span: SourceSpan) -> Warning {
        match self {
            ColorError::UnknownColor(value) => Warning::UnknownColor { value, span },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_span_is_shared_across_variants() {
        let span = SourceSpan::from((4, 10));
        let warnings = [
            Warning::skipped("text", "text is not supported", span),
            Warning::UnknownColor {
                value: "blurple".into(),
                span,
            },
            ColorError::UnknownColor("x".into()).into_warning(span),
        ];
        for w in &warnings {
            assert_eq!(w.span(), span);
        }
    }

    #[test]
    fn warnings_have_warning_severity() {
        let w = Warning::skipped("image", "raster images are not supported", (0, 1).into());
        assert_eq!(w.severity(), Some(miette::Severity::Warning));
        assert_eq!(w.to_string(), "skipped <image>: raster images are not supported");
    }

    #[test]
    fn missing_dimensions_has_help() {
        let e = ConvertError::MissingDimensions { span: (0, 4).into() };
        assert!(e.help().is_some());
    }
}
