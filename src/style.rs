//! Presentation attributes and their inheritance down the tree.
//!
//! A child starts from its parent's resolved [`StyleAttributes`] and
//! overrides whatever it sets itself. Inline `style` declarations beat
//! presentation attributes on the same element. No selector matching is
//! done: `<style>` sheets are ignored.

use miette::SourceSpan;

use crate::color::{self, CanonicalColor, Paint};
use crate::dom::Element;
use crate::errors::Warning;
use crate::types::{Length, Opacity};
use crate::units::{self, Unit};

/// Properties read from attributes or inline style
const PROPERTIES: &[&str] = &[
    "fill",
    "fill-opacity",
    "fill-rule",
    "stroke",
    "stroke-width",
    "stroke-opacity",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "opacity",
    "color",
    "visibility",
    "display",
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

/// The declared style of one element: attributes, then inline declarations
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Declarations {
    entries: Vec<(String, String)>,
}

impl Declarations {
    pub fn of(el: &Element) -> Self {
        let mut entries: Vec<(String, String)> = PROPERTIES
            .iter()
            .filter_map(|&name| el.attr(name).map(|v| (name.to_string(), v.trim().to_string())))
            .collect();

        if let Some(inline) = el.attr("style") {
            for declaration in inline.split(';') {
                let Some((name, value)) = declaration.split_once(':') else {
                    continue;
                };
                let name = name.trim().to_ascii_lowercase();
                let value = value.trim().trim_end_matches("!important").trim();
                if PROPERTIES.contains(&name.as_str()) && !value.is_empty() {
                    entries.push((name, value.to_string()));
                }
            }
        }
        Self { entries }
    }

    /// Last declared value, `inherit` reads as undeclared
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.eq_ignore_ascii_case("inherit"))
    }

    /// `display="none"` removes the element and its subtree
    pub fn hides_subtree(&self) -> bool {
        self.get("display").is_some_and(|v| v.eq_ignore_ascii_case("none"))
    }
}

/// Resolved paint properties at one point of the tree
#[derive(Clone, Debug, PartialEq)]
pub struct StyleAttributes {
    /// `None` while nothing on the ancestor chain set it
    pub fill: Option<Paint>,
    pub stroke: Option<Paint>,
    pub stroke_width: Option<Length>,
    /// Product of every `opacity` on the ancestor chain
    pub opacity: Opacity,
    pub fill_opacity: Opacity,
    pub stroke_opacity: Opacity,
    pub fill_rule: FillRule,
    pub line_cap: Option<LineCap>,
    pub line_join: Option<LineJoin>,
    pub miter_limit: Option<f64>,
    /// Target of `currentColor`
    pub color: CanonicalColor,
    pub visible: bool,
}

impl Default for StyleAttributes {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            stroke_width: None,
            opacity: Opacity::OPAQUE,
            fill_opacity: Opacity::OPAQUE,
            stroke_opacity: Opacity::OPAQUE,
            fill_rule: FillRule::NonZero,
            line_cap: None,
            line_join: None,
            miter_limit: None,
            color: CanonicalColor::BLACK,
            visible: true,
        }
    }
}

impl StyleAttributes {
    /// The style of a child that declares `decls`
    pub fn cascade(&self, decls: &Declarations, span: SourceSpan, warnings: &mut Vec<Warning>) -> Self {
        let mut next = self.clone();

        // `color` first: `currentColor` on the same element refers to it
        if let Some(raw) = decls.get("color") {
            match color::normalize(raw) {
                Ok(Paint::Color(c)) => next.color = c,
                Ok(_) => {}
                Err(e) => warnings.push(e.into_warning(span)),
            }
        }
        if let Some(raw) = decls.get("fill") {
            next.fill = Some(paint(raw, span, warnings));
        }
        if let Some(raw) = decls.get("stroke") {
            next.stroke = Some(paint(raw, span, warnings));
        }
        if let Some(raw) = decls.get("stroke-width") {
            match units::convert(raw, Unit::Px) {
                Ok(w) if w.raw() >= 0.0 => next.stroke_width = Some(w),
                _ => warnings.push(Warning::InvalidLength {
                    attribute: "stroke-width".to_string(),
                    value: raw.to_string(),
                    span,
                }),
            }
        }
        if let Some(o) = fraction(decls, "opacity", span, warnings) {
            next.opacity = self.opacity * o;
        }
        if let Some(o) = fraction(decls, "fill-opacity", span, warnings) {
            next.fill_opacity = o;
        }
        if let Some(o) = fraction(decls, "stroke-opacity", span, warnings) {
            next.stroke_opacity = o;
        }

        if let Some(raw) = decls.get("fill-rule") {
            match raw.to_ascii_lowercase().as_str() {
                "evenodd" => next.fill_rule = FillRule::EvenOdd,
                "nonzero" => next.fill_rule = FillRule::NonZero,
                _ => warnings.push(unsupported("fill-rule", raw, span)),
            }
        }
        if let Some(raw) = decls.get("stroke-linecap") {
            next.line_cap = match raw.to_ascii_lowercase().as_str() {
                "butt" => Some(LineCap::Butt),
                "round" => Some(LineCap::Round),
                "square" => Some(LineCap::Square),
                _ => {
                    warnings.push(unsupported("stroke-linecap", raw, span));
                    next.line_cap
                }
            };
        }
        if let Some(raw) = decls.get("stroke-linejoin") {
            next.line_join = match raw.to_ascii_lowercase().as_str() {
                "miter" | "miter-clip" => Some(LineJoin::Miter),
                "round" => Some(LineJoin::Round),
                "bevel" => Some(LineJoin::Bevel),
                _ => {
                    warnings.push(unsupported("stroke-linejoin", raw, span));
                    next.line_join
                }
            };
        }
        if let Some(raw) = decls.get("stroke-miterlimit") {
            match raw.parse::<f64>() {
                Ok(limit) if limit >= 1.0 => next.miter_limit = Some(limit),
                _ => warnings.push(unsupported("stroke-miterlimit", raw, span)),
            }
        }
        if let Some(raw) = decls.get("visibility") {
            next.visible = raw.eq_ignore_ascii_case("visible");
        }

        next
    }

    /// Fill as emitted: black when never set, transparent for `none`
    pub fn fill_color(&self) -> CanonicalColor {
        match self.fill {
            None => CanonicalColor::BLACK.with_opacity(self.opacity * self.fill_opacity),
            Some(paint) => paint
                .resolve(self.color)
                .map_or(CanonicalColor::TRANSPARENT, |c| {
                    c.with_opacity(self.opacity * self.fill_opacity)
                }),
        }
    }

    /// Stroke as emitted, `None` when there is nothing to stroke
    pub fn stroke_color(&self) -> Option<CanonicalColor> {
        let color = self.stroke?.resolve(self.color)?;
        Some(color.with_opacity(self.opacity * self.stroke_opacity))
    }

    /// Stroke width in user units, 1 when stroked without a width
    pub fn effective_stroke_width(&self) -> Length {
        if self.stroke_color().is_some() {
            self.stroke_width.unwrap_or(Length(1.0))
        } else {
            Length::ZERO
        }
    }
}

fn paint(raw: &str, span: SourceSpan, warnings: &mut Vec<Warning>) -> Paint {
    color::normalize(raw).unwrap_or_else(|e| {
        crate::log::debug!(value = raw, "unknown color, falling back to black");
        warnings.push(e.into_warning(span));
        Paint::Color(CanonicalColor::BLACK)
    })
}

/// A number in `0..=1` or a percentage
fn fraction(
    decls: &Declarations,
    name: &str,
    span: SourceSpan,
    warnings: &mut Vec<Warning>,
) -> Option<Opacity> {
    let raw = decls.get(name)?;
    match units::parse_dimension(raw) {
        Ok((v, None)) => Some(Opacity::new(v)),
        Ok((v, Some("%"))) => Some(Opacity::new(v / 100.0)),
        _ => {
            warnings.push(unsupported(name, raw, span));
            None
        }
    }
}

fn unsupported(attribute: &str, value: &str, span: SourceSpan) -> Warning {
    Warning::UnsupportedAttribute {
        attribute: attribute.to_string(),
        reason: format!("unrecognized value {value:?}"),
        span,
    }
}
