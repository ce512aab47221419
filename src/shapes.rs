//! Geometry elements and their conversion to normalized paths
//!
//! Each SVG primitive is its own type, validated once when it is read from
//! the element tree. After that `to_path` cannot fail.

use enum_dispatch::enum_dispatch;
use glam::{DVec2, dvec2};
use pest::Parser;

use crate::dom::Element;
use crate::errors::Warning;
use crate::path::{self, PathData};
use crate::types::Length;
use crate::units::{self, Unit};
use crate::{Rule, SvgGrammar};

/// Control point offset for a quarter circle of radius 1
pub const KAPPA: f64 = 0.5522847498307935;

/// Conversion of a validated shape into path commands
#[enum_dispatch]
pub trait ToPath {
    fn to_path(&self) -> PathData;
}

/// Every element kind that produces geometry
#[enum_dispatch(ToPath)]
#[derive(Clone, Debug, PartialEq)]
pub enum GeometryElement {
    Line(Line),
    Rect(Rect),
    Circle(Circle),
    Ellipse(Ellipse),
    Polygon(Polygon),
    Polyline(Polyline),
    Path(Path),
}

impl GeometryElement {
    /// Whether elements with this name are read as geometry
    pub fn is_geometry(name: &str) -> bool {
        matches!(
            name,
            "line" | "rect" | "circle" | "ellipse" | "polygon" | "polyline" | "path"
        )
    }

    /// Read and validate a geometry element.
    ///
    /// Problems that only drop an attribute are pushed onto `warnings`.
    /// Problems that make the element unusable are returned as the error.
    pub fn from_element(el: &Element, warnings: &mut Vec<Warning>) -> Result<Self, Warning> {
        let mut attrs = Attrs { el, warnings };
        let shape: GeometryElement = match el.name.as_str() {
            "line" => Line {
                from: attrs.point("x1", "y1"),
                to: attrs.point("x2", "y2"),
            }
            .into(),
            "rect" => Rect::read(&mut attrs)?.into(),
            "circle" => Circle {
                center: attrs.point("cx", "cy"),
                r: attrs.required("r")?,
            }
            .into(),
            "ellipse" => Ellipse {
                center: attrs.point("cx", "cy"),
                rx: attrs.required("rx")?,
                ry: attrs.required("ry")?,
            }
            .into(),
            "polygon" => Polygon {
                points: attrs.points()?,
            }
            .into(),
            "polyline" => Polyline {
                points: attrs.points()?,
            }
            .into(),
            "path" => Path::read(&mut attrs)?.into(),
            other => return Err(Warning::skipped(other, "not a geometry element", el.span)),
        };
        Ok(shape)
    }
}

// ============================================================================
// Attribute access
// ============================================================================

struct Attrs<'a> {
    el: &'a Element,
    warnings: &'a mut Vec<Warning>,
}

impl Attrs<'_> {
    /// A length attribute in dp. Unparseable values warn and read as absent.
    fn length(&mut self, name: &str) -> Option<Length> {
        let raw = self.el.attr(name)?;
        match units::convert(raw, Unit::Px) {
            Ok(len) => Some(len),
            Err(e) => {
                crate::log::debug!(attribute = name, error = %e, "ignoring length");
                self.warnings.push(Warning::InvalidLength {
                    attribute: name.to_string(),
                    value: raw.to_string(),
                    span: self.el.span,
                });
                None
            }
        }
    }

    fn coord(&mut self, name: &str) -> f64 {
        self.length(name).map_or(0.0, Length::raw)
    }

    fn point(&mut self, x: &str, y: &str) -> DVec2 {
        dvec2(self.coord(x), self.coord(y))
    }

    /// A non-negative length the element cannot do without
    fn required(&mut self, name: &str) -> Result<Length, Warning> {
        let Some(len) = self.length(name) else {
            return Err(self.skip(format!("missing `{name}`")));
        };
        Length::try_non_negative(len.raw()).map_err(|e| self.skip(format!("`{name}`: {e}")))
    }

    /// An optional non-negative length. Negative values warn and read as absent.
    fn optional_non_negative(&mut self, name: &str) -> Option<Length> {
        let len = self.length(name)?;
        match Length::try_non_negative(len.raw()) {
            Ok(len) => Some(len),
            Err(_) => {
                self.warnings.push(Warning::InvalidLength {
                    attribute: name.to_string(),
                    value: self.el.attr(name).unwrap_or_default().to_string(),
                    span: self.el.span,
                });
                None
            }
        }
    }

    fn points(&mut self) -> Result<Vec<DVec2>, Warning> {
        let raw = self.el.attr("points").unwrap_or_default();
        let mut numbers = Vec::new();
        if let Some(list) = SvgGrammar::parse(Rule::points, raw).ok().and_then(|mut p| p.next()) {
            for pair in list.into_inner() {
                match pair.as_rule() {
                    Rule::number => {
                        let n = crate::number(&pair);
                        if !n.is_finite() {
                            self.warnings.push(Warning::MalformedPoints {
                                detail: format!("number {} is out of range", pair.as_str()),
                                span: self.el.span,
                            });
                            break;
                        }
                        numbers.push(n);
                    }
                    Rule::rest if !pair.as_str().trim().is_empty() => {
                        self.warnings.push(Warning::MalformedPoints {
                            detail: format!("cannot parse {:?}", pair.as_str().trim()),
                            span: self.el.span,
                        });
                    }
                    _ => {}
                }
            }
        }

        if numbers.len() % 2 == 1 {
            numbers.pop();
            self.warnings.push(Warning::MalformedPoints {
                detail: "odd number of coordinates, last one dropped".to_string(),
                span: self.el.span,
            });
        }
        let points: Vec<DVec2> = numbers.chunks_exact(2).map(|xy| dvec2(xy[0], xy[1])).collect();
        if points.len() < 2 {
            return Err(self.skip("fewer than two points"));
        }
        Ok(points)
    }

    fn skip(&self, reason: impl Into<String>) -> Warning {
        Warning::skipped(&self.el.name, reason, self.el.span)
    }
}

// ============================================================================
// Shape Types
// ============================================================================

/// A straight segment, never closed
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    pub from: DVec2,
    pub to: DVec2,
}

impl ToPath for Line {
    fn to_path(&self) -> PathData {
        PathData::new()
            .m(self.from.x, self.from.y)
            .l(self.to.x, self.to.y)
    }
}

/// A rectangle with optional corner radii, already resolved and clamped
#[derive(Clone, Debug, PartialEq)]
pub struct Rect {
    pub origin: DVec2,
    pub width: Length,
    pub height: Length,
    pub rx: Length,
    pub ry: Length,
}

impl Rect {
    fn read(attrs: &mut Attrs<'_>) -> Result<Rect, Warning> {
        let origin = attrs.point("x", "y");
        let width = attrs.required("width")?;
        let height = attrs.required("height")?;
        let (rx, ry) = match (
            attrs.optional_non_negative("rx"),
            attrs.optional_non_negative("ry"),
        ) {
            (Some(rx), Some(ry)) => (rx, ry),
            (Some(r), None) | (None, Some(r)) => (r, r),
            (None, None) => (Length::ZERO, Length::ZERO),
        };
        Ok(Rect::new(origin, width, height).with_radii(rx, ry))
    }

    pub fn new(origin: DVec2, width: Length, height: Length) -> Self {
        Self {
            origin,
            width,
            height,
            rx: Length::ZERO,
            ry: Length::ZERO,
        }
    }

    /// Set corner radii, clamped to half the side they round
    pub fn with_radii(mut self, rx: Length, ry: Length) -> Self {
        self.rx = rx.min(self.width * 0.5);
        self.ry = ry.min(self.height * 0.5);
        self
    }
}

impl ToPath for Rect {
    fn to_path(&self) -> PathData {
        let (x1, y1) = (self.origin.x, self.origin.y);
        let x2 = x1 + self.width.raw();
        let y2 = y1 + self.height.raw();

        if self.rx.is_zero() || self.ry.is_zero() {
            // clockwise from the top-left corner
            return PathData::new().m(x1, y1).l(x2, y1).l(x2, y2).l(x1, y2).z();
        }

        let (rx, ry) = (self.rx.raw(), self.ry.raw());
        let corner = |p: PathData, x: f64, y: f64| p.a(rx, ry, 0.0, false, true, x, y);
        let straight_x = x2 - rx > x1 + rx;
        let straight_y = y2 - ry > y1 + ry;

        let mut path = PathData::new().m(x1 + rx, y1);
        if straight_x {
            path = path.l(x2 - rx, y1);
        }
        path = corner(path, x2, y1 + ry);
        if straight_y {
            path = path.l(x2, y2 - ry);
        }
        path = corner(path, x2 - rx, y2);
        if straight_x {
            path = path.l(x1 + rx, y2);
        }
        path = corner(path, x1, y2 - ry);
        if straight_y {
            path = path.l(x1, y1 + ry);
        }
        corner(path, x1 + rx, y1).z()
    }
}

/// Four cubic quadrants around `center`, starting at the rightmost point
/// and turning clockwise on screen.
fn ellipse_path(center: DVec2, rx: f64, ry: f64) -> PathData {
    if rx == 0.0 || ry == 0.0 {
        return PathData::new().m(center.x, center.y).z();
    }
    let (cx, cy) = (center.x, center.y);
    let (kx, ky) = (KAPPA * rx, KAPPA * ry);
    PathData::new()
        .m(cx + rx, cy)
        .c(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry)
        .c(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy)
        .c(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry)
        .c(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy)
        .z()
}

#[derive(Clone, Debug, PartialEq)]
pub struct Circle {
    pub center: DVec2,
    pub r: Length,
}

impl ToPath for Circle {
    fn to_path(&self) -> PathData {
        ellipse_path(self.center, self.r.raw(), self.r.raw())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ellipse {
    pub center: DVec2,
    pub rx: Length,
    pub ry: Length,
}

impl ToPath for Ellipse {
    fn to_path(&self) -> PathData {
        ellipse_path(self.center, self.rx.raw(), self.ry.raw())
    }
}

fn polyline_path(points: &[DVec2]) -> PathData {
    let mut path = PathData::new();
    for (i, p) in points.iter().enumerate() {
        path = if i == 0 { path.m(p.x, p.y) } else { path.l(p.x, p.y) };
    }
    path
}

/// Closed point list, at least two points
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub points: Vec<DVec2>,
}

impl ToPath for Polygon {
    fn to_path(&self) -> PathData {
        polyline_path(&self.points).z()
    }
}

/// Open point list, at least two points
#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
    pub points: Vec<DVec2>,
}

impl ToPath for Polyline {
    fn to_path(&self) -> PathData {
        polyline_path(&self.points)
    }
}

/// Arbitrary path data, parsed and normalized on read
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    pub data: PathData,
}

impl Path {
    fn read(attrs: &mut Attrs<'_>) -> Result<Path, Warning> {
        let d = attrs.el.attr("d").unwrap_or_default();
        let (data, problems) = path::parse(d, attrs.el.span);
        attrs.warnings.extend(problems);
        if !data.draws_anything() {
            return Err(attrs.skip("no drawable path data"));
        }
        Ok(Path { data })
    }
}

impl ToPath for Path {
    fn to_path(&self) -> PathData {
        self.data.clone()
    }
}
