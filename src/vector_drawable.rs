//! The VectorDrawable output document and its XML form.
//!
//! The layout matches what Android Studio's importer writes: one attribute
//! per line, four spaces of indentation.

use std::fmt;

use quick_xml::escape::escape;

use crate::color::CanonicalColor;
use crate::path::PathData;
use crate::style::{FillRule, LineCap, LineJoin};
use crate::types::{Decimal, Length, Size};

const ANDROID_NS: &str = "http://schemas.android.com/apk/res/android";

/// One `<path>` of the drawable
#[derive(Clone, Debug, PartialEq)]
pub struct PathNode {
    pub name: Option<String>,
    pub data: PathData,
    pub fill: CanonicalColor,
    pub stroke: Option<CanonicalColor>,
    pub stroke_width: Length,
    pub fill_rule: FillRule,
    pub line_cap: Option<LineCap>,
    pub line_join: Option<LineJoin>,
    pub miter_limit: Option<f64>,
}

/// A complete drawable: canvas size in dp, viewport in user units, and the
/// paths in painting order
#[derive(Clone, Debug, PartialEq)]
pub struct OutputDocument {
    pub canvas: Size,
    pub viewport: Size,
    pub paths: Vec<PathNode>,
}

impl OutputDocument {
    pub fn to_xml(&self) -> String {
        self.to_string()
    }
}

struct Attr<'a>(&'a str, String);

fn write_attrs(f: &mut fmt::Formatter<'_>, indent: &str, attrs: &[Attr<'_>]) -> fmt::Result {
    for (i, Attr(name, value)) in attrs.iter().enumerate() {
        if i > 0 {
            writeln!(f)?;
        }
        write!(f, "{indent}android:{name}=\"{}\"", escape(value.as_str()))?;
    }
    Ok(())
}

impl fmt::Display for PathNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut attrs = Vec::new();
        if let Some(name) = &self.name {
            attrs.push(Attr("name", name.clone()));
        }
        attrs.push(Attr("pathData", self.data.to_string()));
        attrs.push(Attr("fillColor", self.fill.to_string()));
        if let Some(stroke) = self.stroke {
            attrs.push(Attr("strokeColor", stroke.to_string()));
        }
        attrs.push(Attr("strokeWidth", self.stroke_width.to_string()));
        if self.fill_rule == FillRule::EvenOdd {
            attrs.push(Attr("fillType", "evenOdd".to_string()));
        }
        if let Some(cap) = self.line_cap {
            let cap = match cap {
                LineCap::Butt => "butt",
                LineCap::Round => "round",
                LineCap::Square => "square",
            };
            attrs.push(Attr("strokeLineCap", cap.to_string()));
        }
        if let Some(join) = self.line_join {
            let join = match join {
                LineJoin::Miter => "miter",
                LineJoin::Round => "round",
                LineJoin::Bevel => "bevel",
            };
            attrs.push(Attr("strokeLineJoin", join.to_string()));
        }
        if let Some(limit) = self.miter_limit {
            attrs.push(Attr("strokeMiterLimit", Decimal(limit).to_string()));
        }

        writeln!(f, "    <path")?;
        write_attrs(f, "        ", &attrs)?;
        writeln!(f, " />")
    }
}

impl fmt::Display for OutputDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, r#"<?xml version="1.0" encoding="utf-8"?>"#)?;
        writeln!(f, r#"<vector xmlns:android="{ANDROID_NS}""#)?;
        write_attrs(
            f,
            "    ",
            &[
                Attr("width", format!("{}dp", self.canvas.width)),
                Attr("height", format!("{}dp", self.canvas.height)),
                Attr("viewportWidth", self.viewport.width.to_string()),
                Attr("viewportHeight", self.viewport.height.to_string()),
            ],
        )?;
        writeln!(f, ">")?;
        for path in &self.paths {
            write!(f, "{path}")?;
        }
        writeln!(f, "</vector>")
    }
}
