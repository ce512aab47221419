//! Mapping an SVG element tree onto a VectorDrawable.
//!
//! The walk is depth-first and pre-order, so output paths come out in SVG
//! painting order. Style and transform travel down the tree by value: every
//! element derives its own from its parent's and hands them to its children.

use glam::{DAffine2, dvec2};
use miette::SourceSpan;
use pest::Parser;

use crate::dom::Element;
use crate::errors::{ConvertError, Warning};
use crate::log::{debug, trace, warn};
use crate::shapes::{GeometryElement, ToPath};
use crate::style::{Declarations, StyleAttributes};
use crate::transform;
use crate::types::{Length, Size};
use crate::units::{self, Unit};
use crate::vector_drawable::{OutputDocument, PathNode};
use crate::{Rule, SvgGrammar};

/// Containers whose children are rendered
const CONTAINERS: &[&str] = &["svg", "g", "a", "switch"];

/// Elements that never render directly; their subtrees are dropped silently
const NON_RENDERED: &[&str] = &[
    "defs",
    "symbol",
    "clipPath",
    "mask",
    "pattern",
    "marker",
    "linearGradient",
    "radialGradient",
    "filter",
    "style",
    "title",
    "desc",
    "metadata",
    "script",
];

/// Graphical elements a VectorDrawable has no counterpart for
const UNSUPPORTED: &[&str] = &["text", "image", "use", "foreignObject"];

/// A converted document together with everything that was dropped or patched
#[derive(Clone, Debug, PartialEq)]
pub struct Conversion {
    pub document: OutputDocument,
    pub warnings: Vec<Warning>,
}

/// The `viewBox` rectangle of the root element
#[derive(Clone, Copy, Debug, PartialEq)]
struct ViewBox {
    min_x: f64,
    min_y: f64,
    width: f64,
    height: f64,
}

/// Canvas and coordinate system of the output
struct Frame {
    canvas: Size,
    viewport: Size,
    origin: DAffine2,
}

/// Walks an element tree and collects output paths
pub struct DocumentMapper {
    paths: Vec<PathNode>,
    warnings: Vec<Warning>,
}

impl DocumentMapper {
    /// Convert a parsed SVG tree.
    ///
    /// Fails only when the root is not `<svg>` or no canvas size can be
    /// worked out. Everything else becomes a warning in the result.
    pub fn map(root: &Element) -> Result<Conversion, ConvertError> {
        if root.name != "svg" {
            return Err(ConvertError::NotSvg {
                found: root.name.clone(),
                span: root.span,
            });
        }

        let mut mapper = DocumentMapper {
            paths: Vec::new(),
            warnings: Vec::new(),
        };
        let frame = mapper.frame(root)?;
        debug!(
            width = frame.canvas.width.raw(),
            height = frame.canvas.height.raw(),
            "resolved canvas"
        );

        mapper.visit(root, &StyleAttributes::default(), frame.origin);

        if mapper.paths.is_empty() {
            warn!("document produced no paths");
        }
        Ok(Conversion {
            document: OutputDocument {
                canvas: frame.canvas,
                viewport: frame.viewport,
                paths: mapper.paths,
            },
            warnings: mapper.warnings,
        })
    }

    fn frame(&mut self, root: &Element) -> Result<Frame, ConvertError> {
        let view_box = self.view_box(root);
        let width = self.dimension(root, "width");
        let height = self.dimension(root, "height");

        if let Some(vb) = view_box {
            let viewport = Size::new(Length(vb.width), Length(vb.height));
            let (w, h) = match (width, height, viewport.aspect()) {
                (Some(w), Some(h), _) => (w, h),
                (Some(w), None, Some(aspect)) => (w, w / aspect),
                (None, Some(h), Some(aspect)) => (h * aspect, h),
                _ => (vb.width, vb.height),
            };
            return Ok(Frame {
                canvas: Size::new(Length(w), Length(h)),
                viewport,
                origin: DAffine2::from_translation(dvec2(-vb.min_x, -vb.min_y)),
            });
        }

        match (width, height) {
            (Some(w), Some(h)) => {
                let size = Size::new(Length(w), Length(h));
                Ok(Frame {
                    canvas: size,
                    viewport: size,
                    origin: DAffine2::IDENTITY,
                })
            }
            _ => Err(ConvertError::MissingDimensions { span: root.span }),
        }
    }

    fn view_box(&mut self, root: &Element) -> Option<ViewBox> {
        let raw = root.attr("viewBox")?;
        let numbers: Option<Vec<f64>> = SvgGrammar::parse(Rule::view_box, raw)
            .ok()
            .and_then(|mut pairs| pairs.next())
            .map(|vb| {
                vb.into_inner()
                    .filter(|p| p.as_rule() == Rule::number)
                    .map(|p| crate::number(&p))
                    .collect()
            });

        let reason = match numbers.as_deref() {
            Some(values) if values.iter().any(|v| !v.is_finite()) => "number out of range",
            Some(&[min_x, min_y, width, height]) if width > 0.0 && height > 0.0 => {
                return Some(ViewBox {
                    min_x,
                    min_y,
                    width,
                    height,
                });
            }
            Some(&[_, _, _, _]) => "width and height must be positive",
            _ => "expected four numbers",
        };
        self.unsupported_attribute("viewBox", reason, root.span);
        None
    }

    /// A root dimension in dp, `None` when absent or unusable
    fn dimension(&mut self, root: &Element, name: &str) -> Option<f64> {
        let raw = root.attr(name)?;
        match units::convert(raw, Unit::Px) {
            Ok(len) if len.raw() > 0.0 => Some(len.raw()),
            result => {
                if let Err(e) = result {
                    debug!(attribute = name, error = %e, "ignoring root dimension");
                }
                self.warnings.push(Warning::InvalidLength {
                    attribute: name.to_string(),
                    value: raw.to_string(),
                    span: root.span,
                });
                None
            }
        }
    }

    fn visit(&mut self, el: &Element, parent_style: &StyleAttributes, parent_ctm: DAffine2) {
        let name = el.name.as_str();
        if NON_RENDERED.contains(&name) {
            trace!(element = name, "not rendered");
            return;
        }
        if UNSUPPORTED.contains(&name) {
            self.warnings.push(Warning::skipped(
                name,
                "no VectorDrawable equivalent",
                el.span,
            ));
            return;
        }
        let is_container = CONTAINERS.contains(&name);
        if !is_container && !GeometryElement::is_geometry(name) {
            trace!(element = name, "ignoring unknown element");
            return;
        }

        let decls = Declarations::of(el);
        if decls.hides_subtree() {
            trace!(element = name, "display: none");
            return;
        }
        let style = parent_style.cascade(&decls, el.span, &mut self.warnings);
        let ctm = match el.attr("transform") {
            None => parent_ctm,
            Some(raw) => match transform::parse(raw) {
                Some(m) => parent_ctm * m,
                None => {
                    self.unsupported_attribute("transform", "malformed transform list", el.span);
                    parent_ctm
                }
            },
        };

        if is_container {
            for child in &el.children {
                self.visit(child, &style, ctm);
            }
        } else {
            self.leaf(el, &style, ctm);
        }
    }

    fn leaf(&mut self, el: &Element, style: &StyleAttributes, ctm: DAffine2) {
        if !style.visible {
            trace!(element = %el.name, "hidden");
            return;
        }
        let shape = match GeometryElement::from_element(el, &mut self.warnings) {
            Ok(shape) => shape,
            Err(warning) => {
                debug!(element = %el.name, "skipping element");
                self.warnings.push(warning);
                return;
            }
        };

        let data = shape.to_path().transformed(&ctm);
        if !data.is_finite() {
            self.warnings
                .push(Warning::skipped(&el.name, "coordinates out of range", el.span));
            return;
        }

        self.paths.push(PathNode {
            name: el.attr("id").map(str::to_string),
            data,
            fill: style.fill_color(),
            stroke: style.stroke_color(),
            stroke_width: style.effective_stroke_width() * transform::length_scale(&ctm),
            fill_rule: style.fill_rule,
            line_cap: style.line_cap,
            line_join: style.line_join,
            miter_limit: style.miter_limit,
        });
    }

    fn unsupported_attribute(&mut self, attribute: &str, reason: &str, span: SourceSpan) {
        self.warnings.push(Warning::UnsupportedAttribute {
            attribute: attribute.to_string(),
            reason: reason.to_string(),
            span,
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::color::CanonicalColor;
    use crate::convert;
    use crate::errors::{ConvertError, Warning};
    use crate::style::FillRule;
    use crate::types::Length;

    fn paths(src: &str) -> Vec<String> {
        convert(src)
            .unwrap()
            .document
            .paths
            .iter()
            .map(|p| p.data.to_string())
            .collect()
    }

    #[test]
    fn red_rectangle() {
        let out = convert(
            r#"<svg viewBox="0 0 100 100"><rect x="10" y="10" width="50" height="30" fill="red"/></svg>"#,
        )
        .unwrap();
        assert!(out.warnings.is_empty());
        let doc = &out.document;
        assert_eq!(doc.canvas.width, Length(100.0));
        assert_eq!(doc.viewport.height, Length(100.0));
        assert_eq!(doc.paths.len(), 1);
        assert_eq!(doc.paths[0].data.to_string(), "M10,10 L60,10 L60,40 L10,40 Z");
        assert_eq!(doc.paths[0].fill.to_string(), "#FFFF0000");
        assert_eq!(doc.paths[0].stroke, None);
    }

    #[test]
    fn blue_circle() {
        let out = convert(
            r#"<svg viewBox="0 0 100 100"><circle cx="50" cy="50" r="20" fill="blue"/></svg>"#,
        )
        .unwrap();
        let path = &out.document.paths[0];
        assert_eq!(path.fill.to_string(), "#FF0000FF");
        let d = path.data.to_string();
        assert!(d.starts_with("M70,50 C"));
        assert!(d.contains(" 50,70 "));
        assert!(d.contains(" 30,50 "));
        assert!(d.contains(" 50,30 "));
        assert!(d.ends_with(" Z"));
    }

    #[test]
    fn invalid_element_is_skipped_with_a_warning() {
        let out = convert(
            r#"<svg viewBox="0 0 10 10">
                 <rect width="-5" height="5"/>
                 <rect width="5" height="5"/>
               </svg>"#,
        )
        .unwrap();
        assert_eq!(out.document.paths.len(), 1);
        assert_eq!(out.warnings.len(), 1);
        assert!(matches!(
            &out.warnings[0],
            Warning::SkippedElement { element, .. } if element == "rect"
        ));
    }

    #[test]
    fn painting_order_and_names() {
        let out = convert(
            r##"<svg width="10" height="10">
                 <path id="back" d="M0 0 H10"/>
                 <g><line id="mid" x2="5" y2="5" stroke="#0f0"/></g>
                 <polygon id="front" points="0,0 1,0 1,1"/>
               </svg>"##,
        )
        .unwrap();
        let names: Vec<_> = out
            .document
            .paths
            .iter()
            .map(|p| p.name.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(names, ["back", "mid", "front"]);
    }

    #[test]
    fn view_box_origin_becomes_a_translation() {
        assert_eq!(
            paths(r#"<svg viewBox="10 20 30 40"><rect x="10" y="20" width="5" height="5"/></svg>"#),
            ["M0,0 L5,0 L5,5 L0,5 Z"]
        );
    }

    #[test]
    fn canvas_follows_view_box_aspect() {
        let doc = convert(r#"<svg viewBox="0 0 200 100" width="1in"/>"#)
            .unwrap()
            .document;
        assert_eq!(doc.canvas.width, Length(96.0));
        assert_eq!(doc.canvas.height, Length(48.0));
        assert_eq!(doc.viewport.width, Length(200.0));

        let doc = convert(r#"<svg viewBox="0 0 200 100" height="10"/>"#)
            .unwrap()
            .document;
        assert_eq!(doc.canvas.width, Length(20.0));
    }

    #[test]
    fn percentage_size_falls_back_to_view_box() {
        let out = convert(r#"<svg width="100%" height="100%" viewBox="0 0 24 24"/>"#).unwrap();
        assert_eq!(out.document.canvas.width, Length(24.0));
        assert_eq!(out.warnings.len(), 2);
    }

    #[test]
    fn missing_dimensions_are_fatal() {
        assert!(matches!(
            convert(r#"<svg width="10"><rect width="1" height="1"/></svg>"#),
            Err(ConvertError::MissingDimensions { .. })
        ));
        assert!(matches!(
            convert(r#"<svg viewBox="0 0 0 10" width="5"/>"#),
            Err(ConvertError::MissingDimensions { .. })
        ));
    }

    #[test]
    fn root_must_be_svg() {
        assert!(matches!(
            convert("<html/>"),
            Err(ConvertError::NotSvg { found, .. }) if found == "html"
        ));
    }

    #[test]
    fn skipped_and_ignored_elements() {
        let out = convert(
            r#"<svg viewBox="0 0 10 10">
                 <title>icon</title>
                 <defs><rect id="hidden" width="1" height="1"/></defs>
                 <text>hi</text>
                 <sodipodi-namedview/>
                 <rect id="kept" width="1" height="1"/>
               </svg>"#,
        )
        .unwrap();
        assert_eq!(out.document.paths.len(), 1);
        assert_eq!(out.document.paths[0].name.as_deref(), Some("kept"));
        assert_eq!(out.warnings.len(), 1);
        assert!(matches!(
            &out.warnings[0],
            Warning::SkippedElement { element, .. } if element == "text"
        ));
    }

    #[test]
    fn display_and_visibility() {
        let out = convert(
            r#"<svg viewBox="0 0 10 10">
                 <g style="display:none"><rect id="a" width="1" height="1"/></g>
                 <g visibility="hidden">
                   <rect id="b" width="1" height="1"/>
                   <rect id="c" width="1" height="1" visibility="visible"/>
                 </g>
               </svg>"#,
        )
        .unwrap();
        let names: Vec<_> = out.document.paths.iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, [Some("c".to_string())]);
    }

    #[test]
    fn styles_inherit_down_the_tree() {
        let out = convert(
            r#"<svg viewBox="0 0 10 10">
                 <g fill="blue" stroke="red" stroke-width="2" opacity="0.5" fill-rule="evenodd">
                   <rect width="1" height="1" style="fill:#00ff00"/>
                   <rect width="1" height="1" fill="none" opacity="0.5"/>
                 </g>
               </svg>"#,
        )
        .unwrap();
        let [first, second] = out.document.paths.as_slice() else {
            panic!("expected two paths");
        };
        assert_eq!(first.fill.to_string(), "#8000FF00");
        assert_eq!(first.stroke.map(|c| c.to_string()).as_deref(), Some("#80FF0000"));
        assert_eq!(first.stroke_width, Length(2.0));
        assert_eq!(first.fill_rule, FillRule::EvenOdd);
        assert_eq!(second.fill, CanonicalColor::TRANSPARENT);
        assert_eq!(second.stroke.map(|c| c.to_string()).as_deref(), Some("#40FF0000"));
    }

    #[test]
    fn transforms_are_baked_into_coordinates() {
        let out = convert(
            r#"<svg viewBox="0 0 100 100">
                 <g transform="translate(5,5)">
                   <rect width="10" height="10" transform="scale(2)" stroke="black"/>
                 </g>
               </svg>"#,
        )
        .unwrap();
        let path = &out.document.paths[0];
        assert_eq!(path.data.to_string(), "M5,5 L25,5 L25,25 L5,25 Z");
        assert_eq!(path.stroke_width, Length(2.0));
    }

    #[test]
    fn malformed_transform_is_ignored() {
        let out = convert(
            r#"<svg viewBox="0 0 10 10"><rect width="1" height="1" transform="wobble(3)"/></svg>"#,
        )
        .unwrap();
        assert_eq!(out.document.paths[0].data.to_string(), "M0,0 L1,0 L1,1 L0,1 Z");
        assert!(matches!(
            &out.warnings[0],
            Warning::UnsupportedAttribute { attribute, .. } if attribute == "transform"
        ));
    }

    #[test]
    fn huge_coordinates_never_print_as_infinity() {
        let out = convert(
            r#"<svg viewBox="0 0 10 10">
                 <rect x="1e306" width="1" height="1"/>
                 <rect x="1e306" width="1" height="1" transform="scale(1e10)"/>
                 <path d="M0 0 L1e400 0"/>
               </svg>"#,
        )
        .unwrap();
        assert_eq!(out.document.paths.len(), 1);
        assert!(!out.document.to_xml().contains("inf"));
        assert!(matches!(
            &out.warnings[..],
            [
                Warning::SkippedElement { reason, .. },
                Warning::MalformedPathData { .. },
                Warning::SkippedElement { .. },
            ] if reason == "coordinates out of range"
        ));
    }

    #[test]
    fn unknown_color_warns_and_paints_black() {
        let out = convert(
            r#"<svg viewBox="0 0 10 10"><rect width="1" height="1" fill="blurple"/></svg>"#,
        )
        .unwrap();
        assert_eq!(out.document.paths[0].fill, CanonicalColor::BLACK);
        assert!(matches!(&out.warnings[0], Warning::UnknownColor { .. }));
    }

    #[test]
    fn bad_view_box_falls_back_to_width_and_height() {
        let out = convert(r#"<svg viewBox="0 0 ten 10" width="4" height="8"/>"#).unwrap();
        assert_eq!(out.document.viewport.height, Length(8.0));
        assert!(matches!(
            &out.warnings[0],
            Warning::UnsupportedAttribute { attribute, .. } if attribute == "viewBox"
        ));
    }
}
