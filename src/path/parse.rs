//! Path data (`d` attribute) parsing into absolute commands.

use glam::{DVec2, dvec2};
use miette::SourceSpan;
use pest::Parser;
use pest::iterators::Pair;

use super::{PathCommand, PathData};
use crate::errors::Warning;
use crate::{Rule, SvgGrammar};

/// Longest snippet of unparseable path data quoted in a warning
const SNIPPET_LEN: usize = 24;

/// Cursor state while walking path segments
#[derive(Default)]
struct Pen {
    current: DVec2,
    subpath_start: DVec2,
    /// Second control point of the previous C/S, for S reflection
    last_cubic: Option<DVec2>,
    /// Control point of the previous Q/T, for T reflection
    last_quad: Option<DVec2>,
}

impl Pen {
    fn resolve(&self, relative: bool, x: f64, y: f64) -> DVec2 {
        if relative {
            self.current + dvec2(x, y)
        } else {
            dvec2(x, y)
        }
    }

    fn reflect(&self, control: Option<DVec2>) -> DVec2 {
        control.map_or(self.current, |c| self.current * 2.0 - c)
    }
}

/// Parse a `d` attribute.
///
/// Relative commands become absolute, `H`/`V` become lines, `S` becomes a
/// cubic with a reflected first control point, and quadratics are raised to
/// cubics. Arcs are kept. Whatever cannot be understood is dropped and
/// reported against `span`; everything before the first error is kept.
pub fn parse(d: &str, span: SourceSpan) -> (PathData, Vec<Warning>) {
    let mut data = PathData::new();
    let mut warnings = Vec::new();

    let root = match SvgGrammar::parse(Rule::path_data, d) {
        Ok(mut pairs) => pairs.next(),
        Err(e) => {
            warnings.push(Warning::MalformedPathData {
                detail: e.to_string(),
                span,
            });
            None
        }
    };
    let Some(root) = root else {
        return (data, warnings);
    };

    let mut pen = Pen::default();
    let mut started = false;
    let mut dropped_leading = false;
    for segment in root.into_inner() {
        let overflow = segment
            .clone()
            .into_inner()
            .find(|p| p.as_rule() == Rule::number && !crate::number(p).is_finite());
        if let Some(number) = overflow {
            warnings.push(Warning::MalformedPathData {
                detail: format!("number {} is out of range", snippet(number.as_str())),
                span,
            });
            break;
        }
        match segment.as_rule() {
            Rule::EOI => {}
            Rule::rest => {
                let rest = segment.as_str().trim();
                if !rest.is_empty() {
                    warnings.push(Warning::MalformedPathData {
                        detail: format!("cannot parse {:?}", snippet(rest)),
                        span,
                    });
                }
            }
            Rule::unsupported => {
                let command = segment.as_str().chars().take(1).collect::<String>();
                crate::log::debug!(command = %command, "dropping unsupported path command");
                warnings.push(Warning::UnsupportedPathCommand { command, span });
                pen.last_cubic = None;
                pen.last_quad = None;
            }
            Rule::moveto => {
                started = true;
                apply(&mut data, &mut pen, segment);
            }
            _ if !started => {
                // everything up to the first moveto is discarded, reported once
                if !dropped_leading {
                    warnings.push(Warning::MalformedPathData {
                        detail: "path data must start with a moveto".to_string(),
                        span,
                    });
                    dropped_leading = true;
                }
            }
            _ => apply(&mut data, &mut pen, segment),
        }
    }

    (data, warnings)
}

fn snippet(s: &str) -> String {
    match s.char_indices().nth(SNIPPET_LEN) {
        Some((i, _)) => format!("{}...", &s[..i]),
        None => s.to_string(),
    }
}

fn apply(data: &mut PathData, pen: &mut Pen, segment: Pair<'_, Rule>) {
    let rule = segment.as_rule();
    let mut inner = segment.into_inner();
    let relative = inner
        .next()
        .and_then(|cmd| cmd.as_str().chars().next())
        .is_some_and(|c| c.is_ascii_lowercase());
    let args: Vec<f64> = inner.map(|p| crate::number(&p)).collect();

    let mut next_cubic = None;
    let mut next_quad = None;
    match rule {
        Rule::moveto => {
            for (i, xy) in args.chunks_exact(2).enumerate() {
                let p = pen.resolve(relative, xy[0], xy[1]);
                if i == 0 {
                    data.push(PathCommand::MoveTo(p));
                    pen.subpath_start = p;
                } else {
                    data.push(PathCommand::LineTo(p));
                }
                pen.current = p;
            }
        }
        Rule::closepath => {
            data.push(PathCommand::Close);
            pen.current = pen.subpath_start;
        }
        Rule::lineto => {
            for xy in args.chunks_exact(2) {
                let p = pen.resolve(relative, xy[0], xy[1]);
                data.push(PathCommand::LineTo(p));
                pen.current = p;
            }
        }
        Rule::hlineto => {
            for &x in &args {
                let x = if relative { pen.current.x + x } else { x };
                pen.current = dvec2(x, pen.current.y);
                data.push(PathCommand::LineTo(pen.current));
            }
        }
        Rule::vlineto => {
            for &y in &args {
                let y = if relative { pen.current.y + y } else { y };
                pen.current = dvec2(pen.current.x, y);
                data.push(PathCommand::LineTo(pen.current));
            }
        }
        Rule::curveto => {
            for a in args.chunks_exact(6) {
                let c1 = pen.resolve(relative, a[0], a[1]);
                let c2 = pen.resolve(relative, a[2], a[3]);
                let end = pen.resolve(relative, a[4], a[5]);
                data.push(PathCommand::CubicTo { c1, c2, end });
                pen.current = end;
                pen.last_cubic = Some(c2);
            }
            next_cubic = pen.last_cubic;
        }
        Rule::smooth_curveto => {
            for a in args.chunks_exact(4) {
                let c1 = pen.reflect(pen.last_cubic);
                let c2 = pen.resolve(relative, a[0], a[1]);
                let end = pen.resolve(relative, a[2], a[3]);
                data.push(PathCommand::CubicTo { c1, c2, end });
                pen.current = end;
                pen.last_cubic = Some(c2);
            }
            next_cubic = pen.last_cubic;
        }
        Rule::quadto => {
            for a in args.chunks_exact(4) {
                let q = pen.resolve(relative, a[0], a[1]);
                let end = pen.resolve(relative, a[2], a[3]);
                push_quad(data, pen, q, end);
            }
            next_quad = pen.last_quad;
        }
        Rule::smooth_quadto => {
            for a in args.chunks_exact(2) {
                let q = pen.reflect(pen.last_quad);
                let end = pen.resolve(relative, a[0], a[1]);
                push_quad(data, pen, q, end);
            }
            next_quad = pen.last_quad;
        }
        Rule::arcto => {
            for a in args.chunks_exact(7) {
                let end = pen.resolve(relative, a[5], a[6]);
                if end == pen.current {
                    continue;
                }
                let radii = dvec2(a[0].abs(), a[1].abs());
                if radii.x == 0.0 || radii.y == 0.0 {
                    data.push(PathCommand::LineTo(end));
                } else {
                    data.push(PathCommand::ArcTo {
                        radii,
                        rotation: a[2],
                        large_arc: a[3] != 0.0,
                        sweep: a[4] != 0.0,
                        end,
                    });
                }
                pen.current = end;
            }
        }
        _ => {}
    }

    pen.last_cubic = next_cubic;
    pen.last_quad = next_quad;
}

/// Degree elevation: a quadratic with control `q` is the cubic with
/// controls two thirds of the way from each endpoint towards `q`.
fn push_quad(data: &mut PathData, pen: &mut Pen, q: DVec2, end: DVec2) {
    let start = pen.current;
    data.push(PathCommand::CubicTo {
        c1: start + (q - start) * (2.0 / 3.0),
        c2: end + (q - end) * (2.0 / 3.0),
        end,
    });
    pen.current = end;
    pen.last_quad = Some(q);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> SourceSpan {
        (0, 0).into()
    }

    fn canonical(d: &str) -> String {
        let (data, warnings) = parse(d, span());
        assert!(warnings.is_empty(), "{d:?}: {warnings:?}");
        data.to_string()
    }

    #[test]
    fn absolute_commands_pass_through() {
        assert_eq!(canonical("M10,10 L60,10 L60,40 Z"), "M10,10 L60,10 L60,40 Z");
        assert_eq!(
            canonical("M 0 0 C 1 2 3 4 5 6"),
            "M0,0 C1,2 3,4 5,6"
        );
    }

    #[test]
    fn canonical_output_is_a_fixed_point() {
        let d = "M10,10 L60,10 C70,10 80,20 80,30 A5,5 0 0 1 85,35 Z M1.5,-2.25 L3,3";
        assert_eq!(canonical(d), d);
        assert_eq!(canonical(&canonical(d)), d);
    }

    #[test]
    fn relative_commands_become_absolute() {
        assert_eq!(canonical("m10 10 l5 0 0 5 z"), "M10,10 L15,10 L15,15 Z");
        assert_eq!(canonical("M1 1 h4 v4 H0 V0"), "M1,1 L5,1 L5,5 L0,5 L0,0");
        assert_eq!(canonical("M0 0 c1 1 2 2 3 3 c1 1 2 2 3 3"), "M0,0 C1,1 2,2 3,3 C4,4 5,5 6,6");
    }

    #[test]
    fn implicit_lineto_after_moveto() {
        assert_eq!(canonical("M0 0 10 0 10 10"), "M0,0 L10,0 L10,10");
        assert_eq!(canonical("m1 1 2 2"), "M1,1 L3,3");
    }

    #[test]
    fn compact_number_syntax() {
        assert_eq!(canonical("M10-5L.5.5"), "M10,-5 L0.5,0.5");
        assert_eq!(canonical("M1e1,2E0"), "M10,2");
    }

    #[test]
    fn relative_move_after_close_starts_at_subpath_start() {
        assert_eq!(canonical("M10 10 L20 10 Z m5 5 l1 0"), "M10,10 L20,10 Z M15,15 L16,15");
    }

    #[test]
    fn smooth_cubic_reflects_previous_control() {
        assert_eq!(
            canonical("M0 0 C0 10 10 10 10 0 S20 -10 20 0"),
            "M0,0 C0,10 10,10 10,0 C10,-10 20,-10 20,0"
        );
        // without a preceding cubic the control point is the current point
        assert_eq!(canonical("M0 0 L5 5 S10 10 10 0"), "M0,0 L5,5 C5,5 10,10 10,0");
    }

    #[test]
    fn quadratics_are_elevated() {
        assert_eq!(canonical("M0 0 Q3 3 6 0"), "M0,0 C2,2 4,2 6,0");
        assert_eq!(canonical("M0 0 Q3 3 6 0 T12 0"), "M0,0 C2,2 4,2 6,0 C8,-2 10,-2 12,0");
    }

    #[test]
    fn arcs_are_kept_with_flags() {
        assert_eq!(canonical("M0 0 a5 5 30 1 0 10 0"), "M0,0 A5,5 30 1 0 10,0");
        assert_eq!(canonical("M0 0 A5 5 0 0110 0"), "M0,0 A5,5 0 0 1 10,0");
        assert_eq!(canonical("M0 0 A-5 5 0 0 1 10 0"), "M0,0 A5,5 0 0 1 10,0");
    }

    #[test]
    fn degenerate_arcs() {
        assert_eq!(canonical("M0 0 A0 5 0 0 1 10 0"), "M0,0 L10,0");
        assert_eq!(canonical("M0 0 A5 5 0 0 1 0 0 L1 1"), "M0,0 L1,1");
    }

    #[test]
    fn unsupported_command_is_dropped_with_warning() {
        let (data, warnings) = parse("M0 0 R 5 5 L10 10", span());
        assert_eq!(data.to_string(), "M0,0 L10,10");
        assert!(matches!(
            &warnings[..],
            [Warning::UnsupportedPathCommand { command, .. }] if command == "R"
        ));
    }

    #[test]
    fn trailing_garbage_keeps_the_prefix() {
        let (data, warnings) = parse("M0 0 L10 10 L20", span());
        assert_eq!(data.to_string(), "M0,0 L10,10");
        assert!(matches!(&warnings[..], [Warning::MalformedPathData { .. }]));
    }

    #[test]
    fn segments_before_first_moveto_are_dropped() {
        let (data, warnings) = parse("L5 5 L6 6 M0 0 L1 1", span());
        assert_eq!(data.to_string(), "M0,0 L1,1");
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn out_of_range_numbers_stop_the_path() {
        let (data, warnings) = parse("M0 0 L1e400 0 L5 5", span());
        assert_eq!(data.to_string(), "M0,0");
        assert!(matches!(
            &warnings[..],
            [Warning::MalformedPathData { detail, .. }] if detail.contains("1e400")
        ));

        let (data, warnings) = parse("M0 0 L1e306 0", span());
        assert!(warnings.is_empty());
        assert!(!data.to_string().contains("inf"));
    }

    #[test]
    fn empty_data() {
        let (data, warnings) = parse("   ", span());
        assert!(data.is_empty());
        assert!(warnings.is_empty());
    }
}
