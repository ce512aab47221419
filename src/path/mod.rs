//! Normalized path commands.
//!
//! Every shape ends up as a [`PathData`]: absolute coordinates only, and only
//! the five commands VectorDrawable needs (`M`, `L`, `C`, `A`, `Z`).

pub mod arc;
mod parse;

use std::fmt;

use glam::{DAffine2, DMat2, DVec2, dvec2};

use crate::types::Decimal;

pub use parse::parse;

/// One absolute path command
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(DVec2),
    LineTo(DVec2),
    CubicTo {
        c1: DVec2,
        c2: DVec2,
        end: DVec2,
    },
    ArcTo {
        radii: DVec2,
        /// x-axis rotation in degrees
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        end: DVec2,
    },
    Close,
}

/// An ordered command sequence with a fluent builder
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathData {
    commands: Vec<PathCommand>,
}

impl PathData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn m(mut self, x: f64, y: f64) -> Self {
        self.commands.push(PathCommand::MoveTo(dvec2(x, y)));
        self
    }

    pub fn l(mut self, x: f64, y: f64) -> Self {
        self.commands.push(PathCommand::LineTo(dvec2(x, y)));
        self
    }

    pub fn c(mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) -> Self {
        self.commands.push(PathCommand::CubicTo {
            c1: dvec2(x1, y1),
            c2: dvec2(x2, y2),
            end: dvec2(x, y),
        });
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn a(
        mut self,
        rx: f64,
        ry: f64,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    ) -> Self {
        self.commands.push(PathCommand::ArcTo {
            radii: dvec2(rx, ry),
            rotation,
            large_arc,
            sweep,
            end: dvec2(x, y),
        });
        self
    }

    pub fn z(mut self) -> Self {
        self.commands.push(PathCommand::Close);
        self
    }

    pub fn push(&mut self, command: PathCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// True when the data holds anything beyond bare moves
    pub fn draws_anything(&self) -> bool {
        self.commands
            .iter()
            .any(|c| !matches!(c, PathCommand::MoveTo(_)))
    }

    /// False when any coordinate overflowed to infinity or NaN
    pub fn is_finite(&self) -> bool {
        self.commands.iter().all(|c| match *c {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => p.is_finite(),
            PathCommand::CubicTo { c1, c2, end } => {
                c1.is_finite() && c2.is_finite() && end.is_finite()
            }
            PathCommand::ArcTo {
                radii,
                rotation,
                end,
                ..
            } => radii.is_finite() && rotation.is_finite() && end.is_finite(),
            PathCommand::Close => true,
        })
    }

    /// Bake an affine transform into the coordinates.
    ///
    /// Pure translations keep arcs as arcs. Anything else first flattens
    /// arcs into cubic Béziers, since an arc under skew or non-uniform scale
    /// is no longer expressible with an axis rotation alone.
    pub fn transformed(&self, m: &DAffine2) -> PathData {
        if *m == DAffine2::IDENTITY {
            return self.clone();
        }
        let translation_only = m.matrix2 == DMat2::IDENTITY;

        let mut out = PathData::new();
        let mut current = DVec2::ZERO;
        let mut start = DVec2::ZERO;
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => {
                    out.push(PathCommand::MoveTo(m.transform_point2(p)));
                    current = p;
                    start = p;
                }
                PathCommand::LineTo(p) => {
                    out.push(PathCommand::LineTo(m.transform_point2(p)));
                    current = p;
                }
                PathCommand::CubicTo { c1, c2, end } => {
                    out.push(PathCommand::CubicTo {
                        c1: m.transform_point2(c1),
                        c2: m.transform_point2(c2),
                        end: m.transform_point2(end),
                    });
                    current = end;
                }
                PathCommand::ArcTo {
                    radii,
                    rotation,
                    large_arc,
                    sweep,
                    end,
                } => {
                    if translation_only {
                        out.push(PathCommand::ArcTo {
                            radii,
                            rotation,
                            large_arc,
                            sweep,
                            end: m.transform_point2(end),
                        });
                    } else {
                        for [c1, c2, to] in arc::to_cubics(current, radii, rotation, large_arc, sweep, end) {
                            out.push(PathCommand::CubicTo {
                                c1: m.transform_point2(c1),
                                c2: m.transform_point2(c2),
                                end: m.transform_point2(to),
                            });
                        }
                    }
                    current = end;
                }
                PathCommand::Close => {
                    out.push(PathCommand::Close);
                    current = start;
                }
            }
        }
        out
    }
}

struct Coord(DVec2);

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", Decimal(self.0.x), Decimal(self.0.y))
    }
}

impl fmt::Display for PathCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PathCommand::MoveTo(p) => write!(f, "M{}", Coord(p)),
            PathCommand::LineTo(p) => write!(f, "L{}", Coord(p)),
            PathCommand::CubicTo { c1, c2, end } => {
                write!(f, "C{} {} {}", Coord(c1), Coord(c2), Coord(end))
            }
            PathCommand::ArcTo {
                radii,
                rotation,
                large_arc,
                sweep,
                end,
            } => write!(
                f,
                "A{} {} {} {} {}",
                Coord(radii),
                Decimal(rotation),
                large_arc as u8,
                sweep as u8,
                Coord(end)
            ),
            PathCommand::Close => f.write_str("Z"),
        }
    }
}

impl fmt::Display for PathData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, command) in self.commands.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{command}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_formats_every_command() {
        let path = PathData::new()
            .m(10.0, 10.0)
            .l(60.0, 10.0)
            .c(1.0, 2.0, 3.0, 4.0, 5.0, 6.0)
            .a(20.0, 20.0, 0.0, false, true, 70.0, 50.0)
            .z();
        insta::assert_snapshot!(path.to_string(), @"M10,10 L60,10 C1,2 3,4 5,6 A20,20 0 0 1 70,50 Z");
    }

    #[test]
    fn precision_is_fixed() {
        let path = PathData::new().m(1.0 / 3.0, -0.00001).l(2.5, 1e-4);
        assert_eq!(path.to_string(), "M0.333,0 L2.5,0");
    }

    #[test]
    fn overflowing_transform_is_detected() {
        let path = PathData::new().m(0.0, 0.0).l(1e306, 0.0);
        assert!(path.is_finite());
        let scaled = path.transformed(&DAffine2::from_scale(dvec2(1e10, 1.0)));
        assert!(!scaled.is_finite());
    }

    #[test]
    fn draws_anything() {
        assert!(!PathData::new().draws_anything());
        assert!(!PathData::new().m(1.0, 1.0).draws_anything());
        assert!(PathData::new().m(1.0, 1.0).z().draws_anything());
    }

    #[test]
    fn identity_transform_is_a_no_op() {
        let path = PathData::new().m(0.0, 0.0).a(5.0, 5.0, 0.0, false, true, 10.0, 0.0);
        assert_eq!(path.transformed(&DAffine2::IDENTITY), path);
    }

    #[test]
    fn translation_moves_arc_endpoints() {
        let path = PathData::new().m(0.0, 0.0).a(5.0, 5.0, 0.0, false, true, 10.0, 0.0).z();
        let moved = path.transformed(&DAffine2::from_translation(dvec2(1.0, 2.0)));
        assert_eq!(moved.to_string(), "M1,2 A5,5 0 0 1 11,2 Z");
    }

    #[test]
    fn scaling_flattens_arcs() {
        let path = PathData::new().m(0.0, 0.0).a(5.0, 5.0, 0.0, false, true, 10.0, 0.0);
        let scaled = path.transformed(&DAffine2::from_scale(dvec2(2.0, 2.0)));
        let cmds = scaled.commands();
        assert_eq!(cmds[0], PathCommand::MoveTo(DVec2::ZERO));
        assert!(cmds[1..].iter().all(|c| matches!(c, PathCommand::CubicTo { .. })));
        let PathCommand::CubicTo { end, .. } = cmds[cmds.len() - 1] else {
            unreachable!()
        };
        assert!((end - dvec2(20.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn close_returns_to_subpath_start_for_later_arcs() {
        let path = PathData::new()
            .m(0.0, 0.0)
            .l(10.0, 0.0)
            .z()
            .a(5.0, 5.0, 0.0, false, true, 0.0, 10.0);
        let scaled = path.transformed(&DAffine2::from_scale(dvec2(1.0, 2.0)));
        let PathCommand::CubicTo { c1, .. } = scaled.commands()[3] else {
            panic!("expected the arc to be flattened");
        };
        // first control point leaves the subpath start, not (10, 0)
        assert!(c1.x.abs() > 1.0 && c1.x < 5.0);
    }
}
