//! `transform` attribute parsing.

use glam::{DAffine2, DMat2, DVec2, dvec2};
use pest::Parser;

use crate::{Rule, SvgGrammar};

/// Parse a transform list into a single matrix.
///
/// The list applies right to left, as SVG specifies: the matrix for
/// `translate(..) scale(..)` scales first. `None` means the attribute is
/// malformed and should be ignored as a whole.
pub fn parse(raw: &str) -> Option<DAffine2> {
    let list = SvgGrammar::parse(Rule::transform_list, raw).ok()?.next()?;

    let mut matrix = DAffine2::IDENTITY;
    for item in list.into_inner() {
        let rule = item.as_rule();
        if rule == Rule::EOI {
            continue;
        }
        let args: Vec<f64> = item.into_inner().map(|p| crate::number(&p)).collect();
        if !args.iter().all(|a| a.is_finite()) {
            return None;
        }
        let step = match (rule, args.as_slice()) {
            (Rule::matrix, &[a, b, c, d, e, f]) => DAffine2::from_cols_array(&[a, b, c, d, e, f]),
            (Rule::translate, &[tx]) => DAffine2::from_translation(dvec2(tx, 0.0)),
            (Rule::translate, &[tx, ty]) => DAffine2::from_translation(dvec2(tx, ty)),
            (Rule::scale, &[s]) => DAffine2::from_scale(dvec2(s, s)),
            (Rule::scale, &[sx, sy]) => DAffine2::from_scale(dvec2(sx, sy)),
            (Rule::rotate, &[deg]) => DAffine2::from_angle(deg.to_radians()),
            (Rule::rotate, &[deg, cx, cy]) => {
                let pivot = dvec2(cx, cy);
                DAffine2::from_translation(pivot)
                    * DAffine2::from_angle(deg.to_radians())
                    * DAffine2::from_translation(-pivot)
            }
            (Rule::skew_x, &[deg]) => skew(dvec2(deg.to_radians().tan(), 0.0)),
            (Rule::skew_y, &[deg]) => skew(dvec2(0.0, deg.to_radians().tan())),
            _ => return None,
        };
        matrix = matrix * step;
    }
    Some(matrix)
}

fn skew(t: DVec2) -> DAffine2 {
    DAffine2::from_mat2(DMat2::from_cols(dvec2(1.0, t.y), dvec2(t.x, 1.0)))
}

/// Factor by which the transform scales lengths such as stroke width
pub fn length_scale(m: &DAffine2) -> f64 {
    m.matrix2.determinant().abs().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(raw: &str, p: DVec2) -> DVec2 {
        parse(raw).unwrap().transform_point2(p)
    }

    fn close(a: DVec2, b: DVec2) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn translate_and_scale() {
        assert_eq!(apply("translate(10)", DVec2::ONE), dvec2(11.0, 1.0));
        assert_eq!(apply("translate(10, -2)", DVec2::ONE), dvec2(11.0, -1.0));
        assert_eq!(apply("scale(2)", dvec2(1.0, 3.0)), dvec2(2.0, 6.0));
        assert_eq!(apply("scale(2 3)", dvec2(1.0, 3.0)), dvec2(2.0, 9.0));
    }

    #[test]
    fn lists_apply_right_to_left() {
        assert_eq!(apply("translate(10,0) scale(2)", DVec2::ONE), dvec2(12.0, 2.0));
        assert_eq!(apply("scale(2),translate(10,0)", DVec2::ONE), dvec2(22.0, 2.0));
    }

    #[test]
    fn matrix_columns() {
        assert_eq!(apply("matrix(1 0 0 1 5 6)", DVec2::ZERO), dvec2(5.0, 6.0));
        assert_eq!(apply("matrix(0,1,-1,0,0,0)", dvec2(1.0, 0.0)), dvec2(0.0, 1.0));
    }

    #[test]
    fn rotation_about_a_pivot() {
        assert!(close(apply("rotate(90)", dvec2(1.0, 0.0)), dvec2(0.0, 1.0)));
        assert!(close(apply("rotate(180 5 5)", dvec2(0.0, 5.0)), dvec2(10.0, 5.0)));
    }

    #[test]
    fn skews() {
        assert!(close(apply("skewX(45)", dvec2(0.0, 2.0)), dvec2(2.0, 2.0)));
        assert!(close(apply("skewY(45)", dvec2(3.0, 0.0)), dvec2(3.0, 3.0)));
    }

    #[test]
    fn empty_list_is_identity() {
        assert_eq!(parse(""), Some(DAffine2::IDENTITY));
        assert_eq!(parse("  "), Some(DAffine2::IDENTITY));
    }

    #[test]
    fn malformed_lists_are_rejected() {
        assert_eq!(parse("translate(1,2"), None);
        assert_eq!(parse("spin(3)"), None);
        assert_eq!(parse("matrix(1 2 3)"), None);
        assert_eq!(parse("translate(1e400)"), None);
    }

    #[test]
    fn stroke_scale_factor() {
        assert_eq!(length_scale(&parse("scale(4)").unwrap()), 4.0);
        assert_eq!(length_scale(&parse("scale(2 8)").unwrap()), 4.0);
        assert!((length_scale(&parse("rotate(30)").unwrap()) - 1.0).abs() < 1e-12);
    }
}
