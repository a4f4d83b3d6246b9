//! Named reorientation transforms between 3-axis orders.

use ng_types::{Axis, CoordinateSpace, Transform};

use crate::axes::is_spatial;
use crate::error::{SpaceError, SpaceResult};
use crate::matrix::{embed, to_dmatrix, to_rows};

/// Lookup of reorientation transforms keyed by compact axis orders.
pub trait TransformTable {
    /// Transform taking coordinates in order `from` to order `to`.
    fn lookup(&self, from: &str, to: &str) -> Option<Transform>;
}

/// Signed permutations between anatomical (`ras`, `lpi`, ...) and native
/// (`xyz`, `zyx`, ...) orders, with `x = r`, `y = a`, `z = s`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeuroTransforms;

/// (family, sign, full name) for each known letter.
fn letter(c: char) -> Option<(usize, f64, &'static str)> {
    Some(match c {
        'x' => (0, 1.0, "x"),
        'y' => (1, 1.0, "y"),
        'z' => (2, 1.0, "z"),
        'r' => (0, 1.0, "right"),
        'l' => (0, -1.0, "left"),
        'a' => (1, 1.0, "anterior"),
        'p' => (1, -1.0, "posterior"),
        's' => (2, 1.0, "superior"),
        'i' => (2, -1.0, "inferior"),
        _ => return None,
    })
}

/// Parse a compact order into per-axis (family, sign, name).
fn parse_order(compact: &str) -> Option<Vec<(usize, f64, &'static str)>> {
    let axes: Vec<_> = compact.chars().map(letter).collect::<Option<_>>()?;
    if axes.len() != 3 {
        return None;
    }
    let mut seen = [false; 3];
    for (family, _, _) in &axes {
        if std::mem::replace(&mut seen[*family], true) {
            return None;
        }
    }
    let native = compact.chars().filter(|c| matches!(c, 'x' | 'y' | 'z')).count();
    if native != 0 && native != 3 {
        return None;
    }
    Some(axes)
}

fn order_space(axes: &[(usize, f64, &str)]) -> SpaceResult<CoordinateSpace> {
    Ok(CoordinateSpace::uniform(
        axes.iter().map(|(_, _, name)| *name),
        "mm",
        1.0,
    )?)
}

impl TransformTable for NeuroTransforms {
    fn lookup(&self, from: &str, to: &str) -> Option<Transform> {
        let source = parse_order(from)?;
        let target = parse_order(to)?;

        let rows = target
            .iter()
            .map(|(family, sign, _)| {
                let mut row = vec![0.0; 4];
                if let Some(j) = source.iter().position(|(f, _, _)| f == family) {
                    row[j] = sign * source[j].1;
                }
                row
            })
            .collect();

        let input = order_space(&source).ok()?;
        let output = order_space(&target).ok()?;
        Some(Transform::new(Some(rows), Some(input), output))
    }
}

/// Lift a 3-axis reorientation onto a full coordinate space.
///
/// The three spatial axes of `space` are reordered and renamed to `names`;
/// channel and time axes pass through unchanged. Each renamed axis keeps
/// the unit and scale of the axis it was taken from.
pub fn lift(
    reorientation: &Transform,
    space: &CoordinateSpace,
    names: &[String; 3],
) -> SpaceResult<Transform> {
    let positions: Vec<usize> = space
        .names()
        .enumerate()
        .filter(|(_, name)| is_spatial(name))
        .map(|(i, _)| i)
        .collect();
    if positions.len() != 3 {
        return Err(SpaceError::SpatialAxes {
            found: positions.len(),
        });
    }

    let block = to_dmatrix(&reorientation.matrix_or_identity())?;
    if block.shape() != (3, 4) {
        return Err(SpaceError::RankMismatch {
            expected: 3,
            found: block.nrows(),
        });
    }
    let matrix = embed(&block, &positions, space.rank());

    let mut axes: Vec<Axis> = space.axes().to_vec();
    for (k, name) in names.iter().enumerate() {
        let from = (0..3).find(|&j| block[(k, j)] != 0.0).unwrap_or(k);
        let origin = &space.axes()[positions[from]];
        axes[positions[k]] = Axis::new(name.clone(), origin.unit.clone(), origin.scale);
    }

    Ok(Transform::new(
        Some(to_rows(&matrix)),
        Some(space.clone()),
        CoordinateSpace::new(axes)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(values: [&str; 3]) -> [String; 3] {
        values.map(String::from)
    }

    #[test]
    fn native_permutation() {
        let t = NeuroTransforms.lookup("xyz", "zyx").unwrap();
        assert_eq!(
            t.matrix.unwrap(),
            vec![
                vec![0., 0., 1., 0.],
                vec![0., 1., 0., 0.],
                vec![1., 0., 0., 0.],
            ]
        );
        assert_eq!(t.output_dimensions.names().collect::<Vec<_>>(), vec!["z", "y", "x"]);
    }

    #[test]
    fn anatomical_flip() {
        let t = NeuroTransforms.lookup("ras", "lpi").unwrap();
        assert_eq!(
            t.matrix.unwrap(),
            vec![
                vec![-1., 0., 0., 0.],
                vec![0., -1., 0., 0.],
                vec![0., 0., -1., 0.],
            ]
        );
    }

    #[test]
    fn native_to_anatomical_is_identity_mapping() {
        let t = NeuroTransforms.lookup("xyz", "ras").unwrap();
        assert_eq!(
            t.matrix.unwrap(),
            vec![
                vec![1., 0., 0., 0.],
                vec![0., 1., 0., 0.],
                vec![0., 0., 1., 0.],
            ]
        );
    }

    #[test]
    fn rejects_mixed_or_incomplete_orders() {
        assert!(NeuroTransforms.lookup("xas", "ras").is_none());
        assert!(NeuroTransforms.lookup("rrs", "ras").is_none());
        assert!(NeuroTransforms.lookup("ra", "ras").is_none());
        assert!(NeuroTransforms.lookup("ras", "abc").is_none());
    }

    #[test]
    fn lift_passes_channel_axes_through() {
        let space = CoordinateSpace::new(vec![
            Axis::new("c^", "", 1.0),
            Axis::new("x", "um", 2.0),
            Axis::new("y", "um", 3.0),
            Axis::new("z", "um", 4.0),
        ])
        .unwrap();
        let reorientation = NeuroTransforms.lookup("xyz", "zyx").unwrap();
        let lifted = lift(&reorientation, &space, &names(["z", "y", "x"])).unwrap();

        assert_eq!(
            lifted.matrix.unwrap(),
            vec![
                vec![1., 0., 0., 0., 0.],
                vec![0., 0., 0., 1., 0.],
                vec![0., 0., 1., 0., 0.],
                vec![0., 1., 0., 0., 0.],
            ]
        );
        let out = &lifted.output_dimensions;
        assert_eq!(out.names().collect::<Vec<_>>(), vec!["c^", "z", "y", "x"]);
        assert_eq!(out.axis(1).unwrap().scale, 4.0);
        assert_eq!(out.axis(3).unwrap().scale, 2.0);
    }

    #[test]
    fn lift_needs_three_spatial_axes() {
        let space = CoordinateSpace::uniform(["x", "y"], "mm", 1.0).unwrap();
        let reorientation = NeuroTransforms.lookup("xyz", "zyx").unwrap();
        assert_eq!(
            lift(&reorientation, &space, &names(["z", "y", "x"])),
            Err(SpaceError::SpatialAxes { found: 2 })
        );
    }
}
