//! Transform composition.

use ng_types::Transform;

use crate::error::{SpaceError, SpaceResult};
use crate::matrix::{augment, identity, to_dmatrix, to_rows};

/// Apply `new` after `existing`.
///
/// The result maps `existing`'s input space to `new`'s output space, with
/// matrix `new · augment(existing)`. A missing matrix is the identity over
/// the declared ranks.
pub fn compose(new: &Transform, existing: &Transform) -> SpaceResult<Transform> {
    let outer = match &new.matrix {
        Some(rows) => to_dmatrix(rows)?,
        None => identity(new.output_rank(), new.input_rank()),
    };
    let inner = match &existing.matrix {
        Some(rows) => to_dmatrix(rows)?,
        None => identity(existing.output_rank(), existing.input_rank()),
    };

    let expected = inner.nrows();
    let found = outer.ncols().saturating_sub(1);
    if expected != found {
        return Err(SpaceError::RankMismatch { expected, found });
    }

    let product = &outer * augment(&inner);
    Ok(Transform::new(
        Some(to_rows(&product)),
        existing.input_dimensions.clone(),
        new.output_dimensions.clone(),
    ))
}
