//! Display orientation.
//!
//! ```text
//! set_display(state, current, ["z", "y", "x"])
//!         │
//!         ├── canonicalize tokens → DisplayDimensions
//!         ├── for each image source:
//!         │     resolve → transform?  ── target ⊆ output axes → keep
//!         │                              otherwise compose(lift(T), T0)
//!         │             → native dims? ── same order → keep
//!         │                              otherwise compose(lift(T), identity)
//!         │             → unknown     ── skip
//!         └── state.display_dimensions = order
//! ```

use ng_types::{DisplayDimensions, Source, Transform, ViewerState};
use tracing::{debug, warn};

use crate::axes::{canonicalize, compact_name, AxisAliases};
use crate::compose::compose;
use crate::error::{AxisError, SpaceResult};
use crate::resolve::{DescriptionProvider, Resolution, Resolver, DEFAULT_DESCRIBE_HOPS};
use crate::table::{lift, TransformTable};

/// Reorients image sources to a display order.
pub struct Orienter<'a> {
    resolver: Resolver<'a>,
    table: &'a dyn TransformTable,
    aliases: &'a dyn AxisAliases,
}

impl<'a> Orienter<'a> {
    pub fn new(
        provider: &'a dyn DescriptionProvider,
        table: &'a dyn TransformTable,
        aliases: &'a dyn AxisAliases,
    ) -> Self {
        Self {
            resolver: Resolver::new(provider),
            table,
            aliases,
        }
    }

    pub fn resolver(&self) -> &Resolver<'a> {
        &self.resolver
    }

    /// Change the display order and reorient every image source to it.
    ///
    /// An empty request keeps `current`. Returns the order now in effect.
    pub fn set_display<S: AsRef<str>>(
        &self,
        state: &mut ViewerState,
        current: &DisplayDimensions,
        requested: &[S],
    ) -> Result<DisplayDimensions, AxisError> {
        let order = if requested.is_empty() {
            current.clone()
        } else {
            canonicalize(requested, self.aliases)?
        };
        self.orient_to(state, &order);
        Ok(order)
    }

    /// Reorient image sources to `order` and record it as the display order.
    ///
    /// Returns the number of sources whose transform changed.
    pub fn orient_to(&self, state: &mut ViewerState, order: &DisplayDimensions) -> usize {
        let target = compact_name(order.iter());
        let mut changed = 0;

        for layer in state.layers.iter_mut().filter(|layer| layer.is_image()) {
            for source in layer.source.iter_mut() {
                match self.orient_source(source, order, &target) {
                    Ok(true) => changed += 1,
                    Ok(false) => {}
                    Err(err) => {
                        warn!(layer = %layer.name, url = %source.url, error = %err, "cannot reorient source");
                    }
                }
            }
        }

        state.display_dimensions = order.clone();
        debug!(order = %target, changed, "display orientation applied");
        changed
    }

    fn orient_source(
        &self,
        source: &mut Source,
        order: &DisplayDimensions,
        target: &str,
    ) -> SpaceResult<bool> {
        let Resolution {
            input_dimensions,
            transform,
        } = self.resolver.resolve(&*source, DEFAULT_DESCRIBE_HOPS);

        if let Some(existing) = transform {
            let from = compact_name(existing.output_dimensions.names());
            if target.chars().all(|c| from.contains(c)) {
                return Ok(false);
            }
            let base = Transform::new(existing.matrix, input_dimensions, existing.output_dimensions);
            self.reorient(source, &base, &from, order, target)
        } else if let Some(dims) = input_dimensions {
            let from = compact_name(dims.names());
            if from == target {
                return Ok(false);
            }
            self.reorient(source, &Transform::identity(dims), &from, order, target)
        } else {
            debug!(url = %source.url, "nothing known about source, skipping");
            Ok(false)
        }
    }

    fn reorient(
        &self,
        source: &mut Source,
        base: &Transform,
        from: &str,
        order: &DisplayDimensions,
        target: &str,
    ) -> SpaceResult<bool> {
        let Some(reorientation) = self.table.lookup(from, target) else {
            warn!(url = %source.url, from, to = target, "no reorientation between axis orders");
            return Ok(false);
        };
        let lifted = lift(&reorientation, &base.output_dimensions, order.names())?;
        source.transform = Some(compose(&lifted, base)?);
        debug!(url = %source.url, from, to = target, "source reoriented");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axes::NeuroAxes;
    use crate::resolve::NoDescriptions;
    use crate::table::NeuroTransforms;
    use ng_types::{CoordinateSpace, Layer, LayerKind};
    use pretty_assertions::assert_eq;

    fn xyz() -> CoordinateSpace {
        CoordinateSpace::uniform(["x", "y", "z"], "mm", 1.0).unwrap()
    }

    fn state_with(source: Source) -> ViewerState {
        let mut state = ViewerState::default();
        state.layers.push(Layer::image("brain", source));
        state
    }

    fn orienter() -> Orienter<'static> {
        Orienter::new(&NoDescriptions, &NeuroTransforms, &NeuroAxes)
    }

    fn output_order(state: &ViewerState) -> String {
        let transform = state.layers[0].source[0].transform.as_ref().unwrap();
        compact_name(transform.output_dimensions.names())
    }

    #[test]
    fn native_dims_are_reoriented_to_request() {
        let mut state = state_with(Source::new("zarr://host/a").with_dimensions(xyz()));
        let order = orienter()
            .set_display(&mut state, &DisplayDimensions::default(), &["z", "y", "x"])
            .unwrap();

        assert_eq!(output_order(&state), "zyx");
        assert_eq!(state.display_dimensions, order);
        assert_eq!(compact_name(state.display_dimensions.iter()), "zyx");
    }

    #[test]
    fn matching_native_order_is_left_alone() {
        let mut state = state_with(Source::new("zarr://host/a").with_dimensions(xyz()));
        orienter()
            .set_display(&mut state, &DisplayDimensions::default(), &["xyz"])
            .unwrap();
        assert!(state.layers[0].source[0].transform.is_none());
    }

    #[test]
    fn existing_transform_is_kept_underneath() {
        let shifted = Transform::new(
            Some(vec![
                vec![1., 0., 0., 5.],
                vec![0., 1., 0., 6.],
                vec![0., 0., 1., 7.],
            ]),
            Some(xyz()),
            xyz(),
        );
        let mut state = state_with(Source::new("zarr://host/a").with_transform(shifted));
        orienter()
            .set_display(&mut state, &DisplayDimensions::default(), &["RAS"])
            .unwrap();

        let transform = state.layers[0].source[0].transform.as_ref().unwrap();
        assert_eq!(output_order(&state), "ras");
        assert_eq!(transform.input_dimensions, Some(xyz()));
        assert_eq!(
            transform.matrix.as_ref().unwrap(),
            &vec![
                vec![1., 0., 0., 5.],
                vec![0., 1., 0., 6.],
                vec![0., 0., 1., 7.],
            ]
        );
    }

    #[test]
    fn set_display_is_idempotent() {
        let mut once = state_with(Source::new("zarr://host/a").with_dimensions(xyz()));
        let o = orienter();
        let order = o
            .set_display(&mut once, &DisplayDimensions::default(), &["l", "p", "i"])
            .unwrap();
        let mut twice = once.clone();
        o.set_display(&mut twice, &order, &["l", "p", "i"]).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_request_keeps_current_order() {
        let mut state = ViewerState::default();
        let current = DisplayDimensions::new(vec!["z".into(), "y".into(), "x".into()]).unwrap();
        let order = orienter()
            .set_display::<&str>(&mut state, &current, &[])
            .unwrap();
        assert_eq!(order, current);
        assert_eq!(state.display_dimensions, current);
    }

    #[test]
    fn non_image_layers_and_unknown_sources_are_skipped() {
        let mut state = ViewerState::default();
        state.layers.push(Layer::new(
            "labels",
            LayerKind::Segmentation,
            vec![Source::new("zarr://host/labels").with_dimensions(xyz())],
        ));
        state.layers.push(Layer::image("bare", Source::new("zarr://host/bare")));

        let changed = orienter().orient_to(
            &mut state,
            &DisplayDimensions::new(vec!["z".into(), "y".into(), "x".into()]).unwrap(),
        );
        assert_eq!(changed, 0);
        assert!(state.layers.iter().all(|l| l.source[0].transform.is_none()));
    }

    #[test]
    fn invalid_request_changes_nothing() {
        let mut state = state_with(Source::new("zarr://host/a").with_dimensions(xyz()));
        let before = state.clone();
        let err = orienter()
            .set_display(&mut state, &DisplayDimensions::default(), &["x", "y"])
            .unwrap_err();
        assert_eq!(err, AxisError::Arity(2));
        assert_eq!(state, before);
    }
}
