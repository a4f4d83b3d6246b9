//! Coordinate spaces: ordered, uniquely named axes.
//!
//! On the wire a coordinate space is a JSON object whose keys are axis names
//! (in axis order) and whose values are `[scale, unit]` pairs:
//!
//! ```text
//! { "x": [1e-6, "m"], "y": [1e-6, "m"], "z": [2e-6, "m"] }
//! ```

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ModelError;

/// A single named axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub name: String,
    pub unit: String,
    pub scale: f64,
}

impl Axis {
    pub fn new(name: impl Into<String>, unit: impl Into<String>, scale: f64) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            scale,
        }
    }
}

/// Ordered set of uniquely named axes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoordinateSpace {
    axes: Vec<Axis>,
}

impl CoordinateSpace {
    /// Build a space, rejecting duplicate axis names.
    pub fn new(axes: Vec<Axis>) -> Result<Self, ModelError> {
        for (i, axis) in axes.iter().enumerate() {
            if axes[..i].iter().any(|other| other.name == axis.name) {
                return Err(ModelError::DuplicateAxis(axis.name.clone()));
            }
        }
        Ok(Self { axes })
    }

    /// Build a space where every axis shares one unit and scale.
    pub fn uniform<I, S>(names: I, unit: &str, scale: f64) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            names
                .into_iter()
                .map(|name| Axis::new(name, unit, scale))
                .collect(),
        )
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn axis(&self, index: usize) -> Option<&Axis> {
        self.axes.get(index)
    }

    /// Axis names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.axes.iter().map(|axis| axis.name.as_str())
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Position of the axis with this name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.axes.iter().position(|axis| axis.name == name)
    }
}

impl Serialize for CoordinateSpace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.axes.len()))?;
        for axis in &self.axes {
            map.serialize_entry(&axis.name, &(axis.scale, axis.unit.as_str()))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CoordinateSpace {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SpaceVisitor;

        impl<'de> Visitor<'de> for SpaceVisitor {
            type Value = CoordinateSpace;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of axis name to [scale, unit]")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut axes = Vec::with_capacity(access.size_hint().unwrap_or(3));
                while let Some((name, (scale, unit))) = access.next_entry::<String, (f64, String)>()? {
                    axes.push(Axis { name, unit, scale });
                }
                CoordinateSpace::new(axes).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_map(SpaceVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_names() {
        let result = CoordinateSpace::uniform(["x", "y", "x"], "mm", 1.0);
        assert_eq!(result, Err(ModelError::DuplicateAxis("x".into())));
    }

    #[test]
    fn serializes_in_axis_order() {
        let space = CoordinateSpace::uniform(["z", "y", "x"], "mm", 1.0).unwrap();
        let json = serde_json::to_string(&space).unwrap();
        assert_eq!(json, r#"{"z":[1.0,"mm"],"y":[1.0,"mm"],"x":[1.0,"mm"]}"#);
    }

    #[test]
    fn deserialization_keeps_order_and_units() {
        let space: CoordinateSpace =
            serde_json::from_str(r#"{"z": [2e-6, "m"], "x": [1e-6, "m"], "c^": [1, ""]}"#).unwrap();
        assert_eq!(space.names().collect::<Vec<_>>(), vec!["z", "x", "c^"]);
        assert_eq!(space.axis(0).unwrap().scale, 2e-6);
        assert_eq!(space.axis(2).unwrap().unit, "");
        assert_eq!(space.position("x"), Some(1));
    }
}
