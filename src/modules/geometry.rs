use crate::modules::io_error;
use crate::workflow::ModuleError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    fn point(x: f64, y: f64) -> Self {
        Self {
            west: x,
            south: y,
            east: x,
            north: y,
        }
    }

    fn extend(&mut self, x: f64, y: f64) {
        self.west = self.west.min(x);
        self.south = self.south.min(y);
        self.east = self.east.max(x);
        self.north = self.north.max(y);
    }

    pub fn is_degenerate(&self) -> bool {
        self.west == self.east || self.south == self.north
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "W {:.6} S {:.6} E {:.6} N {:.6}",
            self.west, self.south, self.east, self.north
        )
    }
}

pub fn read_geojson(path: &Path) -> Result<Value, ModuleError> {
    let raw = fs::read(path).map_err(|e| io_error(path, e))?;
    serde_json::from_slice(&raw).map_err(|source| ModuleError::Json {
        path: path.display().to_string(),
        source,
    })
}

/// Extent of every position in a GeoJSON object, or `None` when it holds
/// no coordinates.
pub fn bounding_box(geojson: &Value) -> Option<BoundingBox> {
    let mut bounds = None;
    visit_geometries(geojson, &mut |coordinates| {
        collect_positions(coordinates, &mut bounds)
    });
    bounds
}

/// Features in a FeatureCollection, 1 for a lone Feature or geometry.
pub fn feature_count(geojson: &Value) -> usize {
    match geojson.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => geojson
            .get("features")
            .and_then(Value::as_array)
            .map_or(0, Vec::len),
        Some(_) => 1,
        None => 0,
    }
}

fn visit_geometries(value: &Value, visit: &mut dyn FnMut(&Value)) {
    match value.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {
            for feature in value
                .get("features")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
            {
                visit_geometries(feature, visit);
            }
        }
        Some("Feature") => {
            if let Some(geometry) = value.get("geometry") {
                visit_geometries(geometry, visit);
            }
        }
        Some("GeometryCollection") => {
            for geometry in value
                .get("geometries")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
            {
                visit_geometries(geometry, visit);
            }
        }
        Some(_) => {
            if let Some(coordinates) = value.get("coordinates") {
                visit(coordinates);
            }
        }
        None => {}
    }
}

fn collect_positions(coordinates: &Value, bounds: &mut Option<BoundingBox>) {
    let Some(items) = coordinates.as_array() else {
        return;
    };
    if let (Some(x), Some(y)) = (
        items.first().and_then(Value::as_f64),
        items.get(1).and_then(Value::as_f64),
    ) {
        match bounds {
            Some(b) => b.extend(x, y),
            None => *bounds = Some(BoundingBox::point(x, y)),
        }
        return;
    }
    for item in items {
        collect_positions(item, bounds);
    }
}
