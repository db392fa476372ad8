const BASE_LAYERS: [&str; 4] = ["lines", "points", "polygons", "relations"];
const SYSTEM_LAYERS: [&str; 2] = ["selection", "location_bbox"];

/// True for layers the application manages itself: the OSM base layers
/// (optionally suffixed `_osm`), the current selection and the location
/// bounding box, each optionally qualified as `name@workspace`.
pub fn is_default_layer(layer_name: &str) -> bool {
    let name = match layer_name.split_once('@') {
        Some((name, workspace)) if !workspace.is_empty() => name,
        Some(_) => return false,
        None => layer_name,
    };

    if SYSTEM_LAYERS.contains(&name) {
        return true;
    }
    let base = name.strip_suffix("_osm").unwrap_or(name);
    BASE_LAYERS.contains(&base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_layers_with_and_without_osm_suffix() {
        for name in ["lines", "points_osm", "polygons", "relations_osm"] {
            assert!(is_default_layer(name), "{name}");
        }
    }

    #[test]
    fn system_layers_do_not_take_osm_suffix() {
        assert!(is_default_layer("selection"));
        assert!(is_default_layer("location_bbox@myworkspace"));
        assert!(!is_default_layer("selection_osm"));
    }

    #[test]
    fn no_partial_matches() {
        for name in [
            "buildings",
            "custom_layer",
            "lines2",
            "my_points",
            "points_osm_osm",
            "lines@",
            "",
        ] {
            assert!(!is_default_layer(name), "{name}");
        }
    }
}
