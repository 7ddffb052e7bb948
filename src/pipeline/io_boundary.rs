// The locality boundaries, as exported to GeoJSON. Only the feature properties are read.

use serde::Deserialize;
use serde_json::Map as JSMap;

use crate::pipeline::*;

#[derive(Debug, Clone, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Clone, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<JSMap<String, JSValue>>,
}

fn property_text(properties: &Option<JSMap<String, JSValue>>, name: &str) -> Option<String> {
    match properties.as_ref()?.get(name)? {
        JSValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        JSValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Builds the locality registry from a GeoJSON feature collection.
///
/// Every feature must carry the id and the display name properties.
pub fn read_registry(
    path: &Path,
    id_property: &str,
    name_property: &str,
) -> PipelineResult<LocalityRegistry> {
    let path_s = path.display().to_string();
    ensure!(
        path.is_file(),
        MissingBoundarySnafu {
            path: path_s.clone()
        }
    );
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {
        path: path_s.clone(),
    })?;
    let fc: FeatureCollection = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;

    let mut localities: Vec<(String, String)> = Vec::new();
    for (index, f) in fc.features.iter().enumerate() {
        let id = property_text(&f.properties, id_property).context(BoundaryPropertySnafu {
            path: path_s.clone(),
            index,
            property: id_property,
        })?;
        let name = property_text(&f.properties, name_property).context(BoundaryPropertySnafu {
            path: path_s.clone(),
            index,
            property: name_property,
        })?;
        localities.push((id, name));
    }
    let registry = LocalityRegistry::new(localities).context(InvalidBoundarySnafu {
        path: path_s.clone(),
    })?;
    info!("Read {} localities from {}", registry.len(), path_s);
    Ok(registry)
}
