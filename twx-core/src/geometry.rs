//! Region names from geometry metadata (GeoJSON feature properties).
//!
//! Geometry itself is drawn elsewhere; only the canonical name property is
//! needed here, to join map features with the tabular sources.

use anyhow::{anyhow, Context};
use serde::Serialize;
use serde_json::{Map, Value};

/// Property keys that usually carry a region name, in priority order.
pub const NAME_KEY_PATTERNS: &[&str] = &[
    "name",
    "naziv",
    "ob_ime",
    "obcina",
    "občina",
    "municipality",
    "region",
    "ime",
];

/// Shortest pattern allowed to match as a substring (avoids "ime" in "time").
const MIN_SUBSTRING_PATTERN_LEN: usize = 4;

/// Region names discovered in a feature collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionNames {
    /// Property key used as the region name.
    pub property: String,
    pub names: Vec<String>,
}

/// Detect the property holding the region name.
///
/// Exact key matches win over substring matches; only string-valued
/// properties qualify.
pub fn detect_name_property(properties: &Map<String, Value>) -> Option<String> {
    let string_keys: Vec<&String> = properties
        .iter()
        .filter(|(_, v)| v.is_string())
        .map(|(k, _)| k)
        .collect();

    for pattern in NAME_KEY_PATTERNS {
        if let Some(key) = string_keys.iter().find(|k| k.to_lowercase() == *pattern) {
            return Some((*key).clone());
        }
    }
    for pattern in NAME_KEY_PATTERNS
        .iter()
        .filter(|p| p.chars().count() >= MIN_SUBSTRING_PATTERN_LEN)
    {
        if let Some(key) = string_keys.iter().find(|k| k.to_lowercase().contains(pattern)) {
            return Some((*key).clone());
        }
    }
    None
}

/// Parse a GeoJSON FeatureCollection and list its region names.
pub fn region_names(geojson: &str) -> anyhow::Result<RegionNames> {
    let value: Value = serde_json::from_str(geojson).context("geometry is not valid JSON")?;
    let features = value
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("geometry has no 'features' array"))?;

    let property = features
        .iter()
        .filter_map(|f| f.get("properties").and_then(Value::as_object))
        .find_map(detect_name_property)
        .ok_or_else(|| anyhow!("no region name property found in feature properties"))?;

    let names = features
        .iter()
        .filter_map(|f| f.get("properties")?.get(&property)?.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    log::info!(
        "[TWX] geometry: {} region names via property '{}'",
        names.len(),
        property
    );
    Ok(RegionNames { property, names })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_exact_before_substring() {
        let props = json!({"OB_UIME": "x", "NAZIV": "Bled", "id": 3});
        let map = props.as_object().unwrap();
        assert_eq!(detect_name_property(map), Some("NAZIV".to_string()));
    }

    #[test]
    fn test_detect_substring_match() {
        let props = json!({"update_time": "2020", "municipality_name": "Bled"});
        let map = props.as_object().unwrap();
        assert_eq!(detect_name_property(map), Some("municipality_name".to_string()));
    }

    #[test]
    fn test_detect_ignores_non_string_values() {
        let props = json!({"name": 12, "code": "A"});
        assert_eq!(detect_name_property(props.as_object().unwrap()), None);
    }

    #[test]
    fn test_region_names_from_feature_collection() {
        let geojson = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"OB_IME": "Ajdovščina "}, "geometry": null},
                {"type": "Feature", "properties": {"OB_IME": "Bled"}, "geometry": null}
            ]
        }"#;
        let regions = region_names(geojson).unwrap();
        assert_eq!(regions.property, "OB_IME");
        assert_eq!(regions.names, vec!["Ajdovščina", "Bled"]);
    }

    #[test]
    fn test_region_names_requires_features() {
        assert!(region_names(r#"{"type": "Feature"}"#).is_err());
        assert!(region_names("not json").is_err());
    }
}
