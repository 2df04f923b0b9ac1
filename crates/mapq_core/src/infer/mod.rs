use serde_json::Value;

use crate::domain::Entities;
use crate::normalize::{string_items, FieldValue};
use crate::vocab::{theme_default_maptype, POI_KEYWORD_MAPTYPE};

/// Guess a single map type from theme and point-of-interest keywords.
///
/// Theme defaults always win over poi keywords. Within each stage the first hit in value
/// order wins, and for poi the keyword table order breaks ties inside one value.
pub fn infer_maptype(entities: &Entities) -> Option<&'static str> {
    if let Some(mt) = entities.get("theme").and_then(maptype_from_theme) {
        return Some(mt);
    }
    entities.get("poi").and_then(maptype_from_poi)
}

fn maptype_from_theme(theme: &Value) -> Option<&'static str> {
    match FieldValue::classify(theme) {
        FieldValue::Text(t) => theme_default_maptype(t),
        FieldValue::List(items) => items
            .iter()
            .filter_map(Value::as_str)
            .find_map(theme_default_maptype),
        FieldValue::Other(_) => None,
    }
}

fn maptype_from_poi(poi: &Value) -> Option<&'static str> {
    string_items(poi).iter().find_map(|value| {
        POI_KEYWORD_MAPTYPE
            .iter()
            .find(|(keyword, _)| value.contains(keyword))
            .map(|(_, mt)| *mt)
    })
}
