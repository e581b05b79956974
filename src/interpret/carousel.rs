//! Store carousel components in feed responses

use serde::Serialize;
use serde_json::Value;

use crate::constants::interpret::{CAROUSEL_COMPONENT_CATEGORY, CAROUSEL_COMPONENT_ID, CAROUSEL_ID_PREFIX};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Carousel {
    pub id: String,
    pub component_id: String,
    pub component_category: String,
    /// Non-blank entries of the component's `text` object, trimmed
    pub text_fields: Vec<(String, String)>,
}

impl Carousel {
    /// Display title, when the component has one
    pub fn title(&self) -> Option<&str> {
        self.text_fields
            .iter()
            .find(|(k, _)| k == "title")
            .or_else(|| self.text_fields.first())
            .map(|(_, v)| v.as_str())
    }
}

fn is_store_carousel(obj: &serde_json::Map<String, Value>) -> bool {
    let id_matches = obj
        .get("id")
        .and_then(Value::as_str)
        .is_some_and(|id| id.starts_with(CAROUSEL_ID_PREFIX));
    let component = obj.get("component");
    let field = |name: &str| component.and_then(|c| c.get(name)).and_then(Value::as_str);

    id_matches
        && field("id") == Some(CAROUSEL_COMPONENT_ID)
        && field("category") == Some(CAROUSEL_COMPONENT_CATEGORY)
}

fn carousel_from(obj: &serde_json::Map<String, Value>) -> Option<Carousel> {
    let text_fields: Vec<(String, String)> = obj
        .get("text")
        .and_then(Value::as_object)
        .map(|text| {
            text.iter()
                .filter_map(|(k, v)| {
                    let v = v.as_str()?.trim();
                    (!v.is_empty()).then(|| (k.clone(), v.to_string()))
                })
                .collect()
        })
        .unwrap_or_default();

    if text_fields.is_empty() {
        return None;
    }

    let str_at = |v: Option<&Value>| v.and_then(Value::as_str).unwrap_or_default().to_string();
    let component = obj.get("component");
    Some(Carousel {
        id: str_at(obj.get("id")),
        component_id: str_at(component.and_then(|c| c.get("id"))),
        component_category: str_at(component.and_then(|c| c.get("category"))),
        text_fields,
    })
}

/// All store carousels in `doc`, in document order
pub fn find_carousels(doc: &Value) -> Vec<Carousel> {
    let mut found = Vec::new();
    walk(doc, &mut found);
    found
}

fn walk(value: &Value, found: &mut Vec<Carousel>) {
    match value {
        Value::Object(obj) => {
            if is_store_carousel(obj) {
                found.extend(carousel_from(obj));
            }
            for child in obj.values() {
                walk(child, found);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, found);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn carousel(id: &str, title: &str) -> Value {
        json!({
            "id": id,
            "component": {"id": "carousel.standard", "category": "carousel"},
            "text": {"title": title, "description": "  ", "subtitle": " Near you "}
        })
    }

    #[test]
    fn test_find_carousels_nested_in_document_order() {
        let doc = json!({
            "body": [
                {"children": [carousel("carousel.standard:store_carousel:deals", "Deals")]},
                carousel("carousel.standard:store_carousel:popular", "Popular"),
                carousel("carousel.standard:item_carousel:x", "Items"),
            ]
        });

        let found = find_carousels(&doc);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, "carousel.standard:store_carousel:deals");
        assert_eq!(found[0].title(), Some("Deals"));
        assert_eq!(
            found[1].text_fields,
            vec![
                ("title".to_string(), "Popular".to_string()),
                ("subtitle".to_string(), "Near you".to_string()),
            ]
        );
    }

    #[test]
    fn test_find_carousels_requires_component_match() {
        let doc = json!([{
            "id": "carousel.standard:store_carousel:1",
            "component": {"id": "carousel.standard", "category": "banner"},
            "text": {"title": "Nope"}
        }]);
        assert!(find_carousels(&doc).is_empty());
    }

    #[test]
    fn test_find_carousels_skips_textless() {
        let doc = json!({
            "id": "carousel.standard:store_carousel:1",
            "component": {"id": "carousel.standard", "category": "carousel"},
            "text": {"title": ""}
        });
        assert!(find_carousels(&doc).is_empty());
    }
}
