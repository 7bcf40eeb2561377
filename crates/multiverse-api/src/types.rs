// Wire types for the catalog API.
//
// Field names and shapes match the upstream JSON exactly; translation into
// display-friendly domain types happens in multiverse-core.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One page of the paginated collection endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub info: PageInfo,
    pub results: Vec<Character>,
}

/// Pagination envelope returned alongside every collection page.
#[derive(Debug, Clone, Deserialize)]
pub struct PageInfo {
    /// Total number of entities in the collection.
    pub count: u32,
    /// Total number of pages.
    pub pages: u32,
    /// URL of the next page, absent on the last page.
    pub next: Option<String>,
    /// URL of the previous page, absent on the first page.
    pub prev: Option<String>,
}

impl PageInfo {
    /// Whether a further page exists.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// A single catalog entity as returned by the API.
///
/// `id`, `name`, `status`, `species`, `gender`, `image`, `origin`, and
/// `location` are required — a response missing any of them fails
/// deserialization. The remaining fields are tolerated when absent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Character {
    pub id: u64,
    pub name: String,
    /// "Alive", "Dead", or "unknown".
    pub status: String,
    pub species: String,
    /// Sub-type or variant, frequently empty.
    #[serde(default, rename = "type")]
    pub kind: String,
    pub gender: String,
    pub origin: LocationRef,
    pub location: LocationRef,
    /// Avatar image URI.
    pub image: String,
    /// Episode URIs this character appears in.
    #[serde(default)]
    pub episode: Vec<String>,
    /// Canonical URL of this entity.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
}

/// A named reference to a location resource.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocationRef {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn page_info_has_next() {
        let last: PageInfo = serde_json::from_str(
            r#"{"count": 826, "pages": 42, "next": null, "prev": "p41"}"#,
        )
        .unwrap();
        assert!(!last.has_next());

        let middle: PageInfo = serde_json::from_str(
            r#"{"count": 826, "pages": 42, "next": "p3", "prev": "p1"}"#,
        )
        .unwrap();
        assert!(middle.has_next());
    }

    #[test]
    fn character_decodes_with_optional_fields_absent() {
        let ch: Character = serde_json::from_str(
            r#"{
                "id": 1,
                "name": "Rick Sanchez",
                "status": "Alive",
                "species": "Human",
                "gender": "Male",
                "origin": {"name": "Earth (C-137)"},
                "location": {"name": "Citadel of Ricks"},
                "image": "https://example.test/1.jpeg"
            }"#,
        )
        .unwrap();

        assert_eq!(ch.id, 1);
        assert_eq!(ch.origin.name, "Earth (C-137)");
        assert!(ch.kind.is_empty());
        assert!(ch.episode.is_empty());
        assert!(ch.created.is_none());
    }

    #[test]
    fn character_missing_required_field_fails() {
        // No "name".
        let result: Result<Character, _> = serde_json::from_str(
            r#"{
                "id": 1,
                "status": "Alive",
                "species": "Human",
                "gender": "Male",
                "origin": {"name": "Earth"},
                "location": {"name": "Earth"},
                "image": "https://example.test/1.jpeg"
            }"#,
        );
        assert!(result.is_err());
    }
}
