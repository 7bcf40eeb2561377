// Domain model for the catalog.
//
// Wire types from multiverse-api are converted at the crate boundary;
// nothing above this layer sees raw JSON shapes.

use multiverse_api::types;

/// Life status of a character as reported by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterStatus {
    Alive,
    Dead,
    Unknown,
}

impl CharacterStatus {
    fn parse(raw: &str) -> Self {
        match raw {
            "Alive" => Self::Alive,
            "Dead" => Self::Dead,
            _ => Self::Unknown,
        }
    }

    /// Display label matching the upstream vocabulary.
    pub fn label(self) -> &'static str {
        match self {
            Self::Alive => "Alive",
            Self::Dead => "Dead",
            Self::Unknown => "unknown",
        }
    }
}

/// A catalog entity, immutable once fetched. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    pub id: u64,
    pub name: String,
    pub status: CharacterStatus,
    pub species: String,
    /// Sub-type or variant, frequently empty.
    pub kind: String,
    pub gender: String,
    pub origin: String,
    pub location: String,
    /// Avatar image URI.
    pub image: String,
    pub episode_count: usize,
}

impl From<types::Character> for Character {
    fn from(c: types::Character) -> Self {
        Self {
            id: c.id,
            name: c.name,
            status: CharacterStatus::parse(&c.status),
            species: c.species,
            kind: c.kind,
            gender: c.gender,
            origin: c.origin.name,
            location: c.location.name,
            image: c.image,
            episode_count: c.episode.len(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn status_parsing_matches_upstream_vocabulary() {
        assert_eq!(CharacterStatus::parse("Alive"), CharacterStatus::Alive);
        assert_eq!(CharacterStatus::parse("Dead"), CharacterStatus::Dead);
        assert_eq!(CharacterStatus::parse("unknown"), CharacterStatus::Unknown);
        assert_eq!(CharacterStatus::parse("???"), CharacterStatus::Unknown);
    }
}
