//! Parsers for the plain-text region map format and the JSON type-interaction
//! and all-maps formats, kept out of the core since neither file shape
//! affects solver behavior.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use thiserror::Error;

use crate::resistance::{Multiplier, Resistance};
use crate::type_encoding::TypeEncoding;

/// Errors surfaced while parsing a region file, interaction file, or
/// all-maps file.
#[derive(Debug, Error)]
pub enum FormatError {
    /// A line did not match `NAME (x, y): NEIGHBOR1, NEIGHBOR2, …` or a
    /// comment.
    #[error("unparseable region line: {0:?}")]
    BadRegionLine(String),
    /// The leading generation comment was not a base-10 integer.
    #[error("generation comment {0:?} is not an integer")]
    BadGeneration(String),
    /// A multiplier-bucket key in a JSON interaction file was not one of
    /// the six recognized names.
    #[error("unrecognized multiplier bucket {0:?}")]
    BadMultiplierBucket(String),
    /// JSON deserialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// One `NAME (x, y): NEIGHBOR1, NEIGHBOR2, …` record from a region file.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionRecord {
    /// The region's name.
    pub name: String,
    /// Its `(x, y)` drawing coordinates.
    pub coordinates: (f64, f64),
    /// The names of its adjacent regions, in file order.
    pub neighbors: Vec<String>,
}

/// A parsed region file: an optional leading generation number plus the
/// adjacency records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegionMap {
    /// The generation number carried on the first `#`-prefixed comment
    /// line, if present.
    pub generation: Option<u32>,
    /// One record per non-comment line, in file order.
    pub regions: Vec<RegionRecord>,
}

/// Parses a plain-text region map file.
///
/// Comment lines start with `#`; the *first* comment line, if its content
/// parses as a base-10 integer, is taken as the generation number. Every
/// other non-blank line must be `NAME (x, y): NEIGHBOR1, NEIGHBOR2, …`
/// (the neighbor list may be empty).
pub fn parse_region_map(source: &str) -> Result<RegionMap, FormatError> {
    let mut map = RegionMap::default();
    let mut seen_comment = false;

    for line in source.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(comment) = line.strip_prefix('#') {
            if !seen_comment {
                seen_comment = true;
                let comment = comment.trim();
                if !comment.is_empty() {
                    map.generation = Some(
                        comment
                            .parse()
                            .map_err(|_| FormatError::BadGeneration(comment.to_string()))?,
                    );
                }
            }
            continue;
        }
        map.regions.push(parse_region_line(line)?);
    }

    Ok(map)
}

fn parse_region_line(line: &str) -> Result<RegionRecord, FormatError> {
    let (head, tail) = line
        .split_once(':')
        .ok_or_else(|| FormatError::BadRegionLine(line.to_string()))?;

    let head = head.trim();
    let open = head
        .find('(')
        .ok_or_else(|| FormatError::BadRegionLine(line.to_string()))?;
    let close = head
        .find(')')
        .filter(|&i| i > open)
        .ok_or_else(|| FormatError::BadRegionLine(line.to_string()))?;

    let name = head[..open].trim();
    if name.is_empty() {
        return Err(FormatError::BadRegionLine(line.to_string()));
    }
    let (x_str, y_str) = head[open + 1..close]
        .split_once(',')
        .ok_or_else(|| FormatError::BadRegionLine(line.to_string()))?;
    let x: f64 = x_str
        .trim()
        .parse()
        .map_err(|_| FormatError::BadRegionLine(line.to_string()))?;
    let y: f64 = y_str
        .trim()
        .parse()
        .map_err(|_| FormatError::BadRegionLine(line.to_string()))?;

    let neighbors = tail
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    Ok(RegionRecord {
        name: name.to_string(),
        coordinates: (x, y),
        neighbors,
    })
}

#[derive(Deserialize)]
#[serde(transparent)]
struct InteractionFile(BTreeMap<String, BTreeMap<String, Vec<String>>>);

fn multiplier_for_bucket(bucket: &str) -> Result<Multiplier, FormatError> {
    match bucket {
        "immune" => Ok(Multiplier::Immune),
        "quarter" => Ok(Multiplier::Quarter),
        "half" => Ok(Multiplier::Half),
        "normal" => Ok(Multiplier::Normal),
        "double" => Ok(Multiplier::Double),
        "quad" => Ok(Multiplier::Quad),
        other => Err(FormatError::BadMultiplierBucket(other.to_string())),
    }
}

/// Parses a JSON type-interaction file: `{ defender: { bucket: [attacker,
/// …] } }` where `bucket` is one of `immune | quarter | half | normal |
/// double | quad`, directly into the interaction map consumed by
/// [`crate::links::CoverageLinks::build`].
pub fn parse_interaction_json(
    source: &str,
) -> Result<BTreeMap<TypeEncoding, BTreeSet<Resistance>>, FormatError> {
    let file: InteractionFile = serde_json::from_str(source)?;
    let mut result = BTreeMap::new();

    for (defender, buckets) in file.0 {
        let defender = TypeEncoding::new(&defender);
        let mut resistances = BTreeSet::new();
        for (bucket, attackers) in buckets {
            let multiplier = multiplier_for_bucket(&bucket)?;
            for attacker in attackers {
                resistances.insert(Resistance::new(TypeEncoding::new(&attacker), multiplier));
            }
        }
        result.insert(defender, resistances);
    }

    Ok(result)
}

#[derive(Deserialize)]
struct GymEntry {
    #[serde(default)]
    attack: Vec<String>,
    #[serde(default)]
    defense: Vec<String>,
}

#[derive(Deserialize)]
#[serde(transparent)]
struct AllMapsFile(BTreeMap<String, BTreeMap<String, GymEntry>>);

/// Resolves the attack-type union of the requested gyms within `map_name`
/// from a parsed JSON all-maps file.
pub fn gym_attack_types(
    source: &str,
    map_name: &str,
    selected_gyms: &BTreeSet<String>,
) -> Result<BTreeSet<TypeEncoding>, FormatError> {
    gym_types(source, map_name, selected_gyms, |gym| &gym.attack)
}

/// Resolves the defense-typing union of the requested gyms within
/// `map_name` from a parsed JSON all-maps file.
pub fn gym_defense_types(
    source: &str,
    map_name: &str,
    selected_gyms: &BTreeSet<String>,
) -> Result<BTreeSet<TypeEncoding>, FormatError> {
    gym_types(source, map_name, selected_gyms, |gym| &gym.defense)
}

fn gym_types(
    source: &str,
    map_name: &str,
    selected_gyms: &BTreeSet<String>,
    field: impl Fn(&GymEntry) -> &Vec<String>,
) -> Result<BTreeSet<TypeEncoding>, FormatError> {
    let file: AllMapsFile = serde_json::from_str(source)?;
    let mut result = BTreeSet::new();
    let Some(gyms) = file.0.get(map_name) else {
        return Ok(result);
    };
    for (gym, entry) in gyms {
        if !selected_gyms.contains(gym) {
            continue;
        }
        for type_name in field(entry) {
            result.insert(TypeEncoding::new(type_name));
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generation_comment_and_regions() {
        let source = "# 1\nPallet Town (10, 20): Route 1, Route 21\nViridian City (10, 30):\n";
        let map = parse_region_map(source).unwrap();
        assert_eq!(map.generation, Some(1));
        assert_eq!(map.regions.len(), 2);
        assert_eq!(map.regions[0].name, "Pallet Town");
        assert_eq!(map.regions[0].coordinates, (10.0, 20.0));
        assert_eq!(map.regions[0].neighbors, vec!["Route 1", "Route 21"]);
        assert!(map.regions[1].neighbors.is_empty());
    }

    #[test]
    fn rejects_malformed_region_line() {
        let err = parse_region_map("Pallet Town 10, 20: Route 1\n").unwrap_err();
        assert!(matches!(err, FormatError::BadRegionLine(_)));
    }

    #[test]
    fn interaction_json_round_trips_through_builder() {
        let source = r#"{
            "Ghost": {"immune": ["Normal"]},
            "Water": {"half": ["Fire", "Water"]}
        }"#;
        let parsed = parse_interaction_json(source).unwrap();
        assert_eq!(parsed.len(), 2);
        let ghost = &parsed[&TypeEncoding::new("Ghost")];
        assert!(ghost.contains(&Resistance::new(TypeEncoding::new("Normal"), Multiplier::Immune)));
        let water = &parsed[&TypeEncoding::new("Water")];
        assert_eq!(water.len(), 2);
    }

    #[test]
    fn rejects_unknown_multiplier_bucket() {
        let source = r#"{"Ghost": {"nonsense": ["Normal"]}}"#;
        let err = parse_interaction_json(source).unwrap_err();
        assert!(matches!(err, FormatError::BadMultiplierBucket(_)));
    }

    #[test]
    fn gym_types_filters_by_selection() {
        let source = r#"{
            "Kanto": {
                "Brock": {"attack": ["Rock"], "defense": ["Rock", "Ground"]},
                "Misty": {"attack": ["Water"], "defense": ["Water"]}
            }
        }"#;
        let selected = BTreeSet::from(["Brock".to_string()]);
        let defense = gym_defense_types(source, "Kanto", &selected).unwrap();
        assert_eq!(
            defense,
            BTreeSet::from([TypeEncoding::new("Rock"), TypeEncoding::new("Ground")])
        );
        let attack = gym_attack_types(source, "Kanto", &selected).unwrap();
        assert_eq!(attack, BTreeSet::from([TypeEncoding::new("Rock")]));
    }
}
