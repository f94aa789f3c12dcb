//! Squad and opposition player directory built from `players.json`.

use crate::error::Result;
use crate::source::read_input;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// A player profile as stored in the squads document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub height: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub appearances: Option<u32>,
    #[serde(default)]
    pub minutes: Option<u32>,
    /// Position-specific season stats shown on the comparison radar.
    #[serde(default)]
    pub radar: BTreeMap<String, f64>,
}

/// Player ids arrive as numbers from the stats provider but are looked up
/// as strings, so both forms are accepted.
fn id_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

/// squad -> competition -> team -> players
type OppositionGroups = BTreeMap<String, BTreeMap<String, BTreeMap<String, Vec<Player>>>>;

#[derive(Debug, Deserialize)]
struct SquadsDocument {
    #[serde(default)]
    chelsea_squads: BTreeMap<String, Vec<Player>>,
    #[serde(default)]
    opposition: OppositionGroups,
}

/// Every player in the document, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct PlayerDirectory {
    players: HashMap<String, Player>,
}

impl PlayerDirectory {
    /// Flatten own squads and the opposition tree into one lookup. A player
    /// listed twice keeps the entry read last (opposition after own squads).
    pub fn from_json(json: &str) -> Result<Self> {
        let document: SquadsDocument = serde_json::from_str(json)?;
        let mut players = HashMap::new();
        for squad in document.chelsea_squads.into_values() {
            for player in squad {
                players.insert(player.id.clone(), player);
            }
        }
        for competitions in document.opposition.into_values() {
            for teams in competitions.into_values() {
                for player in teams.into_values().flatten() {
                    players.insert(player.id.clone(), player);
                }
            }
        }
        log::info!("players: loaded {} players", players.len());
        Ok(Self { players })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = read_input(path)?;
        let json = String::from_utf8_lossy(&bytes);
        Self::from_json(&json)
    }

    pub fn get(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Other players sharing this player's position, sorted by name.
    /// Empty when the player is unknown or has no position.
    pub fn comparison_candidates(&self, id: &str) -> Vec<&Player> {
        let Some(position) = self.get(id).and_then(|p| p.position.as_deref()) else {
            return Vec::new();
        };
        let mut candidates = self
            .players
            .values()
            .filter(|p| p.id != id && p.position.as_deref() == Some(position))
            .collect::<Vec<_>>();
        candidates.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYERS_JSON: &str = r#"{
        "chelsea_squads": {
            "Senior Men": [
                {"id": 19545, "name": "R. James", "age": 24, "position": "Defender",
                 "height": "180 cm", "weight": "82 kg", "nationality": "England",
                 "photo": "https://example.invalid/19545.png",
                 "appearances": 10, "minutes": 720,
                 "radar": {"Tackles": 18, "Av. Rating": 7.1}},
                {"id": 152982, "name": "C. Palmer", "position": "Attacker"}
            ]
        },
        "opposition": {
            "Senior Men": {
                "Premier League": {
                    "Arsenal": [
                        {"id": "22224", "name": "B. White", "position": "Defender"},
                        {"id": 1460, "name": "B. Saka", "position": "Attacker"}
                    ]
                }
            }
        }
    }"#;

    #[test]
    fn test_from_json_flattens_groups() {
        let directory = PlayerDirectory::from_json(PLAYERS_JSON).unwrap();
        assert_eq!(directory.len(), 4);
        let james = directory.get("19545").unwrap();
        assert_eq!(james.age, Some(24));
        assert_eq!(james.radar.get("Av. Rating"), Some(&7.1));
        assert_eq!(directory.get("22224").unwrap().name, "B. White");
        assert!(directory.get("999").is_none());
    }

    #[test]
    fn test_comparison_candidates() {
        let directory = PlayerDirectory::from_json(PLAYERS_JSON).unwrap();
        let names = directory
            .comparison_candidates("152982")
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["B. Saka"]);
        assert!(directory.comparison_candidates("nobody").is_empty());
    }

    #[test]
    fn test_missing_groups_are_empty() {
        let directory = PlayerDirectory::from_json("{}").unwrap();
        assert!(directory.is_empty());
    }
}
