use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Server-assigned identifier. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObservationId(String);

impl ObservationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ObservationId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("observation id must not be empty".to_string());
        }
        Ok(Self::new(s))
    }
}

impl Serialize for ObservationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ObservationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Some servers hand out numeric ids, others strings
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Rare,
    #[serde(rename = "extremely rare")]
    ExtremelyRare,
}

impl Rarity {
    pub const ALL: [Rarity; 3] = [Rarity::Common, Rarity::Rare, Rarity::ExtremelyRare];

    pub fn label(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::ExtremelyRare => "extremely rare",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Rarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "common" => Ok(Rarity::Common),
            "rare" => Ok(Rarity::Rare),
            "extremely rare" | "extremely-rare" | "extremely_rare" => Ok(Rarity::ExtremelyRare),
            other => Err(format!(
                "unknown rarity '{}', expected one of: common, rare, extremely rare",
                other
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Rarity {
    /// Blank or unrecognised labels read as `common` so one odd record cannot
    /// sink a whole list.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(label.parse().unwrap_or_else(|_| {
            if !label.trim().is_empty() {
                warn!("Unknown rarity '{}', reading it as common", label);
            }
            Rarity::default()
        }))
    }
}

/// A record as the server stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub id: ObservationId,
    pub name: String,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub notes: String,
    pub timestamp: DateTime<Utc>,
}

/// A record built on the client, before the server has assigned an id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationDraft {
    pub name: String,
    pub rarity: Rarity,
    pub notes: String,
    pub timestamp: DateTime<Utc>,
}

impl ObservationDraft {
    pub fn new(name: impl Into<String>, rarity: Rarity, notes: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rarity,
            notes: notes.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rarity_wire_labels() {
        assert_eq!(
            serde_json::to_string(&Rarity::ExtremelyRare).unwrap(),
            "\"extremely rare\""
        );
        let parsed: Rarity = serde_json::from_str("\"rare\"").unwrap();
        assert_eq!(parsed, Rarity::Rare);
    }

    #[test]
    fn test_rarity_from_command_line() {
        assert_eq!("extremely-rare".parse::<Rarity>(), Ok(Rarity::ExtremelyRare));
        assert_eq!(" Common ".parse::<Rarity>(), Ok(Rarity::Common));
        assert!("mythical".parse::<Rarity>().is_err());
    }

    #[test]
    fn test_observation_accepts_numeric_and_string_ids() {
        let numeric: Observation = serde_json::from_str(
            r#"{"id":3,"name":"Crane","rarity":"rare","notes":"","timestamp":"2020-01-02T03:04:05Z"}"#,
        )
        .unwrap();
        assert_eq!(numeric.id, ObservationId::new("3"));

        let text: Observation = serde_json::from_str(
            r#"{"id":"5e1f","name":"Crane","rarity":"rare","timestamp":"2020-01-02T03:04:05.000Z"}"#,
        )
        .unwrap();
        assert_eq!(text.id.as_str(), "5e1f");
        assert_eq!(text.notes, "");
    }

    #[test]
    fn test_list_with_blank_or_odd_rarity_still_loads() {
        let records: Vec<Observation> = serde_json::from_str(
            r#"[
                {"id":1,"name":"Heron","rarity":"","notes":"","timestamp":"2020-01-02T03:04:05Z"},
                {"id":2,"name":"Crane","rarity":"legendary","notes":"","timestamp":"2020-01-02T03:04:05Z"},
                {"id":3,"name":"Avocet","rarity":null,"timestamp":"2020-01-02T03:04:05Z"},
                {"id":4,"name":"Hoopoe","rarity":"extremely rare","timestamp":"2020-01-02T03:04:05Z"}
            ]"#,
        )
        .unwrap();

        let rarities: Vec<Rarity> = records.iter().map(|r| r.rarity).collect();
        assert_eq!(
            rarities,
            vec![Rarity::Common, Rarity::Common, Rarity::Common, Rarity::ExtremelyRare]
        );
    }

    #[test]
    fn test_draft_has_no_id_on_the_wire() {
        let draft = ObservationDraft::new("Osprey", Rarity::Rare, "over the lake");
        let value = serde_json::to_value(&draft).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["rarity"], "rare");
        assert_eq!(value["name"], "Osprey");
    }
}
