//! Input documents supplied by the bot: tournament state, fallback participants and
//! completed games. Everything is defaulted at deserialization so the engine only sees
//! typed values. A `null` or mistyped field reads as its default instead of failing the
//! whole document.

use crate::models::player::PlayerId;
use crate::models::tournament::TournamentType;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Participants of a document, in the order the bot wrote them.
pub type ParticipantList = Vec<(PlayerId, ParticipantInfo)>;

/// Coerce a JSON id value to a string, treating null and blanks as absent.
pub(crate) fn id_from_value(value: &Value) -> Option<PlayerId> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Any value, `null` and type mismatches included, reads as `T` or its default.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| serde_json::from_value(v).ok()).unwrap_or_default())
}

/// An array whose unreadable entries are skipped. Anything but an array is an empty list.
pub fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Some(Value::Array(items)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    let total = items.len();
    let kept: Vec<T> = items.into_iter().filter_map(|v| serde_json::from_value(v).ok()).collect();
    if kept.len() < total {
        log::warn!("skipped {} unreadable list entries", total - kept.len());
    }
    Ok(kept)
}

fn optional_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<PlayerId>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?.as_ref().and_then(id_from_value))
}

fn id_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<PlayerId>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items.iter().filter_map(id_from_value).collect(),
        Some(single) => id_from_value(&single).into_iter().collect(),
        None => Vec::new(),
    })
}

fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(optional_text(deserializer)?.unwrap_or_default())
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        Some(Value::String(s)) => matches!(s.trim(), "true" | "1" | "yes"),
        _ => false,
    })
}

fn lenient_index<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// The `participants` object in key order. A bare string value is taken as the name,
/// anything unreadable as empty info. Blank keys are dropped and the first of
/// two keys that trim to the same id wins.
fn participant_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ParticipantList, D::Error> {
    let Some(Value::Object(map)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    let mut list = ParticipantList::with_capacity(map.len());
    for (id, info) in map {
        let id = id.trim().to_string();
        if id.is_empty() || list.iter().any(|(known, _)| *known == id) {
            continue;
        }
        let info = match info {
            Value::String(name) => ParticipantInfo {
                name: Some(name.trim().to_string()).filter(|n| !n.is_empty()),
                ..ParticipantInfo::default()
            },
            other => serde_json::from_value(other).unwrap_or_default(),
        };
        list.push((id, info));
    }
    Ok(list)
}

fn serialize_participants<S: Serializer>(
    participants: &[(PlayerId, ParticipantInfo)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(participants.iter().map(|(id, info)| (id, info)))
}

/// Display data for one participant in the tournament-state document.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticipantInfo {
    #[serde(deserialize_with = "optional_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub photo_url: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub photo_path: Option<String>,
}

impl ParticipantInfo {
    /// `photo_url` wins over `photo_path`.
    pub fn photo(&self) -> Option<&str> {
        self.photo_url.as_deref().or(self.photo_path.as_deref())
    }
}

/// One stored match of the main draw or a placement draw.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRecord {
    #[serde(deserialize_with = "lenient_index")]
    pub round: i64,
    #[serde(deserialize_with = "lenient_index")]
    pub match_number: i64,
    #[serde(deserialize_with = "optional_id")]
    pub player1_id: Option<PlayerId>,
    #[serde(deserialize_with = "optional_id")]
    pub player2_id: Option<PlayerId>,
    #[serde(deserialize_with = "optional_text")]
    pub score: Option<String>,
    #[serde(deserialize_with = "optional_id")]
    pub winner_id: Option<PlayerId>,
    #[serde(deserialize_with = "lenient_bool")]
    pub is_bye: bool,
    #[serde(deserialize_with = "optional_text")]
    pub placement: Option<String>,
}

impl MatchRecord {
    pub fn is_placement(&self) -> bool {
        self.placement.is_some()
    }
}

/// Tournament state as stored by the bot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentStateDocument {
    #[serde(deserialize_with = "text")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "lenient")]
    pub tournament_type: TournamentType,
    #[serde(deserialize_with = "participant_list", serialize_with = "serialize_participants")]
    pub participants: ParticipantList,
    #[serde(deserialize_with = "lenient_list")]
    pub matches: Vec<MatchRecord>,
    #[serde(deserialize_with = "lenient")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TournamentStateDocument {
    pub fn main_draw_records(&self) -> impl Iterator<Item = &MatchRecord> {
        self.matches.iter().filter(|m| !m.is_placement())
    }

    pub fn placement_records(&self) -> impl Iterator<Item = &MatchRecord> {
        self.matches.iter().filter(|m| m.is_placement())
    }
}

/// The two rosters of a completed game.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rosters {
    #[serde(deserialize_with = "id_list")]
    pub team1: Vec<PlayerId>,
    #[serde(deserialize_with = "id_list")]
    pub team2: Vec<PlayerId>,
}

/// An authoritative result for a pairing, used to backfill bracket matches.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletedGameRecord {
    #[serde(deserialize_with = "lenient")]
    pub players: Rosters,
    #[serde(deserialize_with = "optional_text")]
    pub score: Option<String>,
    #[serde(deserialize_with = "optional_id")]
    pub winner_id: Option<PlayerId>,
    #[serde(deserialize_with = "optional_text")]
    pub media_filename: Option<String>,
}

impl CompletedGameRecord {
    pub fn new(team1: &[&str], team2: &[&str]) -> Self {
        Self {
            players: Rosters {
                team1: team1.iter().map(|s| s.to_string()).collect(),
                team2: team2.iter().map(|s| s.to_string()).collect(),
            },
            ..Self::default()
        }
    }

    pub fn with_result(mut self, score: impl Into<String>, winner_id: impl Into<PlayerId>) -> Self {
        self.score = Some(score.into());
        self.winner_id = Some(winner_id.into());
        self
    }

    /// Whether the rosters put `a` and `b` on opposite teams, in either order.
    pub fn pits(&self, a: &str, b: &str) -> bool {
        let t1 = &self.players.team1;
        let t2 = &self.players.team2;
        let on = |team: &Vec<PlayerId>, id: &str| team.iter().any(|x| x == id);
        (on(t1, a) && on(t2, b)) || (on(t1, b) && on(t2, a))
    }

    pub fn in_team1(&self, id: &str) -> bool {
        self.players.team1.iter().any(|x| x == id)
    }

    pub fn in_team2(&self, id: &str) -> bool {
        self.players.team2.iter().any(|x| x == id)
    }
}
