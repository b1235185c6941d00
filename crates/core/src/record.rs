use serde::{Deserialize, Serialize, Serializer};

/// One player statistics row as delivered by the feed.
///
/// Keys keep the feed's PascalCase spelling so the uploaded JSON lines match
/// the catalog columns. Optional fields absent in the feed stay absent in the
/// serialized line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    #[serde(rename = "PlayerID")]
    pub player_id: i64,
    #[serde(rename = "FirstName", default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "LastName", default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(rename = "Team", default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(rename = "Position", default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(
        rename = "Points",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_points"
    )]
    pub points: Option<f64>,
}

impl PlayerRecord {
    pub fn new(player_id: i64) -> Self {
        Self {
            player_id,
            first_name: None,
            last_name: None,
            team: None,
            position: None,
            points: None,
        }
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    pub fn with_points(mut self, points: f64) -> Self {
        self.points = Some(points);
        self
    }

    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = Some(last.into());
        self
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    /// "First Last", or whichever part is present.
    pub fn display_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(f), Some(l)) => Some(format!("{f} {l}")),
            (Some(f), None) => Some(f.clone()),
            (None, Some(l)) => Some(l.clone()),
            (None, None) => None,
        }
    }
}

// Whole numbers go out as integers: the catalog declares Points as int.
fn serialize_points<S: Serializer>(points: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match points {
        Some(p) if p.fract() == 0.0 && p.abs() < i64::MAX as f64 => serializer.serialize_i64(*p as i64),
        Some(p) => serializer.serialize_f64(*p),
        None => serializer.serialize_none(),
    }
}
