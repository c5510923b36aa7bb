use serde::{Deserialize, Serialize};

use crate::domain::{DisplayIdentity, ParticipantId, Round};

/// Free-form captions the caller attaches to the two windows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowLabels {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub participant_id: ParticipantId,
    pub login: String,
    pub rank: u32,
    pub points: f64,
    pub played: u32,
    /// Leader's points minus this entry's points, one decimal
    pub points_diff: f64,
    /// Share of the theoretical maximum, 0 when that maximum is 0
    pub points_relative: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_rank: Option<u32>,
    /// Previous rank minus current rank; positive means the entry moved up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<i64>,
    #[serde(flatten)]
    pub identity: DisplayIdentity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingMeta {
    pub has_trend: bool,
    /// Rounds between the window start and the latest known round
    pub round_count: u32,
    pub points_max: f64,
    pub group_name: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub labels: WindowLabels,
    /// Navigation: closest scored round before the queried span
    pub older: Option<Round>,
    /// Navigation: closest scored round after the queried span
    pub newer: Option<Round>,
}

/// Complete ranking, leader first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    pub meta: RankingMeta,
    pub entries: Vec<RankedEntry>,
}

impl RankingResult {
    pub fn leader(&self) -> Option<&RankedEntry> {
        self.entries.first()
    }

    pub fn entry(&self, login: &str) -> Option<&RankedEntry> {
        self.entries.iter().find(|e| e.login == login)
    }
}
