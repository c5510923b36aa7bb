//! Read access to recorded scores, consumed by the ranking engine.

mod memory;
mod sqlite;

use std::collections::BTreeMap;

use anyhow::Result;

use crate::domain::{DisplayIdentity, GroupSelection, Participant, Round, ScoreRecord};
use crate::ranking::window::RoundSpan;

pub use memory::MemoryScoreStore;
pub use sqlite::SqliteScoreStore;

/// Per-round points of the substitute participant
pub type RoundPoints = BTreeMap<Round, f64>;

pub trait ScoreStore: Send + Sync {
    /// Points per participant and round inside `span`, summed over the
    /// selected groups. For a multi-group selection only participants who
    /// scored in every group of a round are returned for that round.
    /// Records are ordered by participant, then round.
    fn query_scores(&self, groups: &GroupSelection, span: &RoundSpan) -> Result<Vec<ScoreRecord>>;

    /// Per-round points of the participant with `login`, or `None` if no
    /// such participant exists.
    fn query_substitute_scores(
        &self,
        login: &str,
        groups: &GroupSelection,
        span: &RoundSpan,
    ) -> Result<Option<RoundPoints>>;

    /// Latest scheduled round on or before `today`
    fn latest_known_round(&self, today: Round) -> Result<Option<Round>>;

    fn resolve_display_identity(
        &self,
        participant: &Participant,
    ) -> Result<Option<DisplayIdentity>>;

    /// Closest scored round strictly before `round`
    fn round_before(&self, round: Round) -> Result<Option<Round>>;

    /// Closest scored round strictly after `round`
    fn round_after(&self, round: Round) -> Result<Option<Round>>;
}

/// Relative link to a participant's public profile
pub fn profile_link(login: &str) -> String {
    format!("/players/{}/", urlencoding::encode(login))
}
