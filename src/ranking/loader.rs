use std::collections::HashMap;

use log::{debug, info};

use super::window::RoundSpan;
use crate::domain::{GroupSelection, Participant, ParticipantId, Round, ScoreRecord};
use crate::errors::RankingError;
use crate::store::{RoundPoints, ScoreStore};

/// Own scores of every participant seen in the queried span.
/// Participants and rounds keep the order they were first seen in.
#[derive(Debug, Clone, Default)]
pub struct ScoreTable {
    participants: Vec<Participant>,
    rounds: Vec<Round>,
    scores: HashMap<ParticipantId, HashMap<Round, f64>>,
}

impl ScoreTable {
    pub fn from_records(records: Vec<ScoreRecord>) -> Self {
        let mut table = Self::default();
        for record in records {
            table.insert(record);
        }
        table
    }

    fn insert(&mut self, record: ScoreRecord) {
        if !self.rounds.contains(&record.round) {
            self.rounds.push(record.round);
        }

        let participant_id = record.participant.id;
        if !self.scores.contains_key(&participant_id) {
            self.participants.push(record.participant);
        }
        self.scores
            .entry(participant_id)
            .or_default()
            .insert(record.round, record.points);
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn own_score(&self, participant: ParticipantId, round: Round) -> Option<f64> {
        self.scores.get(&participant)?.get(&round).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

/// Scores of the designated stand-in for participants who skipped a round
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Substitute {
    /// The login is unknown, so nobody is ever substituted
    #[default]
    Absent,
    Present(RoundPoints),
}

impl Substitute {
    pub fn points_for(&self, round: Round) -> Option<f64> {
        match self {
            Self::Absent => None,
            Self::Present(points) => points.get(&round).copied(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadedScores {
    pub table: ScoreTable,
    pub substitute: Substitute,
}

/// Reads the participants' scores and the substitute's scores for `span`.
/// Any store failure aborts the ranking.
pub fn load_scores<S: ScoreStore + ?Sized>(
    store: &S,
    groups: &GroupSelection,
    span: &RoundSpan,
    substitute_login: &str,
) -> Result<LoadedScores, RankingError> {
    let substitute = match store
        .query_substitute_scores(substitute_login, groups, span)
        .map_err(RankingError::Store)?
    {
        Some(points) => Substitute::Present(points),
        None => {
            info!("Substitute '{}' not found, missing scores count as 0", substitute_login);
            Substitute::Absent
        }
    };

    let records = store.query_scores(groups, span).map_err(RankingError::Store)?;
    let table = ScoreTable::from_records(records);
    debug!(
        "Loaded {} participants over {} rounds ({}..={})",
        table.participants().len(),
        table.rounds().len(),
        span.min,
        span.max
    );

    Ok(LoadedScores { table, substitute })
}
