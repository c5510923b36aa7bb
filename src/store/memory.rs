use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;

use super::{RoundPoints, ScoreStore, profile_link};
use crate::domain::{
    DisplayIdentity, GroupId, GroupSelection, Participant, ParticipantId, Round, ScoreRecord,
};
use crate::ranking::window::RoundSpan;

#[derive(Debug, Clone)]
struct StoredScore {
    participant_id: ParticipantId,
    group_id: GroupId,
    round: Round,
    points: f64,
}

/// Score store kept entirely in memory, with the same query semantics as
/// the SQLite store. Handy for fixtures and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    participants: BTreeMap<ParticipantId, (Participant, Option<DisplayIdentity>)>,
    rounds: BTreeSet<Round>,
    scores: Vec<StoredScore>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_participant(mut self, id: ParticipantId, login: &str) -> Self {
        let identity = DisplayIdentity {
            display_name: login.to_string(),
            display_class: DisplayIdentity::DEFAULT_CLASS.to_string(),
            profile_link: profile_link(login),
        };
        self.participants
            .insert(id, (Participant::new(id, login), Some(identity)));
        self
    }

    /// Participant that scores but has no entry in the display directory
    pub fn with_anonymous_participant(mut self, id: ParticipantId, login: &str) -> Self {
        self.participants
            .insert(id, (Participant::new(id, login), None));
        self
    }

    pub fn with_round(mut self, round: Round) -> Self {
        self.rounds.insert(round);
        self
    }

    pub fn with_score(
        mut self,
        participant_id: ParticipantId,
        group_id: GroupId,
        round: Round,
        points: f64,
    ) -> Self {
        self.add_score(participant_id, group_id, round, points);
        self
    }

    pub fn add_score(
        &mut self,
        participant_id: ParticipantId,
        group_id: GroupId,
        round: Round,
        points: f64,
    ) {
        self.rounds.insert(round);
        self.scores.retain(|s| {
            !(s.participant_id == participant_id && s.group_id == group_id && s.round == round)
        });
        self.scores.push(StoredScore {
            participant_id,
            group_id,
            round,
            points,
        });
    }

    fn find_by_login(&self, login: &str) -> Option<&Participant> {
        self.participants
            .values()
            .map(|(p, _)| p)
            .find(|p| p.login == login)
    }

    /// (participant, round) -> (summed points, groups played)
    fn sum_by_participant_round(
        &self,
        groups: &GroupSelection,
        span: &RoundSpan,
        keep: impl Fn(&StoredScore) -> bool,
    ) -> BTreeMap<(ParticipantId, Round), (f64, usize)> {
        let group_ids = groups.ids();
        let mut sums = BTreeMap::new();

        for score in self.scores.iter().filter(|s| {
            group_ids.contains(&s.group_id) && span.contains(s.round) && keep(*s)
        }) {
            let entry = sums
                .entry((score.participant_id, score.round))
                .or_insert((0.0, 0));
            entry.0 += score.points;
            entry.1 += 1;
        }
        sums
    }
}

impl ScoreStore for MemoryScoreStore {
    fn query_scores(&self, groups: &GroupSelection, span: &RoundSpan) -> Result<Vec<ScoreRecord>> {
        let required = groups.len();
        let sums = self.sum_by_participant_round(groups, span, |_| true);

        Ok(sums
            .into_iter()
            .filter(|(_, (_, played))| required <= 1 || *played == required)
            .filter_map(|((participant_id, round), (points, _))| {
                let (participant, _) = self.participants.get(&participant_id)?;
                Some(ScoreRecord {
                    participant: participant.clone(),
                    round,
                    points,
                })
            })
            .collect())
    }

    fn query_substitute_scores(
        &self,
        login: &str,
        groups: &GroupSelection,
        span: &RoundSpan,
    ) -> Result<Option<RoundPoints>> {
        let Some(substitute) = self.find_by_login(login) else {
            return Ok(None);
        };
        let substitute_id = substitute.id;

        let sums = self.sum_by_participant_round(groups, span, move |s| {
            s.participant_id == substitute_id
        });
        Ok(Some(
            sums.into_iter()
                .map(|((_, round), (points, _))| (round, points))
                .collect(),
        ))
    }

    fn latest_known_round(&self, today: Round) -> Result<Option<Round>> {
        Ok(self.rounds.range(..=today).next_back().copied())
    }

    fn resolve_display_identity(
        &self,
        participant: &Participant,
    ) -> Result<Option<DisplayIdentity>> {
        Ok(self
            .participants
            .get(&participant.id)
            .and_then(|(_, identity)| identity.clone()))
    }

    fn round_before(&self, round: Round) -> Result<Option<Round>> {
        Ok(self
            .scores
            .iter()
            .map(|s| s.round)
            .filter(|r| *r < round)
            .max())
    }

    fn round_after(&self, round: Round) -> Result<Option<Round>> {
        Ok(self
            .scores
            .iter()
            .map(|s| s.round)
            .filter(|r| *r > round)
            .min())
    }
}
