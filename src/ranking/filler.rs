use super::loader::{LoadedScores, Substitute};
use super::window::ResolvedWindow;
use crate::domain::{ParticipantId, Round};

/// Points a participant is credited with for one round
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilledScore {
    pub round: Round,
    pub points: f64,
    /// Only an own recorded score counts as played, never a substitution
    pub played: bool,
}

/// Own score if present, else the substitute's score, else 0
pub fn effective_score(own: Option<f64>, substitute: &Substitute, round: Round) -> FilledScore {
    match own {
        Some(points) => FilledScore {
            round,
            points,
            played: true,
        },
        None => FilledScore {
            round,
            points: substitute.points_for(round).unwrap_or(0.0),
            played: false,
        },
    }
}

/// Effective scores of one participant for every round seen in the span,
/// skipping rounds after the latest known round.
pub fn fill_participant(
    loaded: &LoadedScores,
    participant: ParticipantId,
    window: &ResolvedWindow,
) -> Vec<FilledScore> {
    loaded
        .table
        .rounds()
        .iter()
        .copied()
        .filter(|round| !window.is_after_latest(*round))
        .map(|round| {
            let own = loaded.table.own_score(participant, round);
            effective_score(own, &loaded.substitute, round)
        })
        .collect()
}
