use log::debug;
use serde::{Deserialize, Serialize};

use super::filler::{FilledScore, fill_participant};
use super::loader::LoadedScores;
use super::window::ResolvedWindow;
use crate::domain::Participant;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowTotal {
    pub points: f64,
    pub played: u32,
}

impl WindowTotal {
    fn add(&mut self, score: &FilledScore) {
        self.points += score.points;
        if score.played {
            self.played += 1;
        }
    }
}

/// Totals of one participant for the current and, with trends, the
/// previous window
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantTotals {
    pub participant: Participant,
    pub current: WindowTotal,
    pub previous: Option<WindowTotal>,
}

/// Sums effective scores per participant, in discovery order.
///
/// A round inside both windows counts for both. For a single-round window,
/// participants who did not play that round are dropped so they do not show
/// up with substitute points.
pub fn aggregate(loaded: &LoadedScores, window: &ResolvedWindow) -> Vec<ParticipantTotals> {
    let mut totals: Vec<ParticipantTotals> = loaded
        .table
        .participants()
        .iter()
        .map(|participant| aggregate_participant(loaded, participant, window))
        .collect();

    if window.window.is_single_round() {
        let before = totals.len();
        totals.retain(|t| t.current.played > 0);
        debug!("Dropped {} non-players from single-round ranking", before - totals.len());
    }

    totals
}

fn aggregate_participant(
    loaded: &LoadedScores,
    participant: &Participant,
    window: &ResolvedWindow,
) -> ParticipantTotals {
    let mut current = WindowTotal::default();
    let mut previous = window.has_trend().then(WindowTotal::default);

    for score in fill_participant(loaded, participant.id, window) {
        if let Some(previous) = previous.as_mut() {
            if window.in_previous(score.round) {
                previous.add(&score);
            }
        }
        if window.in_current(score.round) {
            current.add(&score);
        }
    }

    ParticipantTotals {
        participant: participant.clone(),
        current,
        previous,
    }
}
