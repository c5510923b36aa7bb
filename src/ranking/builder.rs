use log::debug;

use super::aggregate::ParticipantTotals;
use super::rank::{assign_ranks, round_to};
use super::types::{RankedEntry, RankingMeta, RankingResult, WindowLabels};
use super::window::ResolvedWindow;
use crate::domain::round::format_round;
use crate::domain::{DisplayIdentity, GroupSelection, Participant, Round};

/// Decimals of the points difference to the leader
const DIFF_PRECISION: i32 = 1;

/// Everything besides the totals needed to assemble a result
#[derive(Debug, Clone)]
pub struct ResultContext<'a> {
    pub groups: &'a GroupSelection,
    pub window: &'a ResolvedWindow,
    pub round_count: u32,
    pub points_max_per_round: f64,
    pub score_precision: i32,
    pub labels: WindowLabels,
    pub older: Option<Round>,
    pub newer: Option<Round>,
}

/// Rounds that could have been played: at or after `from` and not after
/// `latest`. A `from` before every known round simply counts nothing.
pub fn count_eligible_rounds(rounds: &[Round], from: Round, latest: Option<Round>) -> u32 {
    rounds
        .iter()
        .filter(|&&r| r >= from && latest.is_none_or(|latest| r <= latest))
        .count() as u32
}

pub fn theoretical_max(points_max_per_round: f64, round_count: u32, group_count: usize) -> f64 {
    points_max_per_round * f64::from(round_count) * group_count as f64
}

pub fn relative_points(points: f64, points_max: f64) -> f64 {
    if points_max > 0.0 {
        points / points_max
    } else {
        0.0
    }
}

/// Ranks the totals and assembles the result, leader first.
///
/// Entries with the same rank keep their discovery order.
pub fn build_result(
    totals: Vec<ParticipantTotals>,
    context: &ResultContext<'_>,
    resolve_identity: impl Fn(&Participant) -> DisplayIdentity,
) -> RankingResult {
    let precision = context.score_precision;
    let has_trend = context.window.has_trend();

    let current_ranks = assign_ranks(
        &totals
            .iter()
            .map(|t| round_to(t.current.points, precision))
            .collect::<Vec<_>>(),
    );
    let previous_ranks = has_trend.then(|| {
        assign_ranks(
            &totals
                .iter()
                .map(|t| round_to(t.previous.unwrap_or_default().points, precision))
                .collect::<Vec<_>>(),
        )
    });

    let mut order: Vec<usize> = (0..totals.len()).collect();
    order.sort_by_key(|&idx| current_ranks[idx]);

    let points_max = theoretical_max(
        context.points_max_per_round,
        context.round_count,
        context.groups.len(),
    );
    let leader_points = order
        .first()
        .map(|&idx| totals[idx].current.points)
        .unwrap_or_default();

    let entries: Vec<RankedEntry> = order
        .into_iter()
        .map(|idx| {
            let total = &totals[idx];
            let rank = current_ranks[idx];
            let previous_rank = previous_ranks.as_ref().map(|ranks| ranks[idx]);

            RankedEntry {
                participant_id: total.participant.id,
                login: total.participant.login.clone(),
                rank,
                points: total.current.points,
                played: total.current.played,
                points_diff: round_to(leader_points - total.current.points, DIFF_PRECISION),
                points_relative: relative_points(total.current.points, points_max),
                previous_rank,
                trend: previous_rank.map(|previous| i64::from(previous) - i64::from(rank)),
                identity: resolve_identity(&total.participant),
            }
        })
        .collect();

    debug!(
        "Built ranking of {} entries over {} rounds (max {} points)",
        entries.len(),
        context.round_count,
        points_max
    );

    RankingResult {
        meta: RankingMeta {
            has_trend,
            round_count: context.round_count,
            points_max,
            group_name: context.groups.display_name(),
            from: format_round(context.window.window.from),
            to: format_round(context.window.window.to),
            labels: context.labels.clone(),
            older: context.older,
            newer: context.newer,
        },
        entries,
    }
}
