use serde::{Deserialize, Serialize};

use crate::domain::Round;
use crate::errors::RankingError;

/// Current window `[from, to]` and, for trends, a previous window
/// `[from_prev, to_prev]`. The two may overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundWindow {
    pub from: Round,
    pub to: Round,
    pub from_prev: Option<Round>,
    pub to_prev: Option<Round>,
}

impl RoundWindow {
    pub fn new(from: Round, to: Round) -> Self {
        Self::from_bounds(from, to, None, None)
    }

    pub fn single(round: Round) -> Self {
        Self::new(round, round)
    }

    pub fn with_previous(from: Round, to: Round, from_prev: Round, to_prev: Round) -> Self {
        Self::from_bounds(from, to, Some(from_prev), Some(to_prev))
    }

    pub fn from_bounds(
        from: Round,
        to: Round,
        from_prev: Option<Round>,
        to_prev: Option<Round>,
    ) -> Self {
        Self {
            from,
            to,
            from_prev,
            to_prev,
        }
    }

    /// Trends need both previous bounds
    pub fn previous(&self) -> Option<(Round, Round)> {
        self.from_prev.zip(self.to_prev)
    }

    pub fn has_trend(&self) -> bool {
        self.previous().is_some()
    }

    pub fn is_single_round(&self) -> bool {
        self.from == self.to
    }
}

/// Closed range of rounds to query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSpan {
    pub min: Round,
    pub max: Round,
}

impl RoundSpan {
    pub fn new(min: Round, max: Round) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, round: Round) -> bool {
        round >= self.min && round <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedWindow {
    pub window: RoundWindow,
    pub span: RoundSpan,
    pub latest: Option<Round>,
}

impl ResolvedWindow {
    pub fn has_trend(&self) -> bool {
        self.window.has_trend()
    }

    pub fn in_current(&self, round: Round) -> bool {
        round >= self.window.from && round <= self.window.to
    }

    pub fn in_previous(&self, round: Round) -> bool {
        self.window
            .previous()
            .is_some_and(|(from, to)| round >= from && round <= to)
    }

    pub fn is_after_latest(&self, round: Round) -> bool {
        self.latest.is_some_and(|latest| round > latest)
    }
}

/// Computes the span to query for `window`.
///
/// Reversed bounds are tolerated; only a missing window is an error. The
/// upper bound is clamped to `latest` when given.
pub fn resolve_window(
    window: Option<&RoundWindow>,
    latest: Option<Round>,
) -> Result<ResolvedWindow, RankingError> {
    let window = *window.ok_or(RankingError::MissingWindow)?;

    let mut bounds = vec![window.from, window.to];
    if let Some((from_prev, to_prev)) = window.previous() {
        bounds.extend([from_prev, to_prev]);
    }

    let min = bounds.iter().copied().min().unwrap_or(window.from);
    let mut max = bounds.iter().copied().max().unwrap_or(window.to);
    if let Some(latest) = latest {
        max = max.min(latest);
    }

    Ok(ResolvedWindow {
        window,
        span: RoundSpan::new(min, max),
        latest,
    })
}
