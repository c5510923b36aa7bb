use chrono::{Datelike, NaiveDate, Utc};

/// Tournament date as days since 1970-01-01
pub type Round = i32;

// NaiveDate::num_days_from_ce() of 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub fn round_from_date(date: NaiveDate) -> Round {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

pub fn round_to_date(round: Round) -> Option<NaiveDate> {
    round
        .checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
}

/// The current wall-clock day as a round ordinal
pub fn today() -> Round {
    round_from_date(Utc::now().date_naive())
}

/// ISO date of a round, or the raw ordinal if it is out of chrono's range
pub fn format_round(round: Round) -> String {
    round_to_date(round)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| round.to_string())
}

/// Accepts either a day ordinal (`17830`) or an ISO date (`2018-10-27`)
pub fn parse_round(value: &str) -> Result<Round, String> {
    let value = value.trim();

    if let Ok(round) = value.parse::<Round>() {
        return Ok(round);
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(round_from_date)
        .map_err(|_| format!("'{}' is neither a day number nor a YYYY-MM-DD date", value))
}
