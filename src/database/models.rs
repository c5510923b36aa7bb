use crate::domain::{GroupId, ParticipantId, Round};

#[derive(Debug, Clone)]
pub struct DbParticipant {
    pub id: ParticipantId,
    pub login: String,
    pub display_name: Option<String>,
    pub display_class: String,
}

#[derive(Debug, Clone)]
pub struct DbGroup {
    pub id: GroupId,
    pub name: String,
}

/// One row of the per-participant, per-round aggregation
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRow {
    pub round: Round,
    pub participant_id: ParticipantId,
    pub login: String,
    pub points: f64,
}
