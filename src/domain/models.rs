use serde::{Deserialize, Serialize};

use super::round::Round;

pub type GroupId = i64;
pub type ParticipantId = i64;

/// A participation scope, usually a city
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

impl Group {
    pub fn new(id: GroupId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// One group or a fixed collection of groups a ranking is computed for.
///
/// A collection means AND-of-participation: a participant only counts for
/// a round when they scored in every group of the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSelection {
    groups: Vec<Group>,
}

impl GroupSelection {
    /// Repeated group ids are dropped, keeping the first occurrence
    pub fn new(groups: Vec<Group>) -> Self {
        let mut unique: Vec<Group> = Vec::with_capacity(groups.len());
        for group in groups {
            if !unique.iter().any(|g| g.id == group.id) {
                unique.push(group);
            }
        }
        Self { groups: unique }
    }

    pub fn single(group: Group) -> Self {
        Self {
            groups: vec![group],
        }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn ids(&self) -> Vec<GroupId> {
        self.groups.iter().map(|g| g.id).collect()
    }

    pub fn sorted_ids(&self) -> Vec<GroupId> {
        let mut ids = self.ids();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Names of all groups joined by a single space
    pub fn display_name(&self) -> String {
        self.groups
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub login: String,
}

impl Participant {
    pub fn new(id: ParticipantId, login: impl Into<String>) -> Self {
        Self {
            id,
            login: login.into(),
        }
    }
}

/// Points of one participant for one round, summed over the selected groups.
/// Every record returned by a store counts as played.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    pub participant: Participant,
    pub round: Round,
    pub points: f64,
}

/// How a participant is presented to readers of the ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayIdentity {
    pub display_name: String,
    pub display_class: String,
    pub profile_link: String,
}

impl DisplayIdentity {
    pub const DEFAULT_CLASS: &'static str = "player";

    /// Identity used when the directory lookup fails: the raw login.
    pub fn fallback(login: &str) -> Self {
        Self {
            display_name: login.to_string(),
            display_class: Self::DEFAULT_CLASS.to_string(),
            profile_link: String::new(),
        }
    }
}
