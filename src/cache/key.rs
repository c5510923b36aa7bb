use std::fmt;

use crate::domain::{GroupSelection, Round};
use crate::ranking::window::RoundWindow;

/// Name under which a ranking result is cached.
///
/// Derived from the caller's namespace, the sorted group ids and all four
/// window bounds, so equal requests always map to the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn derive(namespace: &str, groups: &GroupSelection, window: &RoundWindow) -> Self {
        let group_part = groups
            .sorted_ids()
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join("-");

        Self(format!(
            "ranking_{}_{}-{}_{}-{}_{}",
            sanitize(namespace),
            bound_or_null(window.from_prev),
            bound_or_null(window.to_prev),
            window.from,
            window.to,
            group_part
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn bound_or_null(bound: Option<Round>) -> String {
    bound.map_or_else(|| "NULL".to_string(), |b| b.to_string())
}

/// Keys double as file names: spaces become `_`, everything else that is
/// not URL-safe is percent-encoded
fn sanitize(namespace: &str) -> String {
    urlencoding::encode(&namespace.replace(' ', "_")).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Group;

    #[test]
    fn test_key_without_previous_window() {
        let groups = GroupSelection::single(Group::new(1, "Berlin"));
        let key = CacheKey::derive("weekend ranking", &groups, &RoundWindow::single(17830));

        assert_eq!(key.as_str(), "ranking_weekend_ranking_NULL-NULL_17830-17830_1");
    }

    #[test]
    fn test_key_ignores_group_order() {
        let window = RoundWindow::with_previous(17830, 17900, 17823, 17893);
        let a = GroupSelection::new(vec![Group::new(5, "Zurich"), Group::new(1, "Berlin")]);
        let b = GroupSelection::new(vec![Group::new(1, "Berlin"), Group::new(5, "Zurich")]);

        let key = CacheKey::derive("season", &a, &window);
        assert_eq!(key, CacheKey::derive("season", &b, &window));
        assert_eq!(key.as_str(), "ranking_season_17823-17893_17830-17900_1-5");
    }

    #[test]
    fn test_namespace_cannot_escape_cache_dir() {
        let groups = GroupSelection::single(Group::new(1, "Berlin"));
        let key = CacheKey::derive("../../etc", &groups, &RoundWindow::single(1));
        assert!(!key.as_str().contains('/'));
        assert_eq!(std::path::Path::new(key.as_str()).components().count(), 1);
    }

    #[test]
    fn test_distinct_namespaces_get_distinct_keys() {
        let groups = GroupSelection::single(Group::new(1, "Berlin"));
        let window = RoundWindow::single(17830);

        let dotted = CacheKey::derive("a.b", &groups, &window);
        let underscored = CacheKey::derive("a_b", &groups, &window);
        let slashed = CacheKey::derive("a/b", &groups, &window);

        assert_ne!(dotted, underscored);
        assert_ne!(slashed, underscored);
        assert_eq!(slashed.as_str(), "ranking_a%2Fb_NULL-NULL_17830-17830_1");
    }
}
