//! Orchestration mode definitions.
//!
//! [`OrchestrationMode`] selects which schedules of the catalog participate
//! in a run. The mode is fixed when the run starts.

use super::catalog::ScheduleId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which subset of the pipeline a run walks through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrchestrationMode {
    /// All five schedules (default)
    #[default]
    Full,
    /// Single-task agent loop: Design → Implement → Verify
    InfiniteMap,
    /// Exploration only: Research → Design
    ExploreMap,
}

impl OrchestrationMode {
    /// Schedules included by this mode, in traversal order.
    pub fn schedules(&self) -> &'static [ScheduleId] {
        match self {
            OrchestrationMode::Full => &ScheduleId::ALL,
            OrchestrationMode::InfiniteMap => &[
                ScheduleId::Design,
                ScheduleId::Implement,
                ScheduleId::Verify,
            ],
            OrchestrationMode::ExploreMap => &[ScheduleId::Research, ScheduleId::Design],
        }
    }

    pub fn includes(&self, schedule: ScheduleId) -> bool {
        self.schedules().contains(&schedule)
    }

    /// First schedule a run in this mode starts at.
    pub fn first_schedule(&self) -> ScheduleId {
        self.schedules()[0]
    }

    /// The schedule following `schedule` in this mode, if any.
    ///
    /// Returns `None` for the last schedule and for schedules the mode does
    /// not include.
    pub fn next_after(&self, schedule: ScheduleId) -> Option<ScheduleId> {
        let schedules = self.schedules();
        let index = schedules.iter().position(|s| *s == schedule)?;
        schedules.get(index + 1).copied()
    }

    /// Get a human-readable description of this mode
    pub fn description(&self) -> &'static str {
        match self {
            OrchestrationMode::Full => "Full: Research → Design → Implement → Verify → Deliver",
            OrchestrationMode::InfiniteMap => "Infinite map: Design → Implement → Verify",
            OrchestrationMode::ExploreMap => "Explore map: Research → Design",
        }
    }
}

impl fmt::Display for OrchestrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrchestrationMode::Full => write!(f, "full"),
            OrchestrationMode::InfiniteMap => write!(f, "infinite-map"),
            OrchestrationMode::ExploreMap => write!(f, "explore-map"),
        }
    }
}

impl std::str::FromStr for OrchestrationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(OrchestrationMode::Full),
            "infinite-map" | "infinitemap" | "infinite" => Ok(OrchestrationMode::InfiniteMap),
            "explore-map" | "exploremap" | "explore" => Ok(OrchestrationMode::ExploreMap),
            _ => Err(format!("Invalid OrchestrationMode: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        assert_eq!(OrchestrationMode::default(), OrchestrationMode::Full);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", OrchestrationMode::Full), "full");
        assert_eq!(format!("{}", OrchestrationMode::InfiniteMap), "infinite-map");
        assert_eq!(format!("{}", OrchestrationMode::ExploreMap), "explore-map");
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "full".parse::<OrchestrationMode>().ok(),
            Some(OrchestrationMode::Full)
        );
        assert_eq!(
            "Infinite".parse::<OrchestrationMode>().ok(),
            Some(OrchestrationMode::InfiniteMap)
        );
        assert_eq!(
            "explore-map".parse::<OrchestrationMode>().ok(),
            Some(OrchestrationMode::ExploreMap)
        );
        assert!("partial".parse::<OrchestrationMode>().is_err());
    }

    #[test]
    fn test_schedules_are_ordered_subsets() {
        for mode in [
            OrchestrationMode::Full,
            OrchestrationMode::InfiniteMap,
            OrchestrationMode::ExploreMap,
        ] {
            let schedules = mode.schedules();
            assert!(!schedules.is_empty());
            assert!(schedules.windows(2).all(|w| w[0] < w[1]));
        }
        assert_eq!(OrchestrationMode::Full.schedules().len(), 5);
    }

    #[test]
    fn test_next_after() {
        let mode = OrchestrationMode::InfiniteMap;
        assert_eq!(mode.first_schedule(), ScheduleId::Design);
        assert_eq!(mode.next_after(ScheduleId::Design), Some(ScheduleId::Implement));
        assert_eq!(mode.next_after(ScheduleId::Verify), None);
        assert_eq!(mode.next_after(ScheduleId::Research), None);
    }

    #[test]
    fn test_includes() {
        assert!(OrchestrationMode::ExploreMap.includes(ScheduleId::Research));
        assert!(!OrchestrationMode::ExploreMap.includes(ScheduleId::Implement));
    }
}
