//! Totals recomputed from the catalog on demand.

use serde::Serialize;

use crate::mission::Mission;
use crate::scoring::MAX_STARS;
use crate::MotionKind;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub total_missions: usize,
    pub completed_count: usize,
    pub total_stars: u32,
    pub max_stars: u32,
    pub total_points: u32,
}

impl ProgressSummary {
    fn add(&mut self, mission: &Mission) {
        self.total_missions += 1;
        self.max_stars += u32::from(MAX_STARS);
        if mission.is_completed() {
            self.completed_count += 1;
            self.total_points += mission.best_score();
        }
        self.total_stars += u32::from(mission.stars_earned());
    }

    /// Completed share in `[0, 100]`.
    #[allow(clippy::cast_precision_loss)]
    pub fn completion_percent(&self) -> f64 {
        if self.total_missions == 0 {
            return 0.0;
        }
        self.completed_count as f64 * 100.0 / self.total_missions as f64
    }
}

pub fn summarize<'a>(missions: impl IntoIterator<Item = &'a Mission>) -> ProgressSummary {
    let mut summary = ProgressSummary::default();
    for mission in missions {
        summary.add(mission);
    }
    summary
}

/// One summary per motion type, in `MotionKind::ALL` order.
pub fn summarize_by_motion<'a>(
    missions: impl IntoIterator<Item = &'a Mission>,
) -> Vec<(MotionKind, ProgressSummary)> {
    let mut rows: Vec<(MotionKind, ProgressSummary)> = MotionKind::ALL
        .iter()
        .map(|motion| (*motion, ProgressSummary::default()))
        .collect();
    for mission in missions {
        if let Some((_, summary)) = rows.iter_mut().find(|(motion, _)| *motion == mission.motion()) {
            summary.add(mission);
        }
    }
    rows
}
