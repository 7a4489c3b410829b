//! Post-processed output of a simulation run.

use hs_control::ControlTables;
use hs_core::Series;
use hs_model::ModelSeries;

use crate::stats::RunStats;

/// Everything a run produced, ready for analysis.
#[derive(Debug, Clone)]
pub struct SimResults {
    /// Plant states, outputs and switching states per saved sample.
    pub model: ModelSeries,
    /// Controller signal groups, one row per control step.
    pub control: ControlTables,
    pub stats: RunStats,
}

impl SimResults {
    /// Plant series of one subsystem by name.
    pub fn subsystem(&self, name: &str) -> Option<&Series> {
        self.model.get(name)
    }

    /// Controller series of one signal group by name.
    pub fn signals(&self, group: &str) -> Option<&Series> {
        self.control.get(group)
    }
}
