//! Composed simulation settings.
//!
//! Each setting chains the cohort generator, the screening calculator, and
//! the overdiagnosis augmenter with its own parameterization, then collapses
//! the stratum dimension into a per-year incidence table. All settings are
//! stateless pure transforms: results are produced once and never mutated.

use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::screening::overdiag::OverdiagStratum;

mod multi;
mod population;
mod trial;

pub use multi::{MultiPopulationParams, multipopulation_setting};
pub use population::{PopulationSettingParams, population_setting};
pub use trial::{Arm, ArmYearRecord, TrialResult, TrialSettingParams, trial_setting};

/// One row of a composed per-year incidence table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    /// Calendar year relative to the start of follow-up
    pub year: i64,
    /// Clinically presenting diagnoses in this year
    pub count_clinical: f64,
    /// Screen-detected diagnoses in this year
    pub count_screen: f64,
    /// Overdiagnosed cases attributable to screening in this year
    pub count_overdiag: f64,
}

impl YearRecord {
    /// All diagnoses observed in this year
    #[must_use]
    pub fn total(&self) -> f64 {
        self.count_clinical + self.count_screen + self.count_overdiag
    }

    fn accumulate(&mut self, other: &YearRecord) {
        self.count_clinical += other.count_clinical;
        self.count_screen += other.count_screen;
        self.count_overdiag += other.count_overdiag;
    }
}

/// Sum clinical counts by clinical year.
///
/// Works on the structured strata, where each stratum carries its clinical
/// count exactly once; summing the unpivoted long form instead would repeat
/// the stratum-constant value per screening round.
fn clinical_totals(strata: &[OverdiagStratum]) -> BTreeMap<i64, f64> {
    strata
        .iter()
        .map(|s| (s.clinical_year, s.count_clinical))
        .into_grouping_map()
        .sum()
        .into_iter()
        .collect()
}

/// Sum screen-detected and overdiagnosed counts by screening-round year.
fn round_totals(strata: &[OverdiagStratum]) -> BTreeMap<i64, (f64, f64)> {
    let mut totals: BTreeMap<i64, (f64, f64)> = BTreeMap::new();
    for detection in strata.iter().flat_map(|s| s.detections.iter()) {
        let entry = totals.entry(detection.screen_year).or_insert((0.0, 0.0));
        entry.0 += detection.count_screen;
        entry.1 += detection.count_overdiag;
    }
    totals
}
