//! Overdiagnosis augmentation of screen-detected counts.
//!
//! Overdiagnosed cases are screen-detected disease that would never have
//! presented clinically. They are modeled as a constant proportional
//! inflation of the screen-detected counts and sit outside the conservation
//! law: they are extra diagnoses, not drawn from the onset pool.

use serde::{Deserialize, Serialize};

use crate::config::check_overdiag_rate;
use crate::error::Result;
use crate::screening::ScreenedStratum;

/// A screening-round detection with its overdiagnosed companion count
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverdiagDetection {
    /// Calendar year of the screening round
    pub screen_year: i64,
    /// Expected number of stratum cases detected at this round
    pub count_screen: f64,
    /// Extra diagnoses attributable to screening at this round
    pub count_overdiag: f64,
}

/// A screened stratum with overdiagnosis applied to every round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverdiagStratum {
    /// Year the preclinical disease begins
    pub onset_year: i64,
    /// Years spent in the detectable preclinical state
    pub sojourn: i64,
    /// Expected number of onset cases in this stratum
    pub count_onset: f64,
    /// Year the stratum presents clinically absent screening
    pub clinical_year: i64,
    /// Number of screening rounds falling inside the preclinical window
    pub tests_offered: i64,
    /// Cases that survive every offered round and present clinically
    pub count_clinical: f64,
    /// Per-round detections with overdiagnosed counts
    pub detections: Vec<OverdiagDetection>,
}

impl OverdiagStratum {
    /// Total screen-detected cases across all rounds
    #[must_use]
    pub fn count_screen_total(&self) -> f64 {
        self.detections.iter().map(|d| d.count_screen).sum()
    }

    /// Total overdiagnosed cases across all rounds
    #[must_use]
    pub fn count_overdiag_total(&self) -> f64 {
        self.detections.iter().map(|d| d.count_overdiag).sum()
    }
}

/// Inflate the screen-detected counts of every stratum by a constant
/// overdiagnosis fraction: `count_overdiag = rate * count_screen / (1 - rate)`.
///
/// Fails with `InvalidParameter` when `overdiag_rate` lies outside `[0, 1)`;
/// a rate of 1 is undefined (division by zero) and must be excluded by the
/// caller.
pub fn augment_overdiag(
    strata: Vec<ScreenedStratum>,
    overdiag_rate: f64,
) -> Result<Vec<OverdiagStratum>> {
    check_overdiag_rate(overdiag_rate)?;
    let inflation = overdiag_rate / (1.0 - overdiag_rate);

    Ok(strata
        .into_iter()
        .map(|s| OverdiagStratum {
            onset_year: s.onset_year,
            sojourn: s.sojourn,
            count_onset: s.count_onset,
            clinical_year: s.clinical_year,
            tests_offered: s.tests_offered,
            count_clinical: s.count_clinical,
            detections: s
                .detections
                .into_iter()
                .map(|d| OverdiagDetection {
                    screen_year: d.screen_year,
                    count_screen: d.count_screen,
                    count_overdiag: inflation * d.count_screen,
                })
                .collect(),
        })
        .collect())
}
