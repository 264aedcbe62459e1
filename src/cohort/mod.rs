//! Base cohort generation (no screening).
//!
//! The generator builds the stratified onset table that every downstream
//! component consumes: one row per `(onset_year, sojourn)` stratum, with the
//! annual expected onset count split evenly across the sojourn values.

use serde::{Deserialize, Serialize};

use crate::config::{CohortParams, ValidCohortParams};
use crate::error::Result;

/// One homogeneous sub-cohort: all cases sharing an onset year and a sojourn
/// time. Absent screening the whole stratum presents clinically at
/// `onset_year + sojourn`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CohortRow {
    /// Year the preclinical disease begins
    pub onset_year: i64,
    /// Years spent in the detectable preclinical state
    pub sojourn: i64,
    /// Expected number of onset cases in this stratum
    pub count_onset: f64,
    /// Year the stratum presents clinically absent screening
    pub clinical_year: i64,
}

/// Generate the stratified onset table for an unscreened cohort.
///
/// Onset years run from `-sojourn_max` through `followup_years`, each carrying
/// an expected `pop_size * onset_rate` cases. When `sojourn_max > 0`, the
/// table is extended with `sojourn_max` trailing zero-count onset years so
/// that late-onset strata still reach their clinical year inside the table.
/// The count for each onset year is split uniformly across the sojourn values
/// `sojourn_min..=sojourn_max`.
pub fn generate_cohort(params: &CohortParams) -> Result<Vec<CohortRow>> {
    let valid = params.validate()?;
    Ok(generate_validated(&valid))
}

/// Generation step for already-validated parameters; composed settings
/// validate once up front and call this directly.
#[must_use]
pub fn generate_validated(params: &ValidCohortParams) -> Vec<CohortRow> {
    let annual_onset = params.pop_size * params.onset_rate;
    let per_stratum = annual_onset / params.sojourn_count() as f64;

    let first_onset = -params.sojourn_max;
    let last_onset = params.followup_years + params.sojourn_max;

    let mut rows =
        Vec::with_capacity(((last_onset - first_onset + 1) * params.sojourn_count()) as usize);
    for onset_year in first_onset..=last_onset {
        let count_onset = if onset_year <= params.followup_years {
            per_stratum
        } else {
            0.0
        };
        for sojourn in params.sojourn_min..=params.sojourn_max {
            rows.push(CohortRow {
                onset_year,
                sojourn,
                count_onset,
                clinical_year: onset_year + sojourn,
            });
        }
    }

    log::debug!(
        "Generated cohort: {} strata over onset years [{first_onset}, {last_onset}]",
        rows.len()
    );

    rows
}
