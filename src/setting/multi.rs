//! Gradual-dissemination setting: screening uptake spread across sub-cohorts.

use std::collections::BTreeMap;
use std::fmt;

use itertools::izip;

use crate::error::{Result, SimError};

use super::population::{PopulationSettingParams, population_setting};
use super::YearRecord;

/// Tolerance for the proportions-sum-to-one check
const PROPORTION_TOL: f64 = 1e-9;

/// Parameters for [`multipopulation_setting`]
#[derive(Debug, Clone)]
pub struct MultiPopulationParams {
    /// Size of the whole population before splitting
    pub pop_size: f64,
    /// Annual probability of preclinical disease onset
    pub onset_rate: f64,
    /// Shortest sojourn time
    pub sojourn_min: f64,
    /// Longest sojourn time
    pub sojourn_max: f64,
    /// Probability that a test detects preclinical disease
    pub sensitivity: f64,
    /// Fraction of screen detections that are overdiagnosed
    pub overdiag_rate: f64,
    /// Fraction of the population in each sub-cohort; must sum to 1
    pub proportion: Vec<f64>,
    /// Year each sub-cohort's screening starts, parallel to `proportion`
    pub start_year: Vec<f64>,
    /// Length of follow-up in years
    pub followup_years: f64,
}

impl fmt::Display for MultiPopulationParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Multi-Population Setting:")?;
        writeln!(f, "  Population Size: {}", self.pop_size)?;
        writeln!(f, "  Sub-Cohorts: {}", self.proportion.len())?;
        for (proportion, start_year) in izip!(&self.proportion, &self.start_year) {
            writeln!(
                f,
                "    proportion {proportion} starting screening in year {start_year}"
            )?;
        }
        writeln!(f, "  Follow-up Years: {}", self.followup_years)?;
        Ok(())
    }
}

/// Project annual incidence for a population where screening disseminates
/// gradually: each sub-cohort adopts the programme in its own start year.
///
/// Runs [`population_setting`] per sub-cohort with `proportion[i] * pop_size`
/// participants and `start_year[i]` as the screening start (screening then
/// continues to the end of follow-up), and sums the sub-results per year.
pub fn multipopulation_setting(params: &MultiPopulationParams) -> Result<Vec<YearRecord>> {
    if params.proportion.len() != params.start_year.len() {
        return Err(SimError::InvalidParameter(format!(
            "proportion and start_year must have the same length, got {} and {}",
            params.proportion.len(),
            params.start_year.len()
        )));
    }
    for proportion in &params.proportion {
        if !(0.0..=1.0).contains(proportion) {
            return Err(SimError::InvalidParameter(format!(
                "each proportion must lie in [0, 1], got {proportion}"
            )));
        }
    }
    let total: f64 = params.proportion.iter().sum();
    if (total - 1.0).abs() > PROPORTION_TOL {
        return Err(SimError::InvalidParameter(format!(
            "proportions must sum to 1, got {total}"
        )));
    }

    let mut merged: BTreeMap<i64, YearRecord> = BTreeMap::new();
    for (proportion, start_year) in izip!(&params.proportion, &params.start_year) {
        let sub = population_setting(&PopulationSettingParams {
            pop_size: params.pop_size * proportion,
            onset_rate: params.onset_rate,
            sojourn_min: params.sojourn_min,
            sojourn_max: params.sojourn_max,
            sensitivity: params.sensitivity,
            overdiag_rate: params.overdiag_rate,
            screen_start_year: *start_year,
            screen_stop_year: params.followup_years,
            followup_years: params.followup_years,
        })?;
        for record in sub {
            merged
                .entry(record.year)
                .and_modify(|r| r.accumulate(&record))
                .or_insert(record);
        }
    }

    log::debug!(
        "Multi-population setting merged {} sub-cohorts into {} year rows",
        params.proportion.len(),
        merged.len()
    );

    Ok(merged.into_values().collect())
}
