//! Whole-population screening setting.

use std::fmt;

use crate::cohort::generate_validated;
use crate::config::{CohortParams, ScreeningParams, check_overdiag_rate};
use crate::error::Result;
use crate::screening::{overdiag::augment_overdiag, screen_cohort};

use super::{YearRecord, clinical_totals, round_totals};

/// Parameters for [`population_setting`]
#[derive(Debug, Clone)]
pub struct PopulationSettingParams {
    /// Size of the screened population
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
    /// First year a screening round is offered
    pub screen_start_year: f64,
    /// Year screening stops; no round takes place in this year
    pub screen_stop_year: f64,
    /// Length of follow-up in years
    pub followup_years: f64,
}

impl fmt::Display for PopulationSettingParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Population Setting:")?;
        writeln!(f, "  Population Size: {}", self.pop_size)?;
        writeln!(f, "  Onset Rate: {}", self.onset_rate)?;
        writeln!(
            f,
            "  Sojourn Range: [{}, {}]",
            self.sojourn_min, self.sojourn_max
        )?;
        writeln!(f, "  Sensitivity: {}", self.sensitivity)?;
        writeln!(f, "  Overdiagnosis Rate: {}", self.overdiag_rate)?;
        writeln!(
            f,
            "  Screening Window: [{}, {})",
            self.screen_start_year, self.screen_stop_year
        )?;
        writeln!(f, "  Follow-up Years: {}", self.followup_years)?;
        Ok(())
    }
}

/// Project annual incidence for a population offered organized screening.
///
/// Runs the full pipeline with full attendance, collapses the stratum
/// dimension, and merges the clinical and screening tables by year. Study
/// years without a screening round (before the programme starts or after it
/// stops) carry zero screen and overdiagnosis counts. The result holds one
/// row per year `0..=followup_years`, sorted.
pub fn population_setting(params: &PopulationSettingParams) -> Result<Vec<YearRecord>> {
    let cohort_params = CohortParams {
        pop_size: params.pop_size,
        onset_rate: params.onset_rate,
        sojourn_min: params.sojourn_min,
        sojourn_max: params.sojourn_max,
        followup_years: params.followup_years,
    }
    .validate()?;
    let screening = ScreeningParams {
        sensitivity: params.sensitivity,
        attendance: 1.0,
        screen_start_year: params.screen_start_year,
        screen_stop_year: params.screen_stop_year,
    }
    .validate(cohort_params.followup_years)?;
    check_overdiag_rate(params.overdiag_rate)?;

    let rows = generate_validated(&cohort_params);
    let strata = screen_cohort(&rows, &screening)?;
    let strata = augment_overdiag(strata, params.overdiag_rate)?;

    let clinical = clinical_totals(&strata);
    let mut rounds = round_totals(&strata);
    // Zero-fill study years without a round so the merge keeps them.
    for year in 0..=cohort_params.followup_years {
        rounds.entry(year).or_insert((0.0, 0.0));
    }

    // Inner join on year; only years present on both sides survive.
    let records: Vec<YearRecord> = rounds
        .into_iter()
        .filter(|(year, _)| (0..=cohort_params.followup_years).contains(year))
        .filter_map(|(year, (count_screen, count_overdiag))| {
            clinical.get(&year).map(|&count_clinical| YearRecord {
                year,
                count_clinical,
                count_screen,
                count_overdiag,
            })
        })
        .collect();

    log::debug!(
        "Population setting produced {} year rows over [0, {}]",
        records.len(),
        cohort_params.followup_years
    );

    Ok(records)
}
