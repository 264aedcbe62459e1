//! Parameter structures and validation for the simulation engine.
//!
//! Every public operation accepts year-like inputs as `f64` and converts them
//! to integer years through a single rule ([`floor_year`]), so fractional
//! inputs behave identically at every entry point. Validation happens eagerly,
//! before any computation.

use std::fmt;

use crate::error::{Result, SimError};

/// Convert a year-like input to an integer year.
///
/// Fractional values are floored; non-finite values are rejected. This is the
/// one conversion rule used by every public entry point.
pub fn floor_year(name: &str, value: f64) -> Result<i64> {
    if !value.is_finite() {
        return Err(SimError::InvalidParameter(format!(
            "{name} must be a finite number, got {value}"
        )));
    }
    Ok(value.floor() as i64)
}

/// Check that a probability-like value lies in `[0, 1]`.
fn check_fraction(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SimError::InvalidParameter(format!(
            "{name} must lie in [0, 1], got {value}"
        )));
    }
    Ok(())
}

/// Parameters for generating an unscreened base cohort
#[derive(Debug, Clone)]
pub struct CohortParams {
    /// Size of the population at risk
    pub pop_size: f64,
    /// Annual probability of preclinical disease onset
    pub onset_rate: f64,
    /// Shortest sojourn time (years in the detectable preclinical state)
    pub sojourn_min: f64,
    /// Longest sojourn time
    pub sojourn_max: f64,
    /// Length of follow-up in years
    pub followup_years: f64,
}

impl CohortParams {
    /// Validate all bounds and convert year-like fields to integers.
    pub fn validate(&self) -> Result<ValidCohortParams> {
        if !(self.pop_size.is_finite() && self.pop_size > 0.0) {
            return Err(SimError::InvalidParameter(format!(
                "pop_size must be positive, got {}",
                self.pop_size
            )));
        }
        if !(self.onset_rate.is_finite() && self.onset_rate >= 0.0) {
            return Err(SimError::InvalidParameter(format!(
                "onset_rate must be non-negative, got {}",
                self.onset_rate
            )));
        }
        let sojourn_min = floor_year("sojourn_min", self.sojourn_min)?;
        let sojourn_max = floor_year("sojourn_max", self.sojourn_max)?;
        let followup_years = floor_year("followup_years", self.followup_years)?;
        if sojourn_min < 0 || sojourn_min > sojourn_max {
            return Err(SimError::InvalidParameter(format!(
                "sojourn range must satisfy 0 <= sojourn_min <= sojourn_max, \
                 got [{sojourn_min}, {sojourn_max}]"
            )));
        }
        if followup_years <= 0 {
            return Err(SimError::InvalidParameter(format!(
                "followup_years must be positive, got {followup_years}"
            )));
        }
        Ok(ValidCohortParams {
            pop_size: self.pop_size,
            onset_rate: self.onset_rate,
            sojourn_min,
            sojourn_max,
            followup_years,
        })
    }
}

impl fmt::Display for CohortParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cohort Parameters:")?;
        writeln!(f, "  Population Size: {}", self.pop_size)?;
        writeln!(f, "  Onset Rate: {}", self.onset_rate)?;
        writeln!(
            f,
            "  Sojourn Range: [{}, {}]",
            self.sojourn_min, self.sojourn_max
        )?;
        writeln!(f, "  Follow-up Years: {}", self.followup_years)?;
        Ok(())
    }
}

/// Validated, integer-year form of [`CohortParams`]
#[derive(Debug, Clone, Copy)]
pub struct ValidCohortParams {
    /// Size of the population at risk
    pub pop_size: f64,
    /// Annual probability of preclinical disease onset
    pub onset_rate: f64,
    /// Shortest sojourn time
    pub sojourn_min: i64,
    /// Longest sojourn time
    pub sojourn_max: i64,
    /// Length of follow-up in years
    pub followup_years: i64,
}

impl ValidCohortParams {
    /// Number of distinct sojourn values in the cohort
    #[must_use]
    pub fn sojourn_count(&self) -> i64 {
        self.sojourn_max - self.sojourn_min + 1
    }
}

/// Parameters for a screening programme applied to a cohort
#[derive(Debug, Clone)]
pub struct ScreeningParams {
    /// Probability that a test detects preclinical disease
    pub sensitivity: f64,
    /// Probability that an offered test is attended
    pub attendance: f64,
    /// First year a screening round is offered
    pub screen_start_year: f64,
    /// Year screening stops; no round takes place in this year
    pub screen_stop_year: f64,
}

impl ScreeningParams {
    /// Validate the programme against the follow-up horizon of the cohort it
    /// will be applied to.
    pub fn validate(&self, followup_years: i64) -> Result<ValidScreeningParams> {
        check_fraction("sensitivity", self.sensitivity)?;
        check_fraction("attendance", self.attendance)?;
        let start = floor_year("screen_start_year", self.screen_start_year)?;
        let stop = floor_year("screen_stop_year", self.screen_stop_year)?;
        if start > stop {
            return Err(SimError::InvalidParameter(format!(
                "screen_start_year ({start}) must not exceed screen_stop_year ({stop})"
            )));
        }
        if stop > followup_years {
            return Err(SimError::InvalidParameter(format!(
                "screen_stop_year ({stop}) must not exceed followup_years ({followup_years})"
            )));
        }
        Ok(ValidScreeningParams {
            sensitivity: self.sensitivity,
            attendance: self.attendance,
            start,
            stop,
        })
    }
}

impl fmt::Display for ScreeningParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Screening Parameters:")?;
        writeln!(f, "  Sensitivity: {}", self.sensitivity)?;
        writeln!(f, "  Attendance: {}", self.attendance)?;
        writeln!(
            f,
            "  Screening Window: [{}, {})",
            self.screen_start_year, self.screen_stop_year
        )?;
        Ok(())
    }
}

/// Validated, integer-year form of [`ScreeningParams`]
#[derive(Debug, Clone, Copy)]
pub struct ValidScreeningParams {
    /// Probability that a test detects preclinical disease
    pub sensitivity: f64,
    /// Probability that an offered test is attended
    pub attendance: f64,
    /// First year a screening round is offered
    pub start: i64,
    /// Year screening stops (exclusive round bound)
    pub stop: i64,
}

impl ValidScreeningParams {
    /// Per-test probability that a preclinical case goes undetected: the
    /// person either does not attend, or attends and tests false-negative.
    #[must_use]
    pub fn miss_probability(&self) -> f64 {
        self.attendance * (1.0 - self.sensitivity) + (1.0 - self.attendance)
    }
}

/// Check that an overdiagnosis rate lies in `[0, 1)`.
///
/// A rate of exactly 1 would make the inflation factor divide by zero, so it
/// is rejected along with out-of-range values.
pub fn check_overdiag_rate(overdiag_rate: f64) -> Result<()> {
    if !(0.0..1.0).contains(&overdiag_rate) {
        return Err(SimError::InvalidParameter(format!(
            "overdiag_rate must lie in [0, 1), got {overdiag_rate}"
        )));
    }
    Ok(())
}
