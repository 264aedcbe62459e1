//! Two-arm randomized trial setting.
//!
//! Both arms start from one shared base cohort. The control arm is derived by
//! screening with zero sensitivity and zero attendance, so it is observed
//! purely through natural clinical presentation; the screen arm uses the
//! requested test characteristics.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cohort::{CohortRow, generate_validated};
use crate::config::{
    CohortParams, ScreeningParams, ValidScreeningParams, check_overdiag_rate,
};
use crate::error::Result;
use crate::screening::{overdiag::augment_overdiag, screen_cohort};

use super::{YearRecord, clinical_totals, round_totals};

/// Trial arm label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arm {
    /// Unscreened arm, observed through clinical presentation only
    Control,
    /// Arm offered the screening programme
    Screen,
}

impl fmt::Display for Arm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Control => write!(f, "control"),
            Self::Screen => write!(f, "screen"),
        }
    }
}

/// One row of the flattened trial table, tagged with its arm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmYearRecord {
    /// Trial arm this row belongs to
    pub arm: Arm,
    /// Calendar year relative to the start of follow-up
    pub year: i64,
    /// Clinically presenting diagnoses in this year
    pub count_clinical: f64,
    /// Screen-detected diagnoses in this year
    pub count_screen: f64,
    /// Overdiagnosed cases attributable to screening in this year
    pub count_overdiag: f64,
}

/// Per-year incidence for both trial arms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// Control arm, one row per year `0..=followup_years`
    pub control: Vec<YearRecord>,
    /// Screen arm, one row per year `0..=followup_years`
    pub screen: Vec<YearRecord>,
}

impl TrialResult {
    /// Flatten both arms into one table tagged with the arm label, control
    /// rows first.
    #[must_use]
    pub fn rows(&self) -> Vec<ArmYearRecord> {
        let tag = |arm: Arm, records: &[YearRecord]| {
            records
                .iter()
                .map(|r| ArmYearRecord {
                    arm,
                    year: r.year,
                    count_clinical: r.count_clinical,
                    count_screen: r.count_screen,
                    count_overdiag: r.count_overdiag,
                })
                .collect::<Vec<_>>()
        };
        let mut rows = tag(Arm::Control, &self.control);
        rows.extend(tag(Arm::Screen, &self.screen));
        rows
    }
}

/// Parameters for [`trial_setting`]
#[derive(Debug, Clone)]
pub struct TrialSettingParams {
    /// Number of participants per arm
    pub arm_size: f64,
    /// Annual probability of preclinical disease onset
    pub onset_rate: f64,
    /// Shortest sojourn time
    pub sojourn_min: f64,
    /// Longest sojourn time
    pub sojourn_max: f64,
    /// Probability that a test detects preclinical disease
    pub sensitivity: f64,
    /// Probability that an offered test is attended
    pub attendance: f64,
    /// Fraction of screen detections that are overdiagnosed
    pub overdiag_rate: f64,
    /// First year a screening round is offered
    pub screen_start_year: f64,
    /// Year screening stops; no round takes place in this year
    pub screen_stop_year: f64,
    /// Length of follow-up in years
    pub followup_years: f64,
}

impl fmt::Display for TrialSettingParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Trial Setting:")?;
        writeln!(f, "  Arm Size: {}", self.arm_size)?;
        writeln!(f, "  Onset Rate: {}", self.onset_rate)?;
        writeln!(
            f,
            "  Sojourn Range: [{}, {}]",
            self.sojourn_min, self.sojourn_max
        )?;
        writeln!(f, "  Sensitivity: {}", self.sensitivity)?;
        writeln!(f, "  Attendance: {}", self.attendance)?;
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

/// Project annual incidence for a two-arm randomized screening trial.
///
/// Generates one shared base cohort of `arm_size` and screens it twice, then
/// passes both arms through the overdiagnosis augmenter. Each arm's table is
/// an outer join of its clinical and screening totals, zero-filled and
/// restricted to `year` in `[0, followup_years]`.
pub fn trial_setting(params: &TrialSettingParams) -> Result<TrialResult> {
    let cohort_params = CohortParams {
        pop_size: params.arm_size,
        onset_rate: params.onset_rate,
        sojourn_min: params.sojourn_min,
        sojourn_max: params.sojourn_max,
        followup_years: params.followup_years,
    }
    .validate()?;
    let screening = ScreeningParams {
        sensitivity: params.sensitivity,
        attendance: params.attendance,
        screen_start_year: params.screen_start_year,
        screen_stop_year: params.screen_stop_year,
    }
    .validate(cohort_params.followup_years)?;
    check_overdiag_rate(params.overdiag_rate)?;

    let rows = generate_validated(&cohort_params);

    // The control arm shares the screening window but never detects anything.
    let control_screening = ValidScreeningParams {
        sensitivity: 0.0,
        attendance: 0.0,
        ..screening
    };

    let control = arm_table(
        &rows,
        &control_screening,
        params.overdiag_rate,
        cohort_params.followup_years,
    )?;
    let screen = arm_table(
        &rows,
        &screening,
        params.overdiag_rate,
        cohort_params.followup_years,
    )?;

    log::debug!(
        "Trial setting produced {} control and {} screen year rows",
        control.len(),
        screen.len()
    );

    Ok(TrialResult { control, screen })
}

/// Collapse one arm into its per-year table: outer join of clinical totals
/// (keyed by clinical year) and screening totals (keyed by round year), with
/// absent values filled as zero.
fn arm_table(
    rows: &[CohortRow],
    screening: &ValidScreeningParams,
    overdiag_rate: f64,
    followup_years: i64,
) -> Result<Vec<YearRecord>> {
    let strata = screen_cohort(rows, screening)?;
    let strata = augment_overdiag(strata, overdiag_rate)?;

    let clinical = clinical_totals(&strata);
    let rounds = round_totals(&strata);

    let years: BTreeSet<i64> = clinical.keys().chain(rounds.keys()).copied().collect();
    Ok(years
        .into_iter()
        .filter(|year| (0..=followup_years).contains(year))
        .map(|year| {
            let count_clinical = clinical.get(&year).copied().unwrap_or(0.0);
            let (count_screen, count_overdiag) = rounds.get(&year).copied().unwrap_or((0.0, 0.0));
            YearRecord {
                year,
                count_clinical,
                count_screen,
                count_overdiag,
            }
        })
        .collect())
}
