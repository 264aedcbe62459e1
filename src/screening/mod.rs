//! Screening arithmetic, computed independently per sojourn stratum.
//!
//! For each stratum the calculator resolves two coupled quantities: the cases
//! that survive every offered screening round and present clinically, and the
//! cases detected at each individual round. The per-round detection
//! probability is a closed-form recursion over repeated imperfect tests, and
//! the two quantities must reconcile exactly with the stratum's onset count.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cohort::CohortRow;
use crate::config::ValidScreeningParams;
use crate::error::{Result, SimError};

pub mod overdiag;

/// Tolerance (relative to the onset count) for the conservation check
const CONSERVATION_TOL: f64 = 1e-9;

/// Cases detected at a single screening round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenDetection {
    /// Calendar year of the screening round
    pub screen_year: i64,
    /// Expected number of stratum cases detected at this round
    pub count_screen: f64,
}

/// A cohort stratum together with its screening outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenedStratum {
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
    /// Cases detected at each screening round
    pub detections: Vec<ScreenDetection>,
}

impl ScreenedStratum {
    /// Total screen-detected cases across all rounds
    #[must_use]
    pub fn count_screen_total(&self) -> f64 {
        self.detections.iter().map(|d| d.count_screen).sum()
    }

    /// Assert the conservation law: clinical plus screen-detected cases must
    /// reproduce the onset count. A failure is a defect in the combinatorics,
    /// never an input problem.
    fn check_conservation(&self) -> Result<()> {
        let diagnosed = self.count_clinical + self.count_screen_total();
        let scale = self.count_onset.abs().max(1.0);
        if (diagnosed - self.count_onset).abs() > CONSERVATION_TOL * scale {
            return Err(SimError::InvariantViolation(format!(
                "stratum (onset_year {}, sojourn {}): clinical {} + screen {} \
                 does not reconcile with onset count {}",
                self.onset_year,
                self.sojourn,
                self.count_clinical,
                self.count_screen_total(),
                self.count_onset
            )));
        }
        Ok(())
    }
}

/// Long-form screening row: one entry per `(stratum, screening round)`,
/// the unpivoted counterpart of [`ScreenedStratum`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenedRow {
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
    /// Cases that survive every offered round (stratum-constant)
    pub count_clinical: f64,
    /// Calendar year of this screening round
    pub screen_year: i64,
    /// Expected number of stratum cases detected at this round
    pub count_screen: f64,
}

/// Apply a screening programme to every stratum of a cohort.
///
/// Strata are independent, so the computation fans out across the rayon
/// thread pool; the result order matches the input order.
pub fn screen_cohort(
    rows: &[CohortRow],
    screening: &ValidScreeningParams,
) -> Result<Vec<ScreenedStratum>> {
    rows.par_iter()
        .map(|row| screen_stratum(row, screening))
        .collect()
}

/// Resolve the clinical and per-round screen-detected counts for one stratum.
fn screen_stratum(row: &CohortRow, screening: &ValidScreeningParams) -> Result<ScreenedStratum> {
    let miss = screening.miss_probability();

    // Rounds offered while the case is preclinical: between programme start
    // (or onset, whichever is later) and programme stop (or clinical
    // presentation, whichever is earlier).
    let lower = screening.start.max(row.onset_year);
    let upper = screening.stop.min(row.clinical_year);
    let tests_offered = (upper - lower).max(0);

    // Probability that every offered round fails to detect the case.
    let count_clinical = row.count_onset * miss.powi(tests_offered as i32);

    let mut detections = Vec::new();
    for screen_year in screening.start..screening.stop {
        let latent = screen_year - row.onset_year;
        if latent < 0 || latent >= row.sojourn {
            continue;
        }
        // Earlier rounds the case could have been missed at: capped by the
        // rounds inside its preclinical window and by the rounds the
        // programme has actually held so far.
        let latent_bounded = latent
            .min(tests_offered - 1)
            .min(screen_year - screening.start)
            .max(0);
        let p = screening.sensitivity * screening.attendance * miss.powi(latent_bounded as i32);
        detections.push(ScreenDetection {
            screen_year,
            count_screen: p * row.count_onset,
        });
    }

    let stratum = ScreenedStratum {
        onset_year: row.onset_year,
        sojourn: row.sojourn,
        count_onset: row.count_onset,
        clinical_year: row.clinical_year,
        tests_offered,
        count_clinical,
        detections,
    };
    stratum.check_conservation()?;
    Ok(stratum)
}

/// Unpivot screened strata into long form, one row per screening round.
///
/// Strata with no rounds inside their preclinical window contribute no rows;
/// their clinical counts are still available on the structured form.
#[must_use]
pub fn unpivot(strata: &[ScreenedStratum]) -> Vec<ScreenedRow> {
    strata
        .iter()
        .flat_map(|s| {
            s.detections.iter().map(|d| ScreenedRow {
                onset_year: s.onset_year,
                sojourn: s.sojourn,
                count_onset: s.count_onset,
                clinical_year: s.clinical_year,
                tests_offered: s.tests_offered,
                count_clinical: s.count_clinical,
                screen_year: d.screen_year,
                count_screen: d.count_screen,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScreeningParams;

    fn window(sensitivity: f64, attendance: f64) -> ValidScreeningParams {
        ScreeningParams {
            sensitivity,
            attendance,
            screen_start_year: 4.0,
            screen_stop_year: 30.0,
        }
        .validate(30)
        .unwrap()
    }

    fn stratum(onset_year: i64, sojourn: i64) -> CohortRow {
        CohortRow {
            onset_year,
            sojourn,
            count_onset: 10.0,
            clinical_year: onset_year + sojourn,
        }
    }

    #[test]
    fn sojourn_zero_is_never_screen_detected() {
        let screened = screen_stratum(&stratum(6, 0), &window(0.9, 1.0)).unwrap();
        assert_eq!(screened.tests_offered, 0);
        assert!(screened.detections.is_empty());
        assert_eq!(screened.count_clinical, 10.0);
    }

    #[test]
    fn first_round_detects_with_raw_sensitivity() {
        // Onset before the programme starts: at the first round no earlier
        // round can have missed the case, so detection is sensitivity-sized.
        let screened = screen_stratum(&stratum(0, 6), &window(0.5, 1.0)).unwrap();
        let first = screened.detections.first().unwrap();
        assert_eq!(first.screen_year, 4);
        assert!((first.count_screen - 5.0).abs() < 1e-12);
    }

    #[test]
    fn conservation_holds_with_partial_attendance() {
        let screened = screen_stratum(&stratum(7, 5), &window(0.7, 0.6)).unwrap();
        let diagnosed = screened.count_clinical + screened.count_screen_total();
        assert!((diagnosed - 10.0).abs() < 1e-9);
    }

    #[test]
    fn unpivot_emits_one_row_per_round() {
        let strata = screen_cohort(&[stratum(5, 3)], &window(0.5, 1.0)).unwrap();
        let rows = unpivot(&strata);
        assert_eq!(rows.len(), strata[0].detections.len());
        assert!(rows.iter().all(|r| r.count_clinical == strata[0].count_clinical));
    }
}
