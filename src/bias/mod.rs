//! Detection of the first year the empirical excess-incidence estimator is an
//! unbiased estimate of true overdiagnosis.
//!
//! The analyzer consumes a composed per-year incidence table, derives the
//! excess series against a reference, and finds the earliest valid year where
//! the excess attributable to overdiagnosis matches the observed excess
//! within tolerance. Two reference policies exist and are deliberately kept
//! distinct: `trial-relative` compares the screen arm against the control
//! arm, `baseline-relative` compares a single series against its own
//! pre-screening clinical baseline at year 0.

use serde::Serialize;

use crate::error::{Result, SimError};
use crate::setting::{TrialResult, YearRecord};

/// Relative tolerance for the unbiased-year match
const UNBIASED_TOL: f64 = 1e-6;

/// First unbiased year under each framing; `None` means no year within the
/// observed range satisfies the tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BiasReport {
    /// Earliest unbiased year comparing per-year values
    pub annual_unbiased_year: Option<i64>,
    /// Earliest unbiased year comparing running sums from year 0
    pub cumulative_unbiased_year: Option<i64>,
}

/// One year of the derived excess series
#[derive(Debug, Clone, Copy)]
struct ExcessPoint {
    year: i64,
    /// Excess attributable to overdiagnosis (true overdiagnosed count)
    excess_overdiag: f64,
    /// Observed excess: total diagnoses minus the reference
    excess_total: f64,
    /// Whether the gating series screened anyone this year
    screened: bool,
}

/// Analyze a single-series setting (population or multi-cohort) against its
/// own baseline: the reference is the clinical count at year 0, before
/// screening has distorted incidence.
pub fn analyze_baseline_relative(records: &[YearRecord]) -> Result<BiasReport> {
    let baseline = records
        .iter()
        .find(|r| r.year == 0)
        .ok_or_else(|| {
            SimError::InvalidParameter(
                "baseline-relative analysis requires a year-0 row for the reference".to_string(),
            )
        })?
        .count_clinical;

    let points: Vec<ExcessPoint> = records
        .iter()
        .map(|r| ExcessPoint {
            year: r.year,
            excess_overdiag: r.count_overdiag,
            excess_total: r.total() - baseline,
            screened: r.count_screen > 0.0,
        })
        .collect();

    Ok(report(&points))
}

/// Analyze a two-arm trial: the reference is the control arm's per-year
/// total, and validity gates on screening activity in the screen arm only
/// (the control arm never screens, so gating on both arms would leave no
/// valid years).
pub fn analyze_trial_relative(trial: &TrialResult) -> Result<BiasReport> {
    if trial.control.len() != trial.screen.len() {
        return Err(SimError::InvalidParameter(format!(
            "trial arms cover different year ranges: {} control rows, {} screen rows",
            trial.control.len(),
            trial.screen.len()
        )));
    }

    let points: Vec<ExcessPoint> = trial
        .control
        .iter()
        .zip(trial.screen.iter())
        .map(|(control, screen)| {
            if control.year != screen.year {
                return Err(SimError::InvalidParameter(format!(
                    "trial arms are misaligned at year {} vs {}",
                    control.year, screen.year
                )));
            }
            Ok(ExcessPoint {
                year: screen.year,
                excess_overdiag: screen.count_overdiag,
                excess_total: screen.total() - control.total(),
                screened: screen.count_screen > 0.0,
            })
        })
        .collect::<Result<_>>()?;

    Ok(report(&points))
}

fn report(points: &[ExcessPoint]) -> BiasReport {
    let report = BiasReport {
        annual_unbiased_year: find_unbiased(points, Framing::Annual),
        cumulative_unbiased_year: find_unbiased(points, Framing::Cumulative),
    };
    log::debug!(
        "Bias analysis over {} years: annual {:?}, cumulative {:?}",
        points.len(),
        report.annual_unbiased_year,
        report.cumulative_unbiased_year
    );
    report
}

#[derive(Debug, Clone, Copy)]
enum Framing {
    Annual,
    Cumulative,
}

/// Walk the excess series in year order and return the earliest valid year
/// whose overdiagnosis-to-excess ratio is within tolerance of 1.
///
/// Valid years start at the first year with screening activity; running sums
/// for the cumulative framing still accumulate from the beginning of the
/// series.
fn find_unbiased(points: &[ExcessPoint], framing: Framing) -> Option<i64> {
    let first_screened = points.iter().position(|p| p.screened)?;

    let mut cumulative_overdiag = 0.0;
    let mut cumulative_excess = 0.0;
    for (index, point) in points.iter().enumerate() {
        cumulative_overdiag += point.excess_overdiag;
        cumulative_excess += point.excess_total;
        if index < first_screened {
            continue;
        }
        let (excess_overdiag, excess_total) = match framing {
            Framing::Annual => (point.excess_overdiag, point.excess_total),
            Framing::Cumulative => (cumulative_overdiag, cumulative_excess),
        };
        if excess_total != 0.0 && (excess_overdiag / excess_total - 1.0).abs() < UNBIASED_TOL {
            return Some(point.year);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(year: i64, excess_overdiag: f64, excess_total: f64, screened: bool) -> ExcessPoint {
        ExcessPoint {
            year,
            excess_overdiag,
            excess_total,
            screened,
        }
    }

    #[test]
    fn years_before_screening_are_excluded() {
        // Year 0 would match (excess equals overdiagnosis) but screening has
        // not begun, so it must not be reported.
        let points = vec![
            point(0, 2.0, 2.0, false),
            point(1, 2.0, 5.0, true),
            point(2, 2.0, 2.0, true),
        ];
        assert_eq!(find_unbiased(&points, Framing::Annual), Some(2));
    }

    #[test]
    fn no_screening_at_all_means_no_solution() {
        let points = vec![point(0, 0.0, 0.0, false), point(1, 0.0, 0.0, false)];
        assert_eq!(find_unbiased(&points, Framing::Annual), None);
        assert_eq!(find_unbiased(&points, Framing::Cumulative), None);
    }

    #[test]
    fn cumulative_framing_accumulates_from_series_start() {
        // Annually the ratio never matches after year 0, but the running
        // sums reconcile at year 2 (overdiag 6 vs excess 2+5-1 = 6).
        let points = vec![
            point(0, 1.0, 2.0, true),
            point(1, 2.0, 5.0, true),
            point(2, 3.0, -1.0, true),
        ];
        assert_eq!(find_unbiased(&points, Framing::Cumulative), Some(2));
        assert_eq!(find_unbiased(&points, Framing::Annual), None);
    }

    #[test]
    fn zero_excess_never_matches() {
        let points = vec![point(0, 0.0, 0.0, true)];
        assert_eq!(find_unbiased(&points, Framing::Annual), None);
    }
}
