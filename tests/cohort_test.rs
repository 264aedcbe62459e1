//! Tests for base cohort generation.

mod utils;

use overdiag::{CohortParams, generate_cohort};
use utils::assert_close;

fn example_params() -> CohortParams {
    CohortParams {
        pop_size: 1000.0,
        onset_rate: 0.001,
        sojourn_min: 0.0,
        sojourn_max: 6.0,
        followup_years: 10.0,
    }
}

#[test]
fn example_cohort_has_expected_strata() {
    let rows = generate_cohort(&example_params()).unwrap();

    // Onset years -6..=16: 17 with onset mass plus 6 trailing zero-count
    // years, each split across 7 sojourn values.
    assert_eq!(rows.len(), 23 * 7);

    let nonzero: Vec<_> = rows.iter().filter(|r| r.count_onset > 0.0).collect();
    assert_eq!(nonzero.len(), 17 * 7);
    for row in &nonzero {
        assert_close(row.count_onset, 1.0 / 7.0, 1e-12);
        assert!(row.onset_year >= -6 && row.onset_year <= 10);
    }

    let tail: Vec<_> = rows.iter().filter(|r| r.count_onset == 0.0).collect();
    assert_eq!(tail.len(), 6 * 7);
    assert!(tail.iter().all(|r| r.onset_year > 10));
}

#[test]
fn counts_split_evenly_across_sojourn_values() {
    let rows = generate_cohort(&example_params()).unwrap();

    let mut sojourn_values: Vec<i64> = rows.iter().map(|r| r.sojourn).collect();
    sojourn_values.sort_unstable();
    sojourn_values.dedup();
    assert_eq!(sojourn_values, vec![0, 1, 2, 3, 4, 5, 6]);

    // Every sojourn value carries the same share of the total onset mass:
    // pop_size * onset_rate * 17 onset years, split 7 ways.
    let expected_share = 1000.0 * 0.001 * 17.0 / 7.0;
    for sojourn in sojourn_values {
        let share: f64 = rows
            .iter()
            .filter(|r| r.sojourn == sojourn)
            .map(|r| r.count_onset)
            .sum();
        assert_close(share, expected_share, 1e-9);
    }
}

#[test]
fn fractional_year_inputs_are_floored() {
    let rows = generate_cohort(&CohortParams {
        sojourn_max: 6.9,
        followup_years: 10.7,
        ..example_params()
    })
    .unwrap();
    let floored = generate_cohort(&example_params()).unwrap();
    assert_eq!(rows, floored);
}

#[test]
fn invalid_bounds_are_rejected() {
    assert!(
        generate_cohort(&CohortParams {
            pop_size: -5.0,
            ..example_params()
        })
        .is_err()
    );
    assert!(
        generate_cohort(&CohortParams {
            sojourn_min: -1.0,
            ..example_params()
        })
        .is_err()
    );
    assert!(
        generate_cohort(&CohortParams {
            followup_years: 0.0,
            ..example_params()
        })
        .is_err()
    );
}
