//! Tests for the unbiased-year analysis.

use overdiag::{
    PopulationSettingParams, TrialSettingParams, YearRecord, analyze_baseline_relative,
    analyze_trial_relative, multipopulation_setting, population_setting, trial_setting,
    MultiPopulationParams,
};

fn population_params(screen_stop_year: f64) -> PopulationSettingParams {
    PopulationSettingParams {
        pop_size: 100_000.0,
        onset_rate: 0.001,
        sojourn_min: 0.0,
        sojourn_max: 6.0,
        sensitivity: 0.5,
        overdiag_rate: 0.25,
        screen_start_year: 4.0,
        screen_stop_year,
        followup_years: 30.0,
    }
}

#[test]
fn annual_excess_becomes_unbiased_once_screening_reaches_steady_state() {
    let records = population_setting(&population_params(30.0)).unwrap();
    let report = analyze_baseline_relative(&records).unwrap();

    // The transient ends once every cohort contributing diagnoses has lived
    // its whole preclinical window inside the programme: start + sojourn_max.
    assert_eq!(report.annual_unbiased_year, Some(10));
}

#[test]
fn cumulative_excess_becomes_unbiased_after_screening_stops() {
    let records = population_setting(&population_params(15.0)).unwrap();
    let report = analyze_baseline_relative(&records).unwrap();

    assert_eq!(report.annual_unbiased_year, Some(10));
    // The lead-time pool drains once the last affected cohort has presented:
    // last round in year 14, longest sojourn 6.
    assert_eq!(report.cumulative_unbiased_year, Some(20));
}

#[test]
fn cumulative_framing_reports_no_solution_while_screening_continues() {
    // Screening through the end of follow-up keeps the lead-time pool
    // standing, so cumulative excess always exceeds cumulative
    // overdiagnosis.
    let records = population_setting(&population_params(30.0)).unwrap();
    let report = analyze_baseline_relative(&records).unwrap();
    assert_eq!(report.cumulative_unbiased_year, None);
}

#[test]
fn trial_relative_analysis_matches_the_population_behaviour() {
    let trial = trial_setting(&TrialSettingParams {
        arm_size: 100_000.0,
        onset_rate: 0.001,
        sojourn_min: 0.0,
        sojourn_max: 6.0,
        sensitivity: 0.5,
        attendance: 0.8,
        overdiag_rate: 0.25,
        screen_start_year: 4.0,
        screen_stop_year: 15.0,
        followup_years: 30.0,
    })
    .unwrap();
    let report = analyze_trial_relative(&trial).unwrap();

    assert_eq!(report.annual_unbiased_year, Some(10));
    assert_eq!(report.cumulative_unbiased_year, Some(20));
}

#[test]
fn unscreened_trial_has_no_unbiased_year() {
    let trial = trial_setting(&TrialSettingParams {
        arm_size: 100_000.0,
        onset_rate: 0.001,
        sojourn_min: 0.0,
        sojourn_max: 6.0,
        sensitivity: 0.0,
        attendance: 0.8,
        overdiag_rate: 0.25,
        screen_start_year: 4.0,
        screen_stop_year: 15.0,
        followup_years: 30.0,
    })
    .unwrap();
    let report = analyze_trial_relative(&trial).unwrap();

    assert_eq!(report.annual_unbiased_year, None);
    assert_eq!(report.cumulative_unbiased_year, None);
}

#[test]
fn multi_cohort_dissemination_is_analyzable() {
    let records = multipopulation_setting(&MultiPopulationParams {
        pop_size: 100_000.0,
        onset_rate: 0.001,
        sojourn_min: 0.0,
        sojourn_max: 6.0,
        sensitivity: 0.5,
        overdiag_rate: 0.25,
        proportion: vec![0.5, 0.5],
        start_year: vec![4.0, 10.0],
        followup_years: 30.0,
    })
    .unwrap();
    let report = analyze_baseline_relative(&records).unwrap();

    // Screening disseminates to the last sub-cohort in year 10 and reaches
    // steady state sojourn_max years later.
    assert_eq!(report.annual_unbiased_year, Some(16));
}

#[test]
fn baseline_analysis_requires_a_year_zero_row() {
    let records = vec![YearRecord {
        year: 1,
        count_clinical: 100.0,
        count_screen: 0.0,
        count_overdiag: 0.0,
    }];
    assert!(analyze_baseline_relative(&records).is_err());
}
