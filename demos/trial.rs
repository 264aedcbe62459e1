//! Projects incidence for a two-arm screening trial and prints the flattened
//! per-arm table alongside the unbiased-year report.
//!
//! Run with `cargo run --example trial`.

use overdiag::{TrialSettingParams, analyze_trial_relative, trial_setting};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let params = TrialSettingParams {
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
    };
    println!("{params}");

    let trial = trial_setting(&params)?;
    println!("arm      year  clinical   screen  overdiag");
    for row in trial.rows() {
        println!(
            "{:<8} {:>4}  {:>8.2} {:>8.2} {:>9.2}",
            row.arm, row.year, row.count_clinical, row.count_screen, row.count_overdiag
        );
    }

    let report = analyze_trial_relative(&trial)?;
    println!(
        "annual unbiased year: {:?}, cumulative unbiased year: {:?}",
        report.annual_unbiased_year, report.cumulative_unbiased_year
    );

    Ok(())
}
