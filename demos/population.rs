//! Projects incidence for a screened population and reports the first year
//! the excess-incidence estimator is unbiased.
//!
//! Run with `cargo run --example population`.

use overdiag::{PopulationSettingParams, analyze_baseline_relative, population_setting};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let params = PopulationSettingParams {
        pop_size: 100_000.0,
        onset_rate: 0.001,
        sojourn_min: 0.0,
        sojourn_max: 6.0,
        sensitivity: 0.5,
        overdiag_rate: 0.25,
        screen_start_year: 4.0,
        screen_stop_year: 15.0,
        followup_years: 30.0,
    };
    println!("{params}");

    let records = population_setting(&params)?;
    println!("year  clinical   screen  overdiag");
    for record in &records {
        println!(
            "{:>4}  {:>8.2} {:>8.2} {:>9.2}",
            record.year, record.count_clinical, record.count_screen, record.count_overdiag
        );
    }

    let report = analyze_baseline_relative(&records)?;
    match report.annual_unbiased_year {
        Some(year) => println!("annual framing: unbiased from year {year}"),
        None => println!("annual framing: no unbiased year found"),
    }
    match report.cumulative_unbiased_year {
        Some(year) => println!("cumulative framing: unbiased from year {year}"),
        None => println!("cumulative framing: no unbiased year found"),
    }

    Ok(())
}
