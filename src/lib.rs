//! A Rust library for deterministic cohort simulation of disease screening,
//! overdiagnosis, and excess-incidence bias.
//!
//! The engine is aggregate and deterministic: it tracks expected counts per
//! `(onset_year, sojourn)` stratum rather than simulating individuals, so
//! every output is an exact real-valued expectation. The pipeline runs
//! onset generation, screening (clinical presentation versus screen
//! detection), and overdiagnosis augmentation, composes those stages into
//! population, trial, and gradual-dissemination settings, and finally derives
//! the first calendar year at which the empirical excess-incidence estimator
//! becomes an unbiased estimate of true overdiagnosis.
//!
//! Rendering of the resulting incidence curves is an external concern; the
//! crate exposes plain per-year tables with stable column names and the
//! analyzer's unbiased-year indices for a plotting layer to consume.

pub mod bias;
pub mod cohort;
pub mod config;
pub mod error;
pub mod screening;
pub mod setting;

// Re-export the most common types for easier use
// Core types
pub use config::{CohortParams, ScreeningParams};
pub use error::{Result, SimError};

// Pipeline stages
pub use cohort::{CohortRow, generate_cohort};
pub use screening::overdiag::{OverdiagStratum, augment_overdiag};
pub use screening::{ScreenedRow, ScreenedStratum, screen_cohort, unpivot};

// Composed settings
pub use setting::{
    Arm, ArmYearRecord, MultiPopulationParams, PopulationSettingParams, TrialResult,
    TrialSettingParams, YearRecord, multipopulation_setting, population_setting, trial_setting,
};

// Bias analysis
pub use bias::{BiasReport, analyze_baseline_relative, analyze_trial_relative};
