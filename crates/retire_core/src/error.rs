//! Configuration error types for the simulation engine.
//!
//! Per-path runtime failure (a path running out of assets) is never an
//! error here — it is a latched state flag on the kernel's internal
//! per-path arrays that feeds the mortality-weighted success metrics. Only
//! malformed
//! scenario configuration, rejected before the kernel ever runs, is
//! modeled as [`EngineError`].

/// Errors returned by [`crate::config::ScenarioConfig::validate`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("dd1 ({dd1}) must be strictly less than dd2 ({dd2})")]
    Dd1NotLessThanDd2 { dd1: f64, dd2: f64 },

    #[error("{which} ({value}) must be within [0, 1]")]
    CutOutOfRange { which: &'static str, value: f64 },

    #[error("reserve_cash_fraction ({0}) must be within [0, 1]")]
    ReserveCashFractionOutOfRange(f64),

    #[error("n_sims ({0}) must be positive")]
    NonPositiveSimCount(i64),

    #[error("n_years ({0}) must be positive")]
    NonPositiveYearCount(i64),

    #[error("start_age ({0}) must not exceed 99")]
    StartAgeTooHigh(u32),

    #[error("sweep list {which} must not be empty")]
    EmptySweepList { which: &'static str },
}

pub type Result<T> = std::result::Result<T, EngineError>;
