//! Retirement spending Monte Carlo engine
//!
//! A pure, synchronous simulation kernel for sequence-of-returns risk in
//! retirement: given a scenario (spending level, income, guardrails,
//! reverse mortgage, loan), it evaluates `n_sims` independent yearly paths
//! through age 99 and reports mortality-weighted and fixed-horizon success
//! probabilities along with drawdown and terminal-balance statistics.
//!
//! It supports:
//! - Vectorized-across-paths simulation (struct-of-arrays, not struct-of-paths)
//! - Guardrail-driven dynamic spending cuts tied to portfolio drawdown
//! - Reverse-mortgage and amortizing-loan lifecycle modeling
//! - A bracket-expand-then-bisect optimizer for maximum sustainable spending
//! - A sweep driver over a Cartesian grid of starting conditions

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod guardrails;
pub mod kernel;
pub mod loan;
pub mod mortality;
pub mod optimizer;
pub mod returns;
pub mod sweep;
pub mod withdrawal;

#[cfg(test)]
mod tests;

pub use config::{Mode, OptimizeSuccessMetric, ScenarioConfig, SurplusAllocation};
pub use error::{EngineError, Result};
pub use kernel::KernelMetrics;
pub use sweep::GridPointResult;
