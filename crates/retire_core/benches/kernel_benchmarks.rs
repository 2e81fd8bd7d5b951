//! Criterion benchmarks for the retirement simulation kernel.
//!
//! Run with: cargo bench -p retire_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use retire_core::config::{Mode, SurplusAllocation};
use retire_core::kernel::simulate;
use retire_core::returns::ReturnsMatrix;
use retire_core::sweep;
use retire_core::ScenarioConfig;

fn base_config(n_sims: usize) -> ScenarioConfig {
    ScenarioConfig {
        seed: 424_242,
        n_sims,
        start_age: 53,
        partial_year_fraction: 0.894_444,
        return_mu_real: 0.04,
        return_vol_real: 0.10,
        mode: Mode::Single { e_fixed: 80_000 },
        ss_annual_real: 46_405.0,
        ss_start_age: 63,
        earned_income_annual_real: 0.0,
        earned_income_start_age: 0,
        earned_income_end_age: 0,
        income_applies_to_actual_spend: true,
        allow_surplus_savings: false,
        surplus_allocation: SurplusAllocation::ReserveFirst,
        floor_annual_real: 60_000.0,
        reserve_cash_fraction: 0.5,
        safe_real_return: 0.01,
        dd1: 0.15,
        dd2: 0.25,
        cut1: 0.5,
        cut2: 1.0,
        baseline_e_for_flex: 99_300.0,
        baseline_flex_pre: 20_000.0,
        baseline_net_post_ss: 52_895.0,
        baseline_flex_post: 10_000.0,
        rm_open_age: 62,
        home_value_real: 950_000.0,
        plf_at_open: 0.40,
        rm_limit_real_growth: 0.015,
        rm_bal_real_rate: 0.015,
        rm_partial_cover: 0.5,
        rm_repay_rate: 0.15,
        payoff_dd_threshold: 0.05,
        loan_real_rate: 0.03,
        loan_term_years: 30,
        loan_bucket_real_return: 0.01,
        loan_bucket_use_dd: 0.15,
        loan_bucket_partial_cover: 0.5,
        start_portfolios: vec![1_477_000.0, 1_800_000.0],
        reserve_years_list: vec![1.0, 2.0],
        loan_amounts: vec![0, 150_000],
    }
}

fn bench_single_kernel_call(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernel_single_call");

    for n_sims in [1_000usize, 10_000, 25_000].iter() {
        let cfg = base_config(*n_sims);
        let returns = ReturnsMatrix::generate(
            cfg.seed,
            cfg.n_sims,
            cfg.n_years(),
            cfg.return_mu_real,
            cfg.return_vol_real,
        );

        group.bench_with_input(BenchmarkId::new("n_sims", n_sims), n_sims, |b, _| {
            b.iter(|| {
                simulate(
                    black_box(&cfg),
                    black_box(&returns),
                    black_box(1_477_000.0),
                    black_box(1.0),
                    black_box(150_000),
                    black_box(80_000),
                )
            })
        });
    }

    group.finish();
}

fn bench_full_sweep(c: &mut Criterion) {
    let cfg = base_config(5_000);

    c.bench_function("sweep_full_grid", |b| {
        b.iter(|| sweep::run(black_box(&cfg)))
    });
}

criterion_group!(benches, bench_single_kernel_call, bench_full_sweep);
criterion_main!(benches);
