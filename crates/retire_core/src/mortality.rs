//! SSA male 2022 life table (conditional on alive at 53) and the
//! mortality-weighted success aggregator.

/// `(age, qx, lx)` rows, ages 53..=99, conditional on alive at 53.
const LIFE_TABLE: [(u32, f64, f64); 47] = [
    (53, 0.007073, 88825.0),
    (54, 0.007675, 88196.0),
    (55, 0.008348, 87520.0),
    (56, 0.009051, 86789.0),
    (57, 0.009822, 86003.0),
    (58, 0.010669, 85159.0),
    (59, 0.011548, 84250.0),
    (60, 0.012458, 83277.0),
    (61, 0.013403, 82240.0),
    (62, 0.014450, 81138.0),
    (63, 0.015571, 79965.0),
    (64, 0.016737, 78720.0),
    (65, 0.017897, 77402.0),
    (66, 0.019017, 76017.0),
    (67, 0.020213, 74572.0),
    (68, 0.021569, 73064.0),
    (69, 0.023088, 71488.0),
    (70, 0.024828, 69838.0),
    (71, 0.026705, 68104.0),
    (72, 0.028761, 66285.0),
    (73, 0.031116, 64379.0),
    (74, 0.033861, 62376.0),
    (75, 0.037088, 60263.0),
    (76, 0.041126, 58028.0),
    (77, 0.045241, 55642.0),
    (78, 0.049793, 53125.0),
    (79, 0.054768, 50479.0),
    (80, 0.060660, 47715.0),
    (81, 0.067027, 44820.0),
    (82, 0.073999, 41816.0),
    (83, 0.081737, 38722.0),
    (84, 0.090458, 35557.0),
    (85, 0.100525, 32340.0),
    (86, 0.111793, 29089.0),
    (87, 0.124494, 25837.0),
    (88, 0.138398, 22621.0),
    (89, 0.153207, 19490.0),
    (90, 0.169704, 16504.0),
    (91, 0.187963, 13703.0),
    (92, 0.208395, 11128.0),
    (93, 0.230808, 8809.0),
    (94, 0.253914, 6776.0),
    (95, 0.277402, 5055.0),
    (96, 0.300882, 3653.0),
    (97, 0.324326, 2554.0),
    (98, 0.347332, 1726.0),
    (99, 0.369430, 1126.0),
];

/// Per-age death probability, normalized over the 47-row table
/// (`dx = lx * qx`, `p_death = dx / sum(dx)`).
fn death_weights() -> [(u32, f64); 47] {
    let dx: [f64; 47] = LIFE_TABLE.map(|(_, qx, lx)| lx * qx);
    let total: f64 = dx.iter().sum();
    let mut out = [(0u32, 0.0); 47];
    for (i, (age, _, _)) in LIFE_TABLE.iter().enumerate() {
        out[i] = (*age, dx[i] / total);
    }
    out
}

/// Death-weighted and horizon success probabilities computed from each
/// path's first-failure year.
///
/// `fail_idx[i] == horizon` is the sentinel for "path `i` never failed".
#[must_use]
pub fn weighted_success(fail_idx: &[u32], start_age: u32, horizon: usize) -> (f64, f64) {
    let n = fail_idx.len().max(1) as f64;

    // ruin_by_t[t] = fraction of paths failed by year t (inclusive).
    let ruin_by_t: Vec<f64> = (0..horizon)
        .map(|t| {
            fail_idx.iter().filter(|&&f| (f as usize) <= t).count() as f64 / n
        })
        .collect();

    let p_dw: f64 = death_weights()
        .iter()
        .map(|&(age, p_death)| {
            let ruin = if age >= start_age && (age - start_age) < horizon as u32 {
                ruin_by_t[(age - start_age) as usize]
            } else {
                *ruin_by_t.last().unwrap_or(&0.0)
            };
            p_death * (1.0 - ruin)
        })
        .sum();

    let p99 = fail_idx.iter().filter(|&&f| f as usize >= horizon).count() as f64 / n;

    (p_dw, p99)
}
