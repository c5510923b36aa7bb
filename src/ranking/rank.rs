/// Rounds to `decimals` places so totals compare exactly for ties
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Competition ranks for `scores`, highest score first.
///
/// Equal scores share the rank of the first entry of their tie group and
/// the next lower score takes its 1-based position, so ranks skip after a
/// tie (100, 100, 80 -> 1, 1, 3). The result is in input order.
pub fn assign_ranks(scores: &[f64]) -> Vec<u32> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut ranks = vec![0; scores.len()];
    let mut rank = 0;
    let mut held: Option<f64> = None;

    for (position, &idx) in order.iter().enumerate() {
        let score = scores[idx];
        if held.is_none_or(|h| score < h) {
            rank = position as u32 + 1;
            held = Some(score);
        }
        ranks[idx] = rank;
    }

    ranks
}
