//! Weighted reasoning-mode selection.

use std::collections::HashMap;

use rand::Rng;

use crate::dream::thought::ReasoningMode;

/// Pick a reasoning mode from a relative-weight mapping.
///
/// Weights are normalized by their sum before the draw, so they need not
/// sum to 1. Modes absent from the mapping get weight 0. A zero (or empty)
/// mapping falls back to a uniform draw over all modes; this is the
/// documented degenerate case, not an error.
pub fn select_mode(weights: &HashMap<ReasoningMode, f64>) -> ReasoningMode {
    select_mode_with(weights, &mut rand::thread_rng())
}

pub fn select_mode_with(
    weights: &HashMap<ReasoningMode, f64>,
    rng: &mut impl Rng,
) -> ReasoningMode {
    let total: f64 = ReasoningMode::ALL
        .iter()
        .map(|m| weights.get(m).copied().unwrap_or(0.0).max(0.0))
        .sum();

    if total <= 0.0 {
        let idx = rng.gen_range(0..ReasoningMode::ALL.len());
        return ReasoningMode::ALL[idx];
    }

    let mut draw = rng.gen_range(0.0..total);
    for mode in ReasoningMode::ALL {
        let w = weights.get(&mode).copied().unwrap_or(0.0).max(0.0);
        if draw < w {
            return mode;
        }
        draw -= w;
    }
    // Floating-point residue can walk past the last weighted mode.
    ReasoningMode::ALL[ReasoningMode::ALL.len() - 1]
}
