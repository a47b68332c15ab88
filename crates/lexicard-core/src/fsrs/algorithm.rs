//! FSRS-6 formulas
//!
//! Pure functions over stability (days), difficulty (1-10) and
//! retrievability (0-1). Every function has a `_with_weights` variant that
//! takes an explicit 21-element weight slice; the plain variants use
//! [`FSRS6_WEIGHTS`].

use super::scheduler::Grade;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Published FSRS-6 default parameters (w0..w20)
pub const FSRS6_WEIGHTS: [f64; 21] = [
    0.212, 1.2931, 2.3065, 8.2956, 6.4133, 0.8334, 3.0194, 0.001, 1.8722, 0.1666, 0.796, 1.4835,
    0.0614, 0.2629, 1.6483, 0.6014, 1.8729, 0.5425, 0.0912, 0.0658, 0.1542,
];

/// Number of weights an FSRS-6 parameter vector must have
pub const WEIGHT_COUNT: usize = 21;

/// Default forgetting curve decay (w20)
pub const DEFAULT_DECAY: f64 = 0.1542;

/// Default target probability of recall at the scheduled review
pub const DEFAULT_RETENTION: f64 = 0.9;

/// Lower bound for stability (days)
pub const MIN_STABILITY: f64 = 0.001;

/// Upper bound for stability (days, ~100 years)
pub const MAX_STABILITY: f64 = 36500.0;

/// Easiest possible difficulty
pub const MIN_DIFFICULTY: f64 = 1.0;

/// Hardest possible difficulty
pub const MAX_DIFFICULTY: f64 = 10.0;

// ============================================================================
// FORGETTING CURVE
// ============================================================================

/// Curve factor chosen so that R(S, S) = 0.9 for any decay
#[inline]
fn curve_factor(decay: f64) -> f64 {
    0.9f64.powf(-1.0 / decay) - 1.0
}

/// Probability of recall after `elapsed_days` with the default decay
pub fn retrievability(elapsed_days: f64, stability: f64) -> f64 {
    retrievability_with_decay(elapsed_days, stability, DEFAULT_DECAY)
}

/// R = (1 + FACTOR * t / S)^(-w20)
pub fn retrievability_with_decay(elapsed_days: f64, stability: f64, decay: f64) -> f64 {
    if stability <= 0.0 {
        return 0.0;
    }
    let t = elapsed_days.max(0.0);
    (1.0 + curve_factor(decay) * t / stability).powf(-decay)
}

/// Days until retrievability falls to `desired_retention`, default decay
pub fn next_interval(stability: f64, desired_retention: f64) -> f64 {
    next_interval_with_decay(stability, desired_retention, DEFAULT_DECAY)
}

/// t = S / FACTOR * (R^(-1/w20) - 1)
///
/// Unrounded; callers round and clamp to their own bounds.
pub fn next_interval_with_decay(stability: f64, desired_retention: f64, decay: f64) -> f64 {
    let s = stability.clamp(MIN_STABILITY, MAX_STABILITY);
    s / curve_factor(decay) * (desired_retention.powf(-1.0 / decay) - 1.0)
}

// ============================================================================
// FIRST REVIEW
// ============================================================================

/// S0(G) = w[G-1]
pub fn initial_stability(grade: Grade) -> f64 {
    initial_stability_with_weights(grade, &FSRS6_WEIGHTS)
}

pub fn initial_stability_with_weights(grade: Grade, w: &[f64]) -> f64 {
    w[grade.index()].max(MIN_STABILITY)
}

/// D0(G) = w4 - e^(w5 * (G - 1)) + 1, clamped to [1, 10]
pub fn initial_difficulty(grade: Grade) -> f64 {
    initial_difficulty_with_weights(grade, &FSRS6_WEIGHTS)
}

pub fn initial_difficulty_with_weights(grade: Grade, w: &[f64]) -> f64 {
    raw_initial_difficulty(grade, w).clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

// Mean reversion targets the unclamped D0(Easy).
fn raw_initial_difficulty(grade: Grade, w: &[f64]) -> f64 {
    w[4] - (w[5] * (grade.value() - 1.0)).exp() + 1.0
}

// ============================================================================
// SUBSEQUENT REVIEWS
// ============================================================================

/// Difficulty after a review: linear damping, then mean reversion toward D0(Easy)
pub fn next_difficulty(difficulty: f64, grade: Grade) -> f64 {
    next_difficulty_with_weights(difficulty, grade, &FSRS6_WEIGHTS)
}

pub fn next_difficulty_with_weights(difficulty: f64, grade: Grade, w: &[f64]) -> f64 {
    let delta = -w[6] * (grade.value() - 3.0);
    let damped = difficulty + delta * (MAX_DIFFICULTY - difficulty) / 9.0;
    let reverted = w[7] * raw_initial_difficulty(Grade::Easy, w) + (1.0 - w[7]) * damped;
    reverted.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

/// Stability after a successful recall (Hard, Good or Easy)
pub fn next_recall_stability(
    difficulty: f64,
    stability: f64,
    retrievability: f64,
    grade: Grade,
) -> f64 {
    next_recall_stability_with_weights(difficulty, stability, retrievability, grade, &FSRS6_WEIGHTS)
}

pub fn next_recall_stability_with_weights(
    difficulty: f64,
    stability: f64,
    retrievability: f64,
    grade: Grade,
    w: &[f64],
) -> f64 {
    let hard_penalty = if grade == Grade::Hard { w[15] } else { 1.0 };
    let easy_bonus = if grade == Grade::Easy { w[16] } else { 1.0 };

    let growth = w[8].exp()
        * (11.0 - difficulty)
        * stability.powf(-w[9])
        * ((w[10] * (1.0 - retrievability)).exp() - 1.0)
        * hard_penalty
        * easy_bonus;

    (stability * (growth + 1.0)).clamp(MIN_STABILITY, MAX_STABILITY)
}

/// Stability after a lapse; never exceeds the stability before the lapse
pub fn next_forget_stability(difficulty: f64, stability: f64, retrievability: f64) -> f64 {
    next_forget_stability_with_weights(difficulty, stability, retrievability, &FSRS6_WEIGHTS)
}

pub fn next_forget_stability_with_weights(
    difficulty: f64,
    stability: f64,
    retrievability: f64,
    w: &[f64],
) -> f64 {
    let long_term = w[11]
        * difficulty.powf(-w[12])
        * ((stability + 1.0).powf(w[13]) - 1.0)
        * (w[14] * (1.0 - retrievability)).exp();
    let short_term_floor = stability / (w[17] * w[18]).exp();

    long_term
        .min(short_term_floor)
        .clamp(MIN_STABILITY, MAX_STABILITY)
}

/// Stability after a review less than a day after the previous one
///
/// S' = S * e^(w17 * (G - 3 + w18)) * S^(-w19); a passing grade never
/// shrinks stability.
pub fn same_day_stability(stability: f64, grade: Grade) -> f64 {
    same_day_stability_with_weights(stability, grade, &FSRS6_WEIGHTS)
}

pub fn same_day_stability_with_weights(stability: f64, grade: Grade, w: &[f64]) -> f64 {
    let mut increase = (w[17] * (grade.value() - 3.0 + w[18])).exp() * stability.powf(-w[19]);
    if grade.value() >= 3.0 {
        increase = increase.max(1.0);
    }
    (stability * increase).clamp(MIN_STABILITY, MAX_STABILITY)
}

// ============================================================================
// TESTS
// ============================================================================
