//! Model selection by held-out accuracy with a bias toward ARIMA.

use crate::core::ModelKind;

/// Relative accuracy gap within which ARIMA beats a better-scoring model.
pub const DEFAULT_TIE_BREAK_TOLERANCE: f64 = 0.05;

/// Pick the winning candidate from `(kind, accuracy)` scores.
///
/// The highest accuracy wins; on exact ties the earliest candidate is kept.
/// ARIMA then wins regardless whenever its accuracy is at least
/// `best * (1 - tolerance)`. Returns the index of the winner, or `None`
/// for no candidates.
///
/// # Example
/// ```
/// use demand_forecast::core::ModelKind;
/// use demand_forecast::selection::select_best;
///
/// let scores = [(ModelKind::Arima, 0.80), (ModelKind::RandomForest, 0.83)];
/// assert_eq!(select_best(&scores, 0.05), Some(0));
/// ```
pub fn select_best(scores: &[(ModelKind, f64)], tolerance: f64) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, (_, accuracy)) in scores.iter().enumerate() {
        match best {
            Some(b) if *accuracy <= scores[b].1 => {}
            _ => best = Some(i),
        }
    }
    let best = best?;

    let threshold = scores[best].1 * (1.0 - tolerance);
    let arima = scores
        .iter()
        .position(|(kind, accuracy)| *kind == ModelKind::Arima && *accuracy >= threshold);
    Some(arima.unwrap_or(best))
}
