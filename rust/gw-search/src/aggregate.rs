//! AND-layer aggregation and the OR-layer sentinel.

use gw_core::Aggregation;

/// Value of an OR node whose every entry was pruned.
///
/// Finite so it still orders against real utilities.
pub const VERY_LOW: f32 = f32::MIN;

/// Collapse sibling outcome values into one number. Empty input yields `0`.
pub fn aggregate(method: Aggregation, values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    match method {
        Aggregation::Mean => values.iter().sum::<f32>() / values.len() as f32,
        Aggregation::Min => values.iter().copied().fold(f32::INFINITY, f32::min),
    }
}

/// OR-layer reduction: maximum, or [`VERY_LOW`] when there is nothing to choose from.
pub fn max_or_very_low(values: &[f32]) -> f32 {
    values.iter().copied().fold(VERY_LOW, f32::max)
}
