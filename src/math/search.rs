/// Finds the index of the last entry of a non-decreasing sequence that is
/// `<= target`.
///
/// Targets below the first entry map to `0`; targets at or above the last
/// entry map to the last index. With runs of equal entries the last of the
/// run is returned, so `values[i + 1] > values[i]` holds whenever `target` is
/// below the final entry.
#[must_use]
pub fn floor_index(target: f64, values: &[f64]) -> usize {
    values
        .partition_point(|&v| v <= target)
        .saturating_sub(1)
}
