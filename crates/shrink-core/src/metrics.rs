//! Size metrics reported to users

/// Percentage of bytes saved by compression.
///
/// Computed as `round(100 * (original - compressed) / original)`, with halves
/// rounded toward positive infinity. A document that grew yields a negative
/// value. An empty original yields 0.
pub fn reduction_percentage(original: u64, compressed: u64) -> i64 {
    if original == 0 {
        return 0;
    }

    let saved = original as f64 - compressed as f64;
    (saved / original as f64 * 100.0 + 0.5).floor() as i64
}

/// Format a byte count as megabytes with two decimals, e.g. "1.50 MB"
pub fn format_megabytes(bytes: u64) -> String {
    const MB: f64 = 1024.0 * 1024.0;
    format!("{:.2} MB", bytes as f64 / MB)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_quarter_reduction() {
        assert_eq!(reduction_percentage(1_000_000, 750_000), 25);
    }

    #[test]
    fn test_half_reduction() {
        assert_eq!(reduction_percentage(2_097_152, 1_048_576), 50);
    }

    #[test]
    fn test_zero_original_is_zero() {
        assert_eq!(reduction_percentage(0, 0), 0);
        assert_eq!(reduction_percentage(0, 1234), 0);
    }

    #[test]
    fn test_unchanged_size_is_zero() {
        assert_eq!(reduction_percentage(4096, 4096), 0);
    }

    #[test]
    fn test_growth_is_negative() {
        assert_eq!(reduction_percentage(1000, 1100), -10);
    }

    #[test]
    fn test_rounds_half_up() {
        // 12.5% saved
        assert_eq!(reduction_percentage(1000, 875), 13);
        // -12.5% saved
        assert_eq!(reduction_percentage(1000, 1125), -12);
    }

    #[test]
    fn test_format_megabytes() {
        assert_eq!(format_megabytes(0), "0.00 MB");
        assert_eq!(format_megabytes(1_048_576), "1.00 MB");
        assert_eq!(format_megabytes(1_572_864), "1.50 MB");
        assert_eq!(format_megabytes(10 * 1024 * 1024), "10.00 MB");
    }

    proptest! {
        #[test]
        fn shrinking_stays_within_bounds(original in 1u64..100_000_000, ratio in 0.0f64..=1.0) {
            let compressed = (original as f64 * ratio) as u64;
            let pct = reduction_percentage(original, compressed);
            prop_assert!((0..=100).contains(&pct));
        }
    }
}
