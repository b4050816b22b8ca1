//! Pure calculation functions for the downscale loop.
//!
//! All functions here are pure and testable without any I/O or images.

/// Largest divisor the downscale loop will try.
pub const MAX_DIVISOR: u32 = 8;

/// The divisors the downscale loop tries, in order: 2, 4, 8, ... up to `max`.
///
/// The schedule is finite by construction, so the loop that consumes it runs
/// at most `log2(max)` times.
///
/// # Examples
/// ```
/// # use wallpost::imaging::divisor_schedule;
/// assert_eq!(divisor_schedule(8).collect::<Vec<_>>(), vec![2, 4, 8]);
/// assert_eq!(divisor_schedule(1).count(), 0);
/// ```
pub fn divisor_schedule(max: u32) -> impl Iterator<Item = u32> {
    std::iter::successors(Some(2u32), |d| d.checked_mul(2)).take_while(move |&d| d <= max)
}

/// Dimensions after dividing both axes by the same divisor.
///
/// Each axis is floored independently and clamped to at least one pixel so
/// that very thin images still produce a valid raster.
///
/// # Arguments
/// * `original` - Source dimensions (width, height)
/// * `divisor` - Factor applied to both axes (0 is treated as 1)
///
/// # Returns
/// * `(width, height)` - Downscaled dimensions
pub fn downscale_dimensions(original: (u32, u32), divisor: u32) -> (u32, u32) {
    let (w, h) = original;
    let d = divisor.max(1);
    ((w / d).max(1), (h / d).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // divisor_schedule tests
    // =========================================================================

    #[test]
    fn schedule_doubles_up_to_cap() {
        assert_eq!(divisor_schedule(MAX_DIVISOR).collect::<Vec<_>>(), vec![2, 4, 8]);
    }

    #[test]
    fn schedule_bound_is_log2_of_cap() {
        // ceil(log2(8)) + 1 = 4 total iterations allowed; the schedule uses 3
        assert!(divisor_schedule(MAX_DIVISOR).count() < 4);
    }

    #[test]
    fn schedule_non_power_of_two_cap() {
        assert_eq!(divisor_schedule(10).collect::<Vec<_>>(), vec![2, 4, 8]);
    }

    #[test]
    fn schedule_empty_below_two() {
        assert_eq!(divisor_schedule(0).count(), 0);
        assert_eq!(divisor_schedule(1).count(), 0);
    }

    #[test]
    fn schedule_terminates_at_u32_max() {
        assert_eq!(divisor_schedule(u32::MAX).count(), 31);
    }

    // =========================================================================
    // downscale_dimensions tests
    // =========================================================================

    #[test]
    fn downscale_halves_both_axes() {
        assert_eq!(downscale_dimensions((4000, 3000), 2), (2000, 1500));
    }

    #[test]
    fn downscale_floors_odd_sizes() {
        // 4001 / 4 = 1000.25, 2999 / 4 = 749.75 → both floored
        assert_eq!(downscale_dimensions((4001, 2999), 4), (1000, 749));
    }

    #[test]
    fn downscale_preserves_aspect_for_exact_multiples() {
        let (w, h) = downscale_dimensions((6000, 4000), 8);
        assert_eq!((w, h), (750, 500));
        assert_eq!(w * 4000, h * 6000);
    }

    #[test]
    fn downscale_never_reaches_zero() {
        assert_eq!(downscale_dimensions((5, 3000), 8), (1, 375));
    }

    #[test]
    fn downscale_divisor_one_is_identity() {
        assert_eq!(downscale_dimensions((640, 480), 1), (640, 480));
        assert_eq!(downscale_dimensions((640, 480), 0), (640, 480));
    }
}
