//! Duration model.
//!
//! User input arrives as loose minute/second fields (steppers, dials, config
//! files). Everything downstream works on whole seconds that have been snapped
//! to a step and clamped to a per-phase maximum.

/// Step used by the phase dials.
pub const STEP_SECS: u32 = 30;

/// Upper bound for a single practice or rest phase (10 minutes).
pub const MAX_PHASE_SECS: u32 = 600;

/// Snap `raw_secs` to the nearest multiple of `step_secs`, then clamp to
/// `[0, max_secs]`.
///
/// Exact half-way values go to the even multiple. Negative input clamps to
/// zero. A zero step disables snapping.
pub fn normalize(raw_secs: i64, step_secs: u32, max_secs: u32) -> u32 {
    let raw = raw_secs.max(0) as u64;
    let snapped = if step_secs == 0 {
        raw
    } else {
        let step = u64::from(step_secs);
        let quotient = raw / step;
        let remainder = raw % step;
        let rounded = match (remainder * 2).cmp(&step) {
            std::cmp::Ordering::Less => quotient,
            std::cmp::Ordering::Greater => quotient + 1,
            std::cmp::Ordering::Equal => quotient + (quotient % 2),
        };
        rounded.saturating_mul(step)
    };
    snapped.min(u64::from(max_secs)) as u32
}

/// Combine minute and second fields into seconds.
///
/// Both components are floored to non-negative integers first; NaN counts as
/// zero.
pub fn from_min_sec(minutes: f64, seconds: f64) -> u32 {
    let floor = |v: f64| -> u64 {
        if v.is_nan() {
            0
        } else {
            v.max(0.0).floor().min(u32::MAX as f64) as u64
        }
    };
    floor(minutes)
        .saturating_mul(60)
        .saturating_add(floor(seconds))
        .min(u64::from(u32::MAX)) as u32
}

/// Split seconds into `(minutes, seconds)`.
pub fn split_min_sec(total_secs: u32) -> (u32, u32) {
    (total_secs / 60, total_secs % 60)
}

/// `m:ss` rendering used by the countdown display.
pub fn format_mmss(total_secs: u32) -> String {
    let (m, s) = split_min_sec(total_secs);
    format!("{m}:{s:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snaps_to_nearest_step() {
        assert_eq!(normalize(0, 30, 600), 0);
        assert_eq!(normalize(14, 30, 600), 0);
        assert_eq!(normalize(16, 30, 600), 30);
        assert_eq!(normalize(299, 30, 600), 300);
        assert_eq!(normalize(301, 30, 600), 300);
    }

    #[test]
    fn ties_go_to_even_step() {
        // 15 is between 0 (step 0) and 30 (step 1).
        assert_eq!(normalize(15, 30, 600), 0);
        // 45 is between 30 (step 1) and 60 (step 2).
        assert_eq!(normalize(45, 30, 600), 60);
        assert_eq!(normalize(75, 30, 600), 60);
    }

    #[test]
    fn clamps_range() {
        assert_eq!(normalize(-40, 30, 600), 0);
        assert_eq!(normalize(601, 30, 600), 600);
        assert_eq!(normalize(10_000, 30, 600), 600);
    }

    #[test]
    fn zero_step_only_clamps() {
        assert_eq!(normalize(17, 0, 600), 17);
        assert_eq!(normalize(900, 0, 600), 600);
    }

    #[test]
    fn min_sec_floors_components() {
        assert_eq!(from_min_sec(5.0, 0.0), 300);
        assert_eq!(from_min_sec(1.9, 30.7), 90);
        assert_eq!(from_min_sec(-3.0, 20.0), 20);
        assert_eq!(from_min_sec(f64::NAN, 5.0), 5);
    }

    #[test]
    fn mmss_formatting() {
        assert_eq!(format_mmss(0), "0:00");
        assert_eq!(format_mmss(65), "1:05");
        assert_eq!(format_mmss(600), "10:00");
    }
}
