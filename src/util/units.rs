//! Units formatting utilities
//!
//! Human-readable durations and step rates for report lines.

use std::time::Duration;

/// Format a duration with a unit suited to its magnitude
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use nestbench::util::units::format_duration;
///
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_micros(250)), "250μs");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs >= 3600 {
        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        let seconds = total_secs % 60;
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if total_secs >= 60 {
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{}m {}s", minutes, seconds)
    } else if total_secs > 0 {
        if millis > 0 {
            format!("{}.{:02}s", total_secs, millis / 10)
        } else {
            format!("{}s", total_secs)
        }
    } else if millis > 0 {
        format!("{}ms", millis)
    } else {
        format!("{}μs", duration.as_micros())
    }
}

/// Steps per second for `steps` executed in `duration`
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use nestbench::util::units::calculate_step_rate;
///
/// let rate = calculate_step_rate(1000, Duration::from_millis(500));
/// assert!((rate - 2000.0).abs() < 0.01);
/// ```
pub fn calculate_step_rate(steps: u64, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 0.0;
    }

    steps as f64 / duration.as_secs_f64()
}

/// Format a step rate with K/M/G suffixes
pub fn format_step_rate(rate: f64) -> String {
    if rate >= 1_000_000_000.0 {
        format!("{:.1}G steps/s", rate / 1_000_000_000.0)
    } else if rate >= 1_000_000.0 {
        format!("{:.1}M steps/s", rate / 1_000_000.0)
    } else if rate >= 1_000.0 {
        format!("{:.1}K steps/s", rate / 1_000.0)
    } else {
        format!("{:.0} steps/s", rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "1h 1m 1s");
        assert_eq!(format_duration(Duration::from_micros(42)), "42μs");
        assert_eq!(format_duration(Duration::ZERO), "0μs");
    }

    #[test]
    fn test_calculate_step_rate() {
        let rate = calculate_step_rate(1_000_000, Duration::from_secs(2));
        assert!((rate - 500_000.0).abs() < 0.01);

        assert_eq!(calculate_step_rate(1000, Duration::ZERO), 0.0);
    }

    #[test]
    fn test_format_step_rate() {
        assert_eq!(format_step_rate(500.0), "500 steps/s");
        assert_eq!(format_step_rate(1500.0), "1.5K steps/s");
        assert_eq!(format_step_rate(2_500_000.0), "2.5M steps/s");
        assert_eq!(format_step_rate(3_200_000_000.0), "3.2G steps/s");
    }
}
