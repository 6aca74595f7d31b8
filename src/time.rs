/// Format a position in seconds as `MM:SS`.
///
/// Both fields are floored and zero-padded. Minutes are not wrapped into
/// hours, so an hour reads `60:00`. Negative or non-finite input reads `00:00`.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(65.0), "01:05");
        assert_eq!(format_time(3600.0), "60:00");
        assert_eq!(format_time(6000.0), "100:00");
    }

    #[test]
    fn truncates_fractions() {
        assert_eq!(format_time(59.999), "00:59");
        assert_eq!(format_time(0.5), "00:00");
    }

    #[test]
    fn unknown_duration_reads_zero() {
        assert_eq!(format_time(f64::NAN), "00:00");
        assert_eq!(format_time(f64::INFINITY), "00:00");
        assert_eq!(format_time(-3.0), "00:00");
    }
}
