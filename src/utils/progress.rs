use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while the device works and no byte count is known yet
pub fn create_spinner(msg: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner().with_message(msg.into());
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("|/-\\ "),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Create a progress bar counting checked archive entries
pub fn create_progress_bar(total: u64, prefix: &str) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{prefix:.bold} [{bar:40.cyan/blue}] {pos}/{len} items | {msg} ({eta})")
            .unwrap()
            .progress_chars("━━╸"),
    );
    bar.set_prefix(prefix.to_string());
    bar
}

/// Create a byte progress bar for an archive stream.
///
/// `estimated_total` is only a display hint; the stream may run past it.
pub fn create_transfer_bar(estimated_total: u64, prefix: &str) -> ProgressBar {
    let bar = ProgressBar::new(estimated_total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template(
                "{prefix:.bold} [{bar:40.cyan/blue}] {percent:>3}% • {bytes} of {total_bytes} • {eta}",
            )
            .unwrap()
            .progress_chars("━━╸"),
    );
    bar.set_prefix(prefix.to_string());
    bar
}

/// Byte count in decimal units, matching the sizes `du` reports on the device
pub fn format_size(bytes: u64) -> String {
    const SCALES: [(u64, &str); 3] = [(1_000_000_000, "GB"), (1_000_000, "MB"), (1_000, "kB")];

    SCALES
        .iter()
        .find(|(scale, _)| bytes >= *scale)
        .map(|(scale, unit)| format!("{:.1} {}", bytes as f64 / *scale as f64, unit))
        .unwrap_or_else(|| format!("{} bytes", bytes))
}

/// Format a duration as `HH:MM:SS`
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, secs % 3600 / 60, secs % 60)
}

/// Fit `name` into `width` columns, marking cut names with "..."
pub fn truncate_name(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }
    let keep = width.saturating_sub(3);
    let mut truncated: String = name.chars().take(keep).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_uses_decimal_units() {
        assert_eq!(format_size(0), "0 bytes");
        assert_eq!(format_size(999), "999 bytes");
        assert_eq!(format_size(1_000), "1.0 kB");
        assert_eq!(format_size(1_500_000), "1.5 MB");
        assert_eq!(format_size(2_340_000_000), "2.3 GB");
    }

    #[test]
    fn test_spinner_keeps_message() {
        let spinner = create_spinner("Estimating backup size...");
        assert_eq!(spinner.message(), "Estimating backup size...");
        spinner.finish_and_clear();
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_elapsed(Duration::from_secs(61)), "00:01:01");
        assert_eq!(format_elapsed(Duration::from_secs(3723)), "01:02:03");
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("DCIM", 10), "DCIM");
        assert_eq!(truncate_name("Pictures/Screenshots", 10), "Picture...");
    }
}
