//! Text-shape knowledge about the device tools lives here only; callers get integers.

/// Total from `du -c` output: the first token of the final non-empty line.
/// Empty output counts as zero bytes.
pub fn du_total(output: &str) -> Option<u64> {
    let last_line = match output.lines().rev().find(|line| !line.trim().is_empty()) {
        Some(line) => line,
        None => return Some(0),
    };
    last_line.split_whitespace().next()?.parse().ok()
}

/// Size printed by `stat -c '%s'`.
pub fn stat_size(output: &str) -> Option<u64> {
    output.trim().parse().ok()
}

/// Device lines from `adb devices`, without the "List of devices attached" header.
pub fn device_list(output: &str) -> Vec<String> {
    output
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Single-quote `value` for the device's POSIX shell.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
