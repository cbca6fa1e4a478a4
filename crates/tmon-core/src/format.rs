//! Human-readable sizes and durations for progress labels.

/// Symbol shown when an ETA is open-ended (zero throughput).
pub const INFINITE_SYMBOL: &str = "∞";

/// Format a byte count using IEC units up to tebibytes.
pub fn format_bytes(value: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut val = value as f64;
    let mut unit = 0;
    while val >= 1024.0 && unit < UNITS.len() - 1 {
        val /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", value)
    } else {
        format!("{:.1} {}", val, UNITS[unit])
    }
}

/// Format a duration given in milliseconds.
///
/// Sub-second values collapse to "<1 s"; beyond that the seconds, minutes
/// and hours tiers mirror what a progress label can afford to show.
pub fn format_duration_ms(ms: u64) -> String {
    let secs = ms / 1000;
    if secs == 0 {
        return "<1 s".to_string();
    }
    if secs < 60 {
        return format!("{} s", secs);
    }
    let mins = secs / 60;
    if mins < 60 {
        return format!("{} min {} s", mins, secs % 60);
    }
    format!("{} h {} min", mins / 60, mins % 60)
}
