/// Fraction of a transfer completed, or `None` when the total is unknown.
#[must_use]
pub fn progress_fraction(downloaded: u64, total: Option<u64>) -> Option<f32> {
    match total {
        Some(total) if total > 0 => Some((downloaded as f64 / total as f64).min(1.0) as f32),
        _ => None,
    }
}

/// Overall progress across `total` equally weighted parts.
#[must_use]
pub fn overall_fraction(completed: usize, current: f32, total: usize) -> f32 {
    if total == 0 {
        return 1.0;
    }
    ((completed as f32 + current.clamp(0.0, 1.0)) / total as f32).clamp(0.0, 1.0)
}

/// Render a human-friendly byte count.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;

    let value = bytes as f64;
    if value < KIB {
        format!("{bytes} B")
    } else if value < MIB {
        format!("{:.1} KB", value / KIB)
    } else {
        format!("{:.1} MB", value / MIB)
    }
}
