//! Formatting for byte counts and line numbers shown in match details.
//!
//! Byte counters are `u64` throughout; floating point only appears here at
//! the display boundary.

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Largest binary unit (KB = 1024) that keeps `bytes` at 1 or more, as an
/// index into `UNITS`.
fn unit_for(bytes: u64) -> usize {
    let mut unit = 0;
    let mut scaled = bytes;
    while scaled >= 1024 && unit + 1 < UNITS.len() {
        scaled /= 1024;
        unit += 1;
    }
    unit
}

/// `bytes` in the given unit: whole bytes as-is, larger units with one
/// decimal.
fn in_unit(bytes: u64, unit: usize) -> String {
    if unit == 0 {
        bytes.to_string()
    } else {
        format!("{:.1}", bytes as f64 / 1024f64.powi(unit as i32))
    }
}

/// Format a byte count with a binary unit.
pub fn format_size(bytes: u64) -> String {
    let unit = unit_for(bytes);
    format!("{} {}", in_unit(bytes, unit), UNITS[unit])
}

/// Format a line number or file count with thousand separators.
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// "read / total" for a streaming body, both in the unit of the total;
/// just "read" when the server did not advertise a length.
pub fn format_transfer(bytes_read: u64, total_bytes: Option<u64>) -> String {
    match total_bytes {
        Some(total) => {
            let unit = unit_for(total);
            format!(
                "{} / {} {}",
                in_unit(bytes_read, unit),
                in_unit(total, unit),
                UNITS[unit]
            )
        }
        None => format_size(bytes_read),
    }
}
