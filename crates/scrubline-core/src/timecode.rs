#![forbid(unsafe_code)]

//! Minute:second time labels.

/// Center-line label: `MM:SS.cc` (hundredths truncated).
///
/// Negative and non-finite times format as zero.
#[must_use]
pub fn format_clock(seconds: f64) -> String {
    let seconds = sanitize(seconds);
    let minutes = (seconds / 60.0).floor();
    let remainder = seconds - minutes * 60.0;
    let whole = remainder.floor();
    let hundredths = ((remainder - whole) * 100.0).floor();
    format!("{:02}:{:02}.{:02}", minutes as u64, whole as u64, hundredths as u64)
}

/// Ruler label: `MM:SS`.
#[must_use]
pub fn format_ruler(seconds: f64) -> String {
    let seconds = sanitize(seconds);
    let minutes = (seconds / 60.0).floor();
    let whole = (seconds - minutes * 60.0).floor();
    format!("{:02}:{:02}", minutes as u64, whole as u64)
}

fn sanitize(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}
