//! Human-readable clock formatting for timeline labels
//!
//! Incident recordings are minutes long, so labels use `M:SS`
//! (`H:MM:SS` once past the hour).

const SECONDS_PER_HOUR: u64 = 3600;

/// Format seconds as a playback clock label.
///
/// Fractions are truncated toward zero. Negative or non-finite input
/// formats as `0:00`.
///
/// # Examples
///
/// ```
/// use irv_common::human_time::format_clock;
///
/// assert_eq!(format_clock(0.0), "0:00");
/// assert_eq!(format_clock(31.9), "0:31");
/// assert_eq!(format_clock(118.0), "1:58");
/// assert_eq!(format_clock(3725.0), "1:02:05");
/// ```
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    };

    if total >= SECONDS_PER_HOUR {
        let hours = total / SECONDS_PER_HOUR;
        let mins = (total % SECONDS_PER_HOUR) / 60;
        let secs = total % 60;
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", total / 60, total % 60)
    }
}

/// Parse the first `M:SS` or `MM:SS` occurrence in a label into seconds.
///
/// Surrounding text is ignored, so `"at 01:58 dispatch"` parses as 118.
/// Returns `None` when no clock is present or the seconds field is >= 60.
///
/// # Examples
///
/// ```
/// use irv_common::human_time::parse_clock;
///
/// assert_eq!(parse_clock("01:58"), Some(118));
/// assert_eq!(parse_clock("[0:31] entry"), Some(31));
/// assert_eq!(parse_clock("unknown"), None);
/// ```
pub fn parse_clock(label: &str) -> Option<u32> {
    let bytes = label.as_bytes();

    for (colon, _) in label.match_indices(':') {
        // One or two minute digits immediately before the colon
        let mut start = colon;
        while start > 0 && colon - start < 2 && bytes[start - 1].is_ascii_digit() {
            start -= 1;
        }
        if start == colon {
            continue;
        }

        // Exactly two second digits after the colon
        let secs_end = colon + 3;
        if secs_end > bytes.len() || !bytes[colon + 1..secs_end].iter().all(u8::is_ascii_digit) {
            continue;
        }

        let minutes: u32 = label[start..colon].parse().ok()?;
        let seconds: u32 = label[colon + 1..secs_end].parse().ok()?;
        if seconds >= 60 {
            return None;
        }
        return Some(minutes * 60 + seconds);
    }

    None
}
