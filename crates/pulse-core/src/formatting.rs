/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use pulse_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let fixed = format!("{:.prec$}", value.abs(), prec = decimals as usize);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut result = group_thousands(int_part);
    if let Some(frac) = frac_part {
        result.push('.');
        result.push_str(frac);
    }

    // Avoid "-0.00" for values that round to zero.
    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    if value < 0.0 && !is_zero {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format an optional average for table cells; absent cells render as `–`.
///
/// ```
/// use pulse_core::formatting::format_average;
///
/// assert_eq!(format_average(Some(2.0)), "2.00");
/// assert_eq!(format_average(None), "–");
/// ```
pub fn format_average(value: Option<f64>) -> String {
    match value {
        Some(v) => format_number(v, 2),
        None => "–".to_string(),
    }
}

/// Annotation text for a highlighted hour: `"{hour}-{hour+1}"`.
///
/// ```
/// use pulse_core::formatting::format_hour_range;
///
/// assert_eq!(format_hour_range(9), "9-10");
/// assert_eq!(format_hour_range(23), "23-24");
/// ```
pub fn format_hour_range(hour: u8) -> String {
    format!("{}-{}", hour, u16::from(hour) + 1)
}

/// Two-digit hour label, e.g. `"07"`.
pub fn format_hour(hour: u8) -> String {
    format!("{:02}", hour)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    let len = s.len();
    let mut result = String::with_capacity(len + len / 3);
    for (i, c) in s.chars().enumerate() {
        if i != 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
