//! Numeric helpers shared by the deck writer and the result-file readers.
//!
//! The external solver reads and writes C `printf`/`scanf` conventions, so the
//! formatting and parsing here reproduce `%lf`, `%g`, `strtod` and `strtol`
//! behaviour rather than Rust's own.

/// Floating point type used throughout system
pub type Real = f64;

/// Linearly spaced values `start + i*(end-start)/(count-1)`.
///
/// A count of one (or zero) yields `[start]` regardless of `end`.
pub fn linspace(start: Real, end: Real, count: usize) -> Vec<Real> {
    if count <= 1 {
        return vec![start];
    }
    let delta = (end - start) / (count as Real - 1.0);
    let mut points: Vec<Real> = (0..count).map(|i| start + i as Real * delta).collect();

    // Ensure exact endpoint
    points[count - 1] = end;
    points
}

/// `%lf` formatting: six fixed decimals.
pub fn format_lf(value: Real) -> String {
    format!("{:.6}", value)
}

/// `%g` formatting with the default precision of six significant digits.
pub fn format_g(value: Real) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Rounding to six significant digits decides the exponent, as in C.
    let sci = format!("{:.5e}", value);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);

    if (-4..6).contains(&exp) {
        let decimals = (5 - exp) as usize;
        trim_fraction(&format!("{:.*}", decimals, value))
    } else {
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            if exp < 0 { '-' } else { '+' },
            exp.abs()
        )
    }
}

fn trim_fraction(text: &str) -> String {
    if !text.contains('.') {
        return text.to_string();
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Parse the longest leading floating-point number, like `sscanf("%lf")`.
///
/// Leading whitespace is skipped and trailing text ignored; `None` when no
/// digits could be consumed.
pub fn scan_f64(text: &str) -> Option<Real> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let lower = s[end..].to_ascii_lowercase();
    for word in ["infinity", "inf", "nan"] {
        if lower.starts_with(word) {
            return s[..end + word.len()].parse().ok();
        }
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        let frac_start = end;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        digits += end - frac_start;
    }

    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut k = end + 1;
        if k < bytes.len() && matches!(bytes[k], b'+' | b'-') {
            k += 1;
        }
        let exp_start = k;
        while k < bytes.len() && bytes[k].is_ascii_digit() {
            k += 1;
        }
        if k > exp_start {
            end = k;
        }
    }

    s[..end].parse().ok()
}

/// Parse the longest leading integer, like `std::stoi`.
pub fn scan_i64(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digit_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digit_start {
        return None;
    }
    s[..end].parse().ok()
}
