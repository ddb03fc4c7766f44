//! Formatting helpers for captions.
//!
//! Functions that differ between short and long renderings are
//! parameterized via [`FmtStyle`].

/// Controls compact (inline values) vs verbose (caption body) output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FmtStyle {
    /// Compact: no spaces, short suffixes ("1.5G", "3m5s")
    Compact,
    /// Detail: spaces, full suffixes ("1.5 GiB", "3m 5s")
    Detail,
}

/// Format byte count as human-readable size.
///
/// Compact: `"1.5G"`, `"100.3M"`, `"50.0K"`, `"512B"`
/// Detail:  `"1.5 GiB"`, `"100.3 MiB"`, `"50.0 KiB"`, `"512 B"`
pub fn format_bytes(bytes: u64, style: FmtStyle) -> String {
    let (g, m, k, b) = match style {
        FmtStyle::Compact => ("G", "M", "K", "B"),
        FmtStyle::Detail => (" GiB", " MiB", " KiB", " B"),
    };
    let f = bytes as f64;
    if bytes >= 1024 * 1024 * 1024 {
        format!("{:.1}{}", f / (1024.0 * 1024.0 * 1024.0), g)
    } else if bytes >= 1024 * 1024 {
        format!("{:.1}{}", f / (1024.0 * 1024.0), m)
    } else if bytes >= 1024 {
        format!("{:.1}{}", f / 1024.0, k)
    } else {
        format!("{}{}", bytes, b)
    }
}

/// Format a kibibyte count, as found in `/proc/meminfo`.
pub fn format_kib(kib: u64, style: FmtStyle) -> String {
    format_bytes(kib.saturating_mul(1024), style)
}

/// Format bytes-per-second rate as human-readable.
///
/// Compact: `"1.5G/s"`, `"100.3M/s"`
/// Detail:  `"1.5 GiB/s"`, `"100.3 MiB/s"`, `"120 B/s"`
pub fn format_bytes_rate(rate: u64, style: FmtStyle) -> String {
    let (g, m, k, b) = match style {
        FmtStyle::Compact => ("G/s", "M/s", "K/s", "B/s"),
        FmtStyle::Detail => (" GiB/s", " MiB/s", " KiB/s", " B/s"),
    };
    let f = rate as f64;
    if rate >= 1024 * 1024 * 1024 {
        format!("{:.1}{}", f / (1024.0 * 1024.0 * 1024.0), g)
    } else if rate >= 1024 * 1024 {
        format!("{:.1}{}", f / (1024.0 * 1024.0), m)
    } else if rate >= 1024 {
        format!("{:.1}{}", f / 1024.0, k)
    } else {
        format!("{}{}", rate, b)
    }
}

/// Format an events-per-second rate (packets, operations).
///
/// Compact: `"1.5K/s"`, `"42/s"`
/// Detail:  `"1.5K packets/s"`, `"42 packets/s"`
pub fn format_rate(rate: u64, unit: &str, style: FmtStyle) -> String {
    let f = rate as f64;
    let scaled = if rate >= 1_000_000 {
        format!("{:.1}M", f / 1_000_000.0)
    } else if rate >= 1_000 {
        format!("{:.1}K", f / 1_000.0)
    } else {
        rate.to_string()
    };
    match style {
        FmtStyle::Compact => format!("{}/s", scaled),
        FmtStyle::Detail => format!("{} {}/s", scaled, unit),
    }
}

/// Format a permille value as a percentage with one decimal: `"12.5%"`.
pub fn format_permille(permille: u64) -> String {
    format!("{}.{}%", permille / 10, permille % 10)
}

/// Format `part` as a percentage of `total`; `"0.0%"` when `total` is zero.
pub fn format_percent(part: u64, total: u64) -> String {
    if total == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", part as f64 * 100.0 / total as f64)
}

/// Format a temperature given in millidegrees Celsius: `"45.0 °C"`.
pub fn format_millidegrees(millidegrees: u64) -> String {
    format!("{:.1} °C", millidegrees as f64 / 1000.0)
}

/// Format duration in seconds as human-readable.
///
/// Compact: `"3m5s"`
/// Detail:  `"3m 5s"`, `"0s"` for zero
pub fn format_duration(secs: u64, style: FmtStyle) -> String {
    let sep = match style {
        FmtStyle::Compact => "",
        FmtStyle::Detail => " ",
    };
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m{}{}s", secs / 60, sep, secs % 60)
    } else if secs < 86400 {
        format!("{}h{}{}m", secs / 3600, sep, (secs % 3600) / 60)
    } else {
        format!("{}d{}{}h", secs / 86400, sep, (secs % 86400) / 3600)
    }
}
