const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

/// Размер в байтах для логов: `"512 B"`, `"1.5 KB"`, `"10.0 MB"`
///
/// # Примеры
/// ```
/// use backend::shared::format::format_bytes;
/// assert_eq!(format_bytes(512), "512 B");
/// assert_eq!(format_bytes(1536), "1.5 KB");
/// ```
pub fn format_bytes(bytes: usize) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
