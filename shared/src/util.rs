/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// UTC calendar date (YYYY-MM-DD) of a Unix-millisecond timestamp.
///
/// Statistics rows are keyed by this string; lexicographic order on the
/// format matches chronological order, so range scans stay plain `BETWEEN`.
pub fn date_of_millis(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.date_naive().format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "1970-01-01".to_string())
}
