//! 时间工具函数 — 报表周期解析
//!
//! 日期→时间戳转换统一在 API handler 层完成，
//! repository 层只接收 `i64` Unix millis 或 `YYYY-MM-DD` 字符串。

use chrono::{Datelike, Duration, NaiveDate};

use super::{AppError, AppResult};

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 当前 UTC 日期
pub fn today_utc() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/// 日期开始 (00:00:00 UTC) → Unix millis
pub fn day_start_millis(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc()
        .timestamp_millis()
}

/// 日期结束 → 次日 00:00:00 的 Unix millis
///
/// 返回次日零点时间戳，调用方使用 `< end` (不含) 语义。
pub fn day_end_millis(date: NaiveDate) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    day_start_millis(next_day)
}

/// Resolve a report period to an inclusive (start, end) date pair.
///
/// Supported periods: `today`, `this_week` (Monday..Sunday), `this_month`,
/// and `custom` with explicit `start_date`/`end_date`. Unknown periods are
/// rejected rather than silently defaulting.
pub fn resolve_period(
    period: &str,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> AppResult<(NaiveDate, NaiveDate)> {
    let today = today_utc();
    match period {
        "today" => Ok((today, today)),
        "this_week" => {
            let weekday = today.weekday().num_days_from_monday();
            let week_start = today - Duration::days(weekday as i64);
            Ok((week_start, week_start + Duration::days(6)))
        }
        "this_month" => {
            let month_start = today.with_day(1).unwrap_or(today);
            let month_end = month_start
                .checked_add_months(chrono::Months::new(1))
                .and_then(|d| d.pred_opt())
                .unwrap_or(today);
            Ok((month_start, month_end))
        }
        "custom" => {
            let (Some(s), Some(e)) = (start_date, end_date) else {
                return Err(AppError::validation(
                    "custom period requires start_date and end_date".to_string(),
                ));
            };
            let start = parse_date(s)?;
            let end = parse_date(e)?;
            if end < start {
                return Err(AppError::validation(format!(
                    "end_date {} is before start_date {}",
                    end, start
                )));
            }
            Ok((start, end))
        }
        other => Err(AppError::validation(format!(
            "Unknown period: {other} (expected today, this_week, this_month or custom)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2026-08-05").unwrap(),
            NaiveDate::from_ymd_opt(2026, 8, 5).unwrap()
        );
        assert!(parse_date("05/08/2026").is_err());
        assert!(parse_date("2026-13-01").is_err());
    }

    #[test]
    fn test_day_bounds() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(day_start_millis(d), 1_704_067_200_000);
        // End is the next day's midnight (exclusive upper bound)
        assert_eq!(day_end_millis(d), 1_704_153_600_000);
    }

    #[test]
    fn test_resolve_today() {
        let (s, e) = resolve_period("today", None, None).unwrap();
        assert_eq!(s, e);
        assert_eq!(s, today_utc());
    }

    #[test]
    fn test_resolve_this_week_starts_monday() {
        let (s, e) = resolve_period("this_week", None, None).unwrap();
        assert_eq!(s.weekday(), chrono::Weekday::Mon);
        assert_eq!(e - s, Duration::days(6));
    }

    #[test]
    fn test_resolve_this_month() {
        let (s, e) = resolve_period("this_month", None, None).unwrap();
        assert_eq!(s.day(), 1);
        assert_eq!(s.month(), e.month());
        // Last day of month: the next day is the 1st
        assert_eq!(e.succ_opt().unwrap().day(), 1);
    }

    #[test]
    fn test_resolve_custom() {
        let (s, e) = resolve_period("custom", Some("2026-01-01"), Some("2026-01-31")).unwrap();
        assert_eq!(s.day(), 1);
        assert_eq!(e.day(), 31);

        assert!(resolve_period("custom", None, None).is_err());
        assert!(resolve_period("custom", Some("2026-02-01"), Some("2026-01-01")).is_err());
    }

    #[test]
    fn test_resolve_unknown_period() {
        assert!(resolve_period("yesterday", None, None).is_err());
    }
}
