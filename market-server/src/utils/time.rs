//! 时间工具函数
//!
//! 所有日期→时间戳转换统一在 API handler 层完成，
//! repository 层只接收 `i64` Unix millis。时间按 UTC 处理，
//! 与存储的时间戳语义一致。

use chrono::{Duration, NaiveDate};
use shared::error::{AppError, AppResult};

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
        .expect("midnight always exists")
        .and_utc()
        .timestamp_millis()
}

/// 日期结束 → 次日 00:00:00 UTC 的 Unix millis
///
/// 返回次日零点时间戳，调用方使用 `< end` (不含) 语义。
pub fn day_end_exclusive_millis(date: NaiveDate) -> i64 {
    day_start_millis(date.succ_opt().unwrap_or(date))
}

/// 解析周期简写 ("7d", "30d", "90d") 为天数
pub fn parse_period(period: &str) -> AppResult<i64> {
    let days = period
        .strip_suffix('d')
        .and_then(|n| n.parse::<i64>().ok())
        .filter(|n| (1..=366).contains(n))
        .ok_or_else(|| AppError::validation(format!("Invalid period: {}", period)))?;
    Ok(days)
}

/// 解析趋势查询的日期范围
///
/// 显式 startDate/endDate 优先；否则 period 简写 (默认 "7d")，
/// 语义为"截止今天的最近 N 天"。
pub fn resolve_range(
    period: Option<&str>,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> AppResult<(NaiveDate, NaiveDate)> {
    if let (Some(start), Some(end)) = (start_date, end_date) {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        if start > end {
            return Err(AppError::validation(format!(
                "Start date {} is after end date {}",
                start, end
            )));
        }
        return Ok((start, end));
    }

    let days = parse_period(period.unwrap_or("7d"))?;
    let end = today_utc();
    let start = end - Duration::days(days - 1);
    Ok((start, end))
}
