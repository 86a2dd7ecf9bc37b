//! Time-related utilities for console output.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};

/// Get the current time in the local time zone
pub fn now_local() -> DateTime<Local> {
    Local::now()
}

/// Format a timestamp as a wall-clock time (`HH:MM:SS`)
pub fn to_clock_time<Tz>(datetime: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    datetime.format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_to_clock_time_format() {
        // テスト項目: タイムスタンプが HH:MM:SS 形式に変換される
        // given (前提条件):
        let offset = FixedOffset::east_opt(9 * 3600).unwrap();
        let datetime = offset.with_ymd_and_hms(2023, 1, 1, 7, 5, 9).unwrap();

        // when (操作):
        let result = to_clock_time(&datetime);

        // then (期待する結果):
        assert_eq!(result, "07:05:09");
    }

    #[test]
    fn test_now_local_is_increasing() {
        // テスト項目: now_local が呼び出すたびに単調に増加する時刻を返す
        // given (前提条件):
        let first = now_local();

        // when (操作):
        std::thread::sleep(std::time::Duration::from_millis(10));
        let second = now_local();

        // then (期待する結果):
        assert!(second >= first);
    }
}
