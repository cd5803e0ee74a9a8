//! 展示格式化工具

use chrono::{DateTime, Datelike, Duration, Local, NaiveTime, TimeZone};

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 格式化文件大小，例如 1536 -> "1.5 KB"
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// 千分位，例如 1234567 -> "1,234,567"
pub fn format_number(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if n < 0 {
        out.insert(0, '-');
    }
    out
}

/// 脱敏：保留前 `start` 与后 `end` 个字符
pub fn mask(s: &str, start: usize, end: usize, mask_char: char) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= start + end {
        return s.to_string();
    }
    let mut out: String = chars[..start].iter().collect();
    out.extend(std::iter::repeat(mask_char).take(chars.len() - start - end));
    out.extend(&chars[chars.len() - end..]);
    out
}

pub fn camel_to_snake(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for ch in s.chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

pub fn snake_to_camel(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper = false;
    for ch in s.chars() {
        if ch == '_' {
            upper = true;
        } else if upper && ch.is_ascii_lowercase() {
            out.push(ch.to_ascii_uppercase());
            upper = false;
        } else {
            if upper {
                out.push('_');
            }
            out.push(ch);
            upper = false;
        }
    }
    if upper {
        out.push('_');
    }
    out
}

pub fn format_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format(DATETIME_FORMAT).to_string()
}

fn local_midnight(date: chrono::NaiveDate) -> DateTime<Local> {
    let naive = date.and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| Local.from_utc_datetime(&naive))
}

/// 今天 00:00:00
pub fn start_of_today() -> String {
    format_datetime(&local_midnight(Local::now().date_naive()))
}

/// 今天 23:59:59
pub fn end_of_today() -> String {
    let end = local_midnight(Local::now().date_naive()) + Duration::days(1) - Duration::seconds(1);
    format_datetime(&end)
}

/// 本周一 00:00:00
pub fn start_of_week() -> String {
    let today = Local::now().date_naive();
    let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    format_datetime(&local_midnight(monday))
}

/// 本月一号 00:00:00
pub fn start_of_month() -> String {
    let today = Local::now().date_naive();
    let first = today.with_day(1).unwrap_or(today);
    format_datetime(&local_midnight(first))
}
