use chrono::NaiveDate;

/// Granularity of the date token embedded in a snapshot filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodToken {
    /// 8-digit `YYYYMMDD` token.
    Day(NaiveDate),
    /// 6-digit `YYYYMM` token.
    Month { year: i32, month: u32 },
    Unrecognized,
}

impl PeriodToken {
    /// First calendar day covered by the period.
    pub fn start_date(&self) -> Option<NaiveDate> {
        match *self {
            PeriodToken::Day(day) => Some(day),
            PeriodToken::Month { year, month } => NaiveDate::from_ymd_opt(year, month, 1),
            PeriodToken::Unrecognized => None,
        }
    }

    /// Human-readable grouping key: `"YYYY년 MM월 DD일"` for a day token,
    /// `"YYYY년 MM월"` for a month token.
    pub fn key(&self) -> Option<String> {
        match *self {
            PeriodToken::Day(day) => Some(day.format("%Y년 %m월 %d일").to_string()),
            PeriodToken::Month { year, month } => Some(format!("{}년 {:02}월", year, month)),
            PeriodToken::Unrecognized => None,
        }
    }
}

/// Extract the date token from a filename: the substring between the last
/// `_` and the extension.
pub fn date_token(file_name: &str) -> Option<&str> {
    let stem = match file_name.rfind('.') {
        Some(idx) => &file_name[..idx],
        None => file_name,
    };
    stem.rfind('_').map(|idx| &stem[idx + 1..])
}

/// Parse a filename date token, trying `YYYYMMDD` first, then `YYYYMM`.
/// Anything else is `Unrecognized`; the caller skips the file and moves on.
pub fn parse_period_token(token: &str) -> PeriodToken {
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return PeriodToken::Unrecognized;
    }
    match token.len() {
        8 => match NaiveDate::parse_from_str(token, "%Y%m%d") {
            Ok(day) => PeriodToken::Day(day),
            Err(_) => PeriodToken::Unrecognized,
        },
        6 => {
            let year: i32 = match token[0..4].parse() {
                Ok(y) => y,
                Err(_) => return PeriodToken::Unrecognized,
            };
            let month: u32 = match token[4..6].parse() {
                Ok(m) => m,
                Err(_) => return PeriodToken::Unrecognized,
            };
            if (1..=12).contains(&month) {
                PeriodToken::Month { year, month }
            } else {
                PeriodToken::Unrecognized
            }
        }
        _ => PeriodToken::Unrecognized,
    }
}
