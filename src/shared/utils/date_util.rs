use chrono::{TimeDelta, Utc};

pub type DateTime = chrono::DateTime<Utc>;
pub type Duration = TimeDelta;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationParseError {
    #[error("empty duration")]
    Empty,
    #[error("invalid duration '{0}'")]
    Invalid(String),
    #[error("unknown duration unit '{unit}' in '{input}'")]
    UnknownUnit { input: String, unit: String },
    #[error("duration '{0}' is out of range")]
    OutOfRange(String),
}

pub struct DateUtil;

impl DateUtil {
    /// Current time in UTC
    pub fn now() -> DateTime {
        Utc::now()
    }

    pub fn to_timestamp(dt: &DateTime) -> i64 {
        dt.timestamp()
    }

    pub fn add_duration(dt: &DateTime, duration: Duration) -> Option<DateTime> {
        dt.checked_add_signed(duration)
    }

    /// Parse a human duration such as `30s`, `15m`, `12h`, `7d` or `2w`.
    ///
    /// A bare number is read as seconds. Units are case-insensitive and may be
    /// separated from the amount by whitespace (`7 d`).
    pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DurationParseError::Empty);
        }

        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (amount, unit) = trimmed.split_at(split);
        let amount: i64 = amount
            .parse()
            .map_err(|_| DurationParseError::Invalid(input.to_string()))?;

        let unit = unit.trim().to_ascii_lowercase();
        let seconds_per_unit = match unit.as_str() {
            "" | "s" | "sec" | "secs" | "second" | "seconds" => 1,
            "m" | "min" | "mins" | "minute" | "minutes" => 60,
            "h" | "hr" | "hrs" | "hour" | "hours" => 3_600,
            "d" | "day" | "days" => 86_400,
            "w" | "week" | "weeks" => 604_800,
            _ => {
                return Err(DurationParseError::UnknownUnit {
                    input: input.to_string(),
                    unit,
                });
            }
        };

        amount
            .checked_mul(seconds_per_unit)
            .and_then(TimeDelta::try_seconds)
            .ok_or_else(|| DurationParseError::OutOfRange(input.to_string()))
    }
}
