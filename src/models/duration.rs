use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("duration units must be non-negative integers")]
    UnitMustBeNonNegative,
    #[error("at least one duration unit must be set")]
    DurationRequired,
    #[error("malformed duration string: {0}")]
    Malformed(String),
}

/// Operator-facing decomposition of a duration into days, hours and minutes.
///
/// This is a form-editing shape only: `None` means "field left unset" and is
/// collapsed to zero when the value goes to the wire. It is never persisted
/// directly — the server stores durations at hours granularity, so the wire
/// string carries no independent day unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DurationFormData {
    pub days: Option<i64>,
    pub hours: Option<i64>,
    pub minutes: Option<i64>,
}

impl DurationFormData {
    pub fn new(days: Option<i64>, hours: Option<i64>, minutes: Option<i64>) -> Self {
        Self { days, hours, minutes }
    }

    /// Validated units with nulls collapsed to zero.
    fn units(&self) -> Result<(i64, i64, i64), DurationError> {
        let days = self.days.unwrap_or(0);
        let hours = self.hours.unwrap_or(0);
        let minutes = self.minutes.unwrap_or(0);
        if days < 0 || hours < 0 || minutes < 0 {
            return Err(DurationError::UnitMustBeNonNegative);
        }
        if days == 0 && hours == 0 && minutes == 0 {
            return Err(DurationError::DurationRequired);
        }
        Ok((days, hours, minutes))
    }

    /// Total span in minutes. Units large enough to overflow the total are
    /// rejected the same way negative ones are.
    pub fn total_minutes(&self) -> Result<i64, DurationError> {
        let (days, hours, minutes) = self.units()?;
        days.checked_mul(1440)
            .and_then(|d| hours.checked_mul(60).and_then(|h| d.checked_add(h)))
            .and_then(|total| total.checked_add(minutes))
            .ok_or(DurationError::UnitMustBeNonNegative)
    }

    /// Serialize to the wire string, e.g. `PT30H15M`.
    ///
    /// Days are folded into the hour count because the server stores
    /// durations at hours granularity.
    pub fn serialize(&self) -> Result<String, DurationError> {
        let (days, hours, minutes) = self.units()?;
        let total_hours = days
            .checked_mul(24)
            .and_then(|d| d.checked_add(hours))
            .ok_or(DurationError::UnitMustBeNonNegative)?;
        let mut wire = String::from("PT");
        if total_hours > 0 {
            wire.push_str(&format!("{total_hours}H"));
        }
        if minutes > 0 || total_hours == 0 {
            wire.push_str(&format!("{minutes}M"));
        }
        Ok(wire)
    }

    /// Parse a wire duration string of the form `P[nD][T[nH][nM]]`.
    ///
    /// Hour counts of 24 or more are redistributed into days, so `PT30H`
    /// parses as one day and six hours. Components must be non-negative
    /// integers; fractions are rejected. Units that come out zero are left
    /// unset.
    pub fn deserialize(wire: &str) -> Result<Self, DurationError> {
        let malformed = || DurationError::Malformed(wire.to_string());

        let rest = wire.strip_prefix('P').ok_or_else(malformed)?;
        let (date_part, time_part) = match rest.split_once('T') {
            Some((date, time)) => (date, Some(time)),
            None => (rest, None),
        };

        let mut days = 0i64;
        if !date_part.is_empty() {
            let digits = date_part.strip_suffix('D').ok_or_else(malformed)?;
            days = parse_unit(digits).ok_or_else(malformed)?;
        }

        let mut hours = 0i64;
        let mut minutes = 0i64;
        if let Some(time) = time_part {
            if time.is_empty() {
                return Err(malformed());
            }
            let mut tail = time;
            if let Some(idx) = tail.find('H') {
                hours = parse_unit(&tail[..idx]).ok_or_else(malformed)?;
                tail = &tail[idx + 1..];
            }
            if let Some(idx) = tail.find('M') {
                minutes = parse_unit(&tail[..idx]).ok_or_else(malformed)?;
                tail = &tail[idx + 1..];
            }
            if !tail.is_empty() {
                return Err(malformed());
            }
        }

        let total_hours = days
            .checked_mul(24)
            .and_then(|d| d.checked_add(hours))
            .ok_or_else(malformed)?;
        if total_hours == 0 && minutes == 0 {
            return Err(DurationError::DurationRequired);
        }

        Ok(Self {
            days: nonzero(total_hours / 24),
            hours: nonzero(total_hours % 24),
            minutes: nonzero(minutes),
        })
    }

    /// Derive an absolute window starting at `start`.
    pub fn to_window(
        &self,
        start: DateTime<Utc>,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), DurationError> {
        let minutes = self.total_minutes()?;
        let end = Duration::try_minutes(minutes)
            .and_then(|span| start.checked_add_signed(span))
            .ok_or(DurationError::UnitMustBeNonNegative)?;
        Ok((start, end))
    }
}

fn nonzero(value: i64) -> Option<i64> {
    (value != 0).then_some(value)
}

/// Parse a single unit: ASCII digits only, so signs and fractions fail.
fn parse_unit(digits: &str) -> Option<i64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
