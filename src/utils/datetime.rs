//! Date/time values for AVM fields
//!
//! `Date`, `MetadataDate` and the `Temporal.StartTime` list store ISO 8601
//! text. [`AvmDateTime`] lets callers assign structured dates and get the
//! canonical text, and supports the partial forms XMP allows (year only,
//! year-month, date without time).

use crate::core::error::{AvmError, AvmResult};
use std::fmt;

/// Time-of-day part of an [`AvmDateTime`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeOfDay {
    /// Hour (0-23)
    pub hour: u8,
    /// Minute (0-59)
    pub minute: u8,
    /// Second (0-59)
    pub second: u8,
    /// Nanoseconds (0-999999999)
    pub nanosecond: u32,
}

/// A possibly partial ISO 8601 date/time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvmDateTime {
    /// Year
    pub year: i32,
    /// Month (1-12)
    pub month: Option<u8>,
    /// Day of month (1-31), only meaningful with a month
    pub day: Option<u8>,
    /// Time of day, only meaningful with a full date
    pub time: Option<TimeOfDay>,
    /// Offset from UTC in minutes; `Some(0)` is written as `Z`
    pub offset_minutes: Option<i16>,
}

impl AvmDateTime {
    /// A full calendar date without time
    pub fn date(year: i32, month: u8, day: u8) -> Self {
        Self {
            year,
            month: Some(month),
            day: Some(day),
            time: None,
            offset_minutes: None,
        }
    }

    /// A date with a time of day and no time zone
    pub fn date_time(year: i32, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            time: Some(TimeOfDay {
                hour,
                minute,
                second,
                nanosecond: 0,
            }),
            ..Self::date(year, month, day)
        }
    }

    /// Attach a UTC offset in minutes
    pub fn with_offset(mut self, offset_minutes: i16) -> Self {
        self.offset_minutes = Some(offset_minutes);
        self
    }

    /// Parse ISO 8601 text
    ///
    /// Accepted forms are `YYYY`, `YYYY-MM`, `YYYY-MM-DD` and
    /// `YYYY-MM-DDThh:mm[:ss[.fff]][Z|+hh:mm|-hh:mm]`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use avmkit::utils::datetime::AvmDateTime;
    ///
    /// let dt = AvmDateTime::parse("2011-02-05T10:30:00Z").unwrap();
    /// assert_eq!(dt.year, 2011);
    /// assert_eq!(dt.month, Some(2));
    /// assert_eq!(dt.offset_minutes, Some(0));
    /// ```
    pub fn parse(s: &str) -> AvmResult<Self> {
        let s = s.trim();
        let (date_part, time_part) = match s.split_once('T') {
            Some((date, time)) => (date, Some(time)),
            None => (s, None),
        };

        let mut pieces = date_part.splitn(3, '-');
        let year = parse_number::<i32>(pieces.next(), "year", s)?;
        let month = pieces
            .next()
            .map(|m| parse_range(Some(m), 1, 12, "month", s))
            .transpose()?;
        let day = pieces
            .next()
            .map(|d| parse_range(Some(d), 1, 31, "day", s))
            .transpose()?;

        let mut dt = Self {
            year,
            month,
            day,
            time: None,
            offset_minutes: None,
        };

        let Some(time_part) = time_part else {
            return Ok(dt);
        };
        if day.is_none() {
            return Err(bad_date(s, "time requires a full date"));
        }

        let (clock, offset) = split_offset(time_part);
        let mut clock_pieces = clock.splitn(3, ':');
        let hour = parse_range(clock_pieces.next(), 0, 23, "hour", s)?;
        let minute = parse_range(clock_pieces.next(), 0, 59, "minute", s)?;
        let (second, nanosecond) = match clock_pieces.next() {
            Some(sec) => parse_seconds(sec, s)?,
            None => (0, 0),
        };
        dt.time = Some(TimeOfDay {
            hour,
            minute,
            second,
            nanosecond,
        });
        dt.offset_minutes = match offset {
            None => None,
            Some("Z") => Some(0),
            Some(offset) => Some(parse_offset(offset, s)?),
        };
        Ok(dt)
    }

    /// Format as ISO 8601 text
    pub fn format(&self) -> String {
        let mut out = format!("{:04}", self.year);
        let Some(month) = self.month else {
            return out;
        };
        out.push_str(&format!("-{:02}", month));
        let Some(day) = self.day else {
            return out;
        };
        out.push_str(&format!("-{:02}", day));
        let Some(time) = self.time else {
            return out;
        };
        out.push_str(&format!(
            "T{:02}:{:02}:{:02}",
            time.hour, time.minute, time.second
        ));
        if time.nanosecond > 0 {
            let fraction = format!("{:09}", time.nanosecond);
            out.push('.');
            out.push_str(fraction.trim_end_matches('0'));
        }
        match self.offset_minutes {
            None => {}
            Some(0) => out.push('Z'),
            Some(offset) => {
                let sign = if offset < 0 { '-' } else { '+' };
                let offset = offset.unsigned_abs();
                out.push_str(&format!("{}{:02}:{:02}", sign, offset / 60, offset % 60));
            }
        }
        out
    }
}

impl fmt::Display for AvmDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

fn bad_date(input: &str, reason: &str) -> AvmError {
    AvmError::TypeError {
        field: "date".to_string(),
        message: format!("cannot parse {:?} as a date: {}", input, reason),
    }
}

fn parse_number<T: std::str::FromStr>(piece: Option<&str>, what: &str, input: &str) -> AvmResult<T> {
    let piece = piece.filter(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));
    piece
        .and_then(|p| p.parse().ok())
        .ok_or_else(|| bad_date(input, &format!("invalid {}", what)))
}

fn parse_range(piece: Option<&str>, min: u8, max: u8, what: &str, input: &str) -> AvmResult<u8> {
    let value: u8 = parse_number(piece, what, input)?;
    if value < min || value > max {
        return Err(bad_date(input, &format!("{} out of range", what)));
    }
    Ok(value)
}

fn parse_seconds(piece: &str, input: &str) -> AvmResult<(u8, u32)> {
    let (whole, fraction) = match piece.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (piece, None),
    };
    let second = parse_range(Some(whole), 0, 59, "second", input)?;
    let nanosecond = match fraction {
        None => 0,
        Some(digits) => {
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(bad_date(input, "invalid fractional seconds"));
            }
            let mut padded: String = digits.chars().take(9).collect();
            while padded.len() < 9 {
                padded.push('0');
            }
            parse_number(Some(&padded), "fractional seconds", input)?
        }
    };
    Ok((second, nanosecond))
}

fn split_offset(time: &str) -> (&str, Option<&str>) {
    if let Some(clock) = time.strip_suffix('Z') {
        return (clock, Some("Z"));
    }
    match time.find(['+', '-']) {
        Some(pos) => (&time[..pos], Some(&time[pos..])),
        None => (time, None),
    }
}

fn parse_offset(offset: &str, input: &str) -> AvmResult<i16> {
    let sign: i16 = if offset.starts_with('-') { -1 } else { 1 };
    let (hours, minutes) = offset[1..].split_once(':').unwrap_or((&offset[1..], "0"));
    let hours = parse_range(Some(hours), 0, 23, "offset hour", input)?;
    let minutes = parse_range(Some(minutes), 0, 59, "offset minute", input)?;
    Ok(sign * (i16::from(hours) * 60 + i16::from(minutes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_year_only() {
        let dt = AvmDateTime::parse("2011").unwrap();
        assert_eq!(dt.year, 2011);
        assert_eq!(dt.month, None);
        assert_eq!(dt.format(), "2011");
    }

    #[test]
    fn test_parse_full_date() {
        let dt = AvmDateTime::parse("2011-02-05").unwrap();
        assert_eq!(dt, AvmDateTime::date(2011, 2, 5));
        assert_eq!(dt.format(), "2011-02-05");
    }

    #[test]
    fn test_parse_with_offset() {
        let dt = AvmDateTime::parse("2010-12-25T10:30:00-05:30").unwrap();
        assert_eq!(dt.offset_minutes, Some(-330));
        assert_eq!(dt.format(), "2010-12-25T10:30:00-05:30");
    }

    #[test]
    fn test_fractional_seconds() {
        let dt = AvmDateTime::parse("2010-12-25T10:30:00.25Z").unwrap();
        assert_eq!(dt.time.unwrap().nanosecond, 250_000_000);
        assert_eq!(dt.format(), "2010-12-25T10:30:00.25Z");
    }

    #[test]
    fn test_invalid_dates() {
        assert!(AvmDateTime::parse("").is_err());
        assert!(AvmDateTime::parse("5 Feb 2011").is_err());
        assert!(AvmDateTime::parse("2011-13").is_err());
        assert!(AvmDateTime::parse("2011-02T10:00").is_err());
    }

    #[test]
    fn test_constructor_format() {
        let dt = AvmDateTime::date_time(2009, 7, 1, 8, 5, 9);
        assert_eq!(dt.format(), "2009-07-01T08:05:09");
        assert_eq!(dt.with_offset(0).to_string(), "2009-07-01T08:05:09Z");
    }
}
