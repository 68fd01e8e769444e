//! Coercions from spreadsheet cells to the text forms the filing expects.

use calamine::Data;
use chrono::{Datelike, NaiveDate};
use time::{
    format_description::BorrowedFormatItem,
    macros::{date, format_description},
    Date, Duration, Month,
};

use crate::{error::ConvertError, Result};

/// Day zero for bare serial numbers (1900 system, leap year bug folded in).
/// Native date cells carry their own date system and do not use it.
const SERIAL_EPOCH: Date = date!(1899 - 12 - 30);

static ISO_DATE_FMT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

// Tried in order. Slash dates with a four digit year last are read month first.
static INPUT_DATE_FMTS: &[&[BorrowedFormatItem]] = &[
    format_description!("[year]-[month padding:none]-[day padding:none]"),
    format_description!("[year]/[month padding:none]/[day padding:none]"),
    format_description!("[day padding:none].[month padding:none].[year]"),
    format_description!("[day padding:none]. [month padding:none]. [year]"),
    format_description!("[month padding:none]/[day padding:none]/[year]"),
    format_description!("[year][month][day]"),
];

const TRUTHY: &[&str] = &["true", "t", "yes", "y", "1", "x"];
const FALSY: &[&str] = &["false", "f", "no", "n", "0", ""];

/// Textual form of any cell. Never fails: empty cells become the empty string.
pub fn text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(_) | Data::DateTimeIso(_) => {
            iso_date(cell).unwrap_or_else(|_| cell.to_string())
        }
        other => other.to_string(),
    }
}

/// Replaces a comma decimal separator with a point. Nothing else changes.
pub fn normalize_decimal(raw: &str) -> String {
    raw.replace(',', ".")
}

/// Decimal text of a numeric cell, separator normalized.
///
/// Surrounding whitespace of string cells is trimmed; otherwise the value
/// passes through untouched apart from the separator. It is only checked to
/// be a finite number.
pub fn decimal(cell: &Data) -> Result<String> {
    let raw = match cell {
        Data::Empty => return Err(ConvertError::MissingValue.into()),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::String(s) => s.trim().to_string(),
        other => return Err(ConvertError::InvalidNumber(other.to_string()).into()),
    };
    let normalized = normalize_decimal(&raw);
    match normalized.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(normalized),
        _ => Err(ConvertError::InvalidNumber(raw).into()),
    }
}

/// Parses a date cell: native spreadsheet dates, serial numbers, ISO
/// date-times and the string layouts in `INPUT_DATE_FMTS`.
pub fn date(cell: &Data) -> Result<Date> {
    match cell {
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => from_naive(datetime.date()),
            None => Err(ConvertError::InvalidDate(cell.to_string()).into()),
        },
        Data::Float(f) => from_serial(*f),
        Data::Int(i) => from_serial(*i as f64),
        Data::DateTimeIso(s) | Data::String(s) => parse_date_str(s),
        Data::Empty => Err(ConvertError::MissingValue.into()),
        other => Err(ConvertError::InvalidDate(other.to_string()).into()),
    }
}

/// Date cell reformatted as `YYYY-MM-DD`.
pub fn iso_date(cell: &Data) -> Result<String> {
    Ok(date(cell)?.format(ISO_DATE_FMT)?)
}

// calamine resolves the workbook's 1900/1904 date system into a chrono date.
fn from_naive(date: NaiveDate) -> Result<Date> {
    let month = Month::try_from(date.month() as u8)?;
    Ok(Date::from_calendar_date(date.year(), month, date.day() as u8)?)
}

fn from_serial(serial: f64) -> Result<Date> {
    if !serial.is_finite() || serial < 0. {
        return Err(ConvertError::InvalidDate(serial.to_string()).into());
    }
    SERIAL_EPOCH
        .checked_add(Duration::days(serial.floor() as i64))
        .ok_or_else(|| ConvertError::InvalidDate(serial.to_string()).into())
}

fn parse_date_str(s: &str) -> Result<Date> {
    let s = strip_time(s.trim());
    INPUT_DATE_FMTS
        .iter()
        .find_map(|fmt| Date::parse(s, fmt).ok())
        .ok_or_else(|| ConvertError::InvalidDate(s.to_string()).into())
}

// "2023-05-01T10:00:00", "1. 5. 2023 10:00" -> date part only
fn strip_time(s: &str) -> &str {
    match s.find(':') {
        Some(colon) => s[..colon]
            .rfind(|c: char| c == ' ' || c == 'T')
            .map_or(s, |cut| s[..cut].trim_end()),
        None => s,
    }
}

/// Total boolean coercion.
///
/// Numbers are true when non-zero. Strings are matched case-insensitively
/// against `TRUTHY` and `FALSY`; an empty cell is false. Anything else is an
/// error rather than a guess.
pub fn boolean(cell: &Data) -> Result<bool> {
    match cell {
        Data::Bool(b) => Ok(*b),
        Data::Int(i) => Ok(*i != 0),
        Data::Float(f) => Ok(*f != 0.),
        Data::Empty => Ok(false),
        Data::String(s) => {
            let s = s.trim().to_lowercase();
            if TRUTHY.contains(&s.as_str()) {
                Ok(true)
            } else if FALSY.contains(&s.as_str()) {
                Ok(false)
            } else {
                Err(ConvertError::InvalidBoolean(s).into())
            }
        }
        other => Err(ConvertError::InvalidBoolean(other.to_string()).into()),
    }
}

/// Filing year from an integer-valued cell.
pub fn year(cell: &Data) -> Result<i32> {
    let invalid = || ConvertError::InvalidYear(text(cell));
    let year = match cell {
        Data::Int(i) => i32::try_from(*i).map_err(|_| invalid())?,
        Data::Float(f) if f.fract() == 0. => *f as i32,
        Data::String(s) => s.trim().parse::<i32>().map_err(|_| invalid())?,
        _ => return Err(invalid().into()),
    };
    if (1..=9999).contains(&year) {
        Ok(year)
    } else {
        Err(invalid().into())
    }
}

#[cfg(test)]
mod tests {
    use calamine::{ExcelDateTime, ExcelDateTimeType};

    use super::*;

    fn kind(err: anyhow::Error) -> ConvertError {
        err.downcast::<ConvertError>().expect("typed error")
    }

    #[test]
    fn decimal_only_swaps_the_separator() {
        assert_eq!(decimal(&Data::String("1234,56".into())).unwrap(), "1234.56");
        assert_eq!(decimal(&Data::String("1234.56".into())).unwrap(), "1234.56");
        assert_eq!(decimal(&Data::String("0,10".into())).unwrap(), "0.10");
        assert_eq!(decimal(&Data::Float(5.5)).unwrap(), "5.5");
        assert_eq!(decimal(&Data::Float(10.0)).unwrap(), "10");
        assert_eq!(decimal(&Data::Int(0)).unwrap(), "0");
        assert_eq!(decimal(&Data::String(" 5,5 ".into())).unwrap(), "5.5");
    }

    #[test]
    fn decimal_rejects_garbage() {
        assert_eq!(
            kind(decimal(&Data::String("ten".into())).unwrap_err()),
            ConvertError::InvalidNumber("ten".into())
        );
        assert!(decimal(&Data::String("1.234,56".into())).is_err());
        assert_eq!(kind(decimal(&Data::Empty).unwrap_err()), ConvertError::MissingValue);
    }

    #[test]
    fn dates_in_any_supported_layout() {
        let cells = [
            Data::String("2024-01-03".into()),
            Data::String("2024/01/03".into()),
            Data::String("3.1.2024".into()),
            Data::String("03.01.2024".into()),
            Data::String("3. 1. 2024".into()),
            Data::String("01/03/2024".into()),
            Data::String("2024-01-03 00:00:00".into()),
            Data::String("20240103".into()),
            Data::DateTimeIso("2024-01-03T00:00:00".into()),
            Data::Float(45294.0),
            Data::Int(45294),
        ];
        for cell in cells {
            assert_eq!(iso_date(&cell).unwrap(), "2024-01-03", "{cell:?}");
        }
    }

    #[test]
    fn native_dates_follow_the_workbook_date_system() {
        let dates_1900 = Data::DateTime(ExcelDateTime::new(45294.0, ExcelDateTimeType::DateTime, false));
        let dates_1904 = Data::DateTime(ExcelDateTime::new(43832.0, ExcelDateTimeType::DateTime, true));
        assert_eq!(iso_date(&dates_1900).unwrap(), "2024-01-03");
        assert_eq!(iso_date(&dates_1904).unwrap(), "2024-01-03");
        assert_eq!(text(&dates_1904), "2024-01-03");
    }

    #[test]
    fn unparseable_date() {
        assert_eq!(
            kind(date(&Data::String("yesterday".into())).unwrap_err()),
            ConvertError::InvalidDate("yesterday".into())
        );
        assert!(date(&Data::Bool(true)).is_err());
    }

    #[test]
    fn boolean_spellings() {
        for truthy in ["True", "TRUE", "yes", "Y", "1", "x"] {
            assert!(boolean(&Data::String(truthy.into())).unwrap(), "{truthy}");
        }
        for falsy in ["False", "no", "N", "0", "", "  "] {
            assert!(!boolean(&Data::String(falsy.into())).unwrap(), "{falsy}");
        }
        assert!(boolean(&Data::Bool(true)).unwrap());
        assert!(boolean(&Data::Int(2)).unwrap());
        assert!(!boolean(&Data::Float(0.)).unwrap());
        assert!(!boolean(&Data::Empty).unwrap());
        assert_eq!(
            kind(boolean(&Data::String("maybe".into())).unwrap_err()),
            ConvertError::InvalidBoolean("maybe".into())
        );
    }

    #[test]
    fn year_must_be_whole() {
        assert_eq!(year(&Data::Float(2023.0)).unwrap(), 2023);
        assert_eq!(year(&Data::Int(2023)).unwrap(), 2023);
        assert_eq!(year(&Data::String(" 2023 ".into())).unwrap(), 2023);
        assert!(year(&Data::Float(2023.5)).is_err());
        assert!(year(&Data::Empty).is_err());
    }

    #[test]
    fn text_of_cells() {
        assert_eq!(text(&Data::Empty), "");
        assert_eq!(text(&Data::Float(123.0)), "123");
        assert_eq!(text(&Data::String("Jane".into())), "Jane");
        assert_eq!(text(&Data::Bool(false)), "false");
    }
}
