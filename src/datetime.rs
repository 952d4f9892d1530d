//! Dates and times.
//!
//! The types in this module are scalars that are encoded in one of two
//! forms. The text form is an ISO 8601 string in a VisibleString such as
//! `2020-01-01`, `12:33:45.999+01:00`, or `2002-07-31T02:03:06.111222`.
//! The binary form is an OCTET STRING containing a two’s complement integer
//! counting from an epoch:
//!
//! * dates count days since 2020-01-01,
//! * times count milliseconds since midnight, and
//! * date-times count milliseconds since 2020-01-01T00:00:00.
//!
//! With a time zone, the integer is preceded by two octets holding the
//! offset from UTC in minutes. Since the binary forms are never longer than
//! nine octets and the text forms never shorter than eight characters, the
//! length of the content decides which form is used.
//!
//! Each value also comes in a variant with a time zone. The
//! [`DateOrDateTz`], [`TimeOrTimeTz`], and [`DatetimeOrDatetimeTz`] types
//! pick whichever of the two the encoded value carries.

use std::str;
use bytes::Bytes;
use time::{Duration, PrimitiveDateTime, UtcOffset};
use time::macros::{date, datetime, format_description};
use crate::decode::ContentError;
use crate::ident::Tag;
use crate::int;
use crate::value::{Decodable, Scalar, ValueMut};


//------------ Configuration Constants ---------------------------------------

/// The day counted from in binary dates.
const DATE_EPOCH: time::Date = date!(2020-01-01);

/// The instant counted from in binary date-times.
const DATETIME_EPOCH: PrimitiveDateTime = datetime!(2020-01-01 0:00);

/// The earliest date. This is also the default date.
const MIN_DATE: time::Date = date!(0001-01-01);

/// The largest offset from UTC in minutes.
const MAX_OFFSET_MINUTES: i16 = 1439;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// The lengths of the binary forms without and with time zone.
const MAX_BINARY_DATE_LEN: usize = 3;
const MAX_BINARY_DATE_TZ_LEN: usize = 5;
const MAX_BINARY_TIME_LEN: usize = 4;
const MAX_BINARY_TIME_TZ_LEN: usize = 6;
const MAX_BINARY_DATETIME_LEN: usize = 6;
const MAX_BINARY_DATETIME_TZ_LEN: usize = 9;

/// The length of the date part of the text form.
const DATE_TEXT_LEN: usize = 10;


//------------ Date ----------------------------------------------------------

/// A calendar date.
///
/// A time zone present in the encoded value is ignored.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Date(pub time::Date);

impl Date {
    fn from_parts(date: time::Date, _offset: Option<UtcOffset>) -> Self {
        Date(date)
    }
}

impl Default for Date {
    fn default() -> Self {
        Date(MIN_DATE)
    }
}


//------------ DateTz --------------------------------------------------------

/// A calendar date with an offset from UTC.
///
/// A value encoded without time zone has an offset of zero.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct DateTz {
    pub date: time::Date,
    pub offset: UtcOffset,
}

impl DateTz {
    fn from_parts(date: time::Date, offset: Option<UtcOffset>) -> Self {
        DateTz { date, offset: offset.unwrap_or(UtcOffset::UTC) }
    }
}

impl Default for DateTz {
    fn default() -> Self {
        DateTz { date: MIN_DATE, offset: UtcOffset::UTC }
    }
}


//------------ Time ----------------------------------------------------------

/// A time of day.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Time(pub time::Time);

impl Time {
    fn from_parts(time: time::Time, _offset: Option<UtcOffset>) -> Self {
        Time(time)
    }
}

impl Default for Time {
    fn default() -> Self {
        Time(time::Time::MIDNIGHT)
    }
}


//------------ TimeTz --------------------------------------------------------

/// A time of day with an offset from UTC.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TimeTz {
    pub time: time::Time,
    pub offset: UtcOffset,
}

impl TimeTz {
    fn from_parts(time: time::Time, offset: Option<UtcOffset>) -> Self {
        TimeTz { time, offset: offset.unwrap_or(UtcOffset::UTC) }
    }
}

impl Default for TimeTz {
    fn default() -> Self {
        TimeTz { time: time::Time::MIDNIGHT, offset: UtcOffset::UTC }
    }
}


//------------ Datetime ------------------------------------------------------

/// A date and time of day.
///
/// The value is the local date and time. A time zone present in the
/// encoded value is ignored.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Datetime(pub PrimitiveDateTime);

impl Datetime {
    fn from_parts(
        datetime: PrimitiveDateTime, _offset: Option<UtcOffset>
    ) -> Self {
        Datetime(datetime)
    }
}

impl Default for Datetime {
    fn default() -> Self {
        Datetime(MIN_DATE.midnight())
    }
}


//------------ DatetimeTz ----------------------------------------------------

/// A date and time of day with an offset from UTC.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct DatetimeTz {
    /// The local date and time.
    pub datetime: PrimitiveDateTime,

    pub offset: UtcOffset,
}

impl DatetimeTz {
    fn from_parts(
        datetime: PrimitiveDateTime, offset: Option<UtcOffset>
    ) -> Self {
        DatetimeTz { datetime, offset: offset.unwrap_or(UtcOffset::UTC) }
    }

    /// Returns the instant described by the value.
    pub fn to_offset_date_time(self) -> time::OffsetDateTime {
        self.datetime.assume_offset(self.offset)
    }
}

impl Default for DatetimeTz {
    fn default() -> Self {
        DatetimeTz { datetime: MIN_DATE.midnight(), offset: UtcOffset::UTC }
    }
}


//------------ Variants ------------------------------------------------------

/// Either a date or a date with time zone, whichever was encoded.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DateOrDateTz {
    Date(Date),
    DateTz(DateTz),
}

impl DateOrDateTz {
    fn from_parts(date: time::Date, offset: Option<UtcOffset>) -> Self {
        match offset {
            Some(offset) => DateOrDateTz::DateTz(DateTz { date, offset }),
            None => DateOrDateTz::Date(Date(date)),
        }
    }
}

impl Default for DateOrDateTz {
    fn default() -> Self {
        DateOrDateTz::Date(Date::default())
    }
}


/// Either a time or a time with time zone, whichever was encoded.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TimeOrTimeTz {
    Time(Time),
    TimeTz(TimeTz),
}

impl TimeOrTimeTz {
    fn from_parts(time: time::Time, offset: Option<UtcOffset>) -> Self {
        match offset {
            Some(offset) => TimeOrTimeTz::TimeTz(TimeTz { time, offset }),
            None => TimeOrTimeTz::Time(Time(time)),
        }
    }
}

impl Default for TimeOrTimeTz {
    fn default() -> Self {
        TimeOrTimeTz::Time(Time::default())
    }
}


/// Either a date-time or a date-time with time zone.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DatetimeOrDatetimeTz {
    Datetime(Datetime),
    DatetimeTz(DatetimeTz),
}

impl DatetimeOrDatetimeTz {
    fn from_parts(
        datetime: PrimitiveDateTime, offset: Option<UtcOffset>
    ) -> Self {
        match offset {
            Some(offset) => {
                DatetimeOrDatetimeTz::DatetimeTz(
                    DatetimeTz { datetime, offset }
                )
            }
            None => DatetimeOrDatetimeTz::Datetime(Datetime(datetime)),
        }
    }
}

impl Default for DatetimeOrDatetimeTz {
    fn default() -> Self {
        DatetimeOrDatetimeTz::Datetime(Datetime::default())
    }
}


//------------ Scalar implementations ----------------------------------------

macro_rules! datetime_impl {
    ( $type:ty, $decode:ident ) => {
        impl Scalar for $type {
            fn universal_tag(&self) -> Tag {
                Tag::VISIBLE_STRING
            }

            fn accepts_universal(&self, tag: Tag) -> bool {
                tag == Tag::VISIBLE_STRING || tag == Tag::OCTET_STRING
            }

            fn decode_content(
                &mut self, content: Bytes
            ) -> Result<(), ContentError> {
                let (value, offset) = $decode(&content)?;
                *self = Self::from_parts(value, offset);
                Ok(())
            }
        }

        impl Decodable for $type {
            fn value_mut(&mut self) -> ValueMut<'_> {
                ValueMut::Scalar(self)
            }
        }
    }
}

datetime_impl!(Date, decode_date);
datetime_impl!(DateTz, decode_date);
datetime_impl!(DateOrDateTz, decode_date);
datetime_impl!(Time, decode_time);
datetime_impl!(TimeTz, decode_time);
datetime_impl!(TimeOrTimeTz, decode_time);
datetime_impl!(Datetime, decode_datetime);
datetime_impl!(DatetimeTz, decode_datetime);
datetime_impl!(DatetimeOrDatetimeTz, decode_datetime);


//------------ Decoding ------------------------------------------------------

type Parts<T> = (T, Option<UtcOffset>);

/// Decodes the content octets of a date.
fn decode_date(content: &[u8]) -> Result<Parts<time::Date>, ContentError> {
    match content.len() {
        0 => Err(ContentError::from_static("empty date")),
        len if len <= MAX_BINARY_DATE_LEN => {
            Ok((binary_date(content)?, None))
        }
        len if len <= MAX_BINARY_DATE_TZ_LEN => {
            let (offset, days) = content.split_at(2);
            Ok((binary_date(days)?, Some(binary_offset(offset)?)))
        }
        _ => {
            let (text, offset) = split_zone(text(content)?, DATE_TEXT_LEN)?;
            let date = time::Date::parse(
                text, format_description!("[year]-[month]-[day]")
            ).map_err(|_| invalid_text("date", text))?;
            Ok((check_year(date)?, offset))
        }
    }
}

/// Decodes the content octets of a time of day.
fn decode_time(content: &[u8]) -> Result<Parts<time::Time>, ContentError> {
    match content.len() {
        0 => Err(ContentError::from_static("empty time")),
        len if len <= MAX_BINARY_TIME_LEN => {
            Ok((binary_time(content)?, None))
        }
        len if len <= MAX_BINARY_TIME_TZ_LEN => {
            let (offset, millis) = content.split_at(2);
            Ok((binary_time(millis)?, Some(binary_offset(offset)?)))
        }
        _ => {
            let (text, offset) = split_zone(text(content)?, 0)?;
            let time = time::Time::parse(
                text,
                format_description!(
                    "[hour]:[minute]:[second][optional [.[subsecond]]]"
                )
            ).map_err(|_| invalid_text("time", text))?;
            Ok((time, offset))
        }
    }
}

/// Decodes the content octets of a date and time of day.
fn decode_datetime(
    content: &[u8]
) -> Result<Parts<PrimitiveDateTime>, ContentError> {
    match content.len() {
        0 => Err(ContentError::from_static("empty date-time")),
        len if len <= MAX_BINARY_DATETIME_LEN => {
            Ok((binary_datetime(content)?, None))
        }
        len if len <= MAX_BINARY_DATETIME_TZ_LEN => {
            let (offset, millis) = content.split_at(2);
            Ok((binary_datetime(millis)?, Some(binary_offset(offset)?)))
        }
        _ => {
            let (text, offset) = split_zone(text(content)?, DATE_TEXT_LEN)?;
            let datetime = PrimitiveDateTime::parse(
                text,
                format_description!(
                    "[year]-[month]-[day]T[hour]:[minute]:[second]\
                     [optional [.[subsecond]]]"
                )
            ).map_err(|_| invalid_text("date-time", text))?;
            check_year(datetime.date())?;
            Ok((datetime, offset))
        }
    }
}


//--- Binary form

fn binary_date(octets: &[u8]) -> Result<time::Date, ContentError> {
    let days = int::sign_extend(octets);
    let date = DATE_EPOCH.checked_add(Duration::days(days)).ok_or(
        ContentError::from_static("date out of range")
    )?;
    check_year(date)
}

fn binary_time(octets: &[u8]) -> Result<time::Time, ContentError> {
    let millis = int::sign_extend(octets);
    if !(0..MILLIS_PER_DAY).contains(&millis) {
        return Err(ContentError::from_static("time out of range"))
    }
    Ok(time::Time::MIDNIGHT + Duration::milliseconds(millis))
}

fn binary_datetime(
    octets: &[u8]
) -> Result<PrimitiveDateTime, ContentError> {
    let millis = int::sign_extend(octets);
    let datetime = DATETIME_EPOCH.checked_add(
        Duration::milliseconds(millis)
    ).ok_or(ContentError::from_static("date-time out of range"))?;
    check_year(datetime.date())?;
    Ok(datetime)
}

/// Decodes the two octets of a time zone.
fn binary_offset(octets: &[u8]) -> Result<UtcOffset, ContentError> {
    let &[high, low] = octets else {
        return Err(ContentError::from_static("invalid time zone"))
    };
    make_offset(i16::from_be_bytes([high, low]))
}


//--- Text form

fn text(content: &[u8]) -> Result<&str, ContentError> {
    str::from_utf8(content).map_err(|_| {
        ContentError::from_static("invalid characters in date or time")
    })
}

/// Splits a trailing time zone off a text value.
///
/// The time zone is either `Z` or a signed offset `+hh:mm`. It is searched
/// for starting at `start` so the dashes of a date aren’t mistaken for it.
fn split_zone(
    text: &str, start: usize
) -> Result<(&str, Option<UtcOffset>), ContentError> {
    let Some(idx) = text.get(start..).and_then(|tail| {
        tail.find(['+', '-', 'Z'])
    }) else {
        return Ok((text, None))
    };
    let (value, zone) = text.split_at(start + idx);
    if zone == "Z" {
        return Ok((value, Some(UtcOffset::UTC)))
    }
    let offset = UtcOffset::parse(
        zone,
        format_description!(
            "[offset_hour sign:mandatory]:[offset_minute]"
        )
    ).map_err(|_| invalid_text("time zone", zone))?;
    Ok((value, Some(make_offset(offset.whole_minutes())?)))
}

fn invalid_text(what: &str, text: &str) -> ContentError {
    format!("invalid {} '{}'", what, text).into()
}


//--- Range checks

fn make_offset(minutes: i16) -> Result<UtcOffset, ContentError> {
    if minutes.unsigned_abs() > MAX_OFFSET_MINUTES.unsigned_abs() {
        return Err(ContentError::from_static("time zone out of range"))
    }
    UtcOffset::from_whole_seconds(i32::from(minutes) * 60).map_err(|_| {
        ContentError::from_static("time zone out of range")
    })
}

fn check_year(date: time::Date) -> Result<time::Date, ContentError> {
    if date.year() < 1 {
        Err(ContentError::from_static("date before year 1"))
    }
    else {
        Ok(date)
    }
}


//============ Tests =========================================================
