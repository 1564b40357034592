// SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::primitive::duration;
use crate::primitive::EdmDateTimeOffset;
use crate::primitive::EdmPrimitiveTypeKind;
use rust_decimal::Decimal;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::str::FromStr;
use time::Date;
use time::Duration;
use time::Month;
use time::Time;
use uuid::Uuid;

/// Value of a primitive type as read from a URI literal.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveValue {
    Null,
    /// Base64url text, kept undecoded.
    Binary(String),
    Boolean(bool),
    Byte(u8),
    SByte(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Decimal(Decimal),
    Single(f32),
    Double(f64),
    Date(Date),
    DateTimeOffset(EdmDateTimeOffset),
    TimeOfDay(Time),
    Duration(Duration),
    Guid(Uuid),
    String(String),
}

impl PrimitiveValue {
    /// Kind of the value, `None` for `null`.
    #[must_use]
    pub const fn kind(&self) -> Option<EdmPrimitiveTypeKind> {
        Some(match self {
            Self::Null => return None,
            Self::Binary(_) => EdmPrimitiveTypeKind::Binary,
            Self::Boolean(_) => EdmPrimitiveTypeKind::Boolean,
            Self::Byte(_) => EdmPrimitiveTypeKind::Byte,
            Self::SByte(_) => EdmPrimitiveTypeKind::SByte,
            Self::Int16(_) => EdmPrimitiveTypeKind::Int16,
            Self::Int32(_) => EdmPrimitiveTypeKind::Int32,
            Self::Int64(_) => EdmPrimitiveTypeKind::Int64,
            Self::Decimal(_) => EdmPrimitiveTypeKind::Decimal,
            Self::Single(_) => EdmPrimitiveTypeKind::Single,
            Self::Double(_) => EdmPrimitiveTypeKind::Double,
            Self::Date(_) => EdmPrimitiveTypeKind::Date,
            Self::DateTimeOffset(_) => EdmPrimitiveTypeKind::DateTimeOffset,
            Self::TimeOfDay(_) => EdmPrimitiveTypeKind::TimeOfDay,
            Self::Duration(_) => EdmPrimitiveTypeKind::Duration,
            Self::Guid(_) => EdmPrimitiveTypeKind::Guid,
            Self::String(_) => EdmPrimitiveTypeKind::String,
        })
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Infer the type of an untyped literal in a common expression.
    ///
    /// Integers get the smallest kind that holds them (`SByte`, `Byte`,
    /// `Int16`, `Int32`, `Int64`, then `Decimal`). Numbers with a
    /// fraction are `Decimal`, numbers with an exponent are `Double`.
    #[must_use]
    pub fn infer(literal: &str) -> Option<Self> {
        if literal == "null" {
            return Some(Self::Null);
        }
        if let Some(v) = parse_bool(literal) {
            return Some(Self::Boolean(v));
        }
        if literal.starts_with('\'') {
            return unquote(literal).map(Self::String);
        }
        if has_prefix(literal, "duration'") {
            return parse_as(EdmPrimitiveTypeKind::Duration, literal);
        }
        if has_prefix(literal, "binary'") {
            return parse_as(EdmPrimitiveTypeKind::Binary, literal);
        }
        [
            EdmPrimitiveTypeKind::Guid,
            EdmPrimitiveTypeKind::DateTimeOffset,
            EdmPrimitiveTypeKind::Date,
            EdmPrimitiveTypeKind::TimeOfDay,
        ]
        .into_iter()
        .find_map(|kind| parse_as(kind, literal))
        .or_else(|| infer_number(literal))
    }

    /// URI literal form, e.g. `'O''Neil'`, `2012-12-03`, `duration'P1D'`.
    #[must_use]
    pub fn to_uri_literal(&self) -> String {
        match self {
            Self::Null => "null".into(),
            Self::Binary(v) => format!("binary'{v}'"),
            Self::Boolean(v) => v.to_string(),
            Self::Byte(v) => v.to_string(),
            Self::SByte(v) => v.to_string(),
            Self::Int16(v) => v.to_string(),
            Self::Int32(v) => v.to_string(),
            Self::Int64(v) => v.to_string(),
            Self::Decimal(v) => v.to_string(),
            Self::Single(v) => format_float(f64::from(*v)),
            Self::Double(v) => format_float(*v),
            Self::Date(v) => format_date(v),
            Self::DateTimeOffset(v) => v.to_string(),
            Self::TimeOfDay(v) => format_time(v),
            Self::Duration(v) => format!("duration'{}'", duration::format(v)),
            Self::Guid(v) => v.hyphenated().to_string(),
            Self::String(v) => format!("'{}'", v.replace('\'', "''")),
        }
    }
}

impl Display for PrimitiveValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.to_uri_literal())
    }
}

impl From<i16> for PrimitiveValue {
    fn from(v: i16) -> Self {
        Self::Int16(v)
    }
}

impl From<i32> for PrimitiveValue {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for PrimitiveValue {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<&str> for PrimitiveValue {
    fn from(v: &str) -> Self {
        Self::String(v.into())
    }
}

impl From<String> for PrimitiveValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<bool> for PrimitiveValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

/// Parse a non-null literal of a known kind.
pub(crate) fn parse_as(kind: EdmPrimitiveTypeKind, literal: &str) -> Option<PrimitiveValue> {
    match kind {
        EdmPrimitiveTypeKind::Boolean => parse_bool(literal).map(PrimitiveValue::Boolean),
        EdmPrimitiveTypeKind::Byte => parse_integer(literal)
            .and_then(|v| u8::try_from(v).ok())
            .map(PrimitiveValue::Byte),
        EdmPrimitiveTypeKind::SByte => parse_integer(literal)
            .and_then(|v| i8::try_from(v).ok())
            .map(PrimitiveValue::SByte),
        EdmPrimitiveTypeKind::Int16 => parse_integer(literal)
            .and_then(|v| i16::try_from(v).ok())
            .map(PrimitiveValue::Int16),
        EdmPrimitiveTypeKind::Int32 => parse_integer(literal)
            .and_then(|v| i32::try_from(v).ok())
            .map(PrimitiveValue::Int32),
        EdmPrimitiveTypeKind::Int64 => parse_integer(literal).map(PrimitiveValue::Int64),
        EdmPrimitiveTypeKind::Decimal => parse_decimal(literal).map(PrimitiveValue::Decimal),
        EdmPrimitiveTypeKind::Double => parse_double(literal).map(PrimitiveValue::Double),
        EdmPrimitiveTypeKind::Single => parse_double(literal)
            .filter(|v| !v.is_finite() || v.abs() <= f64::from(f32::MAX))
            .map(|v| {
                #[allow(clippy::cast_possible_truncation)]
                PrimitiveValue::Single(v as f32)
            }),
        EdmPrimitiveTypeKind::String => unquote(literal).map(PrimitiveValue::String),
        EdmPrimitiveTypeKind::Date => parse_date(literal).map(PrimitiveValue::Date),
        EdmPrimitiveTypeKind::DateTimeOffset => EdmDateTimeOffset::from_str(literal)
            .ok()
            .map(PrimitiveValue::DateTimeOffset),
        EdmPrimitiveTypeKind::TimeOfDay => parse_time(literal).map(PrimitiveValue::TimeOfDay),
        EdmPrimitiveTypeKind::Duration => duration::parse(strip_typed_quotes(literal, "duration"))
            .map(PrimitiveValue::Duration),
        EdmPrimitiveTypeKind::Guid => {
            if literal.len() == 36 {
                Uuid::try_parse(literal).ok().map(PrimitiveValue::Guid)
            } else {
                None
            }
        }
        EdmPrimitiveTypeKind::Binary => {
            let text = if has_prefix(literal, "binary'") {
                strip_typed_quotes(literal, "binary")
            } else {
                strip_typed_quotes(literal, "X")
            };
            is_base64(text).then(|| PrimitiveValue::Binary(text.into()))
        }
        EdmPrimitiveTypeKind::Stream => None,
    }
}

fn has_prefix(literal: &str, prefix: &str) -> bool {
    literal
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// `prefix'text'` → `text`; anything else is returned unchanged.
fn strip_typed_quotes<'a>(literal: &'a str, prefix: &str) -> &'a str {
    if has_prefix(literal, prefix) {
        literal[prefix.len()..]
            .strip_prefix('\'')
            .and_then(|rest| rest.strip_suffix('\''))
            .unwrap_or(literal)
    } else {
        literal
    }
}

fn parse_bool(literal: &str) -> Option<bool> {
    if literal.eq_ignore_ascii_case("true") {
        Some(true)
    } else if literal.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_integer(literal: &str) -> Option<i64> {
    let digits = literal
        .strip_prefix(['-', '+'])
        .unwrap_or(literal);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    literal.parse().ok()
}

fn is_decimal_text(literal: &str) -> bool {
    let body = literal.strip_prefix(['-', '+']).unwrap_or(literal);
    let (mantissa, exponent) = match body.split_once(['e', 'E']) {
        Some((m, e)) => (m, Some(e)),
        None => (body, None),
    };
    let (whole, fraction) = match mantissa.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (mantissa, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    all_digits(whole)
        && fraction.map_or(true, all_digits)
        && exponent.map_or(true, |e| all_digits(e.strip_prefix(['-', '+']).unwrap_or(e)))
}

fn parse_decimal(literal: &str) -> Option<Decimal> {
    if !is_decimal_text(literal) {
        return None;
    }
    if literal.contains(['e', 'E']) {
        Decimal::from_scientific(literal).ok()
    } else {
        Decimal::from_str(literal).ok()
    }
}

fn parse_double(literal: &str) -> Option<f64> {
    match literal {
        "INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        _ if is_decimal_text(literal) => literal.parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn infer_number(literal: &str) -> Option<PrimitiveValue> {
    if let Some(v) = parse_integer(literal) {
        return Some(if let Ok(v) = i8::try_from(v) {
            PrimitiveValue::SByte(v)
        } else if let Ok(v) = u8::try_from(v) {
            PrimitiveValue::Byte(v)
        } else if let Ok(v) = i16::try_from(v) {
            PrimitiveValue::Int16(v)
        } else if let Ok(v) = i32::try_from(v) {
            PrimitiveValue::Int32(v)
        } else {
            PrimitiveValue::Int64(v)
        });
    }
    if literal.contains(['e', 'E']) || matches!(literal, "INF" | "-INF" | "NaN") {
        parse_double(literal).map(PrimitiveValue::Double)
    } else {
        parse_decimal(literal).map(PrimitiveValue::Decimal)
    }
}

/// `'it''s'` → `it's`. A lone quote inside the literal is an error.
fn unquote(literal: &str) -> Option<String> {
    let inner = literal.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\'' && chars.next() != Some('\'') {
            return None;
        }
        out.push(c);
    }
    Some(out)
}

fn is_base64(text: &str) -> bool {
    let body = text.trim_end_matches('=');
    text.len() - body.len() <= 2
        && body
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'+' | b'/'))
}

fn two_digits(s: &str) -> Option<u8> {
    if s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

fn parse_date(literal: &str) -> Option<Date> {
    let (negative, body) = literal
        .strip_prefix('-')
        .map_or((false, literal), |rest| (true, rest));
    let mut parts = body.splitn(3, '-');
    let year = parts.next()?;
    if year.len() < 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let month = Month::try_from(two_digits(parts.next()?)?).ok()?;
    let day = two_digits(parts.next()?)?;
    Date::from_calendar_date(if negative { -year } else { year }, month, day).ok()
}

fn format_date(date: &Date) -> String {
    let year = date.year();
    let sign = if year < 0 { "-" } else { "" };
    format!(
        "{sign}{:04}-{:02}-{:02}",
        year.unsigned_abs(),
        u8::from(date.month()),
        date.day()
    )
}

/// `hh:mm[:ss[.fffffffffffff]]`
fn parse_time(literal: &str) -> Option<Time> {
    let mut parts = literal.splitn(3, ':');
    let hour = two_digits(parts.next()?)?;
    let minute = two_digits(parts.next()?)?;
    let (second, nanos) = match parts.next() {
        None => (0, 0),
        Some(rest) => match rest.split_once('.') {
            None => (two_digits(rest)?, 0),
            Some((second, fraction)) => {
                if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                let significant = &fraction[..fraction.len().min(9)];
                let scale = 10_u32.pow(u32::try_from(9 - significant.len()).ok()?);
                (two_digits(second)?, significant.parse::<u32>().ok()? * scale)
            }
        },
    };
    Time::from_hms_nano(hour, minute, second, nanos).ok()
}

fn format_time(time: &Time) -> String {
    let base = format!(
        "{:02}:{:02}:{:02}",
        time.hour(),
        time.minute(),
        time.second()
    );
    if time.nanosecond() == 0 {
        base
    } else {
        let fraction = format!("{:09}", time.nanosecond());
        format!("{base}.{}", fraction.trim_end_matches('0'))
    }
}

fn format_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".into()
    } else if v.is_infinite() {
        String::from(if v > 0.0 { "INF" } else { "-INF" })
    } else {
        v.to_string()
    }
}
