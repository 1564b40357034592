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

//! ISO 8601 day-time durations as used by `Edm.Duration`
//! (`P12DT23H59M59.999999999999S`). Years and months are not allowed.

use time::Duration;

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_MINUTE: i64 = 60;

fn digits(s: &str) -> Option<i64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Fraction digits beyond nanoseconds are truncated.
fn nanos(fraction: &str) -> Option<i32> {
    if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let significant = &fraction[..fraction.len().min(9)];
    let scale = 10_i32.pow(u32::try_from(9 - significant.len()).ok()?);
    significant.parse::<i32>().ok().map(|v| v * scale)
}

/// Parse `[-]P[nD][T[nH][nM][n[.f]S]]`.
#[must_use]
pub fn parse(text: &str) -> Option<Duration> {
    let (negative, rest) = text
        .strip_prefix('-')
        .map_or((false, text), |rest| (true, rest));
    let rest = rest.strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };
    if date_part.is_empty() && time_part.is_none() {
        return None;
    }

    let mut seconds: i64 = 0;
    let mut subsec: i32 = 0;
    if !date_part.is_empty() {
        let days = digits(date_part.strip_suffix('D')?)?;
        seconds = days.checked_mul(SECONDS_PER_DAY)?;
    }
    if let Some(mut time) = time_part {
        if time.is_empty() {
            return None;
        }
        for (unit, factor) in [('H', SECONDS_PER_HOUR), ('M', SECONDS_PER_MINUTE)] {
            if let Some(pos) = time.find(unit) {
                let value = digits(&time[..pos])?;
                seconds = seconds.checked_add(value.checked_mul(factor)?)?;
                time = &time[pos + 1..];
            }
        }
        if !time.is_empty() {
            let secs = time.strip_suffix('S')?;
            let (whole, fraction) = match secs.split_once('.') {
                Some((whole, fraction)) => (whole, Some(fraction)),
                None => (secs, None),
            };
            seconds = seconds.checked_add(digits(whole)?)?;
            if let Some(fraction) = fraction {
                subsec = nanos(fraction)?;
            }
        }
    }

    let duration = Duration::new(seconds, subsec);
    Some(if negative { -duration } else { duration })
}

/// Canonical text, `PT0S` for zero.
#[must_use]
pub fn format(duration: &Duration) -> String {
    let mut out = String::new();
    if duration.is_negative() {
        out.push('-');
    }
    out.push('P');
    let total = duration.whole_seconds().unsigned_abs();
    let subsec = duration.subsec_nanoseconds().unsigned_abs();
    let days = total / SECONDS_PER_DAY.unsigned_abs();
    let hours = total % SECONDS_PER_DAY.unsigned_abs() / SECONDS_PER_HOUR.unsigned_abs();
    let minutes = total % SECONDS_PER_HOUR.unsigned_abs() / SECONDS_PER_MINUTE.unsigned_abs();
    let seconds = total % SECONDS_PER_MINUTE.unsigned_abs();
    if days > 0 {
        out.push_str(&format!("{days}D"));
    }
    if hours > 0 || minutes > 0 || seconds > 0 || subsec > 0 || days == 0 {
        out.push('T');
        if hours > 0 {
            out.push_str(&format!("{hours}H"));
        }
        if minutes > 0 {
            out.push_str(&format!("{minutes}M"));
        }
        if seconds > 0 || subsec > 0 || (hours == 0 && minutes == 0) {
            out.push_str(&seconds.to_string());
            if subsec > 0 {
                let fraction = format!("{subsec:09}");
                out.push('.');
                out.push_str(fraction.trim_end_matches('0'));
            }
            out.push('S');
        }
    }
    out
}
