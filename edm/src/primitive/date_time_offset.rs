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

//! `Edm.DateTimeOffset` primitive wrapper
//!
//! Wraps `time::OffsetDateTime` and parses RFC 3339 text. URI literals may
//! omit seconds (`2012-12-03T07:16Z`), which RFC 3339 does not allow, so
//! such input is completed with `:00` before parsing. Display always uses
//! canonical RFC 3339 formatting; `+00:00` is rendered as `Z` while non-UTC
//! offsets are preserved.

use core::str::FromStr;
use std::fmt::Display;
use std::fmt::Error as FmtError;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Type corresponding to `Edm.DateTimeOffset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdmDateTimeOffset(OffsetDateTime);

impl From<OffsetDateTime> for EdmDateTimeOffset {
    fn from(dt: OffsetDateTime) -> Self {
        Self(dt)
    }
}

impl From<EdmDateTimeOffset> for OffsetDateTime {
    fn from(w: EdmDateTimeOffset) -> Self {
        w.0
    }
}

impl Display for EdmDateTimeOffset {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let s = self.0.format(&Rfc3339).map_err(|_| FmtError)?;
        f.write_str(&s)
    }
}

/// Insert missing seconds into `...Thh:mm<offset>`.
fn with_seconds(s: &str) -> Option<String> {
    let (date, time) = s.split_once('T')?;
    let offset_start = time.find(['Z', 'z', '+', '-'])?;
    let (hhmm, offset) = time.split_at(offset_start);
    (hhmm.len() == 5).then(|| format!("{date}T{hhmm}:00{offset}"))
}

#[allow(clippy::absolute_paths)]
impl FromStr for EdmDateTimeOffset {
    type Err = time::error::Parse;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match OffsetDateTime::parse(s, &Rfc3339) {
            Ok(dt) => Ok(Self(dt)),
            Err(err) => with_seconds(s)
                .map_or(Err(err), |completed| OffsetDateTime::parse(&completed, &Rfc3339))
                .map(Self),
        }
    }
}
