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

//! Primitive types of the `Edm` namespace and their URI literal forms.

/// `Edm.DateTimeOffset` wrapper.
pub mod date_time_offset;

/// `Edm.Duration` text form.
pub mod duration;

/// Typed primitive values.
pub mod value;

use crate::names::FullQualifiedName;
use crate::names::Namespace;
use crate::names::SimpleIdentifier;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::str::FromStr;

#[doc(inline)]
pub use date_time_offset::EdmDateTimeOffset;
#[doc(inline)]
pub use value::PrimitiveValue;

/// Kind of a primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdmPrimitiveTypeKind {
    Binary,
    Boolean,
    Byte,
    SByte,
    Date,
    DateTimeOffset,
    Decimal,
    Double,
    Single,
    Duration,
    Guid,
    Int16,
    Int32,
    Int64,
    String,
    TimeOfDay,
    Stream,
}

impl EdmPrimitiveTypeKind {
    pub const ALL: [Self; 17] = [
        Self::Binary,
        Self::Boolean,
        Self::Byte,
        Self::SByte,
        Self::Date,
        Self::DateTimeOffset,
        Self::Decimal,
        Self::Double,
        Self::Single,
        Self::Duration,
        Self::Guid,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::String,
        Self::TimeOfDay,
        Self::Stream,
    ];

    /// Simple name inside the `Edm` namespace.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Binary => "Binary",
            Self::Boolean => "Boolean",
            Self::Byte => "Byte",
            Self::SByte => "SByte",
            Self::Date => "Date",
            Self::DateTimeOffset => "DateTimeOffset",
            Self::Decimal => "Decimal",
            Self::Double => "Double",
            Self::Single => "Single",
            Self::Duration => "Duration",
            Self::Guid => "Guid",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::String => "String",
            Self::TimeOfDay => "TimeOfDay",
            Self::Stream => "Stream",
        }
    }

    /// Full qualified name, e.g. `Edm.Int16`.
    #[must_use]
    pub fn fqn(self) -> FullQualifiedName {
        FullQualifiedName::new(Namespace::edm(), SimpleIdentifier::from_static(self.name()))
    }

    /// Kind for a name in the `Edm` namespace.
    #[must_use]
    pub fn from_fqn(fqn: &FullQualifiedName) -> Option<Self> {
        if fqn.is_edm() {
            Self::ALL
                .into_iter()
                .find(|kind| kind.name() == fqn.name.as_str())
        } else {
            None
        }
    }

    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Byte | Self::SByte | Self::Int16 | Self::Int32 | Self::Int64
        )
    }

    #[must_use]
    pub const fn is_numeric(self) -> bool {
        self.is_integer() || matches!(self, Self::Decimal | Self::Single | Self::Double)
    }

    /// Whether a value of kind `source` can be used where `self` is
    /// expected (numeric promotion).
    #[must_use]
    pub const fn is_compatible(self, source: Self) -> bool {
        if self as u8 == source as u8 {
            return true;
        }
        match source {
            Self::Byte | Self::SByte => matches!(
                self,
                Self::Int16 | Self::Int32 | Self::Int64 | Self::Decimal | Self::Single | Self::Double
            ),
            Self::Int16 => matches!(
                self,
                Self::Int32 | Self::Int64 | Self::Decimal | Self::Single | Self::Double
            ),
            Self::Int32 => matches!(self, Self::Int64 | Self::Decimal | Self::Single | Self::Double),
            Self::Int64 => matches!(self, Self::Decimal | Self::Single | Self::Double),
            Self::Decimal => matches!(self, Self::Single | Self::Double),
            Self::Single => matches!(self, Self::Double),
            _ => false,
        }
    }

    /// Validate a URI literal against this kind.
    ///
    /// `null` is accepted for every kind; callers that need a non-null
    /// value check for [`PrimitiveValue::Null`].
    ///
    /// # Errors
    ///
    /// Returns `LiteralError` if the literal has the wrong form or its
    /// value is out of range for the kind.
    pub fn validate_literal(self, literal: &str) -> Result<PrimitiveValue, LiteralError> {
        if literal == "null" {
            return Ok(PrimitiveValue::Null);
        }
        value::parse_as(self, literal).ok_or_else(|| LiteralError {
            kind: self,
            literal: literal.into(),
        })
    }
}

impl Display for EdmPrimitiveTypeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Edm.{}", self.name())
    }
}

impl FromStr for EdmPrimitiveTypeKind {
    type Err = LiteralError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<FullQualifiedName>()
            .ok()
            .as_ref()
            .and_then(Self::from_fqn)
            .ok_or_else(|| LiteralError {
                kind: Self::String,
                literal: s.into(),
            })
    }
}

/// Literal does not match its primitive type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralError {
    pub kind: EdmPrimitiveTypeKind,
    pub literal: String,
}

impl Display for LiteralError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "'{}' is not a valid {} literal", self.literal, self.kind)
    }
}

impl StdError for LiteralError {}
