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

use crate::names::Error as NameError;
use crate::names::FullQualifiedName;
use crate::operation::OperationKey;
use crate::provider::ProviderError;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

/// Type directory errors.
///
/// Absence of an element is not an error: getters return `Ok(None)`.
/// Errors are provider failures and schema defects.
#[derive(Debug)]
pub enum Error {
    /// Provider reported a failure.
    Provider(ProviderError),
    /// Two operations of one provider answer have the same overload key.
    DuplicateOperation(OperationKey),
    /// Base type chain loops back to this type.
    CyclicBaseType(FullQualifiedName),
    /// Referenced type is not known to the provider.
    UnresolvedType(FullQualifiedName),
    /// Key property reference does not name a property of the type.
    UnresolvedKeyProperty(String),
    /// Bound operation without parameters.
    NoBindingParameter(FullQualifiedName),
    /// Name in provider content cannot be parsed.
    InvalidName(NameError),
    /// Error while resolving an entity type.
    EntityType(FullQualifiedName, Box<Error>),
    /// Error while resolving a complex type.
    ComplexType(FullQualifiedName, Box<Error>),
    /// Error while resolving an operation.
    Operation(FullQualifiedName, Box<Error>),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Provider(err) => err.fmt(f),
            Self::DuplicateOperation(key) => write!(f, "duplicate operation overload: {key}"),
            Self::CyclicBaseType(name) => write!(f, "cyclic base type: {name}"),
            Self::UnresolvedType(name) => write!(f, "type not found: {name}"),
            Self::UnresolvedKeyProperty(name) => write!(f, "key property not found: {name}"),
            Self::NoBindingParameter(name) => {
                write!(f, "missing binding parameter for bound operation: {name}")
            }
            Self::InvalidName(err) => err.fmt(f),
            Self::EntityType(name, err) => {
                write!(f, "while resolving entity type: {name}\n{err}")
            }
            Self::ComplexType(name, err) => {
                write!(f, "while resolving complex type: {name}\n{err}")
            }
            Self::Operation(name, err) => {
                write!(f, "while resolving operation: {name}\n{err}")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Provider(err) => Some(err),
            Self::InvalidName(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProviderError> for Error {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err)
    }
}

impl From<NameError> for Error {
    fn from(err: NameError) -> Self {
        Self::InvalidName(err)
    }
}
