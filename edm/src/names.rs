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

//! Names of schema elements: simple identifiers, namespaces, full
//! qualified names and (possibly collection) type references.

use serde::de::Error as DeError;
use serde::de::Visitor;
use serde::Deserialize;
use serde::Deserializer;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    InvalidSimpleIdentifier(String),
    InvalidQualifiedName(String),
    InvalidTypeRef(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::InvalidSimpleIdentifier(id) => write!(f, "invalid simple identifier {id}"),
            Self::InvalidQualifiedName(id) => write!(f, "invalid qualified name {id}"),
            Self::InvalidTypeRef(id) => write!(f, "invalid type reference {id}"),
        }
    }
}

impl StdError for Error {}

/// `SimpleIdentifier`: a letter or underscore followed by letters,
/// digits or underscores.
#[derive(Clone, Debug, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct SimpleIdentifier(String);

impl SimpleIdentifier {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reserved names known to be valid.
    pub(crate) fn from_static(id: &'static str) -> Self {
        Self(id.into())
    }
}

impl Display for SimpleIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        self.0.fmt(f)
    }
}

impl AsRef<str> for SimpleIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for SimpleIdentifier {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();

        // Max length of 128 characters is not enforced.
        chars
            .next()
            .filter(|first| first.is_alphabetic() || *first == '_')
            .ok_or_else(|| Error::InvalidSimpleIdentifier(s.into()))?;

        if chars.any(|c| !c.is_alphanumeric() && c != '_') {
            Err(Error::InvalidSimpleIdentifier(s.into()))
        } else {
            Ok(Self(s.into()))
        }
    }
}

/// Dot-separated sequence of simple identifiers. Aliases share the
/// same syntax with a single identifier.
#[derive(Clone, Debug, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct Namespace {
    ids: Vec<SimpleIdentifier>,
}

impl Namespace {
    /// The reserved `Edm` namespace.
    #[must_use]
    pub fn edm() -> Self {
        Self {
            ids: vec![SimpleIdentifier::from_static("Edm")],
        }
    }

    /// `true` for the reserved `Edm` namespace of primitive types.
    #[must_use]
    pub fn is_edm(&self) -> bool {
        self.ids.len() == 1 && self.ids[0].as_str() == "Edm"
    }

    #[must_use]
    pub fn ids(&self) -> &[SimpleIdentifier] {
        &self.ids
    }
}

impl From<SimpleIdentifier> for Namespace {
    fn from(id: SimpleIdentifier) -> Self {
        Self { ids: vec![id] }
    }
}

impl FromStr for Namespace {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self {
            ids: s
                .split('.')
                .map(SimpleIdentifier::from_str)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut iter = self.ids.iter();
        if let Some(v) = iter.next() {
            v.fmt(f)?;
        }
        for v in iter {
            ".".fmt(f)?;
            v.fmt(f)?;
        }
        Ok(())
    }
}

/// Namespace (or alias) plus simple name of a schema element.
#[derive(Clone, Debug, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct FullQualifiedName {
    pub namespace: Namespace,
    pub name: SimpleIdentifier,
}

impl FullQualifiedName {
    #[must_use]
    pub const fn new(namespace: Namespace, name: SimpleIdentifier) -> Self {
        Self { namespace, name }
    }

    /// Build a name from string parts.
    ///
    /// # Errors
    ///
    /// Returns an error if either part is not a valid identifier.
    pub fn from_parts(namespace: &str, name: &str) -> Result<Self, Error> {
        Ok(Self {
            namespace: namespace.parse()?,
            name: name.parse()?,
        })
    }

    #[must_use]
    pub fn is_edm(&self) -> bool {
        self.namespace.is_edm()
    }

    /// Same simple name in another namespace. Used to rewrite aliases.
    #[must_use]
    pub fn with_namespace(&self, namespace: Namespace) -> Self {
        Self {
            namespace,
            name: self.name.clone(),
        }
    }
}

impl FromStr for FullQualifiedName {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ids = s
            .split('.')
            .map(SimpleIdentifier::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| Error::InvalidQualifiedName(s.into()))?;
        let name = ids
            .pop()
            .ok_or_else(|| Error::InvalidQualifiedName(s.into()))?;
        if ids.is_empty() {
            return Err(Error::InvalidQualifiedName(s.into()));
        }
        Ok(Self {
            namespace: Namespace { ids },
            name,
        })
    }
}

impl Display for FullQualifiedName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

/// Reference to a type, single or collection.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeRef {
    One(FullQualifiedName),
    CollectionOf(FullQualifiedName),
}

impl TypeRef {
    #[must_use]
    pub const fn type_name(&self) -> &FullQualifiedName {
        match self {
            Self::One(v) | Self::CollectionOf(v) => v,
        }
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::CollectionOf(_))
    }
}

impl FromStr for TypeRef {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const COLLECTION_PREFIX: &str = "Collection(";
        const COLLECTION_SUFFIX: &str = ")";
        if s.starts_with(COLLECTION_PREFIX) && s.ends_with(COLLECTION_SUFFIX) {
            s[COLLECTION_PREFIX.len()..s.len() - COLLECTION_SUFFIX.len()]
                .parse()
                .map(Self::CollectionOf)
                .map_err(|_| Error::InvalidTypeRef(s.into()))
        } else {
            s.parse()
                .map(Self::One)
                .map_err(|_| Error::InvalidTypeRef(s.into()))
        }
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::One(v) => v.fmt(f),
            Self::CollectionOf(v) => write!(f, "Collection({v})"),
        }
    }
}

macro_rules! deserialize_from_str {
    ($ty:ty, $expecting:literal) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
                struct StrVisitor {}
                impl Visitor<'_> for StrVisitor {
                    type Value = $ty;

                    fn expecting(&self, formatter: &mut Formatter) -> FmtResult {
                        formatter.write_str($expecting)
                    }
                    fn visit_str<E: DeError>(self, value: &str) -> Result<Self::Value, E> {
                        value.parse().map_err(DeError::custom)
                    }
                }

                de.deserialize_string(StrVisitor {})
            }
        }
    };
}

deserialize_from_str!(SimpleIdentifier, "SimpleIdentifier string");
deserialize_from_str!(Namespace, "Namespace string");
deserialize_from_str!(FullQualifiedName, "FullQualifiedName string");
deserialize_from_str!(TypeRef, "type reference string");
