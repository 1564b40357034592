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

//! Resolved entity and complex types.

use crate::names::FullQualifiedName;
use crate::names::SimpleIdentifier;
use crate::primitive::EdmPrimitiveTypeKind;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::sync::Arc;
use tagged_types::TaggedType;

pub type IsNullable = TaggedType<bool, IsNullableTag>;
#[doc(hidden)]
#[derive(tagged_types::Tag)]
#[implement(Clone, Copy, PartialEq, Eq)]
#[transparent(Debug)]
#[capability(inner_access)]
pub enum IsNullableTag {}

pub type IsCollection = TaggedType<bool, IsCollectionTag>;
#[doc(hidden)]
#[derive(tagged_types::Tag)]
#[implement(Clone, Copy, PartialEq, Eq)]
#[transparent(Debug)]
#[capability(inner_access)]
pub enum IsCollectionTag {}

/// Type reference with aliases already replaced by namespaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdmTypeRef {
    pub name: FullQualifiedName,
    pub collection: IsCollection,
}

impl EdmTypeRef {
    #[must_use]
    pub fn new(name: FullQualifiedName, collection: bool) -> Self {
        Self {
            name,
            collection: IsCollection::new(collection),
        }
    }

    #[must_use]
    pub fn is_collection(&self) -> bool {
        *self.collection.inner()
    }

    /// Primitive kind if the reference names an `Edm` type.
    #[must_use]
    pub fn primitive(&self) -> Option<EdmPrimitiveTypeKind> {
        EdmPrimitiveTypeKind::from_fqn(&self.name)
    }
}

impl Display for EdmTypeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.is_collection() {
            write!(f, "Collection({})", self.name)
        } else {
            self.name.fmt(f)
        }
    }
}

/// Structural property.
#[derive(Debug, Clone)]
pub struct EdmProperty {
    pub name: SimpleIdentifier,
    pub type_ref: EdmTypeRef,
    pub nullable: IsNullable,
    pub max_length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub default_value: Option<String>,
}

impl EdmProperty {
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    #[must_use]
    pub fn is_nullable(&self) -> bool {
        *self.nullable.inner()
    }

    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.type_ref.is_collection()
    }

    #[must_use]
    pub fn is_primitive(&self) -> bool {
        self.type_ref.primitive().is_some()
    }
}

/// Navigation property.
#[derive(Debug, Clone)]
pub struct EdmNavigationProperty {
    pub name: SimpleIdentifier,
    /// Entity type of the target.
    pub target: FullQualifiedName,
    pub collection: IsCollection,
    pub nullable: IsNullable,
    pub partner: Option<String>,
    pub contains_target: bool,
}

impl EdmNavigationProperty {
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    #[must_use]
    pub fn is_collection(&self) -> bool {
        *self.collection.inner()
    }
}

/// Key property of an entity type.
///
/// `name` is the alias when the key reference has one, else the
/// reference path itself (`PropertyComp/PropertyInt16`).
#[derive(Debug, Clone)]
pub struct EdmKeyProperty {
    pub name: String,
    pub path: Vec<SimpleIdentifier>,
    pub property: EdmProperty,
}

impl EdmKeyProperty {
    /// Primitive kind of the key value. Key properties are always
    /// primitive (or type definitions resolved to primitives by the
    /// directory).
    #[must_use]
    pub fn kind(&self) -> Option<EdmPrimitiveTypeKind> {
        self.property.type_ref.primitive()
    }
}

/// Common interface of entity and complex types.
pub trait EdmStructuredType: Send + Sync {
    fn name(&self) -> &FullQualifiedName;

    fn base(&self) -> Option<&dyn EdmStructuredType>;

    fn declared_properties(&self) -> &[EdmProperty];

    fn declared_navigation_properties(&self) -> &[EdmNavigationProperty];

    fn is_abstract(&self) -> bool;

    fn is_open_type(&self) -> bool;

    /// `true` for entity types.
    fn is_entity_type(&self) -> bool;

    /// Structural property by name, declared here or on a base type.
    fn property(&self, name: &str) -> Option<&EdmProperty> {
        self.declared_properties()
            .iter()
            .find(|p| p.name() == name)
            .or_else(|| self.base().and_then(|base| base.property(name)))
    }

    /// Navigation property by name, declared here or on a base type.
    fn navigation_property(&self, name: &str) -> Option<&EdmNavigationProperty> {
        self.declared_navigation_properties()
            .iter()
            .find(|p| p.name() == name)
            .or_else(|| self.base().and_then(|base| base.navigation_property(name)))
    }

    /// Names of all structural properties, base type first.
    fn property_names(&self) -> Vec<&str> {
        let mut names = self.base().map(|b| b.property_names()).unwrap_or_default();
        names.extend(self.declared_properties().iter().map(EdmProperty::name));
        names
    }

    /// Names of all navigation properties, base type first.
    fn navigation_property_names(&self) -> Vec<&str> {
        let mut names = self
            .base()
            .map(|b| b.navigation_property_names())
            .unwrap_or_default();
        names.extend(
            self.declared_navigation_properties()
                .iter()
                .map(EdmNavigationProperty::name),
        );
        names
    }

    /// `true` if this type is `name` or derives from it.
    fn is_compatible_with(&self, name: &FullQualifiedName) -> bool {
        self.name() == name || self.base().is_some_and(|b| b.is_compatible_with(name))
    }
}

/// Resolved entity type.
#[derive(Debug)]
pub struct EdmEntityType {
    pub name: FullQualifiedName,
    pub(crate) base: Option<Arc<EdmEntityType>>,
    pub(crate) is_abstract: bool,
    pub(crate) open_type: bool,
    pub(crate) has_stream: bool,
    pub(crate) keys: Vec<EdmKeyProperty>,
    pub(crate) properties: Vec<EdmProperty>,
    pub(crate) navigation_properties: Vec<EdmNavigationProperty>,
}

impl EdmEntityType {
    #[must_use]
    pub fn base_type(&self) -> Option<&Arc<Self>> {
        self.base.as_ref()
    }

    /// Key properties in declared order. Inherited from the nearest
    /// base type declaring a key.
    #[must_use]
    pub fn key_properties(&self) -> &[EdmKeyProperty] {
        &self.keys
    }

    #[must_use]
    pub fn key_property(&self, name: &str) -> Option<&EdmKeyProperty> {
        self.keys.iter().find(|k| k.name == name)
    }

    /// Media entity (`HasStream`), inherited.
    #[must_use]
    pub fn has_stream(&self) -> bool {
        self.has_stream || self.base.as_ref().is_some_and(|b| b.has_stream())
    }
}

impl EdmStructuredType for EdmEntityType {
    fn name(&self) -> &FullQualifiedName {
        &self.name
    }

    fn base(&self) -> Option<&dyn EdmStructuredType> {
        self.base.as_deref().map(|b| b as &dyn EdmStructuredType)
    }

    fn declared_properties(&self) -> &[EdmProperty] {
        &self.properties
    }

    fn declared_navigation_properties(&self) -> &[EdmNavigationProperty] {
        &self.navigation_properties
    }

    fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    fn is_open_type(&self) -> bool {
        self.open_type || self.base.as_ref().is_some_and(|b| b.is_open_type())
    }

    fn is_entity_type(&self) -> bool {
        true
    }
}

/// Resolved complex type.
#[derive(Debug)]
pub struct EdmComplexType {
    pub(crate) name: FullQualifiedName,
    pub(crate) base: Option<Arc<EdmComplexType>>,
    pub(crate) is_abstract: bool,
    pub(crate) open_type: bool,
    pub(crate) properties: Vec<EdmProperty>,
    pub(crate) navigation_properties: Vec<EdmNavigationProperty>,
}

impl EdmComplexType {
    #[must_use]
    pub fn base_type(&self) -> Option<&Arc<Self>> {
        self.base.as_ref()
    }
}

impl EdmStructuredType for EdmComplexType {
    fn name(&self) -> &FullQualifiedName {
        &self.name
    }

    fn base(&self) -> Option<&dyn EdmStructuredType> {
        self.base.as_deref().map(|b| b as &dyn EdmStructuredType)
    }

    fn declared_properties(&self) -> &[EdmProperty] {
        &self.properties
    }

    fn declared_navigation_properties(&self) -> &[EdmNavigationProperty] {
        &self.navigation_properties
    }

    fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    fn is_open_type(&self) -> bool {
        self.open_type || self.base.as_ref().is_some_and(|b| b.is_open_type())
    }

    fn is_entity_type(&self) -> bool {
        false
    }
}
