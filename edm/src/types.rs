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

use crate::names::FullQualifiedName;
use crate::names::SimpleIdentifier;
use crate::primitive::EdmPrimitiveTypeKind;
use crate::structured::EdmComplexType;
use crate::structured::EdmEntityType;
use crate::structured::EdmStructuredType;
use crate::structured::EdmTypeRef;
use crate::structured::IsNullable;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::sync::Arc;

/// Kind of a resolved type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdmTypeKind {
    Primitive,
    Entity,
    Complex,
    Enum,
    Definition,
}

/// Any type a property, parameter or return type can refer to.
#[derive(Debug, Clone)]
pub enum EdmType {
    Primitive(EdmPrimitiveTypeKind),
    Entity(Arc<EdmEntityType>),
    Complex(Arc<EdmComplexType>),
    Enum(Arc<EdmEnumType>),
    Definition(Arc<EdmTypeDefinition>),
}

impl EdmType {
    #[must_use]
    pub fn fqn(&self) -> FullQualifiedName {
        match self {
            Self::Primitive(kind) => kind.fqn(),
            Self::Entity(t) => t.name().clone(),
            Self::Complex(t) => t.name().clone(),
            Self::Enum(t) => t.name.clone(),
            Self::Definition(t) => t.name.clone(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> EdmTypeKind {
        match self {
            Self::Primitive(_) => EdmTypeKind::Primitive,
            Self::Entity(_) => EdmTypeKind::Entity,
            Self::Complex(_) => EdmTypeKind::Complex,
            Self::Enum(_) => EdmTypeKind::Enum,
            Self::Definition(_) => EdmTypeKind::Definition,
        }
    }

    /// Entity or complex type view.
    #[must_use]
    pub fn as_structured(&self) -> Option<&dyn EdmStructuredType> {
        match self {
            Self::Entity(t) => Some(t.as_ref()),
            Self::Complex(t) => Some(t.as_ref()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_entity(&self) -> Option<&Arc<EdmEntityType>> {
        match self {
            Self::Entity(t) => Some(t),
            _ => None,
        }
    }

    /// Primitive kind, looking through type definitions.
    #[must_use]
    pub fn as_primitive(&self) -> Option<EdmPrimitiveTypeKind> {
        match self {
            Self::Primitive(kind) => Some(*kind),
            Self::Definition(t) => Some(t.underlying_type),
            _ => None,
        }
    }

    /// `true` when a value of `self` may be used where `other` is
    /// expected: same type, derived structured type or promotable
    /// primitive.
    #[must_use]
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        match (self.as_primitive(), other.as_primitive()) {
            (Some(source), Some(target)) => target.is_compatible(source),
            _ => match (self.as_structured(), other.as_structured()) {
                (Some(source), Some(target)) => source.is_compatible_with(target.name()),
                _ => self.fqn() == other.fqn(),
            },
        }
    }
}

impl PartialEq for EdmType {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.fqn() == other.fqn()
    }
}

impl Eq for EdmType {}

impl Display for EdmType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        self.fqn().fmt(f)
    }
}

#[derive(Debug, Clone)]
pub struct EdmEnumMember {
    pub name: SimpleIdentifier,
    pub value: i64,
}

/// Resolved enumeration type.
#[derive(Debug)]
pub struct EdmEnumType {
    pub name: FullQualifiedName,
    pub underlying_type: EdmPrimitiveTypeKind,
    pub is_flags: bool,
    pub members: Vec<EdmEnumMember>,
}

impl EdmEnumType {
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&EdmEnumMember> {
        self.members.iter().find(|m| m.name.as_str() == name)
    }

    /// Member by name or by numeric value.
    #[must_use]
    pub fn member_by_literal(&self, literal: &str) -> Option<&EdmEnumMember> {
        self.member(literal).or_else(|| {
            literal
                .parse::<i64>()
                .ok()
                .and_then(|value| self.members.iter().find(|m| m.value == value))
        })
    }
}

/// Resolved type definition over a primitive type.
#[derive(Debug)]
pub struct EdmTypeDefinition {
    pub name: FullQualifiedName,
    pub underlying_type: EdmPrimitiveTypeKind,
    pub max_length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
}

/// Resolved term.
#[derive(Debug)]
pub struct EdmTerm {
    pub name: FullQualifiedName,
    pub type_ref: EdmTypeRef,
    pub base_term: Option<FullQualifiedName>,
    pub applies_to: Vec<String>,
    pub default_value: Option<String>,
    pub nullable: IsNullable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdmAnnotationValue {
    String(String),
    Bool(bool),
    Int(i64),
    EnumMember(String),
    /// Annotation without a value (`true` for boolean terms).
    Default,
}

#[derive(Debug, Clone)]
pub struct EdmAnnotation {
    pub term: FullQualifiedName,
    pub qualifier: Option<String>,
    pub value: EdmAnnotationValue,
}

/// External annotations for one target.
#[derive(Debug)]
pub struct EdmAnnotations {
    pub target: FullQualifiedName,
    pub qualifier: Option<String>,
    pub annotations: Vec<EdmAnnotation>,
}

impl EdmAnnotations {
    #[must_use]
    pub fn annotation(&self, term: &FullQualifiedName) -> Option<&EdmAnnotation> {
        self.annotations.iter().find(|a| a.term == *term)
    }
}
