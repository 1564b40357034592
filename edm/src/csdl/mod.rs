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

//! Provider-side description of schema content.
//!
//! These are plain serde structures shaped after CSDL. A provider fills
//! them in any way it likes (reading CSDL documents is not part of this
//! crate) and the directory turns them into resolved `Edm*` elements on
//! first access.

/// Entity and complex types with their properties.
pub mod structured;

/// Actions, functions and their parameters.
pub mod operation;

/// Entity container and its children.
pub mod container;

use crate::names::FullQualifiedName;
use crate::names::Namespace;
use crate::names::SimpleIdentifier;
use crate::names::TypeRef;
use serde::Deserialize;

#[doc(inline)]
pub use container::CsdlActionImport;
#[doc(inline)]
pub use container::CsdlEntityContainer;
#[doc(inline)]
pub use container::CsdlEntitySet;
#[doc(inline)]
pub use container::CsdlFunctionImport;
#[doc(inline)]
pub use container::CsdlNavigationPropertyBinding;
#[doc(inline)]
pub use container::CsdlSingleton;
#[doc(inline)]
pub use operation::CsdlAction;
#[doc(inline)]
pub use operation::CsdlFunction;
#[doc(inline)]
pub use operation::CsdlParameter;
#[doc(inline)]
pub use operation::CsdlReturnType;
#[doc(inline)]
pub use structured::CsdlComplexType;
#[doc(inline)]
pub use structured::CsdlEntityType;
#[doc(inline)]
pub use structured::CsdlNavigationProperty;
#[doc(inline)]
pub use structured::CsdlProperty;
#[doc(inline)]
pub use structured::CsdlPropertyRef;

/// Schema: a namespace with an optional alias and its elements.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlSchema {
    pub namespace: Namespace,
    pub alias: Option<SimpleIdentifier>,
    #[serde(default)]
    pub entity_types: Vec<CsdlEntityType>,
    #[serde(default)]
    pub complex_types: Vec<CsdlComplexType>,
    #[serde(default)]
    pub enum_types: Vec<CsdlEnumType>,
    #[serde(default)]
    pub type_definitions: Vec<CsdlTypeDefinition>,
    #[serde(default)]
    pub actions: Vec<CsdlAction>,
    #[serde(default)]
    pub functions: Vec<CsdlFunction>,
    #[serde(default)]
    pub terms: Vec<CsdlTerm>,
    pub entity_container: Option<CsdlEntityContainer>,
    #[serde(default)]
    pub annotations: Vec<CsdlAnnotations>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlEnumType {
    pub name: SimpleIdentifier,
    pub underlying_type: Option<FullQualifiedName>,
    #[serde(default)]
    pub is_flags: bool,
    #[serde(default)]
    pub members: Vec<CsdlEnumMember>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlEnumMember {
    pub name: SimpleIdentifier,
    pub value: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlTypeDefinition {
    pub name: SimpleIdentifier,
    pub underlying_type: FullQualifiedName,
    pub max_length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlTerm {
    pub name: SimpleIdentifier,
    #[serde(rename = "Type")]
    pub ttype: TypeRef,
    pub base_term: Option<FullQualifiedName>,
    pub applies_to: Option<String>,
    pub default_value: Option<String>,
    pub nullable: Option<bool>,
}

/// External targeting annotations (`Annotations` element).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlAnnotations {
    /// Path of the annotated element, e.g. `ns.ETAllPrim/PropertyInt16`.
    pub target: String,
    pub qualifier: Option<String>,
    #[serde(default)]
    pub annotations: Vec<CsdlAnnotation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlAnnotation {
    pub term: FullQualifiedName,
    pub qualifier: Option<String>,
    pub string: Option<String>,
    pub bool: Option<bool>,
    pub int: Option<i64>,
    pub enum_member: Option<String>,
}
