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
use crate::names::TypeRef;
use serde::Deserialize;

/// Entity type with key, structural and navigation properties.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlEntityType {
    pub name: SimpleIdentifier,
    pub base_type: Option<FullQualifiedName>,
    #[serde(default)]
    pub r#abstract: bool,
    #[serde(default)]
    pub open_type: bool,
    #[serde(default)]
    pub has_stream: bool,
    /// Key property references. Empty when the key is inherited.
    #[serde(default)]
    pub key: Vec<CsdlPropertyRef>,
    #[serde(default)]
    pub properties: Vec<CsdlProperty>,
    #[serde(default)]
    pub navigation_properties: Vec<CsdlNavigationProperty>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlComplexType {
    pub name: SimpleIdentifier,
    pub base_type: Option<FullQualifiedName>,
    #[serde(default)]
    pub r#abstract: bool,
    #[serde(default)]
    pub open_type: bool,
    #[serde(default)]
    pub properties: Vec<CsdlProperty>,
    #[serde(default)]
    pub navigation_properties: Vec<CsdlNavigationProperty>,
}

/// Key property reference.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlPropertyRef {
    /// Property name or `/`-separated path into complex properties.
    pub name: String,
    /// Required when `name` is a path.
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlProperty {
    pub name: SimpleIdentifier,
    #[serde(rename = "Type")]
    pub ptype: TypeRef,
    pub nullable: Option<bool>,
    pub max_length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlNavigationProperty {
    pub name: SimpleIdentifier,
    #[serde(rename = "Type")]
    pub ptype: TypeRef,
    pub nullable: Option<bool>,
    pub partner: Option<String>,
    #[serde(default)]
    pub contains_target: bool,
}
