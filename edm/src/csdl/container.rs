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
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlEntityContainer {
    pub name: SimpleIdentifier,
    #[serde(default)]
    pub entity_sets: Vec<CsdlEntitySet>,
    #[serde(default)]
    pub singletons: Vec<CsdlSingleton>,
    #[serde(default)]
    pub action_imports: Vec<CsdlActionImport>,
    #[serde(default)]
    pub function_imports: Vec<CsdlFunctionImport>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlEntitySet {
    pub name: SimpleIdentifier,
    pub entity_type: FullQualifiedName,
    #[serde(default)]
    pub navigation_property_bindings: Vec<CsdlNavigationPropertyBinding>,
    pub include_in_service_document: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlSingleton {
    pub name: SimpleIdentifier,
    #[serde(rename = "Type")]
    pub stype: FullQualifiedName,
    #[serde(default)]
    pub navigation_property_bindings: Vec<CsdlNavigationPropertyBinding>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlNavigationPropertyBinding {
    pub path: String,
    pub target: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlActionImport {
    pub name: SimpleIdentifier,
    pub action: FullQualifiedName,
    pub entity_set: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlFunctionImport {
    pub name: SimpleIdentifier,
    pub function: FullQualifiedName,
    pub entity_set: Option<String>,
    pub include_in_service_document: Option<bool>,
}
