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

use crate::names::SimpleIdentifier;
use crate::names::TypeRef;
use serde::Deserialize;

/// Action. Bound actions take the binding parameter first.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlAction {
    pub name: SimpleIdentifier,
    #[serde(default)]
    pub is_bound: bool,
    pub entity_set_path: Option<String>,
    #[serde(default)]
    pub parameters: Vec<CsdlParameter>,
    pub return_type: Option<CsdlReturnType>,
}

/// Function. Bound functions take the binding parameter first.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlFunction {
    pub name: SimpleIdentifier,
    #[serde(default)]
    pub is_bound: bool,
    #[serde(default)]
    pub is_composable: bool,
    pub entity_set_path: Option<String>,
    #[serde(default)]
    pub parameters: Vec<CsdlParameter>,
    pub return_type: CsdlReturnType,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlParameter {
    pub name: SimpleIdentifier,
    #[serde(rename = "Type")]
    pub ptype: TypeRef,
    pub nullable: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsdlReturnType {
    #[serde(rename = "Type")]
    pub rtype: TypeRef,
    pub nullable: Option<bool>,
}
