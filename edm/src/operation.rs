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

//! Actions, functions and the overload key they are looked up by.

use crate::names::FullQualifiedName;
use crate::names::SimpleIdentifier;
use crate::structured::EdmTypeRef;
use crate::structured::IsNullable;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

/// Type of the binding parameter of a bound operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingParameter {
    pub type_name: FullQualifiedName,
    pub is_collection: bool,
}

/// Overload key of an operation.
///
/// Unbound operations have no `binding`, so bound and unbound keys never
/// collide. Actions do not overload by parameters and have no
/// `parameter_names`. Function parameter names exclude the binding
/// parameter and are kept sorted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationKey {
    pub name: FullQualifiedName,
    pub binding: Option<BindingParameter>,
    pub parameter_names: Option<Vec<String>>,
}

impl OperationKey {
    #[must_use]
    pub const fn unbound_action(name: FullQualifiedName) -> Self {
        Self {
            name,
            binding: None,
            parameter_names: None,
        }
    }

    #[must_use]
    pub const fn bound_action(
        name: FullQualifiedName,
        type_name: FullQualifiedName,
        is_collection: bool,
    ) -> Self {
        Self {
            name,
            binding: Some(BindingParameter {
                type_name,
                is_collection,
            }),
            parameter_names: None,
        }
    }

    #[must_use]
    pub fn unbound_function<S: AsRef<str>>(name: FullQualifiedName, parameter_names: &[S]) -> Self {
        Self {
            name,
            binding: None,
            parameter_names: Some(sorted_names(parameter_names)),
        }
    }

    #[must_use]
    pub fn bound_function<S: AsRef<str>>(
        name: FullQualifiedName,
        type_name: FullQualifiedName,
        is_collection: bool,
        parameter_names: &[S],
    ) -> Self {
        Self {
            name,
            binding: Some(BindingParameter {
                type_name,
                is_collection,
            }),
            parameter_names: Some(sorted_names(parameter_names)),
        }
    }

    /// Same key bound to another type. Used to walk base types.
    #[must_use]
    pub fn rebind(&self, type_name: FullQualifiedName) -> Self {
        Self {
            name: self.name.clone(),
            binding: self.binding.as_ref().map(|b| BindingParameter {
                type_name,
                is_collection: b.is_collection,
            }),
            parameter_names: self.parameter_names.clone(),
        }
    }
}

fn sorted_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut names = names
        .iter()
        .map(|v| v.as_ref().to_string())
        .collect::<Vec<_>>();
    names.sort();
    names
}

impl Display for OperationKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        self.name.fmt(f)?;
        if let Some(binding) = &self.binding {
            if binding.is_collection {
                write!(f, " bound to Collection({})", binding.type_name)?;
            } else {
                write!(f, " bound to {}", binding.type_name)?;
            }
        }
        if let Some(names) = &self.parameter_names {
            write!(f, " with parameters [{}]", names.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct EdmParameter {
    pub name: SimpleIdentifier,
    pub type_ref: EdmTypeRef,
    pub nullable: IsNullable,
}

impl EdmParameter {
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

#[derive(Debug, Clone)]
pub struct EdmReturnType {
    pub type_ref: EdmTypeRef,
    pub nullable: IsNullable,
}

/// Common interface of actions and functions.
pub trait EdmOperation: Send + Sync {
    fn name(&self) -> &FullQualifiedName;

    fn is_bound(&self) -> bool;

    /// All parameters including the binding one.
    fn all_parameters(&self) -> &[EdmParameter];

    fn return_type(&self) -> Option<&EdmReturnType>;

    fn entity_set_path(&self) -> Option<&str>;

    fn overload_key(&self) -> OperationKey;

    /// First parameter of a bound operation.
    fn binding_parameter(&self) -> Option<&EdmParameter> {
        if self.is_bound() {
            self.all_parameters().first()
        } else {
            None
        }
    }

    /// Parameters supplied in the call syntax.
    fn parameters(&self) -> &[EdmParameter] {
        let all = self.all_parameters();
        if self.is_bound() && !all.is_empty() {
            &all[1..]
        } else {
            all
        }
    }

    fn parameter(&self, name: &str) -> Option<&EdmParameter> {
        self.parameters().iter().find(|p| p.name() == name)
    }
}

fn binding_key(
    operation: &dyn EdmOperation,
) -> Option<BindingParameter> {
    operation.binding_parameter().map(|p| BindingParameter {
        type_name: p.type_ref.name.clone(),
        is_collection: p.type_ref.is_collection(),
    })
}

/// Resolved action.
#[derive(Debug)]
pub struct EdmAction {
    pub(crate) name: FullQualifiedName,
    pub(crate) is_bound: bool,
    pub(crate) entity_set_path: Option<String>,
    pub(crate) parameters: Vec<EdmParameter>,
    pub(crate) return_type: Option<EdmReturnType>,
}

impl EdmOperation for EdmAction {
    fn name(&self) -> &FullQualifiedName {
        &self.name
    }

    fn is_bound(&self) -> bool {
        self.is_bound
    }

    fn all_parameters(&self) -> &[EdmParameter] {
        &self.parameters
    }

    fn return_type(&self) -> Option<&EdmReturnType> {
        self.return_type.as_ref()
    }

    fn entity_set_path(&self) -> Option<&str> {
        self.entity_set_path.as_deref()
    }

    fn overload_key(&self) -> OperationKey {
        OperationKey {
            name: self.name.clone(),
            binding: binding_key(self),
            parameter_names: None,
        }
    }
}

/// Resolved function.
#[derive(Debug)]
pub struct EdmFunction {
    pub(crate) name: FullQualifiedName,
    pub(crate) is_bound: bool,
    pub(crate) is_composable: bool,
    pub(crate) entity_set_path: Option<String>,
    pub(crate) parameters: Vec<EdmParameter>,
    pub(crate) return_type: EdmReturnType,
}

impl EdmFunction {
    /// Composable functions may be followed by further path segments.
    #[must_use]
    pub fn is_composable(&self) -> bool {
        self.is_composable
    }
}

impl EdmOperation for EdmFunction {
    fn name(&self) -> &FullQualifiedName {
        &self.name
    }

    fn is_bound(&self) -> bool {
        self.is_bound
    }

    fn all_parameters(&self) -> &[EdmParameter] {
        &self.parameters
    }

    fn return_type(&self) -> Option<&EdmReturnType> {
        Some(&self.return_type)
    }

    fn entity_set_path(&self) -> Option<&str> {
        self.entity_set_path.as_deref()
    }

    fn overload_key(&self) -> OperationKey {
        OperationKey {
            name: self.name.clone(),
            binding: binding_key(self),
            parameter_names: Some(sorted_names(
                &self
                    .parameters()
                    .iter()
                    .map(EdmParameter::name)
                    .collect::<Vec<_>>(),
            )),
        }
    }
}
