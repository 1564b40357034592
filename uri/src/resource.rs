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

//! Resource path segments.
//!
//! One [`UriResource`] per segment, in path order. Each node knows its
//! type and collection-ness; a key predicate makes a collection-typed
//! node single-valued.

use crate::expression::Expression;
use odata_edm::EdmAction;
use odata_edm::EdmActionImport;
use odata_edm::EdmEntitySet;
use odata_edm::EdmEntityType;
use odata_edm::EdmFunction;
use odata_edm::EdmFunctionImport;
use odata_edm::EdmNavigationProperty;
use odata_edm::EdmOperation as _;
use odata_edm::EdmPrimitiveTypeKind;
use odata_edm::EdmProperty;
use odata_edm::EdmSingleton;
use odata_edm::EdmType;
use odata_edm::PrimitiveValue;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UriResourceKind {
    EntitySet,
    Singleton,
    NavigationProperty,
    ComplexProperty,
    PrimitiveProperty,
    Value,
    Count,
    Ref,
    Action,
    Function,
    It,
    LambdaVariable,
    LambdaAll,
    LambdaAny,
}

/// Value of a key property or function parameter as written in the URI.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyValue {
    /// Literal text and its value checked against the declared type.
    Literal(String, PrimitiveValue),
    /// `@name`, resolved through the alias table of the request.
    Alias(String),
}

impl Display for KeyValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Literal(text, _) | Self::Alias(text) => f.write_str(text),
        }
    }
}

/// One key property value.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPredicate {
    /// Path of the key property (`PropertyComp/PropertyInt16`).
    pub name: String,
    /// Key alias used in the URI instead of the path.
    pub alias: Option<String>,
    pub value: KeyValue,
}

impl KeyPredicate {
    /// Name as it appears in the URI.
    #[must_use]
    pub fn uri_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// Function parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    /// Primitive parameters carry their checked value, other
    /// parameters (complex, collections) only the text.
    Literal(String, Option<PrimitiveValue>),
    Alias(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionParameter {
    pub name: String,
    pub value: ParameterValue,
}

impl Display for FunctionParameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.value {
            ParameterValue::Literal(text, _) | ParameterValue::Alias(text) => {
                write!(f, "{}={text}", self.name)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct UriResourceEntitySet {
    pub entity_set: Arc<EdmEntitySet>,
    pub entity_type: Arc<EdmEntityType>,
    pub keys: Vec<KeyPredicate>,
    pub type_filter_on_collection: Option<EdmType>,
    pub type_filter_on_entry: Option<EdmType>,
}

#[derive(Debug, Clone)]
pub struct UriResourceSingleton {
    pub singleton: Arc<EdmSingleton>,
    pub entity_type: Arc<EdmEntityType>,
    pub type_filter: Option<EdmType>,
}

#[derive(Debug, Clone)]
pub struct UriResourceNavigation {
    pub property: EdmNavigationProperty,
    pub target: Arc<EdmEntityType>,
    pub keys: Vec<KeyPredicate>,
    pub type_filter_on_collection: Option<EdmType>,
    pub type_filter_on_entry: Option<EdmType>,
}

/// Primitive or complex structural property. Only complex properties
/// carry type filters.
#[derive(Debug, Clone)]
pub struct UriResourceProperty {
    pub property: EdmProperty,
    pub property_type: EdmType,
    pub type_filter_on_collection: Option<EdmType>,
    pub type_filter_on_entry: Option<EdmType>,
}

#[derive(Debug, Clone)]
pub struct UriResourceFunction {
    pub function: Arc<EdmFunction>,
    /// Set when called through a function import.
    pub import: Option<Arc<EdmFunctionImport>>,
    pub parameters: Vec<FunctionParameter>,
    pub return_type: EdmType,
    pub keys: Vec<KeyPredicate>,
    pub type_filter_on_collection: Option<EdmType>,
    pub type_filter_on_entry: Option<EdmType>,
}

#[derive(Debug, Clone)]
pub struct UriResourceAction {
    pub action: Arc<EdmAction>,
    pub import: Option<Arc<EdmActionImport>>,
    pub return_type: Option<EdmType>,
}

/// `$it`: the instance the expression is evaluated on.
#[derive(Debug, Clone)]
pub struct UriResourceIt {
    pub it_type: EdmType,
    pub collection: bool,
}

#[derive(Debug, Clone)]
pub struct UriResourceLambdaVariable {
    pub variable: String,
    pub variable_type: EdmType,
}

/// `any(d:...)` or `all(d:...)`. `any()` has neither variable nor body.
#[derive(Debug, Clone)]
pub struct UriResourceLambda {
    pub variable: Option<String>,
    pub expression: Option<Box<Expression>>,
}

#[derive(Debug, Clone)]
pub enum UriResource {
    EntitySet(UriResourceEntitySet),
    Singleton(UriResourceSingleton),
    NavigationProperty(UriResourceNavigation),
    ComplexProperty(UriResourceProperty),
    PrimitiveProperty(UriResourceProperty),
    Value,
    Count,
    Ref,
    Action(UriResourceAction),
    Function(UriResourceFunction),
    It(UriResourceIt),
    LambdaVariable(UriResourceLambdaVariable),
    LambdaAll(UriResourceLambda),
    LambdaAny(UriResourceLambda),
}

fn filtered(
    declared: EdmType,
    on_collection: Option<&EdmType>,
    on_entry: Option<&EdmType>,
) -> EdmType {
    on_entry.or(on_collection).cloned().unwrap_or(declared)
}

impl UriResource {
    #[must_use]
    pub const fn kind(&self) -> UriResourceKind {
        match self {
            Self::EntitySet(_) => UriResourceKind::EntitySet,
            Self::Singleton(_) => UriResourceKind::Singleton,
            Self::NavigationProperty(_) => UriResourceKind::NavigationProperty,
            Self::ComplexProperty(_) => UriResourceKind::ComplexProperty,
            Self::PrimitiveProperty(_) => UriResourceKind::PrimitiveProperty,
            Self::Value => UriResourceKind::Value,
            Self::Count => UriResourceKind::Count,
            Self::Ref => UriResourceKind::Ref,
            Self::Action(_) => UriResourceKind::Action,
            Self::Function(_) => UriResourceKind::Function,
            Self::It(_) => UriResourceKind::It,
            Self::LambdaVariable(_) => UriResourceKind::LambdaVariable,
            Self::LambdaAll(_) => UriResourceKind::LambdaAll,
            Self::LambdaAny(_) => UriResourceKind::LambdaAny,
        }
    }

    /// Type of the segment, narrowed by its type filters. `$value` and
    /// `$ref` have no type of their own, `$count` is `Edm.Int32`.
    #[must_use]
    pub fn edm_type(&self) -> Option<EdmType> {
        match self {
            Self::EntitySet(r) => Some(filtered(
                EdmType::Entity(Arc::clone(&r.entity_type)),
                r.type_filter_on_collection.as_ref(),
                r.type_filter_on_entry.as_ref(),
            )),
            Self::Singleton(r) => Some(
                r.type_filter
                    .clone()
                    .unwrap_or_else(|| EdmType::Entity(Arc::clone(&r.entity_type))),
            ),
            Self::NavigationProperty(r) => Some(filtered(
                EdmType::Entity(Arc::clone(&r.target)),
                r.type_filter_on_collection.as_ref(),
                r.type_filter_on_entry.as_ref(),
            )),
            Self::ComplexProperty(r) | Self::PrimitiveProperty(r) => Some(filtered(
                r.property_type.clone(),
                r.type_filter_on_collection.as_ref(),
                r.type_filter_on_entry.as_ref(),
            )),
            Self::Function(r) => Some(filtered(
                r.return_type.clone(),
                r.type_filter_on_collection.as_ref(),
                r.type_filter_on_entry.as_ref(),
            )),
            Self::Action(r) => r.return_type.clone(),
            Self::It(r) => Some(r.it_type.clone()),
            Self::LambdaVariable(r) => Some(r.variable_type.clone()),
            Self::Count => Some(EdmType::Primitive(EdmPrimitiveTypeKind::Int32)),
            Self::LambdaAll(_) | Self::LambdaAny(_) => {
                Some(EdmType::Primitive(EdmPrimitiveTypeKind::Boolean))
            }
            Self::Value | Self::Ref => None,
        }
    }

    /// Key predicate first, then the declared collection-ness.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        match self {
            Self::EntitySet(r) => r.keys.is_empty(),
            Self::NavigationProperty(r) => r.keys.is_empty() && r.property.is_collection(),
            Self::ComplexProperty(r) | Self::PrimitiveProperty(r) => r.property.is_collection(),
            Self::Function(r) => {
                r.keys.is_empty()
                    && r.function
                        .return_type()
                        .is_some_and(|rt| rt.type_ref.is_collection())
            }
            Self::Action(r) => r
                .action
                .return_type()
                .is_some_and(|rt| rt.type_ref.is_collection()),
            Self::It(r) => r.collection,
            Self::Singleton(_)
            | Self::Value
            | Self::Count
            | Self::Ref
            | Self::LambdaVariable(_)
            | Self::LambdaAll(_)
            | Self::LambdaAny(_) => false,
        }
    }

    #[must_use]
    pub fn keys(&self) -> &[KeyPredicate] {
        match self {
            Self::EntitySet(r) => &r.keys,
            Self::NavigationProperty(r) => &r.keys,
            Self::Function(r) => &r.keys,
            _ => &[],
        }
    }

    /// Type filters as `(on collection, on entry)`.
    #[must_use]
    pub fn type_filters(&self) -> (Option<&EdmType>, Option<&EdmType>) {
        match self {
            Self::EntitySet(r) => (
                r.type_filter_on_collection.as_ref(),
                r.type_filter_on_entry.as_ref(),
            ),
            Self::NavigationProperty(r) => (
                r.type_filter_on_collection.as_ref(),
                r.type_filter_on_entry.as_ref(),
            ),
            Self::ComplexProperty(r) | Self::PrimitiveProperty(r) => (
                r.type_filter_on_collection.as_ref(),
                r.type_filter_on_entry.as_ref(),
            ),
            Self::Function(r) => (
                r.type_filter_on_collection.as_ref(),
                r.type_filter_on_entry.as_ref(),
            ),
            Self::Singleton(r) => (None, r.type_filter.as_ref()),
            _ => (None, None),
        }
    }

    /// Segment text without key predicates, parameters or casts.
    #[must_use]
    pub fn segment_value(&self) -> String {
        match self {
            Self::EntitySet(r) => r.entity_set.name.to_string(),
            Self::Singleton(r) => r.singleton.name.to_string(),
            Self::NavigationProperty(r) => r.property.name().into(),
            Self::ComplexProperty(r) | Self::PrimitiveProperty(r) => r.property.name().into(),
            Self::Value => "$value".into(),
            Self::Count => "$count".into(),
            Self::Ref => "$ref".into(),
            Self::Action(r) => r
                .import
                .as_ref()
                .map_or_else(|| r.action.name().to_string(), |i| i.name.to_string()),
            Self::Function(r) => r
                .import
                .as_ref()
                .map_or_else(|| r.function.name().to_string(), |i| i.name.to_string()),
            Self::It(_) => "$it".into(),
            Self::LambdaVariable(r) => r.variable.clone(),
            Self::LambdaAll(_) => "all".into(),
            Self::LambdaAny(_) => "any".into(),
        }
    }
}

fn write_keys(f: &mut Formatter<'_>, keys: &[KeyPredicate]) -> FmtResult {
    if keys.is_empty() {
        return Ok(());
    }
    f.write_str("(")?;
    if let [single] = keys {
        single.value.fmt(f)?;
    } else {
        for (i, key) in keys.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", key.uri_name(), key.value)?;
        }
    }
    f.write_str(")")
}

fn write_lambda(f: &mut Formatter<'_>, name: &str, lambda: &UriResourceLambda) -> FmtResult {
    match (&lambda.variable, &lambda.expression) {
        (Some(variable), Some(expression)) => write!(f, "{name}({variable}:{expression})"),
        _ => write!(f, "{name}()"),
    }
}

impl Display for UriResource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if let Self::LambdaAll(lambda) = self {
            return write_lambda(f, "all", lambda);
        }
        if let Self::LambdaAny(lambda) = self {
            return write_lambda(f, "any", lambda);
        }
        f.write_str(&self.segment_value())?;
        if let Self::Function(r) = self {
            f.write_str("(")?;
            for (i, parameter) in r.parameters.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                parameter.fmt(f)?;
            }
            f.write_str(")")?;
        }
        let (on_collection, on_entry) = self.type_filters();
        if let Some(t) = on_collection {
            write!(f, "/{}", t.fqn())?;
        }
        write_keys(f, self.keys())?;
        if let Some(t) = on_entry {
            write!(f, "/{}", t.fqn())?;
        }
        Ok(())
    }
}
