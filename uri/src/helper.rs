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

//! Canonical URLs, key predicates, entity ids and context URLs.

use crate::error::DeserializerError;
use crate::parser::Parser;
use crate::query_option::ExpandItem;
use crate::query_option::SelectItem;
use crate::resource::UriResource;
use crate::resource::UriResourceEntitySet;
use odata_edm::Edm;
use odata_edm::EdmEntitySet;
use odata_edm::EdmEntityType;
use odata_edm::EdmSingleton;
use odata_edm::EdmStructuredType;
use odata_edm::Error as EdmError;
use odata_edm::FullQualifiedName;
use odata_edm::PrimitiveValue;
use percent_encoding::utf8_percent_encode;
use percent_encoding::AsciiSet;
use percent_encoding::CONTROLS;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use tracing::debug;
use url::Url;

/// Everything outside RFC 3986 `pchar` plus the sub-delimiters used
/// by key predicates.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

fn encode(text: &str) -> String {
    utf8_percent_encode(text, SEGMENT).to_string()
}

/// Key values of one entity by key property name (alias or path).
pub type EntityKey = BTreeMap<String, PrimitiveValue>;

#[derive(Debug)]
pub enum HelperError {
    /// No value for the named key property.
    MissingKeyProperty(String),
    /// Entity type of an entity set could not be resolved.
    Edm(EdmError),
    /// Context URL parts that cannot be combined.
    InvalidContextUrl(&'static str),
}

impl Display for HelperError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::MissingKeyProperty(name) => write!(f, "missing value for key property {name}"),
            Self::Edm(err) => write!(f, "edm error: {err}"),
            Self::InvalidContextUrl(reason) => write!(f, "invalid context URL: {reason}"),
        }
    }
}

impl StdError for HelperError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Edm(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EdmError> for HelperError {
    fn from(err: EdmError) -> Self {
        Self::Edm(err)
    }
}

/// URI helper bound to a type directory.
pub struct UriHelper<'a> {
    edm: &'a Edm,
}

impl<'a> UriHelper<'a> {
    #[must_use]
    pub const fn new(edm: &'a Edm) -> Self {
        Self { edm }
    }

    /// Canonical URL of an entity relative to the service root:
    /// `EntitySet(keys)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity type of the set cannot be
    /// resolved or a key value is missing.
    pub fn build_canonical_url(
        &self,
        entity_set: &EdmEntitySet,
        key: &EntityKey,
    ) -> Result<String, HelperError> {
        let entity_type = self
            .edm
            .entity_type(&entity_set.entity_type)?
            .ok_or_else(|| EdmError::UnresolvedType(entity_set.entity_type.clone()))?;
        Ok(format!(
            "{}({})",
            encode(entity_set.name.as_str()),
            Self::build_key_predicate(&entity_type, key)?
        ))
    }

    /// Key predicate without parentheses. A single key is rendered as
    /// its bare value, composite keys as `name=value` pairs in declared
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`HelperError::MissingKeyProperty`] if `key` has no value
    /// for a declared key property.
    pub fn build_key_predicate(
        entity_type: &EdmEntityType,
        key: &EntityKey,
    ) -> Result<String, HelperError> {
        let keys = entity_type.key_properties();
        let named = keys.len() > 1;
        keys.iter()
            .map(|k| {
                let value = key
                    .get(&k.name)
                    .ok_or_else(|| HelperError::MissingKeyProperty(k.name.clone()))?;
                let value = encode(&value.to_uri_literal());
                Ok(if named {
                    format!("{}={value}", encode(&k.name))
                } else {
                    value
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|parts| parts.join(","))
    }

    /// Resolve an entity id (absolute or relative to `service_root`)
    /// to the entity set resource it addresses.
    ///
    /// # Errors
    ///
    /// `INVALID_ENTITY_BINDING_LINK` if the id does not parse or
    /// addresses anything but a single entity set segment. Parser
    /// errors are kept as the source.
    pub fn parse_entity_id(
        &self,
        entity_id: &str,
        service_root: Option<&str>,
    ) -> Result<UriResourceEntitySet, DeserializerError> {
        let path = service_root
            .and_then(|root| entity_id.strip_prefix(root))
            .unwrap_or(entity_id);
        let info = Parser::new(self.edm)
            .parse_uri(&format!("/{}", path.trim_start_matches('/')), None, None)
            .map_err(|err| {
                debug!(entity_id, %err, "entity id does not parse");
                DeserializerError::invalid_entity_binding_link(entity_id, Some(err))
            })?;
        match <[UriResource; 1]>::try_from(info.resources) {
            Ok([UriResource::EntitySet(entity_set)]) => Ok(entity_set),
            _ => Err(DeserializerError::invalid_entity_binding_link(
                entity_id, None,
            )),
        }
    }

    /// Select list of a context URL: selected properties followed by
    /// expanded navigation properties with their nested lists. Empty
    /// when everything is selected and nothing is expanded.
    #[must_use]
    pub fn build_context_url_select_list(
        ty: &dyn EdmStructuredType,
        expand: Option<&[ExpandItem]>,
        select: Option<&[SelectItem]>,
    ) -> String {
        let mut parts = Vec::new();
        if let Some(select) = select.filter(|s| !s.iter().any(|i| i.is_star)) {
            parts.extend(select.iter().map(|item| select_item(ty, item)));
        }
        if let Some(expand) = expand.filter(|e| !e.iter().any(|i| i.is_star)) {
            parts.extend(
                expand
                    .iter()
                    .filter(|item| !item.is_ref && !item.is_count)
                    .map(expand_item),
            );
        }
        parts.join(",")
    }
}

fn select_item(ty: &dyn EdmStructuredType, item: &SelectItem) -> String {
    if let Some(namespace) = &item.all_operations_in_schema {
        return format!("{namespace}.*");
    }
    item.type_filter
        .iter()
        .map(odata_edm::EdmType::fqn)
        .filter(|cast| cast != ty.name())
        .map(|cast| cast.to_string())
        .chain(item.path.iter().map(UriResource::segment_value))
        .collect::<Vec<_>>()
        .join("/")
}

fn expand_item(item: &ExpandItem) -> String {
    let path = item
        .path
        .iter()
        .map(UriResource::segment_value)
        .collect::<Vec<_>>()
        .join("/");
    let target = item.path.last().and_then(UriResource::edm_type);
    let nested = target
        .as_ref()
        .and_then(|t| t.as_structured())
        .map(|t| {
            UriHelper::build_context_url_select_list(
                t,
                item.options.expand.as_deref(),
                item.options.select.as_deref(),
            )
        })
        .unwrap_or_default();
    format!("{path}({nested})")
}

/// Suffix of a context URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suffix {
    Entity,
    Reference,
    Delta,
    DeletedEntity,
    Link,
    DeletedLink,
}

impl Suffix {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entity => "$entity",
            Self::Reference => "$ref",
            Self::Delta => "$delta",
            Self::DeletedEntity => "$deletedEntity",
            Self::Link => "$link",
            Self::DeletedLink => "$deletedLink",
        }
    }
}

impl Display for Suffix {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Builder of `$metadata#...` context URLs.
#[derive(Debug, Clone, Default)]
pub struct ContextUrl {
    service_root: Option<Url>,
    entity_set_or_singleton_or_type: Option<String>,
    derived_entity: Option<FullQualifiedName>,
    key_path: Option<String>,
    navigation_or_property_path: Option<String>,
    select_list: Option<String>,
    suffix: Option<Suffix>,
    as_collection: bool,
}

impl ContextUrl {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn service_root(mut self, root: Url) -> Self {
        self.service_root = Some(root);
        self
    }

    #[must_use]
    pub fn entity_set(mut self, entity_set: &EdmEntitySet) -> Self {
        self.entity_set_or_singleton_or_type = Some(entity_set.name.to_string());
        self
    }

    #[must_use]
    pub fn singleton(mut self, singleton: &EdmSingleton) -> Self {
        self.entity_set_or_singleton_or_type = Some(singleton.name.to_string());
        self
    }

    /// Type of a response without entity set, such as a function
    /// result.
    #[must_use]
    pub fn type_name(mut self, name: &FullQualifiedName) -> Self {
        self.entity_set_or_singleton_or_type = Some(name.to_string());
        self
    }

    #[must_use]
    pub fn derived_entity(mut self, name: &FullQualifiedName) -> Self {
        self.derived_entity = Some(name.clone());
        self
    }

    /// Key predicate, as built by [`UriHelper::build_key_predicate`].
    #[must_use]
    pub fn key_path(mut self, key_path: impl Into<String>) -> Self {
        self.key_path = Some(key_path.into());
        self
    }

    #[must_use]
    pub fn navigation_or_property_path(mut self, path: impl Into<String>) -> Self {
        self.navigation_or_property_path = Some(path.into());
        self
    }

    /// Select list, as built by
    /// [`UriHelper::build_context_url_select_list`]. Empty lists are
    /// ignored.
    #[must_use]
    pub fn select_list(mut self, select_list: impl Into<String>) -> Self {
        self.select_list = Some(select_list.into()).filter(|s| !s.is_empty());
        self
    }

    #[must_use]
    pub const fn suffix(mut self, suffix: Suffix) -> Self {
        self.suffix = Some(suffix);
        self
    }

    #[must_use]
    pub const fn as_collection(mut self) -> Self {
        self.as_collection = true;
        self
    }

    /// Render the context URL.
    ///
    /// # Errors
    ///
    /// Returns [`HelperError::InvalidContextUrl`] for a derived type or
    /// a suffix without entity set, or for `$ref` combined with one.
    pub fn build(&self) -> Result<String, HelperError> {
        let mut result = self
            .service_root
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        result.push_str("$metadata");
        let name = self.entity_set_or_singleton_or_type.as_deref();
        if let Some(name) = name {
            result.push('#');
            if self.as_collection {
                result.push_str(&format!("Collection({})", encode(name)));
            } else {
                result.push_str(&encode(name));
            }
        }
        if let Some(derived) = &self.derived_entity {
            if name.is_none() {
                return Err(HelperError::InvalidContextUrl(
                    "derived type without entity set",
                ));
            }
            result.push('/');
            result.push_str(&encode(&derived.to_string()));
        }
        if let Some(key_path) = &self.key_path {
            result.push_str(&format!("({key_path})"));
        }
        if let Some(path) = &self.navigation_or_property_path {
            result.push('/');
            result.push_str(path);
        }
        if let Some(select_list) = &self.select_list {
            result.push_str(&format!("({select_list})"));
        }
        match (self.suffix, name) {
            (None, _) => {}
            (Some(Suffix::Reference), None) => result.push_str("#$ref"),
            (Some(Suffix::Reference), Some(_)) => {
                return Err(HelperError::InvalidContextUrl(
                    "reference with entity set",
                ))
            }
            (Some(_), None) => {
                return Err(HelperError::InvalidContextUrl("suffix without entity set"))
            }
            (Some(suffix), Some(_)) => {
                result.push('/');
                result.push_str(suffix.as_str());
            }
        }
        Ok(result)
    }
}
