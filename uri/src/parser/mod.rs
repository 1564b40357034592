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

//! URI parser.
//!
//! Resolves a raw path and query string against an [`Edm`] into a
//! [`UriInfo`]. The path is resolved left to right, each segment
//! relative to the type of the previous one. Query options are then
//! parsed against the type addressed by the path.

mod expression;
mod options;
mod path;

use crate::config::ParserConfig;
use crate::error::ParserError;
use crate::error::SemanticError;
use crate::error::SemanticMessageKey;
use crate::error::SyntaxError;
use crate::error::SyntaxMessageKey;
use crate::info::UriInfo;
use crate::info::UriInfoKind;
use crate::lexer::percent_decode;
use crate::lexer::split_top_level;
use crate::lexer::tokenize;
use crate::lexer::Token;
use crate::lexer::TokenKind;
use crate::query_option::CustomQueryOption;
use crate::query_option::SystemQueryOptionKind;
use crate::resource::KeyPredicate;
use crate::resource::KeyValue;
use crate::resource::UriResource;
use crate::resource::UriResourceEntitySet;
use crate::resource::UriResourceFunction;
use crate::resource::UriResourceNavigation;
use crate::resource::UriResourceProperty;
use odata_edm::Edm;
use odata_edm::EdmEntityType;
use odata_edm::EdmKeyProperty;
use odata_edm::EdmPrimitiveTypeKind;
use odata_edm::EdmStructuredType;
use odata_edm::EdmType;
use odata_edm::Error as EdmError;
use odata_edm::FullQualifiedName;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use tracing::trace;

/// Parser bound to one [`Edm`]. Cheap to create per request.
#[derive(Debug, Clone)]
pub struct Parser<'a> {
    edm: &'a Edm,
    config: ParserConfig,
}

/// Query string split by key kind, still unparsed.
#[derive(Debug, Default)]
struct QueryParts {
    system: Vec<(SystemQueryOptionKind, String)>,
    aliases: BTreeMap<String, String>,
    custom: Vec<CustomQueryOption>,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(edm: &'a Edm) -> Self {
        Self {
            edm,
            config: ParserConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Parse a request URI.
    ///
    /// `path` is relative to the service root and still percent-encoded,
    /// `query` is the raw query string without `?`.
    ///
    /// # Errors
    ///
    /// - `ParserError::Syntax` if the text does not match the grammar
    /// - `ParserError::Semantic` if it cannot be resolved against the model
    /// - `ParserError::Edm` on schema defects met while resolving.
    pub fn parse_uri(
        &self,
        path: &str,
        query: Option<&str>,
        fragment: Option<&str>,
    ) -> Result<UriInfo, ParserError> {
        let query = self.split_query(query.unwrap_or_default())?;
        let segments = split_top_level(path.trim_start_matches('/'), '/')
            .into_iter()
            .map(percent_decode)
            .collect::<Result<Vec<_>, _>>()?;
        let mut info = self.parse_path(&segments, &query.aliases)?;
        info.fragment = fragment.map(Into::into);
        info.options = self.parse_system_options(&info, query.system, &query.aliases)?;
        if info.kind == UriInfoKind::EntityId && info.options.id.is_none() {
            return Err(SyntaxError::new(
                SyntaxMessageKey::WrongValueForSystemQueryOption,
                &[SystemQueryOptionKind::Id.name(), ""],
            )
            .into());
        }
        info.aliases = query.aliases;
        info.custom_options = query.custom;
        trace!(kind = ?info.kind, resources = info.resources.len(), "parsed uri");
        Ok(info)
    }

    fn system_option_kind(&self, key: &str) -> Result<Option<SystemQueryOptionKind>, SyntaxError> {
        let case_insensitive = self.config.case_insensitive_system_options;
        if key.starts_with('$') {
            return SystemQueryOptionKind::from_name(key, case_insensitive)
                .map(Some)
                .ok_or_else(|| {
                    SyntaxError::new(SyntaxMessageKey::UnknownSystemQueryOption, &[key])
                });
        }
        if self.config.allow_missing_dollar {
            return Ok(SystemQueryOptionKind::from_name(
                &format!("${key}"),
                case_insensitive,
            ));
        }
        Ok(None)
    }

    fn split_query(&self, query: &str) -> Result<QueryParts, ParserError> {
        query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .try_fold(QueryParts::default(), |mut parts, pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                let key = percent_decode(key)?;
                let value = percent_decode(value)?;
                if key.starts_with('@') {
                    if parts.aliases.contains_key(&key) {
                        return Err(
                            SyntaxError::new(SyntaxMessageKey::DuplicatedAlias, &[&key]).into()
                        );
                    }
                    parts.aliases.insert(key, value);
                } else if let Some(kind) = self.system_option_kind(&key)? {
                    if kind == SystemQueryOptionKind::Levels {
                        return Err(SyntaxError::new(
                            SyntaxMessageKey::SystemQueryOptionLevelsNotAllowedHere,
                            &[&key],
                        )
                        .into());
                    }
                    if parts.system.iter().any(|(k, _)| *k == kind) {
                        return Err(SyntaxError::new(
                            SyntaxMessageKey::DoubleSystemQueryOption,
                            &[kind.name()],
                        )
                        .into());
                    }
                    parts.system.push((kind, value));
                } else {
                    parts.custom.push(CustomQueryOption {
                        name: key,
                        text: value,
                    });
                }
                Ok(parts)
            })
    }
}

/// Semantic failure, logged with its parameters.
pub(crate) fn semantic(key: SemanticMessageKey, params: &[&str]) -> ParserError {
    debug!(%key, ?params, "cannot resolve uri");
    SemanticError::new(key, params).into()
}

pub(crate) fn syntax(text: &str) -> ParserError {
    SyntaxError::new(SyntaxMessageKey::Syntax, &[text]).into()
}

/// Cursor over the tokens of one segment or option value.
pub(crate) struct Tokens<'t> {
    source: &'t str,
    tokens: Vec<Token<'t>>,
    pos: usize,
}

impl<'t> Tokens<'t> {
    pub(crate) fn new(source: &'t str) -> Result<Self, SyntaxError> {
        Ok(Self {
            source,
            tokens: tokenize(source)?,
            pos: 0,
        })
    }

    pub(crate) fn peek_at(&self, n: usize) -> Token<'t> {
        let last = self.tokens.len() - 1;
        self.tokens[(self.pos + n).min(last)]
    }

    pub(crate) fn peek(&self) -> Token<'t> {
        self.peek_at(0)
    }

    pub(crate) fn next(&mut self) -> Token<'t> {
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Token<'t>, ParserError> {
        let token = self.peek();
        if token.kind == kind {
            Ok(self.next())
        } else {
            Err(self.syntax())
        }
    }

    pub(crate) fn at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(crate) fn finish(&self) -> Result<(), ParserError> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.syntax())
        }
    }

    pub(crate) fn syntax(&self) -> ParserError {
        syntax(self.source)
    }
}

fn parse_name(text: &str) -> Result<FullQualifiedName, ParserError> {
    text.parse().map_err(|_| syntax(text))
}

fn entity_type_of(edm: &Edm, name: &FullQualifiedName) -> Result<Arc<EdmEntityType>, ParserError> {
    edm.entity_type(name)?
        .ok_or_else(|| EdmError::UnresolvedType(name.clone()).into())
}

fn type_of(edm: &Edm, name: &FullQualifiedName) -> Result<EdmType, ParserError> {
    edm.resolve_type(name)?
        .ok_or_else(|| EdmError::UnresolvedType(name.clone()).into())
}

fn key_kind(edm: &Edm, key: &EdmKeyProperty) -> Result<EdmPrimitiveTypeKind, ParserError> {
    if let Some(kind) = key.kind() {
        return Ok(kind);
    }
    let name = &key.property.type_ref.name;
    type_of(edm, name)?
        .as_primitive()
        .ok_or_else(|| EdmError::UnresolvedType(name.clone()).into())
}

/// Structural or navigation property of `owner` as a resource, `None`
/// if `owner` has no such property.
fn property_resource(
    edm: &Edm,
    owner: &dyn EdmStructuredType,
    name: &str,
) -> Result<Option<UriResource>, ParserError> {
    if let Some(property) = owner.property(name) {
        let property_type = type_of(edm, &property.type_ref.name)?;
        let resource = UriResourceProperty {
            property: property.clone(),
            property_type,
            type_filter_on_collection: None,
            type_filter_on_entry: None,
        };
        return Ok(Some(
            if matches!(resource.property_type, EdmType::Complex(_)) {
                UriResource::ComplexProperty(resource)
            } else {
                UriResource::PrimitiveProperty(resource)
            },
        ));
    }
    if let Some(property) = owner.navigation_property(name) {
        let target = entity_type_of(edm, &property.target)?;
        return Ok(Some(UriResource::NavigationProperty(UriResourceNavigation {
            property: property.clone(),
            target,
            keys: Vec::new(),
            type_filter_on_collection: None,
            type_filter_on_entry: None,
        })));
    }
    Ok(None)
}

/// Narrow `resource` by a type cast. A cast on a collection without key
/// filters the collection, any other cast filters the entry.
fn set_type_filter(resource: &mut UriResource, cast: EdmType) -> Result<(), ParserError> {
    let segment = resource.segment_value();
    let current = resource
        .edm_type()
        .ok_or_else(|| semantic(SemanticMessageKey::OnlyForTypedParts, &[&segment]))?;
    let Some(current) = current.as_structured() else {
        return Err(semantic(
            SemanticMessageKey::OnlyForStructuralTypes,
            &[&segment],
        ));
    };
    let cast_name = cast.fqn().to_string();
    if !cast
        .as_structured()
        .is_some_and(|c| c.is_entity_type() == current.is_entity_type() && c.is_compatible_with(current.name()))
    {
        return Err(semantic(
            SemanticMessageKey::IncompatibleTypeFilter,
            &[&cast_name, &current.name().to_string()],
        ));
    }
    let collection = resource.is_collection();
    let slot = match resource {
        UriResource::Singleton(r) => &mut r.type_filter,
        UriResource::EntitySet(UriResourceEntitySet {
            type_filter_on_collection: on_collection,
            type_filter_on_entry: on_entry,
            ..
        })
        | UriResource::NavigationProperty(UriResourceNavigation {
            type_filter_on_collection: on_collection,
            type_filter_on_entry: on_entry,
            ..
        })
        | UriResource::ComplexProperty(UriResourceProperty {
            type_filter_on_collection: on_collection,
            type_filter_on_entry: on_entry,
            ..
        })
        | UriResource::Function(UriResourceFunction {
            type_filter_on_collection: on_collection,
            type_filter_on_entry: on_entry,
            ..
        }) => {
            if collection {
                on_collection
            } else {
                on_entry
            }
        }
        _ => {
            return Err(semantic(
                SemanticMessageKey::OnlyForStructuralTypes,
                &[&segment],
            ))
        }
    };
    if slot.is_some() {
        return Err(semantic(
            SemanticMessageKey::TypeFilterNotChainable,
            &[&cast_name],
        ));
    }
    *slot = Some(cast);
    Ok(())
}

fn keys_mut(resource: &mut UriResource) -> Option<&mut Vec<KeyPredicate>> {
    match resource {
        UriResource::EntitySet(r) => Some(&mut r.keys),
        UriResource::NavigationProperty(r) => Some(&mut r.keys),
        UriResource::Function(r) => Some(&mut r.keys),
        _ => None,
    }
}

fn key_path(key: &EdmKeyProperty) -> String {
    key.path
        .iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join("/")
}

fn key_value(
    edm: &Edm,
    key: &EdmKeyProperty,
    token: Token<'_>,
    aliases: &BTreeMap<String, String>,
) -> Result<KeyPredicate, ParserError> {
    let name = key_path(key);
    let alias = (key.name != name).then(|| key.name.clone());
    let kind = key_kind(edm, key)?;
    let invalid = |text: &str| semantic(SemanticMessageKey::InvalidKeyProperty, &[&key.name, text]);
    let value = match token.kind {
        TokenKind::Alias => {
            let text = aliases
                .get(token.text)
                .ok_or_else(|| semantic(SemanticMessageKey::UnknownAlias, &[token.text]))?;
            match kind.validate_literal(text) {
                Ok(v) if !v.is_null() => KeyValue::Alias(token.text.into()),
                _ => return Err(invalid(text)),
            }
        }
        TokenKind::Literal | TokenKind::EnumLiteral => match kind.validate_literal(token.text) {
            Ok(v) if !v.is_null() => KeyValue::Literal(token.text.into(), v),
            _ => return Err(invalid(token.text)),
        },
        _ => return Err(syntax(token.text)),
    };
    Ok(KeyPredicate { name, alias, value })
}

/// Parse `(value)` or `(name=value,...)` for `entity_type`.
fn key_predicate(
    edm: &Edm,
    tokens: &mut Tokens<'_>,
    entity_type: &EdmEntityType,
    aliases: &BTreeMap<String, String>,
) -> Result<Vec<KeyPredicate>, ParserError> {
    tokens.expect(TokenKind::OpenParen)?;
    let keys = entity_type.key_properties();
    let type_name = entity_type.name().to_string();
    let wrong_number =
        || semantic(SemanticMessageKey::WrongNumberOfKeyProperties, &[&type_name]);
    if tokens.peek().kind == TokenKind::CloseParen {
        return Err(wrong_number());
    }
    let named = tokens.peek().kind == TokenKind::Identifier
        && tokens.peek_at(1).kind == TokenKind::Equals;
    let mut predicates = Vec::with_capacity(keys.len());
    if named {
        loop {
            let name = tokens.expect(TokenKind::Identifier)?;
            tokens.expect(TokenKind::Equals)?;
            let key = keys
                .iter()
                .find(|k| k.name == name.text || key_path(k) == name.text)
                .ok_or_else(|| {
                    semantic(SemanticMessageKey::InvalidKeyProperty, &[name.text])
                })?;
            if predicates.iter().any(|p: &KeyPredicate| p.name == key_path(key)) {
                return Err(semantic(SemanticMessageKey::DoubleKeyProperty, &[name.text]));
            }
            predicates.push(key_value(edm, key, tokens.next(), aliases)?);
            if !tokens.eat(TokenKind::Comma) {
                break;
            }
        }
        if let Some(missing) = keys
            .iter()
            .find(|k| !predicates.iter().any(|p| p.name == key_path(k)))
        {
            return Err(semantic(
                SemanticMessageKey::InvalidKeyProperty,
                &[&missing.name],
            ));
        }
        predicates.sort_by_key(|p| keys.iter().position(|k| key_path(k) == p.name));
    } else {
        let [key] = keys else {
            return Err(wrong_number());
        };
        predicates.push(key_value(edm, key, tokens.next(), aliases)?);
    }
    tokens.expect(TokenKind::CloseParen)?;
    Ok(predicates)
}
