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

//! System query options.

use super::expression::ExpressionParser;
use super::parse_name;
use super::property_resource;
use super::semantic;
use super::set_type_filter;
use super::syntax;
use super::Parser;
use super::Tokens;
use crate::error::ParserError;
use crate::error::SemanticMessageKey;
use crate::error::SyntaxError;
use crate::error::SyntaxMessageKey;
use crate::expression::is_boolean;
use crate::expression::Expression;
use crate::info::UriInfo;
use crate::info::UriInfoKind;
use crate::lexer::split_top_level;
use crate::lexer::TokenKind;
use crate::query_option::parse_count;
use crate::query_option::parse_non_negative;
use crate::query_option::ExpandItem;
use crate::query_option::Levels;
use crate::query_option::OrderByItem;
use crate::query_option::QueryOptions;
use crate::query_option::SelectItem;
use crate::query_option::SystemQueryOptionKind;
use crate::resource::UriResource;
use crate::resource::UriResourceAction;
use crate::resource::UriResourceFunction;
use crate::resource::UriResourceKind;
use crate::search::SearchExpression;
use odata_edm::EdmOperation;
use odata_edm::EdmType;
use std::collections::BTreeMap;

/// Names visible to expressions besides `$it`.
#[derive(Clone, Copy)]
struct Scope<'s> {
    crossjoin: &'s [String],
    aliases: &'s BTreeMap<String, String>,
}

/// Type the options of `info` apply to.
fn option_target(info: &UriInfo) -> Option<EdmType> {
    match info.kind {
        UriInfoKind::Resource => info
            .resources
            .iter()
            .rev()
            .find(|r| {
                !matches!(
                    r.kind(),
                    UriResourceKind::Count | UriResourceKind::Ref | UriResourceKind::Value
                )
            })
            .and_then(UriResource::edm_type),
        UriInfoKind::All | UriInfoKind::EntityId => {
            info.entity_type_cast.clone().map(EdmType::Entity)
        }
        _ => None,
    }
}

/// Split `Nav(options)` into `Nav` and `options`.
fn split_nested(item: &str) -> Result<(&str, Option<&str>), ParserError> {
    match item.find('(') {
        None => Ok((item, None)),
        Some(open) if item.ends_with(')') => Ok((&item[..open], Some(&item[open + 1..item.len() - 1]))),
        Some(_) => Err(syntax(item)),
    }
}

impl Parser<'_> {
    pub(super) fn parse_system_options(
        &self,
        info: &UriInfo,
        system: Vec<(SystemQueryOptionKind, String)>,
        aliases: &BTreeMap<String, String>,
    ) -> Result<QueryOptions, ParserError> {
        let target = option_target(info);
        let scope = Scope {
            crossjoin: &info.crossjoin_entity_sets,
            aliases,
        };
        let mut options = QueryOptions::default();
        for (kind, text) in &system {
            self.parse_option(&mut options, *kind, text, target.as_ref(), scope, 0)?;
        }
        Ok(options)
    }

    fn parse_option(
        &self,
        options: &mut QueryOptions,
        kind: SystemQueryOptionKind,
        text: &str,
        target: Option<&EdmType>,
        scope: Scope<'_>,
        depth: usize,
    ) -> Result<(), ParserError> {
        options.claim(kind, text)?;
        match kind {
            SystemQueryOptionKind::Filter => options.filter = Some(self.filter(text, target, scope)?),
            SystemQueryOptionKind::OrderBy => {
                options.orderby = Some(self.orderby(text, target, scope)?);
            }
            SystemQueryOptionKind::Select => options.select = Some(self.select(text, target)?),
            SystemQueryOptionKind::Expand => {
                options.expand = Some(self.expand(text, target, scope, depth)?);
            }
            SystemQueryOptionKind::Top => options.top = Some(parse_non_negative(kind, text)?),
            SystemQueryOptionKind::Skip => options.skip = Some(parse_non_negative(kind, text)?),
            SystemQueryOptionKind::Count => options.count = Some(parse_count(text)?),
            SystemQueryOptionKind::Search => {
                options.search = Some(SearchExpression::parse_nested(
                    text,
                    self.config.max_nesting_depth,
                )?);
            }
            SystemQueryOptionKind::Format => options.format = Some(text.parse()?),
            SystemQueryOptionKind::Id | SystemQueryOptionKind::SkipToken => {
                if text.is_empty() {
                    return Err(SyntaxError::new(
                        SyntaxMessageKey::WrongValueForSystemQueryOption,
                        &[kind.name(), text],
                    )
                    .into());
                }
                if kind == SystemQueryOptionKind::Id {
                    options.id = Some(text.into());
                } else {
                    options.skiptoken = Some(text.into());
                }
            }
            SystemQueryOptionKind::Levels => {
                options.levels = Some(Levels::parse(text, self.config.max_levels)?);
            }
        }
        Ok(())
    }

    fn filter(
        &self,
        text: &str,
        target: Option<&EdmType>,
        scope: Scope<'_>,
    ) -> Result<Expression, ParserError> {
        let mut parser = ExpressionParser::new(self, text, target.cloned(), scope.crossjoin, scope.aliases)?;
        let expression = parser.parse()?;
        parser.tokens.finish()?;
        if let Some(ty) = expression.ty().filter(|t| !is_boolean(t)) {
            return Err(semantic(
                SemanticMessageKey::TypeMismatch,
                &["$filter", &ty.to_string()],
            ));
        }
        Ok(expression)
    }

    fn orderby(
        &self,
        text: &str,
        target: Option<&EdmType>,
        scope: Scope<'_>,
    ) -> Result<Vec<OrderByItem>, ParserError> {
        split_top_level(text, ',')
            .into_iter()
            .map(|item| {
                let mut parser =
                    ExpressionParser::new(self, item, target.cloned(), scope.crossjoin, scope.aliases)?;
                let expression = parser.parse()?;
                let direction = parser.tokens.peek();
                let descending = direction.is_word("desc");
                if descending || direction.is_word("asc") {
                    parser.tokens.next();
                }
                parser.tokens.finish()?;
                Ok(OrderByItem {
                    expression,
                    descending,
                })
            })
            .collect()
    }

    fn select(&self, text: &str, target: Option<&EdmType>) -> Result<Vec<SelectItem>, ParserError> {
        split_top_level(text, ',')
            .into_iter()
            .map(|item| {
                let item = item.trim();
                let mut select = SelectItem {
                    path: Vec::new(),
                    is_star: false,
                    all_operations_in_schema: None,
                    type_filter: None,
                };
                if item == "*" {
                    select.is_star = true;
                } else if let Some(namespace) = item.strip_suffix(".*") {
                    select.all_operations_in_schema =
                        Some(namespace.parse().map_err(|_| syntax(item))?);
                } else {
                    let target = target.ok_or_else(|| {
                        semantic(SemanticMessageKey::OnlyForTypedParts, &["$select"])
                    })?;
                    let segments = item.split('/').collect::<Vec<_>>();
                    (select.path, select.type_filter) = self.property_path(&segments, target)?;
                }
                Ok(select)
            })
            .collect()
    }

    fn expand(
        &self,
        text: &str,
        target: Option<&EdmType>,
        scope: Scope<'_>,
        depth: usize,
    ) -> Result<Vec<ExpandItem>, ParserError> {
        if depth >= self.config.max_nesting_depth {
            return Err(SyntaxError::new(SyntaxMessageKey::TooDeeplyNested, &[text]).into());
        }
        split_top_level(text, ',')
            .into_iter()
            .map(|item| self.expand_item(item.trim(), target, scope, depth))
            .collect()
    }

    fn expand_item(
        &self,
        item: &str,
        target: Option<&EdmType>,
        scope: Scope<'_>,
        depth: usize,
    ) -> Result<ExpandItem, ParserError> {
        let (head, nested) = split_nested(item)?;
        let mut segments = head.split('/').collect::<Vec<_>>();
        let mut expand = ExpandItem {
            path: Vec::new(),
            is_star: false,
            is_ref: false,
            is_count: false,
            type_filter: None,
            options: QueryOptions::default(),
        };
        match segments.last() {
            Some(&"$ref") => expand.is_ref = true,
            Some(&"$count") => expand.is_count = true,
            _ => {}
        }
        if expand.is_ref || expand.is_count {
            segments.pop();
        }
        if segments == ["*"] {
            expand.is_star = true;
        } else {
            let target = target
                .ok_or_else(|| semantic(SemanticMessageKey::OnlyForTypedParts, &["$expand"]))?;
            (expand.path, expand.type_filter) = self.property_path(&segments, target)?;
            let (last, leading) = expand
                .path
                .split_last()
                .ok_or_else(|| syntax(item))?;
            let navigates = last.kind() == UriResourceKind::NavigationProperty
                && leading.iter().all(|r| r.kind() == UriResourceKind::ComplexProperty);
            if !navigates {
                return Err(semantic(
                    SemanticMessageKey::PropertyNotInType,
                    &[&target.to_string(), head],
                ));
            }
        }
        let Some(nested) = nested else {
            return Ok(expand);
        };
        let nested_target = expand.path.last().and_then(UriResource::edm_type);
        for option in split_top_level(nested, ';').into_iter().filter(|o| !o.is_empty()) {
            let (name, value) = option.split_once('=').ok_or_else(|| syntax(option))?;
            let kind = self
                .system_option_kind(name)?
                .filter(|kind| {
                    !matches!(
                        kind,
                        SystemQueryOptionKind::Format
                            | SystemQueryOptionKind::Id
                            | SystemQueryOptionKind::SkipToken
                    )
                })
                .ok_or_else(|| syntax(option))?;
            self.parse_option(
                &mut expand.options,
                kind,
                value,
                nested_target.as_ref(),
                scope,
                depth + 1,
            )?;
        }
        Ok(expand)
    }

    /// Walk a `$select` or `$expand` path of properties, type casts and
    /// bound operations starting at `target`. Returns the resources and
    /// a cast of `target` itself.
    fn property_path(
        &self,
        segments: &[&str],
        target: &EdmType,
    ) -> Result<(Vec<UriResource>, Option<EdmType>), ParserError> {
        let mut path: Vec<UriResource> = Vec::new();
        let mut type_filter: Option<EdmType> = None;
        for segment in segments {
            let mut tokens = Tokens::new(segment)?;
            let name = tokens.expect(TokenKind::Identifier)?.text;
            tokens.finish()?;
            let owner = match path.last() {
                Some(last) => last.edm_type().ok_or_else(|| {
                    semantic(SemanticMessageKey::OnlyForTypedParts, &[&last.segment_value()])
                })?,
                None => type_filter.clone().unwrap_or_else(|| target.clone()),
            };
            let not_in_type = || {
                semantic(
                    SemanticMessageKey::PropertyNotInType,
                    &[&owner.to_string(), name],
                )
            };
            if !name.contains('.') {
                let structured = owner.as_structured().ok_or_else(not_in_type)?;
                let resource = property_resource(self.edm, structured, name)?.ok_or_else(not_in_type)?;
                path.push(resource);
                continue;
            }
            let fqn = parse_name(name)?;
            if let Some(cast) = self.edm.resolve_type(&fqn)? {
                match path.last_mut() {
                    Some(last) => set_type_filter(last, cast)?,
                    None if type_filter.is_some() => {
                        return Err(semantic(SemanticMessageKey::TypeFilterNotChainable, &[name]));
                    }
                    None => {
                        let compatible = match (cast.as_structured(), target.as_structured()) {
                            (Some(c), Some(t)) => c.is_compatible_with(t.name()),
                            _ => false,
                        };
                        if !compatible {
                            return Err(semantic(
                                SemanticMessageKey::IncompatibleTypeFilter,
                                &[name, &target.to_string()],
                            ));
                        }
                        type_filter = Some(cast);
                    }
                }
                continue;
            }
            let binding = owner.fqn();
            if let Some(action) = self.edm.bound_action(&fqn, &binding, false)? {
                let return_type = action
                    .return_type()
                    .map(|rt| self.edm.resolve_type(&rt.type_ref.name))
                    .transpose()?
                    .flatten();
                path.push(UriResource::Action(UriResourceAction {
                    action,
                    import: None,
                    return_type,
                }));
            } else if let Some(function) = self.edm.bound_function::<&str>(&fqn, &binding, false, &[])? {
                let return_type = function
                    .return_type()
                    .map(|rt| self.edm.resolve_type(&rt.type_ref.name))
                    .transpose()?
                    .flatten()
                    .ok_or_else(|| semantic(SemanticMessageKey::FunctionNotFound, &[name]))?;
                path.push(UriResource::Function(UriResourceFunction {
                    function,
                    import: None,
                    parameters: Vec::new(),
                    return_type,
                    keys: Vec::new(),
                    type_filter_on_collection: None,
                    type_filter_on_entry: None,
                }));
            } else {
                return Err(semantic(SemanticMessageKey::UnknownPart, &[name]));
            }
        }
        Ok((path, type_filter))
    }
}
