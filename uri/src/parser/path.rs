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

//! Resource path resolution.

use super::entity_type_of;
use super::key_predicate;
use super::keys_mut;
use super::parse_name;
use super::property_resource;
use super::semantic;
use super::set_type_filter;
use super::syntax;
use super::type_of;
use super::Parser;
use super::Tokens;
use crate::error::ParserError;
use crate::error::SemanticMessageKey;
use crate::error::SyntaxError;
use crate::error::SyntaxMessageKey;
use crate::info::UriInfo;
use crate::info::UriInfoKind;
use crate::lexer::Token;
use crate::lexer::TokenKind;
use crate::resource::FunctionParameter;
use crate::resource::ParameterValue;
use crate::resource::UriResource;
use crate::resource::UriResourceAction;
use crate::resource::UriResourceEntitySet;
use crate::resource::UriResourceFunction;
use crate::resource::UriResourceKind;
use crate::resource::UriResourceSingleton;
use odata_edm::EdmAction;
use odata_edm::EdmActionImport;
use odata_edm::EdmEntityContainer;
use odata_edm::EdmFunction;
use odata_edm::EdmFunctionImport;
use odata_edm::EdmOperation;
use odata_edm::EdmStructuredType;
use odata_edm::EdmType;
use odata_edm::FullQualifiedName;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::trace;

type Aliases = BTreeMap<String, String>;

/// Raw `name=value` pairs of a function call.
type RawParameters<'t> = Vec<(&'t str, Token<'t>)>;

impl Parser<'_> {
    pub(super) fn parse_path(
        &self,
        segments: &[String],
        aliases: &Aliases,
    ) -> Result<UriInfo, ParserError> {
        let Some(first) = segments.first().filter(|s| !s.is_empty()) else {
            if segments.len() > 1 {
                return Err(syntax(&segments.join("/")));
            }
            return Ok(UriInfo::new(UriInfoKind::Service));
        };
        match first.as_str() {
            "$metadata" => self.single_segment(segments, UriInfoKind::Metadata),
            "$batch" => self.single_segment(segments, UriInfoKind::Batch),
            "$all" => self.cast_only(segments, UriInfoKind::All),
            "$entity" => self.cast_only(segments, UriInfoKind::EntityId),
            s if s.starts_with("$crossjoin") => self.crossjoin(segments),
            s if s.starts_with('$') => Err(syntax(s)),
            _ => self.resource_path(segments, aliases),
        }
    }

    fn single_segment(&self, segments: &[String], kind: UriInfoKind) -> Result<UriInfo, ParserError> {
        match segments {
            [_] => Ok(UriInfo::new(kind)),
            [_, next, ..] => Err(must_be_last(next)),
            [] => Err(syntax("")),
        }
    }

    /// `$all` and `$entity`, optionally followed by an entity type cast.
    fn cast_only(&self, segments: &[String], kind: UriInfoKind) -> Result<UriInfo, ParserError> {
        let mut info = UriInfo::new(kind);
        match segments {
            [_] => {}
            [_, cast] => {
                let name = parse_name(cast)?;
                let entity_type = self
                    .edm
                    .entity_type(&name)?
                    .ok_or_else(|| semantic(SemanticMessageKey::UnknownType, &[cast]))?;
                info.entity_type_cast = Some(entity_type);
            }
            [_, _, next, ..] => return Err(must_be_last(next)),
            [] => return Err(syntax("")),
        }
        Ok(info)
    }

    pub(super) fn container(&self) -> Result<Arc<EdmEntityContainer>, ParserError> {
        self.edm
            .entity_container(None)?
            .ok_or_else(|| semantic(SemanticMessageKey::ResourceNotFound, &["$metadata"]))
    }

    fn crossjoin(&self, segments: &[String]) -> Result<UriInfo, ParserError> {
        if let Some(next) = segments.get(1) {
            return Err(must_be_last(next));
        }
        let mut tokens = Tokens::new(&segments[0])?;
        if tokens.next().text != "$crossjoin" {
            return Err(tokens.syntax());
        }
        tokens.expect(TokenKind::OpenParen)?;
        let container = self.container()?;
        let mut info = UriInfo::new(UriInfoKind::Crossjoin);
        loop {
            let name = tokens.expect(TokenKind::Identifier)?.text;
            if container.entity_set(name).is_none() {
                return Err(semantic(SemanticMessageKey::ResourceNotFound, &[name]));
            }
            info.crossjoin_entity_sets.push(name.into());
            if !tokens.eat(TokenKind::Comma) {
                break;
            }
        }
        tokens.expect(TokenKind::CloseParen)?;
        tokens.finish()?;
        Ok(info)
    }

    fn resource_path(&self, segments: &[String], aliases: &Aliases) -> Result<UriInfo, ParserError> {
        let mut info = UriInfo::new(UriInfoKind::Resource);
        let last = segments.len() - 1;
        for (index, segment) in segments.iter().enumerate() {
            // Trailing slash.
            if index > 0 && index == last && segment.is_empty() {
                break;
            }
            let mut tokens = Tokens::new(segment)?;
            let resource = if index == 0 {
                Some(self.first_segment(&mut tokens, aliases)?)
            } else {
                self.next_segment(&mut tokens, &mut info.resources, aliases)?
            };
            tokens.finish()?;
            if let Some(resource) = resource {
                trace!(%segment, kind = ?resource.kind(), "resolved segment");
                info.resources.push(resource);
            }
        }
        Ok(info)
    }

    fn first_segment(&self, tokens: &mut Tokens<'_>, aliases: &Aliases) -> Result<UriResource, ParserError> {
        let name = tokens.expect(TokenKind::Identifier)?.text;
        if name.contains('.') {
            return self.unbound_operation(tokens, name, aliases);
        }
        let container = self.container()?;
        if let Some(entity_set) = container.entity_set(name) {
            let entity_type = entity_type_of(self.edm, &entity_set.entity_type)?;
            let keys = if tokens.peek().kind == TokenKind::OpenParen {
                key_predicate(self.edm, tokens, &entity_type, aliases)?
            } else {
                Vec::new()
            };
            return Ok(UriResource::EntitySet(UriResourceEntitySet {
                entity_set: Arc::clone(entity_set),
                entity_type,
                keys,
                type_filter_on_collection: None,
                type_filter_on_entry: None,
            }));
        }
        if let Some(singleton) = container.singleton(name) {
            if tokens.peek().kind == TokenKind::OpenParen {
                return Err(semantic(SemanticMessageKey::KeyNotAllowed, &[name]));
            }
            return Ok(UriResource::Singleton(UriResourceSingleton {
                singleton: Arc::clone(singleton),
                entity_type: entity_type_of(self.edm, &singleton.entity_type)?,
                type_filter: None,
            }));
        }
        if let Some(import) = container.action_import(name) {
            let action = self
                .edm
                .unbound_action(&import.action)?
                .ok_or_else(|| semantic(SemanticMessageKey::ActionNotFound, &[name]))?;
            if tokens.eat(TokenKind::OpenParen) {
                tokens.expect(TokenKind::CloseParen)?;
            }
            return self.action_resource(action, Some(Arc::clone(import)));
        }
        if let Some(import) = container.function_import(name) {
            let raw = function_parameters(tokens)?;
            let names = raw.iter().map(|(n, _)| *n).collect::<Vec<_>>();
            let function = self
                .edm
                .unbound_function(&import.function, &names)?
                .ok_or_else(|| semantic(SemanticMessageKey::FunctionNotFound, &[name]))?;
            return self.function_resource(tokens, function, Some(Arc::clone(import)), raw, aliases);
        }
        Err(semantic(SemanticMessageKey::ResourceNotFound, &[name]))
    }

    /// Unbound function or action addressed by qualified name.
    fn unbound_operation(
        &self,
        tokens: &mut Tokens<'_>,
        name: &str,
        aliases: &Aliases,
    ) -> Result<UriResource, ParserError> {
        let fqn = parse_name(name)?;
        if tokens.peek().kind == TokenKind::OpenParen {
            let raw = function_parameters(tokens)?;
            let names = raw.iter().map(|(n, _)| *n).collect::<Vec<_>>();
            let function = self
                .edm
                .unbound_function(&fqn, &names)?
                .ok_or_else(|| semantic(SemanticMessageKey::ResourceNotFound, &[name]))?;
            return self.function_resource(tokens, function, None, raw, aliases);
        }
        let action = self
            .edm
            .unbound_action(&fqn)?
            .ok_or_else(|| semantic(SemanticMessageKey::ResourceNotFound, &[name]))?;
        self.action_resource(action, None)
    }

    fn action_resource(
        &self,
        action: Arc<EdmAction>,
        import: Option<Arc<EdmActionImport>>,
    ) -> Result<UriResource, ParserError> {
        let return_type = action
            .return_type()
            .map(|rt| type_of(self.edm, &rt.type_ref.name))
            .transpose()?;
        Ok(UriResource::Action(UriResourceAction {
            action,
            import,
            return_type,
        }))
    }

    fn function_resource(
        &self,
        tokens: &mut Tokens<'_>,
        function: Arc<EdmFunction>,
        import: Option<Arc<EdmFunctionImport>>,
        raw: RawParameters<'_>,
        aliases: &Aliases,
    ) -> Result<UriResource, ParserError> {
        let parameters = self.function_parameter_values(&function, raw)?;
        let return_type = function
            .return_type()
            .map(|rt| type_of(self.edm, &rt.type_ref.name))
            .transpose()?
            .ok_or_else(|| semantic(SemanticMessageKey::FunctionNotFound, &[&function.name().to_string()]))?;
        let mut resource = UriResourceFunction {
            function,
            import,
            parameters,
            return_type,
            keys: Vec::new(),
            type_filter_on_collection: None,
            type_filter_on_entry: None,
        };
        if tokens.peek().kind == TokenKind::OpenParen {
            let returns_collection = resource
                .function
                .return_type()
                .is_some_and(|rt| rt.type_ref.is_collection());
            let Some(entity_type) = resource.return_type.as_entity().filter(|_| returns_collection) else {
                return Err(semantic(
                    SemanticMessageKey::KeyNotAllowed,
                    &[&resource.function.name().to_string()],
                ));
            };
            let entity_type = Arc::clone(entity_type);
            resource.keys = key_predicate(self.edm, tokens, &entity_type, aliases)?;
        }
        Ok(UriResource::Function(resource))
    }

    /// Typed parameter values. Literals of primitive parameters are
    /// checked against the parameter type. Aliases stay unresolved.
    pub(super) fn function_parameter_values(
        &self,
        function: &EdmFunction,
        raw: RawParameters<'_>,
    ) -> Result<Vec<FunctionParameter>, ParserError> {
        raw.into_iter()
            .map(|(name, token)| {
                let parameter = function.parameter(name).ok_or_else(|| {
                    semantic(SemanticMessageKey::FunctionNotFound, &[&function.name().to_string()])
                })?;
                let value = match token.kind {
                    TokenKind::Alias => ParameterValue::Alias(token.text.into()),
                    TokenKind::Literal | TokenKind::EnumLiteral => {
                        let kind = if parameter.type_ref.is_collection() {
                            None
                        } else {
                            type_of(self.edm, &parameter.type_ref.name)?.as_primitive()
                        };
                        let value = kind
                            .map(|kind| kind.validate_literal(token.text))
                            .transpose()
                            .map_err(|_| {
                                semantic(SemanticMessageKey::TypeMismatch, &[name, token.text])
                            })?;
                        ParameterValue::Literal(token.text.into(), value)
                    }
                    _ => return Err(syntax(token.text)),
                };
                Ok(FunctionParameter {
                    name: name.into(),
                    value,
                })
            })
            .collect()
    }

    fn next_segment(
        &self,
        tokens: &mut Tokens<'_>,
        resources: &mut [UriResource],
        aliases: &Aliases,
    ) -> Result<Option<UriResource>, ParserError> {
        let Some(previous) = resources.last_mut() else {
            return Err(tokens.syntax());
        };
        let token = tokens.next();
        match previous.kind() {
            UriResourceKind::Count
            | UriResourceKind::Value
            | UriResourceKind::Ref
            | UriResourceKind::Action => return Err(must_be_last(token.text)),
            UriResourceKind::Function => {
                let composable = matches!(previous, UriResource::Function(f) if f.function.is_composable());
                if !composable && token.kind != TokenKind::Dollar {
                    return Err(must_be_last(token.text));
                }
            }
            _ => {}
        }
        match token.kind {
            TokenKind::Dollar => self.dollar_segment(previous, token.text).map(Some),
            TokenKind::Identifier if token.text.contains('.') => {
                self.qualified_segment(tokens, previous, token.text, aliases)
            }
            TokenKind::Identifier => self.property_segment(tokens, previous, token.text, aliases).map(Some),
            _ => Err(tokens.syntax()),
        }
    }

    fn dollar_segment(&self, previous: &UriResource, name: &str) -> Result<UriResource, ParserError> {
        let segment = previous.segment_value();
        match name {
            "$count" => {
                if previous.is_collection() {
                    Ok(UriResource::Count)
                } else {
                    Err(semantic(SemanticMessageKey::OnlyForCollections, &[&segment]))
                }
            }
            "$ref" => {
                if previous.edm_type().is_some_and(|t| t.as_entity().is_some()) {
                    Ok(UriResource::Ref)
                } else {
                    Err(semantic(SemanticMessageKey::OnlyForEntityTypes, &[&segment]))
                }
            }
            "$value" => match previous.edm_type() {
                Some(EdmType::Entity(entity_type)) if !previous.is_collection() => {
                    if entity_type.has_stream() {
                        Ok(UriResource::Value)
                    } else {
                        Err(semantic(SemanticMessageKey::NotAMediaResource, &[&segment]))
                    }
                }
                Some(EdmType::Primitive(_) | EdmType::Enum(_) | EdmType::Definition(_))
                    if !previous.is_collection() =>
                {
                    Ok(UriResource::Value)
                }
                _ => Err(semantic(SemanticMessageKey::OnlyForPrimitiveTypes, &[&segment])),
            },
            _ => Err(syntax(name)),
        }
    }

    /// Type cast or bound operation.
    fn qualified_segment(
        &self,
        tokens: &mut Tokens<'_>,
        previous: &mut UriResource,
        name: &str,
        aliases: &Aliases,
    ) -> Result<Option<UriResource>, ParserError> {
        let fqn = parse_name(name)?;
        let previous_type = previous.edm_type().ok_or_else(|| {
            semantic(SemanticMessageKey::OnlyForTypedParts, &[&previous.segment_value()])
        })?;
        if let Some(cast) = self.edm.resolve_type(&fqn)? {
            let on_collection = previous.is_collection() && previous.keys().is_empty();
            set_type_filter(previous, cast.clone())?;
            if tokens.peek().kind == TokenKind::OpenParen {
                let entity_type = cast.as_entity().filter(|_| on_collection);
                let (Some(entity_type), Some(keys)) = (entity_type, keys_mut(previous)) else {
                    return Err(semantic(SemanticMessageKey::KeyNotAllowed, &[name]));
                };
                *keys = key_predicate(self.edm, tokens, entity_type, aliases)?;
            }
            return Ok(None);
        }
        self.bound_operation(tokens, &fqn, &previous_type, previous.is_collection(), aliases)
            .map(Some)
    }

    fn bound_operation(
        &self,
        tokens: &mut Tokens<'_>,
        name: &FullQualifiedName,
        binding_type: &EdmType,
        is_collection: bool,
        aliases: &Aliases,
    ) -> Result<UriResource, ParserError> {
        let binding = binding_type.fqn();
        if tokens.peek().kind == TokenKind::OpenParen {
            let raw = function_parameters(tokens)?;
            let names = raw.iter().map(|(n, _)| *n).collect::<Vec<_>>();
            let function = self
                .edm
                .bound_function(name, &binding, is_collection, &names)?
                .ok_or_else(|| semantic(SemanticMessageKey::FunctionNotFound, &[&name.to_string()]))?;
            return self.function_resource(tokens, function, None, raw, aliases);
        }
        let action = self
            .edm
            .bound_action(name, &binding, is_collection)?
            .ok_or_else(|| semantic(SemanticMessageKey::ActionNotFound, &[&name.to_string()]))?;
        self.action_resource(action, None)
    }

    fn property_segment(
        &self,
        tokens: &mut Tokens<'_>,
        previous: &UriResource,
        name: &str,
        aliases: &Aliases,
    ) -> Result<UriResource, ParserError> {
        let segment = previous.segment_value();
        let previous_type = previous
            .edm_type()
            .ok_or_else(|| semantic(SemanticMessageKey::OnlyForTypedParts, &[&segment]))?;
        let Some(owner) = previous_type.as_structured() else {
            return Err(semantic(SemanticMessageKey::OnlyForStructuralTypes, &[&segment]));
        };
        if previous.is_collection() {
            return Err(semantic(SemanticMessageKey::PropertyAfterCollection, &[&segment, name]));
        }
        let mut resource = property_resource(self.edm, owner, name)?.ok_or_else(|| {
            semantic(
                SemanticMessageKey::PropertyNotInType,
                &[&owner.name().to_string(), name],
            )
        })?;
        if tokens.peek().kind == TokenKind::OpenParen {
            let target = match &resource {
                UriResource::NavigationProperty(nav) if nav.property.is_collection() => {
                    Arc::clone(&nav.target)
                }
                _ => return Err(semantic(SemanticMessageKey::KeyNotAllowed, &[name])),
            };
            if let Some(keys) = keys_mut(&mut resource) {
                *keys = key_predicate(self.edm, tokens, &target, aliases)?;
            }
        }
        Ok(resource)
    }
}

fn must_be_last(segment: &str) -> ParserError {
    SyntaxError::new(SyntaxMessageKey::MustBeLastSegment, &[segment]).into()
}

/// Parse `(name=value,...)`. Names must be unique.
pub(super) fn function_parameters<'t>(tokens: &mut Tokens<'t>) -> Result<RawParameters<'t>, ParserError> {
    tokens.expect(TokenKind::OpenParen)?;
    let mut parameters: RawParameters<'t> = Vec::new();
    if tokens.eat(TokenKind::CloseParen) {
        return Ok(parameters);
    }
    loop {
        let name = tokens.expect(TokenKind::Identifier)?.text;
        tokens.expect(TokenKind::Equals)?;
        let value = tokens.next();
        if parameters.iter().any(|(n, _)| *n == name) {
            return Err(tokens.syntax());
        }
        parameters.push((name, value));
        if !tokens.eat(TokenKind::Comma) {
            break;
        }
    }
    tokens.expect(TokenKind::CloseParen)?;
    Ok(parameters)
}

