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

//! Common expression parser.
//!
//! Precedence climbing over the token stream. Binary operators are
//! words and must be preceded by whitespace; `not` and `-` are prefix
//! operators binding tighter than any binary one. Member paths are
//! resolved against the `$it` type while parsing, so every node is
//! typed as far as the model allows.

use super::entity_type_of;
use super::key_predicate;
use super::parse_name;
use super::path::function_parameters;
use super::property_resource;
use super::semantic;
use super::set_type_filter;
use super::syntax;
use super::type_of;
use super::Parser;
use super::Tokens;
use crate::error::ParserError;
use crate::error::SemanticError;
use crate::error::SemanticMessageKey;
use crate::error::SyntaxError;
use crate::error::SyntaxMessageKey;
use crate::expression::is_boolean;
use crate::expression::BinaryOperator;
use crate::expression::Expression;
use crate::expression::MethodKind;
use crate::expression::UnaryOperator;
use crate::lexer::Token;
use crate::lexer::TokenKind;
use crate::resource::UriResource;
use crate::resource::UriResourceEntitySet;
use crate::resource::UriResourceFunction;
use crate::resource::UriResourceIt;
use crate::resource::UriResourceLambda;
use crate::resource::UriResourceLambdaVariable;
use crate::resource::UriResourceSingleton;
use odata_edm::EdmOperation;
use odata_edm::EdmType;
use odata_edm::PrimitiveValue;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Binds tighter than every binary operator.
const UNARY_PRECEDENCE: u8 = 8;

fn mismatch(err: SemanticError) -> ParserError {
    debug!(%err, "expression type check failed");
    err.into()
}

pub(super) struct ExpressionParser<'a, 't> {
    parser: &'a Parser<'a>,
    pub(super) tokens: Tokens<'t>,
    it_type: Option<EdmType>,
    crossjoin: &'a [String],
    aliases: &'a BTreeMap<String, String>,
    variables: Vec<(String, EdmType)>,
    depth: usize,
}

impl<'a, 't> ExpressionParser<'a, 't> {
    pub(super) fn new(
        parser: &'a Parser<'a>,
        source: &'t str,
        it_type: Option<EdmType>,
        crossjoin: &'a [String],
        aliases: &'a BTreeMap<String, String>,
    ) -> Result<Self, ParserError> {
        Ok(Self {
            parser,
            tokens: Tokens::new(source)?,
            it_type,
            crossjoin,
            aliases,
            variables: Vec::new(),
            depth: 0,
        })
    }

    /// Parse one expression, leaving trailing tokens to the caller.
    pub(super) fn parse(&mut self) -> Result<Expression, ParserError> {
        self.expression(0)
    }

    fn expression(&mut self, min_precedence: u8) -> Result<Expression, ParserError> {
        self.depth += 1;
        if self.depth > self.parser.config.max_nesting_depth {
            return Err(SyntaxError::new(
                SyntaxMessageKey::TooDeeplyNested,
                &[&self.depth.to_string()],
            )
            .into());
        }
        let result = self.binary(min_precedence);
        self.depth -= 1;
        result
    }

    fn binary(&mut self, min_precedence: u8) -> Result<Expression, ParserError> {
        let mut left = self.prefix()?;
        loop {
            let token = self.tokens.peek();
            if token.kind != TokenKind::Identifier || !token.space_before {
                break;
            }
            let Some(op) = BinaryOperator::from_name(token.text) else {
                break;
            };
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.tokens.next();
            let right = if op == BinaryOperator::In {
                self.in_operand(&left)?
            } else {
                self.expression(precedence + 1)?
            };
            let ty = op
                .result_type(left.ty().as_ref(), right.ty().as_ref())
                .map_err(mismatch)?;
            left = Expression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                ty,
            };
        }
        Ok(left)
    }

    fn prefix(&mut self) -> Result<Expression, ParserError> {
        let token = self.tokens.next();
        match token.kind {
            TokenKind::OpenParen => {
                let inner = self.expression(0)?;
                self.tokens.expect(TokenKind::CloseParen)?;
                Ok(inner)
            }
            TokenKind::Minus => self.unary(UnaryOperator::Minus),
            TokenKind::Identifier
                if token.text == "not"
                    && (self.tokens.peek().space_before
                        || self.tokens.peek().kind == TokenKind::OpenParen) =>
            {
                self.unary(UnaryOperator::Not)
            }
            TokenKind::Literal => Ok(literal(token.text)),
            TokenKind::EnumLiteral => self.enum_literal(token.text),
            TokenKind::Alias => Ok(Expression::Alias(token.text.into())),
            TokenKind::Identifier if self.tokens.peek().kind == TokenKind::OpenParen => {
                match MethodKind::from_name(token.text) {
                    Some(method) => self.method(method),
                    None => self.member(token),
                }
            }
            TokenKind::Identifier | TokenKind::Dollar => self.member(token),
            _ => Err(self.tokens.syntax()),
        }
    }

    /// Right operand of `in`: a parenthesized list or an alias. Every
    /// list item must compare with `left`.
    fn in_operand(&mut self, left: &Expression) -> Result<Expression, ParserError> {
        let token = self.tokens.next();
        match token.kind {
            TokenKind::Alias => Ok(Expression::Alias(token.text.into())),
            TokenKind::OpenParen => {
                let mut items = Vec::new();
                loop {
                    let item = self.expression(0)?;
                    BinaryOperator::Eq
                        .result_type(left.ty().as_ref(), item.ty().as_ref())
                        .map_err(mismatch)?;
                    items.push(item);
                    if !self.tokens.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.tokens.expect(TokenKind::CloseParen)?;
                Ok(Expression::List(items))
            }
            _ => Err(self.tokens.syntax()),
        }
    }

    fn unary(&mut self, op: UnaryOperator) -> Result<Expression, ParserError> {
        let operand = self.expression(UNARY_PRECEDENCE)?;
        let ty = op.result_type(operand.ty().as_ref()).map_err(mismatch)?;
        Ok(Expression::Unary {
            op,
            operand: Box::new(operand),
            ty,
        })
    }

    /// `ns.Enum'Member1,Member2'`
    fn enum_literal(&self, text: &str) -> Result<Expression, ParserError> {
        let (name, quoted) = text.split_once('\'').ok_or_else(|| syntax(text))?;
        let ty = self
            .parser
            .edm
            .enum_type(&parse_name(name)?)?
            .ok_or_else(|| semantic(SemanticMessageKey::UnknownType, &[name]))?;
        let values = quoted
            .trim_end_matches('\'')
            .split(',')
            .map(|member| {
                ty.member_by_literal(member)
                    .map(|_| member.to_string())
                    .ok_or_else(|| semantic(SemanticMessageKey::UnknownPart, &[member]))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Expression::Enum { ty, values })
    }

    fn method(&mut self, method: MethodKind) -> Result<Expression, ParserError> {
        self.tokens.expect(TokenKind::OpenParen)?;
        let mut parameters = Vec::new();
        if !self.tokens.eat(TokenKind::CloseParen) {
            loop {
                parameters.push(self.method_argument(method)?);
                if !self.tokens.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.tokens.expect(TokenKind::CloseParen)?;
        }
        let (min, max) = method.arity();
        if parameters.len() < min || parameters.len() > max {
            return Err(syntax(method.name()));
        }
        Ok(Expression::Method { method, parameters })
    }

    /// `cast` and `isof` take a qualified type name as last argument.
    fn method_argument(&mut self, method: MethodKind) -> Result<Expression, ParserError> {
        let token = self.tokens.peek();
        let follows = self.tokens.peek_at(1).kind;
        if matches!(method, MethodKind::Cast | MethodKind::IsOf)
            && token.kind == TokenKind::Identifier
            && token.text.contains('.')
            && matches!(follows, TokenKind::Comma | TokenKind::CloseParen)
        {
            self.tokens.next();
            let ty = self
                .parser
                .edm
                .resolve_type(&parse_name(token.text)?)?
                .ok_or_else(|| semantic(SemanticMessageKey::UnknownType, &[token.text]))?;
            return Ok(Expression::TypeLiteral(ty));
        }
        self.expression(0)
    }

    fn variable(&self, name: &str) -> Option<&EdmType> {
        self.variables
            .iter()
            .rev()
            .find(|(v, _)| v == name)
            .map(|(_, ty)| ty)
    }

    /// Path starting at `$it`, `$root`, a lambda variable, a crossjoin
    /// entity set or an implicit `$it`.
    fn member(&mut self, first: Token<'t>) -> Result<Expression, ParserError> {
        let mut resources: Vec<UriResource> = Vec::new();
        let mut start_type_filter: Option<EdmType> = None;
        let mut crossjoin_start = false;
        let mut token = first;
        loop {
            let at_start = resources.is_empty() && start_type_filter.is_none();
            let owner = match resources.last() {
                Some(last) => last.edm_type(),
                None => start_type_filter.clone().or_else(|| self.it_type.clone()),
            };
            let owner_collection = resources.last().is_some_and(UriResource::is_collection)
                && !(crossjoin_start && resources.len() == 1);
            let next = self.tokens.peek().kind;
            let resource = match token.kind {
                TokenKind::Dollar if token.text == "$it" && at_start => {
                    let it_type = self
                        .it_type
                        .clone()
                        .ok_or_else(|| semantic(SemanticMessageKey::OnlyForTypedParts, &["$it"]))?;
                    UriResource::It(UriResourceIt {
                        it_type,
                        collection: false,
                    })
                }
                TokenKind::Dollar if token.text == "$root" && at_start => self.root()?,
                TokenKind::Dollar if token.text == "$count" && !resources.is_empty() => {
                    if !owner_collection {
                        return Err(semantic(SemanticMessageKey::OnlyForCollections, &["$count"]));
                    }
                    UriResource::Count
                }
                TokenKind::Identifier
                    if matches!(token.text, "any" | "all")
                        && next == TokenKind::OpenParen
                        && !resources.is_empty() =>
                {
                    if !owner_collection {
                        return Err(semantic(SemanticMessageKey::OnlyForCollections, &[token.text]));
                    }
                    self.lambda(token.text, owner)?
                }
                TokenKind::Identifier if at_start && self.variable(token.text).is_some() => {
                    let variable_type = self.variable(token.text).cloned().ok_or_else(|| syntax(token.text))?;
                    if next != TokenKind::Slash {
                        return Ok(Expression::LambdaRef {
                            variable: token.text.into(),
                            ty: variable_type,
                        });
                    }
                    UriResource::LambdaVariable(UriResourceLambdaVariable {
                        variable: token.text.into(),
                        variable_type,
                    })
                }
                TokenKind::Identifier if at_start && self.crossjoin.iter().any(|s| s == token.text) => {
                    crossjoin_start = true;
                    self.entity_set(token.text)?
                }
                TokenKind::Identifier if token.text.contains('.') => {
                    match self.qualified(token.text, owner, owner_collection, &mut resources, &mut start_type_filter)? {
                        Some(resource) => resource,
                        None => {
                            if !self.tokens.eat(TokenKind::Slash) {
                                break;
                            }
                            token = self.tokens.next();
                            continue;
                        }
                    }
                }
                TokenKind::Identifier => {
                    let owner = owner.ok_or_else(|| {
                        semantic(SemanticMessageKey::OnlyForTypedParts, &[token.text])
                    })?;
                    let not_in_type = || {
                        semantic(
                            SemanticMessageKey::ExpressionPropertyNotInType,
                            &[&owner.to_string(), token.text],
                        )
                    };
                    let structured = owner.as_structured().ok_or_else(not_in_type)?;
                    if owner_collection {
                        return Err(semantic(
                            SemanticMessageKey::PropertyAfterCollection,
                            &[&owner.to_string(), token.text],
                        ));
                    }
                    property_resource(self.parser.edm, structured, token.text)?.ok_or_else(not_in_type)?
                }
                _ => return Err(self.tokens.syntax()),
            };
            resources.push(resource);
            if !self.tokens.eat(TokenKind::Slash) {
                break;
            }
            token = self.tokens.next();
        }
        Ok(Expression::Member {
            resources,
            start_type_filter,
        })
    }

    /// Type cast on the current position or a bound function call.
    fn qualified(
        &mut self,
        name: &str,
        owner: Option<EdmType>,
        owner_collection: bool,
        resources: &mut [UriResource],
        start_type_filter: &mut Option<EdmType>,
    ) -> Result<Option<UriResource>, ParserError> {
        let fqn = parse_name(name)?;
        if let Some(cast) = self.parser.edm.resolve_type(&fqn)? {
            if let Some(last) = resources.last_mut() {
                set_type_filter(last, cast)?;
                return Ok(None);
            }
            let owner = owner.ok_or_else(|| semantic(SemanticMessageKey::OnlyForTypedParts, &[name]))?;
            let compatible = match (cast.as_structured(), owner.as_structured()) {
                (Some(c), Some(o)) => c.is_compatible_with(o.name()),
                _ => false,
            };
            if !compatible {
                return Err(semantic(
                    SemanticMessageKey::IncompatibleTypeFilter,
                    &[name, &owner.to_string()],
                ));
            }
            if start_type_filter.is_some() {
                return Err(semantic(SemanticMessageKey::TypeFilterNotChainable, &[name]));
            }
            *start_type_filter = Some(cast);
            return Ok(None);
        }
        if self.tokens.peek().kind != TokenKind::OpenParen {
            return Err(semantic(SemanticMessageKey::UnknownType, &[name]));
        }
        let owner = owner.ok_or_else(|| semantic(SemanticMessageKey::OnlyForTypedParts, &[name]))?;
        let raw = function_parameters(&mut self.tokens)?;
        let names = raw.iter().map(|(n, _)| *n).collect::<Vec<_>>();
        let function = self
            .parser
            .edm
            .bound_function(&fqn, &owner.fqn(), owner_collection, &names)?
            .ok_or_else(|| semantic(SemanticMessageKey::FunctionNotFound, &[name]))?;
        let parameters = self.parser.function_parameter_values(&function, raw)?;
        let return_type = function
            .return_type()
            .map(|rt| type_of(self.parser.edm, &rt.type_ref.name))
            .transpose()?
            .ok_or_else(|| semantic(SemanticMessageKey::FunctionNotFound, &[name]))?;
        Ok(Some(UriResource::Function(UriResourceFunction {
            function,
            import: None,
            parameters,
            return_type,
            keys: Vec::new(),
            type_filter_on_collection: None,
            type_filter_on_entry: None,
        })))
    }

    /// `any(v:expr)`, `any()` or `all(v:expr)` over a collection of
    /// `owner`.
    fn lambda(&mut self, name: &str, owner: Option<EdmType>) -> Result<UriResource, ParserError> {
        let all = name == "all";
        self.tokens.expect(TokenKind::OpenParen)?;
        if !all && self.tokens.eat(TokenKind::CloseParen) {
            return Ok(UriResource::LambdaAny(UriResourceLambda {
                variable: None,
                expression: None,
            }));
        }
        let variable = self.tokens.expect(TokenKind::Identifier)?.text;
        if variable.contains('.') {
            return Err(syntax(variable));
        }
        self.tokens.expect(TokenKind::Colon)?;
        let ty = owner.ok_or_else(|| semantic(SemanticMessageKey::OnlyForTypedParts, &[name]))?;
        self.variables.push((variable.into(), ty));
        let body = self.expression(0);
        self.variables.pop();
        let body = body?;
        if let Some(ty) = body.ty().filter(|t| !is_boolean(t)) {
            return Err(semantic(
                SemanticMessageKey::TypeMismatch,
                &[name, &ty.to_string()],
            ));
        }
        self.tokens.expect(TokenKind::CloseParen)?;
        let lambda = UriResourceLambda {
            variable: Some(variable.into()),
            expression: Some(Box::new(body)),
        };
        Ok(if all {
            UriResource::LambdaAll(lambda)
        } else {
            UriResource::LambdaAny(lambda)
        })
    }

    fn entity_set(&mut self, name: &str) -> Result<UriResource, ParserError> {
        let container = self.parser.container()?;
        let entity_set = container
            .entity_set(name)
            .ok_or_else(|| semantic(SemanticMessageKey::ResourceNotFound, &[name]))?;
        let entity_type = entity_type_of(self.parser.edm, &entity_set.entity_type)?;
        let keys = if self.tokens.peek().kind == TokenKind::OpenParen {
            key_predicate(self.parser.edm, &mut self.tokens, &entity_type, self.aliases)?
        } else {
            Vec::new()
        };
        Ok(UriResource::EntitySet(UriResourceEntitySet {
            entity_set: Arc::clone(entity_set),
            entity_type,
            keys,
            type_filter_on_collection: None,
            type_filter_on_entry: None,
        }))
    }

    /// `$root/EntitySet(key)` or `$root/Singleton`.
    fn root(&mut self) -> Result<UriResource, ParserError> {
        self.tokens.expect(TokenKind::Slash)?;
        let name = self.tokens.expect(TokenKind::Identifier)?.text;
        let container = self.parser.container()?;
        if container.entity_set(name).is_some() {
            return self.entity_set(name);
        }
        let singleton = container
            .singleton(name)
            .ok_or_else(|| semantic(SemanticMessageKey::ResourceNotFound, &[name]))?;
        Ok(UriResource::Singleton(UriResourceSingleton {
            singleton: Arc::clone(singleton),
            entity_type: entity_type_of(self.parser.edm, &singleton.entity_type)?,
            type_filter: None,
        }))
    }
}

fn literal(text: &str) -> Expression {
    let ty = PrimitiveValue::infer(text)
        .and_then(|v| v.kind())
        .map(EdmType::Primitive);
    Expression::Literal {
        text: text.into(),
        ty,
    }
}
