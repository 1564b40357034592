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

//! Parser, validator and helper errors.
//!
//! Every client error carries a message key from a closed set plus the
//! offending text (segment, option name, literal) as parameters.

use http::StatusCode;
use odata_edm::Error as EdmError;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

macro_rules! message_keys {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal,)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
                f.write_str(self.as_str())
            }
        }
    };
}

message_keys!(
    /// Raw text does not match the URI grammar.
    SyntaxMessageKey {
        Syntax => "SYNTAX",
        UnknownSystemQueryOption => "UNKNOWN_SYSTEM_QUERY_OPTION",
        DoubleSystemQueryOption => "DOUBLE_SYSTEM_QUERY_OPTION",
        WrongValueForSystemQueryOption => "WRONG_VALUE_FOR_SYSTEM_QUERY_OPTION",
        SystemQueryOptionLevelsNotAllowedHere => "SYSTEM_QUERY_OPTION_LEVELS_NOT_ALLOWED_HERE",
        MustBeLastSegment => "MUST_BE_LAST_SEGMENT",
        DuplicatedAlias => "DUPLICATED_ALIAS",
        TooDeeplyNested => "TOO_DEEPLY_NESTED",
        WrongPercentEncoding => "WRONG_PERCENT_ENCODING",
    }
);

message_keys!(
    /// Grammatically valid text that cannot be resolved against the model.
    SemanticMessageKey {
        ResourceNotFound => "RESOURCE_NOT_FOUND",
        PropertyNotInType => "PROPERTY_NOT_IN_TYPE",
        PropertyAfterCollection => "PROPERTY_AFTER_COLLECTION",
        ExpressionPropertyNotInType => "EXPRESSION_PROPERTY_NOT_IN_TYPE",
        UnknownType => "UNKNOWN_TYPE",
        IncompatibleTypeFilter => "INCOMPATIBLE_TYPE_FILTER",
        TypeFilterNotChainable => "TYPE_FILTER_NOT_CHAINABLE",
        FunctionNotFound => "FUNCTION_NOT_FOUND",
        ActionNotFound => "ACTION_NOT_FOUND",
        KeyNotAllowed => "KEY_NOT_ALLOWED",
        InvalidKeyProperty => "INVALID_KEY_PROPERTY",
        DoubleKeyProperty => "DOUBLE_KEY_PROPERTY",
        WrongNumberOfKeyProperties => "WRONG_NUMBER_OF_KEY_PROPERTIES",
        NotAMediaResource => "NOT_A_MEDIA_RESOURCE",
        OnlyForTypedParts => "ONLY_FOR_TYPED_PARTS",
        OnlyForCollections => "ONLY_FOR_COLLECTIONS",
        OnlyForStructuralTypes => "ONLY_FOR_STRUCTURAL_TYPES",
        OnlyForPrimitiveTypes => "ONLY_FOR_PRIMITIVE_TYPES",
        OnlyForEntityTypes => "ONLY_FOR_ENTITY_TYPES",
        TypeMismatch => "TYPE_MISMATCH",
        UnknownAlias => "UNKNOWN_ALIAS",
        UnknownPart => "UNKNOWN_PART",
    }
);

message_keys!(
    /// Valid request whose options or method do not fit the resource.
    ValidationMessageKey {
        SystemQueryOptionNotAllowed => "SYSTEM_QUERY_OPTION_NOT_ALLOWED",
        SystemQueryOptionNotAllowedForHttpMethod => "SYSTEM_QUERY_OPTION_NOT_ALLOWED_FOR_HTTP_METHOD",
        UnsupportedHttpMethod => "UNSUPPORTED_HTTP_METHOD",
    }
);

message_keys!(
    /// Entity id or binding link that does not address an entity.
    DeserializerMessageKey {
        InvalidEntityBindingLink => "INVALID_ENTITY_BINDING_LINK",
    }
);

fn write_params(f: &mut Formatter<'_>, key: &str, params: &[String]) -> FmtResult {
    f.write_str(key)?;
    if !params.is_empty() {
        write!(f, ": {}", params.join(", "))?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub key: SyntaxMessageKey,
    pub params: Vec<String>,
}

impl SyntaxError {
    #[must_use]
    pub fn new(key: SyntaxMessageKey, params: &[&str]) -> Self {
        Self {
            key,
            params: params.iter().map(|p| (*p).to_string()).collect(),
        }
    }
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write_params(f, self.key.as_str(), &self.params)
    }
}

impl StdError for SyntaxError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticError {
    pub key: SemanticMessageKey,
    pub params: Vec<String>,
}

impl SemanticError {
    #[must_use]
    pub fn new(key: SemanticMessageKey, params: &[&str]) -> Self {
        Self {
            key,
            params: params.iter().map(|p| (*p).to_string()).collect(),
        }
    }
}

impl Display for SemanticError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write_params(f, self.key.as_str(), &self.params)
    }
}

impl StdError for SemanticError {}

/// Failure of [`crate::Parser::parse_uri`].
#[derive(Debug)]
pub enum ParserError {
    Syntax(SyntaxError),
    Semantic(SemanticError),
    /// Schema defect or provider failure met while resolving.
    Edm(EdmError),
}

impl ParserError {
    /// Message key of the error, `None` for schema defects.
    #[must_use]
    pub const fn message_key(&self) -> Option<&'static str> {
        match self {
            Self::Syntax(err) => Some(err.key.as_str()),
            Self::Semantic(err) => Some(err.key.as_str()),
            Self::Edm(_) => None,
        }
    }

    /// HTTP status to answer with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Syntax(_) => StatusCode::BAD_REQUEST,
            Self::Semantic(err) if err.key == SemanticMessageKey::ResourceNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::Semantic(_) => StatusCode::BAD_REQUEST,
            Self::Edm(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Display for ParserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Syntax(err) => write!(f, "syntax error: {err}"),
            Self::Semantic(err) => write!(f, "semantic error: {err}"),
            Self::Edm(err) => write!(f, "schema error: {err}"),
        }
    }
}

impl StdError for ParserError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Syntax(err) => Some(err),
            Self::Semantic(err) => Some(err),
            Self::Edm(err) => Some(err),
        }
    }
}

impl From<SyntaxError> for ParserError {
    fn from(err: SyntaxError) -> Self {
        Self::Syntax(err)
    }
}

impl From<SemanticError> for ParserError {
    fn from(err: SemanticError) -> Self {
        Self::Semantic(err)
    }
}

impl From<EdmError> for ParserError {
    fn from(err: EdmError) -> Self {
        Self::Edm(err)
    }
}

/// Failure of [`crate::UriValidator::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub key: ValidationMessageKey,
    pub params: Vec<String>,
}

impl ValidationError {
    #[must_use]
    pub fn new(key: ValidationMessageKey, params: &[&str]) -> Self {
        Self {
            key,
            params: params.iter().map(|p| (*p).to_string()).collect(),
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self.key {
            ValidationMessageKey::UnsupportedHttpMethod => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write_params(f, self.key.as_str(), &self.params)
    }
}

impl StdError for ValidationError {}

/// Failure of [`crate::UriHelper::parse_entity_id`].
#[derive(Debug)]
pub struct DeserializerError {
    pub key: DeserializerMessageKey,
    pub params: Vec<String>,
    pub source: Option<ParserError>,
}

impl DeserializerError {
    #[must_use]
    pub fn invalid_entity_binding_link(entity_id: &str, source: Option<ParserError>) -> Self {
        Self {
            key: DeserializerMessageKey::InvalidEntityBindingLink,
            params: vec![entity_id.to_string()],
            source,
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

impl Display for DeserializerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write_params(f, self.key.as_str(), &self.params)?;
        if let Some(source) = &self.source {
            write!(f, "\n{source}")?;
        }
        Ok(())
    }
}

impl StdError for DeserializerError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|err| err as &(dyn StdError + 'static))
    }
}
