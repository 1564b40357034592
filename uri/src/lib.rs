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

//! OData v4 request URI parsing and validation.
//!
//! [`Parser`] turns the path, query and fragment of a request URI into
//! a [`UriInfo`] resolved against an [`odata_edm::Edm`]. [`UriValidator`]
//! checks the parsed request against the HTTP method, and
//! [`UriHelper`] builds canonical URLs, key predicates and context URLs.

/// Error kinds and message keys
pub mod error;

/// Parser limits and switches
pub mod config;

/// Tokenizer of path segments and option values
pub mod lexer;

/// Resource path segments
pub mod resource;

/// Expression tree of `$filter`, `$orderby` and friends
pub mod expression;

/// `$search` expressions
pub mod search;

/// System and custom query options
pub mod query_option;

/// Parse result
pub mod info;

/// URI parser
pub mod parser;

/// Method and option validation
pub mod validator;

/// Canonical and context URL construction
pub mod helper;

#[doc(inline)]
pub use config::ParserConfig;
#[doc(inline)]
pub use error::DeserializerError;
#[doc(inline)]
pub use error::ParserError;
#[doc(inline)]
pub use error::SemanticError;
#[doc(inline)]
pub use error::SyntaxError;
#[doc(inline)]
pub use error::ValidationError;
#[doc(inline)]
pub use expression::BinaryOperator;
#[doc(inline)]
pub use expression::Expression;
#[doc(inline)]
pub use expression::ExpressionVisitor;
#[doc(inline)]
pub use expression::MethodKind;
#[doc(inline)]
pub use expression::UnaryOperator;
#[doc(inline)]
pub use helper::ContextUrl;
#[doc(inline)]
pub use helper::EntityKey;
#[doc(inline)]
pub use helper::HelperError;
#[doc(inline)]
pub use helper::Suffix;
#[doc(inline)]
pub use helper::UriHelper;
#[doc(inline)]
pub use info::UriInfo;
#[doc(inline)]
pub use info::UriInfoKind;
#[doc(inline)]
pub use parser::Parser;
#[doc(inline)]
pub use query_option::ExpandItem;
#[doc(inline)]
pub use query_option::QueryOptions;
#[doc(inline)]
pub use query_option::SelectItem;
#[doc(inline)]
pub use query_option::SystemQueryOptionKind;
#[doc(inline)]
pub use resource::UriResource;
#[doc(inline)]
pub use resource::UriResourceKind;
#[doc(inline)]
pub use search::SearchExpression;
#[doc(inline)]
pub use validator::UriValidator;
