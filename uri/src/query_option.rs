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
//!
//! Every option kind has a fixed slot in [`QueryOptions`]; a second
//! occurrence of the same kind is rejected instead of overwriting the
//! first. [`QueryOptions::to_query_string`] renders the options back:
//!
//! ```text
//! $filter=PropertyInt16 eq 1&$expand=NavPropertyETTwoPrimOne($select=PropertyString)&$top=5
//! ```

use crate::error::SyntaxError;
use crate::error::SyntaxMessageKey;
use crate::expression::Expression;
use crate::resource::UriResource;
use crate::search::SearchExpression;
use odata_edm::EdmType;
use odata_edm::Namespace;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SystemQueryOptionKind {
    Filter,
    Expand,
    Select,
    OrderBy,
    Top,
    Skip,
    Count,
    Search,
    Format,
    Id,
    SkipToken,
    Levels,
}

impl SystemQueryOptionKind {
    /// All kinds in the order used for rendering.
    pub const ALL: [Self; 12] = [
        Self::Filter,
        Self::Expand,
        Self::Select,
        Self::OrderBy,
        Self::Top,
        Self::Skip,
        Self::Count,
        Self::Search,
        Self::Format,
        Self::Id,
        Self::SkipToken,
        Self::Levels,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Filter => "$filter",
            Self::Expand => "$expand",
            Self::Select => "$select",
            Self::OrderBy => "$orderby",
            Self::Top => "$top",
            Self::Skip => "$skip",
            Self::Count => "$count",
            Self::Search => "$search",
            Self::Format => "$format",
            Self::Id => "$id",
            Self::SkipToken => "$skiptoken",
            Self::Levels => "$levels",
        }
    }

    /// Kind for a query key including its `$`.
    #[must_use]
    pub fn from_name(name: &str, case_insensitive: bool) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| {
            if case_insensitive {
                kind.name().eq_ignore_ascii_case(name)
            } else {
                kind.name() == name
            }
        })
    }
}

impl Display for SystemQueryOptionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

fn wrong_value(kind: SystemQueryOptionKind, text: &str) -> SyntaxError {
    SyntaxError::new(
        SyntaxMessageKey::WrongValueForSystemQueryOption,
        &[kind.name(), text],
    )
}

/// `$format` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Format {
    Json,
    Xml,
    Atom,
    /// Media type `type/subtype`, possibly with parameters.
    Custom(String),
}

impl FromStr for Format {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else if s.eq_ignore_ascii_case("xml") {
            Ok(Self::Xml)
        } else if s.eq_ignore_ascii_case("atom") {
            Ok(Self::Atom)
        } else {
            let media_type = s.split(';').next().unwrap_or_default();
            match media_type.split_once('/') {
                Some((t, sub)) if !t.is_empty() && !sub.is_empty() && !sub.contains('/') => {
                    Ok(Self::Custom(s.into()))
                }
                _ => Err(wrong_value(SystemQueryOptionKind::Format, s)),
            }
        }
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Json => f.write_str("json"),
            Self::Xml => f.write_str("xml"),
            Self::Atom => f.write_str("atom"),
            Self::Custom(media_type) => f.write_str(media_type),
        }
    }
}

/// `$levels` value inside `$expand`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Levels {
    Max,
    Value(u32),
}

impl Levels {
    /// Parse `max` or a number not above `max_levels`.
    ///
    /// # Errors
    ///
    /// `WRONG_VALUE_FOR_SYSTEM_QUERY_OPTION` otherwise.
    pub fn parse(text: &str, max_levels: u32) -> Result<Self, SyntaxError> {
        if text == "max" {
            return Ok(Self::Max);
        }
        text.parse::<u32>()
            .ok()
            .filter(|v| text.bytes().all(|b| b.is_ascii_digit()) && *v <= max_levels)
            .map(Self::Value)
            .ok_or_else(|| wrong_value(SystemQueryOptionKind::Levels, text))
    }
}

impl Display for Levels {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Max => f.write_str("max"),
            Self::Value(v) => v.fmt(f),
        }
    }
}

/// Parse a non-negative integer for `$top` or `$skip`.
///
/// # Errors
///
/// `WRONG_VALUE_FOR_SYSTEM_QUERY_OPTION` for anything else.
pub fn parse_non_negative(kind: SystemQueryOptionKind, text: &str) -> Result<u64, SyntaxError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(wrong_value(kind, text));
    }
    text.parse().map_err(|_| wrong_value(kind, text))
}

/// Parse `$count`.
///
/// # Errors
///
/// `WRONG_VALUE_FOR_SYSTEM_QUERY_OPTION` unless `true` or `false`.
pub fn parse_count(text: &str) -> Result<bool, SyntaxError> {
    match text {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(wrong_value(SystemQueryOptionKind::Count, text)),
    }
}

#[derive(Debug, Clone)]
pub struct OrderByItem {
    pub expression: Expression,
    pub descending: bool,
}

impl Display for OrderByItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        self.expression.fmt(f)?;
        if self.descending {
            f.write_str(" desc")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SelectItem {
    pub path: Vec<UriResource>,
    pub is_star: bool,
    /// `Namespace.*`: all operations of a schema.
    pub all_operations_in_schema: Option<Namespace>,
    /// Leading type cast.
    pub type_filter: Option<EdmType>,
}

impl Display for SelectItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.is_star {
            return f.write_str("*");
        }
        if let Some(namespace) = &self.all_operations_in_schema {
            return write!(f, "{namespace}.*");
        }
        let segments = self
            .type_filter
            .iter()
            .map(|t| t.fqn().to_string())
            .chain(self.path.iter().map(ToString::to_string))
            .collect::<Vec<_>>();
        f.write_str(&segments.join("/"))
    }
}

#[derive(Debug, Clone)]
pub struct ExpandItem {
    /// Path up to and including the navigation property, with casts
    /// folded into the resources. Empty for `*`.
    pub path: Vec<UriResource>,
    pub is_star: bool,
    /// Trailing `/$ref`.
    pub is_ref: bool,
    /// Trailing `/$count`.
    pub is_count: bool,
    /// Leading type cast.
    pub type_filter: Option<EdmType>,
    /// Options in parentheses, including `$levels`.
    pub options: QueryOptions,
}

impl ExpandItem {
    #[must_use]
    pub const fn levels(&self) -> Option<Levels> {
        self.options.levels
    }
}

impl Display for ExpandItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.is_star {
            f.write_str("*")?;
        } else {
            let segments = self
                .type_filter
                .iter()
                .map(|t| t.fqn().to_string())
                .chain(self.path.iter().map(ToString::to_string))
                .collect::<Vec<_>>();
            f.write_str(&segments.join("/"))?;
        }
        if self.is_ref {
            f.write_str("/$ref")?;
        }
        if self.is_count {
            f.write_str("/$count")?;
        }
        if !self.options.is_empty() {
            write!(f, "({})", self.options.render(";"))?;
        }
        Ok(())
    }
}

/// Non-system query option, passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomQueryOption {
    pub name: String,
    pub text: String,
}

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// System query options of a request or of an expand item.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub filter: Option<Expression>,
    pub expand: Option<Vec<ExpandItem>>,
    pub select: Option<Vec<SelectItem>>,
    pub orderby: Option<Vec<OrderByItem>>,
    pub top: Option<u64>,
    pub skip: Option<u64>,
    pub count: Option<bool>,
    pub search: Option<SearchExpression>,
    pub format: Option<Format>,
    pub id: Option<String>,
    pub skiptoken: Option<String>,
    pub levels: Option<Levels>,
    texts: Vec<(SystemQueryOptionKind, String)>,
}

impl QueryOptions {
    #[must_use]
    pub const fn is_set(&self, kind: SystemQueryOptionKind) -> bool {
        match kind {
            SystemQueryOptionKind::Filter => self.filter.is_some(),
            SystemQueryOptionKind::Expand => self.expand.is_some(),
            SystemQueryOptionKind::Select => self.select.is_some(),
            SystemQueryOptionKind::OrderBy => self.orderby.is_some(),
            SystemQueryOptionKind::Top => self.top.is_some(),
            SystemQueryOptionKind::Skip => self.skip.is_some(),
            SystemQueryOptionKind::Count => self.count.is_some(),
            SystemQueryOptionKind::Search => self.search.is_some(),
            SystemQueryOptionKind::Format => self.format.is_some(),
            SystemQueryOptionKind::Id => self.id.is_some(),
            SystemQueryOptionKind::SkipToken => self.skiptoken.is_some(),
            SystemQueryOptionKind::Levels => self.levels.is_some(),
        }
    }

    /// Kinds present, in rendering order.
    #[must_use]
    pub fn kinds(&self) -> Vec<SystemQueryOptionKind> {
        SystemQueryOptionKind::ALL
            .into_iter()
            .filter(|kind| self.is_set(*kind))
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds().is_empty()
    }

    /// Option value as written in the request.
    #[must_use]
    pub fn text(&self, kind: SystemQueryOptionKind) -> Option<&str> {
        self.texts
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, text)| text.as_str())
    }

    /// Claim the slot of `kind` for `text`.
    pub(crate) fn claim(&mut self, kind: SystemQueryOptionKind, text: &str) -> Result<(), SyntaxError> {
        if self.is_set(kind) || self.text(kind).is_some() {
            return Err(SyntaxError::new(
                SyntaxMessageKey::DoubleSystemQueryOption,
                &[kind.name()],
            ));
        }
        self.texts.push((kind, text.into()));
        Ok(())
    }

    /// Value of an option rendered from its parsed form.
    #[must_use]
    pub fn value_text(&self, kind: SystemQueryOptionKind) -> Option<String> {
        Some(match kind {
            SystemQueryOptionKind::Filter => self.filter.as_ref()?.to_string(),
            SystemQueryOptionKind::Expand => join(self.expand.as_ref()?),
            SystemQueryOptionKind::Select => join(self.select.as_ref()?),
            SystemQueryOptionKind::OrderBy => join(self.orderby.as_ref()?),
            SystemQueryOptionKind::Top => self.top?.to_string(),
            SystemQueryOptionKind::Skip => self.skip?.to_string(),
            SystemQueryOptionKind::Count => self.count?.to_string(),
            SystemQueryOptionKind::Search => self.search.as_ref()?.to_string(),
            SystemQueryOptionKind::Format => self.format.as_ref()?.to_string(),
            SystemQueryOptionKind::Id => self.id.clone()?,
            SystemQueryOptionKind::SkipToken => self.skiptoken.clone()?,
            SystemQueryOptionKind::Levels => self.levels?.to_string(),
        })
    }

    fn render(&self, separator: &str) -> String {
        self.kinds()
            .into_iter()
            .filter_map(|kind| {
                self.value_text(kind)
                    .map(|value| format!("{}={value}", kind.name()))
            })
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Render the options as a query string (not percent-encoded).
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.render("&")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use odata_edm::EdmPrimitiveTypeKind;

    #[test]
    fn test_kind_names() {
        assert_eq!(
            SystemQueryOptionKind::from_name("$filter", false),
            Some(SystemQueryOptionKind::Filter)
        );
        assert_eq!(SystemQueryOptionKind::from_name("$FILTER", false), None);
        assert_eq!(
            SystemQueryOptionKind::from_name("$FILTER", true),
            Some(SystemQueryOptionKind::Filter)
        );
        assert_eq!(SystemQueryOptionKind::from_name("$apply", true), None);
    }

    #[test]
    fn test_format() {
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("XML".parse::<Format>().unwrap(), Format::Xml);
        assert_eq!(
            "application/json;odata.metadata=minimal".parse::<Format>().unwrap(),
            Format::Custom("application/json;odata.metadata=minimal".into())
        );
        for bad in ["", "yaml", "application/", "/json", "a/b/c"] {
            assert_eq!(
                bad.parse::<Format>().unwrap_err().key,
                SyntaxMessageKey::WrongValueForSystemQueryOption,
                "{bad}"
            );
        }
    }

    #[test]
    fn test_values() {
        assert_eq!(parse_non_negative(SystemQueryOptionKind::Top, "10").unwrap(), 10);
        for bad in ["", "-1", "+1", "1.0", "ten", "99999999999999999999999"] {
            assert!(parse_non_negative(SystemQueryOptionKind::Skip, bad).is_err(), "{bad}");
        }
        assert!(parse_count("true").unwrap());
        assert!(parse_count("True").is_err());
        assert_eq!(Levels::parse("max", 3).unwrap(), Levels::Max);
        assert_eq!(Levels::parse("2", 3).unwrap(), Levels::Value(2));
        assert!(Levels::parse("4", 3).is_err());
        assert!(Levels::parse("-1", 3).is_err());
    }

    #[test]
    fn test_claim_twice() {
        let mut options = QueryOptions::default();
        options.claim(SystemQueryOptionKind::Top, "1").unwrap();
        options.top = Some(1);
        let err = options.claim(SystemQueryOptionKind::Top, "2").unwrap_err();
        assert_eq!(err.key, SyntaxMessageKey::DoubleSystemQueryOption);
        assert_eq!(err.params, vec!["$top".to_string()]);
        assert_eq!(options.text(SystemQueryOptionKind::Top), Some("1"));
    }

    #[test]
    fn test_to_query_string() {
        let mut nested = QueryOptions::default();
        nested.levels = Some(Levels::Max);
        nested.top = Some(2);
        let mut options = QueryOptions::default();
        options.expand = Some(vec![ExpandItem {
            path: Vec::new(),
            is_star: true,
            is_ref: false,
            is_count: false,
            type_filter: None,
            options: nested,
        }]);
        options.filter = Some(Expression::Literal {
            text: "true".into(),
            ty: Some(EdmType::Primitive(EdmPrimitiveTypeKind::Boolean)),
        });
        options.count = Some(true);
        options.format = Some(Format::Json);
        assert_eq!(
            options.to_query_string(),
            "$filter=true&$expand=*($top=2;$levels=max)&$count=true&$format=json"
        );
        assert_eq!(
            options.kinds(),
            vec![
                SystemQueryOptionKind::Filter,
                SystemQueryOptionKind::Expand,
                SystemQueryOptionKind::Count,
                SystemQueryOptionKind::Format
            ]
        );
    }
}
