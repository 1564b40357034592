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

//! Common expressions of `$filter` and `$orderby`.

use crate::error::SemanticError;
use crate::error::SemanticMessageKey;
use crate::resource::UriResource;
use odata_edm::EdmEnumType;
use odata_edm::EdmPrimitiveTypeKind;
use odata_edm::EdmType;
use std::convert::Infallible;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Has,
    Mul,
    Div,
    DivBy,
    Mod,
    Add,
    Sub,
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
    And,
    Or,
    In,
}

impl BinaryOperator {
    pub const ALL: [Self; 16] = [
        Self::Has,
        Self::Mul,
        Self::Div,
        Self::DivBy,
        Self::Mod,
        Self::Add,
        Self::Sub,
        Self::Gt,
        Self::Ge,
        Self::Lt,
        Self::Le,
        Self::Eq,
        Self::Ne,
        Self::And,
        Self::Or,
        Self::In,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Has => "has",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::DivBy => "divby",
            Self::Mod => "mod",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::And => "and",
            Self::Or => "or",
            Self::In => "in",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Binding power, higher binds tighter. `in` shares the relational
    /// level.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq | Self::Ne => 3,
            Self::Gt | Self::Ge | Self::Lt | Self::Le | Self::In => 4,
            Self::Add | Self::Sub => 5,
            Self::Mul | Self::Div | Self::DivBy | Self::Mod => 6,
            Self::Has => 7,
        }
    }

    /// Result type of the operator, checking its operand types. Unknown
    /// operand types (`null`, aliases) are not checked.
    ///
    /// # Errors
    ///
    /// `TYPE_MISMATCH` if the operands do not fit the operator.
    pub fn result_type(
        self,
        left: Option<&EdmType>,
        right: Option<&EdmType>,
    ) -> Result<Option<EdmType>, SemanticError> {
        let mismatch = || {
            SemanticError::new(
                SemanticMessageKey::TypeMismatch,
                &[
                    self.name(),
                    &left.map_or_else(|| "null".into(), ToString::to_string),
                    &right.map_or_else(|| "null".into(), ToString::to_string),
                ],
            )
        };
        match self {
            Self::And | Self::Or => {
                if left.is_some_and(|t| !is_boolean(t)) || right.is_some_and(|t| !is_boolean(t)) {
                    return Err(mismatch());
                }
                Ok(Some(boolean()))
            }
            Self::Eq | Self::Ne | Self::Gt | Self::Ge | Self::Lt | Self::Le => {
                match (left, right) {
                    (Some(l), Some(r)) if !comparable(l, r) => Err(mismatch()),
                    _ => Ok(Some(boolean())),
                }
            }
            Self::Has => match (left, right) {
                (Some(EdmType::Enum(l)), Some(EdmType::Enum(r))) if l.name != r.name => {
                    Err(mismatch())
                }
                (Some(l), _) if !matches!(l, EdmType::Enum(_)) => Err(mismatch()),
                _ => Ok(Some(boolean())),
            },
            Self::In => Ok(Some(boolean())),
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::DivBy | Self::Mod => {
                match (left, right) {
                    (Some(l), Some(r)) => arithmetic(self, l, r).map(Some).ok_or_else(mismatch),
                    (Some(known), None) | (None, Some(known)) => {
                        if known.as_primitive().is_some() {
                            Ok(Some(known.clone()))
                        } else {
                            Err(mismatch())
                        }
                    }
                    (None, None) => Ok(None),
                }
            }
        }
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Minus,
    Not,
}

impl UnaryOperator {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Minus => "-",
            Self::Not => "not",
        }
    }

    /// # Errors
    ///
    /// `TYPE_MISMATCH` for `not` on a non-Boolean or `-` on a
    /// non-numeric operand.
    pub fn result_type(self, operand: Option<&EdmType>) -> Result<Option<EdmType>, SemanticError> {
        let Some(t) = operand else {
            return Ok(match self {
                Self::Not => Some(boolean()),
                Self::Minus => None,
            });
        };
        let ok = match self {
            Self::Not => is_boolean(t),
            Self::Minus => t
                .as_primitive()
                .is_some_and(|k| k.is_numeric() || k == EdmPrimitiveTypeKind::Duration),
        };
        if ok {
            Ok(Some(t.clone()))
        } else {
            Err(SemanticError::new(
                SemanticMessageKey::TypeMismatch,
                &[self.name(), &t.to_string()],
            ))
        }
    }
}

impl Display for UnaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

macro_rules! method_kinds {
    ($($variant:ident => $name:literal, $min:literal..=$max:literal;)+) => {
        /// Built-in method of common expressions.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum MethodKind {
            $($variant,)+
        }

        impl MethodKind {
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            /// Inclusive range of accepted parameter counts.
            #[must_use]
            pub const fn arity(self) -> (usize, usize) {
                match self {
                    $(Self::$variant => ($min, $max),)+
                }
            }
        }
    };
}

method_kinds! {
    Contains => "contains", 2..=2;
    StartsWith => "startswith", 2..=2;
    EndsWith => "endswith", 2..=2;
    Length => "length", 1..=1;
    IndexOf => "indexof", 2..=2;
    Substring => "substring", 2..=3;
    ToLower => "tolower", 1..=1;
    ToUpper => "toupper", 1..=1;
    Trim => "trim", 1..=1;
    Concat => "concat", 2..=2;
    Year => "year", 1..=1;
    Month => "month", 1..=1;
    Day => "day", 1..=1;
    Hour => "hour", 1..=1;
    Minute => "minute", 1..=1;
    Second => "second", 1..=1;
    FractionalSeconds => "fractionalseconds", 1..=1;
    TotalSeconds => "totalseconds", 1..=1;
    Date => "date", 1..=1;
    Time => "time", 1..=1;
    TotalOffsetMinutes => "totaloffsetminutes", 1..=1;
    MinDateTime => "mindatetime", 0..=0;
    MaxDateTime => "maxdatetime", 0..=0;
    Now => "now", 0..=0;
    Round => "round", 1..=1;
    Floor => "floor", 1..=1;
    Ceiling => "ceiling", 1..=1;
    GeoDistance => "geo.distance", 2..=2;
    GeoLength => "geo.length", 1..=1;
    GeoIntersects => "geo.intersects", 2..=2;
    Cast => "cast", 1..=2;
    IsOf => "isof", 1..=2;
}

impl MethodKind {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.name() == name)
    }

    /// Result type for the given parameters. `cast` yields its type
    /// argument, `round`, `floor` and `ceiling` keep the numeric type of
    /// their argument.
    #[must_use]
    pub fn result_type(self, parameters: &[Expression]) -> Option<EdmType> {
        use EdmPrimitiveTypeKind as K;
        let kind = match self {
            Self::Contains
            | Self::StartsWith
            | Self::EndsWith
            | Self::GeoIntersects
            | Self::IsOf => K::Boolean,
            Self::Length
            | Self::IndexOf
            | Self::Year
            | Self::Month
            | Self::Day
            | Self::Hour
            | Self::Minute
            | Self::Second
            | Self::TotalOffsetMinutes => K::Int32,
            Self::Substring | Self::ToLower | Self::ToUpper | Self::Trim | Self::Concat => {
                K::String
            }
            Self::FractionalSeconds | Self::TotalSeconds => K::Decimal,
            Self::Date => K::Date,
            Self::Time => K::TimeOfDay,
            Self::MinDateTime | Self::MaxDateTime | Self::Now => K::DateTimeOffset,
            Self::GeoDistance | Self::GeoLength => K::Double,
            Self::Round | Self::Floor | Self::Ceiling => {
                return parameters.first().and_then(Expression::ty);
            }
            Self::Cast => {
                return parameters.iter().rev().find_map(|p| match p {
                    Expression::TypeLiteral(t) => Some(t.clone()),
                    _ => None,
                });
            }
        };
        Some(EdmType::Primitive(kind))
    }
}

impl Display for MethodKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

pub(crate) fn boolean() -> EdmType {
    EdmType::Primitive(EdmPrimitiveTypeKind::Boolean)
}

pub(crate) fn is_boolean(t: &EdmType) -> bool {
    t.as_primitive() == Some(EdmPrimitiveTypeKind::Boolean)
}

fn comparable(left: &EdmType, right: &EdmType) -> bool {
    use EdmPrimitiveTypeKind as K;
    match (left, right) {
        (EdmType::Enum(_), r) | (r, EdmType::Enum(_))
            if r.as_primitive() == Some(K::String) =>
        {
            return true;
        }
        _ => {}
    }
    match (left.as_primitive(), right.as_primitive()) {
        (Some(l), Some(r)) => {
            l == r || (l.is_numeric() && r.is_numeric()) || l.is_compatible(r) || r.is_compatible(l)
        }
        _ => left.is_compatible_with(right) || right.is_compatible_with(left),
    }
}

fn promote(left: EdmPrimitiveTypeKind, right: EdmPrimitiveTypeKind) -> EdmPrimitiveTypeKind {
    if left.is_compatible(right) {
        left
    } else if right.is_compatible(left) {
        right
    } else if left.is_integer() && right.is_integer() {
        EdmPrimitiveTypeKind::Int16
    } else {
        EdmPrimitiveTypeKind::Double
    }
}

fn arithmetic(op: BinaryOperator, left: &EdmType, right: &EdmType) -> Option<EdmType> {
    use EdmPrimitiveTypeKind as K;
    let (l, r) = (left.as_primitive()?, right.as_primitive()?);
    let kind = match (l, r) {
        (l, r) if l.is_numeric() && r.is_numeric() => {
            let kind = promote(l, r);
            if op == BinaryOperator::DivBy {
                promote(kind, K::Decimal)
            } else {
                kind
            }
        }
        (K::Date | K::DateTimeOffset | K::Duration, K::Duration)
            if matches!(op, BinaryOperator::Add | BinaryOperator::Sub) =>
        {
            l
        }
        (K::Date, K::Date) | (K::DateTimeOffset, K::DateTimeOffset)
            if op == BinaryOperator::Sub =>
        {
            K::Duration
        }
        _ => return None,
    };
    Some(EdmType::Primitive(kind))
}

/// Node of a common expression tree.
#[derive(Debug, Clone)]
pub enum Expression {
    Binary {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
        ty: Option<EdmType>,
    },
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
        ty: Option<EdmType>,
    },
    Method {
        method: MethodKind,
        parameters: Vec<Expression>,
    },
    /// Literal text, `ty` is `None` for `null` and untyped geo literals.
    Literal {
        text: String,
        ty: Option<EdmType>,
    },
    /// Path relative to `$it`, `$root` or a lambda variable.
    Member {
        resources: Vec<UriResource>,
        start_type_filter: Option<EdmType>,
    },
    /// `@name`, value taken from the alias table.
    Alias(String),
    /// Type argument of `cast` and `isof`.
    TypeLiteral(EdmType),
    Enum {
        ty: Arc<EdmEnumType>,
        values: Vec<String>,
    },
    /// Bare lambda variable, e.g. `d` in `any(d:d eq 'x')`.
    LambdaRef {
        variable: String,
        ty: EdmType,
    },
    /// Right operand of `in`.
    List(Vec<Expression>),
}

impl Expression {
    /// Type of the expression where it can be known.
    #[must_use]
    pub fn ty(&self) -> Option<EdmType> {
        match self {
            Self::Binary { ty, .. } | Self::Unary { ty, .. } | Self::Literal { ty, .. } => {
                ty.clone()
            }
            Self::Method { method, parameters } => method.result_type(parameters),
            Self::Member {
                resources,
                start_type_filter,
            } => match resources.last() {
                Some(last) => last.edm_type(),
                None => start_type_filter.clone(),
            },
            Self::Enum { ty, .. } => Some(EdmType::Enum(Arc::clone(ty))),
            Self::LambdaRef { ty, .. } => Some(ty.clone()),
            Self::Alias(_) | Self::TypeLiteral(_) | Self::List(_) => None,
        }
    }

    /// Walk the tree bottom-up.
    ///
    /// # Errors
    ///
    /// Whatever the visitor returns.
    pub fn accept<T, V: ExpressionVisitor<T>>(&self, visitor: &mut V) -> Result<T, V::Error> {
        match self {
            Self::Binary {
                op, left, right, ..
            } => {
                let left = left.accept(visitor)?;
                let right = right.accept(visitor)?;
                visitor.visit_binary(*op, left, right)
            }
            Self::Unary { op, operand, .. } => {
                let operand = operand.accept(visitor)?;
                visitor.visit_unary(*op, operand)
            }
            Self::Method { method, parameters } => {
                let parameters = parameters
                    .iter()
                    .map(|p| p.accept(visitor))
                    .collect::<Result<Vec<_>, _>>()?;
                visitor.visit_method(*method, parameters)
            }
            Self::Literal { text, ty } => visitor.visit_literal(text, ty.as_ref()),
            Self::Member {
                resources,
                start_type_filter,
            } => visitor.visit_member(resources, start_type_filter.as_ref()),
            Self::Alias(name) => visitor.visit_alias(name),
            Self::TypeLiteral(t) => visitor.visit_type_literal(t),
            Self::Enum { ty, values } => visitor.visit_enum(ty, values),
            Self::LambdaRef { variable, .. } => visitor.visit_lambda_reference(variable),
            Self::List(items) => {
                let items = items
                    .iter()
                    .map(|p| p.accept(visitor))
                    .collect::<Result<Vec<_>, _>>()?;
                visitor.visit_list(items)
            }
        }
    }
}

/// Bottom-up consumer of an [`Expression`], e.g. an evaluator or a
/// translator to a query language.
pub trait ExpressionVisitor<T> {
    type Error;

    /// # Errors
    /// Visitor-defined.
    fn visit_binary(&mut self, op: BinaryOperator, left: T, right: T) -> Result<T, Self::Error>;

    /// # Errors
    /// Visitor-defined.
    fn visit_unary(&mut self, op: UnaryOperator, operand: T) -> Result<T, Self::Error>;

    /// # Errors
    /// Visitor-defined.
    fn visit_method(&mut self, method: MethodKind, parameters: Vec<T>) -> Result<T, Self::Error>;

    /// # Errors
    /// Visitor-defined.
    fn visit_literal(&mut self, text: &str, ty: Option<&EdmType>) -> Result<T, Self::Error>;

    /// Lambda bodies inside `resources` are not visited automatically.
    ///
    /// # Errors
    /// Visitor-defined.
    fn visit_member(
        &mut self,
        resources: &[UriResource],
        start_type_filter: Option<&EdmType>,
    ) -> Result<T, Self::Error>;

    /// # Errors
    /// Visitor-defined.
    fn visit_alias(&mut self, name: &str) -> Result<T, Self::Error>;

    /// # Errors
    /// Visitor-defined.
    fn visit_type_literal(&mut self, ty: &EdmType) -> Result<T, Self::Error>;

    /// # Errors
    /// Visitor-defined.
    fn visit_enum(&mut self, ty: &EdmEnumType, values: &[String]) -> Result<T, Self::Error>;

    /// # Errors
    /// Visitor-defined.
    fn visit_lambda_reference(&mut self, variable: &str) -> Result<T, Self::Error>;

    /// # Errors
    /// Visitor-defined.
    fn visit_list(&mut self, items: Vec<T>) -> Result<T, Self::Error>;
}

/// Renders an expression back to URI text, adding parentheses only
/// where precedence needs them.
struct Printer;

struct Printed {
    text: String,
    precedence: u8,
}

const ATOM: u8 = u8::MAX;

impl Printed {
    fn atom(text: String) -> Self {
        Self {
            text,
            precedence: ATOM,
        }
    }

    fn wrapped(self, min: u8) -> String {
        if self.precedence < min {
            format!("({})", self.text)
        } else {
            self.text
        }
    }
}

impl ExpressionVisitor<Printed> for Printer {
    type Error = Infallible;

    fn visit_binary(
        &mut self,
        op: BinaryOperator,
        left: Printed,
        right: Printed,
    ) -> Result<Printed, Infallible> {
        let p = op.precedence();
        Ok(Printed {
            text: format!("{} {op} {}", left.wrapped(p), right.wrapped(p + 1)),
            precedence: p,
        })
    }

    fn visit_unary(&mut self, op: UnaryOperator, operand: Printed) -> Result<Printed, Infallible> {
        let text = match op {
            UnaryOperator::Minus => format!("-{}", operand.wrapped(ATOM)),
            UnaryOperator::Not => format!("not {}", operand.wrapped(ATOM)),
        };
        Ok(Printed {
            text,
            precedence: ATOM - 1,
        })
    }

    fn visit_method(
        &mut self,
        method: MethodKind,
        parameters: Vec<Printed>,
    ) -> Result<Printed, Infallible> {
        let parameters = parameters
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join(",");
        Ok(Printed::atom(format!("{method}({parameters})")))
    }

    fn visit_literal(&mut self, text: &str, _: Option<&EdmType>) -> Result<Printed, Infallible> {
        Ok(Printed::atom(text.into()))
    }

    fn visit_member(
        &mut self,
        resources: &[UriResource],
        start_type_filter: Option<&EdmType>,
    ) -> Result<Printed, Infallible> {
        let path = start_type_filter
            .map(|t| t.fqn().to_string())
            .into_iter()
            .chain(resources.iter().map(ToString::to_string))
            .collect::<Vec<_>>()
            .join("/");
        Ok(Printed::atom(path))
    }

    fn visit_alias(&mut self, name: &str) -> Result<Printed, Infallible> {
        Ok(Printed::atom(name.into()))
    }

    fn visit_type_literal(&mut self, ty: &EdmType) -> Result<Printed, Infallible> {
        Ok(Printed::atom(ty.fqn().to_string()))
    }

    fn visit_enum(&mut self, ty: &EdmEnumType, values: &[String]) -> Result<Printed, Infallible> {
        Ok(Printed::atom(format!("{}'{}'", ty.name, values.join(","))))
    }

    fn visit_lambda_reference(&mut self, variable: &str) -> Result<Printed, Infallible> {
        Ok(Printed::atom(variable.into()))
    }

    fn visit_list(&mut self, items: Vec<Printed>) -> Result<Printed, Infallible> {
        let items = items
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join(",");
        Ok(Printed::atom(format!("({items})")))
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.accept(&mut Printer) {
            Ok(printed) => f.write_str(&printed.text),
            Err(never) => match never {},
        }
    }
}
