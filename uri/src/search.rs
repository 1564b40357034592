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

//! `$search` expressions.
//!
//! Grammar, loosest first: `OR`, `AND` (explicit or implied by
//! juxtaposition), `NOT`, then terms, `"phrases"` and parentheses.

use crate::config::ParserConfig;
use crate::error::SyntaxError;
use crate::error::SyntaxMessageKey;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchExpression {
    Term(String),
    Phrase(String),
    Not(Box<SearchExpression>),
    And(Box<SearchExpression>, Box<SearchExpression>),
    Or(Box<SearchExpression>, Box<SearchExpression>),
}

impl SearchExpression {
    const fn precedence(&self) -> u8 {
        match self {
            Self::Or(..) => 1,
            Self::And(..) => 2,
            Self::Not(_) => 3,
            Self::Term(_) | Self::Phrase(_) => 4,
        }
    }

    fn fmt_operand(&self, f: &mut Formatter<'_>, min: u8) -> FmtResult {
        if self.precedence() < min {
            write!(f, "({self})")
        } else {
            self.fmt(f)
        }
    }
}

impl Display for SearchExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Term(term) => f.write_str(term),
            Self::Phrase(phrase) => write!(f, "\"{}\"", phrase.replace('"', "\\\"")),
            Self::Not(operand) => {
                f.write_str("NOT ")?;
                operand.fmt_operand(f, 3)
            }
            Self::And(left, right) => {
                left.fmt_operand(f, 2)?;
                f.write_str(" AND ")?;
                right.fmt_operand(f, 3)
            }
            Self::Or(left, right) => {
                left.fmt_operand(f, 1)?;
                f.write_str(" OR ")?;
                right.fmt_operand(f, 2)
            }
        }
    }
}

impl SearchExpression {
    /// Parse `text` allowing at most `max_depth` nested parentheses and
    /// `NOT` operators.
    ///
    /// # Errors
    ///
    /// - `TOO_DEEPLY_NESTED` past `max_depth`
    /// - `SYNTAX` if `text` is not a search expression.
    pub fn parse_nested(text: &str, max_depth: usize) -> Result<Self, SyntaxError> {
        let tokens = tokenize(text)?;
        let mut parser = SearchParser {
            text,
            tokens,
            pos: 0,
            depth: 0,
            max_depth,
        };
        let expression = parser.or()?;
        if parser.pos == parser.tokens.len() {
            Ok(expression)
        } else {
            Err(parser.syntax())
        }
    }
}

impl FromStr for SearchExpression {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_nested(s, ParserConfig::default().max_nesting_depth)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SearchToken {
    Open,
    Close,
    And,
    Or,
    Not,
    Word(String),
    Phrase(String),
}

fn tokenize(text: &str) -> Result<Vec<SearchToken>, SyntaxError> {
    let syntax = || SyntaxError::new(SyntaxMessageKey::Syntax, &["$search", text]);
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '(' => tokens.push(SearchToken::Open),
            ')' => tokens.push(SearchToken::Close),
            '"' => {
                let mut phrase = String::new();
                loop {
                    match chars.next() {
                        Some('\\') => phrase.push(chars.next().ok_or_else(syntax)?),
                        Some('"') => break,
                        Some(c) => phrase.push(c),
                        None => return Err(syntax()),
                    }
                }
                if phrase.is_empty() {
                    return Err(syntax());
                }
                tokens.push(SearchToken::Phrase(phrase));
            }
            c => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_whitespace() || matches!(next, '(' | ')' | '"') {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                tokens.push(match word.as_str() {
                    "AND" => SearchToken::And,
                    "OR" => SearchToken::Or,
                    "NOT" => SearchToken::Not,
                    _ => SearchToken::Word(word),
                });
            }
        }
    }
    Ok(tokens)
}

struct SearchParser<'a> {
    text: &'a str,
    tokens: Vec<SearchToken>,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl SearchParser<'_> {
    fn syntax(&self) -> SyntaxError {
        SyntaxError::new(SyntaxMessageKey::Syntax, &["$search", self.text])
    }

    fn peek(&self) -> Option<&SearchToken> {
        self.tokens.get(self.pos)
    }

    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, SyntaxError>,
    ) -> Result<T, SyntaxError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(SyntaxError::new(
                SyntaxMessageKey::TooDeeplyNested,
                &[&self.depth.to_string()],
            ));
        }
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn or(&mut self) -> Result<SearchExpression, SyntaxError> {
        let mut left = self.and()?;
        while self.peek() == Some(&SearchToken::Or) {
            self.pos += 1;
            let right = self.and()?;
            left = SearchExpression::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<SearchExpression, SyntaxError> {
        let mut left = self.not()?;
        loop {
            match self.peek() {
                Some(SearchToken::And) => self.pos += 1,
                Some(
                    SearchToken::Not
                    | SearchToken::Open
                    | SearchToken::Word(_)
                    | SearchToken::Phrase(_),
                ) => {}
                _ => return Ok(left),
            }
            let right = self.not()?;
            left = SearchExpression::And(Box::new(left), Box::new(right));
        }
    }

    fn not(&mut self) -> Result<SearchExpression, SyntaxError> {
        if self.peek() == Some(&SearchToken::Not) {
            self.pos += 1;
            let operand = self.nested(Self::not)?;
            return Ok(SearchExpression::Not(Box::new(operand)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<SearchExpression, SyntaxError> {
        let token = self.peek().cloned().ok_or_else(|| self.syntax())?;
        self.pos += 1;
        match token {
            SearchToken::Word(word) => Ok(SearchExpression::Term(word)),
            SearchToken::Phrase(phrase) => Ok(SearchExpression::Phrase(phrase)),
            SearchToken::Open => {
                let inner = self.nested(Self::or)?;
                if self.peek() == Some(&SearchToken::Close) {
                    self.pos += 1;
                    Ok(inner)
                } else {
                    Err(self.syntax())
                }
            }
            SearchToken::Close | SearchToken::And | SearchToken::Or | SearchToken::Not => {
                Err(self.syntax())
            }
        }
    }
}
