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

//! Tokenizer for resource path segments and common expressions.
//!
//! Input is percent-decoded text. Literals are recognized by shape and
//! checked with [`PrimitiveValue::infer`], keywords like `eq` or `and`
//! stay identifiers and are interpreted by the parser.

use crate::error::SyntaxError;
use crate::error::SyntaxMessageKey;
use odata_edm::PrimitiveValue;
use percent_encoding::percent_decode_str;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Simple or dot-qualified identifier.
    Identifier,
    /// Primitive literal, including `null`, `true`, `INF` and prefixed
    /// forms such as `duration'P1D'`.
    Literal,
    /// `Namespace.EnumType'Member'`.
    EnumLiteral,
    /// `@name`.
    Alias,
    /// `$it`, `$root`, `$count` and other `$` keywords.
    Dollar,
    OpenParen,
    CloseParen,
    Comma,
    Slash,
    Equals,
    Semicolon,
    Colon,
    Star,
    Minus,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub offset: usize,
    /// Whitespace precedes the token. Word operators need it.
    pub space_before: bool,
}

impl Token<'_> {
    #[must_use]
    pub fn is_word(&self, word: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text == word
    }
}

/// Split decoded text into tokens. The result always ends with
/// [`TokenKind::Eof`].
///
/// # Errors
///
/// `SYNTAX` for unterminated strings, unknown characters and
/// malformed literals.
pub fn tokenize(text: &str) -> Result<Vec<Token<'_>>, SyntaxError> {
    let mut lexer = Lexer { text, pos: 0 };
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let eof = token.kind == TokenKind::Eof;
        tokens.push(token);
        if eof {
            return Ok(tokens);
        }
    }
}

/// Percent-decode one path segment or query component.
///
/// # Errors
///
/// `WRONG_PERCENT_ENCODING` if a `%` is not followed by two hex digits
/// or the decoded bytes are not UTF-8.
pub fn percent_decode(text: &str) -> Result<String, SyntaxError> {
    let bytes = text.as_bytes();
    let malformed = bytes.iter().enumerate().any(|(i, b)| {
        *b == b'%'
            && !(bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit))
    });
    if malformed {
        return Err(SyntaxError::new(
            SyntaxMessageKey::WrongPercentEncoding,
            &[text],
        ));
    }
    percent_decode_str(text)
        .decode_utf8()
        .map(|v| v.into_owned())
        .map_err(|_| SyntaxError::new(SyntaxMessageKey::WrongPercentEncoding, &[text]))
}

/// Split on `separator` outside of parentheses and quoted strings.
#[must_use]
pub fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '\'' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => depth = depth.saturating_sub(1),
            c if c == separator && !quoted && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | ':' | '+' | '-')
}

const PREFIXED_LITERALS: [&str; 4] = ["duration", "binary", "geography", "geometry"];
const WORD_LITERALS: [&str; 5] = ["true", "false", "null", "INF", "NaN"];

struct Lexer<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn syntax(&self) -> SyntaxError {
        SyntaxError::new(SyntaxMessageKey::Syntax, &[self.text])
    }

    fn scan_while(&self, from: usize, pred: impl Fn(char) -> bool) -> usize {
        self.text[from..]
            .char_indices()
            .find(|(_, c)| !pred(*c))
            .map_or(self.text.len(), |(i, _)| from + i)
    }

    // Returns the end of a single-quoted string starting at `from`.
    fn scan_string(&self, from: usize) -> Result<usize, SyntaxError> {
        let bytes = self.text.as_bytes();
        let mut i = from + 1;
        while i < bytes.len() {
            if bytes[i] == b'\'' {
                if bytes.get(i + 1) == Some(&b'\'') {
                    i += 2;
                    continue;
                }
                return Ok(i + 1);
            }
            i += 1;
        }
        Err(self.syntax())
    }

    fn scan_identifier(&self, from: usize) -> usize {
        let mut end = self.scan_while(from, is_ident_char);
        while self.text[end..].starts_with('.')
            && self.text[end + 1..].chars().next().is_some_and(is_ident_start)
        {
            end = self.scan_while(end + 1, is_ident_char);
        }
        end
    }

    fn token(&mut self, kind: TokenKind, end: usize, space_before: bool) -> Token<'a> {
        let token = Token {
            kind,
            text: &self.text[self.pos..end],
            offset: self.pos,
            space_before,
        };
        self.pos = end;
        token
    }

    fn next_token(&mut self) -> Result<Token<'a>, SyntaxError> {
        let start = self.pos;
        self.pos = self.scan_while(self.pos, |c| c == ' ' || c == '\t');
        let space_before = self.pos > start;
        let Some(c) = self.rest().chars().next() else {
            return Ok(self.token(TokenKind::Eof, self.pos, space_before));
        };
        let single = match c {
            '(' => Some(TokenKind::OpenParen),
            ')' => Some(TokenKind::CloseParen),
            ',' => Some(TokenKind::Comma),
            '/' => Some(TokenKind::Slash),
            '=' => Some(TokenKind::Equals),
            ';' => Some(TokenKind::Semicolon),
            ':' => Some(TokenKind::Colon),
            '*' => Some(TokenKind::Star),
            _ => None,
        };
        if let Some(kind) = single {
            return Ok(self.token(kind, self.pos + 1, space_before));
        }
        match c {
            '\'' => {
                let end = self.scan_string(self.pos)?;
                Ok(self.token(TokenKind::Literal, end, space_before))
            }
            '@' | '$' => {
                let end = self.scan_while(self.pos + 1, is_ident_char);
                if end == self.pos + 1 {
                    return Err(self.syntax());
                }
                let kind = if c == '@' {
                    TokenKind::Alias
                } else {
                    TokenKind::Dollar
                };
                Ok(self.token(kind, end, space_before))
            }
            '-' if !(self.rest()[1..].starts_with(|n: char| n.is_ascii_digit())
                || self.rest()[1..].starts_with("INF")) =>
            {
                Ok(self.token(TokenKind::Minus, self.pos + 1, space_before))
            }
            '-' | '0'..='9' => self.number(space_before),
            c if is_ident_start(c) => self.word(space_before),
            _ => Err(self.syntax()),
        }
    }

    fn number(&mut self, space_before: bool) -> Result<Token<'a>, SyntaxError> {
        let end = self.scan_while(self.pos + 1, is_number_char);
        if PrimitiveValue::infer(&self.text[self.pos..end]).is_some() {
            Ok(self.token(TokenKind::Literal, end, space_before))
        } else {
            Err(self.syntax())
        }
    }

    fn word(&mut self, space_before: bool) -> Result<Token<'a>, SyntaxError> {
        let end = self.scan_identifier(self.pos);
        let word = &self.text[self.pos..end];
        if self.text[end..].starts_with('\'') {
            let end = self.scan_string(end)?;
            return if PREFIXED_LITERALS.contains(&word) {
                Ok(self.token(TokenKind::Literal, end, space_before))
            } else if word.contains('.') {
                Ok(self.token(TokenKind::EnumLiteral, end, space_before))
            } else {
                Err(self.syntax())
            };
        }
        if WORD_LITERALS.contains(&word) {
            return Ok(self.token(TokenKind::Literal, end, space_before));
        }
        // GUIDs may start with a hex letter.
        if word.len() == 8 && self.text[end..].starts_with('-') {
            let guid_end = self.pos + 36;
            if let Some(guid) = self.text.get(self.pos..guid_end) {
                if matches!(PrimitiveValue::infer(guid), Some(PrimitiveValue::Guid(_))) {
                    return Ok(self.token(TokenKind::Literal, guid_end, space_before));
                }
            }
        }
        Ok(self.token(TokenKind::Identifier, end, space_before))
    }
}
