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

//! Parser configuration.
//!
//! Limits and leniency switches of the URI parser. Can be read from a
//! TOML file, every key is optional:
//!
//! ```toml
//! max_nesting_depth = 50
//! case_insensitive_system_options = true
//! allow_missing_dollar = false
//! max_levels = 10
//! ```

use serde::Deserialize;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::fs::File;
use std::io::Error as IoError;
use std::io::Read as _;
use std::path::Path;
use toml::de::Error as TomlError;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Depth limit for nested `$expand` options, parentheses and
    /// lambda bodies.
    pub max_nesting_depth: usize,
    /// Accept `$FILTER`, `$Top` and so on.
    pub case_insensitive_system_options: bool,
    /// Accept `filter=` as `$filter=`.
    pub allow_missing_dollar: bool,
    /// Highest number accepted by `$levels`.
    pub max_levels: u32,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: 100,
            case_insensitive_system_options: false,
            allow_missing_dollar: false,
            max_levels: 100,
        }
    }
}

impl ParserConfig {
    /// Read parser configuration from toml file.
    ///
    /// # Errors
    ///
    /// - `Error::Io` if failed to read file
    /// - `Error::Toml` if content is not a valid configuration.
    pub fn read(fname: impl AsRef<Path>) -> Result<Self, Error> {
        let mut file = File::open(fname).map_err(Error::Io)?;
        let mut content = String::new();
        file.read_to_string(&mut content).map_err(Error::Io)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// `Error::Toml` if content is not a valid configuration.
    pub fn from_toml(content: &str) -> Result<Self, Error> {
        toml::from_str(content).map_err(Error::Toml)
    }
}

#[derive(Debug)]
pub enum Error {
    Io(IoError),
    Toml(TomlError),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Io(err) => write!(f, "input/output error: {err}"),
            Self::Toml(err) => write!(f, "parser configuration format error: {err}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Toml(err) => Some(err),
        }
    }
}
