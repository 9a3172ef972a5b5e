// Catalog Sync - VRT NU catalog aggregation and favorites synchronization
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Token provider contract
//!
//! Acquiring and renewing credentials happens elsewhere. The favorites store only
//! asks for a bearer token by name and variant and treats `None` as "no usable
//! credential".

use async_trait::async_trait;
use std::collections::HashMap;

/// Token used to read the favorites page from the GraphQL endpoint
pub const ROAMING_TOKEN_NAME: &str = "vrtlogin-at";

/// Token used to write to the favorites service
pub const USER_TOKEN_NAME: &str = "X-VRT-Token";

/// Scope a token was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenVariant {
    /// Read access shared across devices
    Roaming,
    /// Write access for the logged-in user
    User,
}

impl TokenVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Roaming => "roaming",
            Self::User => "user",
        }
    }
}

#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Whether the user stored credentials at all
    fn has_credentials(&self) -> bool;

    /// Resolve a bearer token, `None` when it cannot be obtained
    async fn get_token(&self, name: &str, variant: TokenVariant) -> Option<String>;
}

/// Fixed set of tokens, for the CLI and for tests
#[derive(Debug, Clone, Default)]
pub struct StaticTokenProvider {
    tokens: HashMap<(String, TokenVariant), String>,
}

impl StaticTokenProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token<N: Into<String>, T: Into<String>>(mut self, name: N, variant: TokenVariant, token: T) -> Self {
        self.tokens.insert((name.into(), variant), token.into());
        self
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    fn has_credentials(&self) -> bool {
        !self.tokens.is_empty()
    }

    async fn get_token(&self, name: &str, variant: TokenVariant) -> Option<String> {
        self.tokens.get(&(name.to_string(), variant)).cloned()
    }
}
