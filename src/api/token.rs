/*
 * Spanfs
 * Copyright (C) 2023 The Spanfs Authors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use super::error::ApiError;

const ENV_PREFIX: &str = "env::";

/// Where the index-server session token comes from.  The config names the
/// source; every authenticated call fetches a fresh value so a re-login
/// takes effect without remounting.
pub trait TokenSource: Send + Sync {
    fn get(&self) -> Result<String, ApiError>;
}

pub struct EnvTokenSource {
    var_name: String,
}

impl EnvTokenSource {
    pub fn new(var_name: impl Into<String>) -> Self {
        EnvTokenSource {
            var_name: var_name.into(),
        }
    }
}

impl TokenSource for EnvTokenSource {
    fn get(&self) -> Result<String, ApiError> {
        match std::env::var(&self.var_name) {
            Ok(token) if !token.is_empty() => Ok(token),
            _ => Err(ApiError::Token),
        }
    }
}

/// Parses a config token-source spec (`env::<VARNAME>`) into a source.
pub fn from_spec(spec: &str) -> Option<Box<dyn TokenSource>> {
    if spec.starts_with(ENV_PREFIX) {
        let var_name = &spec[ENV_PREFIX.len()..];
        if var_name.is_empty() {
            return None;
        }
        return Some(Box::new(EnvTokenSource::new(var_name)));
    }
    None
}
