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

use std::error::Error;

/// Composite error for both backend clients: a transport-level failure, a
/// non-2xx response with the message pulled out of its JSend envelope, or one
/// of the predefined conditions.
pub enum ApiError {
    /// The HTTP layer failed before a response was obtained (connect,
    /// timeout, TLS handshake).
    Http(reqwest::Error),
    /// The server answered with a non-success status code.
    Response { status: u16, message: String },
    /// TLS material could not be loaded.
    Tls(String),
    /// No session token could be acquired.
    Token,
    /// The response body violated the JSend schema.
    Json,
    /// The envelope parsed, but its status wasn't `success`.
    JsonUnsuccessful,
    /// No catalog entry (or no fetch URL yet) for the addressed server.
    NoServerData,
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Http(e)
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            ApiError::Http(e) => write!(f, "HTTP error: {}", e),
            ApiError::Response { status, message } => {
                write!(f, "Server returned {}: {}", status, message)
            }
            ApiError::Tls(msg) => write!(f, "TLS material error: {}", msg),
            ApiError::Token => write!(f, "Couldn't acquire a session token"),
            ApiError::Json => write!(f, "Malformed response envelope"),
            ApiError::JsonUnsuccessful => write!(f, "Response envelope reported failure"),
            ApiError::NoServerData => write!(f, "No endpoint data for the requested server"),
        }
    }
}

impl std::fmt::Debug for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        std::fmt::Display::fmt(self, f)
    }
}
