// Copyright (C) 2020-2026  The Blockhouse Technology Limited (TBTL).
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public
// License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::borrow::Cow;

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// How the texts passed to [`BankIdClient::sign`][crate::BankIdClient::sign] are encoded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum EncodingMode {
    /// Plain text, which the client base64-encodes from its UTF-8 bytes.
    #[default]
    Plain,
    /// Already base64-encoded, sent as is.
    Base64,
}

impl EncodingMode {
    /// Returns `text` in the base64 form expected on the wire.
    pub fn encode<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self {
            Self::Plain => Cow::Owned(encode_base64(text)),
            Self::Base64 => Cow::Borrowed(text),
        }
    }
}

/// Returns the standard, padded base64 encoding of the UTF-8 bytes of `text`.
pub fn encode_base64(text: &str) -> String {
    STANDARD.encode(text)
}
