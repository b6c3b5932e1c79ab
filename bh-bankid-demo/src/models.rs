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

use bh_bankid::{CollectResponse, CompletionData, Requirement, StatusType, UserMessage};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

const PERSONAL_NUMBER_LENGTH: usize = 12;

/// Body of `POST /api/bankid/authenticate`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateModel {
    #[serde(default)]
    pub end_user_ip: Option<String>,
    #[serde(default)]
    pub personal_number: Option<String>,
    #[serde(default)]
    pub requirement: Option<Requirement>,
}

/// Body of `POST /api/bankid/sign`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignModel {
    #[serde(default)]
    pub end_user_ip: Option<String>,
    #[serde(default)]
    pub user_visible_data: String,
    #[serde(default)]
    pub user_non_visible_data: Option<String>,
    #[serde(default)]
    pub personal_number: Option<String>,
    #[serde(default)]
    pub requirement: Option<Requirement>,
}

/// Query of `POST /api/bankid/cancel`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelQuery {
    #[serde(default)]
    pub order_ref: String,
}

/// Query of `GET /api/bankid/collect`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectQuery {
    #[serde(default)]
    pub order_ref: String,
    #[serde(default)]
    pub is_automatic_start: bool,
    #[serde(default)]
    pub is_qr_code_used: bool,
}

/// Response of `GET /api/bankid/collect`.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusModel {
    pub order_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_data: Option<CompletionData>,
    pub status: String,
    pub user_message: String,
}

impl StatusModel {
    pub fn new(response: CollectResponse, status: StatusType, user_message: UserMessage) -> Self {
        Self {
            order_ref: response.order_ref,
            hint_code: response.hint_code,
            completion_data: response.completion_data,
            status: status.to_string(),
            user_message: user_message.to_string(),
        }
    }
}

/// Checks that a personal number, if given, is 12 digits (`YYYYMMDDNNNN`).
///
/// An empty personal number counts as absent.
pub fn validate_personal_number(personal_number: Option<&str>) -> Result<Option<&str>, ApiError> {
    match personal_number {
        None | Some("") => Ok(None),
        Some(number)
            if number.len() == PERSONAL_NUMBER_LENGTH
                && number.bytes().all(|byte| byte.is_ascii_digit()) =>
        {
            Ok(Some(number))
        }
        Some(_) => Err(ApiError::invalid_request()),
    }
}
