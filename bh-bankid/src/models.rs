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

//! Wire representations of the BankID requests and responses.
//!
//! The BankID service rejects requests containing explicit `null` values with
//! `invalidParameters`, hence every optional request field is skipped when absent.

use serde::{Deserialize, Serialize};

/// Body of the `auth` request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthRequest<'a> {
    pub(crate) end_user_ip: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) personal_number: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) requirement: Option<&'a Requirement>,
}

/// Body of the `sign` request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignRequest<'a> {
    pub(crate) end_user_ip: &'a str,
    pub(crate) user_visible_data: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) user_non_visible_data: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) personal_number: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) requirement: Option<&'a Requirement>,
}

/// Body of the `collect` and `cancel` requests.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderRefRequest<'a> {
    pub(crate) order_ref: &'a str,
}

/// Conditions the user and their BankID must fulfil for an order to complete.
///
/// Fields left as [`None`] are not sent, leaving the BankID default in place.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    /// Require a card reader of the given class, e.g. `class1` or `class2`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_reader: Option<String>,
    /// Object identifiers of the accepted certificate policies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_policies: Option<Vec<String>>,
    /// Common names of the accepted BankID issuers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_cn: Option<Vec<String>>,
    /// Only allow the order to be started with the autostart token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_start_token_required: Option<bool>,
    /// Allow the user to confirm with a fingerprint instead of the security code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_fingerprint: Option<bool>,
}

/// Response to the `auth` and `sign` requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeResponse {
    /// Identifier of the started order, used for `collect` and `cancel`.
    pub order_ref: String,
    /// Token for starting the BankID app on the same device.
    #[serde(default)]
    pub auto_start_token: String,
    /// Token for generating animated QR codes.
    #[serde(default)]
    pub qr_start_token: String,
    /// Secret for generating animated QR codes.
    #[serde(default)]
    pub qr_start_secret: String,
}

/// State of an order, as reported by `collect`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollectStatus {
    /// The order is being processed; `hintCode` tells the current step.
    Pending,
    /// The order has failed; `hintCode` tells the reason.
    Failed,
    /// The order was completed; `completionData` holds the result.
    Complete,
    /// A status not known to this client, or none at all.
    #[default]
    #[serde(other)]
    Unknown,
}

/// Response to the `collect` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectResponse {
    /// Identifier of the polled order.
    pub order_ref: String,
    /// State of the order.
    #[serde(default)]
    pub status: CollectStatus,
    /// Refines a `pending` or `failed` status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint_code: Option<String>,
    /// Present once the order is complete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_data: Option<CompletionData>,
}

impl CollectResponse {
    /// Whether the order is still being processed.
    pub fn is_pending(&self) -> bool {
        self.status == CollectStatus::Pending
    }

    /// Whether the order has failed.
    pub fn is_failed(&self) -> bool {
        self.status == CollectStatus::Failed
    }

    /// Whether the order was completed.
    pub fn is_complete(&self) -> bool {
        self.status == CollectStatus::Complete
    }
}

/// The result of a completed order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionData {
    /// The identified user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// The device the order was completed on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
    /// Validity of the user's BankID certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert: Option<Cert>,
    /// Base64 encoded XML signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Base64 encoded OCSP response for the user's certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocsp_response: Option<String>,
}

/// User information of a completed order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Swedish personal identity number, 12 digits.
    #[serde(default)]
    pub personal_number: String,
    /// Full name.
    #[serde(default)]
    pub name: String,
    /// Given name.
    #[serde(default)]
    pub given_name: String,
    /// Surname.
    #[serde(default)]
    pub surname: String,
}

/// Device information of a completed order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// IP address of the user's device, as seen by BankID.
    #[serde(default)]
    pub ip_address: String,
}

/// Certificate validity of a completed order, in milliseconds since the UNIX epoch.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cert {
    /// Start of the validity period.
    #[serde(default)]
    pub not_before: String,
    /// End of the validity period.
    #[serde(default)]
    pub not_after: String,
}

/// Body of an unsuccessful response.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Machine readable error code, e.g. `alreadyInProgress`.
    #[serde(default)]
    pub error_code: String,
    /// Human readable description, meant for diagnostics only.
    #[serde(default)]
    pub details: String,
}
