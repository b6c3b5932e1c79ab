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

//! Interpretation of `collect` results and failures for the end user.
//!
//! Both classifiers are total: unknown statuses and hint codes fall back to a generic message
//! instead of failing.

use crate::{CollectResponse, CollectStatus, Error, UserMessage};

// Hint codes, compared case-sensitively.
const OUTSTANDING_TRANSACTION: &str = "outstandingTransaction";
const NO_CLIENT: &str = "noClient";
const USER_SIGN: &str = "userSign";
const STARTED: &str = "started";
const CANCELLED: &str = "cancelled";
const USER_CANCEL: &str = "userCancel";
const EXPIRED_TRANSACTION: &str = "expiredTransaction";
const CERTIFICATE_ERR: &str = "certificateErr";
const START_FAILED: &str = "startFailed";

/// Coarse state of an order, derived from a [`CollectResponse`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum StatusType {
    /// No response, or a status not known to this client.
    #[default]
    Unknown,
    /// Keep polling.
    Pending,
    /// The order has failed; stop polling.
    Failed,
    /// The order was completed; stop polling.
    Complete,
}

impl From<&CollectResponse> for StatusType {
    fn from(response: &CollectResponse) -> Self {
        match response.status {
            CollectStatus::Complete => Self::Complete,
            CollectStatus::Failed => Self::Failed,
            CollectStatus::Pending => Self::Pending,
            CollectStatus::Unknown => Self::Unknown,
        }
    }
}

/// Returns the [`StatusType`] of `response` together with the message to show the user.
///
/// `is_automatic_start` tells whether the BankID app was started with the autostart token on the
/// same device, and `is_qr_code_used` whether the user was shown a QR code.
pub fn classify(
    response: Option<&CollectResponse>,
    is_automatic_start: bool,
    is_qr_code_used: bool,
) -> (StatusType, UserMessage) {
    let status = response.map(StatusType::from).unwrap_or_default();
    let message = UserMessage::for_collect(response, is_automatic_start, is_qr_code_used);

    (status, message)
}

impl UserMessage {
    /// Returns the message to show the user after polling an order.
    pub fn for_collect(
        response: Option<&CollectResponse>,
        is_automatic_start: bool,
        is_qr_code_used: bool,
    ) -> Self {
        let Some(response) = response else {
            return Self::UnknownStatus;
        };
        let hint_code = response.hint_code.as_deref();

        match response.status {
            CollectStatus::Pending => pending_message(hint_code, is_automatic_start),
            CollectStatus::Failed => failed_message(hint_code, is_qr_code_used),
            CollectStatus::Complete => Self::SuccessfulAuthentication,
            CollectStatus::Unknown => Self::UnknownStatus,
        }
    }

    /// Returns the message to show the user after a failed operation.
    pub fn for_error(error: &Error) -> Self {
        match error {
            Error::AlreadyInProgress => Self::Rfa4,
            Error::RequestTimeout | Error::InternalError | Error::Maintenance => Self::Rfa5,
            _ => Self::Rfa22,
        }
    }
}

fn pending_message(hint_code: Option<&str>, is_automatic_start: bool) -> UserMessage {
    match hint_code {
        Some(OUTSTANDING_TRANSACTION) if !is_automatic_start => UserMessage::Rfa1,
        Some(NO_CLIENT) => UserMessage::Rfa1,
        Some(USER_SIGN) => UserMessage::Rfa9,
        Some(OUTSTANDING_TRANSACTION) => UserMessage::Rfa13,
        Some(STARTED) => UserMessage::Rfa14Rfa15,
        _ => UserMessage::Rfa21,
    }
}

fn failed_message(hint_code: Option<&str>, is_qr_code_used: bool) -> UserMessage {
    match hint_code {
        Some(CANCELLED) => UserMessage::Rfa3,
        Some(USER_CANCEL) => UserMessage::Rfa6,
        Some(EXPIRED_TRANSACTION) => UserMessage::Rfa8,
        Some(CERTIFICATE_ERR) => UserMessage::Rfa16,
        Some(START_FAILED) if is_qr_code_used => UserMessage::Rfa17B,
        Some(START_FAILED) => UserMessage::Rfa17A,
        _ => UserMessage::Rfa22,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAGS: [(bool, bool); 4] = [(false, false), (false, true), (true, false), (true, true)];

    fn response(status: CollectStatus, hint_code: Option<&str>) -> CollectResponse {
        CollectResponse {
            order_ref: "131daac9-16c6-4618-beb0-365768f37288".to_owned(),
            status,
            hint_code: hint_code.map(str::to_owned),
            completion_data: None,
        }
    }

    #[test]
    fn test_status_type() {
        for (status, expected) in [
            (CollectStatus::Pending, StatusType::Pending),
            (CollectStatus::Failed, StatusType::Failed),
            (CollectStatus::Complete, StatusType::Complete),
            (CollectStatus::Unknown, StatusType::Unknown),
        ] {
            assert_eq!(StatusType::from(&response(status, None)), expected);
        }

        assert_eq!(classify(None, false, false).0, StatusType::Unknown);
    }

    #[test]
    fn test_status_type_display() {
        assert_eq!(StatusType::Pending.to_string(), "Pending");
        assert_eq!(StatusType::Unknown.to_string(), "Unknown");
    }

    #[test]
    fn test_pending_messages() {
        let cases = [
            (Some("outstandingTransaction"), false, UserMessage::Rfa1),
            (Some("outstandingTransaction"), true, UserMessage::Rfa13),
            (Some("noClient"), false, UserMessage::Rfa1),
            (Some("noClient"), true, UserMessage::Rfa1),
            (Some("userSign"), false, UserMessage::Rfa9),
            (Some("userSign"), true, UserMessage::Rfa9),
            (Some("started"), false, UserMessage::Rfa14Rfa15),
            (Some("started"), true, UserMessage::Rfa14Rfa15),
            (Some("somethingNew"), false, UserMessage::Rfa21),
            (Some("NoClient"), false, UserMessage::Rfa21),
            (Some(""), true, UserMessage::Rfa21),
            (None, false, UserMessage::Rfa21),
        ];

        for (hint_code, is_automatic_start, expected) in cases {
            for is_qr_code_used in [false, true] {
                let pending = response(CollectStatus::Pending, hint_code);
                assert_eq!(
                    classify(Some(&pending), is_automatic_start, is_qr_code_used),
                    (StatusType::Pending, expected),
                    "{hint_code:?} {is_automatic_start}"
                );
            }
        }
    }

    #[test]
    fn test_failed_messages() {
        let cases = [
            (Some("cancelled"), false, UserMessage::Rfa3),
            (Some("userCancel"), false, UserMessage::Rfa6),
            (Some("expiredTransaction"), false, UserMessage::Rfa8),
            (Some("certificateErr"), false, UserMessage::Rfa16),
            (Some("startFailed"), false, UserMessage::Rfa17A),
            (Some("startFailed"), true, UserMessage::Rfa17B),
            (Some("somethingNew"), false, UserMessage::Rfa22),
            (Some("StartFailed"), true, UserMessage::Rfa22),
            (None, false, UserMessage::Rfa22),
        ];

        for (hint_code, is_qr_code_used, expected) in cases {
            for is_automatic_start in [false, true] {
                let failed = response(CollectStatus::Failed, hint_code);
                assert_eq!(
                    classify(Some(&failed), is_automatic_start, is_qr_code_used),
                    (StatusType::Failed, expected),
                    "{hint_code:?} {is_qr_code_used}"
                );
            }
        }
    }

    #[test]
    fn test_complete_message() {
        for hint_code in [None, Some("userSign"), Some("startFailed")] {
            for (is_automatic_start, is_qr_code_used) in FLAGS {
                let complete = response(CollectStatus::Complete, hint_code);
                assert_eq!(
                    classify(Some(&complete), is_automatic_start, is_qr_code_used),
                    (StatusType::Complete, UserMessage::SuccessfulAuthentication)
                );
            }
        }
    }

    #[test]
    fn test_unknown_message() {
        for (is_automatic_start, is_qr_code_used) in FLAGS {
            assert_eq!(
                classify(None, is_automatic_start, is_qr_code_used),
                (StatusType::Unknown, UserMessage::UnknownStatus)
            );

            let unknown = response(CollectStatus::Unknown, Some("started"));
            assert_eq!(
                classify(Some(&unknown), is_automatic_start, is_qr_code_used),
                (StatusType::Unknown, UserMessage::UnknownStatus)
            );
        }
    }

    #[test]
    fn test_error_messages() {
        let cases = [
            (Error::AlreadyInProgress, UserMessage::Rfa4),
            (Error::RequestTimeout, UserMessage::Rfa5),
            (Error::InternalError, UserMessage::Rfa5),
            (Error::Maintenance, UserMessage::Rfa5),
            (
                Error::Generic("invalidParameters".to_owned(), "Invalid orderRef".to_owned()),
                UserMessage::Rfa22,
            ),
            (
                Error::InvalidInput("endUserIp is required".to_owned()),
                UserMessage::Rfa22,
            ),
            (Error::Transport, UserMessage::Rfa22),
            (Error::InvalidResponse, UserMessage::Rfa22),
        ];

        for (error, expected) in cases {
            assert_eq!(UserMessage::for_error(&error), expected, "{error}");
        }
    }
}
