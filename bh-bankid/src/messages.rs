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

//! The catalog of end-user messages recommended by BankID.
//!
//! BankID identifies its recommended messages as `RFA<n>`.  A presentation layer should show one
//! of these texts instead of building its own from the raw hint or error codes.  The mapping from
//! collect responses and failures to messages lives in the [`status`][crate::status] module.

use std::fmt;

/// Language of a [`UserMessage`] text.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    /// Swedish, the BankID default.
    #[default]
    Swedish,
    /// English.
    English,
}

/// A message meant to be shown to the end user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserMessage {
    /// Start the BankID app (RFA1).
    Rfa1,
    /// The order was cancelled, try again (RFA3).
    Rfa3,
    /// An order for this personal number is already in progress (RFA4).
    Rfa4,
    /// Internal error, try again (RFA5).
    Rfa5,
    /// The user cancelled the order (RFA6).
    Rfa6,
    /// The BankID app is not responding (RFA8).
    Rfa8,
    /// Enter the security code in the BankID app (RFA9).
    Rfa9,
    /// Trying to start the BankID app (RFA13).
    Rfa13,
    /// Searching for BankID, shared by `RFA14` and `RFA15`.
    Rfa14Rfa15,
    /// The BankID is blocked or too old (RFA16).
    Rfa16,
    /// The BankID app could not be found on this device (RFA17A).
    Rfa17A,
    /// The QR code could not be read by the BankID app (RFA17B).
    Rfa17B,
    /// Identification or signing in progress (RFA21).
    Rfa21,
    /// Unknown error, try again (RFA22).
    Rfa22,
    /// The order completed successfully.
    SuccessfulAuthentication,
    /// The state of the order is unknown.
    UnknownStatus,
}

impl UserMessage {
    /// Stable identifier of the message, e.g. `RFA1`.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Rfa1 => "RFA1",
            Self::Rfa3 => "RFA3",
            Self::Rfa4 => "RFA4",
            Self::Rfa5 => "RFA5",
            Self::Rfa6 => "RFA6",
            Self::Rfa8 => "RFA8",
            Self::Rfa9 => "RFA9",
            Self::Rfa13 => "RFA13",
            Self::Rfa14Rfa15 => "RFA14/15",
            Self::Rfa16 => "RFA16",
            Self::Rfa17A => "RFA17A",
            Self::Rfa17B => "RFA17B",
            Self::Rfa21 => "RFA21",
            Self::Rfa22 => "RFA22",
            Self::SuccessfulAuthentication => "SUCCESSFUL_AUTHENTICATION",
            Self::UnknownStatus => "UNKNOWN_STATUS",
        }
    }

    /// Text of the message in the given language.
    pub fn text(&self, language: Language) -> &'static str {
        let (swedish, english) = match self {
            Self::Rfa1 => ("Starta BankID-appen.", "Start your BankID app."),
            Self::Rfa3 => (
                "Åtgärden avbruten. Försök igen.",
                "Action cancelled. Please try again.",
            ),
            Self::Rfa4 => (
                "En identifiering eller underskrift för det här personnumret är redan påbörjad. \
                 Försök igen.",
                "An identification or signing for this personal number is already started. \
                 Please try again.",
            ),
            Self::Rfa5 => (
                "Internt tekniskt fel. Försök igen.",
                "Internal error. Please try again.",
            ),
            Self::Rfa6 => ("Åtgärden avbruten.", "Action cancelled."),
            Self::Rfa8 => (
                "BankID-appen svarar inte. Kontrollera att den är startad och att du har \
                 internetanslutning. Om du inte har något giltigt BankID kan du hämta ett hos din \
                 bank. Försök sedan igen.",
                "The BankID app is not responding. Please check that it is started and that you \
                 have internet access. If you don't have a valid BankID you can get one from your \
                 bank. Try again.",
            ),
            Self::Rfa9 => (
                "Skriv in din säkerhetskod i BankID-appen och välj Identifiera eller Skriv under.",
                "Enter your security code in the BankID app and select Identify or Sign.",
            ),
            Self::Rfa13 => (
                "Försöker starta BankID-appen.",
                "Trying to start your BankID app.",
            ),
            Self::Rfa14Rfa15 => (
                "Söker efter BankID, det kan ta en liten stund. Om det har gått några sekunder \
                 och inget BankID har hittats har du sannolikt inget BankID som går att använda \
                 för den aktuella identifieringen eller underskriften i den här enheten. Om du \
                 inte har något BankID kan du hämta ett hos din bank.",
                "Searching for BankID, it may take a little while. If a few seconds have passed \
                 and still no BankID has been found, you probably don't have a BankID which can \
                 be used for this identification or signing on this device. If you don't have a \
                 BankID you can order one from your bank.",
            ),
            Self::Rfa16 => (
                "Det BankID du försöker använda är för gammalt eller spärrat. Använd ett annat \
                 BankID eller hämta ett nytt hos din bank.",
                "The BankID you are trying to use is revoked or too old. Please use another \
                 BankID or order a new one from your bank.",
            ),
            Self::Rfa17A => (
                "BankID-appen verkar inte finnas i din dator eller telefon. Installera den och \
                 hämta ett BankID hos din bank. Installera appen från din appbutik eller \
                 https://install.bankid.com.",
                "The BankID app couldn't be found on your computer or mobile device. Please \
                 install it and order a BankID from your bank. Install the app from your app \
                 store or https://install.bankid.com.",
            ),
            Self::Rfa17B => (
                "Misslyckades att läsa av QR-koden. Starta BankID-appen och läs av QR-koden. \
                 Kontrollera att BankID-appen är uppdaterad. Om du inte har BankID-appen måste du \
                 installera den och hämta ett BankID hos din bank. Installera appen från din \
                 appbutik eller https://install.bankid.com.",
                "Failed to scan the QR code. Start the BankID app and scan the QR code. Check \
                 that the BankID app is up to date. If you don't have the BankID app, you need to \
                 install it and order a BankID from your bank. Install the app from your app \
                 store or https://install.bankid.com.",
            ),
            Self::Rfa21 => (
                "Identifiering eller underskrift pågår.",
                "Identification or signing in progress.",
            ),
            Self::Rfa22 => ("Okänt fel. Försök igen.", "Unknown error. Please try again."),
            Self::SuccessfulAuthentication => {
                ("Identifieringen lyckades.", "The identification succeeded.")
            }
            Self::UnknownStatus => ("Okänd status.", "Unknown status."),
        };

        match language {
            Language::Swedish => swedish,
            Language::English => english,
        }
    }
}

impl fmt::Display for UserMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text(Language::default()))
    }
}
