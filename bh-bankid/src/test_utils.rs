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

use std::{future::Future, sync::Mutex};

use openssl::{
    asn1::{Asn1Time, Asn1TimeRef},
    bn::BigNum,
    ec::{EcGroup, EcKey},
    hash::MessageDigest,
    nid::Nid,
    pkey::{PKey, Private},
    x509::{X509NameBuilder, X509},
};
use serde::Serialize;

use crate::{
    credential::{CertificateSource, Credential, StoredCertificate, Thumbprint},
    transport::{RawResponse, Resource, Transport},
    Result,
};

/// Generates a self-signed P-256 certificate valid between the given times.
pub(crate) fn generate_certificate(
    common_name: &str,
    not_before: &Asn1TimeRef,
    not_after: &Asn1TimeRef,
) -> (X509, PKey<Private>) {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
    let private_key = PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap();

    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", common_name).unwrap();
    let name = name.build();

    let serial_number = BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap();

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    builder.set_serial_number(&serial_number).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();
    builder.set_pubkey(&private_key).unwrap();
    builder.set_not_before(not_before).unwrap();
    builder.set_not_after(not_after).unwrap();
    builder.sign(&private_key, MessageDigest::sha256()).unwrap();

    (builder.build(), private_key)
}

/// Generates a self-signed certificate that is valid right now.
pub(crate) fn valid_certificate(common_name: &str) -> (X509, PKey<Private>) {
    generate_certificate(
        common_name,
        &Asn1Time::days_from_now(0).unwrap(),
        &Asn1Time::days_from_now(365).unwrap(),
    )
}

/// In-memory [`CertificateSource`].
#[derive(Clone)]
pub(crate) struct MemorySource {
    name: &'static str,
    certificates: Vec<StoredCertificate>,
}

impl MemorySource {
    pub(crate) fn new(
        name: &'static str,
        certificates: Vec<(X509, Option<PKey<Private>>)>,
    ) -> Self {
        let certificates = certificates
            .into_iter()
            .map(|(certificate, key)| StoredCertificate::new(certificate, key))
            .collect();

        Self { name, certificates }
    }
}

impl CertificateSource for MemorySource {
    fn name(&self) -> String {
        self.name.to_owned()
    }

    fn load(&self) -> Result<Vec<StoredCertificate>> {
        Ok(self.certificates.clone())
    }
}

/// Resolves a [`Credential`] for a freshly generated certificate.
pub(crate) fn credential(common_name: &str) -> Credential {
    let (certificate, private_key) = valid_certificate(common_name);
    let thumbprint = Thumbprint::of(&certificate).unwrap();
    let source = MemorySource::new("memory", vec![(certificate, Some(private_key))]);

    Credential::resolve(&thumbprint, &[source]).unwrap()
}

/// [`Transport`] stub returning a canned response and recording every request body.
pub(crate) struct RecordingTransport {
    response: RawResponse,
    // The trait bounds + signature require this mutex
    requests: Mutex<Vec<(Resource, serde_json::Value)>>,
}

impl RecordingTransport {
    pub(crate) fn new(status: u16, body: &str) -> Self {
        Self {
            response: RawResponse {
                status,
                body: body.to_owned(),
            },
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<(Resource, serde_json::Value)> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for RecordingTransport {
    fn execute<B>(
        &self,
        resource: Resource,
        body: &B,
    ) -> impl Future<Output = Result<RawResponse>> + Send
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body).unwrap();
        self.requests.lock().unwrap().push((resource, body));

        std::future::ready(Ok(self.response.clone()))
    }
}
