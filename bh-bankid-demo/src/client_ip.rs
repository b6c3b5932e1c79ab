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

//! Detection of the `endUserIp` sent to BankID.

use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;
use bherror::traits::ForeignError as _;
use tokio::sync::OnceCell;

use crate::error::PublicIpError;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Sent when the address cannot be determined.
pub const UNKNOWN_IP: &str = "0.0.0.0";

/// Default service returning the public IP address of the caller as plain text.
pub const DEFAULT_PUBLIC_IP_URL: &str = "https://api.ipify.org";

/// Determines the IP address of the user agent calling the API.
///
/// Forwarding headers set by a reverse proxy take precedence over the socket peer.  A loopback
/// peer means the demo runs on the developer's machine, and since BankID expects a routable
/// address, the public address of the host is used instead.  It is looked up once and cached.
#[derive(Debug)]
pub struct ClientIp {
    public_ip_url: String,
    public_ip: OnceCell<String>,
}

impl ClientIp {
    pub fn new(public_ip_url: impl Into<String>) -> Self {
        Self {
            public_ip_url: public_ip_url.into(),
            public_ip: OnceCell::new(),
        }
    }

    /// Uses `public_ip` for loopback peers instead of looking it up.
    #[cfg(test)]
    pub fn with_public_ip(public_ip: IpAddr) -> Self {
        Self {
            public_ip_url: String::new(),
            public_ip: OnceCell::new_with(Some(public_ip.to_string())),
        }
    }

    pub async fn resolve(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
        if let Some(ip) = forwarded_ip(headers) {
            return ip.to_string();
        }

        match peer {
            Some(peer) if peer.ip().is_loopback() => self.public_ip().await,
            Some(peer) => peer.ip().to_string(),
            None => UNKNOWN_IP.to_owned(),
        }
    }

    async fn public_ip(&self) -> String {
        let public_ip = self
            .public_ip
            .get_or_try_init(|| fetch_public_ip(&self.public_ip_url))
            .await;

        // Failures are not cached, the lookup is retried on the next request
        match public_ip {
            Ok(ip) => ip.clone(),
            Err(_) => UNKNOWN_IP.to_owned(),
        }
    }
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let forwarded_for = headers
        .get(X_FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|first| first.trim().parse().ok());

    forwarded_for.or_else(|| {
        headers
            .get(X_REAL_IP)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok())
    })
}

async fn fetch_public_ip(url: &str) -> bherror::Result<String, PublicIpError> {
    let body = reqwest::get(url)
        .await
        .and_then(|response| response.error_for_status())
        .foreign_err(|| PublicIpError::Lookup(url.to_owned()))?
        .text()
        .await
        .foreign_err(|| PublicIpError::Lookup(url.to_owned()))?;

    let ip = body
        .trim()
        .parse::<IpAddr>()
        .foreign_err(|| PublicIpError::InvalidAddress(body.trim().to_owned()))?;

    log::info!("Using public IP address {} for local requests", ip);

    Ok(ip.to_string())
}
