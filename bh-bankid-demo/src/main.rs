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

//! Demo HTTP service exposing BankID authentication and signing to a browser front end.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use bh_bankid::BankIdClient;
use bherror::traits::{ForeignError as _, PropagateError as _};
use clap::Parser;

mod client_ip;
mod config;
mod error;
mod models;
mod routes;

use client_ip::ClientIp;
use config::DemoConfig;
use error::StartupError;
use routes::AppState;

#[derive(Parser, Debug)]
#[command(about = "BankID authentication and signing demo service")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "BANKID_DEMO_CONFIG", default_value = "bankid.toml")]
    config: PathBuf,

    /// Address to listen on
    #[arg(short, long, env = "BANKID_DEMO_LISTEN", default_value = "127.0.0.1:3000")]
    listen: SocketAddr,
}

#[tokio::main]
async fn main() -> bherror::Result<(), StartupError> {
    env_logger::init();

    let args = Args::parse();

    let config = DemoConfig::from_file(&args.config)?;
    let client = BankIdClient::from_config(&config.bankid).with_err(|| StartupError::Client)?;

    let state = Arc::new(AppState {
        client,
        client_ip: ClientIp::new(config.public_ip_url),
    });
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .foreign_err(|| StartupError::Bind(args.listen))?;

    log::info!(
        "BankID demo listening on {} ({})",
        args.listen,
        config.bankid.environment
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .foreign_err(|| StartupError::Serve)
}
