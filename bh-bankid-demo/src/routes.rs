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

//! The `/api/bankid` routes.
//!
//! Every failure is responded with HTTP 400, with the message for the end user as the body.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        ConnectInfo, Query, State,
    },
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use bh_bankid::{classify, AuthorizeResponse, BankIdClient, EncodingMode, Transport, UserMessage};
use bherror::traits::{ForeignError as _, PropagateError as _};

use crate::{
    client_ip::ClientIp,
    error::ApiError,
    models::{
        validate_personal_number, AuthenticateModel, CancelQuery, CollectQuery, SignModel,
        StatusModel,
    },
};

type ApiResult<T> = bherror::Result<Json<T>, ApiError>;

/// Shared state of the handlers.
pub struct AppState<T> {
    pub client: BankIdClient<T>,
    pub client_ip: ClientIp,
}

pub fn router<T>(state: Arc<AppState<T>>) -> Router
where
    T: Transport + Send + 'static,
{
    Router::new()
        .route("/api/bankid/authenticate", post(authenticate::<T>))
        .route("/api/bankid/sign", post(sign::<T>))
        .route("/api/bankid/cancel", post(cancel::<T>))
        .route("/api/bankid/collect", get(collect::<T>))
        .with_state(state)
}

async fn authenticate<T: Transport>(
    State(state): State<Arc<AppState<T>>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    payload: Result<Json<AuthenticateModel>, JsonRejection>,
) -> ApiResult<AuthorizeResponse> {
    let Json(model) = payload.foreign_err(ApiError::invalid_request)?;
    let personal_number = validated(model.personal_number.as_deref())?;
    let end_user_ip = end_user_ip(&state, model.end_user_ip, peer, &headers).await;

    let response = state
        .client
        .authenticate(&end_user_ip, personal_number, model.requirement.as_ref())
        .await
        .match_err(api_error)?;

    log::info!("Started authentication order {}", response.order_ref);

    Ok(Json(response))
}

async fn sign<T: Transport>(
    State(state): State<Arc<AppState<T>>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    payload: Result<Json<SignModel>, JsonRejection>,
) -> ApiResult<AuthorizeResponse> {
    let Json(model) = payload.foreign_err(ApiError::invalid_request)?;
    let personal_number = validated(model.personal_number.as_deref())?;
    let end_user_ip = end_user_ip(&state, model.end_user_ip, peer, &headers).await;

    let response = state
        .client
        .sign(
            &end_user_ip,
            EncodingMode::Plain,
            &model.user_visible_data,
            model.user_non_visible_data.as_deref(),
            personal_number,
            model.requirement.as_ref(),
        )
        .await
        .match_err(api_error)?;

    log::info!("Started signing order {}", response.order_ref);

    Ok(Json(response))
}

async fn cancel<T: Transport>(
    State(state): State<Arc<AppState<T>>>,
    query: Result<Query<CancelQuery>, QueryRejection>,
) -> ApiResult<bool> {
    let Query(query) = query.foreign_err(ApiError::invalid_request)?;

    let cancelled = state
        .client
        .cancel(&query.order_ref)
        .await
        .match_err(api_error)?;

    log::info!("Cancelling order {}: {}", query.order_ref, cancelled);

    Ok(Json(cancelled))
}

async fn collect<T: Transport>(
    State(state): State<Arc<AppState<T>>>,
    query: Result<Query<CollectQuery>, QueryRejection>,
) -> ApiResult<StatusModel> {
    let Query(query) = query.foreign_err(ApiError::invalid_request)?;

    let response = state
        .client
        .collect(&query.order_ref)
        .await
        .match_err(api_error)?;

    let (status, user_message) = classify(
        Some(&response),
        query.is_automatic_start,
        query.is_qr_code_used,
    );
    log::debug!(
        "Order {} is {} ({})",
        response.order_ref,
        status,
        user_message.id()
    );

    Ok(Json(StatusModel::new(response, status, user_message)))
}

fn api_error(error: &bh_bankid::Error) -> ApiError {
    ApiError(UserMessage::for_error(error))
}

fn validated(personal_number: Option<&str>) -> bherror::Result<Option<&str>, ApiError> {
    validate_personal_number(personal_number).map_err(|error| {
        bherror::Error::root(error).ctx("personal number must be exactly 12 digits")
    })
}

/// The `endUserIp` given in the request, or the address of the caller.
async fn end_user_ip<T>(
    state: &AppState<T>,
    end_user_ip: Option<String>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: &HeaderMap,
) -> String {
    match end_user_ip {
        Some(ip) if !ip.is_empty() => ip,
        _ => {
            let peer = peer.map(|ConnectInfo(address)| address);
            state.client_ip.resolve(headers, peer).await
        }
    }
}
