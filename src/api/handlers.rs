// Operation handlers for the Accounts containment routes

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;

use super::response::{self, json_response};
use super::types::{CollectionResponse, PrimitiveResponse};
use crate::config::AppState;
use crate::logger;
use crate::odata::QueryOptions;
use crate::store::PaymentInstrument;

/// GET /Accounts
pub async fn list_accounts(
    state: &Arc<AppState>,
    options: &QueryOptions,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let accounts = state.store.accounts().await;
    json_response(
        StatusCode::OK,
        &CollectionResponse {
            value: options.apply(accounts),
        },
    )
}

/// GET /Accounts({key})/PayinPIs
pub async fn list_payin_pis(
    state: &Arc<AppState>,
    account_id: i32,
    options: &QueryOptions,
) -> Result<Response<Full<Bytes>>, Infallible> {
    match state.store.payin_pis(account_id).await {
        Ok(pis) => json_response(
            StatusCode::OK,
            &CollectionResponse {
                value: options.apply(pis),
            },
        ),
        Err(e) => Ok(response::store_error_response(&e)),
    }
}

/// GET /Accounts({accountId})/PayinPIs({paymentInstrumentId})
pub async fn get_payin_pi(
    state: &Arc<AppState>,
    account_id: i32,
    payment_instrument_id: i32,
) -> Result<Response<Full<Bytes>>, Infallible> {
    match state.store.payin_pi(account_id, payment_instrument_id).await {
        Ok(pi) => json_response(StatusCode::OK, &pi),
        Err(e) => Ok(response::store_error_response(&e)),
    }
}

/// GET /Accounts({key})/PayoutPI
///
/// An unset payout instrument serializes as JSON `null`.
pub async fn get_payout_pi(
    state: &Arc<AppState>,
    account_id: i32,
) -> Result<Response<Full<Bytes>>, Infallible> {
    match state.store.payout_pi(account_id).await {
        Ok(payout) => json_response(StatusCode::OK, &payout),
        Err(e) => Ok(response::store_error_response(&e)),
    }
}

/// POST /Accounts({key})/PayinPIs
pub async fn add_payin_pi(
    req: Request<hyper::body::Incoming>,
    state: &Arc<AppState>,
    account_id: i32,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let instrument = match read_instrument(req).await {
        Ok(pi) => pi,
        Err(resp) => return Ok(resp),
    };
    match state.store.add_payin_pi(account_id, instrument).await {
        Ok(created) => json_response(StatusCode::CREATED, &created),
        Err(e) => Ok(response::store_error_response(&e)),
    }
}

/// PUT /Accounts({accountId})/PayoutPI
pub async fn replace_payout_pi(
    req: Request<hyper::body::Incoming>,
    state: &Arc<AppState>,
    account_id: i32,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let instrument = match read_instrument(req).await {
        Ok(pi) => pi,
        Err(resp) => return Ok(resp),
    };
    match state.store.replace_payout_pi(account_id, instrument).await {
        Ok(stored) => json_response(StatusCode::OK, &stored),
        Err(e) => Ok(response::store_error_response(&e)),
    }
}

/// PUT /Accounts({accountId})/PayinPIs({paymentInstrumentId})
pub async fn update_payin_pi(
    req: Request<hyper::body::Incoming>,
    state: &Arc<AppState>,
    account_id: i32,
    payment_instrument_id: i32,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let payload = match read_instrument(req).await {
        Ok(pi) => pi,
        Err(resp) => return Ok(resp),
    };
    match state
        .store
        .rename_payin_pi(account_id, payment_instrument_id, payload)
        .await
    {
        Ok(echoed) => json_response(StatusCode::OK, &echoed),
        Err(e) => Ok(response::store_error_response(&e)),
    }
}

/// DELETE /Accounts({accountId})/PayinPIs({paymentInstrumentId})
pub async fn delete_payin_pi(
    state: &Arc<AppState>,
    account_id: i32,
    payment_instrument_id: i32,
) -> Result<Response<Full<Bytes>>, Infallible> {
    match state
        .store
        .remove_payin_pi(account_id, payment_instrument_id)
        .await
    {
        Ok(()) => Ok(response::no_content()),
        Err(e) => Ok(response::store_error_response(&e)),
    }
}

/// DELETE /Accounts({accountId})/PayoutPI
pub async fn delete_payout_pi(
    state: &Arc<AppState>,
    account_id: i32,
) -> Result<Response<Full<Bytes>>, Infallible> {
    match state.store.clear_payout_pi(account_id).await {
        Ok(()) => Ok(response::no_content()),
        Err(e) => Ok(response::store_error_response(&e)),
    }
}

/// GET /Accounts({accountId})/PayinPIs/GetCount(NameContains={name})
pub async fn get_payin_pis_count(
    state: &Arc<AppState>,
    account_id: i32,
    name_contains: &str,
) -> Result<Response<Full<Bytes>>, Infallible> {
    match state.store.count_payin_pis(account_id, name_contains).await {
        Ok(count) => json_response(StatusCode::OK, &PrimitiveResponse { value: count }),
        Err(e) => Ok(response::store_error_response(&e)),
    }
}

/// POST /ResetDataSource
pub async fn reset_data_source(
    state: &Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    state.store.reset().await;
    logger::log_store_reset();
    Ok(response::no_content())
}

/// Collect the request body and deserialize a `PaymentInstrument`.
///
/// Malformed payloads are the only transport-level rejection this fixture
/// adds; anything that deserializes is accepted as-is.
async fn read_instrument(
    req: Request<hyper::body::Incoming>,
) -> Result<PaymentInstrument, Response<Full<Bytes>>> {
    use http_body_util::BodyExt;

    let whole_body = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => return Err(response::bad_request("Failed to read request body")),
    };

    serde_json::from_slice(&whole_body)
        .map_err(|e| response::bad_request(&format!("Invalid JSON: {e}")))
}
