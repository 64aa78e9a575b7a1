// API module entry
// Routes OData containment requests to their operation handlers

mod handlers;
mod response;
mod types;

use http_body_util::Full;
use hyper::body::{Body as _, Bytes};
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, SERVER};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::AppState;
use crate::logger::{self, AccessLogEntry};
use crate::odata::{path, ODataPath, QueryOptions};

/// Main entry point for request handling
///
/// Applies the method and body-size gates, parses the OData path, and
/// dispatches to the matching operation handler.
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let request_path = req.uri().path().to_string();
    let query = req.uri().query().map(ToString::to_string);
    let version = req.version();
    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    // 1. Check HTTP method
    if let Some(resp) = check_http_method(&method, state.config.http.enable_cors) {
        return Ok(resp);
    }

    // 2. Check body size
    if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
        return Ok(resp);
    }

    // 3. Parse the resource path and dispatch
    let options = QueryOptions::parse(query.as_deref());
    let mut resp = match path::parse(&request_path) {
        Some(route) => dispatch(req, &state, route, &options).await?,
        None => response::not_found("no route matches the request path"),
    };

    apply_ambient_headers(&mut resp, &state);

    let status = resp.status().as_u16();
    logger::log_operation(method.as_str(), &request_path, status);

    if state.config.logging.access_log {
        let mut entry =
            AccessLogEntry::new(peer_addr.ip().to_string(), method.to_string(), request_path);
        entry.query = query;
        entry.http_version = http_version_label(version).to_string();
        entry.status = status;
        entry.body_bytes =
            usize::try_from(resp.body().size_hint().exact().unwrap_or(0)).unwrap_or(usize::MAX);
        entry.user_agent = user_agent;
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(resp)
}

/// Dispatch a parsed path + method pair to its operation handler.
///
/// A path that parses but carries the wrong method is 405, not 404.
async fn dispatch(
    req: Request<hyper::body::Incoming>,
    state: &Arc<AppState>,
    route: ODataPath,
    options: &QueryOptions,
) -> Result<Response<Full<Bytes>>, Infallible> {
    match (req.method().clone(), route) {
        (Method::GET, ODataPath::Accounts) => handlers::list_accounts(state, options).await,
        (Method::GET, ODataPath::PayinPis { account_id }) => {
            handlers::list_payin_pis(state, account_id, options).await
        }
        (Method::POST, ODataPath::PayinPis { account_id }) => {
            handlers::add_payin_pi(req, state, account_id).await
        }
        (
            Method::GET,
            ODataPath::PayinPi {
                account_id,
                payment_instrument_id,
            },
        ) => handlers::get_payin_pi(state, account_id, payment_instrument_id).await,
        (
            Method::PUT,
            ODataPath::PayinPi {
                account_id,
                payment_instrument_id,
            },
        ) => handlers::update_payin_pi(req, state, account_id, payment_instrument_id).await,
        (
            Method::DELETE,
            ODataPath::PayinPi {
                account_id,
                payment_instrument_id,
            },
        ) => handlers::delete_payin_pi(state, account_id, payment_instrument_id).await,
        (Method::GET, ODataPath::PayoutPi { account_id }) => {
            handlers::get_payout_pi(state, account_id).await
        }
        (Method::PUT, ODataPath::PayoutPi { account_id }) => {
            handlers::replace_payout_pi(req, state, account_id).await
        }
        (Method::DELETE, ODataPath::PayoutPi { account_id }) => {
            handlers::delete_payout_pi(state, account_id).await
        }
        (
            Method::GET,
            ODataPath::PayinPisCount {
                account_id,
                name_contains,
            },
        ) => handlers::get_payin_pis_count(state, account_id, &name_contains).await,
        (Method::POST, ODataPath::ResetDataSource) => handlers::reset_data_source(state).await,
        _ => Ok(response::method_not_allowed()),
    }
}

/// Routable methods pass through; OPTIONS is answered directly; anything
/// else is 405.
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::POST | Method::PUT | Method::DELETE => None,
        Method::OPTIONS => Some(response::options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(response::method_not_allowed())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(
    req: &Request<hyper::body::Incoming>,
    max_body_size: u64,
) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(response::payload_too_large())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Server identification and CORS headers applied to every routed response.
fn apply_ambient_headers(resp: &mut Response<Full<Bytes>>, state: &AppState) {
    if let Ok(value) = HeaderValue::from_str(&state.config.http.server_name) {
        resp.headers_mut().insert(SERVER, value);
    }
    if state.config.http.enable_cors {
        resp.headers_mut()
            .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    }
}

fn http_version_label(version: hyper::Version) -> &'static str {
    if version == hyper::Version::HTTP_10 {
        "1.0"
    } else if version == hyper::Version::HTTP_2 {
        "2"
    } else {
        "1.1"
    }
}
