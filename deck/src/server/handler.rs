//! Request routing for the proxy endpoint

use std::convert::Infallible;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::header::{ALLOW, CONTENT_TYPE, HeaderValue};
use hyper::{Method, Request, Response, StatusCode};
use tracing::{debug, error};

use crate::upstream::{PageRequest, UserSource};

/// Path of the pagination proxy
pub const DATA_PATH: &str = "/api/data";

/// hyper entry point
pub async fn handle(req: Request<Incoming>, source: Arc<dyn UserSource>) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);
    Ok(respond(&method, &path, query.as_deref(), source.as_ref()).await)
}

/// Route a request and build the response
///
/// POST is accepted for compatibility and reads the same query parameters as
/// GET; the request body is ignored.
pub async fn respond(
    method: &Method,
    path: &str,
    query: Option<&str>,
    source: &dyn UserSource,
) -> Response<Full<Bytes>> {
    debug!(%method, %path, ?query, "respond: called");

    if path != DATA_PATH {
        debug!(%path, "respond: unknown path");
        return error_response(StatusCode::NOT_FOUND, "Not Found");
    }

    if *method != Method::GET && *method != Method::POST {
        debug!(%method, "respond: method not allowed");
        let mut response = error_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
        response
            .headers_mut()
            .insert(ALLOW, HeaderValue::from_static("GET, POST"));
        return response;
    }

    let request = PageRequest::from_query(query);
    match source.fetch_raw(request).await {
        Ok(body) => {
            debug!(?request, bytes = body.len(), "respond: page relayed");
            json_response(StatusCode::OK, body)
        }
        Err(e) => {
            error!(?request, error = %e, "Error fetching users from upstream");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "error": message });
    json_response(status, Bytes::from(body.to_string()))
}

fn json_response(status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
