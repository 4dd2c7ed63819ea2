//! Tower layer that puts a [`MessageGateway`] in front of any service.
//!
//! Requests that are not authenticated webhook calls reach the inner service
//! unchanged, so several consumers can share one route.

use crate::domain::config::{LimitsConfig, TimeoutConfig};
use crate::domain::context::InboundRequestContext;
use crate::domain::error::ProcessError;
use crate::gateway::{Authentication, GatewayReply, MessageGateway, NO_REPLY_BODY};
use axum::body::{to_bytes, Body, Bytes};
use axum::extract::Query;
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::response::Response;
use http_body_util::LengthLimitError;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{debug, warn};
use wx_01_signature::WebhookQuery;

#[derive(Debug, Clone)]
struct Budgets {
    max_body_size: usize,
    body_read: std::time::Duration,
}

/// Message gateway layer
#[derive(Clone)]
pub struct MessageGatewayLayer {
    gateway: Arc<MessageGateway>,
    budgets: Arc<Budgets>,
}

impl MessageGatewayLayer {
    pub fn new(gateway: Arc<MessageGateway>, limits: &LimitsConfig, timeouts: &TimeoutConfig) -> Self {
        Self {
            gateway,
            budgets: Arc::new(Budgets {
                max_body_size: limits.max_body_size,
                body_read: timeouts.body_read,
            }),
        }
    }
}

impl<S> Layer<S> for MessageGatewayLayer {
    type Service = MessageGatewayService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MessageGatewayService {
            inner,
            gateway: Arc::clone(&self.gateway),
            budgets: Arc::clone(&self.budgets),
        }
    }
}

/// Message gateway service
#[derive(Clone)]
pub struct MessageGatewayService<S> {
    inner: S,
    gateway: Arc<MessageGateway>,
    budgets: Arc<Budgets>,
}

impl<S> Service<Request<Body>> for MessageGatewayService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let gateway = Arc::clone(&self.gateway);
        let budgets = Arc::clone(&self.budgets);
        // Take the service that was driven to readiness, leave a clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let query = match Query::<WebhookQuery>::try_from_uri(req.uri()) {
                Ok(Query(query)) => query,
                Err(e) => {
                    debug!(error = %e, "Unparseable webhook query, passing through");
                    return inner.call(req).await;
                }
            };

            match gateway.authenticate(req.method(), &query) {
                Authentication::PassThrough => inner.call(req).await,
                Authentication::Echo(echostr) => Ok(text_response(StatusCode::OK, echostr)),
                Authentication::ReadBody => {
                    let method = req.method().clone();
                    let body = match read_body(req, &budgets).await {
                        Ok(body) => body,
                        Err(e) => {
                            warn!(error = %e, "Rejected webhook body");
                            return Ok(error_response(&e));
                        }
                    };

                    let ctx = InboundRequestContext::new(method, query).with_body(body);
                    match gateway.process(&ctx).await {
                        Ok(GatewayReply::Xml(xml)) => Ok(xml_response(xml)),
                        Ok(GatewayReply::NoReply) => {
                            Ok(text_response(StatusCode::OK, NO_REPLY_BODY.to_string()))
                        }
                        Err(e) => Ok(error_response(&e)),
                    }
                }
            }
        })
    }
}

/// Read the whole body within the size and time budgets.
async fn read_body(req: Request<Body>, budgets: &Budgets) -> Result<Bytes, ProcessError> {
    let too_large = ProcessError::BodyTooLarge {
        limit: budgets.max_body_size,
    };

    // Check content-length header first (fast path)
    let declared = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > budgets.max_body_size) {
        return Err(too_large);
    }

    match tokio::time::timeout(
        budgets.body_read,
        to_bytes(req.into_body(), budgets.max_body_size),
    )
    .await
    {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(e)) => {
            let e = e.into_inner();
            if exceeds_limit(&*e) {
                Err(too_large)
            } else {
                Err(ProcessError::BodyRead(e.to_string()))
            }
        }
        Err(_) => Err(ProcessError::BodyTimeout),
    }
}

/// Whether a buffering error was caused by the size limit.
fn exceeds_limit(error: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

fn text_response(status: StatusCode, body: String) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

fn xml_response(xml: String) -> Response {
    let mut response = Response::new(Body::from(xml));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/xml"),
    );
    response
}

/// Error response without detail; integrity failures get an empty body.
fn error_response(error: &ProcessError) -> Response {
    let status = error.status_code();
    let body = match status {
        StatusCode::UNAUTHORIZED => Body::empty(),
        _ => Body::from(status.canonical_reason().unwrap_or("error")),
    };
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
}
