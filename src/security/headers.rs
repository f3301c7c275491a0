//! Response decoration with `X-Frame-Options`.
//!
//! # Responsibilities
//! - Wrap every route of the application
//! - Read the active policy when the response is produced
//! - Set the header at most once per response
//!
//! # Design Decisions
//! - The policy is read after the inner service responds, so an update that
//!   lands mid-request applies to that response
//! - `insert` replaces any value set further in, never appends
//! - No route exclusion: routing that should skip decoration must not be
//!   wrapped by this layer

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::{header::X_FRAME_OPTIONS, HeaderMap, Request, Response};
use tower::{Layer, Service};

use crate::observability::metrics;
use crate::policy::{HeaderPolicy, PolicyStore};

/// Apply `policy` to a response's headers. Returns true if the header was set.
pub fn decorate(headers: &mut HeaderMap, policy: &HeaderPolicy) -> bool {
    match policy.header_value() {
        Some(value) => {
            headers.insert(X_FRAME_OPTIONS, value);
            true
        }
        None => false,
    }
}

/// Layer that decorates responses from the active [`PolicyStore`] snapshot.
#[derive(Clone)]
pub struct XFrameLayer {
    store: Arc<PolicyStore>,
}

impl XFrameLayer {
    pub fn new(store: Arc<PolicyStore>) -> Self {
        Self { store }
    }
}

impl<S> Layer<S> for XFrameLayer {
    type Service = XFrameService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        XFrameService {
            inner,
            store: self.store.clone(),
        }
    }
}

#[derive(Clone)]
pub struct XFrameService<S> {
    inner: S,
    store: Arc<PolicyStore>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for XFrameService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let store = self.store.clone();
        let future = self.inner.call(req);

        Box::pin(async move {
            let mut response = future.await?;
            let policy = store.current();
            if decorate(response.headers_mut(), &policy) {
                metrics::record_header_emitted();
            }
            Ok(response)
        })
    }
}
