//! Attaches a distributed-tracing span to every inbound request a service
//! handles, whether the request arrived over HTTP or from a message queue.
//!
//! The interceptor wraps the downstream handler of the host framework. For
//! each request it extracts the propagated trace context from the transport,
//! starts a server span as a child of that context, re-injects the new span's
//! context into a fresh carrier for downstream propagation, and finishes the
//! span exactly once when the handler completes, on success and on failure
//! alike.
//!
//! Transport classification happens at the framework boundary: the adapter
//! builds an [`InboundRequest::Http`] or [`InboundRequest::Message`] envelope
//! and hands it to [`RequestInterceptor::intercept`] together with the
//! handler. Requests arriving over channels that are not request/response
//! shaped are simply never wrapped in an envelope and are not traced.
//!
//! The two transports differ deliberately:
//!
//! * **HTTP** requests are always traced. The outbound carrier and the live
//!   span handle are attached to the request envelope for downstream
//!   consumption, and the span is named verbatim after the request path.
//! * **Messages** are traced only when the producer propagated a carrier in
//!   the message properties (under [`CARRIER_FIELD`]). A carrier-less
//!   delivery produces no span and is passed through untouched. When a
//!   carrier is present it is overwritten in place with the freshly injected
//!   one, because the message envelope is the only channel available to pass
//!   trace data on to whatever the consumer produces downstream.
//!
//! # Failure-suppression asymmetry
//!
//! On the HTTP path, a handler failure that carries no structured response
//! payload is recorded on the span (error tags, `error` event, status 500)
//! and then **swallowed**: the caller receives
//! [`InterceptOutcome::Suppressed`], neither a value nor an error. Failures
//! with a response payload are re-thrown, and message-path failures are
//! always re-thrown. The suppression is long-standing observable behavior
//! that existing callers may depend on, so it is reproduced exactly and
//! surfaced as its own outcome variant rather than silently changed.
//! Integrators who consider it a defect should handle `Suppressed` at the
//! adapter level.
//!
//! # Examples
//!
//! ```
//! use opentelemetry::trace::TracerProvider as _;
//! use opentelemetry_request_interceptor::{
//!     HandlerResponse, HttpRequest, InboundRequest, RequestInterceptor,
//! };
//!
//! # async fn serve() {
//! let provider = opentelemetry_request_interceptor::init_tracer_provider(
//!     "orders-service",
//!     "http://localhost:4317",
//! )
//! .expect("tracer pipeline");
//! let interceptor = RequestInterceptor::new(provider.tracer("orders-service"));
//!
//! let request = InboundRequest::Http(HttpRequest::new(
//!     http::Method::GET,
//!     "/orders",
//!     http::HeaderMap::new(),
//! ));
//! let outcome = interceptor
//!     .intercept(request, |request| async move {
//!         // request now carries the outbound trace carrier and the live
//!         // span handle for downstream propagation.
//!         let _ = request;
//!         Ok(HandlerResponse::with_status(200))
//!     })
//!     .await;
//! # let _ = outcome;
//! # }
//! ```
#![warn(
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]
#![cfg_attr(
    docsrs,
    feature(doc_cfg, doc_auto_cfg),
    deny(rustdoc::broken_intra_doc_links)
)]
#![cfg_attr(test, deny(warnings))]

pub mod carrier;
pub mod init;
pub mod interceptor;
pub mod request;
pub mod tags;

pub use carrier::{default_propagator, Carrier, CARRIER_FIELD};
pub use init::{init_tracer_provider, InitError};
pub use interceptor::RequestInterceptor;
pub use request::{
    HandlerError, HandlerResponse, HttpRequest, InboundRequest, InterceptOutcome,
    MessageDelivery, MessageProperties,
};
