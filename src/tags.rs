//! Span tag and event names recorded by the interceptor.
//!
//! The names follow the OpenTracing conventions that existing dashboards and
//! alerting already key on, so they are pinned here as constants rather than
//! taken from the evolving semantic-conventions catalog.

/// Method of the request; [`RMQ_METHOD`] for message-queue requests.
pub const HTTP_METHOD: &str = "http.method";

/// URL of the request: the request path for HTTP, the routing key for
/// messages.
pub const HTTP_URL: &str = "http.url";

/// Numeric status code recorded when the handler completes.
pub const HTTP_STATUS_CODE: &str = "http.status_code";

/// Sampling priority, forced to `1` on failures so errored traces are
/// retained.
pub const SAMPLING_PRIORITY: &str = "sampling.priority";

/// Boolean tag marking the span as errored.
pub const ERROR: &str = "error";

/// Constant method marker tagged on spans for message-queue requests.
pub const RMQ_METHOD: &str = "rmq";

/// Event recorded when an inbound request reaches the interceptor.
pub const EVENT_REQUEST_RECEIVED: &str = "request received";

/// Event recorded after the handler completes, just before the span ends.
pub const EVENT_REQUEST_END: &str = "request end";

/// Event recorded for a handler failure; carries a [`ERROR_MESSAGE`]
/// attribute with the failure description.
pub const EVENT_ERROR: &str = "error";

/// Attribute key on the [`EVENT_ERROR`] event holding the failure message.
pub const ERROR_MESSAGE: &str = "message";
