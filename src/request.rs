//! Typed envelopes for the two traced transports, and handler outcomes.
//!
//! The host-framework adapter classifies each inbound invocation at the
//! boundary and builds the matching [`InboundRequest`] variant. Invocations
//! over channels that are not request/response shaped (a raw socket event,
//! for example) get no envelope and are never traced.

use opentelemetry::Context;

use crate::carrier::Carrier;

/// An inbound request as classified by the host-framework adapter.
#[derive(Debug)]
pub enum InboundRequest {
    /// A request received over HTTP.
    Http(HttpRequest),
    /// A delivery received from the message queue.
    Message(MessageDelivery),
}

/// An HTTP request envelope.
///
/// `trace_carrier` and `trace_context` start out empty and are attached by
/// the interceptor before the downstream handler runs: the carrier for
/// forwarding on outbound calls, the context as the live span handle for
/// adding tags or child spans.
#[derive(Debug)]
pub struct HttpRequest {
    /// Request method.
    pub method: http::Method,
    /// Request path, used verbatim as the span name. No normalization or
    /// path-parameter templating is applied.
    pub path: String,
    /// Inbound headers, the extraction carrier.
    pub headers: http::HeaderMap,
    /// Outbound carrier attached during interception.
    pub trace_carrier: Option<Carrier>,
    /// Live span handle attached during interception.
    pub trace_context: Option<Context>,
}

impl HttpRequest {
    /// Wraps an inbound request. The trace fields are attached later by the
    /// interceptor.
    pub fn new(method: http::Method, path: impl Into<String>, headers: http::HeaderMap) -> Self {
        HttpRequest {
            method,
            path: path.into(),
            headers,
            trace_carrier: None,
            trace_context: None,
        }
    }

    /// The carrier to forward on outbound calls, once intercepted.
    pub fn outbound_carrier(&self) -> Option<&Carrier> {
        self.trace_carrier.as_ref()
    }

    /// The context holding the live server span, once intercepted.
    pub fn trace_context(&self) -> Option<&Context> {
        self.trace_context.as_ref()
    }
}

/// The mutable properties object of a message delivery.
///
/// This is the one place the interceptor mutates in place: the message
/// envelope is the only channel available to pass trace data on to whatever
/// the consumer produces downstream, so the inbound carrier is overwritten
/// with the freshly injected one. On the wire the carrier lives under the
/// [`CARRIER_FIELD`] header.
///
/// [`CARRIER_FIELD`]: crate::carrier::CARRIER_FIELD
#[derive(Debug, Default)]
pub struct MessageProperties {
    /// Trace carrier propagated by the producer, if any.
    pub carrier: Option<Carrier>,
}

/// A message-queue delivery envelope.
#[derive(Debug)]
pub struct MessageDelivery {
    /// Read/write message properties holding the trace carrier.
    pub properties: MessageProperties,
    /// Routing key, used verbatim as the span name. Read-only.
    pub routing_key: String,
}

impl MessageDelivery {
    /// Wraps an inbound delivery with the carrier the producer propagated,
    /// if any.
    pub fn new(routing_key: impl Into<String>, carrier: Option<Carrier>) -> Self {
        MessageDelivery {
            properties: MessageProperties { carrier },
            routing_key: routing_key.into(),
        }
    }
}

/// Successful output of a downstream handler.
///
/// Only the status code participates in tracing; the body passes through the
/// interceptor untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    /// Status code tagged onto the span as `http.status_code`.
    pub status_code: u16,
    /// Opaque response body, ignored by the interceptor.
    pub body: Option<String>,
}

impl HandlerResponse {
    /// A response carrying a status code and no body.
    pub fn with_status(status_code: u16) -> Self {
        HandlerResponse {
            status_code,
            body: None,
        }
    }
}

/// Failure raised by a downstream handler.
///
/// The two transports read different parts of it: on the HTTP path the
/// presence of `response` decides between re-throw and suppression and its
/// status code supplies the status tag, while on the message path failures
/// are always re-thrown and `status_code` supplies the tag. Both default to
/// 500 when absent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HandlerError {
    /// Failure description, recorded on the span's `error` event.
    pub message: String,
    /// Status declared by the failure itself, read on the message path.
    pub status_code: Option<u16>,
    /// Structured response payload, if the failure carries one; read on the
    /// HTTP path.
    pub response: Option<HandlerResponse>,
}

impl HandlerError {
    /// A bare failure with no declared status and no response payload.
    pub fn new(message: impl Into<String>) -> Self {
        HandlerError {
            message: message.into(),
            status_code: None,
            response: None,
        }
    }

    /// Attaches a structured response payload.
    pub fn with_response(mut self, response: HandlerResponse) -> Self {
        self.response = Some(response);
        self
    }

    /// Declares a status code on the failure itself.
    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }
}

/// Completion of an intercepted request.
///
/// `Suppressed` occurs only on the HTTP path, for failures carrying no
/// structured response payload: the failure is fully recorded on the span and
/// then absorbed, so neither a value nor an error reaches the caller. See the
/// crate-level documentation for why this asymmetry is preserved.
#[derive(Debug)]
pub enum InterceptOutcome {
    /// The handler completed; its response passes through unchanged.
    Completed(HandlerResponse),
    /// The handler failed and the failure is re-thrown to the caller.
    Failed(HandlerError),
    /// The handler failed without a response payload; the failure was traced
    /// and then swallowed.
    Suppressed,
}

impl InterceptOutcome {
    /// Collapses the outcome into a `Result`, mapping a suppressed failure to
    /// `Ok(None)`.
    pub fn into_result(self) -> Result<Option<HandlerResponse>, HandlerError> {
        match self {
            InterceptOutcome::Completed(response) => Ok(Some(response)),
            InterceptOutcome::Failed(err) => Err(err),
            InterceptOutcome::Suppressed => Ok(None),
        }
    }
}
