//! The span lifecycle manager: one server span per intercepted request,
//! finished exactly once on every completion path.

use std::fmt;
use std::future::Future;

use opentelemetry::otel_debug;
use opentelemetry::propagation::TextMapPropagator;
use opentelemetry::trace::{SpanKind, Status, TraceContextExt, Tracer};
use opentelemetry::{Context, KeyValue};
use opentelemetry_http::HeaderExtractor;

use crate::carrier::{self, default_propagator};
use crate::request::{
    HandlerError, HandlerResponse, HttpRequest, InboundRequest, InterceptOutcome, MessageDelivery,
};
use crate::tags;

/// Intercepts inbound requests and manages the span lifecycle around the
/// downstream handler.
///
/// One interceptor is constructed at startup with the process-wide tracer and
/// the propagation format, and is shared read-only across all concurrently
/// handled requests. Each call to [`intercept`] owns its span exclusively:
/// the span is started before the handler runs and ended exactly once when
/// the handler's future resolves, so no span is ever shared across requests
/// or touched after it ends.
///
/// [`intercept`]: RequestInterceptor::intercept
pub struct RequestInterceptor<T> {
    tracer: T,
    propagator: Box<dyn TextMapPropagator + Send + Sync>,
}

impl<T: fmt::Debug> fmt::Debug for RequestInterceptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestInterceptor")
            .field("tracer", &self.tracer)
            .finish_non_exhaustive()
    }
}

impl<T> RequestInterceptor<T>
where
    T: Tracer,
    T::Span: Send + Sync + 'static,
{
    /// An interceptor speaking the default Jaeger propagation format.
    pub fn new(tracer: T) -> Self {
        Self::with_propagator(tracer, default_propagator())
    }

    /// An interceptor with an explicit propagation format.
    pub fn with_propagator<P>(tracer: T, propagator: P) -> Self
    where
        P: TextMapPropagator + Send + Sync + 'static,
    {
        RequestInterceptor {
            tracer,
            propagator: Box::new(propagator),
        }
    }

    /// Intercepts one inbound request, invoking `handler` exactly once with
    /// the envelope enriched by the transport-specific trace fields.
    ///
    /// The handler's completion, value or error, is observed exactly once and
    /// finalizes the span on that observation.
    pub async fn intercept<F, Fut>(&self, request: InboundRequest, handler: F) -> InterceptOutcome
    where
        F: FnOnce(InboundRequest) -> Fut,
        Fut: Future<Output = Result<HandlerResponse, HandlerError>>,
    {
        match request {
            InboundRequest::Http(request) => self.handle_http(request, handler).await,
            InboundRequest::Message(message) => self.handle_message(message, handler).await,
        }
    }

    /// Extraction from headers never fails; absent trace headers simply yield
    /// a root span. Failures without a response payload are suppressed after
    /// being recorded, see the crate-level documentation.
    async fn handle_http<F, Fut>(&self, mut request: HttpRequest, handler: F) -> InterceptOutcome
    where
        F: FnOnce(InboundRequest) -> Fut,
        Fut: Future<Output = Result<HandlerResponse, HandlerError>>,
    {
        let parent_cx = self
            .propagator
            .extract(&HeaderExtractor(&request.headers));
        let span = self
            .tracer
            .span_builder(request.path.clone())
            .with_kind(SpanKind::Server)
            .start_with_context(&self.tracer, &parent_cx);
        let cx = parent_cx.with_span(span);
        {
            let span = cx.span();
            span.add_event(tags::EVENT_REQUEST_RECEIVED, Vec::new());
            span.set_attribute(KeyValue::new(
                tags::HTTP_METHOD,
                request.method.as_str().to_owned(),
            ));
            span.set_attribute(KeyValue::new(tags::HTTP_URL, request.path.clone()));
        }
        request.trace_carrier = Some(carrier::inject_new_carrier(self.propagator.as_ref(), &cx));
        request.trace_context = Some(cx.clone());

        match handler(InboundRequest::Http(request)).await {
            Ok(response) => {
                let span = cx.span();
                span.set_attribute(KeyValue::new(
                    tags::HTTP_STATUS_CODE,
                    i64::from(response.status_code),
                ));
                span.add_event(tags::EVENT_REQUEST_END, Vec::new());
                span.end();
                InterceptOutcome::Completed(response)
            }
            Err(err) => {
                let status_code = err.response.as_ref().map(|r| r.status_code).unwrap_or(500);
                finish_failed_span(&cx, &err, status_code);
                if err.response.is_some() {
                    InterceptOutcome::Failed(err)
                } else {
                    otel_debug!(
                        name: "RequestInterceptor.FailureSuppressed",
                        message = err.message.as_str()
                    );
                    InterceptOutcome::Suppressed
                }
            }
        }
    }

    /// Deliveries without a propagated carrier are not traced: no span, no
    /// envelope mutation, result and error passed through unchanged. Unlike
    /// the HTTP path, failures are always re-thrown.
    async fn handle_message<F, Fut>(
        &self,
        mut message: MessageDelivery,
        handler: F,
    ) -> InterceptOutcome
    where
        F: FnOnce(InboundRequest) -> Fut,
        Fut: Future<Output = Result<HandlerResponse, HandlerError>>,
    {
        let parent_cx = match message.properties.carrier.as_ref() {
            Some(inbound) => self.propagator.extract(inbound),
            None => {
                otel_debug!(
                    name: "RequestInterceptor.UntracedMessage",
                    routing_key = message.routing_key.as_str()
                );
                return match handler(InboundRequest::Message(message)).await {
                    Ok(response) => InterceptOutcome::Completed(response),
                    Err(err) => InterceptOutcome::Failed(err),
                };
            }
        };

        let span = self
            .tracer
            .span_builder(message.routing_key.clone())
            .with_kind(SpanKind::Server)
            .start_with_context(&self.tracer, &parent_cx);
        let cx = parent_cx.with_span(span);
        {
            let span = cx.span();
            span.add_event(tags::EVENT_REQUEST_RECEIVED, Vec::new());
            span.set_attribute(KeyValue::new(tags::HTTP_METHOD, tags::RMQ_METHOD));
            span.set_attribute(KeyValue::new(tags::HTTP_URL, message.routing_key.clone()));
        }
        // The envelope is the consumer's only channel for forwarding trace
        // data, so the inbound carrier is overwritten in place.
        message.properties.carrier =
            Some(carrier::inject_new_carrier(self.propagator.as_ref(), &cx));

        match handler(InboundRequest::Message(message)).await {
            Ok(response) => {
                let span = cx.span();
                span.set_attribute(KeyValue::new(
                    tags::HTTP_STATUS_CODE,
                    i64::from(response.status_code),
                ));
                span.add_event(tags::EVENT_REQUEST_END, Vec::new());
                span.end();
                InterceptOutcome::Completed(response)
            }
            Err(err) => {
                // The status comes from the failure itself here, not from its
                // response payload.
                let status_code = err.status_code.unwrap_or(500);
                finish_failed_span(&cx, &err, status_code);
                InterceptOutcome::Failed(err)
            }
        }
    }
}

/// Records the failure on the active span and ends it: sampling priority and
/// error tags, the `error` event, the resolved status code, the `request end`
/// event, and an error status.
fn finish_failed_span(cx: &Context, err: &HandlerError, status_code: u16) {
    let span = cx.span();
    span.set_attribute(KeyValue::new(tags::SAMPLING_PRIORITY, 1_i64));
    span.set_attribute(KeyValue::new(tags::ERROR, true));
    span.add_event(
        tags::EVENT_ERROR,
        vec![KeyValue::new(tags::ERROR_MESSAGE, err.message.clone())],
    );
    span.set_attribute(KeyValue::new(
        tags::HTTP_STATUS_CODE,
        i64::from(status_code),
    ));
    span.add_event(tags::EVENT_REQUEST_END, Vec::new());
    span.set_status(Status::error(err.message.clone()));
    span.end();
}
