//! The trace-context carrier convention shared by both transports.
//!
//! A carrier is a plain string-keyed mapping holding propagated trace
//! identifiers. The same shape serves extraction from an inbound transport
//! and injection into the outbound mapping attached for downstream
//! propagation. Inbound and outbound carriers are always distinct mappings;
//! the outbound one is newly built by [`inject_new_carrier`], never an
//! inbound carrier mutated in place.

use std::collections::HashMap;

use opentelemetry::propagation::TextMapPropagator;
use opentelemetry::Context;

/// A string-keyed mapping carrying propagated trace identifiers.
///
/// The `opentelemetry` crate provides the [`Extractor`] and [`Injector`]
/// implementations for this type.
///
/// [`Extractor`]: opentelemetry::propagation::Extractor
/// [`Injector`]: opentelemetry::propagation::Injector
pub type Carrier = HashMap<String, String>;

/// Field name under which message properties hold the trace carrier.
///
/// Producers store the carrier under this field on the message envelope, and
/// the interceptor re-stores the server span's own carrier there before the
/// handler runs. The field is named for the tracing system; it is not a real
/// transport header. Framework adapters mapping wire-level message headers
/// into [`MessageProperties`] should read and write this field.
///
/// [`MessageProperties`]: crate::request::MessageProperties
pub const CARRIER_FIELD: &str = "jaeger";

/// The propagation format spoken by default: Jaeger's `uber-trace-id`.
pub fn default_propagator() -> opentelemetry_jaeger_propagator::Propagator {
    opentelemetry_jaeger_propagator::Propagator::new()
}

/// Injects the context of `cx`'s active span into a newly built carrier.
pub(crate) fn inject_new_carrier(propagator: &dyn TextMapPropagator, cx: &Context) -> Carrier {
    let mut carrier = Carrier::new();
    propagator.inject_context(cx, &mut carrier);
    carrier
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::{
        SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState,
    };

    fn remote_context() -> Context {
        Context::new().with_remote_span_context(SpanContext::new(
            TraceId::from_u128(0x4d_0000_0000_0000_0016),
            SpanId::from_u64(0x0001_7c29),
            TraceFlags::SAMPLED,
            true,
            TraceState::default(),
        ))
    }

    #[test]
    fn outbound_carrier_is_fresh_and_round_trips() {
        let propagator = default_propagator();
        let cx = remote_context();

        let carrier = inject_new_carrier(&propagator, &cx);
        assert!(!carrier.is_empty());

        let restored = propagator.extract(&carrier);
        let restored = restored.span().span_context().clone();
        assert_eq!(restored.trace_id(), cx.span().span_context().trace_id());
        assert_eq!(restored.span_id(), cx.span().span_context().span_id());
    }

    #[test]
    fn missing_trace_data_yields_no_parent() {
        let propagator = default_propagator();
        let cx = propagator.extract(&Carrier::new());
        assert!(!cx.span().span_context().is_valid());
    }

    #[test]
    fn invalid_context_injects_nothing() {
        let propagator = default_propagator();
        let carrier = inject_new_carrier(&propagator, &Context::new());
        assert!(carrier.is_empty());
    }
}
