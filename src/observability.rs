use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("compass.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("compass.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("compass.client.request_duration_seconds");

pub(crate) static STREAM_CHUNKS: Counter = Counter::new("compass.stream.chunks");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("compass.stream.errors");
pub(crate) static STREAM_BYTES: Counter = Counter::new("compass.stream.bytes");
pub(crate) static STREAM_TTFB: Moments = Moments::new("compass.stream.ttfb_seconds");

pub(crate) static SESSION_TURNS: Counter = Counter::new("compass.session.turns");
pub(crate) static SESSION_TURNS_COMPLETED: Counter =
    Counter::new("compass.session.turns_completed");
pub(crate) static SESSION_TURNS_FAILED: Counter = Counter::new("compass.session.turns_failed");
pub(crate) static SESSION_REJECTED_SENDS: Counter =
    Counter::new("compass.session.rejected_sends");
pub(crate) static SESSION_TURN_DURATION: Moments =
    Moments::new("compass.session.turn_duration_seconds");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&STREAM_CHUNKS);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_counter(&STREAM_BYTES);
    collector.register_moments(&STREAM_TTFB);

    collector.register_counter(&SESSION_TURNS);
    collector.register_counter(&SESSION_TURNS_COMPLETED);
    collector.register_counter(&SESSION_TURNS_FAILED);
    collector.register_counter(&SESSION_REJECTED_SENDS);
    collector.register_moments(&SESSION_TURN_DURATION);
}
