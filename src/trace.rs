//! Pipeline instrumentation that compiles away without the `tracing` feature.
//!
//! Every hook takes a static name and `key = value` fields. With the feature
//! off, spans become [`NoopSpan`] and events only evaluate their fields, so
//! call sites need no `cfg` of their own.

/// Opens an info span around a pipeline stage; pair with `.entered()`.
#[cfg(feature = "tracing")]
macro_rules! trace_span {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::info_span!($name, $($key = $value),+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_span {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {{
        let _ = ($($value,)+);
        $crate::trace::NoopSpan
    }};
}

/// Stage summary at info level.
#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::info!(name: $name, $($key = $value),+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        let _ = ($($value,)+);
    };
}

/// Per-item detail at debug level, for batch loops.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::debug!(name: $name, $($key = $value),+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        let _ = ($($value,)+);
    };
}

pub(crate) use trace_debug;
pub(crate) use trace_event;
pub(crate) use trace_span;

/// Guard returned by `trace_span!` when tracing is compiled out.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Same shape as `tracing::Span::entered`.
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}
