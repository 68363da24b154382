/// Log a warning the first time the call site is reached and never again.
///
/// Degenerate geometry (zero-length normals, singular matrices) tends to
/// recur every frame once it happens at all; warning once keeps the signal
/// without flooding the log at animation rates.
#[macro_export]
macro_rules! warn_once {
    ($($arg:tt)+) => {{
        static ONCE: ::std::sync::Once = ::std::sync::Once::new();
        ONCE.call_once(|| {
            ::log::warn!($($arg)+);
        });
    }};
}
