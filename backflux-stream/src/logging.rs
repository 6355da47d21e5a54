// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

// Conditional logging shim: uses `tracing` when enabled. Without it warnings still
// reach stderr while debug and trace output compile to nothing.

#[cfg(feature = "tracing")]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        tracing::warn!($($arg)*);
    }};
}

#[cfg(feature = "tracing")]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        tracing::debug!($($arg)*);
    }};
}

#[cfg(feature = "tracing")]
macro_rules! log_trace {
    ($($arg:tt)*) => {{
        tracing::trace!($($arg)*);
    }};
}

#[cfg(not(feature = "tracing"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        eprintln!($($arg)*);
    }};
}

#[cfg(not(feature = "tracing"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        let _ = format_args!($($arg)*);
    }};
}

#[cfg(not(feature = "tracing"))]
macro_rules! log_trace {
    ($($arg:tt)*) => {{
        let _ = format_args!($($arg)*);
    }};
}
