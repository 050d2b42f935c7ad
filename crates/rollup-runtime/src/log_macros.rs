/// Domain-aware logging macros.
///
/// Each macro injects a `domain` field so call sites never spell the string
/// literal. Domains in use: `sys` (process lifecycle), `data` (record loading
/// and rollup runs), `conf` (configuration resolution).
///
/// ```ignore
/// rl_info!(data, records = 12, path = %path.display(), "records loaded");
/// rl_debug!(conf, tz = %tz, "timezone resolved");
/// ```

/// Internal helper. Use `rl_error!` … `rl_trace!`.
#[doc(hidden)]
macro_rules! rl_log {
    ($level:ident, $domain:ident, $($field:tt)*) => {
        tracing::$level!(domain = stringify!($domain), $($field)*)
    };
}

#[allow(unused_macros)]
macro_rules! rl_error {
    ($domain:ident, $($rest:tt)*) => {
        rl_log!(error, $domain, $($rest)*)
    };
}

macro_rules! rl_warn {
    ($domain:ident, $($rest:tt)*) => {
        rl_log!(warn, $domain, $($rest)*)
    };
}

macro_rules! rl_info {
    ($domain:ident, $($rest:tt)*) => {
        rl_log!(info, $domain, $($rest)*)
    };
}

macro_rules! rl_debug {
    ($domain:ident, $($rest:tt)*) => {
        rl_log!(debug, $domain, $($rest)*)
    };
}

#[allow(unused_macros)]
macro_rules! rl_trace {
    ($domain:ident, $($rest:tt)*) => {
        rl_log!(trace, $domain, $($rest)*)
    };
}
