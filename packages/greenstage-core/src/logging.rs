//! Compile-time gated debug logging utilities for the scheduler.

/// Emit scheduler debug logs only when the `sched_debug_logs` Cargo feature
/// is enabled.
///
/// Each line is tagged with the logging thread's name. Task bodies run on
/// threads named `greenstage-task-{id}`, so the tag identifies which task
/// (or the tick driver) produced the line without any extra plumbing.
///
/// With the feature disabled (default), this macro compiles to a no-op while
/// still type-checking format arguments.
#[macro_export]
macro_rules! sched_debug_log {
    ($($arg:tt)*) => {{
        #[cfg(feature = "sched_debug_logs")]
        {
            eprintln!(
                "[sched {}] {}",
                ::std::thread::current().name().unwrap_or("<unnamed>"),
                format_args!($($arg)*)
            );
        }
        #[cfg(not(feature = "sched_debug_logs"))]
        {
            let _ = format_args!($($arg)*);
        }
    }};
}
