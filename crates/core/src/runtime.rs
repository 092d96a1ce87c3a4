//! Global Async Runtime
//!
//! Provides a shared Tokio runtime for synchronous callers. The command
//! layer uses it to drive the async storage API from plain function calls.

use once_cell::sync::Lazy;
use tokio::runtime::Runtime;

/// Global shared Tokio runtime
///
/// This runtime is initialized lazily on first use. It is used for:
/// - Command handlers (`commands::dispatch`)
/// - Background work started by embedders via [`spawn`]
pub static RUNTIME: Lazy<Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .thread_name("promptdock-rt")
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime")
});

/// Spawn a future on the global runtime
pub fn spawn<F>(future: F) -> tokio::task::JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    RUNTIME.spawn(future)
}

/// Run a future to completion (blocking the current thread)
///
/// Must not be called from inside an async context.
pub fn block_on<F: std::future::Future>(future: F) -> F::Output {
    RUNTIME.block_on(future)
}
