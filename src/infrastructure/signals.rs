//! Interrupt handling
//!
//! Ctrl+C cancels a token instead of exiting from inside a handler. The run
//! as a whole selects on the token, as do the send and the body stream, so
//! pending work is dropped and its file guards clean up before the process
//! exits.

use tokio_util::sync::CancellationToken;

/// Spawns a task that cancels the returned token on the first Ctrl+C.
///
/// Once the listener is registered the default SIGINT action is gone for the
/// rest of the process, so install it first thing in `main`.
pub fn install_interrupt_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::debug!("interrupt received");
                trigger.cancel();
            }
            Err(e) => tracing::warn!(error = %e, "could not listen for interrupts"),
        }
    });
    token
}
