//! Cooperative cancellation for repository calls.
//!
//! A [`CancellationToken`] is shared between a [`Database`](crate::Database)
//! and whoever may want to abort its in-flight work. Repository calls check
//! the token at fixed checkpoints inside their transaction; once the token
//! is cancelled the call returns [`Error::Cancelled`] and the transaction is
//! dropped, which rolls it back.
//!
//! # Examples
//!
//! ```
//! use wayplan::cancel::CancellationToken;
//!
//! let token = CancellationToken::new();
//! let handle = token.clone();
//! handle.cancel();
//! assert!(token.is_cancelled());
//! ```

pub use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Returns [`Error::Cancelled`] if `token` has been cancelled.
///
/// `stage` names the checkpoint for the debug log.
pub(crate) fn checkpoint(token: &CancellationToken, stage: &str) -> Result<()> {
    if token.is_cancelled() {
        log::debug!("cancellation observed at {stage}");
        return Err(Error::Cancelled);
    }
    Ok(())
}
