use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::SqlAdapterError;

/// Caller-supplied cancellation and deadline for one adapter call.
///
/// Every database round trip (checkout, ping, prepare, query, exec) is raced against the
/// token and the deadline. Whichever fires first aborts the round trip; nothing is retried.
///
/// ```rust
/// use std::time::Duration;
/// use datamapper_sql::prelude::*;
///
/// let ctx = CallContext::background().with_timeout(Duration::from_secs(5));
/// let child = ctx.child();
/// ctx.cancel();
/// assert!(child.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context that is never cancelled and has no deadline.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Wrap an existing token owned by the caller.
    #[must_use]
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Set a deadline; an earlier existing deadline wins.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// A context cancelled whenever this one is, with the same deadline.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail fast if the context is already done, without starting any work.
    ///
    /// # Errors
    /// Returns `Cancelled` or `DeadlineExceeded`.
    pub fn check(&self) -> Result<(), SqlAdapterError> {
        if self.token.is_cancelled() {
            return Err(SqlAdapterError::Cancelled);
        }
        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            return Err(SqlAdapterError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Drive one round trip to completion unless the context ends first.
    ///
    /// # Errors
    /// Returns `Cancelled`/`DeadlineExceeded` when the context wins the race, otherwise
    /// whatever the round trip returned.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, SqlAdapterError>
    where
        F: Future<Output = Result<T, SqlAdapterError>>,
    {
        self.check()?;
        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            biased;
            () = self.token.cancelled() => Err(SqlAdapterError::Cancelled),
            () = deadline => Err(SqlAdapterError::DeadlineExceeded),
            res = fut => res,
        }
    }
}
