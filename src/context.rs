// Copyright 2024-2026, NVIDIA CORPORATION & AFFILIATES. All rights reserved.
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions
// are met:
//  * Redistributions of source code must retain the above copyright
//    notice, this list of conditions and the following disclaimer.
//  * Redistributions in binary form must reproduce the above copyright
//    notice, this list of conditions and the following disclaimer in the
//    documentation and/or other materials provided with the distribution.
//  * Neither the name of NVIDIA CORPORATION nor the names of its
//    contributors may be used to endorse or promote products derived
//    from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS ``AS IS'' AND ANY
// EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR
// PURPOSE ARE DISCLAIMED.  IN NO EVENT SHALL THE COPYRIGHT OWNER OR
// CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL,
// EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO,
// PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR
// PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY
// OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT
// (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! Per-call deadlines and cancellation.
//!
//! Every client call takes a [`CallContext`]. The context bounds how long
//! the call may wait for the server and lets another task abandon it early
//! through a shared [`CancelToken`].
//!
//! ```rust
//! use std::time::Duration;
//! use tritonclient::context::{CallContext, CancelToken};
//!
//! let token = CancelToken::new();
//! let ctx = CallContext::new()
//!     .timeout(Duration::from_millis(250))
//!     .cancel_token(token.clone());
//!
//! // Elsewhere: token.cancel();
//! # let _ = ctx;
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use crate::error::{Error, Result, TransportErrorKind};

/// A cloneable handle that cancels every call it is attached to.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelState>,
}

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    /// Creates a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the token, waking every call waiting on it. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves when the token is cancelled.
    pub async fn cancelled(&self) {
        loop {
            // Register before checking the flag so a concurrent cancel()
            // cannot slip between the check and the wait.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Deadline and cancellation settings for a single client call.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    timeout: Option<Duration>,
    cancel: Option<CancelToken>,
}

impl CallContext {
    /// A context with no deadline and no cancellation token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the whole call, including connection setup, by `timeout`.
    #[must_use]
    pub fn timeout(self, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..self
        }
    }

    /// Attaches a cancellation token.
    #[must_use]
    pub fn cancel_token(self, token: CancelToken) -> Self {
        Self {
            cancel: Some(token),
            ..self
        }
    }

    /// Returns the configured deadline.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the attached cancellation token.
    #[must_use]
    pub fn token(&self) -> Option<&CancelToken> {
        self.cancel.as_ref()
    }

    /// Drives `fut` to completion unless the deadline elapses or the token
    /// is cancelled first. Dropping `fut` abandons the underlying call.
    pub(crate) async fn run<T, F>(&self, operation: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(cancelled(operation));
        }

        let guarded = async {
            match &self.cancel {
                Some(token) => tokio::select! {
                    biased;
                    () = token.cancelled() => Err(cancelled(operation)),
                    result = fut => result,
                },
                None => fut.await,
            }
        };

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, guarded).await.map_err(|_| {
                tracing::debug!(operation, ?limit, "call deadline elapsed");
                Error::transport(
                    TransportErrorKind::Timeout,
                    format!("{operation} did not complete within {limit:?}"),
                )
            })?,
            None => guarded.await,
        }
    }
}

fn cancelled(operation: &str) -> Error {
    tracing::debug!(operation, "call cancelled");
    Error::transport(
        TransportErrorKind::Cancelled,
        format!("{operation} was cancelled"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_within_deadline() {
        let ctx = CallContext::new().timeout(Duration::from_secs(5));
        let value = ctx.run("op", async { Ok::<_, Error>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn deadline_elapses() {
        let ctx = CallContext::new().timeout(Duration::from_millis(20));
        let err = ctx
            .run("op", async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<(), Error>(())
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Transport {
                kind: TransportErrorKind::Timeout,
                ..
            }
        ));
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn cancel_wakes_pending_call() {
        let token = CancelToken::new();
        let ctx = CallContext::new().cancel_token(token.clone());
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });
        let err = ctx
            .run("op", async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<(), Error>(())
            })
            .await
            .unwrap_err();
        canceller.await.unwrap();
        assert!(matches!(
            err,
            Error::Transport {
                kind: TransportErrorKind::Cancelled,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn already_cancelled_token_short_circuits() {
        let token = CancelToken::new();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
        let ctx = CallContext::new().cancel_token(token);
        let result = ctx
            .run("op", async { Err::<(), _>(Error::NotFound("polled".into())) })
            .await;
        assert!(result.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn errors_pass_through() {
        let ctx = CallContext::new();
        let err = ctx
            .run::<(), _>("op", async { Err(Error::NotFound("x".into())) })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
