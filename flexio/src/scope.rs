//! Scope guard releasing a `FlexStream` on every exit path.

use std::ops::{Deref, DerefMut};

use tracing::warn;

use crate::error::FlexError;
use crate::flex::FlexStream;

/// Returned by [`FlexStream::scope`].
///
/// Dereferences to the stream itself. Dropping the guard releases the
/// stream, also while unwinding from a panic; a release failure there can
/// only be logged, so call [`finish`](Scope::finish) to observe it.
pub struct Scope<'a, 's> {
    stream: &'a mut FlexStream<'s>,
}

impl<'a, 's> Scope<'a, 's> {
    pub(crate) fn new(stream: &'a mut FlexStream<'s>) -> Self {
        Self { stream }
    }

    /// Leave the scope, releasing the stream.
    ///
    /// # Errors
    /// Returns `Release` if closing an owned handle fails.
    pub fn finish(self) -> Result<(), FlexError> {
        self.stream.release()
    }
}

impl<'s> Deref for Scope<'_, 's> {
    type Target = FlexStream<'s>;

    fn deref(&self) -> &Self::Target {
        self.stream
    }
}

impl DerefMut for Scope<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.stream
    }
}

impl Drop for Scope<'_, '_> {
    fn drop(&mut self) {
        if let Err(e) = self.stream.release() {
            warn!(kind = %self.stream.source_kind(), error = %e, "release at scope exit failed");
        }
    }
}
