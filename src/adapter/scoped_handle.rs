//! See [ScopedHandle].

use super::types::{AdtError, AdtHandle, AdtOperations, AdtStatus};
use crate::lifecycle::TrackedValue;
use tracing::warn;


/// Scoped acquisition of a container instance: the handle obtained from [AdtOperations::create()] is given to
/// [AdtOperations::destroy()] exactly once -- either explicitly, through [Self::close()], or when this object goes out
/// of scope (on early returns after failures).
///
/// [Self::peek()] borrows from `self`, so a peeked value can't be held across `insert()` / `remove()`.
pub struct ScopedHandle<'a, Ops: AdtOperations + ?Sized> {
    ops:    &'a mut Ops,
    handle: AdtHandle,
    open:   bool,
}

impl<'a, Ops: AdtOperations + ?Sized> ScopedHandle<'a, Ops> {

    /// creates a new container instance through `ops`
    pub fn open(ops: &'a mut Ops) -> Result<Self, AdtError> {
        let handle = ops.create()?;
        Ok(Self { ops, handle, open: true })
    }

    pub fn handle(&self) -> AdtHandle {
        self.handle
    }

    pub fn name(&self) -> &str {
        self.ops.name()
    }

    pub fn insert(&mut self, value: TrackedValue) -> AdtStatus {
        self.ops.insert(self.handle, value)
    }

    pub fn remove(&mut self) -> Result<TrackedValue, AdtError> {
        self.ops.remove(self.handle)
    }

    pub fn peek(&self) -> Result<&TrackedValue, AdtError> {
        self.ops.peek(self.handle)
    }

    pub fn size(&self) -> Result<Option<usize>, AdtError> {
        self.ops.size(self.handle)
    }

    /// destroys the instance, reporting the outcome
    pub fn close(mut self) -> AdtStatus {
        self.open = false;
        self.ops.destroy(self.handle)
    }
}

impl<Ops: AdtOperations + ?Sized> Drop for ScopedHandle<'_, Ops> {
    fn drop(&mut self) {
        if self.open {
            self.open = false;
            if let Err(error) = self.ops.destroy(self.handle) {
                warn!(container = self.ops.name(), handle = %self.handle, %error, "teardown failed");
            }
        }
    }
}
