//! Defines the contract between the harness and any container under test -- see [AdtOperations].

use crate::lifecycle::TrackedValue;
use std::fmt::{Display, Formatter};
use thiserror::Error;


/// Opaque reference to a container instance -- meaningful only to the [AdtOperations] that issued it
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct AdtHandle(u64);

impl AdtHandle {
    /// the handle no adapter ever issues
    pub const NULL: AdtHandle = AdtHandle(0);

    pub(crate) fn from_id(id: u64) -> Self {
        Self(id)
    }

    pub(crate) fn id(&self) -> u64 {
        self.0
    }

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl Display for AdtHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Failures that may cross the adapter boundary. None of them ever unwinds: they are all returned as values.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum AdtError {
    /// the handle is null or was already destroyed -- an adapter or driver bug
    #[error("invalid handle: null or already destroyed")]
    InvalidHandle,
    /// no elements to `remove()` or `peek()` -- a normal control signal
    #[error("the container is empty")]
    Empty,
    /// the container could not be built or could not grow
    #[error("allocation failed")]
    Allocation,
    /// a table was assembled without one of the mandatory capabilities
    #[error("operation table lacks the mandatory '{0}' capability")]
    MissingCapability(&'static str),
    /// a container primitive panicked -- caught at the adapter boundary
    #[error("container panicked: {0}")]
    ContainerPanicked(String),
}

impl AdtError {
    /// the numeric result code for this error, as used by C ADT interfaces:
    /// `-1` null / missing capability, `-2` empty, `-3` allocation, `-4` other, `-5` invalid handle
    pub fn status_code(&self) -> i32 {
        match self {
            Self::MissingCapability(_) => -1,
            Self::Empty                => -2,
            Self::Allocation           => -3,
            Self::ContainerPanicked(_) => -4,
            Self::InvalidHandle        => -5,
        }
    }
}

/// Outcome of the capabilities that don't yield values
pub type AdtStatus = Result<(), AdtError>;

/// `0` for success or the [AdtError::status_code()]
pub fn status_code<T>(result: &Result<T, AdtError>) -> i32 {
    match result {
        Ok(_)      => 0,
        Err(error) => error.status_code(),
    }
}

/// The uniform capability set every container under test is seen through.\
/// Implementors erase the concrete container type behind an [AdtHandle]; the generic implementation is
/// [super::OperationTable], which works for any [super::Container].
///
/// Ownership rules:
///   - a handle returned by [Self::create()] must be given to [Self::destroy()] exactly once -- see [super::ScopedHandle];
///   - [Self::remove()] transfers ownership of the value to the caller;
///   - [Self::peek()] lends a value from inside the container: the borrow ends before the next `insert()` / `remove()`
///     on the same table, as those require `&mut self`.
pub trait AdtOperations {

    /// a name for the container behind this table, for presentation purposes
    fn name(&self) -> &str;

    /// builds a fresh, empty container instance
    fn create(&mut self) -> Result<AdtHandle, AdtError>;

    /// releases the instance -- any values still inside are dropped along with it
    fn destroy(&mut self, handle: AdtHandle) -> AdtStatus;

    fn insert(&mut self, handle: AdtHandle, value: TrackedValue) -> AdtStatus;

    fn remove(&mut self, handle: AdtHandle) -> Result<TrackedValue, AdtError>;

    fn peek(&self, handle: AdtHandle) -> Result<&TrackedValue, AdtError>;

    /// the number of elements, if the container keeps track of it (`Ok(None)` otherwise)
    fn size(&self, _handle: AdtHandle) -> Result<Option<usize>, AdtError> {
        Ok(None)
    }
}
