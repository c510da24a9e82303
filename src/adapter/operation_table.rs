//! Function-pointer operation tables: adapts any concrete container to [AdtOperations] -- see [OperationTable].

use super::types::{AdtError, AdtHandle, AdtOperations, AdtStatus};
use crate::lifecycle::TrackedValue;
use std::{
    any::Any,
    collections::HashMap,
    panic::{self, AssertUnwindSafe},
};


/// The primitives a concrete container must offer to be tested through [OperationTable::for_container()].\
/// `insert()` / `remove()` / `peek()` map to push/pop/top, enqueue/dequeue/front or the priority queue equivalents.
pub trait Container: Sized {

    /// builds an empty container -- [AdtError::Allocation] if that is not possible
    fn try_new() -> Result<Self, AdtError>;

    /// [AdtError::Allocation] if the internal storage could not grow
    fn insert(&mut self, value: TrackedValue) -> Result<(), AdtError>;

    fn remove(&mut self) -> Option<TrackedValue>;

    fn peek(&self) -> Option<&TrackedValue>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

type CreateFn<C>  = fn() -> Result<C, AdtError>;
type DestroyFn<C> = fn(C);
type InsertFn<C>  = fn(&mut C, TrackedValue) -> Result<(), AdtError>;
type RemoveFn<C>  = fn(&mut C) -> Option<TrackedValue>;
type PeekFn<C>    = fn(&C) -> Option<&TrackedValue>;
type LenFn<C>     = fn(&C) -> usize;

/// An immutable set of capabilities over containers of type `C`, plus the instances created through it.\
/// Every primitive call is shielded: bad handles, emptiness, allocation failures and even panics become [AdtError]s.
///
/// Build one with [Self::builder()] -- all five mandatory capabilities must be given -- or with [Self::for_container()].
pub struct OperationTable<C> {
    name:        String,
    create_fn:   CreateFn<C>,
    destroy_fn:  DestroyFn<C>,
    insert_fn:   InsertFn<C>,
    remove_fn:   RemoveFn<C>,
    peek_fn:     PeekFn<C>,
    len_fn:      Option<LenFn<C>>,
    instances:   HashMap<u64, C>,
    last_handle: u64,
}

impl<C> OperationTable<C> {

    /// starts assembling a table named `name`
    pub fn builder(name: impl Into<String>) -> OperationTableBuilder<C> {
        OperationTableBuilder {
            name:    name.into(),
            create:  None,
            destroy: None,
            insert:  None,
            remove:  None,
            peek:    None,
            len:     None,
        }
    }

    /// number of instances created but not yet destroyed
    pub fn live_instances(&self) -> usize {
        self.instances.len()
    }

    fn instance(&self, handle: AdtHandle) -> Result<&C, AdtError> {
        self.instances.get(&handle.id()).ok_or(AdtError::InvalidHandle)
    }

    fn instance_mut(&mut self, handle: AdtHandle) -> Result<&mut C, AdtError> {
        self.instances.get_mut(&handle.id()).ok_or(AdtError::InvalidHandle)
    }
}

impl<C: Container> OperationTable<C> {

    /// a complete table over the [Container] primitives of `C`
    pub fn for_container(name: impl Into<String>) -> Self {
        Self {
            name:        name.into(),
            create_fn:   C::try_new,
            destroy_fn:  drop::<C>,
            insert_fn:   C::insert,
            remove_fn:   C::remove,
            peek_fn:     C::peek,
            len_fn:      Some(C::len),
            instances:   HashMap::new(),
            last_handle: 0,
        }
    }
}

impl<C> AdtOperations for OperationTable<C> {

    fn name(&self) -> &str {
        &self.name
    }

    fn create(&mut self) -> Result<AdtHandle, AdtError> {
        let create_fn = self.create_fn;
        let container = shielded(create_fn)??;
        self.last_handle += 1;
        self.instances.insert(self.last_handle, container);
        Ok(AdtHandle::from_id(self.last_handle))
    }

    fn destroy(&mut self, handle: AdtHandle) -> AdtStatus {
        let container = self.instances.remove(&handle.id()).ok_or(AdtError::InvalidHandle)?;
        let destroy_fn = self.destroy_fn;
        shielded(|| destroy_fn(container))
    }

    fn insert(&mut self, handle: AdtHandle, value: TrackedValue) -> AdtStatus {
        let insert_fn = self.insert_fn;
        let container = self.instance_mut(handle)?;
        shielded(|| insert_fn(container, value))?
    }

    fn remove(&mut self, handle: AdtHandle) -> Result<TrackedValue, AdtError> {
        let remove_fn = self.remove_fn;
        let container = self.instance_mut(handle)?;
        shielded(|| remove_fn(container))?.ok_or(AdtError::Empty)
    }

    fn peek(&self, handle: AdtHandle) -> Result<&TrackedValue, AdtError> {
        let peek_fn = self.peek_fn;
        let container = self.instance(handle)?;
        shielded(|| peek_fn(container))?.ok_or(AdtError::Empty)
    }

    fn size(&self, handle: AdtHandle) -> Result<Option<usize>, AdtError> {
        let container = self.instance(handle)?;
        match self.len_fn {
            Some(len_fn) => shielded(|| len_fn(container)).map(Some),
            None         => Ok(None),
        }
    }
}

/// Collects the capabilities for an [OperationTable] -- see [OperationTable::builder()]
pub struct OperationTableBuilder<C> {
    name:    String,
    create:  Option<CreateFn<C>>,
    destroy: Option<DestroyFn<C>>,
    insert:  Option<InsertFn<C>>,
    remove:  Option<RemoveFn<C>>,
    peek:    Option<PeekFn<C>>,
    len:     Option<LenFn<C>>,
}

impl<C> OperationTableBuilder<C> {

    pub fn create(mut self, create: CreateFn<C>) -> Self {
        self.create = Some(create);
        self
    }

    pub fn destroy(mut self, destroy: DestroyFn<C>) -> Self {
        self.destroy = Some(destroy);
        self
    }

    pub fn insert(mut self, insert: InsertFn<C>) -> Self {
        self.insert = Some(insert);
        self
    }

    pub fn remove(mut self, remove: RemoveFn<C>) -> Self {
        self.remove = Some(remove);
        self
    }

    pub fn peek(mut self, peek: PeekFn<C>) -> Self {
        self.peek = Some(peek);
        self
    }

    /// optional: enables size bookkeeping checks
    pub fn len(mut self, len: LenFn<C>) -> Self {
        self.len = Some(len);
        self
    }

    /// Seals the table, rejecting it with [AdtError::MissingCapability] if any of the five mandatory capabilities is absent
    pub fn build(self) -> Result<OperationTable<C>, AdtError> {
        Ok(OperationTable {
            create_fn:   self.create.ok_or(AdtError::MissingCapability("create"))?,
            destroy_fn:  self.destroy.ok_or(AdtError::MissingCapability("destroy"))?,
            insert_fn:   self.insert.ok_or(AdtError::MissingCapability("insert"))?,
            remove_fn:   self.remove.ok_or(AdtError::MissingCapability("remove"))?,
            peek_fn:     self.peek.ok_or(AdtError::MissingCapability("peek"))?,
            len_fn:      self.len,
            name:        self.name,
            instances:   HashMap::new(),
            last_handle: 0,
        })
    }
}

/// runs a container primitive, converting any panic into [AdtError::ContainerPanicked]
fn shielded<R>(primitive: impl FnOnce() -> R) -> Result<R, AdtError> {
    panic::catch_unwind(AssertUnwindSafe(primitive))
        .map_err(|payload| AdtError::ContainerPanicked(panic_message(payload.as_ref())))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("<non-string panic payload>")
    }
}
