//! The adapter layer: erases concrete containers behind the five capabilities of [AdtOperations]
//! (`create`, `destroy`, `insert`, `remove`, `peek`), operating on opaque [AdtHandle]s.
//!
//! Any type implementing [Container] gets a complete table through [OperationTable::for_container()];
//! tables may also be assembled capability by capability with [OperationTable::builder()]:
//! ```rust
//!     use adt_conformance::adapter::{AdtOperations, AdtError, OperationTable, containers::QueueArray};
//!     let mut table = OperationTable::<QueueArray>::for_container("QueueArray");
//!     let handle = table.create().unwrap();
//!     assert_eq!(table.remove(handle).err(), Some(AdtError::Empty));
//!     table.destroy(handle).unwrap();
//! ```

mod types;
pub use types::*;
mod operation_table;
pub use operation_table::*;
mod scoped_handle;
pub use scoped_handle::*;
pub mod containers;
