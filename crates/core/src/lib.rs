//! Domain types shared by the store and the HTTP layer.
//!
//! Nothing in here touches I/O: the `todo` module holds the entity, the wire
//! shapes and the pure mapping functions between them.

pub mod error;
pub mod todo;
pub mod types;
