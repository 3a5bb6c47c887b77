//! Nested item storage with dotted-path addressing, chained navigation,
//! and a dependency container.
//!
//! Three cooperating pieces over one data model:
//!
//! - [`ItemStore`]: a mutable tree of `serde_json::Value` items
//!   addressed by dotted paths (`config.database.host`), with
//!   create/read/update/delete, existence checks, bulk forms, and
//!   whole-tree reset/export.
//! - [`Cursor`]: chained descent into the tree with single-shot
//!   terminal reads, writes, and subtree removal.
//! - [`Container`]: alias-to-factory dependency registration with
//!   recursive argument resolution, singleton sharing, and setup
//!   pipelines, layered beside the same store.
//!
//! ```
//! use dotstore::ItemStore;
//! use serde_json::json;
//!
//! # fn main() -> dotstore::Result<()> {
//! let mut store = ItemStore::new();
//! store.add("config.database.host", json!("localhost"))?;
//! assert_eq!(store.get("config.database.host")?, &json!("localhost"));
//! assert!(store.has("config.database"));
//! # Ok(())
//! # }
//! ```

pub mod cursor;
pub mod error;
pub mod ioc;
pub mod path;
pub mod store;

pub use cursor::Cursor;
pub use error::{Result, StoreError};
pub use ioc::{Container, CtorFn, Dependency, Factory, FactoryFn, Instance, Registration, SetupFn};
pub use path::ItemPath;
pub use store::{Branch, Item, ItemStore};
