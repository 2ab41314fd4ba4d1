pub mod manager;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod store;

pub use manager::{DatabaseManager, DatabaseError};
pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;
pub use record::{Document, DocumentExt, DocumentId, RecordError};
pub use store::{DeleteResult, DocumentStore, InsertResult, UpdateResult};
