// handlers/mod.rs - HTTP handlers
//
// `resource` is the generic CRUD family every collection router uses; the
// other modules hold the few routes whose behaviour is specific to one
// resource (approved-only teacher listing, contact search, user lookups).

pub mod contacts;
pub mod public;
pub mod resource;
pub mod teachers;
pub mod users;
