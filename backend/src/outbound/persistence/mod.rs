//! In-process persistence adapters.
//!
//! One store backs all four repository ports so that multi-entity
//! operations, above all the order commit's conditional stock decrement,
//! happen under a single write lock and stay atomic.
//!
//! Repository implementations only translate between stored rows and domain
//! types; deletion policy and other business rules live in the services.

mod memory;

pub use memory::MemoryStore;
