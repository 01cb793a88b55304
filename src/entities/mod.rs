//! The back office registries

pub mod macros;

pub mod carrier;
pub mod client;
pub mod entry;
pub mod product;
pub mod supplier;
pub mod user;

pub use carrier::Carrier;
pub use client::{Client, PersonType};
pub use entry::{Entry, EntryKind};
pub use product::Product;
pub use supplier::Supplier;
pub use user::{User, UserRole};
