//! Durable persistence for the star registry chain.

pub mod sled_store;

pub use sled_store::SledStore;
