//! Firestore REST adapter for the postmitra remote document store.
//!
//! Documents are scoped per device under `users/{client_id}`, with the
//! generation history as an ordered subcollection. The adapter implements
//! the [`postmitra_core::sync::RemoteStore`] contract; every failure maps
//! into core's `RemoteStoreError` so the reconciler can degrade to
//! local-only behavior.

mod client;
mod error;
mod store;
mod value;

pub use client::{Document, FirestoreClient};
pub use error::FirestoreError;
pub use store::FirestoreRemoteStore;
