//! Firebase REST clients: Identity Toolkit and Cloud Firestore.
//!
//! SYSTEM CONTEXT
//! ==============
//! The job board delegates persistence and credential issuance entirely to
//! Firebase. This crate is the only place that speaks its wire formats.
//!
//! ```text
//! server / cli --> IdentityToolkitClient --> accounts:signUp / signInWithPassword / signInWithIdp
//!              --> FirestoreClient       --> projects/{p}/databases/{d}/documents/...
//! ```
//!
//! Neither client retries. Callers decide what a failure means.

pub mod config;
pub mod error;
pub mod firestore;
pub mod identity;
pub mod value;

pub use config::FirebaseConfig;
pub use error::{AuthErrorCode, FirebaseError, FirebaseResult};
pub use firestore::FirestoreClient;
pub use identity::{Credential, IdentityToolkitClient};
pub use value::{Document, Fields, Value};
