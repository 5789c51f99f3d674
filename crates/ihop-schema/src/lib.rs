//! # ihop-schema: Validator Backends
//!
//! Wraps an external JSON Schema validator behind the capability set the
//! harness needs, so the dispatcher and runner never name a concrete
//! validation library.
//!
//! ## Architecture
//!
//! - **Backend** (`backend.rs`): the [`ValidatorBackend`] trait (identity,
//!   dialect selection, schema compilation, instance validation) and the
//!   [`BackendError`] it reports through.
//!
//! - **Registry** (`registry.rs`): [`RegistryResolver`] answers lookups for
//!   the URI → schema map a test case supplies. Exact string match only; no
//!   network, no filesystem.
//!
//! - **jsonschema backend** (`jsonschema_backend.rs`): [`JsonSchemaBackend`]
//!   drives the `jsonschema` crate. Dialect support is negotiated once at
//!   construction into a fixed lookup table.
//!
//! - **boon backend** (`boon_backend.rs`): [`BoonBackend`] drives the `boon`
//!   crate behind the same trait, with its own draft table and a URL loader
//!   over the case registry.
//!
//! ## Crate Policy
//!
//! - Depends only on `ihop-core` internally.
//! - A backend never writes to stdout; that stream belongs to the protocol.

pub mod backend;
pub mod boon_backend;
pub mod jsonschema_backend;
pub mod registry;

pub use backend::{BackendError, BackendInfo, ValidatorBackend};
pub use boon_backend::BoonBackend;
pub use jsonschema_backend::JsonSchemaBackend;
pub use registry::{RegistryMiss, RegistryResolver};
