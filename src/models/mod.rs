//! Data models for the Onyx SDK.
//!
//! These types mirror the server-side models and are used for request/response
//! serialization. Request types omit every unset optional field when encoded;
//! see [`Patch`] for fields that can also be cleared.

pub mod billing;
pub mod edge;
pub mod ingest;
pub mod node;
pub mod patch;
pub mod search;
pub mod version;

pub use billing::*;
pub use edge::*;
pub use ingest::*;
pub use node::*;
pub use patch::Patch;
pub use search::*;
pub use version::*;

/// Consistency checks applied to a response after it has been decoded.
///
/// serde enforces the shape; this covers invariants spanning several fields,
/// such as a node's extension agreeing with its type.
pub trait Validate {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), String> {
        self.iter().try_for_each(Validate::validate)
    }
}

impl Validate for Edge {}
impl Validate for ListEdgesResponse {}
impl Validate for SearchResponse {}
impl Validate for VersionEntry {}
impl Validate for ListVersionsResponse {}
impl Validate for Branch {}
impl Validate for ListBranchesResponse {}
impl Validate for IngestResult {}
impl Validate for IngestCodebaseResponse {}
impl Validate for CheckoutSessionResponse {}
impl Validate for BillingPortalResponse {}
