//! OpenAPI document representation for the kiln SDK generator.
//!
//! This crate deserializes the OpenAPI-like document that upstream tooling
//! produces and exposes it as a read-only IR: recursive [`Schema`] nodes
//! resolved through the document's `$ref` table, and flat
//! [`OperationDetails`] records extracted once per generation run.
//!
//! The document's own well-formedness is the producer's responsibility;
//! this crate classifies whatever it is given and never fails on
//! unrecognized shapes.

mod document;
mod operation;
mod schema;

pub use document::{
    Components, Document, MediaType, OperationObject, ParameterObject, PathItem, RequestBody,
    ResponseObject,
};
pub use operation::{OperationDetails, Parameter};
pub use schema::{Schema, SchemaKind, ref_name};
