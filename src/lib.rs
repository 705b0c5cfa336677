// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA address-space client toolkit.
//!
//! This crate captures a server's address space as a serializable tree of
//! objects and variables, resolves custom data types to native ones, and
//! compares captured trees across scans. The protocol stack itself stays
//! behind the [`session::UaSession`] trait, so the traversal logic works
//! against any transport, including an in-memory one for tests.
//!
//! # Components
//!
//! - [`client::AddressSpaceClient`] - connection lifecycle and node reads,
//!   writes and method calls over a session
//! - [`resolve::TypeInfoResolver`] - data-type classification with a
//!   per-connection cache
//! - [`scan::Scanner`] - one-call subtree capture with a normalized result
//! - [`diff`] - identity-based comparison of two captured trees
//! - [`model`] - the serializable tree itself
//!
//! # Error Handling
//!
//! All fallible operations return [`error::Result`]. Type resolution is
//! the exception by design: it degrades to an `Unknown` classification
//! rather than failing the traversal that asked.
//!
//! # Example
//!
//! ```rust,ignore
//! use uascan::{AddressSpaceClient, CancelToken, ClientConfig, ScanOptions, Scanner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .endpoint("opc.tcp://localhost:4840")
//!         .build()?;
//!
//!     let client = AddressSpaceClient::new(config, session)?;
//!     client.connect().await?;
//!
//!     let result = Scanner::scan(&client, &ScanOptions::default(), &CancelToken::new()).await;
//!     println!("{}", serde_json::to_string_pretty(&result)?);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod diff;
pub mod error;
pub mod model;
pub mod resolve;
pub mod scan;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};

pub use types::{
    AttributeId, BrowseDirection, CancelToken, ClientConfig, ClientConfigBuilder, NodeClass,
    NodeId, NodeIdentifier, StatusCode, Variant,
};

pub use model::{
    EnumDataType, EnumMember, NativeEnumMember, NativeTypeDescriptor, NativeTypeKind, Node,
    NodeObject, NodeRef, NodeVariable, OpcTypeDescriptor, OpcTypeKind, ResolvedTypeInfo,
    UNKNOWN_PARENT_ID,
};

pub use session::{
    AttributeValue, DataTypeDefinition, EnumDefinition, EnumField, KeepAliveStatus,
    MethodCallOutcome, ReferenceDescription, UaSession, UserIdentity,
};

pub use client::{
    AddressSpaceClient, ArgumentEncoding, BatchReadOutcome, ClientState, KeepAliveHandle,
    MethodArgument, MethodOutput, ObjectReadOptions, WalkFilters,
};

pub use resolve::{lookup_native_type, try_lookup_native_type, TypeInfoResolver};

pub use scan::{ScanOptions, ScanResult, Scanner};

pub use diff::{diff, TreeComparison};
