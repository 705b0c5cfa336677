// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session capability abstraction.
//!
//! [`UaSession`] is the seam between the traversal logic and any concrete
//! OPC UA stack. The client, resolver and scanner only ever talk to this
//! trait, which keeps them testable against an in-memory address space and
//! keeps protocol details out of the tree-building code.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{AttributeId, BrowseDirection, NodeClass, NodeId, StatusCode, Variant};

// =============================================================================
// UserIdentity
// =============================================================================

/// Identity presented when activating a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIdentity {
    /// Anonymous access.
    Anonymous,
    /// Username and password authentication.
    UserName {
        /// The account name.
        username: String,
        /// The account password.
        password: String,
    },
}

// =============================================================================
// Browse and read results
// =============================================================================

/// One reference returned by a browse call.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceDescription {
    /// Target node of the reference.
    pub node_id: NodeId,
    /// Browse name of the target node.
    pub browse_name: String,
    /// Display name of the target node.
    pub display_name: String,
    /// Class of the target node.
    pub node_class: NodeClass,
}

/// Value and status for a single attribute read.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeValue {
    /// The attribute that was read.
    pub attribute: AttributeId,
    /// The value, `Variant::Null` when the read failed.
    pub value: Variant,
    /// Status code reported for this attribute.
    pub status: StatusCode,
}

impl AttributeValue {
    /// Returns the value when the status is good, `None` otherwise.
    pub fn good_value(&self) -> Option<&Variant> {
        if self.status.is_good() {
            Some(&self.value)
        } else {
            None
        }
    }
}

/// Result of a method call: overall status plus output values.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCallOutcome {
    /// Status for the call as a whole.
    pub status: StatusCode,
    /// Output argument values in declaration order.
    pub outputs: Vec<Variant>,
}

// =============================================================================
// Data type definitions
// =============================================================================

/// Definition read from the DataTypeDefinition attribute of a type node.
#[derive(Debug, Clone, PartialEq)]
pub enum DataTypeDefinition {
    /// An enumeration definition with named fields.
    Enum(EnumDefinition),
    /// A structure definition. The resolver treats these as opaque.
    Structure,
}

/// Enumeration definition with its declared fields.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDefinition {
    /// The declared fields in server order.
    pub fields: Vec<EnumField>,
}

/// One declared field of an enumeration data type.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumField {
    /// Programmatic field name.
    pub name: String,
    /// Human-readable name, falls back to `name` when empty.
    pub display_name: String,
    /// Optional description text.
    pub description: String,
    /// The numeric value of the field.
    pub value: i64,
}

// =============================================================================
// Keep-alive
// =============================================================================

/// Health report delivered by the session's keep-alive mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAliveStatus {
    /// `true` while the session is responding to heartbeats.
    pub healthy: bool,
}

// =============================================================================
// UaSession
// =============================================================================

/// Capability contract for a connected OPC UA session.
///
/// Implementations wrap a concrete protocol stack. All methods map low-level
/// failures to [`crate::error::Error::Transport`]; per-item failures in batch
/// operations are reported through status codes instead.
#[async_trait]
pub trait UaSession: Send + Sync {
    /// Establishes and activates the session with the given identity.
    async fn connect(&mut self, identity: &UserIdentity) -> Result<()>;

    /// Closes the session. Safe to call when already closed.
    async fn disconnect(&mut self) -> Result<()>;

    /// Returns `true` while the transport-level session is usable.
    fn is_connected(&self) -> bool;

    /// Browses references of `node` in `direction`, restricted to targets
    /// whose class matches `node_class_mask`. Returns references in server
    /// order.
    async fn browse(
        &self,
        node: &NodeId,
        direction: BrowseDirection,
        node_class_mask: u32,
    ) -> Result<Vec<ReferenceDescription>>;

    /// Reads a batch of attributes from one node. The result has one entry
    /// per requested attribute, in request order, each with its own status.
    async fn read_attributes(
        &self,
        node: &NodeId,
        attributes: &[AttributeId],
    ) -> Result<Vec<AttributeValue>>;

    /// Reads a single attribute from one node.
    async fn read_attribute(
        &self,
        node: &NodeId,
        attribute: AttributeId,
    ) -> Result<AttributeValue> {
        let mut values = self.read_attributes(node, &[attribute]).await?;
        values.pop().ok_or_else(|| {
            crate::error::Error::transport("attribute read returned no results")
        })
    }

    /// Writes values to the Value attribute of each node. Returns one status
    /// per write, in request order.
    async fn write_values(&self, writes: &[(NodeId, Variant)]) -> Result<Vec<StatusCode>>;

    /// Calls a method on an object node with the given input arguments.
    async fn call_method(
        &self,
        object: &NodeId,
        method: &NodeId,
        inputs: &[Variant],
    ) -> Result<MethodCallOutcome>;

    /// Reads the DataTypeDefinition attribute of a data-type node. Returns
    /// `None` when the server does not expose the attribute.
    async fn read_data_type_definition(
        &self,
        data_type: &NodeId,
    ) -> Result<Option<DataTypeDefinition>>;

    /// Loads the server's type system for the namespace containing
    /// `data_type`. Used to recover from value reads that fail with
    /// [`StatusCode::BAD_DATA_TYPE_ID_UNKNOWN`].
    async fn load_type_system(&self, data_type: &NodeId) -> Result<()>;
}
