// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory session used by the integration tests.
//!
//! `MockSession` models a small address space as a map of nodes with
//! explicit child links, and counts service calls so tests can assert on
//! caching and fail-fast behavior.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use uascan::session::{
    AttributeValue, DataTypeDefinition, EnumDefinition, EnumField, MethodCallOutcome,
    ReferenceDescription, UaSession, UserIdentity,
};
use uascan::{
    AttributeId, BrowseDirection, ClientConfig, Error, NodeClass, NodeId, Result, StatusCode,
    Variant,
};

/// Status for writes to read-only variables.
pub const BAD_NOT_WRITABLE: StatusCode = StatusCode(0x803B_0000);

// =============================================================================
// MockNode
// =============================================================================

/// One node in the mock address space.
#[derive(Debug, Clone)]
pub struct MockNode {
    pub node_id: NodeId,
    pub browse_name: String,
    pub display_name: String,
    pub node_class: NodeClass,
    pub data_type: Option<NodeId>,
    pub value_rank: i32,
    pub value: Variant,
    pub value_status: StatusCode,
    pub writable: bool,
    pub children: Vec<NodeId>,
    pub type_definition: Option<DataTypeDefinition>,
}

impl MockNode {
    fn new(node_id: NodeId, display_name: &str, node_class: NodeClass) -> Self {
        Self {
            node_id,
            browse_name: display_name.to_string(),
            display_name: display_name.to_string(),
            node_class,
            data_type: None,
            value_rank: -1,
            value: Variant::Null,
            value_status: StatusCode::GOOD,
            writable: true,
            children: Vec::new(),
            type_definition: None,
        }
    }
}

// =============================================================================
// MockSession
// =============================================================================

/// Mock session over an in-memory address space.
///
/// Clones share all state, so a test can keep a handle for assertions
/// after moving a clone into the client.
#[derive(Clone)]
pub struct MockSession {
    inner: std::sync::Arc<MockSessionInner>,
}

struct MockSessionInner {
    connected: AtomicBool,
    fail_connect: bool,
    nodes: RwLock<HashMap<String, MockNode>>,
    browse_calls: AtomicU32,
    read_calls: AtomicU32,
    type_system_loads: AtomicU32,
    method_response: RwLock<Option<MethodCallOutcome>>,
    method_calls: RwLock<Vec<(NodeId, NodeId, Vec<Variant>)>>,
    last_identity: RwLock<Option<UserIdentity>>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::with_fail_connect(false)
    }

    /// A session that refuses to connect.
    pub fn failing() -> Self {
        Self::with_fail_connect(true)
    }

    fn with_fail_connect(fail_connect: bool) -> Self {
        Self {
            inner: std::sync::Arc::new(MockSessionInner {
                connected: AtomicBool::new(false),
                fail_connect,
                nodes: RwLock::new(HashMap::new()),
                browse_calls: AtomicU32::new(0),
                read_calls: AtomicU32::new(0),
                type_system_loads: AtomicU32::new(0),
                method_response: RwLock::new(None),
                method_calls: RwLock::new(Vec::new()),
                last_identity: RwLock::new(None),
            }),
        }
    }

    // =========================================================================
    // Address-space construction
    // =========================================================================

    pub fn add_object(&self, node_id: &str, display_name: &str) -> NodeId {
        let id: NodeId = node_id.parse().unwrap();
        self.insert(MockNode::new(id.clone(), display_name, NodeClass::Object));
        id
    }

    pub fn add_variable(
        &self,
        node_id: &str,
        display_name: &str,
        data_type: &str,
        value: Variant,
    ) -> NodeId {
        let id: NodeId = node_id.parse().unwrap();
        let mut node = MockNode::new(id.clone(), display_name, NodeClass::Variable);
        node.data_type = Some(data_type.parse().unwrap());
        node.value = value;
        self.insert(node);
        id
    }

    pub fn add_array_variable(
        &self,
        node_id: &str,
        display_name: &str,
        data_type: &str,
        value: Variant,
    ) -> NodeId {
        let id = self.add_variable(node_id, display_name, data_type, value);
        self.with_node(&id, |node| node.value_rank = 1);
        id
    }

    /// Adds a node of an arbitrary class, for skip-and-log coverage.
    pub fn add_node_of_class(
        &self,
        node_id: &str,
        display_name: &str,
        node_class: NodeClass,
    ) -> NodeId {
        let id: NodeId = node_id.parse().unwrap();
        self.insert(MockNode::new(id.clone(), display_name, node_class));
        id
    }

    /// Adds a bare data-type node with only a display name.
    pub fn add_type_node(&self, node_id: &str, display_name: &str) -> NodeId {
        let id: NodeId = node_id.parse().unwrap();
        self.insert(MockNode::new(id.clone(), display_name, NodeClass::DataType));
        id
    }

    /// Adds an enum type whose members come from its DataTypeDefinition.
    pub fn add_enum_with_definition(
        &self,
        node_id: &str,
        display_name: &str,
        fields: &[(&str, i64)],
    ) -> NodeId {
        let id = self.add_type_node(node_id, display_name);
        let definition = DataTypeDefinition::Enum(EnumDefinition {
            fields: fields
                .iter()
                .map(|(name, value)| EnumField {
                    name: (*name).to_string(),
                    display_name: (*name).to_string(),
                    description: String::new(),
                    value: *value,
                })
                .collect(),
        });
        self.with_node(&id, |node| node.type_definition = Some(definition.clone()));
        id
    }

    /// Adds an enum type exposing an EnumValues property.
    pub fn add_enum_with_values(
        &self,
        node_id: &str,
        display_name: &str,
        members: &[(&str, i64)],
    ) -> NodeId {
        let id = self.add_type_node(node_id, display_name);
        let property_id = format!("ns={};s={}.EnumValues", id.namespace_index, display_name);
        let items = members
            .iter()
            .map(|(name, value)| Variant::EnumValue {
                value: *value,
                display_name: (*name).to_string(),
                description: String::new(),
            })
            .collect();
        let property =
            self.add_variable(&property_id, "EnumValues", "i=7594", Variant::Array(items));
        self.with_node(&property, |node| node.browse_name = "EnumValues".to_string());
        self.link(&id, &property);
        id
    }

    /// Adds an enum type exposing an EnumStrings property.
    pub fn add_enum_with_strings(
        &self,
        node_id: &str,
        display_name: &str,
        names: &[&str],
    ) -> NodeId {
        let id = self.add_type_node(node_id, display_name);
        let property_id = format!("ns={};s={}.EnumStrings", id.namespace_index, display_name);
        let items = names
            .iter()
            .map(|name| Variant::LocalizedText {
                locale: String::new(),
                text: (*name).to_string(),
            })
            .collect();
        let property =
            self.add_variable(&property_id, "EnumStrings", "i=21", Variant::Array(items));
        self.with_node(&property, |node| node.browse_name = "EnumStrings".to_string());
        self.link(&id, &property);
        id
    }

    pub fn link(&self, parent: &NodeId, child: &NodeId) {
        self.with_node(parent, |node| node.children.push(child.clone()));
    }

    pub fn link_ids(&self, parent: &str, child: &str) {
        let parent: NodeId = parent.parse().unwrap();
        let child: NodeId = child.parse().unwrap();
        self.link(&parent, &child);
    }

    pub fn set_value_status(&self, node_id: &str, status: StatusCode) {
        let id: NodeId = node_id.parse().unwrap();
        self.with_node(&id, |node| node.value_status = status);
    }

    pub fn set_read_only(&self, node_id: &str) {
        let id: NodeId = node_id.parse().unwrap();
        self.with_node(&id, |node| node.writable = false);
    }

    pub fn set_method_response(&self, outcome: MethodCallOutcome) {
        *self.inner.method_response.write().unwrap() = Some(outcome);
    }

    fn insert(&self, node: MockNode) {
        self.inner.nodes
            .write()
            .unwrap()
            .insert(node.node_id.to_opc_string(), node);
    }

    fn with_node(&self, node_id: &NodeId, update: impl FnOnce(&mut MockNode)) {
        let mut nodes = self.inner.nodes.write().unwrap();
        if let Some(node) = nodes.get_mut(&node_id.to_opc_string()) {
            update(node);
        }
    }

    // =========================================================================
    // Call counters
    // =========================================================================

    pub fn browse_count(&self) -> u32 {
        self.inner.browse_calls.load(Ordering::SeqCst)
    }

    pub fn read_count(&self) -> u32 {
        self.inner.read_calls.load(Ordering::SeqCst)
    }

    pub fn type_system_load_count(&self) -> u32 {
        self.inner.type_system_loads.load(Ordering::SeqCst)
    }

    pub fn method_call_count(&self) -> usize {
        self.inner.method_calls.read().unwrap().len()
    }

    pub fn last_method_inputs(&self) -> Option<Vec<Variant>> {
        self.inner.method_calls
            .read()
            .unwrap()
            .last()
            .map(|(_, _, inputs)| inputs.clone())
    }

    pub fn last_identity(&self) -> Option<UserIdentity> {
        self.inner.last_identity.read().unwrap().clone()
    }

    pub fn stored_value(&self, node_id: &str) -> Option<Variant> {
        let nodes = self.inner.nodes.read().unwrap();
        nodes.get(node_id).map(|node| node.value.clone())
    }
}

impl Default for MockSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UaSession for MockSession {
    async fn connect(&mut self, identity: &UserIdentity) -> Result<()> {
        if self.inner.fail_connect {
            return Err(Error::transport("endpoint refused the connection"));
        }
        *self.inner.last_identity.write().unwrap() = Some(identity.clone());
        self.inner.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.inner.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }

    async fn browse(
        &self,
        node: &NodeId,
        _direction: BrowseDirection,
        node_class_mask: u32,
    ) -> Result<Vec<ReferenceDescription>> {
        self.inner.browse_calls.fetch_add(1, Ordering::SeqCst);
        let nodes = self.inner.nodes.read().unwrap();
        let parent = nodes
            .get(&node.to_opc_string())
            .ok_or_else(|| Error::transport(format!("browse of unknown node {node}")))?;

        Ok(parent
            .children
            .iter()
            .filter_map(|child_id| nodes.get(&child_id.to_opc_string()))
            .filter(|child| child.node_class.mask() & node_class_mask != 0)
            .map(|child| ReferenceDescription {
                node_id: child.node_id.clone(),
                browse_name: child.browse_name.clone(),
                display_name: child.display_name.clone(),
                node_class: child.node_class,
            })
            .collect())
    }

    async fn read_attributes(
        &self,
        node: &NodeId,
        attributes: &[AttributeId],
    ) -> Result<Vec<AttributeValue>> {
        self.inner.read_calls.fetch_add(1, Ordering::SeqCst);
        let nodes = self.inner.nodes.read().unwrap();
        let found = nodes.get(&node.to_opc_string());

        Ok(attributes
            .iter()
            .map(|attribute| match found {
                None => AttributeValue {
                    attribute: *attribute,
                    value: Variant::Null,
                    status: StatusCode::BAD_NODE_ID_UNKNOWN,
                },
                Some(node) => {
                    let (value, status) = match attribute {
                        AttributeId::NodeClass => (
                            Variant::Int32(node.node_class.mask() as i32),
                            StatusCode::GOOD,
                        ),
                        AttributeId::BrowseName => {
                            (Variant::String(node.browse_name.clone()), StatusCode::GOOD)
                        }
                        AttributeId::DisplayName => (
                            Variant::LocalizedText {
                                locale: String::new(),
                                text: node.display_name.clone(),
                            },
                            StatusCode::GOOD,
                        ),
                        AttributeId::Value => (node.value.clone(), node.value_status),
                        AttributeId::DataType => match &node.data_type {
                            Some(data_type) => {
                                (Variant::NodeId(data_type.clone()), StatusCode::GOOD)
                            }
                            None => (Variant::Null, StatusCode::BAD_ATTRIBUTE_ID_INVALID),
                        },
                        AttributeId::ValueRank => {
                            (Variant::Int32(node.value_rank), StatusCode::GOOD)
                        }
                        AttributeId::Description => {
                            (Variant::Null, StatusCode::BAD_ATTRIBUTE_ID_INVALID)
                        }
                    };
                    AttributeValue {
                        attribute: *attribute,
                        value,
                        status,
                    }
                }
            })
            .collect())
    }

    async fn write_values(&self, writes: &[(NodeId, Variant)]) -> Result<Vec<StatusCode>> {
        let mut nodes = self.inner.nodes.write().unwrap();
        Ok(writes
            .iter()
            .map(|(node_id, value)| match nodes.get_mut(&node_id.to_opc_string()) {
                Some(node) if node.node_class == NodeClass::Variable => {
                    if node.writable {
                        node.value = value.clone();
                        StatusCode::GOOD
                    } else {
                        BAD_NOT_WRITABLE
                    }
                }
                Some(_) => BAD_NOT_WRITABLE,
                None => StatusCode::BAD_NODE_ID_UNKNOWN,
            })
            .collect())
    }

    async fn call_method(
        &self,
        object: &NodeId,
        method: &NodeId,
        inputs: &[Variant],
    ) -> Result<MethodCallOutcome> {
        self.inner.method_calls
            .write()
            .unwrap()
            .push((object.clone(), method.clone(), inputs.to_vec()));
        Ok(self
            .inner
            .method_response
            .read()
            .unwrap()
            .clone()
            .unwrap_or(MethodCallOutcome {
                status: StatusCode::GOOD,
                outputs: Vec::new(),
            }))
    }

    async fn read_data_type_definition(
        &self,
        data_type: &NodeId,
    ) -> Result<Option<DataTypeDefinition>> {
        let nodes = self.inner.nodes.read().unwrap();
        Ok(nodes
            .get(&data_type.to_opc_string())
            .and_then(|node| node.type_definition.clone()))
    }

    async fn load_type_system(&self, _data_type: &NodeId) -> Result<()> {
        self.inner.type_system_loads.fetch_add(1, Ordering::SeqCst);
        let mut nodes = self.inner.nodes.write().unwrap();
        for node in nodes.values_mut() {
            if node.value_status == StatusCode::BAD_DATA_TYPE_ID_UNKNOWN {
                node.value_status = StatusCode::GOOD;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Builds a connected client around the given mock session.
pub async fn connected_client(session: MockSession) -> uascan::AddressSpaceClient<MockSession> {
    let config = ClientConfig::builder()
        .endpoint("opc.tcp://localhost:4840")
        .build()
        .unwrap();
    let client = uascan::AddressSpaceClient::new(config, session).unwrap();
    client.connect().await.unwrap();
    client
}
