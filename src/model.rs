// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Serializable address-space tree model.
//!
//! A traversal produces a tree of [`Node`] values: objects carrying child
//! objects and variables, variables carrying nested variables plus resolved
//! type information. The JSON encoding is an internally tagged union on
//! `node_class`, so a node's class is carried by the discriminator and can
//! never disagree with its payload shape.
//!
//! ```json
//! {
//!   "node_class": "Object",
//!   "node_id": "ns=2;s=Line1",
//!   "display_name": "Line 1",
//!   "objects": [],
//!   "variables": []
//! }
//! ```
//!
//! Child arrays are optional on input and default to empty, so trimmed
//! documents round-trip. An unrecognized `node_class` is a format error,
//! never a silent default.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{NodeClass, NodeId};

/// Parent id recorded for nodes whose parent was not part of the traversal.
pub const UNKNOWN_PARENT_ID: &str = "unknown";

fn unknown_parent() -> String {
    UNKNOWN_PARENT_ID.to_string()
}

// =============================================================================
// Node
// =============================================================================

/// A node in a captured address-space tree.
///
/// The set of cases is closed: traversal only materializes objects and
/// variables, and deserialization rejects any other discriminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node_class")]
pub enum Node {
    /// An object node with child objects and variables.
    Object(NodeObject),
    /// A variable node with type information and nested variables.
    Variable(NodeVariable),
}

impl Node {
    /// Returns the node class implied by the case.
    pub const fn node_class(&self) -> NodeClass {
        match self {
            Self::Object(_) => NodeClass::Object,
            Self::Variable(_) => NodeClass::Variable,
        }
    }

    /// Returns the node id string.
    pub fn node_id(&self) -> &str {
        match self {
            Self::Object(o) => &o.node_id,
            Self::Variable(v) => &v.node_id,
        }
    }

    /// Returns the display name.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Object(o) => &o.display_name,
            Self::Variable(v) => &v.display_name,
        }
    }

    /// Serializes this node to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::format(e.to_string()))
    }

    /// Deserializes a node from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] for malformed documents, including an
    /// unrecognized `node_class` discriminator.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::format(e.to_string()))
    }
}

// =============================================================================
// NodeObject
// =============================================================================

/// An object node and the subtree captured beneath it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeObject {
    /// Node id of the parent, [`UNKNOWN_PARENT_ID`] for a traversal root.
    #[serde(default = "unknown_parent")]
    pub parent_node_id: String,

    /// Node id in OPC UA string format.
    pub node_id: String,

    /// Display name reported by the server.
    pub display_name: String,

    /// Child objects in browse order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<NodeObject>,

    /// Child variables in browse order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<NodeVariable>,
}

impl NodeObject {
    /// Creates an object node with no children and an unknown parent.
    pub fn new(node_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            parent_node_id: unknown_parent(),
            node_id: node_id.into(),
            display_name: display_name.into(),
            objects: Vec::new(),
            variables: Vec::new(),
        }
    }

    /// Returns the identifier portion of the node id, without namespace or
    /// type prefix. Falls back to the raw string when it does not parse.
    pub fn node_identifier(&self) -> String {
        node_identifier_of(&self.node_id)
    }
}

// =============================================================================
// NodeVariable
// =============================================================================

/// A variable node with its resolved type information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeVariable {
    /// Node id of the parent, [`UNKNOWN_PARENT_ID`] for a traversal root.
    #[serde(default = "unknown_parent")]
    pub parent_node_id: String,

    /// Node id in OPC UA string format.
    pub node_id: String,

    /// Display name reported by the server.
    pub display_name: String,

    /// Server-side type descriptor, `None` when resolution never ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type_opcua: Option<OpcTypeDescriptor>,

    /// Normalized target-language type name, empty when unresolved.
    #[serde(default)]
    pub data_type_native: String,

    /// Textual rendering of the sampled value, empty when not sampled.
    #[serde(default)]
    pub sample_value: String,

    /// Nested variables in browse order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<NodeVariable>,
}

impl NodeVariable {
    /// Creates a variable node with no children and an unknown parent.
    pub fn new(node_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            parent_node_id: unknown_parent(),
            node_id: node_id.into(),
            display_name: display_name.into(),
            data_type_opcua: None,
            data_type_native: String::new(),
            sample_value: String::new(),
            variables: Vec::new(),
        }
    }

    /// Returns the identifier portion of the node id, without namespace or
    /// type prefix. Falls back to the raw string when it does not parse.
    pub fn node_identifier(&self) -> String {
        node_identifier_of(&self.node_id)
    }
}

fn node_identifier_of(node_id: &str) -> String {
    node_id
        .parse::<NodeId>()
        .map(|id| id.identifier_text())
        .unwrap_or_else(|_| node_id.to_string())
}

// =============================================================================
// NodeRef
// =============================================================================

/// Borrowed reference to either node case.
///
/// Tree comparison flattens both trees into these, so object and variable
/// nodes can share one identity map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRef<'a> {
    /// Reference to an object node.
    Object(&'a NodeObject),
    /// Reference to a variable node.
    Variable(&'a NodeVariable),
}

impl<'a> NodeRef<'a> {
    /// Returns the node id string.
    pub fn node_id(&self) -> &'a str {
        match self {
            Self::Object(o) => &o.node_id,
            Self::Variable(v) => &v.node_id,
        }
    }

    /// Returns the display name.
    pub fn display_name(&self) -> &'a str {
        match self {
            Self::Object(o) => &o.display_name,
            Self::Variable(v) => &v.display_name,
        }
    }

    /// Returns the node class of the referenced node.
    pub const fn node_class(&self) -> NodeClass {
        match self {
            Self::Object(_) => NodeClass::Object,
            Self::Variable(_) => NodeClass::Variable,
        }
    }
}

impl<'a> From<&'a Node> for NodeRef<'a> {
    fn from(node: &'a Node) -> Self {
        match node {
            Node::Object(o) => Self::Object(o),
            Node::Variable(v) => Self::Variable(v),
        }
    }
}

// =============================================================================
// Type descriptors
// =============================================================================

/// High-level classification of a server-side data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OpcTypeKind {
    /// Resolution did not produce a classification.
    #[default]
    Unknown,
    /// A built-in scalar type.
    Primitive,
    /// An enumeration type.
    Enum,
    /// A structured or otherwise opaque type.
    Structure,
}

/// Descriptor of a data type as the server declares it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpcTypeDescriptor {
    /// Node id of the data-type node, in OPC UA string format.
    pub node_id: String,

    /// Browse-level name of the type.
    pub name: String,

    /// Display name of the type.
    pub display_name: String,

    /// Identifier kind of the type node ("Numeric", "String", ...).
    pub identifier_type: String,

    /// Identifier portion of the node id as text.
    pub identifier: String,

    /// Classification of the type.
    #[serde(default)]
    pub kind: OpcTypeKind,

    /// `true` when the declaring variable is array-valued.
    #[serde(default)]
    pub is_array: bool,
}

impl OpcTypeDescriptor {
    /// Creates a descriptor for a data-type node.
    pub fn new(node_id: &NodeId, display_name: impl Into<String>, kind: OpcTypeKind) -> Self {
        let display_name = display_name.into();
        Self {
            node_id: node_id.to_opc_string(),
            name: display_name.clone(),
            display_name,
            identifier_type: node_id.identifier_type().to_string(),
            identifier: node_id.identifier_text(),
            kind,
            is_array: false,
        }
    }

    /// Returns a copy marked as array-valued.
    pub fn as_array(&self) -> Self {
        let mut copy = self.clone();
        copy.is_array = true;
        copy
    }
}

/// High-level classification of a resolved native type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum NativeTypeKind {
    /// Resolution did not produce a classification.
    #[default]
    Unknown,
    /// A built-in scalar type.
    Primitive,
    /// An enumeration with known members.
    Enum,
    /// A structured type without a scalar mapping.
    Complex,
    /// An array of some element type.
    Array,
}

/// Descriptor of the native type a server type maps to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeTypeDescriptor {
    /// Classification of the mapping.
    #[serde(default)]
    pub kind: NativeTypeKind,

    /// Short name of the type ("Int32", "Machine.State", ...).
    pub name: String,

    /// Full native type name ("i32", "Vec<f64>", ...).
    pub type_name: String,

    /// Element descriptor when `kind` is [`NativeTypeKind::Array`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<Box<NativeTypeDescriptor>>,

    /// Enumeration members when `kind` is [`NativeTypeKind::Enum`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_members: Vec<NativeEnumMember>,
}

impl NativeTypeDescriptor {
    /// Creates a primitive descriptor.
    pub fn primitive(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            kind: NativeTypeKind::Primitive,
            name: name.into(),
            type_name: type_name.into(),
            element: None,
            enum_members: Vec::new(),
        }
    }

    /// Creates an unknown descriptor carrying whatever name is available.
    pub fn unknown(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: NativeTypeKind::Unknown,
            type_name: name.clone(),
            name,
            element: None,
            enum_members: Vec::new(),
        }
    }

    /// Creates a complex descriptor for a type without a scalar mapping.
    pub fn complex(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: NativeTypeKind::Complex,
            type_name: name.clone(),
            name,
            element: None,
            enum_members: Vec::new(),
        }
    }

    /// Creates an array descriptor wrapping an element type.
    pub fn array_of(element: NativeTypeDescriptor) -> Self {
        Self {
            kind: NativeTypeKind::Array,
            name: format!("{}[]", element.name),
            type_name: format!("Vec<{}>", element.type_name),
            element: Some(Box::new(element)),
            enum_members: Vec::new(),
        }
    }
}

/// One member of a resolved native enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeEnumMember {
    /// The numeric value. Native enums are 32-bit; wider values demote the
    /// whole type to [`NativeTypeKind::Complex`].
    pub value: i32,
    /// Programmatic name.
    pub name: String,
    /// Human-readable name.
    pub display_name: String,
}

/// Paired server-side and native type descriptors for one variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTypeInfo {
    /// The type as the server declares it.
    pub opcua: OpcTypeDescriptor,
    /// The native mapping of that type.
    pub native: NativeTypeDescriptor,
}

// =============================================================================
// Enumeration data types
// =============================================================================

/// A standalone description of an enumeration data type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDataType {
    /// Node id of the data-type node, in OPC UA string format.
    pub node_id: String,

    /// Name of the enumeration type.
    pub name: String,

    /// Display name of the enumeration type.
    pub display_name: String,

    /// `true` when members carry server-declared values rather than
    /// positional indices.
    pub has_enum_values: bool,

    /// The members in server order.
    pub members: Vec<EnumMember>,
}

/// One member of an enumeration data type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    /// The numeric value of the member.
    pub value: i64,
    /// Programmatic name.
    pub name: String,
    /// Human-readable name.
    pub display_name: String,
    /// Optional description text.
    #[serde(default)]
    pub description: String,
}

// =============================================================================
// Tests
// =============================================================================
