// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core OPC UA value and identity types.
//!
//! This module provides the building blocks shared by the client, resolver
//! and scanner:
//!
//! - **NodeId**: All four OPC UA node identifier types with parsing
//! - **NodeClass**: The closed node-class set with mask arithmetic
//! - **StatusCode**: Severity bit tests and well-known codes
//! - **Variant**: Runtime attribute values
//! - **ClientConfig**: Connection configuration with builder
//! - **CancelToken**: Cooperative cancellation for long traversals
//!
//! # Examples
//!
//! ```
//! use uascan::types::{NodeId, NodeClass};
//!
//! let node_id: NodeId = "ns=2;s=Machine.Temperature".parse().unwrap();
//! assert_eq!(node_id.namespace_index, 2);
//! assert_eq!(NodeClass::Variable.mask(), 2);
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

// =============================================================================
// NodeId
// =============================================================================

/// OPC UA node identifier.
///
/// A NodeId uniquely identifies a node within an OPC UA server. It consists
/// of a namespace index and an identifier which can be numeric, string,
/// GUID, or opaque (byte string).
///
/// # Examples
///
/// ```
/// use uascan::types::NodeId;
///
/// let numeric = NodeId::numeric(2, 1001);
/// let string = NodeId::string(2, "Machine.Temperature");
/// let parsed: NodeId = "ns=2;s=Machine.Temperature".parse().unwrap();
/// assert_eq!(string, parsed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId {
    /// Namespace index (0 = OPC UA standard namespace).
    pub namespace_index: u16,

    /// The node identifier.
    pub identifier: NodeIdentifier,
}

impl NodeId {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a numeric node ID.
    #[inline]
    pub fn numeric(namespace_index: u16, value: u32) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::Numeric(value),
        }
    }

    /// Creates a string node ID.
    #[inline]
    pub fn string(namespace_index: u16, value: impl Into<String>) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::String(value.into()),
        }
    }

    /// Creates a GUID node ID.
    #[inline]
    pub fn guid(namespace_index: u16, value: Uuid) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::Guid(value),
        }
    }

    /// Creates an opaque (byte string) node ID.
    #[inline]
    pub fn opaque(namespace_index: u16, value: Vec<u8>) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::Opaque(value),
        }
    }

    // =========================================================================
    // Standard Node IDs
    // =========================================================================

    /// Root folder node (ns=0, i=84).
    pub const ROOT_FOLDER: NodeId = NodeId {
        namespace_index: 0,
        identifier: NodeIdentifier::Numeric(84),
    };

    /// Objects folder node (ns=0, i=85). Default traversal start point.
    pub const OBJECTS_FOLDER: NodeId = NodeId {
        namespace_index: 0,
        identifier: NodeIdentifier::Numeric(85),
    };

    /// Server diagnostics node (ns=0, i=2253). Excluded from traversal.
    pub const SERVER: NodeId = NodeId {
        namespace_index: 0,
        identifier: NodeIdentifier::Numeric(2253),
    };

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns `true` if this is in the standard namespace (ns=0).
    #[inline]
    pub const fn is_standard(&self) -> bool {
        self.namespace_index == 0
    }

    /// Returns `true` if this is a null node ID (ns=0, i=0).
    #[inline]
    pub fn is_null(&self) -> bool {
        self.namespace_index == 0 && matches!(self.identifier, NodeIdentifier::Numeric(0))
    }

    /// Returns the null node ID (ns=0, i=0).
    #[inline]
    pub const fn null() -> Self {
        Self {
            namespace_index: 0,
            identifier: NodeIdentifier::Numeric(0),
        }
    }

    /// Returns `true` if this node is server infrastructure that address
    /// space traversal skips.
    #[inline]
    pub fn is_infrastructure(&self) -> bool {
        *self == Self::SERVER
    }

    /// Returns the numeric value if this is a numeric identifier.
    #[inline]
    pub fn as_numeric(&self) -> Option<u32> {
        match &self.identifier {
            NodeIdentifier::Numeric(v) => Some(*v),
            _ => None,
        }
    }

    // =========================================================================
    // Conversion
    // =========================================================================

    /// Converts to the OPC UA string format.
    ///
    /// Format: `ns=<namespace>;{i|s|g|b}=<identifier>`. The namespace prefix
    /// is omitted for namespace 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use uascan::types::NodeId;
    ///
    /// assert_eq!(NodeId::numeric(2, 1001).to_opc_string(), "ns=2;i=1001");
    /// assert_eq!(NodeId::numeric(0, 85).to_opc_string(), "i=85");
    /// ```
    pub fn to_opc_string(&self) -> String {
        let id_str = format!(
            "{}={}",
            self.identifier.type_prefix(),
            self.identifier_text()
        );

        if self.namespace_index == 0 {
            id_str
        } else {
            format!("ns={};{}", self.namespace_index, id_str)
        }
    }

    /// Returns the identifier portion as text, without namespace or prefix.
    pub fn identifier_text(&self) -> String {
        match &self.identifier {
            NodeIdentifier::Numeric(v) => v.to_string(),
            NodeIdentifier::String(v) => v.clone(),
            NodeIdentifier::Guid(v) => v.to_string(),
            NodeIdentifier::Opaque(v) => BASE64.encode(v),
        }
    }

    /// Returns the identifier type as a string.
    pub const fn identifier_type(&self) -> &'static str {
        match &self.identifier {
            NodeIdentifier::Numeric(_) => "Numeric",
            NodeIdentifier::String(_) => "String",
            NodeIdentifier::Guid(_) => "Guid",
            NodeIdentifier::Opaque(_) => "Opaque",
        }
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_opc_string())
    }
}

impl FromStr for NodeId {
    type Err = Error;

    /// Parses a NodeId from OPC UA string format.
    ///
    /// Supported formats:
    /// - `ns=2;i=1001` (numeric)
    /// - `ns=2;s=MyNode` (string)
    /// - `ns=2;g=550e8400-e29b-41d4-a716-446655440000` (GUID)
    /// - `ns=2;b=SGVsbG8=` (opaque, base64 encoded)
    /// - `i=1001` (numeric, namespace 0)
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::validation("node id must not be empty"));
        }

        let (namespace_index, identifier_part) = if s.starts_with("ns=") {
            let parts: Vec<&str> = s.splitn(2, ';').collect();
            if parts.len() != 2 {
                return Err(Error::validation(format!(
                    "node id '{s}' is missing an identifier after the namespace"
                )));
            }

            let ns_str = &parts[0][3..];
            let ns: u16 = ns_str.parse().map_err(|_| {
                Error::validation(format!("node id '{s}' has an invalid namespace index"))
            })?;

            (ns, parts[1])
        } else {
            (0, s)
        };

        let identifier = if let Some(id) = identifier_part.strip_prefix("i=") {
            let value: u32 = id.parse().map_err(|_| {
                Error::validation(format!("node id '{s}' has an invalid numeric identifier"))
            })?;
            NodeIdentifier::Numeric(value)
        } else if let Some(id) = identifier_part.strip_prefix("s=") {
            NodeIdentifier::String(id.to_string())
        } else if let Some(id) = identifier_part.strip_prefix("g=") {
            let uuid = Uuid::parse_str(id).map_err(|e| {
                Error::validation(format!("node id '{s}' has an invalid GUID: {e}"))
            })?;
            NodeIdentifier::Guid(uuid)
        } else if let Some(id) = identifier_part.strip_prefix("b=") {
            let bytes = BASE64.decode(id).map_err(|e| {
                Error::validation(format!("node id '{s}' has invalid base64: {e}"))
            })?;
            NodeIdentifier::Opaque(bytes)
        } else {
            return Err(Error::validation(format!(
                "node id '{s}' has an unknown identifier type, expected i=, s=, g=, or b="
            )));
        };

        Ok(Self {
            namespace_index,
            identifier,
        })
    }
}

// =============================================================================
// NodeIdentifier
// =============================================================================

/// The four OPC UA node identifier kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum NodeIdentifier {
    /// Numeric identifier (most efficient, used for standard nodes).
    Numeric(u32),

    /// String identifier (human-readable, used for custom nodes).
    String(String),

    /// GUID identifier (globally unique).
    Guid(Uuid),

    /// Opaque identifier (application-specific byte array).
    Opaque(Vec<u8>),
}

impl NodeIdentifier {
    /// Returns the identifier type prefix for OPC UA string format.
    pub const fn type_prefix(&self) -> char {
        match self {
            Self::Numeric(_) => 'i',
            Self::String(_) => 's',
            Self::Guid(_) => 'g',
            Self::Opaque(_) => 'b',
        }
    }
}

// =============================================================================
// NodeClass
// =============================================================================

/// OPC UA node class.
///
/// The discriminant values double as browse mask bits, so a browse filter
/// for objects and variables is `NodeClass::Object.mask() |
/// NodeClass::Variable.mask()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeClass {
    /// Object node.
    Object,
    /// Variable node.
    Variable,
    /// Method node.
    Method,
    /// Object type node.
    ObjectType,
    /// Variable type node.
    VariableType,
    /// Reference type node.
    ReferenceType,
    /// Data type node.
    DataType,
    /// View node.
    View,
}

impl NodeClass {
    /// Returns the browse mask bit for this class.
    pub const fn mask(&self) -> u32 {
        match self {
            Self::Object => 1,
            Self::Variable => 2,
            Self::Method => 4,
            Self::ObjectType => 8,
            Self::VariableType => 16,
            Self::ReferenceType => 32,
            Self::DataType => 64,
            Self::View => 128,
        }
    }

    /// Returns the class for a mask bit, or `None` for an unknown value.
    pub const fn from_mask(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Object),
            2 => Some(Self::Variable),
            4 => Some(Self::Method),
            8 => Some(Self::ObjectType),
            16 => Some(Self::VariableType),
            32 => Some(Self::ReferenceType),
            64 => Some(Self::DataType),
            128 => Some(Self::View),
            _ => None,
        }
    }
}

impl fmt::Display for NodeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Object => "Object",
            Self::Variable => "Variable",
            Self::Method => "Method",
            Self::ObjectType => "ObjectType",
            Self::VariableType => "VariableType",
            Self::ReferenceType => "ReferenceType",
            Self::DataType => "DataType",
            Self::View => "View",
        };
        write!(f, "{name}")
    }
}

// =============================================================================
// BrowseDirection / AttributeId
// =============================================================================

/// Direction of reference traversal during a browse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrowseDirection {
    /// Follow references from source to target.
    Forward,
    /// Follow references from target to source.
    Inverse,
    /// Follow references in both directions.
    Both,
}

/// OPC UA attribute identifiers used by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum AttributeId {
    /// The node class (attribute 2).
    NodeClass = 2,
    /// The browse name (attribute 3).
    BrowseName = 3,
    /// The display name (attribute 4).
    DisplayName = 4,
    /// The description (attribute 5).
    Description = 5,
    /// The current value (attribute 13).
    Value = 13,
    /// The data type node id (attribute 14).
    DataType = 14,
    /// The value rank (attribute 15).
    ValueRank = 15,
}

// =============================================================================
// StatusCode
// =============================================================================

/// OPC UA status code with severity bit tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusCode(pub u32);

impl StatusCode {
    /// Operation succeeded.
    pub const GOOD: StatusCode = StatusCode(0x0000_0000);
    /// The node id refers to a node that does not exist.
    pub const BAD_NODE_ID_UNKNOWN: StatusCode = StatusCode(0x8034_0000);
    /// The attribute is not supported for the specified node.
    pub const BAD_ATTRIBUTE_ID_INVALID: StatusCode = StatusCode(0x8035_0000);
    /// The data type id is unknown; the type system may not be loaded yet.
    pub const BAD_DATA_TYPE_ID_UNKNOWN: StatusCode = StatusCode(0x8011_0000);

    /// Returns `true` if the severity bits indicate success.
    #[inline]
    pub const fn is_good(&self) -> bool {
        self.0 & 0xC000_0000 == 0
    }

    /// Returns `true` if the severity bits indicate failure.
    #[inline]
    pub const fn is_bad(&self) -> bool {
        self.0 & 0x8000_0000 != 0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

// =============================================================================
// Variant
// =============================================================================

/// Runtime value of a node attribute.
///
/// Covers the built-in OPC UA scalar types plus homogeneous arrays. The
/// `Display` implementation produces the sample-value text stored on
/// variable nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Variant {
    /// Absent value.
    Null,
    /// Boolean value.
    Boolean(bool),
    /// Signed 8-bit integer.
    SByte(i8),
    /// Unsigned 8-bit integer.
    Byte(u8),
    /// Signed 16-bit integer.
    Int16(i16),
    /// Unsigned 16-bit integer.
    UInt16(u16),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Unsigned 32-bit integer.
    UInt32(u32),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// Single-precision float.
    Float(f32),
    /// Double-precision float.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// Timestamp.
    DateTime(DateTime<Utc>),
    /// GUID value.
    Guid(Uuid),
    /// Raw bytes.
    ByteString(Vec<u8>),
    /// Localized text: optional locale plus text.
    LocalizedText {
        /// Locale identifier, empty when unspecified.
        locale: String,
        /// The text in that locale.
        text: String,
    },
    /// A node id value, as carried by the DataType attribute.
    NodeId(NodeId),
    /// Enumeration description: numeric value plus names.
    EnumValue {
        /// The numeric enumeration value.
        value: i64,
        /// Human-readable name.
        display_name: String,
        /// Optional description text.
        description: String,
    },
    /// Homogeneous array of values.
    Array(Vec<Variant>),
}

impl Variant {
    /// Returns `true` if the value is absent.
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the value as an i64 when it is any integer variant.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::SByte(v) => Some(i64::from(*v)),
            Self::Byte(v) => Some(i64::from(*v)),
            Self::Int16(v) => Some(i64::from(*v)),
            Self::UInt16(v) => Some(i64::from(*v)),
            Self::Int32(v) => Some(i64::from(*v)),
            Self::UInt32(v) => Some(i64::from(*v)),
            Self::Int64(v) => Some(*v),
            Self::UInt64(v) => i64::try_from(*v).ok(),
            Self::Boolean(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    /// Returns the contained node id, if this is a NodeId variant.
    pub fn as_node_id(&self) -> Option<&NodeId> {
        match self {
            Self::NodeId(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the textual content for string-like variants.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            Self::LocalizedText { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Returns the type name used when mapping method outputs.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Boolean(_) => "Boolean",
            Self::SByte(_) => "SByte",
            Self::Byte(_) => "Byte",
            Self::Int16(_) => "Int16",
            Self::UInt16(_) => "UInt16",
            Self::Int32(_) => "Int32",
            Self::UInt32(_) => "UInt32",
            Self::Int64(_) => "Int64",
            Self::UInt64(_) => "UInt64",
            Self::Float(_) => "Float",
            Self::Double(_) => "Double",
            Self::String(_) => "String",
            Self::DateTime(_) => "DateTime",
            Self::Guid(_) => "Guid",
            Self::ByteString(_) => "ByteString",
            Self::LocalizedText { .. } => "LocalizedText",
            Self::NodeId(_) => "NodeId",
            Self::EnumValue { .. } => "EnumValue",
            Self::Array(_) => "Array",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::SByte(v) => write!(f, "{v}"),
            Self::Byte(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::UInt16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::UInt64(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v}"),
            Self::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
            Self::Guid(v) => write!(f, "{v}"),
            Self::ByteString(v) => write!(f, "{}", BASE64.encode(v)),
            Self::LocalizedText { text, .. } => write!(f, "{text}"),
            Self::NodeId(v) => write!(f, "{v}"),
            Self::EnumValue {
                value,
                display_name,
                ..
            } => write!(f, "{display_name} ({value})"),
            Self::Array(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

// =============================================================================
// ClientConfig
// =============================================================================

/// Connection configuration for [`crate::client::AddressSpaceClient`].
///
/// # Examples
///
/// ```
/// use uascan::types::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .endpoint("opc.tcp://localhost:4840")
///     .credentials("operator", "secret")
///     .build()
///     .unwrap();
/// assert_eq!(config.endpoint, "opc.tcp://localhost:4840");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server endpoint URL. Must start with `opc.tcp://`.
    pub endpoint: String,

    /// Username for authentication. Requires `password`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password for authentication. Requires `username`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Application name announced to the server.
    #[serde(default = "default_application_name")]
    pub application_name: String,

    /// Requested session timeout.
    #[serde(with = "humantime_serde", default = "default_session_timeout")]
    pub session_timeout: Duration,
}

fn default_application_name() -> String {
    "uascan".to_string()
}

fn default_session_timeout() -> Duration {
    Duration::from_secs(60)
}

impl ClientConfig {
    /// Creates a configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the endpoint does not use the
    /// `opc.tcp://` scheme, or if only one of username and password is set.
    pub fn validate(&self) -> Result<()> {
        if !self.endpoint.starts_with("opc.tcp://") {
            return Err(Error::validation(format!(
                "endpoint '{}' must start with opc.tcp://",
                self.endpoint
            )));
        }
        if self.username.is_some() != self.password.is_some() {
            return Err(Error::validation(
                "username and password must be provided together",
            ));
        }
        if self.session_timeout.is_zero() {
            return Err(Error::validation("session timeout must be greater than zero"));
        }
        Ok(())
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    endpoint: Option<String>,
    username: Option<String>,
    password: Option<String>,
    application_name: Option<String>,
    session_timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Sets the server endpoint URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets username and password together.
    pub fn credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets the announced application name.
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    /// Sets the requested session timeout.
    pub fn session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = Some(timeout);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if required fields are missing or
    /// invalid.
    pub fn build(self) -> Result<ClientConfig> {
        let config = ClientConfig {
            endpoint: self
                .endpoint
                .ok_or_else(|| Error::validation("endpoint is required"))?,
            username: self.username,
            password: self.password,
            application_name: self
                .application_name
                .unwrap_or_else(default_application_name),
            session_timeout: self.session_timeout.unwrap_or_else(default_session_timeout),
        };
        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// CancelToken
// =============================================================================

/// Cooperative cancellation handle threaded through long traversals.
///
/// Cloning is cheap; all clones observe the same flag. Traversal loops
/// check the token between units of work, so cancellation takes effect at
/// the next node boundary rather than mid-read.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns [`Error::Cancelled`] once cancellation has been requested.
    pub fn ensure_active(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
