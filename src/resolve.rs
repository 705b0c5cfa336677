// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Data-type resolution.
//!
//! Two layers live here:
//!
//! - A static name table mapping OPC UA type names (with common aliases,
//!   dotted prefixes and nullable wrappers) to native types.
//! - [`TypeInfoResolver`], which classifies a data-type node as primitive,
//!   enumeration or structure by interrogating the server, and caches the
//!   result per scalar type for the lifetime of a connection.
//!
//! Resolution is total: failures while interrogating the server degrade the
//! classification to `Unknown` instead of failing the traversal that asked.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::model::{
    EnumDataType, EnumMember, NativeEnumMember, NativeTypeDescriptor, NativeTypeKind,
    OpcTypeDescriptor, OpcTypeKind, ResolvedTypeInfo,
};
use crate::session::{DataTypeDefinition, UaSession};
use crate::types::{AttributeId, BrowseDirection, CancelToken, NodeClass, NodeId, Variant};

// =============================================================================
// Static name table
// =============================================================================

/// Alias table rows: accepted lowercase names, OPC-level name, native name.
const NAME_TABLE: &[(&[&str], &str, &str)] = &[
    (&["bool", "boolean"], "Boolean", "bool"),
    (&["sbyte", "int8", "i8"], "SByte", "i8"),
    (&["byte", "uint8", "u8"], "Byte", "u8"),
    (&["int16", "short", "i16"], "Int16", "i16"),
    (&["uint16", "ushort", "u16"], "UInt16", "u16"),
    (&["int32", "int", "integer", "i32"], "Int32", "i32"),
    (&["uint32", "uint", "u32"], "UInt32", "u32"),
    (&["int64", "long", "i64"], "Int64", "i64"),
    (&["uint64", "ulong", "u64"], "UInt64", "u64"),
    (&["float", "single", "f32"], "Float", "f32"),
    (&["double", "f64"], "Double", "f64"),
    (&["string", "str"], "String", "String"),
    (&["datetime", "date", "time"], "DateTime", "DateTime<Utc>"),
    (&["guid", "uuid"], "Guid", "Uuid"),
    (&["bytestring", "bytes", "binary"], "ByteString", "Vec<u8>"),
    (&["localizedtext"], "LocalizedText", "String"),
];

/// Built-in data-type rows: ns=0 numeric id, OPC-level name, native name.
const BUILTIN_TABLE: &[(u32, &str, &str)] = &[
    (1, "Boolean", "bool"),
    (2, "SByte", "i8"),
    (3, "Byte", "u8"),
    (4, "Int16", "i16"),
    (5, "UInt16", "u16"),
    (6, "Int32", "i32"),
    (7, "UInt32", "u32"),
    (8, "Int64", "i64"),
    (9, "UInt64", "u64"),
    (10, "Float", "f32"),
    (11, "Double", "f64"),
    (12, "String", "String"),
    (13, "DateTime", "DateTime<Utc>"),
    (14, "Guid", "Uuid"),
    (15, "ByteString", "Vec<u8>"),
    (21, "LocalizedText", "String"),
];

/// Normalizes a type name for table lookup.
///
/// Dotted names keep only their last segment, a `Nullable<...>` wrapper or
/// trailing `?` is stripped, and matching is case-insensitive.
fn normalize_type_name(name: &str) -> String {
    let mut name = name.trim();
    if let Some(rest) = name.strip_suffix('?') {
        name = rest.trim();
    }
    let lowered = name.to_ascii_lowercase();
    let mut normalized = lowered.as_str();
    if let Some(inner) = normalized
        .strip_prefix("nullable<")
        .and_then(|s| s.strip_suffix('>'))
    {
        normalized = inner.trim();
    }
    let last_segment = normalized.rsplit('.').next().unwrap_or(normalized);
    last_segment.to_string()
}

/// Looks up the native type for an OPC UA type name, or `None` when the name
/// is not in the table.
///
/// # Examples
///
/// ```
/// use uascan::resolve::try_lookup_native_type;
///
/// assert!(try_lookup_native_type("Opc.Ua.Int32").is_some());
/// assert!(try_lookup_native_type("FrameworkType").is_none());
/// ```
pub fn try_lookup_native_type(name: &str) -> Option<NativeTypeDescriptor> {
    let normalized = normalize_type_name(name);
    NAME_TABLE
        .iter()
        .find(|(aliases, _, _)| aliases.contains(&normalized.as_str()))
        .map(|(_, opc_name, native)| NativeTypeDescriptor::primitive(*opc_name, *native))
}

/// Looks up the native type for an OPC UA type name.
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] when the name is not in the table.
pub fn lookup_native_type(name: &str) -> Result<NativeTypeDescriptor> {
    try_lookup_native_type(name).ok_or_else(|| Error::unsupported_type(name))
}

fn builtin_for(node_id: &NodeId) -> Option<(&'static str, &'static str)> {
    if !node_id.is_standard() {
        return None;
    }
    let numeric = node_id.as_numeric()?;
    BUILTIN_TABLE
        .iter()
        .find(|(id, _, _)| *id == numeric)
        .map(|(_, opc_name, native)| (*opc_name, *native))
}

// =============================================================================
// TypeInfoResolver
// =============================================================================

/// Resolves and caches type information for data-type nodes.
///
/// The cache key is the scalar data-type node id; array-valued variables
/// reuse the scalar entry and wrap it on the way out, so an array variant
/// never creates its own entry. The cache lives for one connection and is
/// cleared on disconnect.
#[derive(Debug, Default)]
pub struct TypeInfoResolver {
    cache: RwLock<HashMap<String, ResolvedTypeInfo>>,
}

impl TypeInfoResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves type information for `data_type`, consulting the cache
    /// first. Never fails: failures while interrogating the server degrade
    /// the classification to `Unknown`.
    pub async fn resolve<S: UaSession>(
        &self,
        session: &S,
        data_type: &NodeId,
        is_array: bool,
        cancel: &CancelToken,
    ) -> ResolvedTypeInfo {
        let key = data_type.to_opc_string();

        if let Some(cached) = self.cache.read().await.get(&key) {
            trace!(data_type = %key, "type cache hit");
            return wrap_array(cached.clone(), is_array);
        }

        let scalar = self.resolve_scalar(session, data_type, cancel).await;
        self.cache.write().await.insert(key, scalar.clone());
        wrap_array(scalar, is_array)
    }

    /// Number of cached scalar entries.
    pub async fn cached_len(&self) -> usize {
        self.cache.read().await.len()
    }

    /// Drops every cached entry. Called on disconnect, since node ids may
    /// mean different types on another server.
    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }

    async fn resolve_scalar<S: UaSession>(
        &self,
        session: &S,
        data_type: &NodeId,
        cancel: &CancelToken,
    ) -> ResolvedTypeInfo {
        if let Some((opc_name, native)) = builtin_for(data_type) {
            return ResolvedTypeInfo {
                opcua: OpcTypeDescriptor::new(data_type, opc_name, OpcTypeKind::Primitive),
                native: NativeTypeDescriptor::primitive(opc_name, native),
            };
        }

        if cancel.is_cancelled() {
            debug!(data_type = %data_type, "type resolution skipped, cancelled");
            return unknown_info(data_type);
        }

        // Non-builtin: the display name decides whether we can say anything
        // about this type at all.
        let display_name = match session
            .read_attribute(data_type, AttributeId::DisplayName)
            .await
        {
            Ok(attr) => match attr.good_value().and_then(Variant::as_text) {
                Some(text) if !text.is_empty() => text.to_string(),
                _ => {
                    debug!(data_type = %data_type, "type node has no display name");
                    return unknown_info(data_type);
                }
            },
            Err(e) => {
                debug!(data_type = %data_type, error = %e, "type node read failed");
                return unknown_info(data_type);
            }
        };

        // A custom type whose name still maps to a builtin stays primitive.
        if let Some(native) = try_lookup_native_type(&display_name) {
            return ResolvedTypeInfo {
                opcua: OpcTypeDescriptor::new(data_type, display_name, OpcTypeKind::Primitive),
                native,
            };
        }

        match self.discover_enum(session, data_type).await {
            EnumDiscovery::Members { members, .. } if !members.is_empty() => {
                classify_enum(data_type, &display_name, &members)
            }
            _ => ResolvedTypeInfo {
                opcua: OpcTypeDescriptor::new(
                    data_type,
                    display_name.as_str(),
                    OpcTypeKind::Structure,
                ),
                native: NativeTypeDescriptor::complex(display_name),
            },
        }
    }

    /// Tries the three enumeration discovery strategies in order: the
    /// DataTypeDefinition attribute, then the EnumValues property, then the
    /// EnumStrings property. Failures in one strategy fall through to the
    /// next.
    async fn discover_enum<S: UaSession>(
        &self,
        session: &S,
        data_type: &NodeId,
    ) -> EnumDiscovery {
        match session.read_data_type_definition(data_type).await {
            Ok(Some(DataTypeDefinition::Enum(def))) => {
                let members = def
                    .fields
                    .into_iter()
                    .map(|f| EnumMember {
                        value: f.value,
                        display_name: if f.display_name.is_empty() {
                            f.name.clone()
                        } else {
                            f.display_name
                        },
                        name: f.name,
                        description: f.description,
                    })
                    .collect();
                return EnumDiscovery::Members {
                    members,
                    has_enum_values: true,
                };
            }
            Ok(Some(DataTypeDefinition::Structure)) => return EnumDiscovery::Structure,
            Ok(None) => {}
            Err(e) => {
                debug!(data_type = %data_type, error = %e, "data type definition read failed");
            }
        }

        if let Some(members) = self.enum_values_property(session, data_type).await {
            return EnumDiscovery::Members {
                members,
                has_enum_values: true,
            };
        }

        if let Some(members) = self.enum_strings_property(session, data_type).await {
            return EnumDiscovery::Members {
                members,
                has_enum_values: false,
            };
        }

        EnumDiscovery::NotFound
    }

    async fn enum_values_property<S: UaSession>(
        &self,
        session: &S,
        data_type: &NodeId,
    ) -> Option<Vec<EnumMember>> {
        let value = self.read_property(session, data_type, "EnumValues").await?;
        let items = match value {
            Variant::Array(items) => items,
            _ => return None,
        };

        let mut members = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Variant::EnumValue {
                    value,
                    display_name,
                    description,
                } => members.push(EnumMember {
                    value,
                    name: display_name.clone(),
                    display_name,
                    description,
                }),
                other => {
                    debug!(
                        data_type = %data_type,
                        item_type = other.type_name(),
                        "unexpected item in EnumValues property"
                    );
                    return None;
                }
            }
        }
        Some(members)
    }

    async fn enum_strings_property<S: UaSession>(
        &self,
        session: &S,
        data_type: &NodeId,
    ) -> Option<Vec<EnumMember>> {
        let value = self.read_property(session, data_type, "EnumStrings").await?;
        let items = match value {
            Variant::Array(items) => items,
            _ => return None,
        };

        let mut members = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let text = item.as_text()?.to_string();
            members.push(EnumMember {
                value: index as i64,
                name: text.clone(),
                display_name: text,
                description: String::new(),
            });
        }
        Some(members)
    }

    /// Finds a property variable below the type node by browse name and
    /// reads its value.
    async fn read_property<S: UaSession>(
        &self,
        session: &S,
        data_type: &NodeId,
        browse_name: &str,
    ) -> Option<Variant> {
        let references = session
            .browse(data_type, BrowseDirection::Forward, NodeClass::Variable.mask())
            .await
            .ok()?;
        let property = references.iter().find(|r| r.browse_name == browse_name)?;

        let attr = session
            .read_attribute(&property.node_id, AttributeId::Value)
            .await
            .ok()?;
        attr.good_value().cloned()
    }

    /// Reads the full description of an enumeration data type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] when the type node cannot be read and
    /// [`Error::UnsupportedType`] when it carries no enumeration members.
    pub async fn read_enum_data_type<S: UaSession>(
        &self,
        session: &S,
        data_type: &NodeId,
    ) -> Result<EnumDataType> {
        let attr = session
            .read_attribute(data_type, AttributeId::DisplayName)
            .await
            .map_err(|_| Error::node_not_found(data_type.to_opc_string()))?;
        let display_name = attr
            .good_value()
            .and_then(Variant::as_text)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or_else(|| Error::node_not_found(data_type.to_opc_string()))?;

        match self.discover_enum(session, data_type).await {
            EnumDiscovery::Members {
                members,
                has_enum_values,
            } if !members.is_empty() => Ok(EnumDataType {
                node_id: data_type.to_opc_string(),
                name: display_name.clone(),
                display_name,
                has_enum_values,
                members,
            }),
            _ => Err(Error::unsupported_type(display_name)),
        }
    }
}

enum EnumDiscovery {
    Members {
        members: Vec<EnumMember>,
        has_enum_values: bool,
    },
    Structure,
    NotFound,
}

fn unknown_info(data_type: &NodeId) -> ResolvedTypeInfo {
    let name = data_type.identifier_text();
    ResolvedTypeInfo {
        opcua: OpcTypeDescriptor::new(data_type, name.as_str(), OpcTypeKind::Unknown),
        native: NativeTypeDescriptor::unknown(name),
    }
}

/// Builds the enum classification, demoting to a complex type when any
/// member value does not fit the 32-bit native enum representation.
fn classify_enum(
    data_type: &NodeId,
    display_name: &str,
    members: &[EnumMember],
) -> ResolvedTypeInfo {
    let mut native_members = Vec::with_capacity(members.len());
    for member in members {
        match i32::try_from(member.value) {
            Ok(value) => native_members.push(NativeEnumMember {
                value,
                name: member.name.clone(),
                display_name: member.display_name.clone(),
            }),
            Err(_) => {
                debug!(
                    data_type = %data_type,
                    member = %member.name,
                    value = member.value,
                    "enum member exceeds 32 bits, treating type as complex"
                );
                return ResolvedTypeInfo {
                    opcua: OpcTypeDescriptor::new(data_type, display_name, OpcTypeKind::Structure),
                    native: NativeTypeDescriptor::complex(display_name),
                };
            }
        }
    }

    ResolvedTypeInfo {
        opcua: OpcTypeDescriptor::new(data_type, display_name, OpcTypeKind::Enum),
        native: NativeTypeDescriptor {
            kind: NativeTypeKind::Enum,
            name: display_name.to_string(),
            type_name: display_name.to_string(),
            element: None,
            enum_members: native_members,
        },
    }
}

fn wrap_array(scalar: ResolvedTypeInfo, is_array: bool) -> ResolvedTypeInfo {
    if !is_array {
        return scalar;
    }
    ResolvedTypeInfo {
        opcua: scalar.opcua.as_array(),
        native: NativeTypeDescriptor::array_of(scalar.native),
    }
}

// =============================================================================
// Tests
// =============================================================================
