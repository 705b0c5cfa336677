// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Type resolution against an in-memory address space.

mod common;

use common::MockSession;
use uascan::{
    CancelToken, NativeTypeKind, NodeId, OpcTypeKind, TypeInfoResolver,
};

fn node(text: &str) -> NodeId {
    text.parse().unwrap()
}

#[tokio::test]
async fn builtin_types_resolve_without_server_reads() {
    let session = MockSession::new();
    let resolver = TypeInfoResolver::new();

    let info = resolver
        .resolve(&session, &node("i=11"), false, &CancelToken::new())
        .await;

    assert_eq!(info.opcua.kind, OpcTypeKind::Primitive);
    assert_eq!(info.opcua.display_name, "Double");
    assert_eq!(info.native.kind, NativeTypeKind::Primitive);
    assert_eq!(info.native.type_name, "f64");
    assert_eq!(session.read_count(), 0);
}

#[tokio::test]
async fn custom_type_with_builtin_name_stays_primitive() {
    let session = MockSession::new();
    session.add_type_node("ns=3;i=500", "Opc.Ua.UInt16");
    let resolver = TypeInfoResolver::new();

    let info = resolver
        .resolve(&session, &node("ns=3;i=500"), false, &CancelToken::new())
        .await;

    assert_eq!(info.opcua.kind, OpcTypeKind::Primitive);
    assert_eq!(info.native.type_name, "u16");
}

#[tokio::test]
async fn enum_from_data_type_definition() {
    let session = MockSession::new();
    session.add_enum_with_definition(
        "ns=2;i=3000",
        "MachineState",
        &[("Stopped", 0), ("Starting", 1), ("Running", 2)],
    );
    let resolver = TypeInfoResolver::new();

    let info = resolver
        .resolve(&session, &node("ns=2;i=3000"), false, &CancelToken::new())
        .await;

    assert_eq!(info.opcua.kind, OpcTypeKind::Enum);
    assert_eq!(info.native.kind, NativeTypeKind::Enum);
    assert_eq!(info.native.name, "MachineState");
    assert_eq!(info.native.enum_members.len(), 3);
    assert_eq!(info.native.enum_members[2].name, "Running");
    assert_eq!(info.native.enum_members[2].value, 2);
}

#[tokio::test]
async fn enum_from_enum_values_property() {
    let session = MockSession::new();
    session.add_enum_with_values("ns=2;i=3001", "AlarmLevel", &[("Low", 10), ("High", 20)]);
    let resolver = TypeInfoResolver::new();

    let info = resolver
        .resolve(&session, &node("ns=2;i=3001"), false, &CancelToken::new())
        .await;

    assert_eq!(info.native.kind, NativeTypeKind::Enum);
    let values: Vec<i32> = info.native.enum_members.iter().map(|m| m.value).collect();
    assert_eq!(values, vec![10, 20]);
}

#[tokio::test]
async fn enum_from_enum_strings_uses_indices() {
    let session = MockSession::new();
    session.add_enum_with_strings("ns=2;i=3002", "Mode", &["Manual", "Auto", "Remote"]);
    let resolver = TypeInfoResolver::new();

    let info = resolver
        .resolve(&session, &node("ns=2;i=3002"), false, &CancelToken::new())
        .await;

    assert_eq!(info.native.kind, NativeTypeKind::Enum);
    let members: Vec<(i32, &str)> = info
        .native
        .enum_members
        .iter()
        .map(|m| (m.value, m.name.as_str()))
        .collect();
    assert_eq!(members, vec![(0, "Manual"), (1, "Auto"), (2, "Remote")]);
}

#[tokio::test]
async fn enum_with_wide_values_demotes_to_complex() {
    let session = MockSession::new();
    session.add_enum_with_definition(
        "ns=2;i=3003",
        "WideEnum",
        &[("Normal", 0), ("Huge", i64::from(i32::MAX) + 1)],
    );
    let resolver = TypeInfoResolver::new();

    let info = resolver
        .resolve(&session, &node("ns=2;i=3003"), false, &CancelToken::new())
        .await;

    assert_eq!(info.opcua.kind, OpcTypeKind::Structure);
    assert_eq!(info.native.kind, NativeTypeKind::Complex);
    assert!(info.native.enum_members.is_empty());
}

#[tokio::test]
async fn type_without_enum_shape_is_structure() {
    let session = MockSession::new();
    session.add_type_node("ns=2;i=3004", "RecipeHeader");
    let resolver = TypeInfoResolver::new();

    let info = resolver
        .resolve(&session, &node("ns=2;i=3004"), false, &CancelToken::new())
        .await;

    assert_eq!(info.opcua.kind, OpcTypeKind::Structure);
    assert_eq!(info.native.kind, NativeTypeKind::Complex);
    assert_eq!(info.native.name, "RecipeHeader");
}

#[tokio::test]
async fn unreadable_type_degrades_to_unknown() {
    let session = MockSession::new();
    let resolver = TypeInfoResolver::new();

    let info = resolver
        .resolve(&session, &node("ns=9;i=9999"), false, &CancelToken::new())
        .await;

    assert_eq!(info.opcua.kind, OpcTypeKind::Unknown);
    assert_eq!(info.native.kind, NativeTypeKind::Unknown);
    assert_eq!(info.native.name, "9999");
}

#[tokio::test]
async fn second_resolution_is_served_from_cache() {
    let session = MockSession::new();
    session.add_enum_with_strings("ns=2;i=3002", "Mode", &["Manual", "Auto"]);
    let resolver = TypeInfoResolver::new();
    let cancel = CancelToken::new();

    let first = resolver
        .resolve(&session, &node("ns=2;i=3002"), false, &cancel)
        .await;
    let reads_after_first = session.read_count();
    let browses_after_first = session.browse_count();

    let second = resolver
        .resolve(&session, &node("ns=2;i=3002"), false, &cancel)
        .await;

    assert_eq!(first, second);
    assert_eq!(session.read_count(), reads_after_first);
    assert_eq!(session.browse_count(), browses_after_first);
    assert_eq!(resolver.cached_len().await, 1);
}

#[tokio::test]
async fn array_variant_reuses_scalar_entry() {
    let session = MockSession::new();
    session.add_type_node("ns=2;i=3004", "RecipeHeader");
    let resolver = TypeInfoResolver::new();
    let cancel = CancelToken::new();

    let array = resolver
        .resolve(&session, &node("ns=2;i=3004"), true, &cancel)
        .await;
    assert!(array.opcua.is_array);
    assert_eq!(array.native.kind, NativeTypeKind::Array);
    assert_eq!(array.native.element.as_ref().unwrap().name, "RecipeHeader");
    assert_eq!(resolver.cached_len().await, 1);

    // The scalar variant comes straight from the same entry.
    let reads = session.read_count();
    let scalar = resolver
        .resolve(&session, &node("ns=2;i=3004"), false, &cancel)
        .await;
    assert!(!scalar.opcua.is_array);
    assert_eq!(session.read_count(), reads);
    assert_eq!(resolver.cached_len().await, 1);
}

#[tokio::test]
async fn clear_drops_cached_entries() {
    let session = MockSession::new();
    session.add_type_node("ns=2;i=3004", "RecipeHeader");
    let resolver = TypeInfoResolver::new();
    let cancel = CancelToken::new();

    resolver
        .resolve(&session, &node("ns=2;i=3004"), false, &cancel)
        .await;
    assert_eq!(resolver.cached_len().await, 1);

    resolver.clear().await;
    assert_eq!(resolver.cached_len().await, 0);
}

#[tokio::test]
async fn read_enum_data_type_describes_members() {
    let session = MockSession::new();
    session.add_enum_with_values("ns=2;i=3001", "AlarmLevel", &[("Low", 10), ("High", 20)]);
    let resolver = TypeInfoResolver::new();

    let described = resolver
        .read_enum_data_type(&session, &node("ns=2;i=3001"))
        .await
        .unwrap();

    assert_eq!(described.name, "AlarmLevel");
    assert!(described.has_enum_values);
    assert_eq!(described.members.len(), 2);
    assert_eq!(described.members[1].value, 20);
}

#[tokio::test]
async fn read_enum_data_type_from_strings_has_no_declared_values() {
    let session = MockSession::new();
    session.add_enum_with_strings("ns=2;i=3002", "Mode", &["Manual", "Auto"]);
    let resolver = TypeInfoResolver::new();

    let described = resolver
        .read_enum_data_type(&session, &node("ns=2;i=3002"))
        .await
        .unwrap();

    assert!(!described.has_enum_values);
    assert_eq!(described.members[0].value, 0);
}

#[tokio::test]
async fn read_enum_data_type_rejects_non_enums() {
    let session = MockSession::new();
    session.add_type_node("ns=2;i=3004", "RecipeHeader");
    let resolver = TypeInfoResolver::new();

    let err = resolver
        .read_enum_data_type(&session, &node("ns=2;i=3004"))
        .await
        .unwrap_err();
    assert_eq!(err.category(), "unsupported_type");
}

#[tokio::test]
async fn read_enum_data_type_missing_node_fails() {
    let session = MockSession::new();
    let resolver = TypeInfoResolver::new();

    let err = resolver
        .read_enum_data_type(&session, &node("ns=2;i=4040"))
        .await
        .unwrap_err();
    assert_eq!(err.category(), "node_not_found");
}
