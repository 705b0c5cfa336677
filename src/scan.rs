// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Address-space scanning.
//!
//! [`Scanner`] is the coarse entry point for capturing a subtree: it
//! validates its inputs, reads the start node as an object, falls back to a
//! variable read when the start node turns out not to be one, and folds
//! everything into a single [`ScanResult`] that is safe to serialize and
//! ship regardless of outcome.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client::{AddressSpaceClient, ObjectReadOptions, WalkFilters};
use crate::model::Node;
use crate::session::UaSession;
use crate::types::{CancelToken, NodeId};

// =============================================================================
// ScanOptions
// =============================================================================

/// Options for a scan.
///
/// Depths are signed so that caller-supplied values can be rejected instead
/// of silently reinterpreted; a negative depth fails the scan before any
/// server call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Node id to start from. Empty or absent starts at the Objects folder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_node_id: Option<String>,

    /// Object levels to descend below the start node.
    pub object_depth: i32,

    /// Variable nesting levels to descend below each variable.
    pub variable_depth: i32,

    /// Read and render each variable's current value.
    #[serde(default)]
    pub include_sample_values: bool,

    /// Node-id filters applied during the walk.
    #[serde(default)]
    pub filters: WalkFilters,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            start_node_id: None,
            object_depth: 1,
            variable_depth: 0,
            include_sample_values: false,
            filters: WalkFilters::default(),
        }
    }
}

// =============================================================================
// ScanResult
// =============================================================================

/// Normalized outcome of a scan.
///
/// A failed scan carries a message instead of a tree; it never carries a
/// partially built root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// `true` when a tree was captured.
    pub succeeded: bool,

    /// The captured tree, present only on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<Node>,

    /// Failure description, present only on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanResult {
    /// Creates a successful result.
    pub fn success(root: Node) -> Self {
        Self {
            succeeded: true,
            root: Some(root),
            error: None,
        }
    }

    /// Creates a failed result.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            root: None,
            error: Some(error.into()),
        }
    }
}

// =============================================================================
// Scanner
// =============================================================================

/// Facade that turns a client and options into one [`ScanResult`].
#[derive(Debug, Default)]
pub struct Scanner;

impl Scanner {
    /// Scans the address space below the configured start node.
    ///
    /// Never fails as a function: connectivity problems, bad options and
    /// read failures all come back as a failed [`ScanResult`]. Input
    /// validation happens before any server call, so an invalid request
    /// costs no network round trips.
    pub async fn scan<S: UaSession>(
        client: &AddressSpaceClient<S>,
        options: &ScanOptions,
        cancel: &CancelToken,
    ) -> ScanResult {
        if !client.is_connected() {
            return ScanResult::failure("client is not connected");
        }
        if options.object_depth < 0 || options.variable_depth < 0 {
            return ScanResult::failure("scan depth must not be negative");
        }

        let start = options
            .start_node_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| NodeId::OBJECTS_FOLDER.to_opc_string());
        info!(
            start_node = %start,
            object_depth = options.object_depth,
            variable_depth = options.variable_depth,
            "starting scan"
        );

        let read_options = ObjectReadOptions {
            include_objects: true,
            include_variables: true,
            include_sample_values: options.include_sample_values,
            object_depth: options.object_depth as u32,
            variable_depth: options.variable_depth as u32,
            filters: options.filters.clone(),
        };

        let object_error = match client.read_node_object(&start, &read_options, cancel).await {
            Ok(root) => return ScanResult::success(Node::Object(root)),
            Err(e) => {
                debug!(start_node = %start, error = %e, "object read failed, trying variable");
                e
            }
        };

        match client
            .read_node_variable(
                &start,
                options.include_sample_values,
                options.variable_depth as u32,
                cancel,
            )
            .await
        {
            Ok(root) => ScanResult::success(Node::Variable(root)),
            Err(variable_error) => {
                object_error.log("scan");
                variable_error.log("scan variable fallback");
                ScanResult::failure(object_error.to_string())
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
