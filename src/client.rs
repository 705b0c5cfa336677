// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Address-space client.
//!
//! [`AddressSpaceClient`] wraps a [`UaSession`] with connection lifecycle
//! management and the traversal operations that build [`crate::model`]
//! trees: single-node reads, recursive object walks, best-effort batch
//! reads, writes and method calls.
//!
//! # Connection lifecycle
//!
//! ```text
//! Disconnected -> Connecting -> Connected -> Disconnecting -> Disconnected
//! ```
//!
//! State lives in an atomic so the keep-alive handler can mark the client
//! disconnected from the transport's callback context without waiting on
//! any lock. In-flight traversals then fail with a retryable
//! [`Error::NotConnected`] at their next node boundary.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::model::{NodeObject, NodeVariable, UNKNOWN_PARENT_ID};
use crate::resolve::TypeInfoResolver;
use crate::session::{KeepAliveStatus, UaSession, UserIdentity};
use crate::types::{
    AttributeId, BrowseDirection, CancelToken, ClientConfig, NodeClass, NodeId, StatusCode,
    Variant,
};

// =============================================================================
// ClientState
// =============================================================================

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ClientState {
    /// No session is active.
    Disconnected = 0,
    /// A connect call is in progress.
    Connecting = 1,
    /// The session is active and usable.
    Connected = 2,
    /// A disconnect call is in progress.
    Disconnecting = 3,
}

#[derive(Debug)]
struct StateCell(AtomicU8);

impl StateCell {
    fn new(state: ClientState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    fn load(&self) -> ClientState {
        match self.0.load(Ordering::SeqCst) {
            1 => ClientState::Connecting,
            2 => ClientState::Connected,
            3 => ClientState::Disconnecting,
            _ => ClientState::Disconnected,
        }
    }

    fn store(&self, state: ClientState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }
}

// =============================================================================
// Keep-alive
// =============================================================================

/// Handle given to the transport's keep-alive mechanism.
///
/// When a heartbeat reports an unhealthy session the handle flips the owning
/// client to `Disconnected` synchronously. A later reconnect starts fresh.
#[derive(Debug, Clone)]
pub struct KeepAliveHandle {
    state: Arc<StateCell>,
}

impl KeepAliveHandle {
    /// Applies a keep-alive report to the client state.
    pub fn notify(&self, status: KeepAliveStatus) {
        if status.healthy {
            trace!("keep-alive healthy");
            return;
        }
        if self.state.load() == ClientState::Connected {
            warn!("keep-alive reported unhealthy session, marking client disconnected");
            self.state.store(ClientState::Disconnected);
        }
    }
}

// =============================================================================
// Traversal options
// =============================================================================

/// Node-id filters applied while walking an object subtree.
///
/// Exclusion wins over inclusion. An absent include set allows everything;
/// an empty include set allows nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalkFilters {
    /// Object node ids to include, `None` to include all.
    #[serde(default)]
    pub include_objects: Option<HashSet<String>>,
    /// Object node ids to exclude.
    #[serde(default)]
    pub exclude_objects: HashSet<String>,
    /// Variable node ids to include, `None` to include all.
    #[serde(default)]
    pub include_variables: Option<HashSet<String>>,
    /// Variable node ids to exclude.
    #[serde(default)]
    pub exclude_variables: HashSet<String>,
}

impl WalkFilters {
    /// Returns `true` if the object id passes the filters.
    pub fn allows_object(&self, node_id: &str) -> bool {
        if self.exclude_objects.contains(node_id) {
            return false;
        }
        self.include_objects
            .as_ref()
            .map_or(true, |set| set.contains(node_id))
    }

    /// Returns `true` if the variable id passes the filters.
    pub fn allows_variable(&self, node_id: &str) -> bool {
        if self.exclude_variables.contains(node_id) {
            return false;
        }
        self.include_variables
            .as_ref()
            .map_or(true, |set| set.contains(node_id))
    }
}

/// Options for [`AddressSpaceClient::read_node_object`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectReadOptions {
    /// Attach child objects while walking.
    pub include_objects: bool,
    /// Attach child variables while walking.
    pub include_variables: bool,
    /// Read and render each variable's current value.
    pub include_sample_values: bool,
    /// Object levels to descend below the root. Zero reads the root alone.
    pub object_depth: u32,
    /// Variable nesting levels to descend below each variable.
    pub variable_depth: u32,
    /// Node-id filters applied during the walk.
    #[serde(default)]
    pub filters: WalkFilters,
}

impl Default for ObjectReadOptions {
    fn default() -> Self {
        Self {
            include_objects: true,
            include_variables: true,
            include_sample_values: false,
            object_depth: 1,
            variable_depth: 0,
            filters: WalkFilters::default(),
        }
    }
}

// =============================================================================
// Batch read outcome
// =============================================================================

/// Result of a best-effort batch variable read.
///
/// Successes and failures are reported side by side; one unreadable node
/// never discards the others.
#[derive(Debug)]
pub struct BatchReadOutcome {
    /// Variables that were read successfully, in request order.
    pub variables: Vec<NodeVariable>,
    /// Node ids that failed, each with its error.
    pub errors: Vec<(String, Error)>,
}

impl BatchReadOutcome {
    /// Returns `true` when every requested node was read.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

// =============================================================================
// Method calls
// =============================================================================

/// Wire encoding of a method input argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgumentEncoding {
    /// Boolean argument.
    Boolean,
    /// Double-precision float argument.
    Double,
    /// 32-bit integer argument.
    Int32,
    /// 64-bit integer argument.
    Int64,
    /// String argument.
    String,
}

/// One method input argument: target encoding plus textual value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodArgument {
    /// Encoding to bind the value as.
    pub encoding: ArgumentEncoding,
    /// Textual representation of the value.
    pub value: String,
}

/// One method output value rendered as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodOutput {
    /// Name of the value's wire type.
    pub type_name: String,
    /// Textual rendering of the value.
    pub value: String,
}

// =============================================================================
// AddressSpaceClient
// =============================================================================

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Browse mask covering every node class, so the walk can log what it skips.
const ALL_CLASSES_MASK: u32 = 255;

/// High-level client over a [`UaSession`].
#[derive(Debug)]
pub struct AddressSpaceClient<S: UaSession> {
    config: ClientConfig,
    session: Mutex<S>,
    state: Arc<StateCell>,
    resolver: TypeInfoResolver,
}

impl<S: UaSession> AddressSpaceClient<S> {
    /// Creates a disconnected client around a session implementation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the configuration is invalid.
    pub fn new(config: ClientConfig, session: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            session: Mutex::new(session),
            state: Arc::new(StateCell::new(ClientState::Disconnected)),
            resolver: TypeInfoResolver::new(),
        })
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> ClientState {
        self.state.load()
    }

    /// Returns `true` while the client considers itself connected.
    pub fn is_connected(&self) -> bool {
        self.state.load() == ClientState::Connected
    }

    /// Returns a handle for the transport's keep-alive callbacks.
    pub fn keep_alive_handle(&self) -> KeepAliveHandle {
        KeepAliveHandle {
            state: Arc::clone(&self.state),
        }
    }

    /// Returns the type-info resolver shared by this client's traversals.
    pub fn resolver(&self) -> &TypeInfoResolver {
        &self.resolver
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Connects and activates a session. Connecting while already connected
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] when session establishment fails; the
    /// client is left disconnected.
    pub async fn connect(&self) -> Result<()> {
        if self.state.load() == ClientState::Connected {
            info!(endpoint = %self.config.endpoint, "already connected");
            return Ok(());
        }

        let identity = match (&self.config.username, &self.config.password) {
            (Some(username), Some(password)) => UserIdentity::UserName {
                username: username.clone(),
                password: password.clone(),
            },
            (None, None) => UserIdentity::Anonymous,
            _ => {
                return Err(Error::validation(
                    "username and password must be provided together",
                ))
            }
        };

        self.state.store(ClientState::Connecting);
        info!(endpoint = %self.config.endpoint, "connecting");

        let mut session = self.session.lock().await;
        if session.is_connected() {
            // Left over from a keep-alive failure: the state cell was flipped
            // without closing the transport. Start from a clean session and
            // an empty type cache.
            debug!(endpoint = %self.config.endpoint, "tearing down stale session");
            if let Err(e) = session.disconnect().await {
                warn!(error = %e, "stale session teardown failed");
            }
            self.resolver.clear().await;
        }
        match session.connect(&identity).await {
            Ok(()) => {
                self.state.store(ClientState::Connected);
                info!(endpoint = %self.config.endpoint, "connected");
                Ok(())
            }
            Err(e) => {
                self.state.store(ClientState::Disconnected);
                e.log("connect");
                Err(e)
            }
        }
    }

    /// Tears down the session and clears the type cache.
    ///
    /// Also closes a session the keep-alive handler already marked
    /// disconnected: the state cell flip happens in callback context and
    /// leaves the transport open until this is called.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] when no session was active. Transport
    /// failures during teardown are logged but not surfaced; the client
    /// always ends up disconnected.
    pub async fn disconnect(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        if self.state.load() != ClientState::Connected && !session.is_connected() {
            return Err(Error::NotConnected);
        }

        self.state.store(ClientState::Disconnecting);
        if let Err(e) = session.disconnect().await {
            warn!(error = %e, "session teardown failed");
        }
        drop(session);

        self.resolver.clear().await;
        self.state.store(ClientState::Disconnected);
        info!(endpoint = %self.config.endpoint, "disconnected");
        Ok(())
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.state.load() == ClientState::Connected {
            Ok(())
        } else {
            Err(Error::NotConnected)
        }
    }

    // =========================================================================
    // Variable reads
    // =========================================================================

    /// Reads a single variable node with resolved type information.
    ///
    /// `variable_depth` bounds how many nested variable levels are attached
    /// below the root; zero reads the variable alone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] when the id does not resolve and
    /// [`Error::WrongNodeClass`] when it resolves to a non-variable.
    pub async fn read_node_variable(
        &self,
        node_id: &str,
        include_sample_value: bool,
        variable_depth: u32,
        cancel: &CancelToken,
    ) -> Result<NodeVariable> {
        self.ensure_connected()?;
        let parsed: NodeId = node_id.parse()?;
        let session = self.session.lock().await;

        let (class, display_name) = self.read_identity(&*session, &parsed).await?;
        if class != NodeClass::Variable {
            return Err(Error::wrong_node_class(
                parsed.to_opc_string(),
                NodeClass::Variable,
                class,
            ));
        }

        self.map_variable(
            &*session,
            &parsed,
            display_name,
            UNKNOWN_PARENT_ID.to_string(),
            variable_depth,
            include_sample_value,
            None,
            cancel,
        )
        .await
    }

    /// Reads many variables, collecting per-node failures instead of
    /// aborting on the first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] before touching any node; everything
    /// else is reported per node inside the outcome.
    pub async fn read_node_variables(
        &self,
        node_ids: &[&str],
        include_sample_values: bool,
        variable_depth: u32,
        cancel: &CancelToken,
    ) -> Result<BatchReadOutcome> {
        self.ensure_connected()?;

        let mut outcome = BatchReadOutcome {
            variables: Vec::with_capacity(node_ids.len()),
            errors: Vec::new(),
        };
        for node_id in node_ids {
            cancel.ensure_active()?;
            match self
                .read_node_variable(node_id, include_sample_values, variable_depth, cancel)
                .await
            {
                Ok(variable) => outcome.variables.push(variable),
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => {
                    e.log("batch variable read");
                    outcome.errors.push(((*node_id).to_string(), e));
                }
            }
        }
        Ok(outcome)
    }

    // =========================================================================
    // Object reads
    // =========================================================================

    /// Reads an object node and walks its subtree per `options`.
    ///
    /// Children are attached only after their own subtree is complete, so a
    /// failure deep in the walk never leaves a half-built child on the
    /// result. The server diagnostics subtree is always skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] when the id does not resolve and
    /// [`Error::WrongNodeClass`] when it resolves to a non-object.
    pub async fn read_node_object(
        &self,
        node_id: &str,
        options: &ObjectReadOptions,
        cancel: &CancelToken,
    ) -> Result<NodeObject> {
        self.ensure_connected()?;
        let parsed: NodeId = node_id.parse()?;
        let session = self.session.lock().await;

        let (class, display_name) = self.read_identity(&*session, &parsed).await?;
        if class != NodeClass::Object {
            return Err(Error::wrong_node_class(
                parsed.to_opc_string(),
                NodeClass::Object,
                class,
            ));
        }

        let mut root = NodeObject::new(parsed.to_opc_string(), display_name.unwrap_or_default());
        if parsed.is_infrastructure() {
            debug!(node_id = %root.node_id, "root is server infrastructure, not walking");
            return Ok(root);
        }

        self.walk_object(&*session, &mut root, &parsed, 0, options, cancel)
            .await?;
        debug!(
            node_id = %root.node_id,
            objects = root.objects.len(),
            variables = root.variables.len(),
            "object read complete"
        );
        Ok(root)
    }

    /// Reads node class and display name, mapping an unknown node id to
    /// [`Error::NodeNotFound`].
    async fn read_identity(
        &self,
        session: &S,
        node: &NodeId,
    ) -> Result<(NodeClass, Option<String>)> {
        let values = session
            .read_attributes(node, &[AttributeId::NodeClass, AttributeId::DisplayName])
            .await?;

        let class_attr = values
            .first()
            .ok_or_else(|| Error::transport("attribute read returned no results"))?;
        if class_attr.status == StatusCode::BAD_NODE_ID_UNKNOWN {
            return Err(Error::node_not_found(node.to_opc_string()));
        }
        let class = class_attr
            .good_value()
            .and_then(Variant::as_i64)
            .and_then(|v| u32::try_from(v).ok())
            .and_then(NodeClass::from_mask)
            .ok_or_else(|| Error::node_not_found(node.to_opc_string()))?;

        let display_name = values
            .get(1)
            .and_then(AttributeValueExt::good_text)
            .map(str::to_string);
        Ok((class, display_name))
    }

    /// Walks one object level: browses `node`, attaches passing children,
    /// recurses into child objects while depth remains.
    fn walk_object<'a>(
        &'a self,
        session: &'a S,
        node: &'a mut NodeObject,
        node_id: &'a NodeId,
        level: u32,
        options: &'a ObjectReadOptions,
        cancel: &'a CancelToken,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if level >= options.object_depth {
                return Ok(());
            }
            cancel.ensure_active()?;
            self.ensure_connected()?;

            let references = session
                .browse(node_id, BrowseDirection::Forward, ALL_CLASSES_MASK)
                .await?;

            for reference in references {
                cancel.ensure_active()?;
                if reference.node_id.is_infrastructure() {
                    debug!(node_id = %reference.node_id, "skipping server infrastructure");
                    continue;
                }
                let child_id = reference.node_id.to_opc_string();

                match reference.node_class {
                    NodeClass::Object if options.include_objects => {
                        if !options.filters.allows_object(&child_id) {
                            trace!(node_id = %child_id, "object filtered out");
                            continue;
                        }
                        let mut child = NodeObject::new(child_id, reference.display_name);
                        child.parent_node_id = node.node_id.clone();
                        self.walk_object(
                            session,
                            &mut child,
                            &reference.node_id,
                            level + 1,
                            options,
                            cancel,
                        )
                        .await?;
                        node.objects.push(child);
                    }
                    NodeClass::Variable if options.include_variables => {
                        if !options.filters.allows_variable(&child_id) {
                            trace!(node_id = %child_id, "variable filtered out");
                            continue;
                        }
                        match self
                            .map_variable(
                                session,
                                &reference.node_id,
                                Some(reference.display_name),
                                node.node_id.clone(),
                                options.variable_depth,
                                options.include_sample_values,
                                Some(&options.filters),
                                cancel,
                            )
                            .await
                        {
                            Ok(child) => node.variables.push(child),
                            Err(Error::Cancelled) => return Err(Error::Cancelled),
                            Err(e) => {
                                e.log("variable read during walk");
                            }
                        }
                    }
                    NodeClass::Object | NodeClass::Variable => {
                        trace!(node_id = %child_id, "child class disabled by options");
                    }
                    other => {
                        debug!(
                            node_id = %child_id,
                            node_class = %other,
                            "skipping unsupported node class"
                        );
                    }
                }
            }
            Ok(())
        })
    }

    /// Builds a variable node: resolves its type, optionally samples its
    /// value, recurses into nested variables while depth remains.
    #[allow(clippy::too_many_arguments)]
    fn map_variable<'a>(
        &'a self,
        session: &'a S,
        node_id: &'a NodeId,
        display_name: Option<String>,
        parent_node_id: String,
        depth: u32,
        include_sample_value: bool,
        filters: Option<&'a WalkFilters>,
        cancel: &'a CancelToken,
    ) -> BoxFuture<'a, Result<NodeVariable>> {
        Box::pin(async move {
            cancel.ensure_active()?;

            let mut variable =
                NodeVariable::new(node_id.to_opc_string(), display_name.unwrap_or_default());
            variable.parent_node_id = parent_node_id;

            let values = session
                .read_attributes(node_id, &[AttributeId::DataType, AttributeId::ValueRank])
                .await?;
            let data_type = values
                .first()
                .and_then(|attr| attr.good_value())
                .and_then(Variant::as_node_id)
                .cloned();
            let is_array = values
                .get(1)
                .and_then(|attr| attr.good_value())
                .and_then(Variant::as_i64)
                .map_or(false, |rank| rank >= 1);

            match &data_type {
                Some(data_type) => {
                    let info = self
                        .resolver
                        .resolve(session, data_type, is_array, cancel)
                        .await;
                    variable.data_type_native = info.native.type_name.clone();
                    variable.data_type_opcua = Some(info.opcua);
                }
                None => {
                    debug!(node_id = %variable.node_id, "variable has no readable data type");
                }
            }

            if include_sample_value {
                variable.sample_value = self
                    .sample_value(session, node_id, data_type.as_ref())
                    .await;
            }

            if depth > 0 {
                let references = session
                    .browse(node_id, BrowseDirection::Forward, NodeClass::Variable.mask())
                    .await?;
                for reference in references {
                    cancel.ensure_active()?;
                    let child_id = reference.node_id.to_opc_string();
                    if let Some(filters) = filters {
                        if !filters.allows_variable(&child_id) {
                            trace!(node_id = %child_id, "nested variable filtered out");
                            continue;
                        }
                    }
                    match self
                        .map_variable(
                            session,
                            &reference.node_id,
                            Some(reference.display_name),
                            variable.node_id.clone(),
                            depth - 1,
                            include_sample_value,
                            filters,
                            cancel,
                        )
                        .await
                    {
                        Ok(child) => variable.variables.push(child),
                        Err(Error::Cancelled) => return Err(Error::Cancelled),
                        Err(e) => {
                            e.log("nested variable read");
                        }
                    }
                }
            }

            Ok(variable)
        })
    }

    /// Reads the value attribute and renders it as text. A read failing with
    /// an unknown data-type id triggers one type-system load and a single
    /// retry; any remaining failure leaves the sample empty.
    async fn sample_value(
        &self,
        session: &S,
        node_id: &NodeId,
        data_type: Option<&NodeId>,
    ) -> String {
        let first = session.read_attribute(node_id, AttributeId::Value).await;
        let attr = match first {
            Ok(attr) if attr.status == StatusCode::BAD_DATA_TYPE_ID_UNKNOWN => {
                let Some(data_type) = data_type else {
                    debug!(node_id = %node_id, "value has unknown data type and no type node");
                    return String::new();
                };
                debug!(node_id = %node_id, "loading type system for value retry");
                if let Err(e) = session.load_type_system(data_type).await {
                    debug!(node_id = %node_id, error = %e, "type system load failed");
                    return String::new();
                }
                match session.read_attribute(node_id, AttributeId::Value).await {
                    Ok(attr) => attr,
                    Err(e) => {
                        debug!(node_id = %node_id, error = %e, "value retry failed");
                        return String::new();
                    }
                }
            }
            Ok(attr) => attr,
            Err(e) => {
                debug!(node_id = %node_id, error = %e, "value read failed");
                return String::new();
            }
        };

        match attr.good_value() {
            Some(value) => value.to_string(),
            None => {
                debug!(node_id = %node_id, status = %attr.status, "value read not good");
                String::new()
            }
        }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Writes one value to a variable node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WriteRejected`] when the server reports any non-good
    /// status or the write fails in transit.
    pub async fn write_node(&self, node_id: &str, value: Variant) -> Result<()> {
        self.write_nodes(&[(node_id.to_string(), value)]).await
    }

    /// Writes values to several variable nodes in one service call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WriteRejected`] when the server reports any non-good
    /// status or the write fails in transit. The error lists every rejected
    /// node.
    pub async fn write_nodes(&self, writes: &[(String, Variant)]) -> Result<()> {
        self.ensure_connected()?;

        let mut parsed = Vec::with_capacity(writes.len());
        for (node_id, value) in writes {
            parsed.push((node_id.parse::<NodeId>()?, value.clone()));
        }

        let session = self.session.lock().await;
        let statuses = session
            .write_values(&parsed)
            .await
            .map_err(|e| Error::write_rejected(e.to_string()))?;

        let rejected: Vec<String> = statuses
            .iter()
            .zip(&parsed)
            .filter(|(status, _)| !status.is_good())
            .map(|(status, (node_id, _))| format!("{node_id} rejected with status {status}"))
            .collect();
        if rejected.is_empty() {
            debug!(count = parsed.len(), "write complete");
            Ok(())
        } else {
            Err(Error::write_rejected(rejected.join("; ")))
        }
    }

    // =========================================================================
    // Method calls
    // =========================================================================

    /// Calls a method on an object node.
    ///
    /// Only boolean and double arguments are bound; arguments with other
    /// encodings are logged and dropped before the call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when an argument value does not parse
    /// and [`Error::Transport`] when the server reports a non-good call
    /// status.
    pub async fn execute_method(
        &self,
        object_id: &str,
        method_id: &str,
        arguments: &[MethodArgument],
    ) -> Result<Vec<MethodOutput>> {
        self.ensure_connected()?;
        let object: NodeId = object_id.parse()?;
        let method: NodeId = method_id.parse()?;

        let mut inputs = Vec::with_capacity(arguments.len());
        for argument in arguments {
            match argument.encoding {
                ArgumentEncoding::Boolean => {
                    let value: bool = argument.value.trim().parse().map_err(|_| {
                        Error::validation(format!(
                            "'{}' is not a valid boolean argument",
                            argument.value
                        ))
                    })?;
                    inputs.push(Variant::Boolean(value));
                }
                ArgumentEncoding::Double => {
                    let value: f64 = argument.value.trim().parse().map_err(|_| {
                        Error::validation(format!(
                            "'{}' is not a valid double argument",
                            argument.value
                        ))
                    })?;
                    inputs.push(Variant::Double(value));
                }
                other => {
                    warn!(
                        encoding = ?other,
                        value = %argument.value,
                        "argument encoding is not bindable, dropping"
                    );
                }
            }
        }

        let session = self.session.lock().await;
        let outcome = session.call_method(&object, &method, &inputs).await?;
        if !outcome.status.is_good() {
            return Err(Error::transport(format!(
                "method {method} on {object} failed with status {}",
                outcome.status
            )));
        }

        Ok(outcome
            .outputs
            .into_iter()
            .map(|value| MethodOutput {
                type_name: value.type_name().to_string(),
                value: value.to_string(),
            })
            .collect())
    }
}

/// Helper for pulling good textual values out of attribute reads.
trait AttributeValueExt {
    fn good_text(&self) -> Option<&str>;
}

impl AttributeValueExt for crate::session::AttributeValue {
    fn good_text(&self) -> Option<&str> {
        self.good_value().and_then(Variant::as_text)
    }
}

// =============================================================================
// Tests
// =============================================================================
