//! The host canvas boundary.
//!
//! The import engine never owns live nodes; it drives a host through this
//! trait. Node creation, attachment and property assignment are synchronous.
//! Font availability queries, font loads and component key lookups are the
//! suspension points and are `async`.
//!
//! Every call may fail. Callers are expected to isolate failures to the node
//! they concern.

use async_trait::async_trait;

use crate::error::HostResult;
use crate::font::FontName;
use crate::node::{NodeId, NodeKind, NodeProperty, NodeSnapshot};

/// A mutable scene graph the importer can build into.
#[async_trait]
pub trait CanvasHost: Send + Sync {
    /// Create an empty, detached node of the given kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot create nodes of this kind.
    fn create_node(&self, kind: NodeKind) -> HostResult<NodeId>;

    /// Attach `child` as the last child of `parent`, or of the page when
    /// `parent` is `None`. Re-parents nodes that are already attached.
    ///
    /// # Errors
    ///
    /// Returns an error if either node is missing or `parent` is not a container.
    fn append_child(&self, parent: Option<NodeId>, child: NodeId) -> HostResult<()>;

    /// Remove a node and its subtree.
    ///
    /// # Errors
    ///
    /// Returns an error if the node does not exist.
    fn remove_node(&self, id: NodeId) -> HostResult<()>;

    /// Ordered children of `parent`, or the page-level nodes for `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` does not exist.
    fn children(&self, parent: Option<NodeId>) -> HostResult<Vec<NodeId>>;

    /// Current parent of a node; `None` for page-level or detached nodes.
    ///
    /// # Errors
    ///
    /// Returns an error if the node does not exist.
    fn parent(&self, id: NodeId) -> HostResult<Option<NodeId>>;

    /// Kind of a node.
    ///
    /// # Errors
    ///
    /// Returns an error if the node does not exist.
    fn node_kind(&self, id: NodeId) -> HostResult<NodeKind>;

    /// Assign one property.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is missing or rejects the value.
    fn set_property(&self, id: NodeId, property: NodeProperty) -> HostResult<()>;

    /// Resize a node.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind cannot be resized or the size is invalid.
    fn resize(&self, id: NodeId, width: f32, height: f32) -> HostResult<()>;

    /// Read the properties carried over when a node is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the node does not exist.
    fn snapshot(&self, id: NodeId) -> HostResult<NodeSnapshot>;

    /// Move `children` into a new group inserted into `parent` at `index`
    /// (appended when `None`). Children keep their visual position.
    ///
    /// # Errors
    ///
    /// Returns an error if `children` is empty or any node is missing.
    fn group(
        &self,
        children: &[NodeId],
        parent: Option<NodeId>,
        index: Option<usize>,
    ) -> HostResult<NodeId>;

    /// Create a detached instance of a component definition, including the
    /// definition's subtree.
    ///
    /// # Errors
    ///
    /// Returns an error if `component` is not a component definition.
    fn create_instance(&self, component: NodeId) -> HostResult<NodeId>;

    /// Select the given nodes and bring them into view.
    ///
    /// # Errors
    ///
    /// Returns an error if any node does not exist.
    fn focus(&self, nodes: &[NodeId]) -> HostResult<()>;

    /// Whether the host can load this font.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot answer.
    async fn font_available(&self, font: &FontName) -> HostResult<bool>;

    /// Load a font so text can use it.
    ///
    /// # Errors
    ///
    /// Returns an error if the font cannot be loaded.
    async fn load_font(&self, font: &FontName) -> HostResult<()>;

    /// Find a component definition in the document by stable key.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup itself fails.
    async fn find_component(&self, key: &str) -> HostResult<Option<NodeId>>;
}
