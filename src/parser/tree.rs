//! N-ary expression tree
//!
//! Nodes live in an arena owned by [`ExprTree`] and are addressed by [`NodeId`].
//! Every node owns its token and its ordered children; the parent link is a
//! plain id used for upward and sibling traversal only.

use std::fmt;

/// Token that ends an interactive session when it appears as a childless root
pub const END_COMMAND: &str = "<>";

/// Token of the assignment operator
pub const ASSIGN_TOKEN: &str = "=";

/// Handle to a node inside an [`ExprTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Node {
    token: String,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    /// Position inside the parent's child list
    slot: usize,
}

/// Arena of expression nodes
///
/// Freshly created nodes are roots. [`ExprTree::add_child`] attaches a root
/// under another node exactly once; attachments are never undone.
#[derive(Debug, Clone, Default)]
pub struct ExprTree {
    nodes: Vec<Option<Node>>,
}

impl ExprTree {
    /// Creates an empty arena
    pub fn new() -> Self {
        ExprTree { nodes: Vec::new() }
    }

    /// Creates a new root node holding `token`
    pub fn create(&mut self, token: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node {
            token: token.into(),
            children: Vec::new(),
            parent: None,
            slot: 0,
        }));
        id
    }

    /// Appends `child` as the last child of `parent`
    ///
    /// # Panics
    ///
    /// Panics if `child` is already attached somewhere, or if attaching it
    /// would make a node its own ancestor.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        assert!(
            self.is_root(child),
            "node {} is already attached to a parent",
            child
        );
        assert!(
            self.root_of(parent) != child,
            "attaching {} under {} would create a cycle",
            child,
            parent
        );

        let slot = self.node(parent).children.len();
        self.node_mut(parent).children.push(child);
        let node = self.node_mut(child);
        node.parent = Some(parent);
        node.slot = slot;
    }

    /// Destroys the subtree rooted at `node`, children before their parent
    ///
    /// `None` is a no-op. Ids of destroyed nodes must not be used again.
    ///
    /// # Panics
    ///
    /// Panics if `node` is attached to a parent. Only whole trees are destroyed,
    /// since clearing an attached subtree would leave its id dangling in the
    /// parent's child list.
    pub fn destroy(&mut self, node: Option<NodeId>) {
        let Some(root) = node else {
            return;
        };
        assert!(self.is_root(root), "only root nodes can be destroyed");

        // Pre-order collection reversed gives children before parents
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.node(id).children.iter().copied());
        }
        for id in order.into_iter().rev() {
            self.nodes[id.0] = None;
        }
    }

    /// Number of live nodes in the arena
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Whether `id` refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id.0), Some(Some(_)))
    }

    pub fn token(&self, id: NodeId) -> &str {
        &self.node(id).token
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.node(id).children.len()
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        self.child_count(id) > 0
    }

    /// Children of `id` in insertion order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.last().copied()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id);
        let parent = node.parent?;
        self.node(parent).children.get(node.slot + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id);
        let parent = node.parent?;
        let slot = node.slot.checked_sub(1)?;
        self.node(parent).children.get(slot).copied()
    }

    /// Child at `index`; negative indices count from the end (`-1` is the last child)
    ///
    /// # Panics
    ///
    /// Panics unless `-child_count <= index < child_count`.
    pub fn child(&self, id: NodeId, index: isize) -> NodeId {
        let children = &self.node(id).children;
        let count = children.len() as isize;
        assert!(
            (-count..count).contains(&index),
            "child index {} out of range for node {} with {} children",
            index,
            id,
            count
        );
        let position = if index < 0 { count + index } else { index };
        children[position as usize]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        self.node(id).parent.is_none()
    }

    /// Topmost ancestor of `id` (itself when it is a root)
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    fn node(&self, id: NodeId) -> &Node {
        match self.nodes.get(id.0) {
            Some(Some(node)) => node,
            _ => panic!("node {} does not exist", id),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(id.0) {
            Some(Some(node)) => node,
            _ => panic!("node {} does not exist", id),
        }
    }
}

/// A parsed expression: an arena together with the id of its root node
#[derive(Debug, Clone)]
pub struct Expression {
    tree: ExprTree,
    root: NodeId,
}

impl Expression {
    /// Wraps a finished tree
    ///
    /// # Panics
    ///
    /// Panics if `root` is not a root node of `tree`.
    pub fn new(tree: ExprTree, root: NodeId) -> Self {
        assert!(tree.is_root(root), "expression root {} has a parent", root);
        Expression { tree, root }
    }

    pub fn tree(&self) -> &ExprTree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Token of the root node
    pub fn token(&self) -> &str {
        self.tree.token(self.root)
    }

    /// Whether the root node is an `=` operator
    pub fn is_assignment(&self) -> bool {
        self.token() == ASSIGN_TOKEN
    }

    /// Whether this is the childless `<>` session terminator
    pub fn is_end_command(&self) -> bool {
        !self.tree.has_children(self.root) && self.token() == END_COMMAND
    }

    /// Name bound by a top-level assignment, if this is one
    pub fn assignment_target(&self) -> Option<&str> {
        if !self.is_assignment() || self.tree.child_count(self.root) != 2 {
            return None;
        }
        let target = self.tree.first_child(self.root)?;
        Some(self.tree.token(target))
    }

    /// Releases the arena
    pub fn into_tree(self) -> ExprTree {
        self.tree
    }
}

impl PartialEq for Expression {
    /// Structural equality: same tokens in the same shape
    fn eq(&self, other: &Self) -> bool {
        fn same(a: &ExprTree, x: NodeId, b: &ExprTree, y: NodeId) -> bool {
            a.token(x) == b.token(y)
                && a.child_count(x) == b.child_count(y)
                && a.children(x)
                    .iter()
                    .zip(b.children(y))
                    .all(|(&cx, &cy)| same(a, cx, b, cy))
        }
        same(self.tree(), self.root(), other.tree(), other.root())
    }
}
