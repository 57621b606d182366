//! Static dependency-graph analysis: trees, cycle search, renderers.
//!
//! Everything here is a pure traversal over the frozen registry. Nothing is
//! constructed, and ordering follows traversal/insertion order exactly, with
//! no sorting or deduplication.

use std::collections::HashSet;
use std::fmt::Write as _;

use crate::registry::RegistrySnapshot;
use crate::token::Token;

/// How a node in a dependency tree was classified during expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeNodeStatus {
    /// The token has at least one registration and its dependencies follow.
    Registered,
    /// The token already appeared earlier on the active expansion path;
    /// descent stops here.
    Circular,
    /// The token has no registration; the node is a leaf.
    NotRegistered,
}

/// One node of an expanded dependency tree.
#[derive(Debug, Clone)]
pub struct DependencyTreeNode {
    /// Token this node stands for.
    pub token: Token,
    /// Classification of the node.
    pub status: TreeNodeStatus,
    /// Distance from the tree root.
    pub depth: usize,
    /// Child nodes: the declared dependencies of every descriptor registered
    /// under this token, in registration then declaration order.
    pub children: Vec<DependencyTreeNode>,
    /// For circular nodes, the full expansion path including the repeated
    /// token.
    pub cycle_path: Option<Vec<Token>>,
}

/// Recursively expands dependency edges from the given root.
///
/// Termination needs no artificial depth limit: a token reappearing on the
/// active expansion path stops descending.
pub(crate) fn dependency_tree(registry: &RegistrySnapshot, token: Token) -> DependencyTreeNode {
    let mut path = Vec::new();
    expand(registry, token, 0, &mut path)
}

fn expand(
    registry: &RegistrySnapshot,
    token: Token,
    depth: usize,
    path: &mut Vec<Token>,
) -> DependencyTreeNode {
    if path.contains(&token) {
        let mut cycle_path = path.clone();
        cycle_path.push(token);
        return DependencyTreeNode {
            token,
            status: TreeNodeStatus::Circular,
            depth,
            children: Vec::new(),
            cycle_path: Some(cycle_path),
        };
    }
    let descriptors = registry.all(token);
    if descriptors.is_empty() {
        return DependencyTreeNode {
            token,
            status: TreeNodeStatus::NotRegistered,
            depth,
            children: Vec::new(),
            cycle_path: None,
        };
    }
    path.push(token);
    let mut children = Vec::new();
    for descriptor in descriptors {
        for dep in descriptor.dependencies() {
            children.push(expand(registry, *dep, depth + 1, path));
        }
    }
    path.pop();
    DependencyTreeNode {
        token,
        status: TreeNodeStatus::Registered,
        depth,
        children,
        cycle_path: None,
    }
}

/// Whole-registry depth-first cycle search.
///
/// Iterates over every registered token, not only ones reachable from a chosen
/// root, so disconnected cycles are all found. A cycle is recorded as the path
/// slice from the repeated token's first occurrence through the repeat.
pub(crate) fn circular_dependencies(registry: &RegistrySnapshot) -> Vec<Vec<Token>> {
    let mut visited = HashSet::new();
    let mut cycles = Vec::new();
    for &token in &registry.token_order {
        if !visited.contains(&token) {
            let mut path = Vec::new();
            visit(registry, token, &mut path, &mut visited, &mut cycles);
        }
    }
    cycles
}

fn visit(
    registry: &RegistrySnapshot,
    token: Token,
    path: &mut Vec<Token>,
    visited: &mut HashSet<Token>,
    cycles: &mut Vec<Vec<Token>>,
) {
    path.push(token);
    for descriptor in registry.all(token) {
        for &dep in descriptor.dependencies() {
            if let Some(position) = path.iter().position(|t| *t == dep) {
                let mut cycle = path[position..].to_vec();
                cycle.push(dep);
                cycles.push(cycle);
            } else if !visited.contains(&dep) && registry.contains(dep) {
                visit(registry, dep, path, visited, cycles);
            }
        }
    }
    path.pop();
    visited.insert(token);
}

/// Renders a dependency tree, one node per line, indented by depth.
///
/// # Examples
///
/// ```rust
/// use anvil_di::{render_tree, Lifetime, ServiceCollection, Token};
///
/// struct App;
///
/// let mut services = ServiceCollection::new();
/// services.register_implementation::<App, _>(
///     Lifetime::Singleton,
///     vec![Token::named("missing")],
///     |_| Ok(App),
/// );
///
/// let provider = services.build();
/// let rendered = render_tree(&provider.get_dependency_tree(Token::of::<App>()));
/// assert!(rendered.contains("missing (not registered)"));
/// ```
pub fn render_tree(node: &DependencyTreeNode) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

fn write_node(out: &mut String, node: &DependencyTreeNode) {
    for _ in 0..node.depth {
        out.push_str("  ");
    }
    out.push_str(node.token.display_name());
    match node.status {
        TreeNodeStatus::Registered => {}
        TreeNodeStatus::NotRegistered => out.push_str(" (not registered)"),
        TreeNodeStatus::Circular => {
            out.push_str(" (circular");
            if let Some(cycle_path) = &node.cycle_path {
                out.push_str(": ");
                write_path(out, cycle_path);
            }
            out.push(')');
        }
    }
    out.push('\n');
    for child in &node.children {
        write_node(out, child);
    }
}

/// Renders a cycle list, one cycle per line.
pub fn render_cycles(cycles: &[Vec<Token>]) -> String {
    if cycles.is_empty() {
        return "no circular dependencies\n".to_string();
    }
    let mut out = String::new();
    for cycle in cycles {
        write_path(&mut out, cycle);
        out.push('\n');
    }
    out
}

fn write_path(out: &mut String, path: &[Token]) {
    for (index, token) in path.iter().enumerate() {
        if index > 0 {
            out.push_str(" -> ");
        }
        let _ = write!(out, "{token}");
    }
}
