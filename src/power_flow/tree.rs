use std::collections::HashMap;

use super::{CalcResult, EngineError};
use crate::domain::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// Validated radial topology over the input node list.
///
/// Arena index `i` is the position of the node in the input slice, so any per-node vector
/// built against the same slice lines up with the tree.
#[derive(Debug, Clone)]
pub struct NetworkTree {
    parent: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    root: usize,
    /// Nodes reachable from the root, parents before children
    preorder: Vec<usize>,
    reachable: Vec<bool>,
    /// Nodes whose declared parent does not exist
    orphans: Vec<usize>,
}

impl NetworkTree {
    /// Build the tree rooted at `root_id`.
    ///
    /// Fails on a missing root, a duplicate id or any parent cycle. Nodes whose parent is
    /// unknown are recorded as orphans; they and their descendants stay out of the tree.
    pub fn build(nodes: &[Node], root_id: &str) -> CalcResult<Self> {
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.id.as_str(), i).is_some() {
                return Err(EngineError::DuplicateNode { node_id: node.id.clone() });
            }
        }

        let root = *index.get(root_id).ok_or_else(|| EngineError::MissingRoot {
            root_id: root_id.to_string(),
        })?;

        let mut parent = vec![None; nodes.len()];
        let mut children = vec![Vec::new(); nodes.len()];
        let mut orphans = Vec::new();

        for (i, node) in nodes.iter().enumerate() {
            if i == root {
                continue;
            }
            match index.get(node.parent_id.as_str()) {
                Some(&p) => {
                    parent[i] = Some(p);
                    children[p].push(i);
                }
                None => orphans.push(i),
            }
        }

        detect_cycles(nodes, &parent)?;

        let mut preorder = Vec::with_capacity(nodes.len());
        let mut reachable = vec![false; nodes.len()];
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            reachable[i] = true;
            preorder.push(i);
            stack.extend(children[i].iter().rev());
        }

        Ok(Self {
            parent,
            children,
            root,
            preorder,
            reachable,
            orphans,
        })
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    pub fn parent(&self, i: usize) -> Option<usize> {
        self.parent[i]
    }

    pub fn children(&self, i: usize) -> &[usize] {
        &self.children[i]
    }

    /// Reachable nodes, every parent ahead of its children
    pub fn preorder(&self) -> &[usize] {
        &self.preorder
    }

    /// Reachable nodes, every child ahead of its parent
    pub fn postorder(&self) -> impl Iterator<Item = usize> + '_ {
        self.preorder.iter().rev().copied()
    }

    pub fn is_reachable(&self, i: usize) -> bool {
        self.reachable[i]
    }

    pub fn orphans(&self) -> &[usize] {
        &self.orphans
    }
}

/// Walk every parent chain once, marking nodes on the current path.
fn detect_cycles(nodes: &[Node], parent: &[Option<usize>]) -> CalcResult<()> {
    let mut marks = vec![Mark::Unvisited; parent.len()];
    let mut path = Vec::new();

    for start in 0..parent.len() {
        let mut cursor = Some(start);
        while let Some(i) = cursor {
            match marks[i] {
                Mark::Done => break,
                Mark::OnPath => {
                    return Err(EngineError::CyclicTopology { node_id: nodes[i].id.clone() });
                }
                Mark::Unvisited => {
                    marks[i] = Mark::OnPath;
                    path.push(i);
                    cursor = parent[i];
                }
            }
        }
        for i in path.drain(..) {
            marks[i] = Mark::Done;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids<'a>(nodes: &'a [Node], order: impl IntoIterator<Item = usize>) -> Vec<&'a str> {
        order.into_iter().map(|i| nodes[i].id.as_str()).collect()
    }

    #[test]
    fn test_preorder_follows_input_order() {
        let nodes = vec![
            Node::new("P2", "P1"),
            Node::new("TRAFO", ""),
            Node::new("P1", "TRAFO"),
            Node::new("P3", "TRAFO"),
            Node::new("P4", "P1"),
        ];
        let tree = NetworkTree::build(&nodes, "TRAFO").unwrap();

        assert_eq!(tree.root(), 1);
        assert_eq!(ids(&nodes, tree.preorder().iter().copied()), ["TRAFO", "P1", "P2", "P4", "P3"]);
        assert_eq!(ids(&nodes, tree.postorder()), ["P3", "P4", "P2", "P1", "TRAFO"]);
        assert_eq!(tree.parent(0), Some(2));
        assert!(tree.orphans().is_empty());
    }

    #[test]
    fn test_missing_root() {
        let nodes = vec![Node::new("P1", "P0")];
        let err = NetworkTree::build(&nodes, "TRAFO").unwrap_err();
        assert_eq!(err, EngineError::MissingRoot { root_id: "TRAFO".into() });
    }

    #[test]
    fn test_empty_list_has_no_root() {
        assert!(matches!(
            NetworkTree::build(&[], "TRAFO"),
            Err(EngineError::MissingRoot { .. })
        ));
    }

    #[test]
    fn test_two_node_cycle_detected() {
        let nodes = vec![
            Node::new("TRAFO", ""),
            Node::new("A", "B"),
            Node::new("B", "A"),
        ];
        let err = NetworkTree::build(&nodes, "TRAFO").unwrap_err();
        assert!(matches!(err, EngineError::CyclicTopology { .. }));
    }

    #[test]
    fn test_self_parent_is_a_cycle() {
        let nodes = vec![Node::new("TRAFO", ""), Node::new("A", "A")];
        let err = NetworkTree::build(&nodes, "TRAFO").unwrap_err();
        assert_eq!(err, EngineError::CyclicTopology { node_id: "A".into() });
    }

    #[test]
    fn test_cycle_hanging_off_the_tree() {
        // C -> B -> A -> B, reached through C's chain
        let nodes = vec![
            Node::new("TRAFO", ""),
            Node::new("C", "B"),
            Node::new("A", "B"),
            Node::new("B", "A"),
        ];
        assert!(matches!(
            NetworkTree::build(&nodes, "TRAFO"),
            Err(EngineError::CyclicTopology { .. })
        ));
    }

    #[test]
    fn test_orphan_subtree_is_unreachable() {
        let nodes = vec![
            Node::new("TRAFO", ""),
            Node::new("P1", "TRAFO"),
            Node::new("X1", "GHOST"),
            Node::new("X2", "X1"),
        ];
        let tree = NetworkTree::build(&nodes, "TRAFO").unwrap();

        assert_eq!(tree.orphans(), &[2]);
        assert!(tree.is_reachable(1));
        assert!(!tree.is_reachable(2));
        assert!(!tree.is_reachable(3));
        assert_eq!(tree.preorder().len(), 2);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let nodes = vec![
            Node::new("TRAFO", ""),
            Node::new("P1", "TRAFO"),
            Node::new("P1", "TRAFO"),
        ];
        assert_eq!(
            NetworkTree::build(&nodes, "TRAFO").unwrap_err(),
            EngineError::DuplicateNode { node_id: "P1".into() }
        );
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let mut nodes = vec![Node::new("TRAFO", "")];
        for i in 0..50_000 {
            let parent = if i == 0 { "TRAFO".to_string() } else { format!("N{}", i - 1) };
            nodes.push(Node::new(format!("N{i}"), parent));
        }
        let tree = NetworkTree::build(&nodes, "TRAFO").unwrap();
        assert_eq!(tree.preorder().len(), 50_001);
    }
}
