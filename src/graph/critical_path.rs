//! Critical path analysis.
//!
//! The critical path is the root-to-leaf path whose node durations sum
//! to the largest total. It is the latency bottleneck of a workflow.
//!
//! Traversal runs over an index arena with an explicit stack, so a
//! malformed trace containing cycles cannot recurse without bound.

use super::model::{Node, OrchestrationGraph};
use log::debug;

/// Longest-duration path through a graph
#[derive(Debug, Clone)]
pub struct CriticalPath<'a> {
    /// Nodes from root to leaf
    pub nodes: Vec<&'a Node>,

    /// Sum of node durations along the path (untimed nodes count as 0)
    pub total_duration_ms: f64,
}

impl<'a> CriticalPath<'a> {
    fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            total_duration_ms: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Node ids along the path
    pub fn ids(&self) -> Vec<&'a str> {
        self.nodes.iter().copied().map(|n| n.id.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    OnPath,
    /// Finished without meeting a node on the path above it
    Done,
}

/// Best continuation below a node
enum Branch {
    /// Memoized node; unwind its chain through `next_hop`
    Memo(usize),
    /// Path computed for the current ancestry only
    Fresh(Vec<usize>),
}

impl Branch {
    fn head(&self) -> Option<usize> {
        match self {
            Branch::Memo(position) => Some(*position),
            Branch::Fresh(path) => path.first().copied(),
        }
    }
}

/// One node being explored on the explicit stack
struct Frame {
    node: usize,
    cursor: usize,
    best: Option<(f64, Branch)>,
    /// Some node below this one was cut short by the current path
    tainted: bool,
}

impl Frame {
    fn new(node: usize) -> Self {
        Self {
            node,
            cursor: 0,
            best: None,
            tainted: false,
        }
    }

    fn offer(&mut self, total: f64, branch: Branch) {
        if self.best.as_ref().map_or(true, |(best_total, _)| total > *best_total) {
            self.best = Some((total, branch));
        }
    }
}

/// Arena state shared by the walks from every root
struct Walker<'g> {
    nodes: &'g [Node],
    children: Vec<Vec<usize>>,
    state: Vec<Visit>,
    downstream: Vec<f64>,
    next_hop: Vec<Option<usize>>,
}

impl<'g> Walker<'g> {
    fn new(graph: &'g OrchestrationGraph) -> Self {
        let nodes = graph.nodes();
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        for edge in graph.edges() {
            if let (Some(source), Some(target)) = (
                graph.node_index(&edge.source_id),
                graph.node_index(&edge.target_id),
            ) {
                children[source].push(target);
            }
        }

        Self {
            nodes,
            children,
            state: vec![Visit::New; nodes.len()],
            downstream: vec![0.0; nodes.len()],
            next_hop: vec![None; nodes.len()],
        }
    }

    /// Longest path starting at `root`, as (total, node positions)
    ///
    /// A child already on the current path is a dead end. A node whose
    /// subtree never met such a child is memoized; any other node is
    /// recomputed for each path that reaches it, since its result
    /// depends on which ancestors are on that path.
    fn longest_from(&mut self, root: usize) -> (f64, Vec<usize>) {
        let mut stack = vec![Frame::new(root)];
        self.state[root] = Visit::OnPath;
        let mut finished: Option<(f64, Branch, bool)> = None;

        loop {
            let Some(frame) = stack.last_mut() else {
                break;
            };

            if let Some((total, branch, tainted)) = finished.take() {
                frame.tainted |= tainted;
                frame.offer(total, branch);
                continue;
            }

            if let Some(&child) = self.children[frame.node].get(frame.cursor) {
                frame.cursor += 1;
                match self.state[child] {
                    Visit::OnPath => frame.tainted = true,
                    Visit::Done => frame.offer(self.downstream[child], Branch::Memo(child)),
                    Visit::New => {
                        self.state[child] = Visit::OnPath;
                        stack.push(Frame::new(child));
                    }
                }
                continue;
            }

            let Some(frame) = stack.pop() else {
                break;
            };
            let own = self.nodes[frame.node].duration_ms().unwrap_or(0.0);
            let total = own + frame.best.as_ref().map_or(0.0, |(below, _)| *below);

            if frame.tainted {
                self.state[frame.node] = Visit::New;
                let mut path = vec![frame.node];
                if let Some((_, branch)) = frame.best {
                    path.extend(self.unwind(branch));
                }
                finished = Some((total, Branch::Fresh(path), true));
            } else {
                self.state[frame.node] = Visit::Done;
                self.downstream[frame.node] = total;
                self.next_hop[frame.node] = frame.best.and_then(|(_, branch)| branch.head());
                finished = Some((total, Branch::Memo(frame.node), false));
            }
        }

        match finished {
            Some((total, branch, _)) => (total, self.unwind(branch)),
            None => (0.0, Vec::new()),
        }
    }

    fn unwind(&self, branch: Branch) -> Vec<usize> {
        match branch {
            Branch::Fresh(path) => path,
            Branch::Memo(start) => {
                let mut path = Vec::new();
                let mut cursor = Some(start);
                while let Some(position) = cursor {
                    path.push(position);
                    cursor = self.next_hop[position];
                }
                path
            }
        }
    }
}

/// Find the root-to-leaf path with the greatest summed duration
///
/// **Public** - main entry point for critical path analysis
///
/// # Algorithm
/// 1. Index the graph: node position -> child positions, in edge order
/// 2. Depth-first walk from every root with an explicit stack
/// 3. On leaving a node, keep the child branch with the largest
///    downstream total (first child wins ties)
/// 4. Keep the best root (first root wins ties)
///
/// A child already on the current path closes a cycle; it is treated
/// as a dead end for that path only. Acyclic subtrees are memoized, so
/// a DAG is walked in O(V+E); nodes that sit on a cycle are re-walked
/// for each distinct path into them.
///
/// # Returns
/// Empty path for an empty graph or a graph without roots
pub fn find_critical_path(graph: &OrchestrationGraph) -> CriticalPath<'_> {
    let nodes = graph.nodes();
    if nodes.is_empty() {
        return CriticalPath::empty();
    }

    let roots: Vec<usize> = graph
        .root_nodes()
        .iter()
        .filter_map(|n| graph.node_index(&n.id))
        .collect();

    let mut walker = Walker::new(graph);
    let mut best: Option<(f64, Vec<usize>)> = None;
    for root in roots {
        let (total, path) = walker.longest_from(root);
        if best.as_ref().map_or(true, |(best_total, _)| total > *best_total) {
            best = Some((total, path));
        }
    }

    let Some((total, path)) = best else {
        debug!("Graph has {} nodes but no roots; no critical path", nodes.len());
        return CriticalPath::empty();
    };

    debug!("Critical path: {} nodes, {:.2}ms", path.len(), total);

    CriticalPath {
        nodes: path.into_iter().map(|position| &nodes[position]).collect(),
        total_duration_ms: total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::{Edge, NodeType};

    fn add_timed(graph: &mut OrchestrationGraph, id: &str, ms: f64) {
        graph.add_node(
            Node::new(id, id, NodeType::Agent).with_times(Some(0.0), Some(ms / 1000.0)),
        );
    }

    #[test]
    fn test_picks_longest_branch() {
        let mut graph = OrchestrationGraph::default();
        add_timed(&mut graph, "A", 10.0);
        add_timed(&mut graph, "B", 20.0);
        add_timed(&mut graph, "C", 30.0);
        add_timed(&mut graph, "D", 5.0);
        graph.add_edge(Edge::new("A", "B"));
        graph.add_edge(Edge::new("B", "C"));
        graph.add_edge(Edge::new("A", "D"));

        let path = find_critical_path(&graph);
        assert_eq!(path.ids(), vec!["A", "B", "C"]);
        assert!((path.total_duration_ms - 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_graph() {
        let graph = OrchestrationGraph::default();
        assert!(find_critical_path(&graph).is_empty());
    }

    #[test]
    fn test_single_untimed_node_is_its_own_path() {
        let mut graph = OrchestrationGraph::default();
        graph.add_node(Node::new("solo", "solo", NodeType::Tool));

        let path = find_critical_path(&graph);
        assert_eq!(path.ids(), vec!["solo"]);
        assert_eq!(path.total_duration_ms, 0.0);
    }

    #[test]
    fn test_ties_prefer_first_child_and_root() {
        let mut graph = OrchestrationGraph::default();
        add_timed(&mut graph, "r1", 5.0);
        add_timed(&mut graph, "x", 5.0);
        add_timed(&mut graph, "y", 5.0);
        add_timed(&mut graph, "r2", 10.0);
        graph.add_edge(Edge::new("r1", "x"));
        graph.add_edge(Edge::new("r1", "y"));

        let path = find_critical_path(&graph);
        assert_eq!(path.ids(), vec!["r1", "x"]);
    }

    #[test]
    fn test_untimed_children_still_reach_a_leaf() {
        let mut graph = OrchestrationGraph::default();
        add_timed(&mut graph, "root", 10.0);
        graph.add_node(Node::new("leaf", "leaf", NodeType::Output));
        graph.add_edge(Edge::new("root", "leaf"));

        assert_eq!(find_critical_path(&graph).ids(), vec!["root", "leaf"]);
    }

    #[test]
    fn test_cycle_below_root_terminates() {
        let mut graph = OrchestrationGraph::default();
        add_timed(&mut graph, "root", 1.0);
        add_timed(&mut graph, "a", 2.0);
        add_timed(&mut graph, "b", 3.0);
        graph.add_edge(Edge::new("root", "a"));
        graph.add_edge(Edge::new("a", "b"));
        graph.add_edge(Edge::new("b", "a"));

        let path = find_critical_path(&graph);
        assert_eq!(path.ids(), vec!["root", "a", "b"]);
        assert!((path.total_duration_ms - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_cycle_cut_depends_on_the_path_taken() {
        // b is first reached below a, where a is on the path and b's
        // only child is cut; reached from the root, b can continue into a
        let mut graph = OrchestrationGraph::default();
        add_timed(&mut graph, "root", 0.0);
        add_timed(&mut graph, "x", 0.0);
        add_timed(&mut graph, "b", 5.0);
        add_timed(&mut graph, "a", 1.0);
        add_timed(&mut graph, "big", 1000.0);
        graph.add_edge(Edge::new("root", "x"));
        graph.add_edge(Edge::new("root", "b"));
        graph.add_edge(Edge::new("x", "a"));
        graph.add_edge(Edge::new("a", "b"));
        graph.add_edge(Edge::new("b", "a"));
        graph.add_edge(Edge::new("a", "big"));

        let path = find_critical_path(&graph);
        assert_eq!(path.ids(), vec!["root", "b", "a", "big"]);
        assert!((path.total_duration_ms - 1006.0).abs() < 1e-6);
    }

    #[test]
    fn test_repeated_walks_agree() {
        let mut graph = OrchestrationGraph::default();
        add_timed(&mut graph, "r1", 1.0);
        add_timed(&mut graph, "r2", 1.0);
        add_timed(&mut graph, "a", 2.0);
        add_timed(&mut graph, "b", 3.0);
        graph.add_edge(Edge::new("r1", "a"));
        graph.add_edge(Edge::new("r2", "b"));
        graph.add_edge(Edge::new("a", "b"));
        graph.add_edge(Edge::new("b", "a"));

        // From r1: r1, a, b = 6; from r2: r2, b, a = 6; first root wins
        let path = find_critical_path(&graph);
        assert_eq!(path.ids(), vec!["r1", "a", "b"]);
        assert!((path.total_duration_ms - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_pure_cycle_has_no_roots() {
        let mut graph = OrchestrationGraph::default();
        add_timed(&mut graph, "a", 1.0);
        add_timed(&mut graph, "b", 1.0);
        graph.add_edge(Edge::new("a", "b"));
        graph.add_edge(Edge::new("b", "a"));

        assert!(find_critical_path(&graph).is_empty());
    }

    #[test]
    fn test_shared_subtree_is_reused() {
        // Diamond: both branches end at the same slow node
        let mut graph = OrchestrationGraph::default();
        add_timed(&mut graph, "top", 1.0);
        add_timed(&mut graph, "left", 2.0);
        add_timed(&mut graph, "right", 4.0);
        add_timed(&mut graph, "bottom", 100.0);
        graph.add_edge(Edge::new("top", "left"));
        graph.add_edge(Edge::new("top", "right"));
        graph.add_edge(Edge::new("left", "bottom"));
        graph.add_edge(Edge::new("right", "bottom"));

        let path = find_critical_path(&graph);
        assert_eq!(path.ids(), vec!["top", "right", "bottom"]);
        assert!((path.total_duration_ms - 105.0).abs() < 1e-6);
    }
}
