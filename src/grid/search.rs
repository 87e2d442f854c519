//! Best-first path search over the grid's adjacency.
//!
//! The frontier is a plain Vec kept sorted so the path with the lowest
//! estimate sits at the end; a binary heap would be faster but would leave
//! completion order under float ties to insertion order, whereas here ties
//! are resolved through the caller's candidate hook.

use std::collections::HashMap;

use super::engine::Grid;
use super::node::{GridNode, NodeId};

/// A candidate route under construction or completed by the search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPath {
    /// Visited node ids, in order from start.
    pub nodes: Vec<NodeId>,
    /// Accumulated segment cost.
    pub weight: f32,
    /// Weight plus the heuristic estimate to the goal.
    pub estimate: f32,
}

impl SearchPath {
    fn start(node: NodeId, weight: f32, estimate: f32) -> Self {
        Self {
            nodes: vec![node],
            weight,
            estimate,
        }
    }

    /// Extend into a new path; the node list is cloned so frontier branches
    /// never share mutable state.
    fn branch(&self, node: NodeId, weight: f32, estimate: f32) -> Self {
        let mut nodes = self.nodes.clone();
        nodes.push(node);
        Self {
            nodes,
            weight,
            estimate,
        }
    }

    /// The path's final node, if any.
    pub fn last(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }
}

fn euclidean(a: &GridNode, b: &GridNode) -> f32 {
    a.distance_to(b)
}

impl Grid {
    /// Find the cheapest path between two nodes under Euclidean segment cost
    /// and heuristic, or None when the goal is unreachable.
    pub fn find_path(&self, start: NodeId, goal: NodeId) -> Option<SearchPath> {
        self.find_path_with(start, goal, euclidean, euclidean, |existing, _new| existing)
    }

    /// Find the cheapest path under caller-supplied costs.
    ///
    /// `cost` prices a traversed segment and `heuristic` estimates the
    /// remaining cost to the goal; the result is only guaranteed optimal when
    /// the heuristic never overestimates. `prefer` arbitrates between an
    /// existing completed candidate and a newly completed one and returns the
    /// candidate to keep (the default search keeps the existing one).
    ///
    /// The search keeps exploring until no frontier path could still beat the
    /// best completed candidate, so every equal-weight completion passes
    /// through `prefer` rather than being cut off by the first arrival.
    pub fn find_path_with<C, H, P>(
        &self,
        start: NodeId,
        goal: NodeId,
        cost: C,
        heuristic: H,
        prefer: P,
    ) -> Option<SearchPath>
    where
        C: Fn(&GridNode, &GridNode) -> f32,
        H: Fn(&GridNode, &GridNode) -> f32,
        P: Fn(SearchPath, SearchPath) -> SearchPath,
    {
        let start_node = self.get_node(start)?;
        let goal_node = self.get_node(goal)?;

        let start_weight = cost(start_node, start_node);
        let start_estimate = start_weight + heuristic(start_node, goal_node);

        let mut best_weight: HashMap<NodeId, f32> = HashMap::new();
        best_weight.insert(start, start_weight);

        let mut done: Option<SearchPath> = None;
        let mut frontier = vec![SearchPath::start(start, start_weight, start_estimate)];

        while let Some(path) = frontier.pop() {
            let Some(last) = path.last() else {
                continue;
            };
            let Some(last_node) = self.get_node(last) else {
                continue;
            };

            for next in self.neighbors(last) {
                // Cycle avoidance is per-path; other frontier paths may still
                // visit this node
                if path.nodes.contains(&next) {
                    continue;
                }
                let Some(next_node) = self.get_node(next) else {
                    continue;
                };

                let branch_weight = path.weight + cost(last_node, next_node);
                if let Some(&known) = best_weight.get(&next) {
                    if branch_weight > known {
                        continue;
                    }
                }
                best_weight.insert(next, branch_weight);

                let branch_estimate = if next == goal {
                    branch_weight
                } else {
                    branch_weight + heuristic(next_node, goal_node)
                };
                if let Some(best) = &done {
                    if branch_estimate > best.weight {
                        continue;
                    }
                }

                let branch = path.branch(next, branch_weight, branch_estimate);
                if next == goal {
                    done = Some(match done.take() {
                        Some(existing) => prefer(existing, branch),
                        None => branch,
                    });
                } else {
                    frontier.push(branch);
                }
            }

            // Lowest estimate last, so pop() takes the most promising path
            frontier.sort_by(|a, b| b.estimate.total_cmp(&a.estimate));
        }

        done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two routes from a to d: a-b-d (length 200) and a-c-d (longer detour).
    fn diamond() -> (Grid, [NodeId; 4]) {
        let mut grid = Grid::new();
        let a = grid.add_node(0.0, 0.0);
        let b = grid.add_node(100.0, 0.0);
        let c = grid.add_node(50.0, 200.0);
        let d = grid.add_node(200.0, 0.0);
        grid.join_nodes(&[a, b]);
        grid.join_nodes(&[b, d]);
        grid.join_nodes(&[a, c]);
        grid.join_nodes(&[c, d]);
        (grid, [a, b, c, d])
    }

    #[test]
    fn test_find_path_picks_cheapest() {
        let (grid, [a, b, _c, d]) = diamond();

        let path = grid.find_path(a, d).unwrap();
        assert_eq!(path.nodes, vec![a, b, d]);
        assert_eq!(path.weight, 200.0);
    }

    #[test]
    fn test_path_weight_is_segment_sum() {
        let (grid, [a, _b, _c, d]) = diamond();

        let path = grid.find_path(a, d).unwrap();
        let mut total = 0.0;
        for pair in path.nodes.windows(2) {
            total += grid
                .get_node(pair[0])
                .unwrap()
                .distance_to(grid.get_node(pair[1]).unwrap());
        }
        assert_eq!(path.weight, total);
        assert_eq!(path.last(), Some(d));
        assert_eq!(path.nodes.first(), Some(&a));
    }

    #[test]
    fn test_unreachable_goal_is_none() {
        let mut grid = Grid::new();
        let a = grid.add_node(0.0, 0.0);
        let b = grid.add_node(10.0, 0.0);
        let island = grid.add_node(500.0, 500.0);
        grid.join_nodes(&[a, b]);

        assert_eq!(grid.find_path(a, island), None);
        assert_eq!(grid.find_path(a, NodeId(99)), None);
    }

    #[test]
    fn test_custom_segment_cost_reroutes() {
        let (grid, [a, b, c, d]) = diamond();

        // Penalize any segment touching b, forcing the detour through c
        let path = grid
            .find_path_with(
                a,
                d,
                |x, y| {
                    if x.id == b || y.id == b {
                        10_000.0
                    } else {
                        x.distance_to(y)
                    }
                },
                |x, y| x.distance_to(y),
                |existing, _new| existing,
            )
            .unwrap();
        assert_eq!(path.nodes, vec![a, c, d]);
    }

    #[test]
    fn test_tie_break_hook_sees_equal_completions() {
        // Two mirror-image routes of identical length
        let mut grid = Grid::new();
        let a = grid.add_node(0.0, 0.0);
        let up = grid.add_node(50.0, -50.0);
        let down = grid.add_node(50.0, 50.0);
        let d = grid.add_node(100.0, 0.0);
        grid.join_nodes(&[a, up]);
        grid.join_nodes(&[up, d]);
        grid.join_nodes(&[a, down]);
        grid.join_nodes(&[down, d]);

        // Prefer the route passing through `down`, whichever completes first
        let path = grid
            .find_path_with(
                a,
                d,
                euclidean,
                euclidean,
                |existing, new| {
                    if new.nodes.contains(&down) {
                        new
                    } else {
                        existing
                    }
                },
            )
            .unwrap();
        assert_eq!(path.nodes, vec![a, down, d]);
    }

    #[test]
    fn test_longer_chain() {
        let mut grid = Grid::new();
        let ids: Vec<NodeId> = (0..6).map(|i| grid.add_node(i as f32 * 10.0, 0.0)).collect();
        for pair in ids.windows(2) {
            grid.join_nodes(pair);
        }

        let path = grid.find_path(ids[0], ids[5]).unwrap();
        assert_eq!(path.nodes, ids);
        assert_eq!(path.weight, 50.0);
    }
}
