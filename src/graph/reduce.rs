//! Transitive reduction, cycle detection and rank layering.

use super::{Graph, GraphError, NodeId};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    Active,
    Done,
}

impl Graph<'_> {
    /// Find a cycle, returned as the node path `a -> … -> a`.
    pub fn find_cycle(&self) -> Option<Vec<NodeId>> {
        let mut state = vec![Visit::New; self.nodes.len()];
        let mut stack = Vec::new();

        for ix in 0..self.nodes.len() {
            if state[ix] == Visit::New
                && let Some(cycle) = self.cycle_dfs(NodeId(ix as u32), &mut state, &mut stack)
            {
                return Some(cycle);
            }
        }
        None
    }

    fn cycle_dfs(
        &self,
        id: NodeId,
        state: &mut [Visit],
        stack: &mut Vec<NodeId>,
    ) -> Option<Vec<NodeId>> {
        state[id.index()] = Visit::Active;
        stack.push(id);

        for edge in &self.get(id).edges {
            match state[edge.to.index()] {
                Visit::Active => {
                    // Back edge, the cycle is the stack suffix starting at `to`
                    let start = stack.iter().position(|&n| n == edge.to).unwrap_or(0);
                    let mut cycle = stack[start..].to_vec();
                    cycle.push(edge.to);
                    return Some(cycle);
                }
                Visit::New => {
                    if let Some(cycle) = self.cycle_dfs(edge.to, state, stack) {
                        return Some(cycle);
                    }
                }
                Visit::Done => {}
            }
        }

        stack.pop();
        state[id.index()] = Visit::Done;
        None
    }

    fn ensure_acyclic(&self) -> Result<(), GraphError> {
        match self.find_cycle() {
            Some(cycle) => Err(GraphError::Cycle(
                cycle.iter().map(|&id| self.get(id).name.to_string()).collect(),
            )),
            None => Ok(()),
        }
    }

    /// Mark every edge implied by a longer path as transitive.
    ///
    /// Returns the number of transitive edges. Fails on cyclic input.
    pub fn transitive_reduce(&mut self) -> Result<usize, GraphError> {
        self.ensure_acyclic()?;

        for ix in 0..self.nodes.len() {
            let src = NodeId(ix as u32);
            let mut seen = vec![false; self.nodes.len()];

            // Edges of `src` get flagged while we walk them
            for e in 0..self.get(src).edges.len() {
                let edge = self.get(src).edges[e];
                if !edge.transitive {
                    self.mark_reachable(src, edge.to, &mut seen);
                }
            }
        }

        Ok(self.transitive_count())
    }

    /// Flag edges `src -> d` for every `d` reachable from `node`.
    fn mark_reachable(&mut self, src: NodeId, node: NodeId, seen: &mut [bool]) {
        if seen[node.index()] {
            return;
        }
        seen[node.index()] = true;

        for e in 0..self.get(node).edges.len() {
            let edge = self.get(node).edges[e];
            self.unlink(src, edge.to);
            if !edge.transitive {
                self.mark_reachable(src, edge.to, seen);
            }
        }
    }

    /// Mark all edges `src -> dst` as transitive.
    fn unlink(&mut self, src: NodeId, dst: NodeId) {
        for edge in &mut self.get_mut(src).edges {
            if edge.to == dst {
                edge.transitive = true;
            }
        }
    }

    /// Rank nodes so every edge `(a, b)` has `a.rank > b.rank`.
    ///
    /// Leaves get rank 0. Returns the number of ranks. Fails on cyclic input.
    pub fn rank(&mut self) -> Result<u32, GraphError> {
        self.ensure_acyclic()?;

        for node in &mut self.nodes {
            node.rank = 0;
        }

        // Keep going until a stable configuration has been found
        loop {
            let mut changed = false;
            for ix in 0..self.nodes.len() {
                let rank = self.nodes[ix]
                    .edges
                    .iter()
                    .map(|e| self.nodes[e.to.index()].rank + 1)
                    .max()
                    .unwrap_or(0);

                if rank > self.nodes[ix].rank {
                    self.nodes[ix].rank = rank;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        self.rank_count = self.nodes.iter().map(|n| n.rank + 1).max().unwrap_or(0);
        Ok(self.rank_count)
    }
}
