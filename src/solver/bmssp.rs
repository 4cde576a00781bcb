//! Bounded multi-source shortest path (BMSSP) solver.
//!
//! Works the same SSSP instance as the classic solver, but in bounded
//! multi-source waves instead of one globally sorted frontier:
//!
//! - `FindPivots` runs `k` rounds of bounded Bellman-Ford relaxation from
//!   a seed set, then shrinks the seed set to the pivots whose
//!   predecessor-forest subtrees grew to at least `k` vertices
//!   (`|pivots| <= |W| / k`, which is where the frontier reduction comes
//!   from).
//! - `bmssp` recurses level by level, pulling bounded-size batches of
//!   pivots and expanding them closest-first.
//!
//! Wave truncation (level size caps, iteration caps, early target exit)
//! never discards work: unexpanded frontier vertices spill back to the
//! caller, and the top-level driver re-seeds until no spill remains, so
//! the search reaches the same relaxation fixpoint as the classic
//! solver. A completed vertex whose label later improves through a
//! different prefix is re-opened and expanded again; with the hop cap in
//! play a k-round wave can settle a vertex before its best label
//! arrives, so completion cannot be assumed permanent.

use petgraph::graph::NodeIndex;
use tracing::{debug, warn};

use super::{no_route, reconstruct, resolve_endpoints, SearchState};
use crate::config::RouterConfig;
use crate::errors::RouteError;
use crate::graph::types::{RouteResult, TokenKey};
use crate::graph::TokenGraph;

/// Sub-sorting-barrier SSSP solver over the token graph.
pub struct BmsspSolver<'a> {
    graph: &'a TokenGraph,
    config: &'a RouterConfig,
}

impl<'a> BmsspSolver<'a> {
    pub fn new(graph: &'a TokenGraph, config: &'a RouterConfig) -> Self {
        Self { graph, config }
    }

    pub fn solve(
        &self,
        source: &TokenKey,
        target: &TokenKey,
        input_amount: f64,
        max_hops: Option<u32>,
    ) -> Result<RouteResult, RouteError> {
        let max_hops = self.config.max_hops_or_default(max_hops);
        let (source_ix, target_ix) = resolve_endpoints(self.graph, source, target)?;

        let n = self.graph.vertex_count();
        let log_n = (n.max(2) as f64).log2();
        let k = (log_n.powf(1.0 / 3.0).floor() as usize).max(2);
        let t = (log_n.powf(2.0 / 3.0).floor() as u32).max(2);
        let levels = ((log_n / t as f64).ceil() as u32).max(1);
        debug!("bmssp: n={n} k={k} t={t} levels={levels} max_hops={max_hops}");

        let mut run = BmsspRun {
            graph: self.graph,
            config: self.config,
            state: SearchState::new(n, source_ix, input_amount),
            completed: vec![false; n],
            target: target_ix,
            max_hops,
            k,
            t,
        };

        // Re-seed from spilled frontier vertices until the search reaches
        // quiescence. Each pass completes at least one vertex or improves
        // a label, so the pass count is bounded; the cap is a backstop.
        let mut frontier = vec![source_ix];
        let pass_cap = (n as u64 + 1) * (max_hops as u64 + 1) + 8;
        let mut passes = 0u64;
        while !frontier.is_empty() {
            passes += 1;
            if passes > pass_cap {
                warn!("bmssp: pass cap reached, returning best labels so far");
                break;
            }
            let target_dist = run.state.dist[target_ix.index()];
            if run.completed[target_ix.index()]
                && frontier
                    .iter()
                    .all(|&v| run.state.dist[v.index()] >= target_dist)
            {
                break;
            }
            let (_, _, spill) = run.bmssp(levels, f64::INFINITY, &frontier);
            frontier = run.dedup_open(spill);
        }

        if !run.state.dist[target_ix.index()].is_finite() {
            debug!("bmssp: no route {source} -> {target} within {max_hops} hops");
            return Err(no_route(source, target, max_hops));
        }
        Ok(reconstruct(
            self.graph,
            self.config,
            &run.state,
            source_ix,
            target_ix,
        ))
    }
}

/// Result of one `FindPivots` scan.
struct PivotScan {
    /// Seed vertices worth recursing from.
    pivots: Vec<NodeIndex>,
    /// Vertices completed (expanded) during the scan.
    expanded: Vec<NodeIndex>,
    /// Final-round frontier whose edges were not yet relaxed.
    leftover: Vec<NodeIndex>,
    /// Improvements that landed outside the distance bound.
    spill: Vec<NodeIndex>,
}

struct BmsspRun<'a> {
    graph: &'a TokenGraph,
    config: &'a RouterConfig,
    state: SearchState,
    completed: Vec<bool>,
    target: NodeIndex,
    max_hops: u32,
    k: usize,
    t: u32,
}

impl<'a> BmsspRun<'a> {
    /// Relax every outgoing edge of `u` with its current label and mark it
    /// completed. Improved targets are returned; an improved vertex that
    /// was already completed is re-opened.
    fn expand(&mut self, u: NodeIndex) -> Vec<NodeIndex> {
        self.completed[u.index()] = true;
        let mut improved = Vec::new();
        for &edge_ix in self.graph.out_edge_indices(u) {
            if let Some(v) =
                self.state
                    .try_relax(self.graph, self.config, u, edge_ix, self.max_hops)
            {
                if self.completed[v.index()] {
                    self.completed[v.index()] = false;
                }
                improved.push(v);
            }
        }
        improved
    }

    /// `k` rounds of bounded relaxation from `seed`, then pivot
    /// extraction over the predecessor forest of the touched set.
    fn find_pivots(&mut self, bound: f64, seed: &[NodeIndex]) -> PivotScan {
        let n = self.state.dist.len();
        let mut in_w = vec![false; n];
        let mut w: Vec<NodeIndex> = Vec::with_capacity(seed.len());
        for &s in seed {
            if !in_w[s.index()] {
                in_w[s.index()] = true;
                w.push(s);
            }
        }

        let mut expanded = Vec::new();
        let mut spill = Vec::new();
        let mut frontier = w.clone();
        let mut aborted = false;

        for _round in 0..self.k {
            self.sort_closest_first(&mut frontier);
            let mut next = Vec::new();
            for i in 0..frontier.len() {
                let u = frontier[i];
                if self.completed[u.index()] {
                    continue;
                }
                let du = self.state.dist[u.index()];
                if !du.is_finite() || du >= bound {
                    continue;
                }
                expanded.push(u);
                for v in self.expand(u) {
                    if self.state.dist[v.index()] < bound {
                        if !in_w[v.index()] {
                            in_w[v.index()] = true;
                            w.push(v);
                        }
                        next.push(v);
                    } else {
                        spill.push(v);
                    }
                }
            }
            frontier = self.dedup_open(next);
            // Frontier blow-up: stop reducing and treat the whole seed set
            // as pivots.
            if w.len() > self.k * seed.len().max(1) {
                aborted = true;
                break;
            }
            if frontier.is_empty() {
                break;
            }
        }

        let pivots = if aborted {
            seed.to_vec()
        } else {
            self.forest_pivots(&w, seed, &in_w)
        };
        PivotScan {
            pivots,
            expanded,
            leftover: frontier,
            spill,
        }
    }

    /// Pivots are seed vertices whose subtree in the predecessor forest
    /// (restricted to `w`) holds at least `k` vertices.
    fn forest_pivots(&self, w: &[NodeIndex], seed: &[NodeIndex], in_w: &[bool]) -> Vec<NodeIndex> {
        let n = self.state.dist.len();
        let mut in_seed = vec![false; n];
        for &s in seed {
            in_seed[s.index()] = true;
        }

        let mut subtree = vec![0usize; n];
        for &v in w {
            let mut cursor = v;
            let mut guard = 0usize;
            loop {
                guard += 1;
                if guard > w.len() + 1 {
                    break;
                }
                if in_seed[cursor.index()] {
                    subtree[cursor.index()] += 1;
                    break;
                }
                let Some(edge_ix) = self.state.prev[cursor.index()] else {
                    break;
                };
                let (parent, _) = self.graph.endpoints(edge_ix);
                if !in_w[parent.index()] {
                    break;
                }
                cursor = parent;
            }
        }

        seed.iter()
            .copied()
            .filter(|s| subtree[s.index()] >= self.k)
            .collect()
    }

    /// One recursion level: pivot scan, then bounded pulls of the closest
    /// open frontier vertices into the level below.
    ///
    /// Returns `(bound, completed, spill)`; spill is every improved or
    /// unexpanded vertex this level did not get to.
    fn bmssp(
        &mut self,
        level: u32,
        bound: f64,
        seed: &[NodeIndex],
    ) -> (f64, Vec<NodeIndex>, Vec<NodeIndex>) {
        if level == 0 || seed.is_empty() {
            return self.base_case(bound, seed);
        }

        let scan = self.find_pivots(bound, seed);
        let mut done = scan.expanded;
        let mut spill = scan.spill;
        let mut pivots = scan.pivots;
        let mut pending = scan.leftover;

        let shift = (level as u64 * self.t as u64).min(40) as u32;
        let done_cap = (self.k as u64).saturating_mul(1u64 << shift);
        let pull_cap = 1usize << ((level - 1) as u64 * self.t as u64).min(20);
        let iter_cap = 1u32 << self.t.min(20);

        let mut iterations = 0u32;
        while (done.len() as u64) < done_cap && iterations < iter_cap {
            pivots.retain(|p| !self.completed[p.index()]);
            pending = self.dedup_open(std::mem::take(&mut pending));

            let pool = if !pivots.is_empty() {
                &mut pivots
            } else {
                &mut pending
            };
            if pool.is_empty() {
                break;
            }
            // Pull the closest batch; the pool is sorted farthest-first so
            // the batch pops off the tail.
            self.sort_farthest_first(pool);
            let take = pool.len().min(pull_cap);
            let at = pool.len() - take;
            let batch = pool.split_off(at);

            let (_, child_done, child_spill) = self.bmssp(level - 1, bound, &batch);
            done.extend(child_done);
            for v in child_spill {
                if self.state.dist[v.index()] < bound {
                    pending.push(v);
                } else {
                    spill.push(v);
                }
            }

            iterations += 1;
            if self.completed[self.target.index()]
                && self.state.dist[self.target.index()] < bound
            {
                break;
            }
        }

        spill.extend(pivots.into_iter().filter(|p| !self.completed[p.index()]));
        spill.extend(pending.into_iter().filter(|p| !self.completed[p.index()]));
        (bound, done, spill)
    }

    /// Level zero: expand the seeds themselves, closest first.
    fn base_case(
        &mut self,
        bound: f64,
        seed: &[NodeIndex],
    ) -> (f64, Vec<NodeIndex>, Vec<NodeIndex>) {
        let mut order = seed.to_vec();
        self.sort_closest_first(&mut order);

        let mut done = Vec::new();
        let mut spill = Vec::new();
        for u in order {
            if self.completed[u.index()] {
                continue;
            }
            let du = self.state.dist[u.index()];
            if !du.is_finite() {
                continue;
            }
            if du >= bound {
                spill.push(u);
                continue;
            }
            done.push(u);
            spill.extend(self.expand(u));
        }
        (bound, done, spill)
    }

    /// Drop duplicates and completed vertices, keeping open frontier
    /// members only.
    fn dedup_open(&self, mut nodes: Vec<NodeIndex>) -> Vec<NodeIndex> {
        nodes.sort_unstable_by_key(|v| v.index());
        nodes.dedup();
        nodes.retain(|v| !self.completed[v.index()] && self.state.dist[v.index()].is_finite());
        nodes
    }

    fn sort_closest_first(&self, nodes: &mut [NodeIndex]) {
        nodes.sort_unstable_by(|&a, &b| {
            self.state.dist[a.index()]
                .partial_cmp(&self.state.dist[b.index()])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.index().cmp(&b.index()))
        });
    }

    fn sort_farthest_first(&self, nodes: &mut [NodeIndex]) {
        nodes.sort_unstable_by(|&a, &b| {
            self.state.dist[b.index()]
                .partial_cmp(&self.state.dist[a.index()])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.index().cmp(&a.index()))
        });
    }
}
