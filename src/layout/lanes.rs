//! Lane stacking for overlapping service events.
//!
//! # Algorithm
//! 1. Lay out every event of the property with [`compute_bar_layout`].
//! 2. Connect secondary bars whose pixel intervals intersect.
//! 3. Union-find over those edges gives the overlap components. A
//!    component is a chain of overlaps, so its members need not all
//!    overlap each other.
//! 4. Members of a component with more than one bar are ordered by
//!    `left`, then kind (cleaning before maintenance), then ID, and each
//!    gets its own lane. Lone bars keep the full band.
//!
//! The ordering is total, so lane assignment does not depend on the input
//! order and is stable across renders.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::compute_bar_layout;
use crate::config::DensityConfig;
use crate::models::{BarLayout, Event, EventKind, Layer};

/// Arena-indexed disjoint-set forest.
///
/// Elements are positions `0..n`; no pointers or references between nodes.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    /// Creates `n` singleton sets.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    /// Representative of `x`'s set (with path halving).
    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merges the sets of `a` and `b`.
    pub fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }

    /// Groups `0..n` by set, each group in ascending element order.
    pub fn components(&mut self) -> Vec<Vec<usize>> {
        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for x in 0..self.parent.len() {
            let root = self.find(x);
            groups.entry(root).or_default().push(x);
        }
        groups.into_values().collect()
    }
}

/// Lays out all events of one property and stacks overlapping
/// secondary-layer bars into lanes.
///
/// Events outside the buffer are skipped; the result keeps input order.
pub fn compute_property_bar_layouts(
    events: &[Event],
    days: &[NaiveDate],
    day_width: f64,
    density: &DensityConfig,
) -> Vec<BarLayout> {
    let mut layouts = Vec::with_capacity(events.len());
    let mut kinds = Vec::with_capacity(events.len());
    for event in events {
        if let Some(layout) = compute_bar_layout(event, days, day_width, density) {
            layouts.push(layout);
            kinds.push(event.kind);
        }
    }
    stack_lanes(&mut layouts, &kinds, density);
    layouts
}

fn stack_lanes(layouts: &mut [BarLayout], kinds: &[EventKind], density: &DensityConfig) {
    let secondary: Vec<usize> = (0..layouts.len())
        .filter(|&i| layouts[i].layer == Layer::Secondary)
        .collect();
    if secondary.len() < 2 {
        return;
    }

    let mut sets = UnionFind::new(secondary.len());
    for a in 0..secondary.len() {
        for b in (a + 1)..secondary.len() {
            if layouts[secondary[a]].overlaps_horizontally(&layouts[secondary[b]]) {
                sets.union(a, b);
            }
        }
    }

    let band = density.profile.secondary;
    let gap = density.layout.lane_gap;
    let min_height = density.layout.min_lane_height;

    for component in sets.components() {
        if component.len() < 2 {
            continue;
        }
        let mut members: Vec<usize> = component.into_iter().map(|i| secondary[i]).collect();
        members.sort_by(|&a, &b| {
            layouts[a]
                .left
                .total_cmp(&layouts[b].left)
                .then_with(|| kinds[a].stacking_priority().cmp(&kinds[b].stacking_priority()))
                .then_with(|| layouts[a].event_id.cmp(&layouts[b].event_id))
        });

        let n = members.len();
        let lane_height = (band.height - gap * (n - 1) as f64) / n as f64;
        for (lane, &idx) in members.iter().enumerate() {
            let bar = &mut layouts[idx];
            bar.top = band.top + lane as f64 * lane_height;
            bar.height = (lane_height - gap).max(min_height);
            bar.lane = lane;
            bar.lane_count = n;
        }
    }
}
