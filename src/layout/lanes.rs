//! Lane arena: integer-indexed lanes holding non-overlapping chain intervals.

use std::collections::BTreeMap;

use crate::error::LaneCollision;

/// One chain's occupancy of a lane, half-open in years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: i32,
    pub end: i32,
    pub chain: usize,
}

impl Interval {
    #[inline]
    pub fn overlaps(&self, start: i32, end: i32) -> bool {
        self.start < end && start < self.end
    }

    #[inline]
    pub fn active_at(&self, year: i32) -> bool {
        self.start <= year && year < self.end
    }
}

/// Lane occupancy for one family. Chains are addressed by family-local index.
#[derive(Debug, Clone)]
pub struct LaneArena {
    lanes: BTreeMap<i32, Vec<Interval>>,
    lane_of: Vec<Option<i32>>,
    spans: Vec<(i32, i32)>,
}

impl LaneArena {
    pub fn new(spans: Vec<(i32, i32)>) -> Self {
        Self {
            lanes: BTreeMap::new(),
            lane_of: vec![None; spans.len()],
            spans,
        }
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    #[inline]
    pub fn lane_of(&self, chain: usize) -> Option<i32> {
        self.lane_of[chain]
    }

    #[inline]
    pub fn span(&self, chain: usize) -> (i32, i32) {
        self.spans[chain]
    }

    pub fn occupants(&self, lane: i32) -> &[Interval] {
        self.lanes.get(&lane).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `chain` could sit on `lane` without overlapping anyone else.
    pub fn is_free(&self, lane: i32, chain: usize) -> bool {
        let (start, end) = self.spans[chain];
        self.occupants(lane)
            .iter()
            .all(|iv| iv.chain == chain || !iv.overlaps(start, end))
    }

    /// Highest lane index holding any chain.
    pub fn max_lane(&self) -> Option<i32> {
        self.lanes.keys().next_back().copied()
    }

    pub fn used_lanes(&self) -> impl Iterator<Item = i32> + '_ {
        self.lanes.keys().copied()
    }

    /// Place a chain that has no lane yet.
    pub fn place(&mut self, chain: usize, lane: i32) -> Result<(), LaneCollision> {
        debug_assert!(self.lane_of[chain].is_none(), "chain {chain} already placed");
        if !self.is_free(lane, chain) {
            return Err(LaneCollision { chain, lane });
        }
        self.insert(chain, lane);
        Ok(())
    }

    /// Move a placed chain: check, remove, insert. State is unchanged on error.
    pub fn move_chain(&mut self, chain: usize, lane: i32) -> Result<(), LaneCollision> {
        if !self.is_free(lane, chain) {
            return Err(LaneCollision { chain, lane });
        }
        self.remove(chain);
        self.insert(chain, lane);
        Ok(())
    }

    fn insert(&mut self, chain: usize, lane: i32) {
        let (start, end) = self.spans[chain];
        let occupants = self.lanes.entry(lane).or_default();
        let at = occupants.partition_point(|iv| (iv.start, iv.chain) < (start, chain));
        occupants.insert(at, Interval { start, end, chain });
        self.lane_of[chain] = Some(lane);
    }

    fn remove(&mut self, chain: usize) {
        let Some(lane) = self.lane_of[chain].take() else {
            return;
        };
        if let Some(occupants) = self.lanes.get_mut(&lane) {
            occupants.retain(|iv| iv.chain != chain);
            if occupants.is_empty() {
                self.lanes.remove(&lane);
            }
        }
    }

    /// Renumber used lanes to 0..n keeping their order. Returns n.
    pub fn compact(&mut self) -> usize {
        let old = std::mem::take(&mut self.lanes);
        for (new_lane, (_, occupants)) in old.into_iter().enumerate() {
            let new_lane = new_lane as i32;
            for iv in &occupants {
                self.lane_of[iv.chain] = Some(new_lane);
            }
            self.lanes.insert(new_lane, occupants);
        }
        self.lanes.len()
    }

    /// Re-check that no lane holds overlapping intervals.
    pub fn validate(&self) -> bool {
        self.lanes.values().all(|occupants| {
            occupants.iter().enumerate().all(|(i, a)| {
                occupants[i + 1..]
                    .iter()
                    .all(|b| !a.overlaps(b.start, b.end))
            })
        })
    }
}
