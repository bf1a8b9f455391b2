use crate::logic::Cube;
use log::trace;
use std::collections::BTreeSet;
use std::ops::{Index, IndexMut};

/// What a CTI chain is rooted at. Chains discovered while strengthening
/// end at the bad states, so hitting the initial region anywhere along one
/// is a concrete counterexample. Chains seeded from a previous run's
/// lemmas prove nothing about reachability of bad; hitting the initial
/// region merely discards the seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StateKind {
    #[default]
    Cti,
    Seed,
}

/// A pooled CTI record. `successor` points at the next state on the path
/// toward the root of its chain; index 0 is the reserved null sentinel.
#[derive(Debug, Default)]
pub struct State {
    pub successor: usize,
    pub latches: Cube,
    pub inputs: Cube,
    pub index: usize,
    pub used: bool,
    pub kind: StateKind,
}

/// Fixed-indexed arena of CTI records. Slots are recycled, never dropped,
/// so successor references stay valid for the lifetime of the pool.
#[derive(Debug)]
pub struct StatePool {
    states: Vec<State>,
    free: Vec<usize>,
}

impl StatePool {
    pub fn new() -> Self {
        Self {
            states: vec![State::default()],
            free: Vec::new(),
        }
    }

    pub fn new_state(&mut self, kind: StateKind) -> usize {
        let index = match self.free.pop() {
            Some(i) => i,
            None => {
                self.states.push(State::default());
                self.states.len() - 1
            }
        };
        let state = &mut self.states[index];
        state.successor = 0;
        state.latches.clear();
        state.inputs.clear();
        state.index = index;
        state.used = true;
        state.kind = kind;
        index
    }

    pub fn del_state(&mut self, index: usize) {
        debug_assert!(index != 0 && self.states[index].used);
        let state = &mut self.states[index];
        state.used = false;
        state.successor = 0;
        state.latches.clear();
        state.inputs.clear();
        self.free.push(index);
    }

    /// Free every state not reachable along a successor chain from one of
    /// the given roots.
    pub fn reset(&mut self, roots: impl IntoIterator<Item = usize>) {
        let mut live = vec![false; self.states.len()];
        live[0] = true;
        for root in roots {
            let mut i = root;
            while !live[i] {
                live[i] = true;
                i = self.states[i].successor;
            }
        }
        for i in 1..self.states.len() {
            if self.states[i].used && !live[i] {
                self.del_state(i);
            }
        }
    }

    pub fn num_used(&self) -> usize {
        self.states.iter().filter(|s| s.used).count()
    }
}

impl Index<usize> for StatePool {
    type Output = State;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.states[index]
    }
}

impl IndexMut<usize> for StatePool {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.states[index]
    }
}

/// A demand to show the state unreachable at `frame`. Ordering drives the
/// scheduler: lowest frame first (required for soundness), then shortest
/// depth, then the pool index as the canonical tiebreak.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProofObligation {
    pub frame: usize,
    pub depth: usize,
    pub state: usize,
}

#[derive(Debug, Default)]
pub struct ObligationQueue {
    obligations: BTreeSet<ProofObligation>,
    num: Vec<usize>,
}

impl ObligationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, po: ProofObligation) {
        if self.num.len() <= po.frame {
            self.num.resize(po.frame + 1, 0);
        }
        trace!("add obligation at frame {} depth {}", po.frame, po.depth);
        if self.obligations.insert(po) {
            self.num[po.frame] += 1;
        }
    }

    /// Minimum obligation whose frame does not exceed `limit`. Obligations
    /// seeded above the current frontier stay queued until frames catch up.
    pub fn pop(&mut self, limit: usize) -> Option<ProofObligation> {
        let po = *self.obligations.first()?;
        if po.frame > limit {
            return None;
        }
        self.obligations.pop_first();
        self.num[po.frame] -= 1;
        Some(po)
    }

    pub fn is_empty(&self) -> bool {
        self.obligations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProofObligation> {
        self.obligations.iter()
    }

    pub fn statistic(&self) -> String {
        format!("{:?}", self.num)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_recycles_slots() {
        let mut pool = StatePool::new();
        let a = pool.new_state(StateKind::Cti);
        let b = pool.new_state(StateKind::Seed);
        assert!(a != 0 && b != 0 && a != b);
        pool.del_state(a);
        let c = pool.new_state(StateKind::Cti);
        assert_eq!(c, a);
        assert!(pool[c].latches.is_empty());
        assert_eq!(pool[c].kind, StateKind::Cti);
        assert_eq!(pool[b].kind, StateKind::Seed);
    }

    #[test]
    fn reset_keeps_chains() {
        let mut pool = StatePool::new();
        let root = pool.new_state(StateKind::Cti);
        let mid = pool.new_state(StateKind::Cti);
        let leaf = pool.new_state(StateKind::Cti);
        pool[mid].successor = root;
        pool[leaf].successor = mid;
        let orphan = pool.new_state(StateKind::Cti);
        pool.reset([leaf]);
        assert!(pool[leaf].used && pool[mid].used && pool[root].used);
        assert!(!pool[orphan].used);
        assert_eq!(pool.num_used(), 3);
    }

    #[test]
    fn queue_orders_frame_depth_index() {
        let mut q = ObligationQueue::new();
        let hi = ProofObligation {
            frame: 2,
            depth: 1,
            state: 1,
        };
        let lo = ProofObligation {
            frame: 1,
            depth: 9,
            state: 2,
        };
        let shallow = ProofObligation {
            frame: 1,
            depth: 1,
            state: 3,
        };
        q.add(hi);
        q.add(lo);
        q.add(shallow);
        assert_eq!(q.pop(9), Some(shallow));
        assert_eq!(q.pop(9), Some(lo));
        // frame above the limit waits
        assert_eq!(q.pop(1), None);
        assert_eq!(q.pop(2), Some(hi));
        assert!(q.is_empty());
    }
}
