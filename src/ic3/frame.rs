use super::IC3;
use crate::logic::{Cube, Lemma, LitSet, Var};
use log::debug;
use std::fmt::Write;
use std::ops::{Deref, DerefMut};

#[derive(Clone, Default)]
pub struct Frame {
    cubes: Vec<Lemma>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Deref for Frame {
    type Target = Vec<Lemma>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.cubes
    }
}

impl DerefMut for Frame {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.cubes
    }
}

/// The frame stack in delta encoding: `frames[i]` holds only the cubes
/// newly blocked at level i, and the clause set of F_i is the union of all
/// `frames[j]` for j >= i plus `inf`.
pub struct Frames {
    frames: Vec<Frame>,
    pub inf: Frame,
    pub early: usize,
    tmp_lit_set: LitSet,
}

impl Frames {
    pub fn new(max_var: Var) -> Self {
        let mut tmp_lit_set = LitSet::new();
        tmp_lit_set.reserve(max_var);
        Self {
            frames: Vec::new(),
            inf: Frame::new(),
            early: 1,
            tmp_lit_set,
        }
    }

    /// Frame at or above `frame` already holding a lemma that subsumes
    /// `lemma`. `Some(None)` reports a subsumer in the infinity frame.
    pub fn trivial_contained(&mut self, frame: usize, lemma: &Lemma) -> Option<Option<usize>> {
        for l in lemma.iter() {
            self.tmp_lit_set.insert(*l);
        }
        for (i, fi) in self.frames.iter().enumerate().skip(frame) {
            for l in fi.iter() {
                if l.subsume_set(lemma, &self.tmp_lit_set) {
                    self.tmp_lit_set.clear();
                    return Some(Some(i));
                }
            }
        }
        for l in self.inf.iter() {
            if l.subsume_set(lemma, &self.tmp_lit_set) {
                self.tmp_lit_set.clear();
                return Some(None);
            }
        }
        self.tmp_lit_set.clear();
        None
    }

    pub fn statistic(&self) -> String {
        let mut s = String::new();
        s.write_fmt(format_args!("frames [{}]: ", self.frames.len()))
            .unwrap();
        for f in self.frames.iter() {
            s.write_fmt(format_args!("{} ", f.len())).unwrap();
        }
        s.write_fmt(format_args!("inf {}", self.inf.len())).unwrap();
        s
    }
}

impl Deref for Frames {
    type Target = Vec<Frame>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.frames
    }
}

impl DerefMut for Frames {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.frames
    }
}

impl IC3 {
    /// Add a blocked cube at `frame`: insert it into the border set and
    /// push its clause into every frame solver it newly constrains.
    /// Weaker cubes it subsumes are dropped on the way.
    pub(super) fn add_cube(&mut self, frame: usize, cube: Cube, contained_check: bool) {
        debug_assert!(frame >= 1);
        debug_assert!(!self.ts.cube_subsume_init(&cube));
        let lemma = Lemma::new(cube);
        if contained_check && self.frames.trivial_contained(frame, &lemma).is_some() {
            return;
        }
        self.activity.update(&lemma);
        let clause = !lemma.cube();
        let mut begin = None;
        'scan: for i in (1..=frame).rev() {
            let mut j = 0;
            while j < self.frames[i].len() {
                let l = &self.frames[i][j];
                if begin.is_none() && l.subsume(&lemma) {
                    if l.cube() == lemma.cube() {
                        // the same cube at a lower level only moves forward
                        self.frames[i].swap_remove(j);
                        for k in i + 1..=frame {
                            self.solvers[k].add_clause(&clause);
                        }
                        self.frames[frame].push(lemma);
                        self.frames.early = self.frames.early.min(i + 1);
                        return;
                    }
                    // a stronger lemma already constrains frames <= i
                    begin = Some(i + 1);
                    break 'scan;
                }
                if lemma.subsume(l) {
                    self.frames[i].swap_remove(j);
                    continue;
                }
                j += 1;
            }
        }
        let begin = begin.unwrap_or(1);
        for i in begin..=frame {
            self.solvers[i].add_clause(&clause);
        }
        self.frames[frame].push(lemma);
        self.frames.early = self.frames.early.min(begin);
    }

    /// Promote a lemma to the infinity frame; it holds in every reachable
    /// state from here on.
    pub(super) fn add_inf_cube(&mut self, lemma: Lemma) {
        debug!("lemma {:?} is inductive forever", lemma);
        self.inf_solver.add_clause(&!lemma.cube());
        self.frames.inf.push(lemma);
    }

    /// The inductive invariant: the union of border cubes from the first
    /// empty frame upward, together with the infinity frame.
    pub fn invariant(&self) -> Vec<Cube> {
        let mut invariants: Vec<Cube> = self.frames.inf.iter().map(|l| l.cube().clone()).collect();
        let fixpoint = self
            .frames
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, f)| f.is_empty())
            .map(|(i, _)| i);
        if let Some(fixpoint) = fixpoint {
            for frame in self.frames.iter().skip(fixpoint) {
                for lemma in frame.iter() {
                    invariants.push(lemma.cube().clone());
                }
            }
        }
        invariants
    }
}
