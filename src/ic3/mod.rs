use crate::config::{Config, Reuse};
use crate::logic::{Cube, Lemma};
use crate::transys::Transys;
use crate::{McResult, Witness};
use activity::Activity;
use frame::{Frame, Frames};
use log::{debug, info, trace};
use mic::MicType;
use obligation::{ObligationQueue, ProofObligation, StateKind, StatePool};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use solver::{Ic3Solver, Lift, INF};
use std::time::Instant;

mod activity;
mod frame;
mod mic;
mod obligation;
mod solver;
mod statistic;
mod verify;

pub use statistic::Statistic;
pub use verify::verify_invariant;

pub struct IC3 {
    cfg: Config,
    ts: Transys,
    solvers: Vec<Ic3Solver>,
    inf_solver: Ic3Solver,
    lift: Lift,
    frames: Frames,
    obligations: ObligationQueue,
    pool: StatePool,
    activity: Activity,
    statistic: Statistic,
    rng: StdRng,
    cex_state: usize,

    last_core: Option<Cube>,
    last_model: Option<(Cube, Cube)>,
    last_target: Cube,
}

impl IC3 {
    pub fn new(cfg: Config, ts: Transys) -> Self {
        let seed = if cfg.random { rand::random() } else { 0 };
        let activity = Activity::new(ts.max_var(), &cfg.gen);
        let frames = Frames::new(ts.max_var());
        let inf_solver = Ic3Solver::new(&ts, INF);
        let lift = Lift::new(&ts);
        Self {
            cfg,
            solvers: Vec::new(),
            inf_solver,
            lift,
            frames,
            obligations: ObligationQueue::new(),
            pool: StatePool::new(),
            activity,
            statistic: Statistic::default(),
            rng: StdRng::seed_from_u64(seed),
            cex_state: 0,
            last_core: None,
            last_model: None,
            last_target: Cube::new(),
            ts,
        }
    }

    /// Start from a previous run's border cubes against a relaxed model.
    /// Every prior cube becomes a front-loaded proof obligation at its
    /// prior level; `Reuse::Frames` additionally seeds the frames with the
    /// cubes that survive revalidation against the relaxed model.
    pub fn with_prior(cfg: Config, ts: Transys, prior: Vec<(usize, Cube)>, mode: Reuse) -> Self {
        let mut ic3 = Self::new(cfg, ts);
        if mode == Reuse::Frames {
            ic3.extend();
            let max_level = prior.iter().map(|(lv, _)| *lv).max().unwrap_or(1).max(1);
            for _ in 0..max_level {
                ic3.extend();
            }
            let mut seeds = prior.clone();
            seeds.sort_by_key(|(lv, _)| *lv);
            for (lv, cube) in seeds {
                let lv = lv.clamp(1, ic3.level());
                if ic3.ts.cube_subsume_init(&cube) {
                    continue;
                }
                if ic3.blocked(lv, &cube, true) {
                    ic3.add_cube(lv, cube, true);
                }
            }
            info!("revalidated prior frames: {}", ic3.frames.statistic());
        }
        for (lv, cube) in prior {
            let state = ic3.pool.new_state(StateKind::Seed);
            let mut cube = cube;
            cube.sort_by_var();
            ic3.pool[state].latches = cube;
            ic3.obligations.add(ProofObligation {
                frame: lv.max(1),
                depth: 0,
                state,
            });
        }
        ic3
    }

    #[inline]
    pub fn level(&self) -> usize {
        self.solvers.len() - 1
    }

    fn extend(&mut self) {
        let frame = self.solvers.len();
        debug!("extending to frame {frame}");
        let mut solver = Ic3Solver::new(&self.ts, frame);
        if frame > 0 {
            for lemma in self.frames.inf.iter() {
                solver.add_clause(&!lemma.cube());
            }
        }
        self.solvers.push(solver);
        self.frames.push(Frame::new());
    }

    pub fn check(&mut self) -> McResult {
        if self.solvers.is_empty() {
            self.extend();
        }
        if self.check_init_bad() {
            debug!("property violated by an initial state");
            return McResult::Unsafe;
        }
        loop {
            let start = Instant::now();
            let strengthened = self.strengthen();
            self.statistic.overall_block_time += start.elapsed();
            if !strengthened {
                return McResult::Unsafe;
            }
            self.extend();
            let start = Instant::now();
            let fixpoint = self.propagate(None);
            self.statistic.overall_propagate_time += start.elapsed();
            if fixpoint {
                return McResult::Safe;
            }
            self.propagate_to_inf();
            self.reset_states();
            debug!("{}", self.frames.statistic());
        }
    }

    /// Block bad-state predecessors at the frontier until none remain.
    fn strengthen(&mut self) -> bool {
        debug!("blocking phase at frame {}", self.level());
        loop {
            if !self.block() {
                return false;
            }
            match self.get_bad() {
                Some((latches, inputs)) => {
                    self.statistic.num_cti += 1;
                    trace!("cti {:?}", latches);
                    let state = self.pool.new_state(StateKind::Cti);
                    self.pool[state].latches = latches;
                    self.pool[state].inputs = inputs;
                    self.obligations.add(ProofObligation {
                        frame: self.level(),
                        depth: 1,
                        state,
                    });
                }
                None => return true,
            }
        }
    }

    /// Drain the obligation queue up to the current frontier. False means
    /// a counterexample chain reached the initial states.
    fn block(&mut self) -> bool {
        while let Some(po) = self.obligations.pop(self.level()) {
            let lemma = Lemma::new(self.pool[po.state].latches.clone());
            trace!("obligation at frame {} depth {}", po.frame, po.depth);
            if po.frame == 0 || self.ts.cube_subsume_init(&lemma) {
                match self.pool[po.state].kind {
                    // the chain is real: every state in the lifted cube
                    // steps to its successor and on into the bad states
                    StateKind::Cti => {
                        self.cex_state = po.state;
                        return false;
                    }
                    StateKind::Seed => continue,
                }
            }
            if let Some(contained) = self.frames.trivial_contained(po.frame, &lemma) {
                if let Some(frame) = contained {
                    let po = ProofObligation {
                        frame: frame + 1,
                        ..po
                    };
                    if po.frame <= self.level() {
                        self.obligations.add(po);
                    }
                }
                continue;
            }
            if self.blocked_with_ordered(po.frame, lemma.cube(), true) {
                self.generalize(po);
            } else {
                let (model, inputs) = self.get_pred();
                let kind = self.pool[po.state].kind;
                let pred = self.pool.new_state(kind);
                self.pool[pred].latches = model;
                self.pool[pred].inputs = inputs;
                self.pool[pred].successor = po.state;
                self.obligations.add(ProofObligation {
                    frame: po.frame - 1,
                    depth: po.depth + 1,
                    state: pred,
                });
                self.obligations.add(po);
            }
        }
        true
    }

    /// The obligation's cube was blocked: shrink it by the unsat core,
    /// generalize, push it as far forward as it stays inductive, and
    /// re-queue the obligation beyond the frame the lemma landed in.
    fn generalize(&mut self, mut po: ProofObligation) {
        self.statistic.avg_po_cube_len += self.pool[po.state].latches.len();
        let core = self
            .take_core()
            .unwrap_or_else(|| self.pool[po.state].latches.clone());
        let mic = self.mic(po.frame, core, MicType::from_config(&self.cfg));
        let (frame, mic) = self.push_lemma(po.frame, mic);
        debug!("generalized lemma {:?} at frame {}", mic, frame - 1);
        self.add_cube(frame - 1, mic, false);
        po.frame = frame;
        if po.frame <= self.level() {
            self.obligations.add(po);
        }
    }

    /// Forward the lemma while it stays inductive, shrinking by the core
    /// at each level; returns the first frame where consecution fails.
    fn push_lemma(&mut self, frame: usize, mut cube: Cube) -> (usize, Cube) {
        for i in frame + 1..=self.level() {
            if self.blocked(i, &cube, true) {
                if let Some(core) = self.take_core() {
                    cube = core;
                }
            } else {
                return (i, cube);
            }
        }
        (self.level() + 1, cube)
    }

    /// Move still-inductive border cubes forward, walking from the lowest
    /// frame touched since the last pass. An emptied frame equals its
    /// successor: fixpoint.
    pub fn propagate(&mut self, from: Option<usize>) -> bool {
        let level = self.level();
        let from = from.unwrap_or(self.frames.early).max(1);
        for fi in from..level {
            self.frames[fi].sort_by_key(|l| l.len());
            let frame = self.frames[fi].clone();
            for lemma in frame.iter() {
                if self.frames[fi].iter().all(|l| l != lemma) {
                    continue;
                }
                if self.blocked(fi + 1, lemma.cube(), false) {
                    self.add_cube(fi + 1, lemma.cube().clone(), true);
                }
            }
            if self.frames[fi].is_empty() {
                debug!("fixpoint: frame {fi} equals frame {}", fi + 1);
                return true;
            }
        }
        self.frames.early = self.level();
        false
    }

    /// Migrate frontier lemmas that are inductive relative to the
    /// infinity frame; they hold at every depth from now on.
    fn propagate_to_inf(&mut self) {
        let level = self.level();
        if self.cfg.random {
            self.frames[level].shuffle(&mut self.rng);
        }
        let lemmas = self.frames[level].clone();
        for lemma in lemmas.iter() {
            if self.inf_blocked(lemma.cube()) {
                if let Some(at) = self.frames[level].iter().position(|l| l == lemma) {
                    self.frames[level].swap_remove(at);
                    self.add_inf_cube(lemma.clone());
                }
            }
        }
    }

    /// Free every pool state no live obligation or counterexample chain
    /// can reach; called between major iterations.
    fn reset_states(&mut self) {
        let mut roots: Vec<usize> = self.obligations.iter().map(|po| po.state).collect();
        if self.cex_state != 0 {
            roots.push(self.cex_state);
        }
        self.pool.reset(roots);
    }

    /// The counterexample trace: input vectors along the successor chain,
    /// initial state first.
    pub fn witness(&self) -> Witness {
        let mut witness = Witness::default();
        let mut state = self.cex_state;
        while state != 0 {
            witness.states.push(self.pool[state].latches.clone());
            witness.inputs.push(self.pool[state].inputs.clone());
            state = self.pool[state].successor;
        }
        witness
    }

    /// Border cubes with their levels, the currency of incremental reuse.
    pub fn frame_cubes(&self) -> Vec<(usize, Cube)> {
        let mut cubes = Vec::new();
        for (i, frame) in self.frames.iter().enumerate().skip(1) {
            for lemma in frame.iter() {
                cubes.push((i, lemma.cube().clone()));
            }
        }
        let top = self.frames.len().saturating_sub(1).max(1);
        for lemma in self.frames.inf.iter() {
            cubes.push((top, lemma.cube().clone()));
        }
        cubes
    }

    pub fn statistic(&self) -> &Statistic {
        &self.statistic
    }

    pub fn log_statistic(&self) {
        info!("obligations: {}", self.obligations.statistic());
        info!("{}", self.frames.statistic());
        info!("pool: {} live states", self.pool.num_used());
        info!("{:#?}", self.statistic);
    }
}
