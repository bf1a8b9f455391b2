use super::frame::Frames;
use super::obligation::StateKind;
use super::IC3;
use crate::logic::{Clause, Cube};
use crate::sat::Solver as SatSolver;
use crate::transys::Transys;
use log::trace;
use rand::seq::SliceRandom;
use std::time::Instant;

/// Frame index of the dedicated infinity-frame solver.
pub(super) const INF: usize = usize::MAX;

/// A frame's SAT instance: the transition relation asserted once, the
/// initial cube (frame 0) or the property (all later frames), plus the
/// clauses of this and every later frame. Activation literals of transient
/// queries are released immediately, and the instance is rebuilt from its
/// frames once too many have accumulated.
pub struct Ic3Solver {
    solver: SatSolver,
    frame: usize,
    num_act: usize,
}

impl Ic3Solver {
    pub fn new(ts: &Transys, frame: usize) -> Self {
        let mut solver = SatSolver::new();
        ts.load_trans(&mut solver);
        if frame == 0 {
            ts.load_init(&mut solver);
        } else {
            solver.add_clause(&[!ts.bad]);
        }
        Self {
            solver,
            frame,
            num_act: 0,
        }
    }

    pub fn reset(&mut self, ts: &Transys, frames: &Frames) {
        *self = Self::new(ts, self.frame);
        if self.frame == 0 {
            return;
        }
        for lemma in frames.inf.iter() {
            self.solver.add_clause(&!lemma.cube());
        }
        if self.frame == INF {
            return;
        }
        for fi in frames.iter().skip(self.frame) {
            for lemma in fi.iter() {
                self.solver.add_clause(&!lemma.cube());
            }
        }
    }

    #[inline]
    pub fn add_clause(&mut self, clause: &Clause) {
        self.solver.add_clause(clause);
    }
}

/// Dedicated solver for predecessor minimization. Holds only the
/// transition relation; each lift is a transient activation scope.
pub struct Lift {
    solver: SatSolver,
    num_act: usize,
}

impl Lift {
    pub fn new(ts: &Transys) -> Self {
        let mut solver = SatSolver::new();
        ts.load_trans(&mut solver);
        Self { solver, num_act: 0 }
    }
}

impl IC3 {
    /// Consecution: is F_{frame-1} /\ !cube /\ trans /\ cube' unsatisfiable?
    /// On yes the unsat core (projected to latch space, order preserved,
    /// repaired against the initial states) is kept for `take_core`; on no
    /// the satisfying predecessor is kept for `get_pred`.
    pub(super) fn blocked(&mut self, frame: usize, cube: &Cube, strengthen: bool) -> bool {
        debug_assert!(frame >= 1);
        self.blocked_inner(frame - 1, cube, strengthen)
    }

    /// Consecution with the assumptions ordered by the literal heuristic.
    pub(super) fn blocked_with_ordered(
        &mut self,
        frame: usize,
        cube: &Cube,
        strengthen: bool,
    ) -> bool {
        let mut ordered_cube = cube.clone();
        self.activity.sort_by_activity(&mut ordered_cube, false);
        self.blocked(frame, &ordered_cube, strengthen)
    }

    /// Is the cube inductive relative to the infinity frame?
    pub(super) fn inf_blocked(&mut self, cube: &Cube) -> bool {
        self.blocked_inner(INF, cube, true)
    }

    fn blocked_inner(&mut self, sidx: usize, cube: &Cube, strengthen: bool) -> bool {
        if self.solver_of(sidx).num_act > 1000 {
            self.statistic.num_solver_restart += 1;
            let solver = if sidx == INF {
                &mut self.inf_solver
            } else {
                &mut self.solvers[sidx]
            };
            solver.reset(&self.ts, &self.frames);
        }
        let target = self.ts.cube_next(cube);
        let mut assumption = target.clone();
        let solver = if sidx == INF {
            &mut self.inf_solver
        } else {
            &mut self.solvers[sidx]
        };
        let act = if strengthen {
            solver.num_act += 1;
            let act = solver.solver.new_var().lit();
            let mut cls = !cube;
            cls.push(!act);
            solver.solver.add_clause(&cls);
            assumption.push(act);
            Some(act)
        } else {
            None
        };
        self.statistic.num_sat_call += 1;
        let start = Instant::now();
        let sat = solver.solver.solve(&assumption);
        self.statistic.sat_time += start.elapsed();
        if sat {
            let mut latches = Cube::new();
            for latch in self.ts.latchs.iter() {
                let lit = latch.lit();
                if let Some(v) = solver.solver.sat_value(lit) {
                    latches.push(lit.not_if(!v));
                }
            }
            let mut inputs = Cube::new();
            for input in self.ts.inputs.iter() {
                let lit = input.lit();
                if let Some(v) = solver.solver.sat_value(lit) {
                    inputs.push(lit.not_if(!v));
                }
            }
            self.last_model = Some((latches, inputs));
            self.last_target = target;
            self.last_core = None;
        } else {
            let mut core: Cube = target
                .iter()
                .filter(|l| solver.solver.unsat_has(**l))
                .map(|l| self.ts.lit_prev(*l))
                .collect();
            if self.ts.cube_subsume_init(&core) {
                // the core lost every literal separating the cube from the
                // initial states; put one back
                let fix = cube.iter().copied().find(|l| {
                    self.ts.init_map[l.var()]
                        .is_some_and(|i| i != l.polarity())
                });
                if let Some(fix) = fix {
                    core = cube
                        .iter()
                        .filter(|l| {
                            **l == fix || solver.solver.unsat_has(self.ts.lit_next(**l))
                        })
                        .copied()
                        .collect();
                }
            }
            self.last_core = Some(core);
            self.last_model = None;
        }
        if let Some(act) = act {
            solver.solver.add_clause(&[!act]);
        }
        !sat
    }

    fn solver_of(&self, sidx: usize) -> &Ic3Solver {
        if sidx == INF {
            &self.inf_solver
        } else {
            &self.solvers[sidx]
        }
    }

    /// The reduced cube of the last unsatisfiable consecution query.
    pub(super) fn take_core(&mut self) -> Option<Cube> {
        self.last_core.take()
    }

    /// Lift the predecessor of the last satisfiable consecution query into
    /// a partial cube.
    pub(super) fn get_pred(&mut self) -> (Cube, Cube) {
        let (latches, inputs) = self.last_model.take().expect("no model to lift");
        let target = std::mem::take(&mut self.last_target);
        self.minimal_predecessor(&target, latches, inputs)
    }

    /// A state of the frontier one transition away from the bad states,
    /// lifted, or None once the frontier excludes all such states.
    pub(super) fn get_bad(&mut self) -> Option<(Cube, Cube)> {
        trace!("getting bad state in frame {}", self.level());
        self.statistic.num_get_bad += 1;
        let bad = self.ts.bad_next();
        let solver = self.solvers.last_mut().unwrap();
        self.statistic.num_sat_call += 1;
        let start = Instant::now();
        let sat = solver.solver.solve(&[bad]);
        self.statistic.sat_time += start.elapsed();
        if !sat {
            return None;
        }
        let mut latches = Cube::new();
        for latch in self.ts.latchs.iter() {
            let lit = latch.lit();
            if let Some(v) = solver.solver.sat_value(lit) {
                latches.push(lit.not_if(!v));
            }
        }
        let mut inputs = Cube::new();
        for input in self.ts.inputs.iter() {
            let lit = input.lit();
            if let Some(v) = solver.solver.sat_value(lit) {
                inputs.push(lit.not_if(!v));
            }
        }
        Some(self.minimal_predecessor(&Cube::from([bad]), latches, inputs))
    }

    /// Does some initial state already violate the property? Sets up the
    /// zero-step counterexample when so.
    pub(super) fn check_init_bad(&mut self) -> bool {
        let solver = &mut self.solvers[0];
        self.statistic.num_sat_call += 1;
        let start = Instant::now();
        let sat = solver.solver.solve(&[self.ts.bad]);
        self.statistic.sat_time += start.elapsed();
        if !sat {
            return false;
        }
        let mut latches = Cube::new();
        for latch in self.ts.latchs.iter() {
            let lit = latch.lit();
            if let Some(v) = solver.solver.sat_value(lit) {
                latches.push(lit.not_if(!v));
            }
        }
        let mut inputs = Cube::new();
        for input in self.ts.inputs.iter() {
            let lit = input.lit();
            if let Some(v) = solver.solver.sat_value(lit) {
                inputs.push(lit.not_if(!v));
            }
        }
        let state = self.pool.new_state(StateKind::Cti);
        self.pool[state].latches = latches;
        self.pool[state].inputs = inputs;
        self.cex_state = state;
        true
    }

    /// Assume the primed target, the inputs, and the full latch
    /// assignment; the conflict of the expected refutation restricted to
    /// the latches is the lifted cube. A failed proof keeps the full
    /// assignment.
    fn minimal_predecessor(&mut self, target: &Cube, latches: Cube, inputs: Cube) -> (Cube, Cube) {
        let start = Instant::now();
        self.lift.num_act += 1;
        if self.lift.num_act > 1000 {
            self.lift = Lift::new(&self.ts);
        }
        let act = self.lift.solver.new_var().lit();
        let mut cls = !target;
        cls.push(!act);
        self.lift.solver.add_clause(&cls);
        let mut assumption = Cube::from([act]);
        assumption.extend_from_slice(&inputs);
        let mut latches = latches;
        if self.cfg.random {
            latches.shuffle(&mut self.rng);
        } else {
            self.activity.sort_by_activity(&mut latches, false);
        }
        assumption.extend_from_slice(&latches);
        self.statistic.num_sat_call += 1;
        let sat = self.lift.solver.solve(&assumption);
        let mut lifted: Cube = if sat {
            latches
        } else {
            latches
                .iter()
                .filter(|l| self.lift.solver.unsat_has(**l))
                .copied()
                .collect()
        };
        self.lift.solver.add_clause(&[!act]);
        lifted.sort_by_var();
        self.statistic.minimal_predecessor_time += start.elapsed();
        (lifted, inputs)
    }
}
