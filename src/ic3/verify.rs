use super::IC3;
use crate::logic::Cube;
use crate::sat::Solver;
use crate::transys::Transys;
use log::{error, info};

/// Check that the extracted clause set together with the property is an
/// inductive invariant: every clause holds initially, and one transition
/// from the invariant region re-establishes every clause and the property.
pub fn verify_invariant(ts: &Transys, invariants: &[Cube]) -> bool {
    let mut solver = Solver::new();
    ts.load_trans(&mut solver);
    ts.load_init(&mut solver);
    if solver.solve(&[ts.bad]) {
        return false;
    }
    for cube in invariants {
        if solver.solve(cube) {
            return false;
        }
    }
    let mut solver = Solver::new();
    ts.load_trans(&mut solver);
    solver.add_clause(&[!ts.bad]);
    for cube in invariants {
        let clause = !cube;
        solver.add_clause(&clause);
    }
    if solver.solve(&[ts.bad_next()]) {
        return false;
    }
    for cube in invariants {
        if solver.solve(&ts.cube_next(cube)) {
            return false;
        }
    }
    true
}

impl IC3 {
    pub fn verify(&self) -> bool {
        let invariants = self.invariant();
        if !verify_invariant(&self.ts, &invariants) {
            error!("invariant verification failed");
            return false;
        }
        info!(
            "inductive invariant verified with {} lemmas",
            invariants.len()
        );
        true
    }
}
