use crate::logic::{Lit, Var};

/// Incremental SAT backend. Wraps a CaDiCaL instance behind the small
/// assume/solve/model/core surface the engine needs. A backend failure is
/// fatal; the engine cannot continue safely past one.
pub struct Solver {
    solver: cadical::Solver,
    num_var: u32,
}

/// DIMACS encoding of a literal. `Var::CONST` occupies index 0, so every
/// variable is shifted up by one.
#[inline]
fn dimacs(lit: Lit) -> i32 {
    let v = lit.var().0 as i32 + 1;
    if lit.polarity() { v } else { -v }
}

impl Solver {
    pub fn new() -> Self {
        Self {
            solver: Default::default(),
            num_var: 0,
        }
    }

    pub fn new_var(&mut self) -> Var {
        let var = Var(self.num_var);
        self.num_var += 1;
        var
    }

    pub fn new_var_to(&mut self, var: Var) {
        if self.num_var <= var.0 {
            self.num_var = var.0 + 1;
        }
    }

    #[inline]
    pub fn num_var(&self) -> usize {
        self.num_var as usize
    }

    pub fn add_clause(&mut self, clause: &[Lit]) {
        self.solver.add_clause(clause.iter().map(|l| dimacs(*l)));
    }

    pub fn solve(&mut self, assumps: &[Lit]) -> bool {
        match self.solver.solve_with(assumps.iter().map(|l| dimacs(*l))) {
            Some(sat) => sat,
            None => panic!("sat backend failure"),
        }
    }

    /// Value of `lit` in the satisfying assignment of the last `solve`.
    #[inline]
    pub fn sat_value(&self, lit: Lit) -> Option<bool> {
        self.solver.value(dimacs(lit))
    }

    /// Whether the assumption `lit` is part of the final conflict of the
    /// last unsatisfiable `solve`.
    #[inline]
    pub fn unsat_has(&self, lit: Lit) -> bool {
        self.solver.failed(dimacs(lit))
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::Var;

    fn lit(v: usize, p: bool) -> Lit {
        Lit::new(Var::new(v), p)
    }

    #[test]
    fn solve_and_model() {
        let mut s = Solver::new();
        s.new_var_to(Var::new(2));
        s.add_clause(&[lit(1, true), lit(2, true)]);
        s.add_clause(&[!lit(1, true)]);
        assert!(s.solve(&[]));
        assert_eq!(s.sat_value(lit(2, true)), Some(true));
        assert_eq!(s.sat_value(lit(1, true)), Some(false));
    }

    #[test]
    fn unsat_core_over_assumptions() {
        let mut s = Solver::new();
        s.new_var_to(Var::new(3));
        s.add_clause(&[!lit(1, true), !lit(2, true)]);
        assert!(!s.solve(&[lit(1, true), lit(2, true), lit(3, true)]));
        assert!(s.unsat_has(lit(1, true)) || s.unsat_has(lit(2, true)));
        assert!(!s.unsat_has(lit(3, true)));
        // still usable incrementally
        assert!(s.solve(&[lit(1, true), lit(3, true)]));
    }

    #[test]
    fn activation_release() {
        let mut s = Solver::new();
        s.new_var_to(Var::new(1));
        let act = s.new_var().lit();
        s.add_clause(&[!lit(1, true), !act]);
        assert!(!s.solve(&[lit(1, true), act]));
        s.add_clause(&[!act]);
        assert!(s.solve(&[lit(1, true)]));
    }
}
