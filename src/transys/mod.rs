use crate::frontend::aig::to_lit;
use crate::frontend::{Aig, AigerError};
use crate::logic::{Clause, Cube, Lit, Var, VarMap};
use crate::sat::Solver;
use log::warn;

/// The lowered transition system consumed by the engine. The gate network
/// is present twice, a current-state copy and a next-state copy shifted by
/// `offset`, with the next-state latch variables tied to the current-state
/// next functions. Every solver the engine owns loads `trans` exactly once.
#[derive(Clone, Debug)]
pub struct Transys {
    pub inputs: Vec<Var>,
    pub latchs: Vec<Var>,
    pub init: Cube,
    pub bad: Lit,
    pub init_map: VarMap<Option<bool>>,
    pub constraints: Vec<Lit>,
    trans: Vec<Clause>,
    is_latch: VarMap<bool>,
    offset: u32,
    max_var: Var,
}

impl Transys {
    pub fn from_aig(aig: &Aig, property: usize) -> Result<Self, AigerError> {
        let mut bads = aig.bads.clone();
        if bads.is_empty() && !aig.outputs.is_empty() {
            warn!(
                "property not found, treating {} outputs as bad properties",
                aig.outputs.len()
            );
            bads = aig.outputs.clone();
        }
        if bads.is_empty() {
            return Err(AigerError::NoProperty);
        }
        let bad = *bads.get(property).ok_or(AigerError::BadProperty(property))?;

        let offset = aig.max_var;
        let max_var = Var::new((2 * offset) as usize);
        let prime = |l: Lit| {
            if l.var() == Var::CONST {
                l
            } else {
                Lit::new(Var(l.var().0 + offset), l.polarity())
            }
        };

        let mut trans = vec![Clause::from([Lit::constant(true)])];
        for and in aig.ands.iter() {
            let g = Var::new(and.lhs as usize).lit();
            let r0 = to_lit(and.rhs0);
            let r1 = to_lit(and.rhs1);
            for cls in [
                Clause::from([!g, r0]),
                Clause::from([!g, r1]),
                Clause::from([g, !r0, !r1]),
            ] {
                trans.push(cls.iter().map(|l| prime(*l)).collect());
                trans.push(cls);
            }
        }

        let mut latchs = Vec::new();
        let mut init = Cube::new();
        let mut init_map = VarMap::new_with(max_var);
        let mut is_latch = VarMap::new_with(max_var);
        for l in aig.latchs.iter() {
            let lv = Var::new(l.input as usize);
            latchs.push(lv);
            is_latch[lv] = true;
            if let Some(i) = l.init {
                init_map[lv] = Some(i);
                init.push(lv.lit().not_if(!i));
            }
            let lp = prime(lv.lit());
            let n = to_lit(l.next);
            trans.push(Clause::from([!lp, n]));
            trans.push(Clause::from([lp, !n]));
        }
        latchs.sort();
        init.sort_by_var();

        Ok(Self {
            inputs: aig.inputs.iter().map(|v| Var::new(*v as usize)).collect(),
            latchs,
            init,
            bad: to_lit(bad),
            init_map,
            constraints: aig.constraints.iter().map(|c| to_lit(*c)).collect(),
            trans,
            is_latch,
            offset,
            max_var,
        })
    }

    #[inline]
    pub fn max_var(&self) -> Var {
        self.max_var
    }

    /// The next-state copy of a literal.
    #[inline]
    pub fn lit_next(&self, lit: Lit) -> Lit {
        if lit.var() == Var::CONST {
            lit
        } else {
            Lit::new(Var(lit.var().0 + self.offset), lit.polarity())
        }
    }

    /// Back from the next-state copy.
    #[inline]
    pub fn lit_prev(&self, lit: Lit) -> Lit {
        if lit.var() == Var::CONST {
            lit
        } else {
            debug_assert!(lit.var().0 > self.offset);
            Lit::new(Var(lit.var().0 - self.offset), lit.polarity())
        }
    }

    #[inline]
    pub fn cube_next(&self, cube: &[Lit]) -> Cube {
        cube.iter().map(|l| self.lit_next(*l)).collect()
    }

    #[inline]
    pub fn bad_next(&self) -> Lit {
        self.lit_next(self.bad)
    }

    #[inline]
    pub fn is_latch(&self, var: Var) -> bool {
        self.is_latch[var]
    }

    pub fn load_trans(&self, solver: &mut Solver) {
        solver.new_var_to(self.max_var);
        for cls in self.trans.iter() {
            solver.add_clause(cls);
        }
        for c in self.constraints.iter() {
            solver.add_clause(&[*c]);
            solver.add_clause(&[self.lit_next(*c)]);
        }
    }

    pub fn load_init(&self, solver: &mut Solver) {
        for i in self.init.iter() {
            solver.add_clause(&[*i]);
        }
    }

    /// Whether the cube agrees with the initial states on every constrained
    /// latch, i.e. whether it contains an initial state.
    #[inline]
    pub fn cube_subsume_init(&self, cube: &[Lit]) -> bool {
        for l in cube.iter() {
            if let Some(init) = self.init_map[l.var()] {
                if init != l.polarity() {
                    return false;
                }
            }
        }
        true
    }

    /// Relaxation: drop the reset constraint of one latch, strictly
    /// enlarging the initial region.
    pub fn relax_init(&mut self, latch: Var) -> bool {
        if self.init_map[latch].is_none() {
            return false;
        }
        self.init_map[latch] = None;
        self.init.retain(|l| l.var() != latch);
        true
    }

    /// Relaxation: delete an invariant constraint.
    pub fn remove_constraint(&mut self, lit: Lit) -> bool {
        let len = self.constraints.len();
        self.constraints.retain(|c| *c != lit);
        self.constraints.len() != len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toggle() -> Transys {
        let aig = Aig::parse(b"aag 1 0 1 1 0\n2 3\n2\n").unwrap();
        Transys::from_aig(&aig, 0).unwrap()
    }

    #[test]
    fn prime_shift() {
        let ts = toggle();
        let l = ts.latchs[0].lit();
        assert_eq!(ts.lit_next(l).var(), Var::new(2));
        assert_eq!(ts.lit_next(!l), !ts.lit_next(l));
        assert_eq!(ts.lit_next(Lit::constant(true)), Lit::constant(true));
        assert_eq!(ts.lit_prev(ts.lit_next(l)), l);
        assert_eq!(ts.lit_prev(ts.lit_next(!l)), !l);
        assert_eq!(ts.bad, l);
        assert_eq!(ts.bad_next(), ts.lit_next(l));
    }

    #[test]
    fn init_subsumption() {
        let ts = toggle();
        let l = ts.latchs[0].lit();
        assert!(ts.cube_subsume_init(&[!l]));
        assert!(!ts.cube_subsume_init(&[l]));
        assert!(ts.cube_subsume_init(&[]));
    }

    #[test]
    fn relax_init_enlarges() {
        let mut ts = toggle();
        let latch = ts.latchs[0];
        assert_eq!(ts.init.len(), 1);
        assert!(ts.relax_init(latch));
        assert!(ts.init.is_empty());
        assert!(ts.cube_subsume_init(&[latch.lit()]));
        assert!(!ts.relax_init(latch));
    }

    #[test]
    fn transition_is_deterministic_in_solver() {
        let ts = toggle();
        let mut solver = Solver::new();
        ts.load_trans(&mut solver);
        let l = ts.latchs[0].lit();
        // latch false now forces latch true next
        assert!(solver.solve(&[!l, ts.lit_next(l)]));
        assert!(!solver.solve(&[!l, ts.lit_next(!l)]));
    }
}
