use crate::config::GeneralizeConfig;
use crate::logic::{Lit, Var, VarMap};

/// Counts-based literal order. Every added lemma bumps the counter of its
/// variables; the counters decay periodically so recent lemmas dominate.
/// Cubes ordered ascending put the least-used literal first, the one mic
/// tries to drop first; assumption vectors are ordered descending to bias
/// SAT decisions toward busy variables.
pub struct Activity {
    activity: VarMap<f64>,
    num_updates: usize,
    min_touched: usize,
    decay_interval: usize,
    decay: f64,
}

impl Activity {
    pub fn new(max_var: Var, cfg: &GeneralizeConfig) -> Self {
        Self {
            activity: VarMap::new_with(max_var),
            num_updates: 0,
            min_touched: usize::MAX,
            decay_interval: cfg.decay_interval,
            decay: cfg.decay,
        }
    }

    pub fn update(&mut self, cube: &[Lit]) {
        self.num_updates += 1;
        if self.decay_interval > 0 && self.num_updates % self.decay_interval == 0 {
            self.decay();
        }
        for l in cube.iter() {
            self.min_touched = self.min_touched.min(usize::from(l.var()));
            self.activity[l.var()] += 1.0;
        }
    }

    fn decay(&mut self) {
        for a in self.activity.iter_mut().skip(self.min_touched) {
            *a *= self.decay;
        }
    }

    pub fn sort_by_activity(&self, cube: &mut [Lit], ascending: bool) {
        if ascending {
            cube.sort_by(|a, b| {
                self.activity[a.var()]
                    .total_cmp(&self.activity[b.var()])
                    .then(a.var().cmp(&b.var()))
            });
        } else {
            cube.sort_by(|a, b| {
                self.activity[b.var()]
                    .total_cmp(&self.activity[a.var()])
                    .then(b.var().cmp(&a.var()))
            });
        }
    }
}
