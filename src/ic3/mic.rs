use super::IC3;
use crate::config::Config;
use crate::logic::{Cube, LitHashSet};

#[derive(Clone, Copy, Debug)]
pub enum MicType {
    /// keep the unsat-core reduction only
    NoMic,
    /// drop literals one by one, handling counterexamples to generalization
    DropVar,
}

impl MicType {
    pub fn from_config(cfg: &Config) -> Self {
        if cfg.basic {
            MicType::NoMic
        } else {
            MicType::DropVar
        }
    }
}

impl IC3 {
    /// The down part of generalization. Checks whether the candidate is
    /// inductive relative to `frame`; failing that, either blocks the
    /// counterexample-to-generalization one level lower or joins the
    /// candidate with it. `keep` literals were proven necessary and must
    /// survive every reduction.
    fn ctg_down(
        &mut self,
        frame: usize,
        cube: &Cube,
        keep: &LitHashSet,
        rec_depth: usize,
    ) -> Option<Cube> {
        let mut cube = cube.clone();
        let mut ctgs = 0;
        let mut joins = 0;
        loop {
            if self.ts.cube_subsume_init(&cube) {
                return None;
            }
            if self.blocked_with_ordered(frame, &cube, true) {
                let core = self.take_core().unwrap_or_else(|| cube.clone());
                if keep.iter().all(|l| core.contains(l)) {
                    return Some(core);
                }
                // the core dropped a kept literal; forgo the reduction
                return Some(cube);
            }
            let (model, _) = self.get_pred();
            if rec_depth < self.cfg.gen.ctg_depth
                && ctgs < self.cfg.gen.ctg_max
                && frame > 1
                && !self.ts.cube_subsume_init(&model)
                && self.blocked(frame - 1, &model, true)
            {
                ctgs += 1;
                self.statistic.num_ctg += 1;
                let core = self.take_core().unwrap_or(model);
                let mic = self.mic_by_drop_var(frame - 1, core, rec_depth + 1);
                let (at, mic) = self.push_lemma(frame - 1, mic);
                self.add_cube(at - 1, mic, false);
            } else {
                if joins >= self.cfg.gen.max_joins {
                    self.statistic.num_abort_join += 1;
                    return None;
                }
                joins += 1;
                ctgs = 0;
                let cex: LitHashSet = model.iter().copied().collect();
                let mut joined = Cube::new();
                for l in cube {
                    if cex.contains(&l) {
                        joined.push(l);
                    } else if keep.contains(&l) {
                        return None;
                    }
                }
                cube = joined;
            }
        }
    }

    fn mic_by_drop_var(&mut self, frame: usize, mut cube: Cube, rec_depth: usize) -> Cube {
        self.statistic.num_mic += 1;
        self.statistic.avg_mic_cube_len += cube.len();
        self.activity.sort_by_activity(&mut cube, true);
        let mut keep = LitHashSet::new();
        let mut attempts = self.cfg.gen.mic_attempts;
        let mut i = 0;
        while i < cube.len() {
            if keep.contains(&cube[i]) {
                i += 1;
                continue;
            }
            let mut removed_cube = cube.clone();
            removed_cube.remove(i);
            match self.ctg_down(frame, &removed_cube, &keep, rec_depth) {
                Some(new_cube) => {
                    self.statistic.mic_drop.success();
                    (cube, i) = Self::handle_down_success(&cube, i, new_cube);
                    attempts = self.cfg.gen.mic_attempts;
                }
                None => {
                    self.statistic.mic_drop.fail();
                    attempts -= 1;
                    if attempts == 0 {
                        self.statistic.num_abort_mic += 1;
                        break;
                    }
                    keep.insert(cube[i]);
                    i += 1;
                }
            }
        }
        cube
    }

    /// Restore the surviving literals to the scan order and find where the
    /// scan resumes: the first survivor not already processed.
    fn handle_down_success(cube: &Cube, i: usize, new_cube: Cube) -> (Cube, usize) {
        let survived: LitHashSet = new_cube.iter().copied().collect();
        let new_cube: Cube = cube.iter().filter(|l| survived.contains(l)).copied().collect();
        let new_i = new_cube
            .iter()
            .position(|l| !cube[0..i].contains(l))
            .unwrap_or(new_cube.len());
        (new_cube, new_i)
    }

    /// Reduce a blocking cube to a minimal inductive sub-cube.
    pub(super) fn mic(&mut self, frame: usize, cube: Cube, mic_type: MicType) -> Cube {
        match mic_type {
            MicType::NoMic => cube,
            MicType::DropVar => self.mic_by_drop_var(frame, cube, 0),
        }
    }
}
