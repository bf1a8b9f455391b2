use std::fmt::{self, Debug};
use std::ops::AddAssign;
use std::time::Duration;

#[derive(Clone, Copy, Default)]
pub struct SuccessRate {
    succ: usize,
    fail: usize,
}

impl SuccessRate {
    #[inline]
    pub fn success(&mut self) {
        self.succ += 1;
    }

    #[inline]
    pub fn fail(&mut self) {
        self.fail += 1;
    }
}

impl Debug for SuccessRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.succ + self.fail;
        let rate = if total == 0 {
            0.0
        } else {
            self.succ as f64 / total as f64 * 100.0
        };
        write!(f, "{}/{} ({rate:.1}%)", self.succ, total)
    }
}

#[derive(Clone, Copy, Default)]
pub struct Average {
    sum: usize,
    num: usize,
}

impl AddAssign<usize> for Average {
    #[inline]
    fn add_assign(&mut self, rhs: usize) {
        self.sum += rhs;
        self.num += 1;
    }
}

impl Debug for Average {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.num == 0 {
            write!(f, "-")
        } else {
            write!(f, "{:.2}", self.sum as f64 / self.num as f64)
        }
    }
}

#[derive(Debug, Default)]
pub struct Statistic {
    pub num_sat_call: usize,
    pub sat_time: Duration,

    pub num_get_bad: usize,
    pub num_cti: usize,
    pub num_ctg: usize,

    pub num_mic: usize,
    pub avg_mic_cube_len: Average,
    pub avg_po_cube_len: Average,
    pub mic_drop: SuccessRate,
    pub num_abort_mic: usize,
    pub num_abort_join: usize,

    pub num_solver_restart: usize,

    pub minimal_predecessor_time: Duration,
    pub overall_block_time: Duration,
    pub overall_propagate_time: Duration,
}
