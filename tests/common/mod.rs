#![allow(dead_code)]

use ipdr::Witness;
use ipdr::frontend::Aig;
use ipdr::sat::Solver;
use ipdr::transys::Transys;

/// x ^ y out of and gates; aiger literals, low bit negates.
pub fn xor(aig: &mut Aig, x: u32, y: u32) -> u32 {
    let a = aig.new_and(x, y ^ 1);
    let b = aig.new_and(x ^ 1, y);
    aig.new_and(a ^ 1, b ^ 1) ^ 1
}

fn lower(aig: &Aig) -> Transys {
    Transys::from_aig(aig, 0).unwrap()
}

/// One latch stuck at reset; bad when it rises.
pub fn const_safe() -> Transys {
    let mut aig = Aig::new();
    let l = aig.new_latch(0, Some(false));
    aig.bads.push(l);
    lower(&aig)
}

/// One latch inverting every step; bad when set.
pub fn toggle() -> Transys {
    let mut aig = Aig::new();
    let l = aig.new_latch(0, Some(false));
    aig.latchs[0].next = l ^ 1;
    aig.bads.push(l);
    lower(&aig)
}

/// The property fails in the initial state itself.
pub fn bad_init() -> Transys {
    let mut aig = Aig::new();
    let l = aig.new_latch(0, Some(true));
    aig.bads.push(l);
    lower(&aig)
}

/// No latches at all; the bad signal is a constant.
pub fn const_bad(value: bool) -> Transys {
    let mut aig = Aig::new();
    aig.bads.push(if value { 1 } else { 0 });
    lower(&aig)
}

/// The latch copies a free input; bad when set.
pub fn input_unsafe() -> Transys {
    let mut aig = Aig::new();
    let i = aig.new_input();
    let l = aig.new_latch(i, Some(false));
    aig.bads.push(l);
    lower(&aig)
}

/// The latch can only stay down: next = latch & input.
pub fn guarded_safe() -> Transys {
    let mut aig = Aig::new();
    let i = aig.new_input();
    let l = aig.new_latch(0, Some(false));
    let g = aig.new_and(l, i);
    aig.latchs[0].next = g;
    aig.bads.push(l);
    lower(&aig)
}

/// Two latches swapping every step from (1,0); bad when both are up.
pub fn mutex() -> Transys {
    let mut aig = Aig::new();
    let l1 = aig.new_latch(0, Some(true));
    let l2 = aig.new_latch(0, Some(false));
    aig.latchs[0].next = l2;
    aig.latchs[1].next = l1;
    let both = aig.new_and(l1, l2);
    aig.bads.push(both);
    lower(&aig)
}

/// Four latches counting 0..15 and wrapping; bad at 15. Unsafe with a
/// fifteen-step trace.
pub fn counter_to_15() -> Transys {
    let mut aig = Aig::new();
    let b0 = aig.new_latch(0, Some(false));
    let b1 = aig.new_latch(0, Some(false));
    let b2 = aig.new_latch(0, Some(false));
    let b3 = aig.new_latch(0, Some(false));
    let c01 = aig.new_and(b0, b1);
    let c012 = aig.new_and(c01, b2);
    let n1 = xor(&mut aig, b1, b0);
    let n2 = xor(&mut aig, b2, c01);
    let n3 = xor(&mut aig, b3, c012);
    aig.latchs[0].next = b0 ^ 1;
    aig.latchs[1].next = n1;
    aig.latchs[2].next = n2;
    aig.latchs[3].next = n3;
    let lo = aig.new_and(b0, b1);
    let hi = aig.new_and(b2, b3);
    let bad = aig.new_and(lo, hi);
    aig.bads.push(bad);
    lower(&aig)
}

/// A decade counter: counts 0..9 then resets, so 10..15 are unreachable,
/// while 10..14 would run straight into 15. Safe, with an invariant that
/// takes several frames to converge.
pub fn decade_counter() -> Transys {
    let mut aig = Aig::new();
    let b0 = aig.new_latch(0, Some(false));
    let b1 = aig.new_latch(0, Some(false));
    let b2 = aig.new_latch(0, Some(false));
    let b3 = aig.new_latch(0, Some(false));
    let c01 = aig.new_and(b0, b1);
    let c012 = aig.new_and(c01, b2);
    let i0 = b0 ^ 1;
    let i1 = xor(&mut aig, b1, b0);
    let i2 = xor(&mut aig, b2, c01);
    let i3 = xor(&mut aig, b3, c012);
    // nine = b0 & !b1 & !b2 & b3
    let t = aig.new_and(b0, b1 ^ 1);
    let u = aig.new_and(t, b2 ^ 1);
    let nine = aig.new_and(u, b3);
    let n0 = aig.new_and(i0, nine ^ 1);
    let n1 = aig.new_and(i1, nine ^ 1);
    let n2 = aig.new_and(i2, nine ^ 1);
    let n3 = aig.new_and(i3, nine ^ 1);
    aig.latchs[0].next = n0;
    aig.latchs[1].next = n1;
    aig.latchs[2].next = n2;
    aig.latchs[3].next = n3;
    let lo = aig.new_and(b0, b1);
    let hi = aig.new_and(b2, b3);
    let bad = aig.new_and(lo, hi);
    aig.bads.push(bad);
    lower(&aig)
}

/// A frozen latch feeding a follower; bad when the follower rises. The
/// blocking lemma over the frozen latch is only sound while its reset
/// constraint stands, so relaxing it breaks the property.
pub fn frozen() -> Transys {
    let mut aig = Aig::new();
    let l = aig.new_latch(0, Some(false));
    let m = aig.new_latch(l, Some(false));
    aig.latchs[0].next = l;
    aig.bads.push(m);
    lower(&aig)
}

/// Replay a counterexample: the first state is initial, every step is a
/// real transition under the recorded inputs, and the last one enters the
/// bad states.
pub fn assert_witness(ts: &Transys, witness: &Witness) {
    assert!(!witness.states.is_empty());
    assert_eq!(witness.states.len(), witness.inputs.len());
    assert!(ts.cube_subsume_init(&witness.states[0]));
    let mut solver = Solver::new();
    ts.load_trans(&mut solver);
    for i in 0..witness.states.len() {
        let mut assumps = witness.states[i].clone();
        assumps.extend_from_slice(&witness.inputs[i]);
        if i + 1 < witness.states.len() {
            assumps.extend_from_slice(&ts.cube_next(&witness.states[i + 1]));
            assert!(solver.solve(&assumps), "witness step {i} is not a transition");
        } else {
            // the final state either violates the property itself or
            // steps into the bad states
            let mut now = assumps.clone();
            now.push(ts.bad);
            let mut next = assumps;
            next.push(ts.bad_next());
            assert!(
                solver.solve(&now) || solver.solve(&next),
                "witness does not end in the bad states"
            );
        }
    }
}
