mod common;

use common::*;
use ipdr::config::{Config, Reuse};
use ipdr::{IC3, McResult};

#[test]
fn relaxed_counter_stays_safe_with_reuse() {
    // base run on the constrained model
    let base_ts = decade_counter();
    let mut base = IC3::new(Config::default(), base_ts.clone());
    assert_eq!(base.check(), McResult::Safe);
    assert!(base.verify());
    let prior = base.frame_cubes();
    assert!(!prior.is_empty());

    // relax the low counter bit: both even and odd starts are now legal
    let mut relaxed = base_ts;
    assert!(relaxed.relax_init(relaxed.latchs[0]));

    let mut fresh = IC3::new(Config::default(), relaxed.clone());
    assert_eq!(fresh.check(), McResult::Safe);
    assert!(fresh.verify());

    let mut reused = IC3::with_prior(
        Config::default(),
        relaxed.clone(),
        prior.clone(),
        Reuse::Cubes,
    );
    assert_eq!(reused.check(), McResult::Safe);
    assert!(reused.verify());
    assert!(
        reused.statistic().num_sat_call < fresh.statistic().num_sat_call,
        "reused run made {} sat calls, fresh run {}",
        reused.statistic().num_sat_call,
        fresh.statistic().num_sat_call,
    );

    let mut seeded = IC3::with_prior(Config::default(), relaxed, prior, Reuse::Frames);
    assert_eq!(seeded.check(), McResult::Safe);
    assert!(seeded.verify());
}

#[test]
fn relaxation_that_breaks_the_property_is_caught() {
    let base_ts = frozen();
    let mut base = IC3::new(Config::default(), base_ts.clone());
    assert_eq!(base.check(), McResult::Safe);
    assert!(base.verify());
    let prior = base.frame_cubes();
    assert!(!prior.is_empty());

    // the frozen latch may now start high, which is already bad
    let mut relaxed = base_ts;
    assert!(relaxed.relax_init(relaxed.latchs[0]));

    for mode in [Reuse::Cubes, Reuse::Frames] {
        let mut reused = IC3::with_prior(
            Config::default(),
            relaxed.clone(),
            prior.clone(),
            mode,
        );
        assert_eq!(reused.check(), McResult::Unsafe);
        assert_witness(&relaxed, &reused.witness());
    }
}

#[test]
fn reuse_of_an_empty_prior_behaves_like_fresh() {
    let ts = toggle();
    let mut reused = IC3::with_prior(Config::default(), ts.clone(), Vec::new(), Reuse::Cubes);
    assert_eq!(reused.check(), McResult::Unsafe);
    assert_witness(&ts, &reused.witness());

    let mut reused = IC3::with_prior(Config::default(), ts.clone(), Vec::new(), Reuse::Frames);
    assert_eq!(reused.check(), McResult::Unsafe);
    assert_witness(&ts, &reused.witness());
}

#[test]
fn relaxing_a_constraintless_latch_changes_nothing() {
    let mut ts = decade_counter();
    let latch = ts.latchs[0];
    assert!(ts.relax_init(latch));
    // second relaxation is a no-op
    assert!(!ts.relax_init(latch));
    let mut ic3 = IC3::new(Config::default(), ts);
    assert_eq!(ic3.check(), McResult::Safe);
    assert!(ic3.verify());
}
