use clap::{ArgAction, Args, Parser, ValueEnum};
use std::path::PathBuf;

/// incremental IC3/PDR model checker for AIGER safety properties
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Config {
    /// input aiger file, ascii or binary
    pub model: PathBuf,

    /// property index to check
    #[arg(default_value_t = 0)]
    pub property: usize,

    /// verbose; repeat for more detail
    #[arg(short, action = ArgAction::Count)]
    pub verbose: u8,

    /// print statistics after the run
    #[arg(short = 's')]
    pub statistic: bool,

    /// randomize lift and propagation orderings, for profiling
    #[arg(short = 'r')]
    pub random: bool,

    /// basic generalization: shrink blocking cubes by unsat core only
    #[arg(short = 'b')]
    pub basic: bool,

    /// verify the inductive invariant after a safe verdict
    #[arg(long)]
    pub certify: bool,

    /// re-check with the reset constraint of the given latch removed
    #[arg(long, value_name = "LATCH")]
    pub relax_init: Option<usize>,

    /// reuse the first run's frames for the relaxed re-check
    #[arg(long, value_enum, requires = "relax_init")]
    pub reuse: Option<Reuse>,

    #[command(flatten)]
    pub gen: GeneralizeConfig,
}

/// How a relaxed re-check consumes the previous run's frames.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reuse {
    /// front-load every previous border cube as a proof obligation
    Cubes,
    /// additionally seed the frames, revalidated against the relaxed model
    Frames,
}

/// Generalization and literal-order tunables.
#[derive(Args, Debug, Clone)]
pub struct GeneralizeConfig {
    /// recursion depth of counterexample-to-generalization handling
    #[arg(long = "ctg-depth", default_value_t = 1)]
    pub ctg_depth: usize,

    /// max ctgs blocked per generalization attempt
    #[arg(long = "ctg-max", default_value_t = 3)]
    pub ctg_max: usize,

    /// max joins per mic call
    #[arg(long = "max-joins", default_value_t = 1 << 20)]
    pub max_joins: usize,

    /// consecutive failed drops before mic gives up
    #[arg(long = "mic-attempts", default_value_t = 3)]
    pub mic_attempts: usize,

    /// literal-order updates between decays
    #[arg(long = "act-decay-interval", default_value_t = 1000)]
    pub decay_interval: usize,

    /// literal-order decay factor
    #[arg(long = "act-decay", default_value_t = 0.99)]
    pub decay: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config::parse_from(["ipdr", "-"])
    }
}

impl Default for GeneralizeConfig {
    fn default() -> Self {
        Self {
            ctg_depth: 1,
            ctg_max: 3,
            max_joins: 1 << 20,
            mic_attempts: 3,
            decay_interval: 1000,
            decay: 0.99,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tunable_contract() {
        let cfg = Config::default();
        assert_eq!(cfg.property, 0);
        assert_eq!(cfg.gen.ctg_depth, 1);
        assert_eq!(cfg.gen.ctg_max, 3);
        assert_eq!(cfg.gen.max_joins, 1 << 20);
        assert_eq!(cfg.gen.mic_attempts, 3);
        assert_eq!(cfg.gen.decay_interval, 1000);
        assert!(!cfg.basic && !cfg.random);
    }

    #[test]
    fn flags_parse() {
        let cfg = Config::parse_from(["ipdr", "model.aig", "3", "-v", "-v", "-s", "-b"]);
        assert_eq!(cfg.property, 3);
        assert_eq!(cfg.verbose, 2);
        assert!(cfg.statistic && cfg.basic);
        let cfg = Config::parse_from(["ipdr", "m.aig", "--relax-init", "0", "--reuse", "cubes"]);
        assert_eq!(cfg.relax_init, Some(0));
        assert_eq!(cfg.reuse, Some(Reuse::Cubes));
    }
}
