use clap::Parser;
use ipdr::config::Config;
use ipdr::frontend::Aig;
use ipdr::transys::Transys;
use ipdr::{IC3, McResult};
use log::{LevelFilter, error, warn};
use std::process::exit;
use std::time::Instant;

fn main() {
    let cfg = Config::parse();
    let mut level = match cfg.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if cfg.statistic {
        level = level.max(LevelFilter::Info);
    }
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    let aig = match Aig::from_file(&cfg.model) {
        Ok(aig) => aig,
        Err(e) => {
            println!("{e}");
            exit(0);
        }
    };
    let ts = match Transys::from_aig(&aig, cfg.property) {
        Ok(ts) => ts,
        Err(e) => {
            println!("{e}");
            exit(0);
        }
    };

    let mut ic3 = IC3::new(cfg.clone(), ts.clone());
    run(&cfg, &mut ic3);

    if let Some(index) = cfg.relax_init {
        let mut relaxed = ts;
        match relaxed.latchs.get(index).copied() {
            Some(latch) => {
                if !relaxed.relax_init(latch) {
                    warn!("latch {index} carries no reset constraint");
                }
            }
            None => {
                error!("latch index {index} out of range");
                exit(0);
            }
        }
        let mut second = match cfg.reuse {
            Some(mode) => IC3::with_prior(cfg.clone(), relaxed, ic3.frame_cubes(), mode),
            None => IC3::new(cfg.clone(), relaxed),
        };
        run(&cfg, &mut second);
    }
    exit(1);
}

fn run(cfg: &Config, ic3: &mut IC3) {
    let start = Instant::now();
    let result = ic3.check();
    match result {
        McResult::Safe => println!("1"),
        McResult::Unsafe => println!("0"),
    }
    println!("{:.3}", start.elapsed().as_secs_f64());
    match result {
        McResult::Safe => {
            if cfg.certify && !ic3.verify() {
                error!("extracted invariant failed verification");
            }
            for cube in ic3.invariant() {
                let clause = !&cube;
                let lits: Vec<String> = clause.iter().map(|l| l.to_string()).collect();
                println!("{}", lits.join(" "));
            }
        }
        McResult::Unsafe => {
            for inputs in ic3.witness().inputs {
                let lits: Vec<String> = inputs.iter().map(|l| l.to_string()).collect();
                println!("{}", lits.join(" "));
            }
        }
    }
    if cfg.statistic {
        ic3.log_statistic();
    }
}
