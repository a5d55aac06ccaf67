mod cache;
mod config;
mod error;
mod prefetch;
mod replace;
mod trace;

use std::{fs, process};

use cache::IsCache;
use log::{error, info};
use trace::{Access, Trace};

use crate::{
    config::Config,
    error::{SimError, TraceError},
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        error!("{err}");
        process::exit(1);
    }
}

fn run() -> Result<(), SimError> {
    let mut args = pico_args::Arguments::from_env();
    let n_warm: u64 = args.opt_value_from_str("-w")?.unwrap_or(0);
    let n_access: u64 = args.opt_value_from_str("-n")?.unwrap_or(u64::MAX);
    let heartbeat_int: u64 = args.opt_value_from_str("-h")?.unwrap_or(0);

    let config_str: String = if let Some(config_str) = args.opt_value_from_str("--config")? {
        config_str
    } else {
        let config_path: String = args
            .opt_value_from_str("-p")?
            .ok_or(SimError::Usage(
                "Must provide a config with --config <json> or -p <path>",
            ))?;
        fs::read_to_string(config_path)?
    };
    let config: Config = serde_json::from_str(&config_str)?;
    let mut caches = config.to_caches()?;
    for cache in &caches {
        info!("Simulating cache {}", cache.name());
    }

    let stats_path: Option<String> = args.opt_value_from_str("--json")?;
    let trace_path: String = args
        .opt_value_from_str("-t")?
        .ok_or(SimError::Usage("Must provide a trace with -t"))?;
    let accesses_per_block: usize = args
        .opt_value_from_str("--buffer-size")?
        .unwrap_or(1024 * 16);
    let blocks_per_queue: usize = args.opt_value_from_str("--queue-size")?.unwrap_or(32);

    let trace = Trace::read(trace_path.into(), accesses_per_block, blocks_per_queue)?;

    let limits = Limits {
        warmup: n_warm,
        accesses: n_access,
        heartbeat: heartbeat_int,
    };
    let n_done = simulate(&mut caches, trace.rec.iter(), limits)?;
    info!("Ran {n_done} accesses");

    let stats = caches.iter().map(|c| c.make_stats()).collect::<Vec<_>>();
    match stats_path {
        Some(path) => serde_json::to_writer_pretty(fs::File::create(path)?, &stats)?,
        None => println!("{}", serde_json::to_string_pretty(&stats)?),
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct Limits {
    warmup: u64,
    accesses: u64,
    heartbeat: u64,
}

/// Feeds trace blocks to the caches until the trace ends or `limits.accesses`
/// accesses have been measured after warmup. Returns the accesses simulated.
fn simulate(
    caches: &mut [Box<dyn IsCache>],
    blocks: impl IntoIterator<Item = Result<Vec<Access>, TraceError>>,
    limits: Limits,
) -> Result<u64, SimError> {
    let mut n_done = 0u64;
    let mut next_heartbeat = limits.heartbeat;
    let mut warmup = limits.warmup > 0;
    let mut goal = if warmup {
        limits.warmup
    } else {
        limits.accesses
    };

    'trace: for block in blocks {
        for access in block? {
            if warmup && n_done >= goal {
                caches.iter_mut().for_each(|c| c.clear_stats());
                goal = n_done.saturating_add(limits.accesses);
                warmup = false;
                info!("Finished Warmup!");
            }
            if n_done >= goal {
                break 'trace;
            }

            operate(caches, access)?;
            n_done += 1;

            if limits.heartbeat != 0 && n_done >= next_heartbeat {
                info!("Accesses: {n_done}");
                next_heartbeat += limits.heartbeat;
            }
        }
    }
    if warmup && n_done >= goal {
        caches.iter_mut().for_each(|c| c.clear_stats());
    }
    Ok(n_done)
}

/// Every cache sees every access; they are independent, not levels.
fn operate(caches: &mut [Box<dyn IsCache>], access: Access) -> Result<(), SimError> {
    for cache in caches.iter_mut() {
        cache.access(access.addr, access.op)?;
    }
    Ok(())
}
