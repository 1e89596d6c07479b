use anyhow::Context;
use log::{
    info,
    warn,
};

use sembench::cli::Args;
use sembench::{
    logger,
    Benchmark,
    RunConfig,
};

fn main() -> anyhow::Result<()> {
    let args = Args::parse_lenient(std::env::args_os()).unwrap_or_else(|e| e.exit());

    logger::init(args.verbose).context("failed to install logger")?;
    for arg in &args.ignored {
        warn!("unknown option '{}', ignoring", arg);
    }

    let config = RunConfig::try_from(args).context("bad arguments")?;
    info!("{:?}", config);

    let bench = Benchmark::new(config).context("failed to set up semaphore pool")?;

    println!("spawning {} processes", config.nprocs);
    println!("running {} semop iterations per process", config.niters);

    let summary = bench.run().context("benchmark run failed")?;
    println!("{}", summary);

    Ok(())
}
