use clap::Parser;
use dgemm::{bench, timing::MonotonicClock, Config, Kernel};
use eyre::{Result, WrapErr};
use tracing::{debug, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(about = "Times a naive dense matrix multiply and reports GFLOP/s")]
struct Opt {
    #[clap(
        short = 'n',
        long = "size",
        env = "DGEMM_N",
        help = "matrix dimension, must be >= 0",
        default_value_t = 1024
    )]
    n: usize,
    #[clap(
        short,
        long,
        env = "DGEMM_SEED",
        help = "seed for the random inputs. fixes the stream, entropy seeded if not provided"
    )]
    seed: Option<u64>,
    #[clap(
        short,
        long,
        help = "loop order of the multiply: naive, ikj or blocked",
        default_value = "naive"
    )]
    kernel: Kernel,
    #[clap(
        short,
        long,
        help = "number of timed multiplications over the same inputs, the fastest is reported",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    repeat: u32,
    #[clap(
        long,
        help = "how many times to measure again when the clock does not advance",
        default_value_t = 3
    )]
    retries: u32,
}

impl From<Opt> for Config {
    fn from(opt: Opt) -> Self {
        Self {
            n: opt.n,
            seed: opt.seed,
            kernel: opt.kernel,
            repeat: opt.repeat,
            retries: opt.retries,
        }
    }
}

fn main() -> Result<()> {
    // stdout is reserved for the summary line
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let opt = Opt::parse();
    debug!(?opt, "parsed options");
    let config = Config::from(opt);
    let summary = bench::run(&config, &MonotonicClock::new())
        .wrap_err_with(|| format!("benchmark with n = {} failed", config.n))?;
    println!("{}", summary);
    Ok(())
}
