use anyhow::bail;
use clap::Parser;
use core::{num::NonZeroUsize, time::Duration};
use hashpipe::{BcryptHasher, ContainerConfig};

/// Runtime configuration for the `hashpipe-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a `.env`
/// file is loaded first), with defaults matching the reference deployment:
/// bcrypt cost 14 and a five second delay before each hash.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "hashpipe-server",
    version,
    about = "An HTTP service that hashes passwords asynchronously"
)]
pub struct CliArgs {
    /// Address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:8080"))]
    pub server_addr: String,

    /// Identifiers are issued starting at `ID_SEED + 1`.
    ///
    /// Environment variable: `ID_SEED`
    #[arg(long, env = "ID_SEED", default_value_t = 0)]
    pub id_seed: u64,

    /// bcrypt cost factor. Each increment doubles the time spent per hash.
    ///
    /// Environment variable: `HASH_COST`
    #[arg(long, env = "HASH_COST", default_value_t = BcryptHasher::DEFAULT_COST)]
    pub hash_cost: u32,

    /// Delay each job waits before hashing, in milliseconds.
    ///
    /// Environment variable: `HASH_DELAY_MS`
    #[arg(long, env = "HASH_DELAY_MS", default_value_t = 5_000)]
    pub hash_delay_ms: u64,

    /// Maximum number of jobs hashed concurrently. `0` spawns one worker per
    /// job without a bound.
    ///
    /// Environment variable: `MAX_WORKERS`
    #[arg(long, env = "MAX_WORKERS", default_value_t = 0)]
    pub max_workers: usize,

    /// Seconds to wait for the HTTP listener to close, and for in-flight
    /// submissions to finish, once shutdown begins. Outstanding jobs are always
    /// waited for regardless of this value.
    ///
    /// Environment variable: `SHUTDOWN_TIMEOUT`
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 5)]
    pub shutdown_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub id_seed: u64,
    pub hash_cost: u32,
    pub hash_delay: Duration,
    pub max_workers: Option<NonZeroUsize>,
    pub shutdown_timeout: Duration,
}

impl ServerConfig {
    pub fn container_config(&self) -> ContainerConfig {
        ContainerConfig {
            hash_delay: self.hash_delay,
            max_workers: self.max_workers,
        }
    }
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.server_addr.trim().is_empty() {
            bail!("SERVER_ADDR must not be empty");
        }

        if !(BcryptHasher::MIN_COST..=BcryptHasher::MAX_COST).contains(&args.hash_cost) {
            bail!(
                "HASH_COST ({}) must be between {} and {}",
                args.hash_cost,
                BcryptHasher::MIN_COST,
                BcryptHasher::MAX_COST
            );
        }

        if args.shutdown_timeout == 0 {
            bail!("SHUTDOWN_TIMEOUT must be greater than 0");
        }

        Ok(Self {
            server_addr: args.server_addr,
            id_seed: args.id_seed,
            hash_cost: args.hash_cost,
            hash_delay: Duration::from_millis(args.hash_delay_ms),
            max_workers: NonZeroUsize::new(args.max_workers),
            shutdown_timeout: Duration::from_secs(args.shutdown_timeout),
        })
    }
}
