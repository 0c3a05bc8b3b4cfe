//! riemannfs binary.
//!
//! Mounts a Riemann event index as a read-only filesystem.
//!
//! Usage:
//!   riemannfs --mount-point /mnt/riemann
//!   riemannfs --host riemann.internal --port 5555 --mount-point /mnt/riemann --debug
//!
//! Then:
//!   cat /mnt/riemann/web1/cpu/Metric
//!   ls '/mnt/riemann/.query/state = "critical"/'
//!
//! Ctrl-C unmounts.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use riemannfs_client::constants::{CONNECT_TIMEOUT, DEFAULT_HOST, DEFAULT_PORT, QUERY_TIMEOUT};
use riemannfs_client::StoreConfig;
use riemannfs_kernel::{EventFs, QueryFailurePolicy};
use riemannfs_mount::{EventFuse, MountConfig};

/// Read-only filesystem over a Riemann event index.
#[derive(Parser, Debug)]
#[command(name = "riemannfs")]
#[command(about = "Mount a Riemann event index as a read-only filesystem")]
struct Args {
    /// Riemann server host
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Riemann server TCP port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Directory to mount on
    #[arg(long)]
    mount_point: PathBuf,

    /// Log at debug level (overrides RUST_LOG)
    #[arg(long)]
    debug: bool,

    /// Fail filesystem calls when a query fails instead of showing empty listings
    #[arg(long)]
    strict: bool,

    /// Let other users access the mount (needs user_allow_other in /etc/fuse.conf).
    /// Also enables auto_unmount, so a killed process leaves no stale mount.
    #[arg(long)]
    allow_other: bool,

    /// Seconds to wait for a query response
    #[arg(long, default_value_t = QUERY_TIMEOUT.as_secs())]
    query_timeout_secs: u64,

    /// Seconds to wait for the TCP connection
    #[arg(long, default_value_t = CONNECT_TIMEOUT.as_secs())]
    connect_timeout_secs: u64,
}

impl Args {
    fn into_config(self) -> MountConfig {
        let store = StoreConfig {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            query_timeout: Duration::from_secs(self.query_timeout_secs),
            ..StoreConfig::new(self.host, self.port)
        };
        MountConfig {
            mount_point: self.mount_point,
            allow_other: self.allow_other,
            policy: if self.strict {
                QueryFailurePolicy::Strict
            } else {
                QueryFailurePolicy::Lenient
            },
            store,
        }
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.debug);

    match run(args.into_config()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("riemannfs: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: MountConfig) -> Result<()> {
    let owner = config.validate()?;

    let store = riemannfs_client::connect(config.store.clone())
        .await
        .with_context(|| format!("cannot connect to Riemann at {}", config.store.address()))?;

    let fs = EventFs::with_policy(Arc::new(store.clone()), config.policy);
    let fuse = EventFuse::new(fs, tokio::runtime::Handle::current(), owner);
    let session = fuser::spawn_mount2(fuse, &config.mount_point, &config.mount_options())
        .with_context(|| format!("cannot mount on {}", config.mount_point.display()))?;

    tracing::info!(
        mount_point = %config.mount_point.display(),
        server = %config.store.address(),
        policy = ?config.policy,
        "riemannfs mounted"
    );

    let signal = tokio::signal::ctrl_c().await;

    // Dropping the session unmounts and joins the FUSE thread, which may be
    // parked in a runtime call.
    tokio::task::spawn_blocking(move || drop(session))
        .await
        .context("unmount task failed")?;
    store.shutdown().await;
    tracing::info!("riemannfs unmounted");

    signal.context("cannot listen for Ctrl-C")
}
