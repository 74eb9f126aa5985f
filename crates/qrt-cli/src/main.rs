//! qrt Command-Line Interface
//!
//! Sample circuits, estimate observables and run jobs on the local
//! simulator and fake device backends.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use qrt_hal::SimulationMethod;
use qrt_runtime::Channel;

mod commands;

use commands::common::OutputFormat;
use commands::{account, backends, estimate, run, sample, version};

/// qrt - local runtime primitives on simulated quantum backends
#[derive(Parser)]
#[command(name = "qrt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available backends
    Backends,

    /// Sample a circuit with the sampler primitive
    Sample {
        /// Backend name (fake_manila, local_simulator, ...)
        #[arg(short, long, default_value = "local_simulator")]
        backend: String,

        /// Circuit to run (bell, ghz:N)
        #[arg(short, long, default_value = "bell")]
        circuit: String,

        /// Number of shots
        #[arg(short, long, default_value = "1024")]
        shots: u32,

        /// Simulator seed
        #[arg(long)]
        seed: Option<u64>,

        /// Simulation method
        #[arg(short, long)]
        method: Option<SimulationMethod>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Estimate an observable with the estimator primitive
    Estimate {
        /// Backend name (fake_manila, local_simulator, ...)
        #[arg(short, long, default_value = "local_simulator")]
        backend: String,

        /// Circuit to prepare (bell, ghz:N)
        #[arg(short, long, default_value = "bell")]
        circuit: String,

        /// Observable, e.g. ZZ or "XX:0.5,ZI:2"
        #[arg(short, long)]
        observable: String,

        /// Number of shots
        #[arg(short, long, default_value = "1024")]
        shots: u32,

        /// Seed for shot noise and sampling
        #[arg(long)]
        seed: Option<u64>,

        /// Measure Pauli terms instead of using exact values
        #[arg(long)]
        sampling: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Run a circuit directly on a backend
    Run {
        /// Backend name (fake_manila, local_simulator, ...)
        #[arg(short, long, default_value = "local_simulator")]
        backend: String,

        /// Circuit to run (bell, ghz:N)
        #[arg(short, long, default_value = "bell")]
        circuit: String,

        /// Number of shots
        #[arg(short, long, default_value = "1024")]
        shots: u32,

        /// Simulator seed
        #[arg(long)]
        seed: Option<u64>,

        /// Simulation method
        #[arg(short, long)]
        method: Option<SimulationMethod>,

        /// Keep per-shot bitstrings
        #[arg(long)]
        memory: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Manage saved accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum AccountAction {
    /// Save an account
    Save {
        /// Account name
        #[arg(short, long, default_value = qrt_runtime::account::DEFAULT_ACCOUNT)]
        name: String,

        /// Channel (ibm_quantum, ibm_cloud, local)
        #[arg(long, default_value = "ibm_quantum")]
        channel: Channel,

        /// Access token
        #[arg(long, env = "QRT_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Service instance
        #[arg(long)]
        instance: Option<String>,

        /// Replace an existing account of the same name
        #[arg(long)]
        overwrite: bool,
    },

    /// Show saved accounts
    Show {
        /// Account name (all accounts if omitted)
        #[arg(short, long)]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Backends => backends::execute().await,

        Commands::Sample {
            backend,
            circuit,
            shots,
            seed,
            method,
            format,
        } => sample::execute(&backend, &circuit, shots, seed, method, format).await,

        Commands::Estimate {
            backend,
            circuit,
            observable,
            shots,
            seed,
            sampling,
            format,
        } => {
            estimate::execute(
                &backend,
                &circuit,
                &observable,
                shots,
                seed,
                sampling,
                format,
            )
            .await
        }

        Commands::Run {
            backend,
            circuit,
            shots,
            seed,
            method,
            memory,
            format,
        } => run::execute(&backend, &circuit, shots, seed, method, memory, format).await,

        Commands::Account { action } => match action {
            AccountAction::Save {
                name,
                channel,
                token,
                instance,
                overwrite,
            } => account::execute_save(&name, channel, token, instance, overwrite),
            AccountAction::Show { name } => account::execute_show(name.as_deref()),
        },

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
