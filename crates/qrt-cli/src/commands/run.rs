//! Run command implementation.

use anyhow::Result;
use console::style;
use tracing::debug;

use qrt_hal::{RunOptions, SimulationMethod};
use qrt_runtime::BackendTarget;

use super::common::{OutputFormat, load_circuit, print_counts, print_json, spinner};

/// Execute the run command.
pub async fn execute(
    backend: &str,
    circuit: &str,
    shots: u32,
    seed: Option<u64>,
    method: Option<SimulationMethod>,
    memory: bool,
    format: OutputFormat,
) -> Result<()> {
    let circuit = load_circuit(circuit)?;
    let backend_impl = BackendTarget::from(backend).resolve()?;
    debug!(
        "Resolved backend {} ({} qubits)",
        backend_impl.name(),
        backend_impl.capabilities().num_qubits
    );

    if format == OutputFormat::Table {
        println!(
            "{} Running {} on {} ({} shots)",
            style("→").cyan().bold(),
            style(circuit.name()).green(),
            style(backend).yellow(),
            shots
        );
        println!(
            "  Loaded: {} qubits, depth {}",
            circuit.num_qubits(),
            circuit.depth()
        );
    }

    let avail = backend_impl.availability().await?;
    if !avail.is_available {
        anyhow::bail!("Backend '{backend}' is not available");
    }

    let mut options = RunOptions::new(shots).with_memory(memory);
    options.seed_simulator = seed;
    options.method = method;

    let spinner = spinner("Submitting job...")?;
    let job_id = backend_impl
        .submit(std::slice::from_ref(&circuit), &options)
        .await?;
    spinner.set_message(format!("Running job {job_id}..."));
    let result = backend_impl.wait(&job_id).await;
    spinner.finish_and_clear();
    let result = result?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            for exp in &result.results {
                print_counts(&exp.counts, exp.shots);
                println!(
                    "\n  Method: {}  Seed: {}  Measure sampling: {}",
                    style(exp.metadata.method).yellow(),
                    exp.seed_simulator,
                    exp.metadata.measure_sampling
                );
                if let Some(memory) = &exp.memory {
                    let shown: Vec<&str> = memory.iter().take(8).map(String::as_str).collect();
                    println!("  Memory: {} ...", shown.join(" "));
                }
            }
            println!(
                "\n  Execution time: {} ms",
                style(format!("{:.2}", result.time_taken * 1000.0)).yellow()
            );
        }
    }

    Ok(())
}
