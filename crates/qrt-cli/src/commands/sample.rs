//! Sample command implementation.

use anyhow::Result;
use console::style;

use qrt_hal::SimulationMethod;
use qrt_runtime::{Sampler, SamplerOptions};

use super::common::{OutputFormat, load_circuit, print_json, print_probabilities, spinner};

/// Execute the sample command.
pub async fn execute(
    backend: &str,
    circuit: &str,
    shots: u32,
    seed: Option<u64>,
    method: Option<SimulationMethod>,
    format: OutputFormat,
) -> Result<()> {
    let circuit = load_circuit(circuit)?;
    let sampler = Sampler::new(backend)?.with_options(SamplerOptions {
        seed_simulator: seed,
        method,
        ..SamplerOptions::default()
    });

    if format == OutputFormat::Table {
        println!(
            "{} Sampling {} on {} ({} shots)",
            style("→").cyan().bold(),
            style(circuit.name()).green(),
            style(backend).yellow(),
            shots
        );
    }

    let spinner = spinner("Sampling...")?;
    let job = sampler.run(std::slice::from_ref(&circuit), Some(shots))?;
    spinner.set_message(format!("Waiting for job {}...", job.job_id()));
    let result = job.result().await;
    spinner.finish_and_clear();
    let result = result?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            let probabilities: Vec<(String, f64)> = result.quasi_dists[0]
                .binary_probabilities(circuit.num_clbits())
                .into_iter()
                .collect();
            print_probabilities("Quasi-probabilities", &probabilities);

            let meta = &result.metadata[0];
            println!(
                "\n  Method: {}  Seed: {}  Measure sampling: {}  Noise: {}",
                style(meta.simulator_metadata.method).yellow(),
                meta.seed_simulator,
                meta.simulator_metadata.measure_sampling,
                meta.simulator_metadata.noise
            );
        }
    }

    Ok(())
}
