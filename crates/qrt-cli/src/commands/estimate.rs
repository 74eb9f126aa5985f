//! Estimate command implementation.

use anyhow::Result;
use console::style;

use qrt_runtime::{Estimator, EstimatorOptions};

use super::common::{OutputFormat, load_circuit, parse_observable, print_json, spinner};

/// Execute the estimate command.
pub async fn execute(
    backend: &str,
    circuit: &str,
    observable: &str,
    shots: u32,
    seed: Option<u64>,
    sampling: bool,
    format: OutputFormat,
) -> Result<()> {
    let circuit = load_circuit(circuit)?;
    let op = parse_observable(observable)?;
    let estimator = Estimator::new(backend)?.with_options(EstimatorOptions {
        seed_simulator: seed,
        approximation: !sampling,
        ..EstimatorOptions::default()
    });

    if format == OutputFormat::Table {
        println!(
            "{} Estimating {} on {} with {} ({} shots)",
            style("→").cyan().bold(),
            style(observable).green(),
            style(circuit.name()).green(),
            style(backend).yellow(),
            shots
        );
    }

    let spinner = spinner("Estimating...")?;
    let job = estimator.run(std::slice::from_ref(&circuit), &[op], Some(shots))?;
    let result = job.result().await;
    spinner.finish_and_clear();
    let result = result?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            let meta = &result.metadata[0];
            println!(
                "\n{} <{}> = {}",
                style("✓").green().bold(),
                observable,
                style(format!("{:.6}", result.values[0])).yellow().bold()
            );
            println!("  Variance: {:.6}", meta.variance);
            println!(
                "  Standard error: {:.6}",
                (meta.variance / f64::from(meta.shots)).sqrt()
            );
            if let Some(sim) = &meta.simulator_metadata {
                println!("  Method: {}", style(sim.method).yellow());
            }
        }
    }

    Ok(())
}
