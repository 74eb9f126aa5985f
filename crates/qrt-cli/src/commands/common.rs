//! Shared helpers for CLI commands.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::ValueEnum;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use qrt_hal::Counts;
use qrt_ir::{Circuit, SparsePauliOp, reference};

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    Table,
    /// Pretty-printed JSON.
    Json,
}

/// Build a named reference circuit: `bell` or `ghz:N`.
pub fn load_circuit(spec: &str) -> Result<Circuit> {
    let spec = spec.trim().to_lowercase();
    match spec.split_once(':') {
        None if spec == "bell" => Ok(reference::bell()?),
        Some(("ghz", n)) => {
            let n: u32 = n
                .parse()
                .with_context(|| format!("Invalid GHZ size: '{n}'"))?;
            if n == 0 {
                anyhow::bail!("GHZ circuits need at least one qubit");
            }
            Ok(reference::ghz(n)?)
        }
        _ => anyhow::bail!("Unknown circuit: '{spec}'. Available: bell, ghz:N"),
    }
}

/// Parse an observable: a single label (`ZZ`) or comma-separated
/// `label:coefficient` terms (`XX:0.5,ZI:2`).
pub fn parse_observable(spec: &str) -> Result<SparsePauliOp> {
    let terms = spec
        .split(',')
        .map(|term| {
            let term = term.trim();
            match term.split_once(':') {
                Some((label, coeff)) => {
                    let coeff: f64 = coeff
                        .trim()
                        .parse()
                        .with_context(|| format!("Invalid coefficient in '{term}'"))?;
                    Ok((label.trim().to_string(), coeff))
                }
                None => Ok((term.to_string(), 1.0)),
            }
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(SparsePauliOp::from_list(terms)?)
}

/// A steady-ticking spinner with `message`.
pub fn spinner(message: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

/// Print a probability table with bars, most likely outcome first.
pub fn print_probabilities(title: &str, probabilities: &[(String, f64)]) {
    println!("\n{} {}:", style("✓").green().bold(), title);

    let mut sorted = probabilities.to_vec();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    for (bitstring, prob) in sorted.iter().take(16) {
        let bar_len = (prob * 50.0).round() as usize;
        println!(
            "  {}: {:>7.4} {}",
            style(bitstring).cyan(),
            prob,
            style("█".repeat(bar_len)).green()
        );
    }

    if sorted.len() > 16 {
        println!("  ... and {} more outcomes", sorted.len() - 16);
    }
}

/// Print measurement counts with percentages.
pub fn print_counts(counts: &Counts, shots: u32) {
    println!("\n{} Results ({} shots):", style("✓").green().bold(), shots);

    let sorted = counts.sorted();
    let total = counts.total_shots().max(1) as f64;

    for (bitstring, count) in sorted.iter().take(16) {
        let prob = **count as f64 / total * 100.0;
        let bar_len = (prob / 2.0).round() as usize;
        println!(
            "  {}: {:>6} ({:>5.2}%) {}",
            style(bitstring).cyan(),
            count,
            prob,
            style("█".repeat(bar_len)).green()
        );
    }

    if sorted.len() > 16 {
        println!("  ... and {} more outcomes", sorted.len() - 16);
    }
}

/// Print `value` as pretty JSON.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_circuit() {
        assert_eq!(load_circuit("bell").unwrap().num_qubits(), 2);
        assert_eq!(load_circuit("GHZ:4").unwrap().num_qubits(), 4);
        assert!(load_circuit("ghz:0").is_err());
        assert!(load_circuit("ghz:many").is_err());
        assert!(load_circuit("qft").is_err());
    }

    #[test]
    fn test_parse_observable() {
        let zz = parse_observable("ZZ").unwrap();
        assert_eq!(zz.labels(), vec!["ZZ".to_string()]);

        let mixed = parse_observable("XX:0.5, ZI:2").unwrap();
        assert_eq!(mixed.len(), 2);
        assert_eq!(mixed.coeffs()[0].re, 0.5);
        assert_eq!(mixed.coeffs()[1].re, 2.0);

        assert!(parse_observable("XX:half").is_err());
        assert!(parse_observable("XX,Z").is_err());
        assert!(parse_observable("AB").is_err());
    }
}
