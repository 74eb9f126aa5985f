//! Backends command implementation.

use anyhow::Result;
use console::style;
use futures::future::join_all;

use qrt_runtime::{Channel, FakeRuntimeService};

/// Execute the backends command.
pub async fn execute() -> Result<()> {
    println!("{} Available backends:\n", style("qrt").cyan().bold());

    let service = FakeRuntimeService::new(Channel::Local, "")?;
    let backends = service
        .backends()
        .into_iter()
        .map(|name| service.backend(&name))
        .collect::<Result<Vec<_>, _>>()?;

    let availability = join_all(backends.iter().map(|b| b.availability())).await;

    for (backend, available) in backends.iter().zip(availability) {
        let available = available.is_ok_and(|a| a.is_available);
        let caps = backend.capabilities();
        println!(
            "  {} {} {}",
            if available {
                style("●").green()
            } else {
                style("○").red()
            },
            style(backend.name()).bold(),
            if caps.is_simulator { "(simulator)" } else { "(fake device)" }
        );
        println!("    Qubits: {}", caps.num_qubits);
        println!("    Max shots: {}", caps.max_shots);
        println!(
            "    Gates: {}",
            caps.gate_set
                .native
                .join(", ")
                .chars()
                .take(50)
                .collect::<String>()
        );
        if !caps.features.is_empty() {
            println!("    Features: {}", caps.features.join(", "));
        }
        println!();
    }

    Ok(())
}
