//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - local runtime primitives on simulated backends",
        style("qrt").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qrt-ir            Circuits and Pauli observables");
    println!("  qrt-hal           Backend abstraction");
    println!("  qrt-adapter-sim   Local simulator");
    println!("  qrt-adapter-fake  Fake device backends");
    println!("  qrt-runtime       Sampler, estimator and runtime service");
    println!("  qrt-cli           Command-line interface");
    println!();
    println!("License: {}", style("Apache-2.0").dim());
}
