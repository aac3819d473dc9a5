//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - passwords from quantum measurement",
        style("qpass").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qpass-ir       Circuit intermediate representation");
    println!("  qpass-compile  Transpilation to device basis gates");
    println!("  qpass-hal      Hardware abstraction layer");
    println!("  qpass-core     Entropy sources and password assembly");
    println!("  qpass-cli      Command-line interface");
    println!();
    println!("Backends: simulator (local), ibm (IBM Quantum)");
    println!("License:  {}", style("Apache-2.0").dim());
}
