//! Generate command implementation.

use anyhow::Result;
use console::style;
use tracing::warn;

use qpass_core::{Generation, GenerationRequest, generate, select_source};

use super::common::{IbmArgs, is_hardware, spinner};

/// Raw bits shown after generation.
const RAW_PREVIEW_BITS: usize = 64;

/// Execute the generate command.
pub async fn execute(length: u8, backend: &str, seed: Option<u64>, ibm: &IbmArgs) -> Result<()> {
    let request = GenerationRequest::new(usize::from(length), is_hardware(backend)?)?;
    if request.use_hardware() && seed.is_some() {
        warn!("--seed only applies to the simulator and is ignored");
    }

    let source = select_source(request.use_hardware(), ibm.credentials(), seed);
    println!(
        "{} Generating a {}-character password on {} ({} shots)",
        style("→").cyan().bold(),
        request.length(),
        style(source.name()).yellow(),
        request.requested_bits()
    );

    let progress = spinner("Harvesting Quantum Entropy...")?;
    let outcome = generate(&request, source.as_ref()).await;
    progress.finish_and_clear();

    print_generation(&outcome?);
    Ok(())
}

fn print_generation(generation: &Generation) {
    println!("\n{} Generation Complete!", style("✓").green().bold());
    println!();
    println!("  Password:       {}", style(&generation.password).cyan().bold());
    println!("  Backend used:   {}", style(&generation.device).yellow());
    if let Some(job_id) = &generation.job_id {
        println!("  Job:            {}", style(job_id).dim());
    }
    println!(
        "  Raw bits:       {}...",
        generation.raw_bits.preview(RAW_PREVIEW_BITS)
    );
    println!();
    println!(
        "  {}",
        style("Entropy source: Hadamard gate (H) on qubit 0").dim()
    );
}
