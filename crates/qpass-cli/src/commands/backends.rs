//! Backends command implementation.

use anyhow::Result;
use console::style;

use qpass_adapter_ibm::{BackendInfo, IbmClient, select_least_busy};
use qpass_core::Error;

use super::common::{IbmArgs, spinner};

/// Execute the backends command.
pub async fn execute(ibm: &IbmArgs) -> Result<()> {
    let credentials = ibm.credentials().ok_or(Error::MissingCredential)?;

    let progress = spinner("Querying IBM Quantum devices...")?;
    let listing = async {
        let client = IbmClient::from_credentials(&credentials).await?;
        client.list_backends().await
    }
    .await;
    progress.finish_and_clear();

    let devices = listing.map_err(Error::from)?;
    let chosen = select_least_busy(devices.clone()).map(|b| b.name);

    println!("{} IBM Quantum devices:\n", style("qpass").cyan().bold());
    for device in &devices {
        print_device(device, chosen.as_deref() == Some(device.name.as_str()));
    }

    match chosen {
        Some(name) => println!("Least busy: {}", style(name).green().bold()),
        None => println!("{}", style("No operational hardware device available").yellow()),
    }

    Ok(())
}

fn print_device(device: &BackendInfo, least_busy: bool) {
    let marker = if !device.status.operational {
        style("○").red()
    } else if least_busy {
        style("★").green()
    } else {
        style("●").green()
    };
    let kind = if device.simulator { " (simulator)" } else { "" };
    let family = device
        .processor_type
        .as_ref()
        .map(|p| format!(" [{}]", p.family))
        .unwrap_or_default();

    println!("  {} {}{}{}", marker, style(&device.name).bold(), family, kind);
    println!("    Qubits: {}", device.num_qubits);
    println!(
        "    Queue:  {}",
        device
            .status
            .pending_jobs
            .map_or_else(|| "unknown".to_string(), |n| format!("{n} pending"))
    );
    if let Some(msg) = &device.status.status_msg {
        println!("    Status: {msg}");
    }
    if !device.basis_gates.is_empty() {
        println!("    Gates:  {}", device.basis_gates.join(", "));
    }
    println!();
}
