//! qpass Local Statevector Simulator
//!
//! Runs circuits on an exact statevector, measuring each shot as the
//! circuit reaches its measurements. Per-shot outcomes are kept in order,
//! which is what the entropy harvester consumes.
//!
//! The RNG can be seeded with [`SimulatorBackend::with_seed`] for
//! reproducible runs.
//!
//! # Example
//!
//! ```ignore
//! use qpass_adapter_sim::SimulatorBackend;
//! use qpass_hal::Backend;
//! use qpass_ir::Circuit;
//!
//! let backend = SimulatorBackend::with_seed(42);
//! let circuit = Circuit::coin_flip()?;
//! let job_id = backend.submit(&circuit, 128).await?;
//! let result = backend.wait(&job_id).await?;
//!
//! assert_eq!(result.concatenated_memory().unwrap().len(), 128);
//! ```

mod simulator;
mod statevector;

pub use simulator::SimulatorBackend;
