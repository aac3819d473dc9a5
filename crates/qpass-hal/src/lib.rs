//! qpass Hardware Abstraction Layer
//!
//! A common [`Backend`] trait over the local simulator and remote devices,
//! with [`Capabilities`] describing each target and [`ExecutionResult`]
//! carrying both aggregated [`Counts`] and ordered per-shot memory.
//!
//! | Backend | Crate | Authentication |
//! |---------|-------|----------------|
//! | Local Simulator | `qpass-adapter-sim` | None |
//! | IBM Quantum | `qpass-adapter-ibm` | API key or bearer token |
//!
//! # Example: Running a Circuit
//!
//! ```ignore
//! use qpass_hal::Backend;
//! use qpass_adapter_sim::SimulatorBackend;
//! use qpass_ir::Circuit;
//!
//! let circuit = Circuit::coin_flip()?;
//! let backend = SimulatorBackend::new();
//!
//! let job_id = backend.submit(&circuit, 128).await?;
//! let result = backend.wait(&job_id).await?;
//!
//! // One character per shot, in execution order
//! let bits = result.concatenated_memory().unwrap();
//! assert_eq!(bits.len(), 128);
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod result;

pub use backend::{Backend, BackendConfig, BackendFactory, ValidationResult};
pub use capability::{Capabilities, GateSet};
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use result::{Counts, ExecutionResult};
