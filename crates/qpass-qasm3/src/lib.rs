//! `OpenQASM` 3 Emitter for qpass
//!
//! Serializes a [`qpass_ir::Circuit`] into `OpenQASM` 3.0 source, the program
//! format accepted by the IBM Quantum Sampler primitive.
//!
//! | Construct | Virtual circuit | Physical circuit |
//! |-----------|-----------------|------------------|
//! | Qubit declaration | `qubit[1] q;` | none |
//! | Qubit reference | `q[0]` | `$0` |
//! | Classical bits | `bit[1] meas;` | `bit[1] meas;` |
//! | Measurement | `meas[0] = measure q[0];` | `meas[0] = measure $0;` |
//!
//! # Example
//!
//! ```rust
//! use qpass_ir::Circuit;
//! use qpass_qasm3::emit;
//!
//! let circuit = Circuit::coin_flip().unwrap();
//! let qasm = emit(&circuit).unwrap();
//!
//! assert!(qasm.starts_with("OPENQASM 3.0;"));
//! assert!(qasm.contains("h q[0];"));
//! assert!(qasm.contains("meas[0] = measure q[0];"));
//! ```

pub mod emitter;
pub mod error;

pub use emitter::emit;
pub use error::{EmitError, EmitResult};
