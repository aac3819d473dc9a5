//! qpass Circuit Intermediate Representation
//!
//! Core data structures for the small circuits qpass runs to harvest entropy:
//! qubits, classical bits, single-qubit gates and measurement instructions,
//! wrapped in a [`Circuit`] builder.
//!
//! The instruction list is kept in program order. Entropy circuits are a
//! handful of operations on one qubit, so there is no graph representation.
//!
//! # Example: The Coin-Flip Circuit
//!
//! ```rust
//! use qpass_ir::{Circuit, QubitId};
//!
//! // One qubit, Hadamard, measure into a fresh `meas` register
//! let mut circuit = Circuit::with_size("coin_flip", 1, 0);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 1);
//! assert_eq!(circuit.num_clbits(), 1);
//! assert_eq!(circuit.clbit_register(), "meas");
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Description |
//! |------|-------------|
//! | `I` | Identity |
//! | `X`, `Y`, `Z` | Pauli gates |
//! | `H` | Hadamard gate |
//! | `S`, `Sdg`, `T`, `Tdg` | Phase gates |
//! | `SX` | sqrt(X), native on IBM devices |
//! | `Rx`, `Ry`, `Rz` | Rotation gates |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::{Circuit, MEASURE_REGISTER};
pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{Clbit, ClbitId, Qubit, QubitId};
