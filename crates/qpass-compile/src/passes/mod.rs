//! Built-in compilation passes.
//!
//! - [`layout`]: place virtual qubits on the device
//! - [`translation`]: rewrite gates into the device's native set
//! - [`optimization`]: simplify single-qubit gate runs
//! - [`verification`]: final basis check

pub mod layout;
pub mod optimization;
pub mod translation;
pub mod verification;

pub use layout::{ApplyLayout, TrivialLayout};
pub use optimization::{Optimize1qGates, RemoveDiagonalBeforeMeasure};
pub use translation::BasisTranslation;
pub use verification::BasisVerification;
