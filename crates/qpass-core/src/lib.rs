//! Quantum password generation.
//!
//! Random bits come from measuring a qubit in equal superposition, either on
//! the local simulator or on IBM Quantum hardware. Every 8 bits select one
//! character of a 70-character alphabet.
//!
//! # Example
//!
//! ```no_run
//! use qpass_core::{GenerationRequest, LocalEntropySource, generate};
//!
//! # async fn example() -> qpass_core::CoreResult<()> {
//! let request = GenerationRequest::new(16, false)?;
//! let generation = generate(&request, &LocalEntropySource::new()).await?;
//! println!("{}", generation.password);
//! # Ok(())
//! # }
//! ```

pub mod bits;
pub mod entropy;
pub mod error;
pub mod generate;
pub mod password;

pub use bits::{BITS_PER_CHUNK, BitString};
pub use entropy::{
    DEFAULT_OPTIMIZATION_LEVEL, EntropySource, Harvest, LocalEntropySource, RemoteEntropySource,
    produce_bits, select_source,
};
pub use error::{CoreResult, Error};
pub use generate::{Generation, GenerationRequest, generate, generate_with};
pub use password::{Alphabet, Password, assemble};

pub use qpass_adapter_ibm::IbmCredentials;
