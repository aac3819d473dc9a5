//! End-to-end password generation.

use tracing::{info, instrument};

use crate::bits::{BITS_PER_CHUNK, BitString};
use crate::entropy::EntropySource;
use crate::error::{CoreResult, Error};
use crate::password::{Alphabet, Password, assemble};

/// Parameters of one generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationRequest {
    length: usize,
    use_hardware: bool,
}

impl GenerationRequest {
    /// Create a request for a password of `length` characters.
    ///
    /// Fails with [`Error::InvalidLength`] for zero, or for a length whose
    /// bit count overflows a `u32` shot count.
    pub fn new(length: usize, use_hardware: bool) -> CoreResult<Self> {
        let fits = length
            .checked_mul(BITS_PER_CHUNK)
            .is_some_and(|bits| u32::try_from(bits).is_ok());
        if length == 0 || !fits {
            return Err(Error::InvalidLength(length));
        }
        Ok(Self {
            length,
            use_hardware,
        })
    }

    /// Requested password length.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Whether hardware was requested.
    pub fn use_hardware(&self) -> bool {
        self.use_hardware
    }

    /// Number of bits (shots) needed: eight per character.
    pub fn requested_bits(&self) -> u32 {
        // Bounded in `new`.
        (self.length * BITS_PER_CHUNK) as u32
    }
}

/// Outcome of a generation request.
#[derive(Debug, Clone)]
pub struct Generation {
    /// The assembled password.
    pub password: Password,
    /// Every harvested bit, in shot order.
    pub raw_bits: BitString,
    /// Backend that produced the bits.
    pub device: String,
    /// Backend job identifier.
    pub job_id: Option<String>,
}

/// Generate a password from the standard alphabet.
pub async fn generate(
    request: &GenerationRequest,
    source: &dyn EntropySource,
) -> CoreResult<Generation> {
    generate_with(request, source, &Alphabet::standard()).await
}

/// Generate a password from a custom alphabet.
///
/// The source must match the request: a hardware request needs a hardware
/// source and a simulator request a simulated one.
#[instrument(skip(source, alphabet), fields(source = source.name()))]
pub async fn generate_with(
    request: &GenerationRequest,
    source: &dyn EntropySource,
    alphabet: &Alphabet,
) -> CoreResult<Generation> {
    if request.use_hardware() != source.is_hardware() {
        return Err(Error::SourceMismatch {
            requested: if request.use_hardware() {
                "hardware"
            } else {
                "simulator"
            },
            actual: source.name().to_string(),
        });
    }

    let harvest = source.harvest(request.requested_bits()).await?;
    let password = assemble(&harvest.bits, alphabet);
    info!(
        "assembled {} characters from {} bits on {}",
        password.len(),
        harvest.bits.len(),
        harvest.device
    );

    Ok(Generation {
        password,
        raw_bits: harvest.bits,
        device: harvest.device,
        job_id: harvest.job_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::{Harvest, LocalEntropySource, RemoteEntropySource};
    use async_trait::async_trait;

    /// Returns a fixed bit pattern regardless of count.
    struct Fixed(&'static str);

    #[async_trait]
    impl EntropySource for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn harvest(&self, _count: u32) -> CoreResult<Harvest> {
            Ok(Harvest {
                bits: BitString::parse(self.0)?,
                device: "fixed".into(),
                job_id: None,
            })
        }
    }

    #[test]
    fn test_request_validation() {
        assert!(matches!(
            GenerationRequest::new(0, false),
            Err(Error::InvalidLength(0))
        ));
        assert!(GenerationRequest::new(usize::MAX, false).is_err());

        let request = GenerationRequest::new(16, true).unwrap();
        assert_eq!(request.length(), 16);
        assert!(request.use_hardware());
        assert_eq!(request.requested_bits(), 128);
    }

    #[tokio::test]
    async fn test_simulator_sixteen_characters() {
        let request = GenerationRequest::new(16, false).unwrap();
        let generation = generate(&request, &LocalEntropySource::with_seed(5))
            .await
            .unwrap();

        let alphabet = Alphabet::standard();
        assert_eq!(generation.raw_bits.len(), 128);
        assert_eq!(generation.password.len(), 16);
        assert!(generation.password.as_str().chars().all(|c| alphabet.contains(c)));
        assert_eq!(generation.device, "simulator");
    }

    #[tokio::test]
    async fn test_known_bits() {
        let request = GenerationRequest::new(2, false).unwrap();
        let generation = generate(&request, &Fixed("0000000000000001")).await.unwrap();
        assert_eq!(generation.password.as_str(), "ab");
    }

    #[tokio::test]
    async fn test_custom_alphabet() {
        let request = GenerationRequest::new(2, false).unwrap();
        let alphabet = Alphabet::new("01".chars()).unwrap();
        let generation = generate_with(&request, &Fixed("0000001100000100"), &alphabet)
            .await
            .unwrap();
        assert_eq!(generation.password.as_str(), "10");
    }

    #[tokio::test]
    async fn test_source_must_match_request() {
        let request = GenerationRequest::new(8, true).unwrap();
        let err = generate(&request, &LocalEntropySource::with_seed(1))
            .await
            .unwrap_err();
        match err {
            Error::SourceMismatch { requested, actual } => {
                assert_eq!(requested, "hardware");
                assert_eq!(actual, "simulator");
            }
            other => panic!("unexpected error: {other}"),
        }

        let request = GenerationRequest::new(8, false).unwrap();
        let err = generate(&request, &RemoteEntropySource::new(None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SourceMismatch { requested: "simulator", .. }));
    }

    #[tokio::test]
    async fn test_beyond_simulator_shot_limit() {
        let request = GenerationRequest::new(12_501, false).unwrap();
        let generation = generate(&request, &LocalEntropySource::with_seed(2))
            .await
            .unwrap();
        assert_eq!(generation.raw_bits.len(), 100_008);
        assert_eq!(generation.password.len(), 12_501);
    }

    #[tokio::test]
    async fn test_hardware_without_credential_yields_no_password() {
        let request = GenerationRequest::new(8, true).unwrap();
        let err = generate(&request, &RemoteEntropySource::new(None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingCredential));
    }
}
