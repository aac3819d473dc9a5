//! Entropy sources.
//!
//! An [`EntropySource`] prepares one qubit in equal superposition, measures
//! it once per shot and returns the outcomes in shot order. Two sources
//! exist: [`LocalEntropySource`] runs on the bundled statevector simulator
//! and [`RemoteEntropySource`] runs on the least busy IBM Quantum device.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use qpass_adapter_ibm::{IbmBackend, IbmClient, IbmCredentials};
use qpass_adapter_sim::SimulatorBackend;
use qpass_compile::{BasisGates, transpile};
use qpass_hal::{Backend, BackendConfig, BackendFactory, ValidationResult};
use qpass_ir::Circuit;

use crate::bits::BitString;
use crate::error::{CoreResult, Error};

/// Preset optimization level used for hardware transpilation.
pub const DEFAULT_OPTIMIZATION_LEVEL: u8 = 1;

/// Bits harvested from one backend run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Harvest {
    /// Measurement outcomes in shot order.
    pub bits: BitString,
    /// Name of the backend that produced the bits.
    pub device: String,
    /// Backend job identifier.
    pub job_id: Option<String>,
}

/// A source of measured random bits.
#[async_trait]
pub trait EntropySource: Send + Sync {
    /// Short name of the source.
    fn name(&self) -> &str;

    /// Whether the bits come from quantum hardware.
    fn is_hardware(&self) -> bool {
        false
    }

    /// Run the coin-flip circuit `count` times.
    ///
    /// On success the harvest holds exactly `count` bits.
    async fn harvest(&self, count: u32) -> CoreResult<Harvest>;

    /// Like [`harvest`](Self::harvest), keeping only the bits.
    async fn produce_bits(&self, count: u32) -> CoreResult<BitString> {
        Ok(self.harvest(count).await?.bits)
    }
}

fn check_count(count: u32) -> CoreResult<()> {
    if count == 0 {
        return Err(Error::InvalidBitCount(count));
    }
    Ok(())
}

/// Submit `circuit` for `count` shots, wait, and collect the per-shot bits.
///
/// The circuit must run on `backend` as is.
async fn run_on(backend: &dyn Backend, circuit: &Circuit, count: u32) -> CoreResult<Harvest> {
    match backend.validate(circuit).await? {
        ValidationResult::Valid => {}
        ValidationResult::Invalid { reasons } => {
            return Err(Error::QuantumBackend(format!(
                "circuit rejected by {}: {}",
                backend.name(),
                reasons.join("; ")
            )));
        }
        ValidationResult::RequiresTranspilation { details } => {
            return Err(Error::QuantumBackend(format!(
                "circuit not executable on {}: {details}",
                backend.name()
            )));
        }
    }

    let job_id = backend.submit(circuit, count).await?;
    debug!("submitted job {} to {}", job_id, backend.name());

    let result = backend.wait(&job_id).await?;
    let memory = result.concatenated_memory().ok_or_else(|| {
        Error::QuantumBackend(format!(
            "backend {} returned no per-shot samples",
            backend.name()
        ))
    })?;

    let bits = BitString::parse(&memory)
        .map_err(|e| Error::QuantumBackend(format!("malformed samples: {e}")))?;
    if bits.len() != count as usize {
        return Err(Error::QuantumBackend(format!(
            "expected {count} bits but backend returned {}",
            bits.len()
        )));
    }

    Ok(Harvest {
        bits,
        device: backend.name().to_string(),
        job_id: Some(job_id.0),
    })
}

// ============================================================================
// Local simulator
// ============================================================================

/// Harvests bits from the local statevector simulator.
///
/// Requests larger than the simulator's shot limit run as consecutive jobs
/// on the same simulator; the harvest reports the first job's id.
#[derive(Debug, Clone, Default)]
pub struct LocalEntropySource {
    seed: Option<u64>,
}

impl LocalEntropySource {
    /// Create a source seeded from OS entropy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source whose outcomes are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }
}

#[async_trait]
impl EntropySource for LocalEntropySource {
    fn name(&self) -> &str {
        "simulator"
    }

    #[instrument(skip(self))]
    async fn harvest(&self, count: u32) -> CoreResult<Harvest> {
        check_count(count)?;

        let mut config = BackendConfig::new("simulator");
        if let Some(seed) = self.seed {
            config = config.with_extra("seed", serde_json::json!(seed));
        }
        let backend = SimulatorBackend::from_config(config)?;
        let circuit = Circuit::coin_flip()?;

        let max_shots = backend.capabilities().max_shots.max(1);
        let mut bits = String::with_capacity(count as usize);
        let mut job_id = None;
        let mut remaining = count;
        while remaining > 0 {
            let shots = remaining.min(max_shots);
            let part = run_on(&backend, &circuit, shots).await?;
            bits.push_str(part.bits.as_str());
            if job_id.is_none() {
                job_id = part.job_id;
            }
            remaining -= shots;
        }
        if count > max_shots {
            debug!("split {count} shots into jobs of at most {max_shots}");
        }

        Ok(Harvest {
            bits: BitString::parse(&bits)?,
            device: backend.name().to_string(),
            job_id,
        })
    }
}

// ============================================================================
// IBM Quantum hardware
// ============================================================================

/// Harvests bits from the least busy IBM Quantum hardware device.
///
/// The circuit is transpiled to the device basis and submitted as a single
/// Sampler job with one shot per requested bit.
#[derive(Debug, Clone)]
pub struct RemoteEntropySource {
    credentials: Option<IbmCredentials>,
    optimization_level: u8,
    poll_interval: Option<Duration>,
}

impl RemoteEntropySource {
    /// Create a source. Without credentials every harvest fails with
    /// [`Error::MissingCredential`].
    pub fn new(credentials: Option<IbmCredentials>) -> Self {
        Self {
            credentials,
            optimization_level: DEFAULT_OPTIMIZATION_LEVEL,
            poll_interval: None,
        }
    }

    /// Set the transpiler optimization level (0-3).
    #[must_use]
    pub fn with_optimization_level(mut self, level: u8) -> Self {
        self.optimization_level = level;
        self
    }

    /// Override the job status poll delay.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Whether a credential is configured.
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }
}

#[async_trait]
impl EntropySource for RemoteEntropySource {
    fn name(&self) -> &str {
        "ibm"
    }

    fn is_hardware(&self) -> bool {
        true
    }

    #[instrument(skip(self))]
    async fn harvest(&self, count: u32) -> CoreResult<Harvest> {
        check_count(count)?;
        let credentials = self.credentials.as_ref().ok_or(Error::MissingCredential)?;

        let client = Arc::new(IbmClient::from_credentials(credentials).await?);
        let mut backend = IbmBackend::least_busy(client).await?;
        if let Some(interval) = self.poll_interval {
            backend = backend.with_poll_interval(interval);
        }

        let circuit = Circuit::coin_flip()?;
        let isa = transpile(
            &circuit,
            backend.capabilities().num_qubits,
            BasisGates::new(backend.basis_gates().iter().cloned()),
            self.optimization_level,
        )?;
        info!(
            "transpiled for {} ({} instructions)",
            backend.target(),
            isa.instructions().len()
        );

        run_on(&backend, &isa, count).await
    }
}

/// Pick the source for a request.
pub fn select_source(
    use_hardware: bool,
    credentials: Option<IbmCredentials>,
    seed: Option<u64>,
) -> Box<dyn EntropySource> {
    if use_hardware {
        Box::new(RemoteEntropySource::new(credentials))
    } else {
        match seed {
            Some(seed) => Box::new(LocalEntropySource::with_seed(seed)),
            None => Box::new(LocalEntropySource::new()),
        }
    }
}

/// Produce exactly `requested_bits` random bits.
///
/// Uses the simulator unless `use_hardware` is set, in which case
/// `credentials` must be present.
pub async fn produce_bits(
    requested_bits: u32,
    use_hardware: bool,
    credentials: Option<IbmCredentials>,
) -> CoreResult<BitString> {
    select_source(use_hardware, credentials, None)
        .produce_bits(requested_bits)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_returns_requested_bits() {
        for count in [1, 7, 20, 128] {
            let bits = LocalEntropySource::new().produce_bits(count).await.unwrap();
            assert_eq!(bits.len(), count as usize);
            assert!(bits.as_str().chars().all(|c| c == '0' || c == '1'));
        }
    }

    #[tokio::test]
    async fn test_local_seed_reproducible() {
        let a = LocalEntropySource::with_seed(7).harvest(64).await.unwrap();
        let b = LocalEntropySource::with_seed(7).harvest(64).await.unwrap();
        assert_eq!(a.bits, b.bits);
        assert_eq!(a.device, "simulator");
        assert!(a.job_id.is_some());
    }

    #[tokio::test]
    async fn test_local_bits_not_constant() {
        let bits = LocalEntropySource::with_seed(3).produce_bits(256).await.unwrap();
        let ones = bits.as_str().chars().filter(|&c| c == '1').count();
        assert!(ones > 64 && ones < 192, "ones = {ones}");
    }

    #[tokio::test]
    async fn test_zero_bits_rejected() {
        let err = LocalEntropySource::new().harvest(0).await.unwrap_err();
        assert!(matches!(err, Error::InvalidBitCount(0)));

        let err = RemoteEntropySource::new(None).harvest(0).await.unwrap_err();
        assert!(matches!(err, Error::InvalidBitCount(0)));
    }

    #[tokio::test]
    async fn test_hardware_without_credential() {
        let err = produce_bits(16, true, None).await.unwrap_err();
        assert!(matches!(err, Error::MissingCredential));
    }

    #[tokio::test]
    async fn test_empty_token_is_missing_credential() {
        let source = RemoteEntropySource::new(Some(
            IbmCredentials::new("").with_endpoint("http://127.0.0.1:9"),
        ));
        let err = source.harvest(8).await.unwrap_err();
        assert!(matches!(err, Error::MissingCredential));
    }

    #[tokio::test]
    async fn test_local_beyond_simulator_shot_limit() {
        let limit = SimulatorBackend::new().capabilities().max_shots;
        let count = limit + 1;

        let harvest = LocalEntropySource::with_seed(1).harvest(count).await.unwrap();
        assert_eq!(harvest.bits.len(), count as usize);
        assert!(harvest.job_id.is_some());

        // Seeded runs stay reproducible across job boundaries.
        let again = LocalEntropySource::with_seed(1).harvest(count).await.unwrap();
        assert_eq!(harvest.bits, again.bits);
        let ones = harvest.bits.as_str().chars().filter(|&c| c == '1').count();
        assert!(ones > 0 && ones < count as usize);
    }

    #[tokio::test]
    async fn test_run_on_rejects_invalid_circuit() {
        let backend = SimulatorBackend::with_max_qubits(1);
        let mut circuit = Circuit::with_size("wide", 2, 2);
        circuit.measure_all().unwrap();

        let err = run_on(&backend, &circuit, 4).await.unwrap_err();
        match err {
            Error::QuantumBackend(msg) => assert!(msg.starts_with("circuit rejected"), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_select_source() {
        assert_eq!(select_source(false, None, None).name(), "simulator");
        assert_eq!(select_source(false, None, Some(1)).name(), "simulator");
        assert_eq!(select_source(true, None, None).name(), "ibm");
        assert!(!select_source(false, None, None).is_hardware());
        assert!(select_source(true, None, None).is_hardware());
    }
}
