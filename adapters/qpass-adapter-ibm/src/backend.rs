//! IBM Quantum backend implementation.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tracing::{debug, info, instrument};

use qpass_hal::{
    Backend, Capabilities, Counts, ExecutionResult, GateSet, HalError,
    HalResult, JobId, JobStatus, ValidationResult,
};
use qpass_ir::Circuit;
use qpass_qasm3::emit;

use crate::api::{BackendInfo, IbmClient, JobResultResponse};
use crate::error::{IbmError, IbmResult};

/// Delay between job status polls. Hardware queues move in seconds.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// The classical register a submitted job measures into.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MeasuredRegister {
    name: String,
    width: usize,
}

/// IBM Quantum backend adapter bound to one device.
pub struct IbmBackend {
    /// API client.
    client: Arc<IbmClient>,
    /// Target device name.
    target: String,
    /// Basis gates reported by the device.
    basis_gates: Vec<String>,
    /// Cached capabilities.
    capabilities: Capabilities,
    /// Device information fetched when the backend was bound.
    info: BackendInfo,
    /// Registers of submitted jobs, keyed by job id.
    registers: Mutex<FxHashMap<String, MeasuredRegister>>,
    /// Status poll delay used by `wait`.
    poll_interval: Duration,
}

impl IbmBackend {
    /// Create a backend from already fetched device information.
    pub fn from_info(client: Arc<IbmClient>, info: BackendInfo) -> Self {
        let mut capabilities = Capabilities::ibm(
            &info.name,
            u32::try_from(info.num_qubits).unwrap_or(u32::MAX),
            GateSet::from_basis(&info.basis_gates),
        );
        if let Some(max_shots) = info.max_shots {
            capabilities.max_shots = max_shots;
        }

        Self {
            client,
            target: info.name.clone(),
            basis_gates: info.basis_gates.clone(),
            capabilities,
            info,
            registers: Mutex::new(FxHashMap::default()),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Bind to a named device.
    pub async fn connect(client: Arc<IbmClient>, target: &str) -> IbmResult<Self> {
        let info = client.get_backend(target).await?;
        Ok(Self::from_info(client, info))
    }

    /// Bind to the least busy operational hardware device.
    pub async fn least_busy(client: Arc<IbmClient>) -> IbmResult<Self> {
        let info = client.least_busy().await?;
        info!("selected IBM device {}", info.name);
        Ok(Self::from_info(client, info))
    }

    /// Set the delay between status polls.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Get the target device name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Basis gate names the device executes natively.
    pub fn basis_gates(&self) -> &[String] {
        &self.basis_gates
    }

    /// Device information as fetched when the backend was bound.
    pub fn info(&self) -> &BackendInfo {
        &self.info
    }

    fn remember_register(&self, job_id: &str, register: MeasuredRegister) {
        self.registers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(job_id.to_string(), register);
    }

    fn register_for(&self, job_id: &str) -> Option<MeasuredRegister> {
        self.registers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(job_id)
            .cloned()
    }
}

/// Decode a job result into an `ExecutionResult`.
///
/// V2 results carry one hex sample per shot, which becomes ordered
/// per-shot memory. V1 results only carry aggregated counts.
fn decode_results(
    results: &JobResultResponse,
    register: Option<&MeasuredRegister>,
) -> IbmResult<ExecutionResult> {
    let result = results
        .results
        .first()
        .ok_or_else(|| IbmError::MalformedResult("no results in response".into()))?;

    if let Some(data) = &result.data {
        let register_data = match register.and_then(|r| data.get(&r.name)) {
            Some(d) => d,
            None if data.len() == 1 => data.values().next().ok_or_else(|| {
                IbmError::MalformedResult("empty classical data".into())
            })?,
            None => {
                return Err(IbmError::MalformedResult(format!(
                    "cannot tell which of {} registers holds the measurement",
                    data.len()
                )));
            }
        };

        let width = register_data
            .num_bits
            .or(register.map(|r| r.width))
            .unwrap_or_else(|| infer_bit_width(&register_data.samples));

        let memory: Vec<String> = register_data
            .samples
            .iter()
            .map(|s| hex_to_binary(s, width))
            .collect();

        let mut counts = Counts::new();
        for bitstring in &memory {
            counts.insert(bitstring.clone(), 1);
        }
        let shots = u32::try_from(memory.len()).unwrap_or(u32::MAX);

        return Ok(ExecutionResult::new(counts, shots).with_memory(memory));
    }

    if let Some(raw_counts) = &result.counts {
        let width = register.map_or(0, |r| r.width);
        let mut counts = Counts::new();
        for (bitstring, &count) in raw_counts {
            counts.insert(hex_to_binary(bitstring, width), count);
        }
        let shots = u32::try_from(counts.total_shots()).unwrap_or(u32::MAX);
        return Ok(ExecutionResult::new(counts, shots));
    }

    Err(IbmError::MalformedResult(
        "result carries neither samples nor counts".into(),
    ))
}

/// Infer the classical register bit width from V2 hex samples.
///
/// Uses the bit length of the largest sample, or 1 if every sample is zero.
fn infer_bit_width(samples: &[String]) -> usize {
    let max_val = samples
        .iter()
        .filter_map(|s| {
            let hex = s.strip_prefix("0x").unwrap_or(s);
            u64::from_str_radix(hex, 16).ok()
        })
        .max()
        .unwrap_or(0);

    if max_val == 0 {
        1
    } else {
        64 - max_val.leading_zeros() as usize
    }
}

/// Convert a hex string to a binary string padded to `width` bits.
///
/// A `width` of 0 falls back to 4 bits per hex digit. Strings that are not
/// hex are returned unchanged.
fn hex_to_binary(hex: &str, width: usize) -> String {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);

    match u64::from_str_radix(hex, 16) {
        Ok(value) => {
            let width = if width > 0 { width } else { hex.len() * 4 };
            format!("{value:0>width$b}")
        }
        Err(_) => hex.to_string(),
    }
}

#[async_trait]
impl Backend for IbmBackend {
    fn name(&self) -> &str {
        &self.target
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        let caps = self.capabilities();
        let mut reasons = Vec::new();

        if circuit.num_qubits() > caps.num_qubits as usize {
            reasons.push(format!(
                "Circuit requires {} qubits but backend only has {}",
                circuit.num_qubits(),
                caps.num_qubits
            ));
        }

        let foreign: Vec<&str> = circuit
            .instructions()
            .iter()
            .filter_map(|i| i.as_gate())
            .map(|g| g.name())
            .filter(|name| !caps.gate_set.contains(name))
            .collect();

        if !reasons.is_empty() {
            return Ok(ValidationResult::Invalid { reasons });
        }
        if foreign.is_empty() {
            Ok(ValidationResult::Valid)
        } else {
            Ok(ValidationResult::RequiresTranspilation {
                details: format!("gates outside the device basis: {}", foreign.join(", ")),
            })
        }
    }

    #[instrument(skip(self, circuit), fields(target = %self.target))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        if shots == 0 || shots > self.capabilities.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{shots} shots outside 1..={}",
                self.capabilities.max_shots
            )));
        }

        let info = &self.info;

        if circuit.num_qubits() > info.num_qubits {
            return Err(IbmError::TooManyQubits {
                required: circuit.num_qubits(),
                available: info.num_qubits,
            }
            .into());
        }

        if !info.status.operational {
            return Err(HalError::BackendUnavailable(
                info.status
                    .status_msg
                    .clone()
                    .unwrap_or_else(|| "Backend offline".to_string()),
            ));
        }

        let qasm = emit(circuit).map_err(|e| HalError::InvalidCircuit(e.to_string()))?;

        let response = self
            .client
            .submit_sampler_job(&self.target, vec![qasm], shots)
            .await
            .map_err(|e| HalError::SubmissionFailed(e.to_string()))?;

        self.remember_register(
            &response.id,
            MeasuredRegister {
                name: circuit.clbit_register().to_string(),
                width: circuit.num_clbits(),
            },
        );
        debug!("submitted IBM job {}", response.id);

        Ok(JobId(response.id))
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let status = self.client.get_job_status(&job_id.0).await?;

        let job_status = match status.status.to_uppercase().as_str() {
            "QUEUED" => JobStatus::Queued,
            "COMPLETED" => JobStatus::Completed,
            "FAILED" | "ERROR" => JobStatus::Failed(
                status
                    .error_message()
                    .unwrap_or_else(|| "Unknown error".to_string()),
            ),
            "CANCELLED" => JobStatus::Cancelled,
            // VALIDATING, RUNNING and anything newer
            _ => JobStatus::Running,
        };

        Ok(job_status)
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let status = self.client.get_job_status(&job_id.0).await?;

        if !status.is_completed() {
            if status.is_failed() {
                return Err(HalError::JobFailed(
                    status
                        .error_message()
                        .unwrap_or_else(|| "Job failed".to_string()),
                ));
            }
            if status.is_cancelled() {
                return Err(HalError::JobCancelled);
            }
            return Err(HalError::Backend(format!(
                "Job {} not yet completed",
                job_id.0
            )));
        }

        let results = self.client.get_job_results(&job_id.0).await?;
        let register = self.register_for(&job_id.0);

        Ok(decode_results(&results, register.as_ref())?)
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.client.cancel_job(&job_id.0).await?;
        Ok(())
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v2_response(json: &str) -> JobResultResponse {
        serde_json::from_str(json).unwrap()
    }

    fn meas(width: usize) -> MeasuredRegister {
        MeasuredRegister {
            name: "meas".into(),
            width,
        }
    }

    #[test]
    fn test_hex_to_binary() {
        assert_eq!(hex_to_binary("0x0", 0), "0000");
        assert_eq!(hex_to_binary("0x3", 0), "0011");
        assert_eq!(hex_to_binary("0xff", 0), "11111111");
        assert_eq!(hex_to_binary("3", 0), "0011");

        assert_eq!(hex_to_binary("0x0", 1), "0");
        assert_eq!(hex_to_binary("0x1", 1), "1");
        assert_eq!(hex_to_binary("0x1", 5), "00001");
        assert_eq!(hex_to_binary("0x3", 8), "00000011");
    }

    #[test]
    fn test_infer_bit_width() {
        assert_eq!(infer_bit_width(&["0x0".into(), "0x3".into()]), 2);
        assert_eq!(infer_bit_width(&["0x0".into(), "0x7".into()]), 3);
        assert_eq!(infer_bit_width(&["0x0".into(), "0x0".into()]), 1);
        assert_eq!(infer_bit_width(&["0x0".into(), "0x1".into()]), 1);
    }

    #[test]
    fn test_decode_v2_preserves_shot_order() {
        let results = v2_response(
            r#"{"results": [{"data": {"meas": {
                "samples": ["0x1", "0x0", "0x0", "0x1", "0x1"], "num_bits": 1
            }}}]}"#,
        );

        let decoded = decode_results(&results, Some(&meas(1))).unwrap();
        assert_eq!(decoded.concatenated_memory().as_deref(), Some("10011"));
        assert_eq!(decoded.shots, 5);
        assert_eq!(decoded.counts.get("1"), 3);
        assert_eq!(decoded.counts.get("0"), 2);
    }

    #[test]
    fn test_decode_v2_all_zero_keeps_width() {
        // Without num_bits the submitted register width pads the samples.
        let results = v2_response(
            r#"{"results": [{"data": {"c": {"samples": ["0x0", "0x0", "0x2"]}}}]}"#,
        );
        let register = MeasuredRegister {
            name: "c".into(),
            width: 3,
        };

        let decoded = decode_results(&results, Some(&register)).unwrap();
        assert_eq!(
            decoded.memory.unwrap(),
            vec!["000".to_string(), "000".into(), "010".into()]
        );
    }

    #[test]
    fn test_decode_v2_single_register_without_name() {
        let results = v2_response(
            r#"{"results": [{"data": {"c0": {"samples": ["0x1", "0x0"]}}}]}"#,
        );

        let decoded = decode_results(&results, None).unwrap();
        assert_eq!(decoded.concatenated_memory().as_deref(), Some("10"));
    }

    #[test]
    fn test_decode_v2_ambiguous_registers() {
        let results = v2_response(
            r#"{"results": [{"data": {
                "a": {"samples": ["0x1"]},
                "b": {"samples": ["0x0"]}
            }}]}"#,
        );

        let err = decode_results(&results, Some(&meas(1))).unwrap_err();
        assert!(matches!(err, IbmError::MalformedResult(_)));

        let register = MeasuredRegister {
            name: "b".into(),
            width: 1,
        };
        let decoded = decode_results(&results, Some(&register)).unwrap();
        assert_eq!(decoded.concatenated_memory().as_deref(), Some("0"));
    }

    #[test]
    fn test_decode_v1_counts_only() {
        let results = v2_response(
            r#"{"id": "test", "results": [{"counts": {"0x0": 500, "0x3": 500}}]}"#,
        );

        let decoded = decode_results(&results, Some(&meas(4))).unwrap();
        assert!(decoded.memory.is_none());
        assert_eq!(decoded.counts.get("0000"), 500);
        assert_eq!(decoded.counts.get("0011"), 500);
        assert_eq!(decoded.shots, 1000);
    }

    #[test]
    fn test_decode_empty_results() {
        let results = v2_response(r#"{"results": []}"#);
        assert!(matches!(
            decode_results(&results, None),
            Err(IbmError::MalformedResult(_))
        ));

        let results = v2_response(r#"{"results": [{"metadata": {"version": 2}}]}"#);
        assert!(matches!(
            decode_results(&results, None),
            Err(IbmError::MalformedResult(_))
        ));
    }

    fn offline_backend(operational: bool) -> IbmBackend {
        let client = Arc::new(IbmClient::new("http://127.0.0.1:9", "token").unwrap());
        let info: BackendInfo = serde_json::from_str(&format!(
            r#"{{"name": "ibm_test", "num_qubits": 2, "max_shots": 64,
                "status": {{"operational": {operational}, "status_msg": "calibrating"}},
                "basis_gates": ["cz", "id", "rz", "sx", "x"]}}"#
        ))
        .unwrap();
        IbmBackend::from_info(client, info)
    }

    #[tokio::test]
    async fn test_validate_against_device() {
        let backend = offline_backend(true);
        assert_eq!(backend.capabilities().max_shots, 64);
        assert_eq!(backend.info().num_qubits, 2);

        let coin_flip = Circuit::coin_flip().unwrap();
        assert!(matches!(
            backend.validate(&coin_flip).await.unwrap(),
            ValidationResult::RequiresTranspilation { ref details } if details.ends_with(": h")
        ));

        let mut isa = Circuit::with_size("isa", 1, 0);
        isa.rz(std::f64::consts::FRAC_PI_2, qpass_ir::QubitId(0))
            .unwrap()
            .sx(qpass_ir::QubitId(0))
            .unwrap();
        isa.measure_all().unwrap();
        assert!(backend.validate(&isa).await.unwrap().is_valid());

        let wide = Circuit::with_size("wide", 3, 0);
        assert!(matches!(
            backend.validate(&wide).await.unwrap(),
            ValidationResult::Invalid { .. }
        ));
    }

    #[tokio::test]
    async fn test_submit_checks_before_network() {
        let circuit = Circuit::coin_flip().unwrap();

        let err = offline_backend(true).submit(&circuit, 65).await.unwrap_err();
        assert!(matches!(err, HalError::InvalidShots(_)));

        let err = offline_backend(false).submit(&circuit, 8).await.unwrap_err();
        assert!(matches!(err, HalError::BackendUnavailable(ref msg) if msg == "calibrating"));
    }
}
