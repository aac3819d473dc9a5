//! Simulator backend implementation.

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, instrument};
use uuid::Uuid;

use qpass_hal::{
    Backend, BackendConfig, BackendFactory, Capabilities, Counts,
    ExecutionResult, HalError, HalResult, Job, JobId, JobStatus, ValidationResult,
};
use qpass_ir::{Circuit, ClbitId, InstructionKind, QubitId};

use crate::statevector::Statevector;

const DEFAULT_MAX_QUBITS: u32 = 20;

/// Job data for the simulator.
struct SimJob {
    job: Job,
    result: Option<ExecutionResult>,
}

/// Local simulator backend.
///
/// Every shot runs the circuit on a fresh statevector. Measurements
/// collapse the state as they are reached, so each shot records the
/// classical bits exactly as a device would. Jobs complete during
/// `submit`.
pub struct SimulatorBackend {
    /// Backend configuration.
    config: BackendConfig,
    /// Capabilities, fixed at construction.
    capabilities: Capabilities,
    /// Active jobs.
    jobs: Arc<Mutex<FxHashMap<String, SimJob>>>,
    /// Measurement randomness.
    rng: Mutex<StdRng>,
}

impl SimulatorBackend {
    /// Create a new simulator backend seeded from OS entropy.
    pub fn new() -> Self {
        Self::build(BackendConfig::new("simulator"), DEFAULT_MAX_QUBITS, None)
    }

    /// Create a simulator whose measurement outcomes are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::build(
            BackendConfig::new("simulator"),
            DEFAULT_MAX_QUBITS,
            Some(seed),
        )
    }

    /// Create a simulator with custom max qubits.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self::build(BackendConfig::new("simulator"), max_qubits, None)
    }

    fn build(config: BackendConfig, max_qubits: u32, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut capabilities = Capabilities::simulator(max_qubits);
        capabilities.name.clone_from(&config.name);

        Self {
            config,
            capabilities,
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
            rng: Mutex::new(rng),
        }
    }

    fn check_shots(&self, shots: u32) -> HalResult<()> {
        if shots == 0 {
            return Err(HalError::InvalidShots("shots must be at least 1".into()));
        }
        if shots > self.capabilities.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{shots} shots exceeds the simulator maximum of {}",
                self.capabilities.max_shots
            )));
        }
        Ok(())
    }

    fn check_size(&self, circuit: &Circuit) -> HalResult<()> {
        if circuit.num_qubits() > self.capabilities.num_qubits as usize {
            return Err(HalError::CircuitTooLarge(format!(
                "Circuit has {} qubits but simulator only supports {}",
                circuit.num_qubits(),
                self.capabilities.num_qubits
            )));
        }
        Ok(())
    }

    /// Run simulation synchronously.
    ///
    /// Each memory entry lists the classical bits highest index first. A
    /// circuit without classical bits reports every qubit at the end of
    /// the shot instead.
    #[instrument(skip(self, circuit))]
    fn run_simulation(&self, circuit: &Circuit, shots: u32) -> ExecutionResult {
        let start = Instant::now();

        // Physical circuits address sparse device qubits; simulate densely.
        let qubit_index: FxHashMap<QubitId, usize> = circuit
            .qubits()
            .iter()
            .enumerate()
            .map(|(i, q)| (q.id, i))
            .collect();
        let clbit_index: FxHashMap<ClbitId, usize> = circuit
            .clbits()
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, i))
            .collect();

        let num_qubits = circuit.num_qubits();
        let num_clbits = circuit.num_clbits();
        debug!(
            "Starting simulation: {} qubits, {} clbits, {} shots",
            num_qubits, num_clbits, shots
        );

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let mut counts = Counts::new();
        let mut memory = Vec::with_capacity(shots as usize);

        for _ in 0..shots {
            let mut sv = Statevector::new(num_qubits);
            let mut bits = vec![false; num_clbits];

            for inst in circuit.instructions() {
                let wires = inst.qubits.iter().filter_map(|q| qubit_index.get(q).copied());
                match &inst.kind {
                    InstructionKind::Gate(gate) => {
                        for q in wires {
                            sv.apply_gate(gate, q);
                        }
                    }
                    InstructionKind::Measure => {
                        for (q, c) in wires.zip(inst.clbits.iter()) {
                            let outcome = sv.measure(q, &mut *rng);
                            if let Some(&c) = clbit_index.get(c) {
                                bits[c] = outcome;
                            }
                        }
                    }
                    InstructionKind::Reset => {
                        for q in wires {
                            sv.reset(q, &mut *rng);
                        }
                    }
                    InstructionKind::Barrier => {}
                }
            }

            let bitstring = if num_clbits == 0 {
                let outcome = sv.sample(&mut *rng);
                sv.outcome_to_bitstring(outcome)
            } else {
                bits.iter().rev().map(|b| if *b { '1' } else { '0' }).collect()
            };
            counts.insert(bitstring.clone(), 1);
            memory.push(bitstring);
        }

        let elapsed = start.elapsed();
        debug!("Simulation completed in {:?}", elapsed);

        ExecutionResult::new(counts, shots)
            .with_memory(memory)
            .with_execution_time(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
    }

    fn jobs(&self) -> std::sync::MutexGuard<'_, FxHashMap<String, SimJob>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        let mut reasons = vec![];
        if let Err(e) = self.check_size(circuit) {
            reasons.push(e.to_string());
        }
        for gate in circuit.instructions().iter().filter_map(|i| i.as_gate()) {
            if !self.capabilities.gate_set.contains(gate.name()) {
                reasons.push(format!("Unsupported gate: {}", gate.name()));
            }
        }

        if reasons.is_empty() {
            Ok(ValidationResult::Valid)
        } else {
            Ok(ValidationResult::Invalid { reasons })
        }
    }

    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        self.check_shots(shots)?;
        self.check_size(circuit)?;

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let job = Job::new(job_id.clone(), shots).with_backend(self.config.name.clone());

        self.jobs().insert(job_id.0.clone(), SimJob { job, result: None });
        debug!("Submitted job: {}", job_id);

        let result = self.run_simulation(circuit, shots);

        if let Some(sim_job) = self.jobs().get_mut(&job_id.0) {
            sim_job.result = Some(result);
            sim_job.job = sim_job.job.clone().with_status(JobStatus::Completed);
        }

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        self.jobs()
            .get(&job_id.0)
            .map(|j| j.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        self.jobs()
            .get(&job_id.0)
            .and_then(|j| j.result.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let mut jobs = self.jobs();
        let sim_job = jobs
            .get_mut(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        if !sim_job.job.status.is_terminal() {
            sim_job.job = sim_job.job.clone().with_status(JobStatus::Cancelled);
        }
        Ok(())
    }
}

impl BackendFactory for SimulatorBackend {
    /// Reads `max_qubits` and `seed` from the extra configuration.
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let max_qubits = match config.extra_u64("max_qubits")? {
            Some(v) => u32::try_from(v).map_err(|_| {
                HalError::Configuration(format!("max_qubits {v} out of range"))
            })?,
            None => DEFAULT_MAX_QUBITS,
        };
        let seed = config.extra_u64("seed")?;

        Ok(Self::build(config, max_qubits, seed))
    }
}
