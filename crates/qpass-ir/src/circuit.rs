//! High-level circuit builder API.

use std::collections::{HashMap, HashSet};

use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::instruction::Instruction;
use crate::qubit::{Clbit, ClbitId, Qubit, QubitId};

/// Name of the classical register created by [`Circuit::measure_all`].
pub const MEASURE_REGISTER: &str = "meas";

/// A quantum circuit.
///
/// Instructions are stored in program order. Every operand is checked
/// against the circuit's qubits and classical bits when it is appended.
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Qubits in the circuit.
    qubits: Vec<Qubit>,
    /// Classical bits in the circuit.
    clbits: Vec<Clbit>,
    /// Instructions in program order.
    instructions: Vec<Instruction>,
    /// Counter for generating qubit IDs.
    next_qubit_id: u32,
    /// Counter for generating classical bit IDs.
    next_clbit_id: u32,
    /// Device size once the circuit has been placed on physical qubits.
    physical_qubits: Option<u32>,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            clbits: vec![],
            instructions: vec![],
            next_qubit_id: 0,
            next_clbit_id: 0,
            physical_qubits: None,
        }
    }

    /// Create a circuit with a given number of qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        for _ in 0..num_qubits {
            circuit.add_qubit();
        }
        for _ in 0..num_clbits {
            circuit.add_clbit();
        }
        circuit
    }

    /// The entropy circuit: one qubit in equal superposition, measured into
    /// a one-bit `meas` register.
    pub fn coin_flip() -> IrResult<Self> {
        let mut circuit = Self::with_size("coin_flip", 1, 0);
        circuit.h(QubitId(0))?;
        circuit.measure_all()?;
        Ok(circuit)
    }

    /// Add a single qubit to the circuit.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = QubitId(self.next_qubit_id);
        self.next_qubit_id += 1;
        self.qubits.push(Qubit::new(id));
        id
    }

    /// Add a quantum register with multiple qubits.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> Vec<QubitId> {
        let name = name.into();
        let mut ids = vec![];
        for i in 0..size {
            let id = QubitId(self.next_qubit_id);
            self.next_qubit_id += 1;
            self.qubits.push(Qubit::with_register(id, &name, i));
            ids.push(id);
        }
        ids
    }

    /// Add a single classical bit to the circuit.
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = ClbitId(self.next_clbit_id);
        self.next_clbit_id += 1;
        self.clbits.push(Clbit::new(id));
        id
    }

    /// Add a classical register with multiple bits.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> Vec<ClbitId> {
        let name = name.into();
        let mut ids = vec![];
        for i in 0..size {
            let id = ClbitId(self.next_clbit_id);
            self.next_clbit_id += 1;
            self.clbits.push(Clbit::with_register(id, &name, i));
            ids.push(id);
        }
        ids
    }

    /// Append an instruction after validating its operands.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.check_operands(&instruction)?;
        self.instructions.push(instruction);
        Ok(self)
    }

    fn check_operands(&self, instruction: &Instruction) -> IrResult<()> {
        let gate_name = || Some(instruction.name().to_string());

        for qubit in &instruction.qubits {
            if !self.qubits.iter().any(|q| q.id == *qubit) {
                return Err(IrError::QubitNotFound {
                    qubit: *qubit,
                    gate_name: gate_name(),
                });
            }
        }
        for clbit in &instruction.clbits {
            if !self.clbits.iter().any(|c| c.id == *clbit) {
                return Err(IrError::ClbitNotFound {
                    clbit: *clbit,
                    gate_name: gate_name(),
                });
            }
        }
        Ok(())
    }

    fn apply_1q(&mut self, gate: StandardGate, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(gate, qubit))
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::H, qubit)
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::X, qubit)
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::Y, qubit)
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::Z, qubit)
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::S, qubit)
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::Sdg, qubit)
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::T, qubit)
    }

    /// Apply T-dagger gate.
    pub fn tdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::Tdg, qubit)
    }

    /// Apply sqrt(X) gate.
    pub fn sx(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::SX, qubit)
    }

    /// Apply Rx rotation gate.
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::Rx(theta), qubit)
    }

    /// Apply Ry rotation gate.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::Ry(theta), qubit)
    }

    /// Apply Rz rotation gate.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_1q(StandardGate::Rz(theta), qubit)
    }

    // =========================================================================
    // Non-unitary operations
    // =========================================================================

    /// Measure a qubit into a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.apply(Instruction::measure(qubit, clbit))
    }

    /// Measure every qubit into a newly added `meas` register.
    ///
    /// A barrier across all qubits precedes the measurements.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        let qubits: Vec<QubitId> = self.qubits.iter().map(|q| q.id).collect();
        if qubits.is_empty() {
            return Ok(self);
        }
        let clbits = self.add_creg(MEASURE_REGISTER, qubits.len() as u32);
        self.apply(Instruction::barrier(qubits.iter().copied()))?;
        self.apply(Instruction::measure_all(qubits, clbits)?)
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::reset(qubit))
    }

    /// Insert a barrier on the given qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.apply(Instruction::barrier(qubits))
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    /// Get the qubits.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// Get the classical bits.
    pub fn clbits(&self) -> &[Clbit] {
        &self.clbits
    }

    /// Get the instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of operations, barriers excluded.
    pub fn num_ops(&self) -> usize {
        self.instructions.iter().filter(|i| !i.is_barrier()).count()
    }

    /// Name of the classical register results are reported under.
    ///
    /// Falls back to `c` for circuits whose bits have no register.
    pub fn clbit_register(&self) -> &str {
        self.clbits
            .first()
            .and_then(|c| c.register.as_deref())
            .unwrap_or("c")
    }

    /// Circuit depth: the longest chain of operations on any wire.
    ///
    /// Barriers do not add a layer.
    pub fn depth(&self) -> usize {
        let mut qubit_depth: HashMap<QubitId, usize> = HashMap::new();
        let mut clbit_depth: HashMap<ClbitId, usize> = HashMap::new();
        let mut depth = 0;

        for inst in &self.instructions {
            if inst.is_barrier() {
                continue;
            }
            let start = inst
                .qubits
                .iter()
                .map(|q| qubit_depth.get(q).copied().unwrap_or(0))
                .chain(
                    inst.clbits
                        .iter()
                        .map(|c| clbit_depth.get(c).copied().unwrap_or(0)),
                )
                .max()
                .unwrap_or(0);
            let layer = start + 1;
            for q in &inst.qubits {
                qubit_depth.insert(*q, layer);
            }
            for c in &inst.clbits {
                clbit_depth.insert(*c, layer);
            }
            depth = depth.max(layer);
        }

        depth
    }

    /// Device size if the circuit addresses physical qubits.
    pub fn physical_qubits(&self) -> Option<u32> {
        self.physical_qubits
    }

    /// Whether the circuit addresses physical qubits.
    pub fn is_physical(&self) -> bool {
        self.physical_qubits.is_some()
    }

    // =========================================================================
    // Rewriting (used by compilation passes)
    // =========================================================================

    /// Replace the instruction list, validating every operand.
    ///
    /// On error the circuit is left unchanged.
    pub fn replace_instructions(&mut self, instructions: Vec<Instruction>) -> IrResult<()> {
        for inst in &instructions {
            self.check_operands(inst)?;
        }
        self.instructions = instructions;
        Ok(())
    }

    /// Place the circuit on a device.
    ///
    /// `layout[v]` is the physical qubit that virtual qubit `v` maps to.
    /// Every physical qubit must be below `device_qubits` and distinct.
    pub fn into_physical(self, layout: &[u32], device_qubits: u32) -> IrResult<Circuit> {
        let mut used = HashSet::new();
        let mut mapping = HashMap::new();

        for qubit in &self.qubits {
            let physical = *layout.get(qubit.id.0 as usize).ok_or_else(|| {
                IrError::InvalidLayout(format!("no physical qubit for {}", qubit.id))
            })?;
            if physical >= device_qubits {
                return Err(IrError::InvalidLayout(format!(
                    "physical qubit {physical} outside device of {device_qubits} qubits"
                )));
            }
            if !used.insert(physical) {
                return Err(IrError::InvalidLayout(format!(
                    "physical qubit {physical} assigned twice"
                )));
            }
            mapping.insert(qubit.id, QubitId(physical));
        }

        let remap = |q: &QubitId| mapping.get(q).copied().unwrap_or(*q);

        let qubits = self
            .qubits
            .iter()
            .map(|q| Qubit {
                id: remap(&q.id),
                register: q.register.clone(),
                index: q.index,
            })
            .collect();

        let instructions = self
            .instructions
            .into_iter()
            .map(|mut inst| {
                inst.qubits = inst.qubits.iter().map(remap).collect();
                inst
            })
            .collect();

        Ok(Circuit {
            name: self.name,
            qubits,
            clbits: self.clbits,
            instructions,
            next_qubit_id: self.next_qubit_id,
            next_clbit_id: self.next_clbit_id,
            physical_qubits: Some(device_qubits),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::InstructionKind;

    #[test]
    fn test_coin_flip() {
        let circuit = Circuit::coin_flip().unwrap();
        assert_eq!(circuit.name(), "coin_flip");
        assert_eq!(circuit.num_qubits(), 1);
        assert_eq!(circuit.num_clbits(), 1);
        assert_eq!(circuit.clbit_register(), MEASURE_REGISTER);

        let names: Vec<_> = circuit.instructions().iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["h", "barrier", "measure"]);
        assert_eq!(circuit.depth(), 2);
        assert_eq!(circuit.num_ops(), 2);
    }

    #[test]
    fn test_unknown_qubit_rejected() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        let err = circuit.x(QubitId(4)).unwrap_err();
        assert!(matches!(err, IrError::QubitNotFound { qubit, .. } if qubit == QubitId(4)));
        assert!(circuit.instructions().is_empty());
    }

    #[test]
    fn test_unknown_clbit_rejected() {
        let mut circuit = Circuit::with_size("test", 1, 1);
        let err = circuit.measure(QubitId(0), ClbitId(2)).unwrap_err();
        assert!(matches!(err, IrError::ClbitNotFound { .. }));
    }

    #[test]
    fn test_measure_all_on_empty_circuit() {
        let mut circuit = Circuit::new("empty");
        circuit.measure_all().unwrap();
        assert_eq!(circuit.num_clbits(), 0);
        assert!(circuit.instructions().is_empty());
    }

    #[test]
    fn test_depth_counts_sequential_gates() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.x(QubitId(0)).unwrap();
        circuit.x(QubitId(1)).unwrap();
        assert_eq!(circuit.depth(), 2);
    }

    #[test]
    fn test_clbit_register_fallback() {
        let circuit = Circuit::with_size("test", 1, 1);
        assert_eq!(circuit.clbit_register(), "c");
    }

    #[test]
    fn test_into_physical() {
        let circuit = Circuit::coin_flip().unwrap();
        let physical = circuit.into_physical(&[5], 127).unwrap();

        assert!(physical.is_physical());
        assert_eq!(physical.physical_qubits(), Some(127));
        assert_eq!(physical.qubits()[0].id, QubitId(5));
        for inst in physical.instructions() {
            assert_eq!(inst.qubits, vec![QubitId(5)]);
        }
    }

    #[test]
    fn test_into_physical_rejects_out_of_range() {
        let circuit = Circuit::coin_flip().unwrap();
        let err = circuit.into_physical(&[3], 2).unwrap_err();
        assert!(matches!(err, IrError::InvalidLayout(_)));
    }

    #[test]
    fn test_into_physical_rejects_duplicates() {
        let circuit = Circuit::with_size("pair", 2, 0);
        let err = circuit.into_physical(&[1, 1], 4).unwrap_err();
        assert!(matches!(err, IrError::InvalidLayout(_)));
    }

    #[test]
    fn test_replace_instructions_validates() {
        let mut circuit = Circuit::coin_flip().unwrap();
        let bad = vec![Instruction::single_qubit_gate(StandardGate::X, QubitId(9))];
        assert!(circuit.replace_instructions(bad).is_err());
        assert_eq!(circuit.instructions().len(), 3);

        let good = vec![Instruction::single_qubit_gate(StandardGate::SX, QubitId(0))];
        circuit.replace_instructions(good).unwrap();
        assert!(matches!(
            circuit.instructions()[0].kind,
            InstructionKind::Gate(StandardGate::SX)
        ));
    }
}
