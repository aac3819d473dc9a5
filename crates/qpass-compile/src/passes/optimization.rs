//! Single-qubit optimization passes.

use std::f64::consts::PI;

use qpass_ir::{Circuit, Instruction, InstructionKind, QubitId, StandardGate};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Angles closer than this to a multiple of 2π are treated as zero.
const ANGLE_TOLERANCE: f64 = 1e-10;

/// Wrap an angle into (-π, π].
fn normalize_angle(theta: f64) -> f64 {
    let wrapped = theta.rem_euclid(2.0 * PI);
    if wrapped > PI {
        wrapped - 2.0 * PI
    } else {
        wrapped
    }
}

fn is_zero_angle(theta: f64) -> bool {
    normalize_angle(theta).abs() < ANGLE_TOLERANCE
}

/// Whether a gate acts as the identity (up to global phase).
fn is_trivial(gate: &StandardGate) -> bool {
    match gate {
        StandardGate::I => true,
        StandardGate::Rx(theta) | StandardGate::Ry(theta) | StandardGate::Rz(theta) => {
            is_zero_angle(*theta)
        }
        _ => false,
    }
}

/// Merges adjacent `rz` rotations on the same qubit and drops gates that
/// act as the identity.
///
/// Any other instruction touching the qubit, barriers included, ends a run.
pub struct Optimize1qGates;

impl Pass for Optimize1qGates {
    fn name(&self) -> &'static str {
        "Optimize1qGates"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, _properties: &mut PropertySet) -> CompileResult<()> {
        let mut output: Vec<Instruction> = Vec::with_capacity(circuit.instructions().len());
        // Index into `output` of the last instruction touching each qubit.
        let mut last_on_qubit: FxHashMap<QubitId, usize> = FxHashMap::default();

        for inst in circuit.instructions() {
            if let (InstructionKind::Gate(StandardGate::Rz(theta)), Some(&qubit)) =
                (&inst.kind, inst.qubits.first())
            {
                let merged = last_on_qubit.get(&qubit).copied().and_then(|idx| {
                    match output[idx].kind {
                        InstructionKind::Gate(StandardGate::Rz(prev)) => Some((idx, prev)),
                        _ => None,
                    }
                });
                if let Some((idx, prev)) = merged {
                    output[idx].kind =
                        InstructionKind::Gate(StandardGate::Rz(normalize_angle(prev + theta)));
                    continue;
                }
            }

            for qubit in &inst.qubits {
                last_on_qubit.insert(*qubit, output.len());
            }
            output.push(inst.clone());
        }

        let before = circuit.instructions().len();
        output.retain(|inst| !inst.as_gate().is_some_and(is_trivial));
        debug!(
            "Optimize1qGates reduced {} instructions to {}",
            before,
            output.len()
        );

        circuit.replace_instructions(output)?;
        Ok(())
    }
}

/// Removes diagonal gates that sit directly before a measurement.
///
/// A diagonal gate only changes phases, which a computational-basis
/// measurement cannot observe. A barrier between the gate and the
/// measurement keeps the gate.
pub struct RemoveDiagonalBeforeMeasure;

impl Pass for RemoveDiagonalBeforeMeasure {
    fn name(&self) -> &'static str {
        "RemoveDiagonalBeforeMeasure"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, _properties: &mut PropertySet) -> CompileResult<()> {
        let instructions = circuit.instructions();
        let mut keep = vec![true; instructions.len()];
        // Kept instruction indices per qubit, in program order.
        let mut history: FxHashMap<QubitId, Vec<usize>> = FxHashMap::default();

        for (idx, inst) in instructions.iter().enumerate() {
            if inst.is_measure() {
                for qubit in &inst.qubits {
                    let wire = history.entry(*qubit).or_default();
                    while let Some(&prev) = wire.last() {
                        let removable = instructions[prev]
                            .as_gate()
                            .is_some_and(StandardGate::is_diagonal);
                        if !removable {
                            break;
                        }
                        keep[prev] = false;
                        wire.pop();
                    }
                }
            }
            for qubit in &inst.qubits {
                history.entry(*qubit).or_default().push(idx);
            }
        }

        let removed = keep.iter().filter(|k| !**k).count();
        if removed == 0 {
            return Ok(());
        }
        debug!("RemoveDiagonalBeforeMeasure removed {removed} gates");

        let output = instructions
            .iter()
            .zip(keep)
            .filter_map(|(inst, k)| k.then(|| inst.clone()))
            .collect();
        circuit.replace_instructions(output)?;
        Ok(())
    }
}
