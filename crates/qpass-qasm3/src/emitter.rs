//! QASM3 emitter for serializing circuits.

use qpass_ir::{Circuit, ClbitId, Instruction, InstructionKind, QubitId};
use rustc_hash::FxHashMap;

use crate::error::{EmitError, EmitResult};

/// Emit a circuit as QASM3 source code.
///
/// Virtual circuits declare a `qubit[n] q;` register. Circuits placed on a
/// device address hardware qubits directly as `$n`.
pub fn emit(circuit: &Circuit) -> EmitResult<String> {
    let mut emitter = Emitter::new(circuit);
    emitter.emit_circuit(circuit)?;
    Ok(emitter.output)
}

/// QASM3 emitter.
struct Emitter {
    output: String,
    physical: bool,
    register: String,
    qubit_index: FxHashMap<QubitId, usize>,
    clbit_index: FxHashMap<ClbitId, usize>,
}

impl Emitter {
    fn new(circuit: &Circuit) -> Self {
        let qubit_index = circuit
            .qubits()
            .iter()
            .enumerate()
            .map(|(i, q)| (q.id, i))
            .collect();
        let clbit_index = circuit
            .clbits()
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, i))
            .collect();

        Self {
            output: String::new(),
            physical: circuit.is_physical(),
            register: circuit.clbit_register().to_string(),
            qubit_index,
            clbit_index,
        }
    }

    fn emit_circuit(&mut self, circuit: &Circuit) -> EmitResult<()> {
        self.writeln("OPENQASM 3.0;");
        self.writeln("include \"stdgates.inc\";");
        self.writeln("");

        let num_qubits = circuit.num_qubits();
        if num_qubits > 0 && !self.physical {
            self.writeln(&format!("qubit[{num_qubits}] q;"));
        }

        let num_clbits = circuit.num_clbits();
        if num_clbits > 0 {
            let decl = format!("bit[{num_clbits}] {};", self.register);
            self.writeln(&decl);
        }

        if num_qubits > 0 || num_clbits > 0 {
            self.writeln("");
        }

        for instruction in circuit.instructions() {
            self.emit_instruction(instruction)?;
        }

        Ok(())
    }

    fn emit_instruction(&mut self, instruction: &Instruction) -> EmitResult<()> {
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let qubits = self.emit_qubits(&instruction.qubits)?;
                match gate.angle() {
                    Some(theta) => {
                        let line = format!("{}({}) {qubits};", gate.name(), emit_angle(theta));
                        self.writeln(&line);
                    }
                    None => self.writeln(&format!("{} {qubits};", gate.name())),
                }
            }

            InstructionKind::Measure => {
                for (q, c) in instruction.qubits.iter().zip(instruction.clbits.iter()) {
                    let qubit = self.emit_qubit(*q)?;
                    let clbit = self.emit_clbit(*c)?;
                    self.writeln(&format!("{clbit} = measure {qubit};"));
                }
            }

            InstructionKind::Reset => {
                let qubits = self.emit_qubits(&instruction.qubits)?;
                self.writeln(&format!("reset {qubits};"));
            }

            InstructionKind::Barrier => {
                let qubits = self.emit_qubits(&instruction.qubits)?;
                if qubits.is_empty() {
                    self.writeln("barrier;");
                } else {
                    self.writeln(&format!("barrier {qubits};"));
                }
            }
        }

        Ok(())
    }

    fn emit_qubit(&self, qubit: QubitId) -> EmitResult<String> {
        if self.physical {
            return Ok(format!("${}", qubit.0));
        }
        self.qubit_index
            .get(&qubit)
            .map(|i| format!("q[{i}]"))
            .ok_or(EmitError::UndeclaredQubit(qubit))
    }

    fn emit_qubits(&self, qubits: &[QubitId]) -> EmitResult<String> {
        let refs = qubits
            .iter()
            .map(|q| self.emit_qubit(*q))
            .collect::<EmitResult<Vec<_>>>()?;
        Ok(refs.join(", "))
    }

    fn emit_clbit(&self, clbit: ClbitId) -> EmitResult<String> {
        self.clbit_index
            .get(&clbit)
            .map(|i| format!("{}[{i}]", self.register))
            .ok_or(EmitError::UndeclaredClbit(clbit))
    }

    fn writeln(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }
}

/// Render an angle, using `pi` fractions where they are exact.
fn emit_angle(v: f64) -> String {
    let pi = std::f64::consts::PI;
    if (v - pi).abs() < 1e-10 {
        "pi".into()
    } else if (v + pi).abs() < 1e-10 {
        "-pi".into()
    } else if (v - pi / 2.0).abs() < 1e-10 {
        "pi/2".into()
    } else if (v + pi / 2.0).abs() < 1e-10 {
        "-pi/2".into()
    } else if (v - pi / 4.0).abs() < 1e-10 {
        "pi/4".into()
    } else if (v + pi / 4.0).abs() < 1e-10 {
        "-pi/4".into()
    } else {
        // Debug formatting keeps a decimal point and every significant digit.
        format!("{v:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qpass_ir::StandardGate;

    #[test]
    fn test_emit_coin_flip() {
        let circuit = Circuit::coin_flip().unwrap();
        let qasm = emit(&circuit).unwrap();

        assert!(qasm.contains("OPENQASM 3.0;"));
        assert!(qasm.contains("include \"stdgates.inc\";"));
        assert!(qasm.contains("qubit[1] q;"));
        assert!(qasm.contains("bit[1] meas;"));
        assert!(qasm.contains("h q[0];"));
        assert!(qasm.contains("barrier q[0];"));
        assert!(qasm.contains("meas[0] = measure q[0];"));
    }

    #[test]
    fn test_emit_physical() {
        let circuit = Circuit::coin_flip()
            .unwrap()
            .into_physical(&[3], 5)
            .unwrap();
        let qasm = emit(&circuit).unwrap();

        assert!(!qasm.contains("qubit["));
        assert!(qasm.contains("h $3;"));
        assert!(qasm.contains("meas[0] = measure $3;"));
    }

    #[test]
    fn test_emit_parameterized() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        circuit.rz(std::f64::consts::PI / 2.0, QubitId(0)).unwrap();
        circuit.rx(0.125, QubitId(0)).unwrap();
        circuit.ry(-std::f64::consts::PI, QubitId(0)).unwrap();

        let qasm = emit(&circuit).unwrap();
        assert!(qasm.contains("rz(pi/2) q[0];"));
        assert!(qasm.contains("rx(0.125) q[0];"));
        assert!(qasm.contains("ry(-pi) q[0];"));
    }

    #[test]
    fn test_emit_full_precision_angle() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        circuit.rz(0.1234567890123, QubitId(0)).unwrap();

        let qasm = emit(&circuit).unwrap();
        assert!(qasm.contains("rz(0.1234567890123) q[0];"));
    }

    #[test]
    fn test_emit_default_register_name() {
        let mut circuit = Circuit::with_size("test", 1, 1);
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();

        let qasm = emit(&circuit).unwrap();
        assert!(qasm.contains("bit[1] c;"));
        assert!(qasm.contains("c[0] = measure q[0];"));
    }

    #[test]
    fn test_emit_reset_and_identity() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        circuit.reset(QubitId(0)).unwrap();
        circuit
            .apply(Instruction::single_qubit_gate(StandardGate::I, QubitId(0)))
            .unwrap();

        let qasm = emit(&circuit).unwrap();
        assert!(qasm.contains("reset q[0];"));
        assert!(qasm.contains("id q[0];"));
    }
}
