//! Layout passes for mapping virtual qubits to physical qubits.

use qpass_ir::Circuit;

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::{Layout, PropertySet};

/// Trivial layout pass.
///
/// Maps virtual qubit i to physical qubit i. Every device qubit is
/// equivalent for a single-qubit entropy circuit.
pub struct TrivialLayout;

impl Pass for TrivialLayout {
    fn name(&self) -> &'static str {
        "TrivialLayout"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    #[allow(clippy::cast_possible_truncation)]
    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let available = properties.num_physical_qubits.unwrap_or(0);
        let required = circuit.num_qubits();

        if required > available as usize {
            return Err(CompileError::LayoutTooSmall {
                required,
                available,
            });
        }

        properties.layout = Some(Layout::trivial(required as u32));
        Ok(())
    }

    fn should_run(&self, circuit: &Circuit, properties: &PropertySet) -> bool {
        properties.layout.is_none()
            && properties.num_physical_qubits.is_some()
            && !circuit.is_physical()
    }
}

/// Rewrites the circuit onto the physical qubits chosen by the layout.
pub struct ApplyLayout;

impl Pass for ApplyLayout {
    fn name(&self) -> &'static str {
        "ApplyLayout"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let (Some(layout), Some(device_qubits)) =
            (properties.layout.as_ref(), properties.num_physical_qubits)
        else {
            return Ok(());
        };

        if layout.len() < circuit.num_qubits() {
            return Err(CompileError::LayoutTooSmall {
                required: circuit.num_qubits(),
                available: device_qubits,
            });
        }

        *circuit = circuit
            .clone()
            .into_physical(layout.as_slice(), device_qubits)?;
        Ok(())
    }

    fn should_run(&self, circuit: &Circuit, properties: &PropertySet) -> bool {
        properties.layout.is_some()
            && properties.num_physical_qubits.is_some()
            && !circuit.is_physical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::BasisGates;
    use qpass_ir::QubitId;

    #[test]
    fn test_trivial_layout() {
        let mut circuit = Circuit::coin_flip().unwrap();
        let mut props = PropertySet::new().with_target(5, BasisGates::ibm());

        assert!(TrivialLayout.should_run(&circuit, &props));
        TrivialLayout.run(&mut circuit, &mut props).unwrap();

        let layout = props.layout.as_ref().unwrap();
        assert_eq!(layout.get_physical(QubitId(0)), Some(0));
        assert!(!circuit.is_physical());
    }

    #[test]
    fn test_trivial_layout_too_large() {
        let mut circuit = Circuit::with_size("test", 3, 0);
        let mut props = PropertySet::new().with_target(2, BasisGates::ibm());

        let result = TrivialLayout.run(&mut circuit, &mut props);
        assert!(matches!(
            result,
            Err(CompileError::LayoutTooSmall {
                required: 3,
                available: 2
            })
        ));
    }

    #[test]
    fn test_trivial_layout_skipped_without_target() {
        let circuit = Circuit::coin_flip().unwrap();
        assert!(!TrivialLayout.should_run(&circuit, &PropertySet::new()));
    }

    #[test]
    fn test_apply_layout() {
        let mut circuit = Circuit::coin_flip().unwrap();
        let mut props = PropertySet::new()
            .with_target(5, BasisGates::ibm())
            .with_layout(Layout::from_physical([4]));

        ApplyLayout.run(&mut circuit, &mut props).unwrap();

        assert!(circuit.is_physical());
        assert_eq!(circuit.physical_qubits(), Some(5));
        assert_eq!(circuit.qubits()[0].id, QubitId(4));
        assert_eq!(circuit.clbit_register(), "meas");
        assert!(!ApplyLayout.should_run(&circuit, &props));
    }
}
