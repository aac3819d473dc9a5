//! Pass manager for orchestrating compilation.

use tracing::{debug, info, instrument};

use qpass_ir::Circuit;

use crate::error::CompileResult;
use crate::pass::Pass;
use crate::passes::{
    ApplyLayout, BasisTranslation, BasisVerification, Optimize1qGates,
    RemoveDiagonalBeforeMeasure, TrivialLayout,
};
use crate::property::{BasisGates, PropertySet};

/// Manages and executes a sequence of compilation passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Names of the scheduled passes, in order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Run all passes on the given circuit.
    #[instrument(skip(self, circuit, properties), fields(circuit = circuit.name()))]
    pub fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on circuit with {} qubits",
            self.passes.len(),
            circuit.num_qubits()
        );

        for pass in &self.passes {
            if pass.should_run(circuit, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(circuit, properties)?;
                debug!("Pass {} completed, ops: {}", pass.name(), circuit.num_ops());
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!(
            "Pass manager completed, final depth: {}, ops: {}",
            circuit.depth(),
            circuit.num_ops()
        );

        Ok(())
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating pass managers with preset configurations.
pub struct PassManagerBuilder {
    /// Optimization level (0-3).
    optimization_level: u8,
    /// Target properties.
    properties: PropertySet,
}

impl PassManagerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            optimization_level: 1,
            properties: PropertySet::new(),
        }
    }

    /// Set the optimization level.
    ///
    /// - Level 0: layout, translation and verification only
    /// - Level 1: adds single-qubit optimization (default)
    /// - Levels 2 and 3: same as level 1
    #[must_use]
    pub fn with_optimization_level(mut self, level: u8) -> Self {
        self.optimization_level = level.min(3);
        self
    }

    /// Set the target properties.
    #[must_use]
    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }

    /// Set the target device size and basis gates.
    #[must_use]
    pub fn with_target(mut self, num_qubits: u32, basis_gates: BasisGates) -> Self {
        self.properties.num_physical_qubits = Some(num_qubits);
        self.properties.basis_gates = Some(basis_gates);
        self
    }

    /// Build the pass manager and return it with the properties.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();

        if self.properties.num_physical_qubits.is_some() {
            pm.add_pass(TrivialLayout);
            pm.add_pass(ApplyLayout);
        }

        if self.properties.basis_gates.is_some() {
            pm.add_pass(BasisTranslation);
        }

        if self.optimization_level >= 1 {
            pm.add_pass(Optimize1qGates);
            pm.add_pass(RemoveDiagonalBeforeMeasure);
        }

        // Last, so it also covers the optimization passes.
        if self.properties.basis_gates.is_some() {
            pm.add_pass(BasisVerification);
        }

        (pm, self.properties)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qpass_ir::QubitId;

    #[test]
    fn test_empty_pass_manager() {
        let pm = PassManager::new();
        assert!(pm.is_empty());
        assert_eq!(pm.len(), 0);

        let mut props = PropertySet::new();
        let mut circuit = Circuit::coin_flip().unwrap();
        pm.run(&mut circuit, &mut props).unwrap();
        assert_eq!(circuit.num_ops(), 2);
    }

    #[test]
    fn test_level_0_passes() {
        let (pm, _) = PassManagerBuilder::new()
            .with_optimization_level(0)
            .with_target(5, BasisGates::ibm())
            .build();

        assert_eq!(
            pm.pass_names(),
            vec![
                "TrivialLayout",
                "ApplyLayout",
                "BasisTranslation",
                "BasisVerification"
            ]
        );
    }

    #[test]
    fn test_level_1_passes() {
        let (pm, props) = PassManagerBuilder::new()
            .with_target(5, BasisGates::ibm())
            .build();

        assert_eq!(pm.len(), 6);
        assert_eq!(props.num_physical_qubits, Some(5));
        assert!(props.basis_gates.is_some());
    }

    #[test]
    fn test_optimization_level_clamped() {
        let (pm3, _) = PassManagerBuilder::new()
            .with_optimization_level(9)
            .with_target(5, BasisGates::ibm())
            .build();
        assert_eq!(pm3.len(), 6);
    }

    #[test]
    fn test_compile_coin_flip_for_ibm() {
        let (pm, mut props) = PassManagerBuilder::new()
            .with_optimization_level(1)
            .with_target(127, BasisGates::eagle())
            .build();

        let mut circuit = Circuit::coin_flip().unwrap();
        pm.run(&mut circuit, &mut props).unwrap();

        assert!(circuit.is_physical());
        assert_eq!(circuit.clbit_register(), "meas");
        let names: Vec<_> = circuit.instructions().iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["rz", "sx", "rz", "barrier", "measure"]);
        assert_eq!(circuit.instructions()[4].qubits, vec![QubitId(0)]);
    }
}
