//! Statevector simulation engine.

use num_complex::Complex64;
use rand::Rng;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

use qpass_ir::StandardGate;

/// A 2x2 unitary, row-major.
type Matrix2 = [[Complex64; 2]; 2];

/// A statevector representing a quantum state.
///
/// Qubit `k` is bit `k` of the basis-state index.
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Apply a single-qubit gate.
    pub fn apply_gate(&mut self, gate: &StandardGate, qubit: usize) {
        if matches!(gate, StandardGate::I) {
            return;
        }
        self.apply_matrix(qubit, &gate_matrix(gate));
    }

    fn apply_matrix(&mut self, qubit: usize, m: &Matrix2) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
                self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
            }
        }
    }

    /// Probability of reading 1 on a qubit.
    pub fn probability_one(&self, qubit: usize) -> f64 {
        let mask = 1 << qubit;
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, amp)| amp.norm_sqr())
            .sum()
    }

    /// Measure one qubit, collapsing the state onto the outcome.
    pub fn measure(&mut self, qubit: usize, rng: &mut impl Rng) -> bool {
        let p1 = self.probability_one(qubit);
        let r: f64 = rng.r#gen();
        let outcome = r < p1;
        self.collapse(qubit, outcome, if outcome { p1 } else { 1.0 - p1 });
        outcome
    }

    fn collapse(&mut self, qubit: usize, outcome: bool, probability: f64) {
        let mask = 1 << qubit;
        let norm = probability.sqrt();
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if (i & mask != 0) == outcome {
                if norm > 0.0 {
                    *amp /= norm;
                }
            } else {
                *amp = Complex64::new(0.0, 0.0);
            }
        }
    }

    /// Reset a qubit to |0⟩: measure it, then flip it back if it read 1.
    pub fn reset(&mut self, qubit: usize, rng: &mut impl Rng) {
        if self.measure(qubit, rng) {
            self.apply_gate(&StandardGate::X, qubit);
        }
    }

    /// Sample a full-register outcome without collapsing.
    pub fn sample(&self, rng: &mut impl Rng) -> usize {
        let r: f64 = rng.r#gen();

        let mut cumulative = 0.0;
        for (i, amp) in self.amplitudes.iter().enumerate() {
            cumulative += amp.norm_sqr();
            if r < cumulative {
                return i;
            }
        }

        // Rounding can leave the cumulative sum just below 1.
        self.amplitudes.len() - 1
    }

    /// Convert a sampled outcome to a bitstring, highest qubit first.
    pub fn outcome_to_bitstring(&self, outcome: usize) -> String {
        format!("{:0width$b}", outcome, width = self.num_qubits)
    }
}

/// Unitary of a single-qubit gate.
fn gate_matrix(gate: &StandardGate) -> Matrix2 {
    let zero = Complex64::new(0.0, 0.0);
    let one = Complex64::new(1.0, 0.0);
    let i = Complex64::new(0.0, 1.0);
    let phase = |theta: f64| [[one, zero], [zero, Complex64::from_polar(1.0, theta)]];

    match gate {
        StandardGate::I => [[one, zero], [zero, one]],
        StandardGate::X => [[zero, one], [one, zero]],
        StandardGate::Y => [[zero, -i], [i, zero]],
        StandardGate::Z => [[one, zero], [zero, -one]],
        StandardGate::H => {
            let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
            [[h, h], [h, -h]]
        }
        StandardGate::S => phase(PI / 2.0),
        StandardGate::Sdg => phase(-PI / 2.0),
        StandardGate::T => phase(PI / 4.0),
        StandardGate::Tdg => phase(-PI / 4.0),
        StandardGate::SX => {
            let p = Complex64::new(0.5, 0.5);
            let m = Complex64::new(0.5, -0.5);
            [[p, m], [m, p]]
        }
        StandardGate::Rx(theta) => {
            let c = Complex64::new((theta / 2.0).cos(), 0.0);
            let s = Complex64::new(0.0, -(theta / 2.0).sin());
            [[c, s], [s, c]]
        }
        StandardGate::Ry(theta) => {
            let c = Complex64::new((theta / 2.0).cos(), 0.0);
            let s = Complex64::new((theta / 2.0).sin(), 0.0);
            [[c, -s], [s, c]]
        }
        StandardGate::Rz(theta) => [
            [Complex64::from_polar(1.0, -theta / 2.0), zero],
            [zero, Complex64::from_polar(1.0, theta / 2.0)],
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2);
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(1.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[3], Complex64::new(0.0, 0.0)));
    }

    #[test]
    fn test_hadamard() {
        let mut sv = Statevector::new(1);
        sv.apply_gate(&StandardGate::H, 0);

        assert!(approx_eq(sv.amplitudes[0], Complex64::new(FRAC_1_SQRT_2, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(FRAC_1_SQRT_2, 0.0)));
        assert!((sv.probability_one(0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_sx_squared_is_x() {
        let mut sv = Statevector::new(1);
        sv.apply_gate(&StandardGate::SX, 0);
        sv.apply_gate(&StandardGate::SX, 0);
        assert!((sv.probability_one(0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_translated_hadamard_matches() {
        // rz(π/2) · sx · rz(π/2) equals H up to global phase.
        let mut sv = Statevector::new(1);
        sv.apply_gate(&StandardGate::Rz(PI / 2.0), 0);
        sv.apply_gate(&StandardGate::SX, 0);
        sv.apply_gate(&StandardGate::Rz(PI / 2.0), 0);
        assert!((sv.probability_one(0) - 0.5).abs() < 1e-12);

        // H · H = I, so applying the sequence twice returns to |0⟩.
        sv.apply_gate(&StandardGate::Rz(PI / 2.0), 0);
        sv.apply_gate(&StandardGate::SX, 0);
        sv.apply_gate(&StandardGate::Rz(PI / 2.0), 0);
        assert!(sv.probability_one(0) < 1e-12);
    }

    #[test]
    fn test_rotations() {
        let mut sv = Statevector::new(1);
        sv.apply_gate(&StandardGate::Ry(PI), 0);
        assert!((sv.probability_one(0) - 1.0).abs() < 1e-12);

        let mut sv = Statevector::new(1);
        sv.apply_gate(&StandardGate::Rx(PI / 2.0), 0);
        assert!((sv.probability_one(0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_diagonal_gates_keep_probabilities() {
        let mut sv = Statevector::new(1);
        sv.apply_gate(&StandardGate::H, 0);
        for gate in [
            StandardGate::Z,
            StandardGate::S,
            StandardGate::Sdg,
            StandardGate::T,
            StandardGate::Tdg,
            StandardGate::Rz(0.3),
        ] {
            sv.apply_gate(&gate, 0);
        }
        assert!((sv.probability_one(0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_measure_collapses() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut sv = Statevector::new(1);
        sv.apply_gate(&StandardGate::H, 0);

        let first = sv.measure(0, &mut rng);
        for _ in 0..20 {
            assert_eq!(sv.measure(0, &mut rng), first);
        }
    }

    #[test]
    fn test_reset() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut sv = Statevector::new(2);
        sv.apply_gate(&StandardGate::X, 1);
        sv.apply_gate(&StandardGate::H, 0);

        sv.reset(1, &mut rng);
        assert!(sv.probability_one(1) < 1e-12);
        assert!((sv.probability_one(0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_sample_deterministic() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut sv = Statevector::new(2);
        sv.apply_gate(&StandardGate::X, 0);

        for _ in 0..100 {
            let outcome = sv.sample(&mut rng);
            assert_eq!(outcome, 1);
            assert_eq!(sv.outcome_to_bitstring(outcome), "01");
        }
    }
}
