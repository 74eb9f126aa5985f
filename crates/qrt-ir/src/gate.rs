//! Quantum gate types.

use num_complex::Complex64;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::parameter::ParameterExpression;

/// Standard gates with known semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// sqrt(X) gate.
    SX,
    /// sqrt(X)-dagger gate.
    SXdg,

    // Single-qubit rotation gates
    /// Rotation around X axis.
    Rx(ParameterExpression),
    /// Rotation around Y axis.
    Ry(ParameterExpression),
    /// Rotation around Z axis.
    Rz(ParameterExpression),
    /// Phase gate.
    P(ParameterExpression),
    /// Universal single-qubit gate U(θ, φ, λ).
    U(
        ParameterExpression,
        ParameterExpression,
        ParameterExpression,
    ),

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Y gate.
    CY,
    /// Controlled-Z gate.
    CZ,
    /// Controlled-Hadamard gate.
    CH,
    /// SWAP gate.
    Swap,
    /// iSWAP gate.
    ISwap,
    /// Controlled rotation around X.
    CRx(ParameterExpression),
    /// Controlled rotation around Y.
    CRy(ParameterExpression),
    /// Controlled rotation around Z.
    CRz(ParameterExpression),
    /// Controlled phase gate.
    CP(ParameterExpression),
    /// XX rotation gate.
    RXX(ParameterExpression),
    /// YY rotation gate.
    RYY(ParameterExpression),
    /// ZZ rotation gate.
    RZZ(ParameterExpression),

    // Three-qubit gates
    /// Toffoli gate (CCX).
    CCX,
    /// Fredkin gate (CSWAP).
    CSwap,
}

impl StandardGate {
    /// Get the name of this gate (OpenQASM 3 naming).
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::SX => "sx",
            StandardGate::SXdg => "sxdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::U(_, _, _) => "u",
            StandardGate::CX => "cx",
            StandardGate::CY => "cy",
            StandardGate::CZ => "cz",
            StandardGate::CH => "ch",
            StandardGate::Swap => "swap",
            StandardGate::ISwap => "iswap",
            StandardGate::CRx(_) => "crx",
            StandardGate::CRy(_) => "cry",
            StandardGate::CRz(_) => "crz",
            StandardGate::CP(_) => "cp",
            StandardGate::RXX(_) => "rxx",
            StandardGate::RYY(_) => "ryy",
            StandardGate::RZZ(_) => "rzz",
            StandardGate::CCX => "ccx",
            StandardGate::CSwap => "cswap",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::CH
            | StandardGate::Swap
            | StandardGate::ISwap
            | StandardGate::CRx(_)
            | StandardGate::CRy(_)
            | StandardGate::CRz(_)
            | StandardGate::CP(_)
            | StandardGate::RXX(_)
            | StandardGate::RYY(_)
            | StandardGate::RZZ(_) => 2,

            StandardGate::CCX | StandardGate::CSwap => 3,

            _ => 1,
        }
    }

    /// Get the angle parameters of this gate.
    pub fn parameters(&self) -> Vec<&ParameterExpression> {
        match self {
            StandardGate::Rx(p)
            | StandardGate::Ry(p)
            | StandardGate::Rz(p)
            | StandardGate::P(p)
            | StandardGate::CRx(p)
            | StandardGate::CRy(p)
            | StandardGate::CRz(p)
            | StandardGate::CP(p)
            | StandardGate::RXX(p)
            | StandardGate::RYY(p)
            | StandardGate::RZZ(p) => vec![p],

            StandardGate::U(a, b, c) => vec![a, b, c],

            _ => vec![],
        }
    }

    /// Check if any angle of this gate is still symbolic.
    pub fn is_parameterized(&self) -> bool {
        self.parameters().iter().any(|p| p.is_symbolic())
    }

    /// Check if this gate belongs to the Clifford group handled by the
    /// stabilizer engine.
    pub fn is_clifford(&self) -> bool {
        matches!(
            self,
            StandardGate::I
                | StandardGate::X
                | StandardGate::Y
                | StandardGate::Z
                | StandardGate::H
                | StandardGate::S
                | StandardGate::Sdg
                | StandardGate::SX
                | StandardGate::SXdg
                | StandardGate::CX
                | StandardGate::CY
                | StandardGate::CZ
                | StandardGate::Swap
        )
    }

    /// Return a copy with every symbol that has a value in `values` bound.
    pub fn bind(&self, values: &FxHashMap<String, f64>) -> Self {
        let b = |p: &ParameterExpression| p.bind(values);
        match self {
            StandardGate::Rx(p) => StandardGate::Rx(b(p)),
            StandardGate::Ry(p) => StandardGate::Ry(b(p)),
            StandardGate::Rz(p) => StandardGate::Rz(b(p)),
            StandardGate::P(p) => StandardGate::P(b(p)),
            StandardGate::U(t, ph, l) => StandardGate::U(b(t), b(ph), b(l)),
            StandardGate::CRx(p) => StandardGate::CRx(b(p)),
            StandardGate::CRy(p) => StandardGate::CRy(b(p)),
            StandardGate::CRz(p) => StandardGate::CRz(b(p)),
            StandardGate::CP(p) => StandardGate::CP(b(p)),
            StandardGate::RXX(p) => StandardGate::RXX(b(p)),
            StandardGate::RYY(p) => StandardGate::RYY(b(p)),
            StandardGate::RZZ(p) => StandardGate::RZZ(b(p)),
            other => other.clone(),
        }
    }
}

/// A quantum gate, either standard or custom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateKind {
    /// A standard gate with known semantics.
    Standard(StandardGate),
    /// A user-supplied unitary.
    Custom(CustomGate),
}

impl GateKind {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            GateKind::Standard(g) => g.name(),
            GateKind::Custom(g) => &g.name,
        }
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            GateKind::Standard(g) => g.num_qubits(),
            GateKind::Custom(g) => g.num_qubits,
        }
    }
}

/// A user-defined gate given by its unitary matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomGate {
    /// The name of the gate.
    pub name: String,
    /// The number of qubits it operates on.
    pub num_qubits: u32,
    /// Unitary matrix, row-major, 2^n × 2^n. Row and column indices use
    /// the gate's first operand as the least significant bit.
    pub matrix: Vec<Complex64>,
}

impl CustomGate {
    /// Create a custom gate from its unitary.
    ///
    /// Returns `None` if `matrix.len()` is not `(2^num_qubits)^2`.
    pub fn new(name: impl Into<String>, num_qubits: u32, matrix: Vec<Complex64>) -> Option<Self> {
        let dim = 1usize << num_qubits;
        if matrix.len() != dim * dim {
            return None;
        }
        Some(Self {
            name: name.into(),
            num_qubits,
            matrix,
        })
    }
}

/// A gate with an optional label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// The kind of gate.
    pub kind: GateKind,
    /// Optional label for the gate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Gate {
    /// Create a new gate from a standard gate.
    pub fn standard(gate: StandardGate) -> Self {
        Self {
            kind: GateKind::Standard(gate),
            label: None,
        }
    }

    /// Create a new gate from a custom gate.
    pub fn custom(gate: CustomGate) -> Self {
        Self {
            kind: GateKind::Custom(gate),
            label: None,
        }
    }

    /// Add a label to the gate.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the name of this gate.
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.kind.num_qubits()
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::standard(gate)
    }
}

impl From<CustomGate> for Gate {
    fn from(gate: CustomGate) -> Self {
        Gate::custom(gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_standard_gate_properties() {
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert_eq!(StandardGate::CX.num_qubits(), 2);
        assert_eq!(StandardGate::CCX.num_qubits(), 3);

        assert!(!StandardGate::Rx(ParameterExpression::constant(PI)).is_parameterized());
        assert!(StandardGate::Rx(ParameterExpression::symbol("theta")).is_parameterized());
    }

    #[test]
    fn test_clifford_classification() {
        assert!(StandardGate::H.is_clifford());
        assert!(StandardGate::CX.is_clifford());
        assert!(!StandardGate::T.is_clifford());
        assert!(!StandardGate::Rz(ParameterExpression::constant(0.1)).is_clifford());
    }

    #[test]
    fn test_bind_gate() {
        let mut values = FxHashMap::default();
        values.insert("theta".to_string(), 0.25);
        let bound = StandardGate::RZZ(ParameterExpression::symbol("theta")).bind(&values);
        assert_eq!(bound.parameters()[0].as_f64(), Some(0.25));
    }

    #[test]
    fn test_custom_gate_dimension_check() {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        assert!(CustomGate::new("id1", 1, vec![one, zero, zero, one]).is_some());
        assert!(CustomGate::new("bad", 2, vec![one, zero, zero, one]).is_none());
    }
}
