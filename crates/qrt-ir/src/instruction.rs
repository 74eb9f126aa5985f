//! Circuit instructions combining gates with operands.

use serde::{Deserialize, Serialize};

use crate::gate::{Gate, GateKind, StandardGate};
use crate::qubit::{ClbitId, QubitId};

/// The kind of instruction in a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// A quantum gate operation.
    Gate(Gate),
    /// Measurement of one qubit into one classical bit per operand pair.
    Measure,
    /// Reset qubit to |0⟩.
    Reset,
    /// Barrier (synchronization point, no effect on simulation).
    Barrier,
}

/// A complete instruction with operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The kind of instruction.
    pub kind: InstructionKind,
    /// Qubits this instruction operates on.
    pub qubits: Vec<QubitId>,
    /// Classical bits this instruction writes (measure only).
    pub clbits: Vec<ClbitId>,
}

impl Instruction {
    /// Create a gate instruction.
    pub fn gate(gate: impl Into<Gate>, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Gate(gate.into()),
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    /// Create a single-qubit gate instruction.
    pub fn single_qubit_gate(gate: StandardGate, qubit: QubitId) -> Self {
        Self::gate(gate, [qubit])
    }

    /// Create a two-qubit gate instruction.
    pub fn two_qubit_gate(gate: StandardGate, q1: QubitId, q2: QubitId) -> Self {
        Self::gate(gate, [q1, q2])
    }

    /// Create a measurement instruction.
    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Self {
            kind: InstructionKind::Measure,
            qubits: vec![qubit],
            clbits: vec![clbit],
        }
    }

    /// Create a reset instruction.
    pub fn reset(qubit: QubitId) -> Self {
        Self {
            kind: InstructionKind::Reset,
            qubits: vec![qubit],
            clbits: vec![],
        }
    }

    /// Create a barrier instruction.
    pub fn barrier(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Barrier,
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    /// Check if this is a gate instruction.
    pub fn is_gate(&self) -> bool {
        matches!(self.kind, InstructionKind::Gate(_))
    }

    /// Check if this is a measurement.
    pub fn is_measure(&self) -> bool {
        matches!(self.kind, InstructionKind::Measure)
    }

    /// Check if this is a reset.
    pub fn is_reset(&self) -> bool {
        matches!(self.kind, InstructionKind::Reset)
    }

    /// Check if this is a barrier.
    pub fn is_barrier(&self) -> bool {
        matches!(self.kind, InstructionKind::Barrier)
    }

    /// The standard gate carried by this instruction, if any.
    pub fn as_standard_gate(&self) -> Option<&StandardGate> {
        match &self.kind {
            InstructionKind::Gate(Gate {
                kind: GateKind::Standard(g),
                ..
            }) => Some(g),
            _ => None,
        }
    }

    /// Get the name of this instruction.
    pub fn name(&self) -> &str {
        match &self.kind {
            InstructionKind::Gate(g) => g.name(),
            InstructionKind::Measure => "measure",
            InstructionKind::Reset => "reset",
            InstructionKind::Barrier => "barrier",
        }
    }

    /// Check if the instruction can be handled by a stabilizer simulator.
    ///
    /// Measurements, resets and barriers always qualify.
    pub fn is_clifford(&self) -> bool {
        match &self.kind {
            InstructionKind::Gate(g) => match &g.kind {
                GateKind::Standard(s) => s.is_clifford(),
                GateKind::Custom(_) => false,
            },
            _ => true,
        }
    }
}
