//! High-level circuit builder API.

use std::collections::BTreeSet;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{Gate, GateKind, StandardGate};
use crate::instruction::{Instruction, InstructionKind};
use crate::parameter::ParameterExpression;
use crate::qubit::{Clbit, ClbitId, Qubit, QubitId};

/// Values for the free parameters of a circuit, keyed by symbol name.
pub type ParameterValues = FxHashMap<String, f64>;

/// A quantum circuit.
///
/// Instructions are kept in program order. Every instruction is validated
/// against the circuit's qubits and classical bits as it is appended, so a
/// `Circuit` that exists is always well-formed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    name: String,
    qubits: Vec<Qubit>,
    clbits: Vec<Clbit>,
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            clbits: vec![],
            instructions: vec![],
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

    /// Add a single qubit to the circuit.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = QubitId(self.qubits.len() as u32);
        self.qubits.push(Qubit::new(id));
        id
    }

    /// Add a quantum register with multiple qubits.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> Vec<QubitId> {
        let name = name.into();
        (0..size)
            .map(|_| {
                let id = QubitId(self.qubits.len() as u32);
                self.qubits.push(Qubit::with_register(id, &name));
                id
            })
            .collect()
    }

    /// Add a single classical bit to the circuit.
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = ClbitId(self.clbits.len() as u32);
        self.clbits.push(Clbit::new(id));
        id
    }

    /// Add a classical register with multiple bits.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> Vec<ClbitId> {
        let name = name.into();
        (0..size)
            .map(|_| {
                let id = ClbitId(self.clbits.len() as u32);
                self.clbits.push(Clbit::with_register(id, &name));
                id
            })
            .collect()
    }

    /// Validate an instruction and append it.
    pub fn append(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        let gate_name = match &instruction.kind {
            InstructionKind::Gate(gate) => Some(gate.name().to_string()),
            _ => None,
        };

        if let InstructionKind::Gate(gate) = &instruction.kind {
            let expected = gate.num_qubits();
            let got = instruction.qubits.len() as u32;
            if expected != got {
                return Err(IrError::QubitCountMismatch {
                    gate_name: gate.name().to_string(),
                    expected,
                    got,
                });
            }
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if qubit.index() >= self.qubits.len() {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        for &clbit in &instruction.clbits {
            if clbit.index() >= self.clbits.len() {
                return Err(IrError::ClbitNotFound { clbit });
            }
        }

        if instruction.is_measure() && instruction.qubits.len() != instruction.clbits.len() {
            return Err(IrError::InvalidMeasurement(format!(
                "{} qubits measured into {} classical bits",
                instruction.qubits.len(),
                instruction.clbits.len()
            )));
        }

        self.instructions.push(instruction);
        Ok(self)
    }

    fn single(&mut self, gate: StandardGate, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(gate, qubit))
    }

    fn pair(&mut self, gate: StandardGate, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::two_qubit_gate(gate, q1, q2))
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply the identity gate.
    pub fn id(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::I, qubit)
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::H, qubit)
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::X, qubit)
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::Y, qubit)
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::Z, qubit)
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::S, qubit)
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::Sdg, qubit)
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::T, qubit)
    }

    /// Apply T-dagger gate.
    pub fn tdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::Tdg, qubit)
    }

    /// Apply sqrt(X) gate.
    pub fn sx(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::SX, qubit)
    }

    /// Apply sqrt(X)-dagger gate.
    pub fn sxdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.single(StandardGate::SXdg, qubit)
    }

    /// Apply Rx rotation.
    pub fn rx(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.single(StandardGate::Rx(theta.into()), qubit)
    }

    /// Apply Ry rotation.
    pub fn ry(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.single(StandardGate::Ry(theta.into()), qubit)
    }

    /// Apply Rz rotation.
    pub fn rz(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.single(StandardGate::Rz(theta.into()), qubit)
    }

    /// Apply phase gate.
    pub fn p(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.single(StandardGate::P(theta.into()), qubit)
    }

    /// Apply U gate.
    pub fn u(
        &mut self,
        theta: impl Into<ParameterExpression>,
        phi: impl Into<ParameterExpression>,
        lambda: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.single(
            StandardGate::U(theta.into(), phi.into(), lambda.into()),
            qubit,
        )
    }

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.pair(StandardGate::CX, control, target)
    }

    /// Apply CY gate.
    pub fn cy(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.pair(StandardGate::CY, control, target)
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.pair(StandardGate::CZ, control, target)
    }

    /// Apply controlled-Hadamard gate.
    pub fn ch(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.pair(StandardGate::CH, control, target)
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.pair(StandardGate::Swap, q1, q2)
    }

    /// Apply iSWAP gate.
    pub fn iswap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.pair(StandardGate::ISwap, q1, q2)
    }

    /// Apply controlled Rx.
    pub fn crx(
        &mut self,
        theta: impl Into<ParameterExpression>,
        control: QubitId,
        target: QubitId,
    ) -> IrResult<&mut Self> {
        self.pair(StandardGate::CRx(theta.into()), control, target)
    }

    /// Apply controlled Ry.
    pub fn cry(
        &mut self,
        theta: impl Into<ParameterExpression>,
        control: QubitId,
        target: QubitId,
    ) -> IrResult<&mut Self> {
        self.pair(StandardGate::CRy(theta.into()), control, target)
    }

    /// Apply controlled Rz.
    pub fn crz(
        &mut self,
        theta: impl Into<ParameterExpression>,
        control: QubitId,
        target: QubitId,
    ) -> IrResult<&mut Self> {
        self.pair(StandardGate::CRz(theta.into()), control, target)
    }

    /// Apply controlled phase.
    pub fn cp(
        &mut self,
        theta: impl Into<ParameterExpression>,
        control: QubitId,
        target: QubitId,
    ) -> IrResult<&mut Self> {
        self.pair(StandardGate::CP(theta.into()), control, target)
    }

    /// Apply XX rotation.
    pub fn rxx(
        &mut self,
        theta: impl Into<ParameterExpression>,
        q1: QubitId,
        q2: QubitId,
    ) -> IrResult<&mut Self> {
        self.pair(StandardGate::RXX(theta.into()), q1, q2)
    }

    /// Apply YY rotation.
    pub fn ryy(
        &mut self,
        theta: impl Into<ParameterExpression>,
        q1: QubitId,
        q2: QubitId,
    ) -> IrResult<&mut Self> {
        self.pair(StandardGate::RYY(theta.into()), q1, q2)
    }

    /// Apply ZZ rotation.
    pub fn rzz(
        &mut self,
        theta: impl Into<ParameterExpression>,
        q1: QubitId,
        q2: QubitId,
    ) -> IrResult<&mut Self> {
        self.pair(StandardGate::RZZ(theta.into()), q1, q2)
    }

    // =========================================================================
    // Three-qubit gates
    // =========================================================================

    /// Apply Toffoli (CCX) gate.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::CCX, [c1, c2, target]))
    }

    /// Apply Fredkin (CSWAP) gate.
    pub fn cswap(&mut self, control: QubitId, t1: QubitId, t2: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::CSwap, [control, t1, t2]))
    }

    // =========================================================================
    // Other operations
    // =========================================================================

    /// Apply an arbitrary gate.
    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::gate(gate, qubits))
    }

    /// Measure a qubit to a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.append(Instruction::measure(qubit, clbit))
    }

    /// Measure every qubit `i` into classical bit `i`, adding classical bits
    /// when the circuit has fewer than qubits.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        while self.clbits.len() < self.qubits.len() {
            self.add_clbit();
        }
        for i in 0..self.qubits.len() as u32 {
            self.measure(QubitId(i), ClbitId(i))?;
        }
        Ok(self)
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::reset(qubit))
    }

    /// Apply a barrier to specified qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.append(Instruction::barrier(qubits))
    }

    /// Apply a barrier to all qubits.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let qubits: Vec<_> = self.qubits.iter().map(|q| q.id).collect();
        self.append(Instruction::barrier(qubits))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the circuit.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    /// Get the qubits in the circuit.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// Get the classical bits in the circuit.
    pub fn clbits(&self) -> &[Clbit] {
        &self.clbits
    }

    /// Instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of gate operations, excluding measurements, resets and barriers.
    pub fn gate_count(&self) -> usize {
        self.instructions.iter().filter(|i| i.is_gate()).count()
    }

    /// Check if the circuit contains at least one measurement.
    pub fn has_measurements(&self) -> bool {
        self.instructions.iter().any(Instruction::is_measure)
    }

    /// Qubits that are measured somewhere in the circuit, ascending.
    pub fn measured_qubits(&self) -> Vec<QubitId> {
        let set: BTreeSet<QubitId> = self
            .instructions
            .iter()
            .filter(|i| i.is_measure())
            .flat_map(|i| i.qubits.iter().copied())
            .collect();
        set.into_iter().collect()
    }

    /// Check that no qubit is touched again after it is measured.
    ///
    /// Barriers are ignored. A circuit without measurements trivially
    /// satisfies this.
    pub fn measurements_are_final(&self) -> bool {
        let mut measured = FxHashSet::default();
        for inst in &self.instructions {
            if inst.is_barrier() {
                continue;
            }
            if inst.qubits.iter().any(|q| measured.contains(q)) {
                return false;
            }
            if inst.is_measure() {
                measured.extend(inst.qubits.iter().copied());
            }
        }
        true
    }

    /// Remove measurements (and the barriers around them) that are not
    /// followed by any other operation on the measured qubit.
    ///
    /// Classical bits are kept so the circuit shape does not change.
    pub fn remove_final_measurements(&mut self) {
        let mut active: FxHashSet<QubitId> = FxHashSet::default();
        let mut keep = vec![true; self.instructions.len()];

        for (idx, inst) in self.instructions.iter().enumerate().rev() {
            match inst.kind {
                InstructionKind::Measure => {
                    if inst.qubits.iter().all(|q| !active.contains(q)) {
                        keep[idx] = false;
                    } else {
                        active.extend(inst.qubits.iter().copied());
                    }
                }
                InstructionKind::Barrier => {
                    if inst.qubits.iter().all(|q| !active.contains(q)) {
                        keep[idx] = false;
                    }
                }
                _ => active.extend(inst.qubits.iter().copied()),
            }
        }

        let mut flags = keep.into_iter();
        self.instructions
            .retain(|_| flags.next().unwrap_or(true));
    }

    /// Circuit depth: the longest path through qubit and classical wires,
    /// not counting barriers.
    pub fn depth(&self) -> usize {
        let mut qubit_level = vec![0usize; self.qubits.len()];
        let mut clbit_level = vec![0usize; self.clbits.len()];
        let mut depth = 0;

        for inst in self.instructions.iter().filter(|i| !i.is_barrier()) {
            let level = inst
                .qubits
                .iter()
                .map(|q| qubit_level[q.index()])
                .chain(inst.clbits.iter().map(|c| clbit_level[c.index()]))
                .max()
                .unwrap_or(0)
                + 1;
            for q in &inst.qubits {
                qubit_level[q.index()] = level;
            }
            for c in &inst.clbits {
                clbit_level[c.index()] = level;
            }
            depth = depth.max(level);
        }
        depth
    }

    /// Names of free parameters, sorted.
    pub fn parameters(&self) -> Vec<String> {
        let mut set = BTreeSet::new();
        for inst in &self.instructions {
            if let Some(gate) = inst.as_standard_gate() {
                for p in gate.parameters() {
                    p.collect_symbols(&mut set);
                }
            }
        }
        set.into_iter().collect()
    }

    /// Check if the circuit still has free parameters.
    pub fn is_parameterized(&self) -> bool {
        !self.parameters().is_empty()
    }

    /// Return a copy with all free parameters replaced by concrete values.
    ///
    /// Every free parameter must have a value; extra entries are ignored.
    pub fn bind_parameters(&self, values: &ParameterValues) -> IrResult<Self> {
        if let Some(missing) = self
            .parameters()
            .into_iter()
            .find(|name| !values.contains_key(name))
        {
            return Err(IrError::UnboundParameter(missing));
        }

        let mut bound = self.clone();
        for inst in &mut bound.instructions {
            if let InstructionKind::Gate(Gate {
                kind: GateKind::Standard(g),
                ..
            }) = &mut inst.kind
            {
                *g = g.bind(values);
            }
        }
        Ok(bound)
    }

    /// Check if every instruction is a Clifford operation.
    pub fn is_clifford(&self) -> bool {
        self.instructions.iter().all(Instruction::is_clifford)
    }
}
