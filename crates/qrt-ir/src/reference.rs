//! Pre-built reference circuits.

use crate::circuit::Circuit;
use crate::error::IrResult;
use crate::qubit::{ClbitId, QubitId};

/// Bell state circuit: H on q0, CX q0→q1, measure q0→c0 and q1→c1.
///
/// Ideal outcomes are `00` and `11` with equal probability.
pub fn bell() -> IrResult<Circuit> {
    let mut circuit = Circuit::with_size("bell", 2, 2);
    let q0 = QubitId(0);
    let q1 = QubitId(1);

    circuit
        .h(q0)?
        .cx(q0, q1)?
        .measure(q0, ClbitId(0))?
        .measure(q1, ClbitId(1))?;

    Ok(circuit)
}

/// GHZ state circuit on `n` qubits, measured into `n` classical bits.
pub fn ghz(n: u32) -> IrResult<Circuit> {
    if n == 0 {
        return Ok(Circuit::new("ghz_0"));
    }

    let mut circuit = Circuit::with_size(format!("ghz_{n}"), n, n);
    circuit.h(QubitId(0))?;
    for i in 0..n - 1 {
        circuit.cx(QubitId(i), QubitId(i + 1))?;
    }
    for i in 0..n {
        circuit.measure(QubitId(i), ClbitId(i))?;
    }

    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bell() {
        let circuit = bell().unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(circuit.depth(), 3);
        assert!(circuit.is_clifford());
    }

    #[test]
    fn test_ghz() {
        let circuit = ghz(5).unwrap();
        assert_eq!(circuit.name(), "ghz_5");
        assert_eq!(circuit.gate_count(), 5);
        assert_eq!(circuit.measured_qubits().len(), 5);
        assert_eq!(ghz(0).unwrap().num_qubits(), 0);
    }
}
