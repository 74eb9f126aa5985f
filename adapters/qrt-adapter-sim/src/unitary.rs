//! Gate matrices and a generic k-qubit matrix kernel.
//!
//! Matrices are row-major `2^k × 2^k`. Row and column indices treat the
//! gate's first operand as the least significant bit, so for a controlled
//! gate applied to `[control, target]` the controlled block sits on
//! indices 1 and 3.

use std::f64::consts::FRAC_1_SQRT_2;

use num_complex::Complex64;

use qrt_hal::{HalError, HalResult};
use qrt_ir::{GateKind, ParameterExpression, StandardGate};

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

/// Resolve a gate angle, rejecting unbound symbols.
pub(crate) fn angle(param: &ParameterExpression) -> HalResult<f64> {
    param.as_f64().ok_or_else(|| {
        HalError::InvalidCircuit(format!(
            "parameter {param} is unbound; bind parameters before running"
        ))
    })
}

/// The unitary of a gate.
pub fn gate_matrix(gate: &GateKind) -> HalResult<Vec<Complex64>> {
    match gate {
        GateKind::Standard(g) => standard_matrix(g),
        GateKind::Custom(custom) => Ok(custom.matrix.clone()),
    }
}

fn standard_matrix(gate: &StandardGate) -> HalResult<Vec<Complex64>> {
    let m = match gate {
        StandardGate::I => vec![ONE, ZERO, ZERO, ONE],
        StandardGate::X => vec![ZERO, ONE, ONE, ZERO],
        StandardGate::Y => vec![ZERO, -I, I, ZERO],
        StandardGate::Z => vec![ONE, ZERO, ZERO, -ONE],
        StandardGate::H => {
            let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
            vec![h, h, h, -h]
        }
        StandardGate::S => phase(std::f64::consts::FRAC_PI_2),
        StandardGate::Sdg => phase(-std::f64::consts::FRAC_PI_2),
        StandardGate::T => phase(std::f64::consts::FRAC_PI_4),
        StandardGate::Tdg => phase(-std::f64::consts::FRAC_PI_4),
        StandardGate::SX => {
            let a = Complex64::new(0.5, 0.5);
            let b = Complex64::new(0.5, -0.5);
            vec![a, b, b, a]
        }
        StandardGate::SXdg => {
            let a = Complex64::new(0.5, -0.5);
            let b = Complex64::new(0.5, 0.5);
            vec![a, b, b, a]
        }
        StandardGate::Rx(t) => rx(angle(t)?),
        StandardGate::Ry(t) => ry(angle(t)?),
        StandardGate::Rz(t) => rz(angle(t)?),
        StandardGate::P(t) => phase(angle(t)?),
        StandardGate::U(t, p, l) => u(angle(t)?, angle(p)?, angle(l)?),

        StandardGate::CX
        | StandardGate::CY
        | StandardGate::CZ
        | StandardGate::CH
        | StandardGate::CRx(_)
        | StandardGate::CRy(_)
        | StandardGate::CRz(_)
        | StandardGate::CP(_) => {
            let base = control_base(gate).ok_or_else(|| {
                HalError::Backend(format!("{} has no single-qubit base gate", gate.name()))
            })?;
            controlled(&standard_matrix(&base)?)
        }
        StandardGate::Swap => permutation(4, &[(1, 2)]),
        StandardGate::ISwap => {
            let mut m = vec![ZERO; 16];
            m[0] = ONE;
            m[4 + 2] = I;
            m[2 * 4 + 1] = I;
            m[15] = ONE;
            m
        }
        StandardGate::RXX(t) => {
            let theta = angle(t)?;
            let c = Complex64::new((theta / 2.0).cos(), 0.0);
            let s = Complex64::new(0.0, -(theta / 2.0).sin());
            let mut m = diagonal(&[c, c, c, c]);
            m[3] = s;
            m[4 + 2] = s;
            m[2 * 4 + 1] = s;
            m[3 * 4] = s;
            m
        }
        StandardGate::RYY(t) => {
            let theta = angle(t)?;
            let c = Complex64::new((theta / 2.0).cos(), 0.0);
            let s = Complex64::new(0.0, (theta / 2.0).sin());
            let mut m = diagonal(&[c, c, c, c]);
            m[3] = s;
            m[3 * 4] = s;
            m[4 + 2] = -s;
            m[2 * 4 + 1] = -s;
            m
        }
        StandardGate::RZZ(t) => {
            let theta = angle(t)?;
            let a = Complex64::from_polar(1.0, -theta / 2.0);
            let b = Complex64::from_polar(1.0, theta / 2.0);
            diagonal(&[a, b, b, a])
        }

        StandardGate::CCX => permutation(8, &[(3, 7)]),
        StandardGate::CSwap => permutation(8, &[(3, 5)]),
    };
    Ok(m)
}

/// The gate a singly-controlled gate applies to its target.
pub(crate) fn control_base(gate: &StandardGate) -> Option<StandardGate> {
    match gate {
        StandardGate::CX => Some(StandardGate::X),
        StandardGate::CY => Some(StandardGate::Y),
        StandardGate::CZ => Some(StandardGate::Z),
        StandardGate::CH => Some(StandardGate::H),
        StandardGate::CRx(t) => Some(StandardGate::Rx(t.clone())),
        StandardGate::CRy(t) => Some(StandardGate::Ry(t.clone())),
        StandardGate::CRz(t) => Some(StandardGate::Rz(t.clone())),
        StandardGate::CP(t) => Some(StandardGate::P(t.clone())),
        _ => None,
    }
}

fn phase(theta: f64) -> Vec<Complex64> {
    vec![ONE, ZERO, ZERO, Complex64::from_polar(1.0, theta)]
}

fn rx(theta: f64) -> Vec<Complex64> {
    let c = Complex64::new((theta / 2.0).cos(), 0.0);
    let s = Complex64::new(0.0, -(theta / 2.0).sin());
    vec![c, s, s, c]
}

fn ry(theta: f64) -> Vec<Complex64> {
    let c = Complex64::new((theta / 2.0).cos(), 0.0);
    let s = Complex64::new((theta / 2.0).sin(), 0.0);
    vec![c, -s, s, c]
}

fn rz(theta: f64) -> Vec<Complex64> {
    vec![
        Complex64::from_polar(1.0, -theta / 2.0),
        ZERO,
        ZERO,
        Complex64::from_polar(1.0, theta / 2.0),
    ]
}

fn u(theta: f64, phi: f64, lambda: f64) -> Vec<Complex64> {
    let c = (theta / 2.0).cos();
    let s = (theta / 2.0).sin();
    vec![
        Complex64::new(c, 0.0),
        -Complex64::from_polar(s, lambda),
        Complex64::from_polar(s, phi),
        Complex64::from_polar(c, phi + lambda),
    ]
}

fn diagonal(entries: &[Complex64]) -> Vec<Complex64> {
    let dim = entries.len();
    let mut m = vec![ZERO; dim * dim];
    for (i, e) in entries.iter().enumerate() {
        m[i * dim + i] = *e;
    }
    m
}

/// Identity with the listed basis states exchanged.
fn permutation(dim: usize, swaps: &[(usize, usize)]) -> Vec<Complex64> {
    let mut m = diagonal(&vec![ONE; dim]);
    for &(a, b) in swaps {
        m[a * dim + a] = ZERO;
        m[b * dim + b] = ZERO;
        m[a * dim + b] = ONE;
        m[b * dim + a] = ONE;
    }
    m
}

/// Two-qubit controlled version of a single-qubit unitary; control is
/// operand 0.
fn controlled(u: &[Complex64]) -> Vec<Complex64> {
    let mut m = diagonal(&[ONE, ONE, ONE, ONE]);
    m[4 + 1] = u[0];
    m[4 + 3] = u[1];
    m[3 * 4 + 1] = u[2];
    m[3 * 4 + 3] = u[3];
    m
}

/// Element-wise complex conjugate.
pub(crate) fn conjugate(matrix: &[Complex64]) -> Vec<Complex64> {
    matrix.iter().map(Complex64::conj).collect()
}

/// Apply a `2^k × 2^k` matrix to the qubits `qubits` of a state vector.
///
/// `amps.len()` must be a power of two covering every index in `qubits`.
pub fn apply_matrix(amps: &mut [Complex64], qubits: &[usize], matrix: &[Complex64]) {
    let k = qubits.len();
    let dim = 1usize << k;
    debug_assert_eq!(matrix.len(), dim * dim);

    let mask: usize = qubits.iter().fold(0, |acc, q| acc | (1 << q));
    let offsets: Vec<usize> = (0..dim)
        .map(|m| {
            qubits
                .iter()
                .enumerate()
                .filter(|(bit, _)| m & (1 << bit) != 0)
                .fold(0, |acc, (_, q)| acc | (1 << q))
        })
        .collect();

    let mut old = vec![ZERO; dim];
    for base in 0..amps.len() {
        if base & mask != 0 {
            continue;
        }
        for (slot, off) in old.iter_mut().zip(&offsets) {
            *slot = amps[base | off];
        }
        for (row, off) in offsets.iter().enumerate() {
            let mut acc = ZERO;
            for (col, value) in old.iter().enumerate() {
                acc += matrix[row * dim + col] * value;
            }
            amps[base | off] = acc;
        }
    }
}
