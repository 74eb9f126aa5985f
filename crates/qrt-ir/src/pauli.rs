//! Pauli observables.
//!
//! An observable is a weighted sum of Pauli strings:
//!
//!   O = Σ_k  c_k · P_k
//!
//! Labels are written most-significant qubit first, so the rightmost
//! character of `"XIZ"` acts on qubit 0 and the leftmost on qubit 2.

use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pauli {
    /// Identity.
    I,
    /// Pauli-X.
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
}

impl Pauli {
    /// Parse a single label character.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(Pauli::I),
            'X' => Some(Pauli::X),
            'Y' => Some(Pauli::Y),
            'Z' => Some(Pauli::Z),
            _ => None,
        }
    }

    /// The label character.
    pub fn as_char(self) -> char {
        match self {
            Pauli::I => 'I',
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        }
    }

    /// Symplectic representation `(x, z)`.
    #[inline]
    pub fn xz(self) -> (bool, bool) {
        match self {
            Pauli::I => (false, false),
            Pauli::X => (true, false),
            Pauli::Y => (true, true),
            Pauli::Z => (false, true),
        }
    }

    /// Product `self · other` as `(i^k, P)`.
    pub fn mul(self, other: Pauli) -> (u8, Pauli) {
        use Pauli::{I, X, Y, Z};
        match (self, other) {
            (I, p) | (p, I) => (0, p),
            (X, X) | (Y, Y) | (Z, Z) => (0, I),
            (X, Y) => (1, Z),
            (Y, X) => (3, Z),
            (Y, Z) => (1, X),
            (Z, Y) => (3, X),
            (Z, X) => (1, Y),
            (X, Z) => (3, Y),
        }
    }
}

/// A tensor product of single-qubit Paulis over a fixed number of qubits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PauliString {
    /// One operator per qubit, indexed by qubit.
    ops: Vec<Pauli>,
}

impl PauliString {
    /// The identity string on `num_qubits` qubits.
    pub fn identity(num_qubits: usize) -> Self {
        Self {
            ops: vec![Pauli::I; num_qubits],
        }
    }

    /// Build from operators indexed by qubit (element 0 acts on qubit 0).
    pub fn from_ops(ops: Vec<Pauli>) -> Self {
        Self { ops }
    }

    /// Parse a label such as `"ZZ"` or `"XIY"`.
    pub fn from_label(label: &str) -> IrResult<Self> {
        if label.is_empty() {
            return Err(IrError::InvalidPauli {
                label: label.to_string(),
                reason: "label is empty".into(),
            });
        }
        let ops = label
            .chars()
            .rev()
            .map(|c| {
                Pauli::from_char(c).ok_or_else(|| IrError::InvalidPauli {
                    label: label.to_string(),
                    reason: format!("unexpected character '{c}'"),
                })
            })
            .collect::<IrResult<Vec<_>>>()?;
        Ok(Self { ops })
    }

    /// Number of qubits the string spans.
    pub fn num_qubits(&self) -> usize {
        self.ops.len()
    }

    /// The operator acting on `qubit`.
    pub fn get(&self, qubit: usize) -> Pauli {
        self.ops.get(qubit).copied().unwrap_or(Pauli::I)
    }

    /// Operators indexed by qubit.
    pub fn ops(&self) -> &[Pauli] {
        &self.ops
    }

    /// Number of non-identity factors.
    pub fn weight(&self) -> usize {
        self.ops.iter().filter(|p| **p != Pauli::I).count()
    }

    /// True if every factor is the identity.
    pub fn is_identity(&self) -> bool {
        self.weight() == 0
    }

    /// Non-identity `(qubit, op)` pairs, ascending by qubit.
    pub fn support(&self) -> impl Iterator<Item = (usize, Pauli)> + '_ {
        self.ops
            .iter()
            .enumerate()
            .filter(|(_, p)| **p != Pauli::I)
            .map(|(q, p)| (q, *p))
    }

    /// Check whether two strings commute.
    pub fn commutes_with(&self, other: &PauliString) -> bool {
        let anti = self
            .ops
            .iter()
            .zip(&other.ops)
            .filter(|(a, b)| **a != Pauli::I && **b != Pauli::I && a != b)
            .count();
        anti % 2 == 0
    }

    /// Product `self · other` as `(i^k, P)`.
    ///
    /// Both strings must span the same number of qubits.
    pub fn mul(&self, other: &PauliString) -> (u8, PauliString) {
        let mut phase = 0u8;
        let ops = self
            .ops
            .iter()
            .zip(&other.ops)
            .map(|(a, b)| {
                let (k, p) = a.mul(*b);
                phase = (phase + k) % 4;
                p
            })
            .collect();
        (phase, PauliString { ops })
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for p in self.ops.iter().rev() {
            write!(f, "{}", p.as_char())?;
        }
        Ok(())
    }
}

impl FromStr for PauliString {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PauliString::from_label(s)
    }
}

fn phase_factor(k: u8) -> Complex64 {
    match k % 4 {
        0 => Complex64::new(1.0, 0.0),
        1 => Complex64::new(0.0, 1.0),
        2 => Complex64::new(-1.0, 0.0),
        _ => Complex64::new(0.0, -1.0),
    }
}

/// Split an optional phase prefix (`-`, `i`, `-i`, `+`) off a label.
fn split_phase(label: &str) -> (Complex64, &str) {
    let (sign, rest) = match label.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, label.strip_prefix('+').unwrap_or(label)),
    };
    match rest.strip_prefix('i') {
        Some(rest) => (Complex64::new(0.0, sign), rest),
        None => (Complex64::new(sign, 0.0), rest),
    }
}

/// A weighted sum of Pauli strings of equal width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparsePauliOp {
    num_qubits: usize,
    terms: Vec<(PauliString, Complex64)>,
}

impl SparsePauliOp {
    /// A single Pauli string with coefficient 1.
    ///
    /// An optional phase prefix is folded into the coefficient.
    pub fn from_label(label: &str) -> IrResult<Self> {
        Self::from_list([(label, 1.0)])
    }

    /// Build from `(label, coefficient)` pairs.
    ///
    /// All labels must have the same number of qubits, and at least one
    /// term is required.
    pub fn from_list<L, C, I>(terms: I) -> IrResult<Self>
    where
        L: AsRef<str>,
        C: Into<Complex64>,
        I: IntoIterator<Item = (L, C)>,
    {
        let mut num_qubits = None;
        let mut parsed = vec![];
        for (label, coeff) in terms {
            let label = label.as_ref();
            let (phase, body) = split_phase(label);
            let pauli = PauliString::from_label(body).map_err(|_| IrError::InvalidPauli {
                label: label.to_string(),
                reason: "expected an optional phase followed by I, X, Y, Z".into(),
            })?;
            match num_qubits {
                None => num_qubits = Some(pauli.num_qubits()),
                Some(n) if n != pauli.num_qubits() => {
                    return Err(IrError::InvalidPauli {
                        label: label.to_string(),
                        reason: format!("expected {n} qubits, got {}", pauli.num_qubits()),
                    });
                }
                Some(_) => {}
            }
            parsed.push((pauli, coeff.into() * phase));
        }

        let num_qubits = num_qubits.ok_or_else(|| IrError::InvalidPauli {
            label: String::new(),
            reason: "operator has no terms".into(),
        })?;
        Ok(Self {
            num_qubits,
            terms: parsed,
        })
    }

    /// Build from already-parsed strings.
    ///
    /// Returns `None` when the list is empty or widths disagree.
    pub fn from_terms(terms: Vec<(PauliString, Complex64)>) -> Option<Self> {
        let num_qubits = terms.first()?.0.num_qubits();
        if terms.iter().any(|(p, _)| p.num_qubits() != num_qubits) {
            return None;
        }
        Some(Self { num_qubits, terms })
    }

    /// The identity operator on `num_qubits` qubits.
    pub fn identity(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            terms: vec![(PauliString::identity(num_qubits), Complex64::new(1.0, 0.0))],
        }
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True if there are no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// All terms.
    pub fn terms(&self) -> &[(PauliString, Complex64)] {
        &self.terms
    }

    /// Term labels, in order.
    pub fn labels(&self) -> Vec<String> {
        self.terms.iter().map(|(p, _)| p.to_string()).collect()
    }

    /// Term coefficients, in order.
    pub fn coeffs(&self) -> Vec<Complex64> {
        self.terms.iter().map(|(_, c)| *c).collect()
    }

    /// Multiply every coefficient by `factor`.
    #[must_use]
    pub fn scale(mut self, factor: impl Into<Complex64>) -> Self {
        let factor = factor.into();
        for (_, c) in &mut self.terms {
            *c *= factor;
        }
        self
    }

    /// Operator product `self · other`.
    pub fn dot(&self, other: &SparsePauliOp) -> IrResult<Self> {
        if self.num_qubits != other.num_qubits {
            return Err(IrError::InvalidPauli {
                label: other.labels().join("+"),
                reason: format!(
                    "cannot multiply {}-qubit and {}-qubit operators",
                    self.num_qubits, other.num_qubits
                ),
            });
        }
        let terms = self
            .terms
            .iter()
            .flat_map(|(pa, ca)| {
                other.terms.iter().map(move |(pb, cb)| {
                    let (k, p) = pa.mul(pb);
                    (p, ca * cb * phase_factor(k))
                })
            })
            .collect();
        Ok(Self {
            num_qubits: self.num_qubits,
            terms,
        })
    }

    /// Composition: apply `self` first, then `other` (the product
    /// `other · self`).
    pub fn compose(&self, other: &SparsePauliOp) -> IrResult<Self> {
        other.dot(self)
    }

    /// Merge repeated strings and drop terms with `|c| <= atol`.
    ///
    /// An operator that cancels completely simplifies to a zero-weighted
    /// identity so its width is preserved.
    #[must_use]
    pub fn simplify(&self, atol: f64) -> Self {
        let mut order: Vec<PauliString> = vec![];
        let mut sums: FxHashMap<PauliString, Complex64> = FxHashMap::default();
        for (p, c) in &self.terms {
            let entry = sums.entry(p.clone()).or_insert_with(|| {
                order.push(p.clone());
                Complex64::new(0.0, 0.0)
            });
            *entry += *c;
        }

        let terms: Vec<_> = order
            .into_iter()
            .filter_map(|p| {
                let c = sums.get(&p).copied()?;
                (c.norm() > atol).then_some((p, c))
            })
            .collect();

        if terms.is_empty() {
            return Self {
                num_qubits: self.num_qubits,
                terms: vec![(
                    PauliString::identity(self.num_qubits),
                    Complex64::new(0.0, 0.0),
                )],
            };
        }
        Self {
            num_qubits: self.num_qubits,
            terms,
        }
    }

    /// Check if the operator is Hermitian within `atol`.
    pub fn is_hermitian(&self, atol: f64) -> bool {
        self.simplify(atol)
            .terms
            .iter()
            .all(|(_, c)| c.im.abs() <= atol)
    }
}

impl fmt::Display for SparsePauliOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (p, c)) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            if c.im == 0.0 {
                write!(f, "{}*{p}", c.re)?;
            } else {
                write!(f, "({c})*{p}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for SparsePauliOp {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SparsePauliOp::from_label(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATOL: f64 = 1e-12;

    #[test]
    fn test_label_order() {
        let p = PauliString::from_label("XIZ").unwrap();
        assert_eq!(p.num_qubits(), 3);
        assert_eq!(p.get(0), Pauli::Z);
        assert_eq!(p.get(1), Pauli::I);
        assert_eq!(p.get(2), Pauli::X);
        assert_eq!(p.to_string(), "XIZ");
        assert_eq!(p.support().collect::<Vec<_>>(), vec![(0, Pauli::Z), (2, Pauli::X)]);
    }

    #[test]
    fn test_invalid_label() {
        assert!(matches!(
            SparsePauliOp::from_label("ZA"),
            Err(IrError::InvalidPauli { .. })
        ));
        assert!(SparsePauliOp::from_label("").is_err());
        assert!(SparsePauliOp::from_list([("ZZ", 1.0), ("Z", 1.0)]).is_err());
    }

    #[test]
    fn test_phase_prefix() {
        let op = SparsePauliOp::from_label("-iXY").unwrap();
        assert_eq!(op.coeffs()[0], Complex64::new(0.0, -1.0));
        assert_eq!(op.labels(), vec!["XY"]);
    }

    #[test]
    fn test_single_qubit_products() {
        assert_eq!(Pauli::X.mul(Pauli::Y), (1, Pauli::Z));
        assert_eq!(Pauli::Y.mul(Pauli::X), (3, Pauli::Z));
        assert_eq!(Pauli::Z.mul(Pauli::Z), (0, Pauli::I));
    }

    #[test]
    fn test_square_of_hermitian_sum() {
        // (XZ + ZX)^2 = 2·II + 2·YY
        let op = SparsePauliOp::from_list([("XZ", 1.0), ("ZX", 1.0)]).unwrap();
        let sq = op.compose(&op).unwrap().simplify(ATOL);
        assert!(sq.is_hermitian(ATOL));
        assert_eq!(sq.labels(), vec!["II", "YY"]);
        assert_eq!(sq.coeffs(), vec![Complex64::new(2.0, 0.0); 2]);
    }

    #[test]
    fn test_zz_squared_is_identity() {
        let zz = SparsePauliOp::from_label("ZZ").unwrap();
        let sq = zz.compose(&zz).unwrap().simplify(ATOL);
        assert_eq!(sq.labels(), vec!["II"]);
        assert_eq!(sq.coeffs(), vec![Complex64::new(1.0, 0.0)]);
    }

    #[test]
    fn test_simplify_cancels() {
        let op = SparsePauliOp::from_list([("XX", 0.5), ("ZI", 1.0), ("XX", -0.5)]).unwrap();
        let simplified = op.simplify(ATOL);
        assert_eq!(simplified.labels(), vec!["ZI"]);

        let zero = SparsePauliOp::from_list([("Y", 1.0), ("Y", -1.0)]).unwrap().simplify(ATOL);
        assert_eq!(zero.labels(), vec!["I"]);
        assert_eq!(zero.coeffs()[0].norm(), 0.0);
    }

    #[test]
    fn test_is_hermitian() {
        assert!(SparsePauliOp::from_label("ZZ").unwrap().is_hermitian(ATOL));
        assert!(!SparsePauliOp::from_label("iZZ").unwrap().is_hermitian(ATOL));
    }

    #[test]
    fn test_commutation() {
        let xx = PauliString::from_label("XX").unwrap();
        let zz = PauliString::from_label("ZZ").unwrap();
        let zi = PauliString::from_label("ZI").unwrap();
        assert!(xx.commutes_with(&zz));
        assert!(!xx.commutes_with(&zi));
    }
}
