//! Parameter expressions for parameterized circuits.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::fmt;

/// A symbolic or concrete gate angle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterExpression {
    /// A constant numeric value.
    Constant(f64),
    /// A named free parameter.
    Symbol(String),
    /// The constant π.
    Pi,
    /// Negation.
    Neg(Box<ParameterExpression>),
    /// Addition.
    Add(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Multiplication.
    Mul(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Division.
    Div(Box<ParameterExpression>, Box<ParameterExpression>),
}

impl ParameterExpression {
    /// Create a constant parameter.
    pub fn constant(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }

    /// Create a symbolic parameter.
    pub fn symbol(name: impl Into<String>) -> Self {
        ParameterExpression::Symbol(name.into())
    }

    /// Check if this expression contains any symbols.
    pub fn is_symbolic(&self) -> bool {
        match self {
            ParameterExpression::Symbol(_) => true,
            ParameterExpression::Constant(_) | ParameterExpression::Pi => false,
            ParameterExpression::Neg(e) => e.is_symbolic(),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b) => a.is_symbolic() || b.is_symbolic(),
        }
    }

    /// Evaluate as a concrete value, or `None` while symbols remain.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterExpression::Constant(v) => Some(*v),
            ParameterExpression::Symbol(_) => None,
            ParameterExpression::Pi => Some(PI),
            ParameterExpression::Neg(e) => e.as_f64().map(|v| -v),
            ParameterExpression::Add(a, b) => Some(a.as_f64()? + b.as_f64()?),
            ParameterExpression::Mul(a, b) => Some(a.as_f64()? * b.as_f64()?),
            ParameterExpression::Div(a, b) => {
                let divisor = b.as_f64()?;
                if divisor == 0.0 {
                    return None;
                }
                Some(a.as_f64()? / divisor)
            }
        }
    }

    /// Collect the free symbol names, sorted.
    pub fn symbols(&self) -> BTreeSet<String> {
        let mut set = BTreeSet::new();
        self.collect_symbols(&mut set);
        set
    }

    pub(crate) fn collect_symbols(&self, set: &mut BTreeSet<String>) {
        match self {
            ParameterExpression::Constant(_) | ParameterExpression::Pi => {}
            ParameterExpression::Symbol(name) => {
                set.insert(name.clone());
            }
            ParameterExpression::Neg(e) => e.collect_symbols(set),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b) => {
                a.collect_symbols(set);
                b.collect_symbols(set);
            }
        }
    }

    /// Substitute every symbol that has a value in `values`.
    ///
    /// Symbols without a value are left in place.
    pub fn bind(&self, values: &FxHashMap<String, f64>) -> Self {
        let rebuild = |a: &Self, b: &Self| (Box::new(a.bind(values)), Box::new(b.bind(values)));
        match self {
            ParameterExpression::Symbol(name) => match values.get(name) {
                Some(v) => ParameterExpression::Constant(*v),
                None => self.clone(),
            },
            ParameterExpression::Constant(_) | ParameterExpression::Pi => self.clone(),
            ParameterExpression::Neg(e) => ParameterExpression::Neg(Box::new(e.bind(values))),
            ParameterExpression::Add(a, b) => {
                let (a, b) = rebuild(a, b);
                ParameterExpression::Add(a, b)
            }
            ParameterExpression::Mul(a, b) => {
                let (a, b) = rebuild(a, b);
                ParameterExpression::Mul(a, b)
            }
            ParameterExpression::Div(a, b) => {
                let (a, b) = rebuild(a, b);
                ParameterExpression::Div(a, b)
            }
        }
    }
}

impl fmt::Display for ParameterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterExpression::Constant(v) => write!(f, "{v}"),
            ParameterExpression::Symbol(name) => write!(f, "{name}"),
            ParameterExpression::Pi => write!(f, "π"),
            ParameterExpression::Neg(e) => write!(f, "-({e})"),
            ParameterExpression::Add(a, b) => write!(f, "({a} + {b})"),
            ParameterExpression::Mul(a, b) => write!(f, "({a} * {b})"),
            ParameterExpression::Div(a, b) => write!(f, "({a} / {b})"),
        }
    }
}

impl From<f64> for ParameterExpression {
    fn from(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }
}

impl std::ops::Add for ParameterExpression {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        ParameterExpression::Add(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Mul for ParameterExpression {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        ParameterExpression::Mul(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Div for ParameterExpression {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        ParameterExpression::Div(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Neg for ParameterExpression {
    type Output = Self;

    fn neg(self) -> Self::Output {
        ParameterExpression::Neg(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_and_pi() {
        assert_eq!(ParameterExpression::constant(1.5).as_f64(), Some(1.5));
        assert_eq!(ParameterExpression::Pi.as_f64(), Some(PI));
    }

    #[test]
    fn test_symbolic_expression() {
        let theta = ParameterExpression::symbol("theta");
        let expr = theta.clone() * ParameterExpression::Pi / ParameterExpression::constant(2.0);
        assert!(expr.is_symbolic());
        assert_eq!(expr.as_f64(), None);
        assert_eq!(expr.symbols().into_iter().collect::<Vec<_>>(), vec!["theta"]);
    }

    #[test]
    fn test_bind_partial() {
        let expr = ParameterExpression::symbol("a") + ParameterExpression::symbol("b");
        let mut values = FxHashMap::default();
        values.insert("a".to_string(), 1.0);

        let partial = expr.bind(&values);
        assert!(partial.is_symbolic());

        values.insert("b".to_string(), 2.0);
        assert_eq!(expr.bind(&values).as_f64(), Some(3.0));
    }

    #[test]
    fn test_division_by_zero_is_unevaluated() {
        let expr = ParameterExpression::constant(1.0) / ParameterExpression::constant(0.0);
        assert_eq!(expr.as_f64(), None);
    }
}
