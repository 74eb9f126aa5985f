//! qrt circuit representation
//!
//! This crate holds the types every other qrt crate speaks: circuits built
//! from standard gates, symbolic parameters, and Pauli-sum observables used
//! by the estimating primitive.
//!
//! # Core Components
//!
//! - **Qubits and Classical Bits**: [`QubitId`], [`ClbitId`]
//! - **Gates**: [`StandardGate`] for built-in gates and [`CustomGate`] for
//!   user-supplied unitaries
//! - **Parameters**: [`ParameterExpression`] for variational circuits
//! - **Instructions**: [`Instruction`] combining an operation with operands
//! - **Circuit**: [`Circuit`], an ordered instruction list with a builder API
//! - **Observables**: [`Pauli`], [`PauliString`], [`SparsePauliOp`]
//! - **Reference circuits**: [`reference::bell`], [`reference::ghz`]
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use qrt_ir::{Circuit, ClbitId, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell", 2, 2);
//! circuit
//!     .h(QubitId(0))?
//!     .cx(QubitId(0), QubitId(1))?
//!     .measure(QubitId(0), ClbitId(0))?
//!     .measure(QubitId(1), ClbitId(1))?;
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert!(circuit.has_measurements());
//! # Ok::<(), qrt_ir::IrError>(())
//! ```
//!
//! # Example: Observables
//!
//! ```rust
//! use qrt_ir::SparsePauliOp;
//!
//! // The rightmost label character acts on qubit 0.
//! let zz = SparsePauliOp::from_label("ZZ")?;
//! assert_eq!(zz.num_qubits(), 2);
//! # Ok::<(), qrt_ir::IrError>(())
//! ```

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod parameter;
pub mod pauli;
pub mod qubit;
pub mod reference;

pub use circuit::{Circuit, ParameterValues};
pub use error::{IrError, IrResult};
pub use gate::{CustomGate, Gate, GateKind, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use parameter::ParameterExpression;
pub use pauli::{Pauli, PauliString, SparsePauliOp};
pub use qubit::{Clbit, ClbitId, Qubit, QubitId};
