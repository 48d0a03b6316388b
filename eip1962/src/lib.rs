//! An EIP-1962-style pairing precompile core.
//!
//! Parses a length-prefixed binary request describing an arbitrary
//! short-Weierstrass curve over a runtime prime field (or a degree-2/3
//! extension), then executes G1/G2 addition, scalar multiplication,
//! multi-exponentiation, or an optimal-ate pairing product check for the
//! BLS12, BN, MNT4 and MNT6 families.
//!
//! Gas metering, consensus integration and constant-time guarantees are
//! out of scope: the implementation is value-correct, not timing-safe.

#![deny(trivial_casts, trivial_numeric_casts, bare_trait_objects)]
#![deny(non_shorthand_field_patterns)]
#![forbid(unsafe_code)]

pub mod biginteger;
pub mod curves;
pub mod error;
pub mod exec;
pub mod fields;
pub mod parser;

#[cfg(test)]
mod tests;

pub use crate::biginteger::BigInteger;
pub use crate::curves::pairing::{CurveFamily, CurveInstance, PairingCurve, TwistType};
pub use crate::curves::{Affine, Curve};
pub use crate::error::{ArithmeticError, Error, PointError};
pub use crate::exec::{execute, execute_with_options, CancellationToken, ExecutionOptions};
pub use crate::fields::{ExtElement, ExtParameters, Field, Fp, FpParameters, LegendreSymbol};
pub use crate::parser::{parse, Opcode, Operation};
