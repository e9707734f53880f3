//! Exact discrete distributions over integer outcomes.
//!
//! A [`Die`] maps every outcome to an integer weight. Dice combine through
//! convolution, get rewritten through bounded substitution and gather into a
//! [`Pool`] whose sorted rolls can be reduced to order statistics.

pub mod defs;
mod die;
mod operand;
mod operators;
pub mod ops;
mod pool;
pub mod prelude;
mod select;
mod substitute;

pub use die::{Die, DieLike, Iter};
pub use operand::IntoDie;
pub use ops::ZeroDivision;
pub use pool::{Pool, Rolls};
pub use select::Selection;
pub use substitute::{Recursion, Replacement, Terminal};
use thiserror::Error;

pub type Outcome = num::BigInt;
pub type Weight = num::BigUint;
pub type Ratio = num::BigRational;
pub type Result<T> = ::core::result::Result<T, Error>;

type Map = std::collections::BTreeMap<Outcome, Weight>;
type Ptr<T> = std::sync::Arc<T>;

/// Deepest self-referential substitution accepted by [`Recursion`].
pub const MAX_RECURSION_DEPTH: usize = 64;

/// Largest exponent accepted by [`Die::pow`].
pub const MAX_EXPONENT: usize = 4096;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("negative weight {weight} for outcome {outcome}")]
    NegativeWeight { outcome: Outcome, weight: num::BigInt },
    #[error("division by zero")]
    DivisionByZero,
    #[error("invalid exponent {0}")]
    InvalidExponent(Outcome),
    #[error("recursion depth {depth} exceeds the limit of {limit}")]
    RecursionDepth { depth: usize, limit: usize },
    #[error("operation is undefined for an empty die")]
    EmptyDie,
    #[error("operation is undefined for an empty pool")]
    EmptyPool,
    #[error("index {index} out of range for a pool of {len} dice")]
    IndexOutOfRange { index: isize, len: usize },
    #[error("count {0} out of range")]
    CountOutOfRange(Outcome),
    #[error("float conversion failed")]
    FloatConversion,
}
