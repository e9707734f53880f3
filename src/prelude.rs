pub use crate::defs::*;
pub use crate::{
    Die, DieLike, Error, IntoDie, Outcome, Pool, Ratio, Recursion, Replacement, Selection,
    Terminal, Weight, ZeroDivision,
};
