mod inner;
mod ptr;

use std::iter::Zip;
use std::slice;

pub(crate) use inner::DieInner;
pub use ptr::Die;

use crate::{Outcome, Weight};

pub type Iter<'a> = Zip<slice::Iter<'a, Outcome>, slice::Iter<'a, Weight>>;

/// Read access shared by the die handle and its storage.
pub trait DieLike {
    fn total(&self) -> &Weight;
    fn outcomes(&self) -> &[Outcome];
    fn weights(&self) -> &[Weight];

    fn iter(&self) -> Iter<'_> {
        self.outcomes().iter().zip(self.weights())
    }
}
