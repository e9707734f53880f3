use tracing::debug;

use crate::{Die, Error, IntoDie, Outcome, Pool, Result};

/// Positions of a sorted roll to keep and sum.
///
/// Indices count from the lowest die; negative indices count back from the
/// highest one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Selection {
    Index(isize),
    /// Half-open range of positions, clamped to the pool.
    Slice {
        start: Option<isize>,
        stop: Option<isize>,
    },
    Lowest(usize),
    Highest(usize),
    /// `k` central dice; an uneven margin leaves the extra die below.
    Middle(usize),
    /// Arbitrary positions; a repeated position counts again.
    Subset(Vec<isize>),
}

impl Selection {
    /// Resolves the selection against a roll of `len` dice.
    pub fn positions(&self, len: usize) -> Result<Vec<usize>> {
        match self {
            Selection::Index(index) => Ok(vec![resolve(*index, len)?]),
            Selection::Slice { start, stop } => {
                let lo = start.map_or(0, |i| clamp(i, len));
                let hi = stop.map_or(len, |i| clamp(i, len));
                Ok((lo..hi.max(lo)).collect())
            }
            Selection::Lowest(k) => Ok((0..len.min(*k)).collect()),
            Selection::Highest(k) => Ok((len - len.min(*k)..len).collect()),
            Selection::Middle(k) => {
                let k = len.min(*k);
                let start = (len - k).div_ceil(2);
                Ok((start..start + k).collect())
            }
            Selection::Subset(indices) => indices.iter().map(|&i| resolve(i, len)).collect(),
        }
    }
}

fn resolve(index: isize, len: usize) -> Result<usize> {
    let resolved = if index < 0 {
        len.checked_sub(index.unsigned_abs())
    } else {
        Some(index.unsigned_abs())
    };
    resolved
        .filter(|&i| i < len)
        .ok_or(Error::IndexOutOfRange { index, len })
}

fn clamp(index: isize, len: usize) -> usize {
    if index < 0 {
        len.saturating_sub(index.unsigned_abs())
    } else {
        len.min(index.unsigned_abs())
    }
}

impl Pool {
    /// Distribution of the sum of the selected positions of the sorted roll.
    pub fn select(&self, selection: &Selection) -> Result<Die> {
        if self.is_empty() {
            return Err(Error::EmptyPool);
        }
        let positions = selection.positions(self.len())?;
        debug!(?selection, dice = self.len(), kept = positions.len(), "selecting");

        if positions.iter().copied().eq(0..self.len()) {
            return Ok(self.sum());
        }
        Ok(self.map_rolls(|roll| positions.iter().map(|&i| &roll[i]).sum::<Outcome>()))
    }

    pub fn index(&self, index: isize) -> Result<Die> {
        self.select(&Selection::Index(index))
    }

    pub fn slice(&self, start: Option<isize>, stop: Option<isize>) -> Result<Die> {
        self.select(&Selection::Slice { start, stop })
    }

    pub fn lowest(&self, k: usize) -> Result<Die> {
        self.select(&Selection::Lowest(k))
    }

    pub fn highest(&self, k: usize) -> Result<Die> {
        self.select(&Selection::Highest(k))
    }

    pub fn middle(&self, k: usize) -> Result<Die> {
        self.select(&Selection::Middle(k))
    }

    pub fn subset<I>(&self, indices: I) -> Result<Die>
    where
        I: IntoIterator<Item = isize>,
    {
        self.select(&Selection::Subset(indices.into_iter().collect()))
    }

    /// Loss, tie or win of the pool sum against `rhs`.
    #[must_use]
    pub fn vs<R: IntoDie>(&self, rhs: R) -> Die {
        self.sum().vs(rhs)
    }

    #[must_use]
    pub fn within<L, H>(&self, lo: L, hi: H) -> Die
    where
        L: Into<Outcome>,
        H: Into<Outcome>,
    {
        self.sum().within(lo, hi)
    }
}
