use bon::Builder;
use num::{Integer, One, Signed, ToPrimitive};
use tracing::trace;

use crate::die::DieInner;
use crate::{Die, Error, IntoDie, Map, Outcome, Result, Weight, MAX_RECURSION_DEPTH};

/// What a single outcome becomes during substitution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Replacement {
    Outcome(Outcome),
    /// The outcome's weight is spread over the die, keeping its probability.
    Die(Die),
    /// The outcome is removed and the rest renormalised around it.
    Reroll,
}

/// Fate of triggering outcomes once the depth limit is reached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Terminal {
    /// Triggering outcomes stay as rolled.
    Keep,
    /// Triggering outcomes become a fixed outcome.
    Collapse(Outcome),
    /// Triggering outcomes are discarded.
    Reroll,
}

/// Bound for self-referential substitution.
///
/// ```
/// use pooldie::{Recursion, Terminal};
///
/// let recursion = Recursion::builder(3).terminal(Terminal::Keep).build();
/// assert_eq!(recursion.max_depth(), 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Builder)]
pub struct Recursion {
    #[builder(start_fn)]
    max_depth: usize,
    terminal: Terminal,
}

impl Recursion {
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    #[must_use]
    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    fn check(&self) -> Result<()> {
        if self.max_depth > MAX_RECURSION_DEPTH {
            return Err(Error::RecursionDepth {
                depth: self.max_depth,
                limit: MAX_RECURSION_DEPTH,
            });
        }
        Ok(())
    }
}

impl Terminal {
    fn replacement(&self, outcome: &Outcome) -> Replacement {
        match self {
            Terminal::Keep => Replacement::Outcome(outcome.clone()),
            Terminal::Collapse(value) => Replacement::Outcome(value.clone()),
            Terminal::Reroll => Replacement::Reroll,
        }
    }
}

impl From<Die> for Replacement {
    fn from(value: Die) -> Self {
        Replacement::Die(value)
    }
}

impl From<&Die> for Replacement {
    fn from(value: &Die) -> Self {
        Replacement::Die(value.clone())
    }
}

impl From<Outcome> for Replacement {
    fn from(value: Outcome) -> Self {
        Replacement::Outcome(value)
    }
}

impl From<&Outcome> for Replacement {
    fn from(value: &Outcome) -> Self {
        Replacement::Outcome(value.clone())
    }
}

macro_rules! impl_replacement_scalar {
    ($($typ:ty),*) => {
        $(
            impl From<$typ> for Replacement {
                fn from(value: $typ) -> Self {
                    Replacement::Outcome(Outcome::from(value))
                }
            }
        )*
    };
}

impl_replacement_scalar!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl Die {
    /// Replaces every outcome by `f(self, outcome)`.
    ///
    /// Each source outcome keeps its probability: replacement dice are
    /// brought to a common total before their weights are merged.
    #[must_use]
    pub fn substitute<F, R>(&self, f: F) -> Die
    where
        F: Fn(&Die, &Outcome) -> R,
        R: Into<Replacement>,
    {
        let parts = self
            .iter()
            .map(|(outcome, weight)| (weight, f(self, outcome).into()))
            .collect();
        mix(parts)
    }

    pub fn try_substitute<F, R>(&self, f: F) -> Result<Die>
    where
        F: Fn(&Die, &Outcome) -> Result<R>,
        R: Into<Replacement>,
    {
        let parts = self
            .iter()
            .map(|(outcome, weight)| Ok((weight, f(self, outcome)?.into())))
            .collect::<Result<Vec<_>>>()?;
        Ok(mix(parts))
    }

    /// Substitution whose replacement may depend on the result itself.
    ///
    /// Depth zero resolves triggering outcomes with the terminal policy.
    /// Every further depth is one full substitution pass in which `step`
    /// sees the die aggregated at the previous depth.
    pub fn substitute_recursive<T, S, R>(
        &self,
        recursion: &Recursion,
        trigger: T,
        step: S,
    ) -> Result<Die>
    where
        T: Fn(&Outcome) -> bool,
        S: Fn(&Outcome, &Die) -> R,
        R: Into<Replacement>,
    {
        recursion.check()?;

        let mut die = self.substitute(|_, outcome| {
            if trigger(outcome) {
                recursion.terminal.replacement(outcome)
            } else {
                Replacement::Outcome(outcome.clone())
            }
        });

        for depth in 1..=recursion.max_depth {
            let previous = die;
            die = self.substitute(|_, outcome| {
                if trigger(outcome) {
                    step(outcome, &previous).into()
                } else {
                    Replacement::Outcome(outcome.clone())
                }
            });
            trace!(depth, outcomes = die.len(), "expanded");
        }

        Ok(die)
    }

    /// Triggering outcomes roll again and add.
    pub fn explode<T>(&self, trigger: T, recursion: &Recursion) -> Result<Die>
    where
        T: Fn(&Outcome) -> bool,
    {
        self.substitute_recursive(recursion, trigger, |outcome, previous| {
            previous.map(|x| x + outcome)
        })
    }

    /// Triggering outcomes roll again and take the new result.
    pub fn reroll<T>(&self, trigger: T, recursion: &Recursion) -> Result<Die>
    where
        T: Fn(&Outcome) -> bool,
    {
        self.substitute_recursive(recursion, trigger, |_, previous| previous.clone())
    }

    /// Sums as many copies of this die as `count` rolls; a negative count
    /// negates the sum.
    pub fn sum_of<R: IntoDie>(&self, count: R) -> Result<Die> {
        count.into_die().try_substitute(|_, n| {
            let copies = n
                .abs()
                .to_usize()
                .ok_or_else(|| Error::CountOutOfRange(n.clone()))?;
            let sum = self.nsum(copies);
            Ok(if n.is_negative() { sum.neg() } else { sum })
        })
    }
}

fn mix(parts: Vec<(&Weight, Replacement)>) -> Die {
    let denom = parts
        .iter()
        .filter_map(|(_, replacement)| match replacement {
            Replacement::Die(die) if !die.is_empty() => Some(die.total()),
            _ => None,
        })
        .fold(Weight::one(), |acc, total| acc.lcm(total));

    let mut map = Map::new();
    for (weight, replacement) in parts {
        match replacement {
            Replacement::Outcome(outcome) => {
                *map.entry(outcome).or_default() += weight * &denom;
            }
            Replacement::Die(die) if !die.is_empty() => {
                let scale = weight * (&denom / die.total());
                for (outcome, w) in die.iter() {
                    *map.entry(outcome.clone()).or_default() += &scale * w;
                }
            }
            Replacement::Die(_) | Replacement::Reroll => {}
        }
    }

    Die::new(DieInner::from_map(map))
}
