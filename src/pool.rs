use std::collections::{btree_map, BTreeMap};
use std::ops::Range;

use itertools::structs::CombinationsWithReplacement;
use itertools::Itertools;
use num::One;
use tracing::debug;

use crate::die::DieInner;
use crate::{Die, IntoDie, Map, Outcome, Result, Weight};

type RollMap = BTreeMap<Vec<Outcome>, Weight>;

/// Independent dice rolled together and read in sorted order.
///
/// Identical dice are interchangeable: a group of `m` equal dice is
/// enumerated as multisets of faces weighted by multinomial coefficients
/// instead of as an `m`-fold product.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pool {
    dice: Vec<Die>,
}

/// Sorted rolls of a pool with the number of ordered assignments behind each.
///
/// Every roll appears exactly once. Rolls of identical dice are produced on
/// demand. Different groups can reach the same merged roll, so a mixed pool
/// is collected into a map before the first roll is yielded; memory then
/// grows with the number of distinct sorted rolls, not with the product of
/// the dice.
pub struct Rolls<'a>(RollsInner<'a>);

enum RollsInner<'a> {
    Group(GroupRolls<'a>),
    Merged(btree_map::IntoIter<Vec<Outcome>, Weight>),
}

struct GroupRolls<'a> {
    die: &'a Die,
    count: usize,
    factorials: Vec<Weight>,
    combos: CombinationsWithReplacement<Range<usize>>,
}

impl Pool {
    #[must_use]
    pub fn new<I, D>(dice: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: IntoDie,
    {
        Self {
            dice: dice.into_iter().map(IntoDie::into_die).collect(),
        }
    }

    #[must_use]
    pub fn repeat(die: &Die, n: usize) -> Self {
        Self {
            dice: vec![die.clone(); n],
        }
    }

    #[must_use]
    pub fn dice(&self) -> &[Die] {
        &self.dice
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dice.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dice.is_empty()
    }

    /// This pool with one more die.
    #[must_use]
    pub fn with<D: IntoDie>(&self, die: D) -> Self {
        let mut dice = self.dice.clone();
        dice.push(die.into_die());
        Self { dice }
    }

    /// Both pools rolled together.
    #[must_use]
    pub fn concat(&self, other: &Pool) -> Self {
        Self {
            dice: self.dice.iter().chain(&other.dice).cloned().collect(),
        }
    }

    /// Number of ordered assignments: the product of the dice totals.
    #[must_use]
    pub fn denom(&self) -> Weight {
        self.dice
            .iter()
            .fold(Weight::one(), |acc, die| acc * die.total())
    }

    /// Enumerates every sorted roll once, with its weight.
    ///
    /// A pool of identical dice is generated lazily; mixed pools are merged
    /// group by group first. Each call starts a fresh enumeration.
    #[must_use]
    pub fn rolls_with_counts(&self) -> Rolls<'_> {
        let groups = self.groups();
        debug!(dice = self.len(), groups = groups.len(), "enumerating pool rolls");

        if let [(die, count)] = groups.as_slice() {
            return Rolls(RollsInner::Group(GroupRolls::new(*die, *count)));
        }

        let mut acc = RollMap::new();
        acc.insert(Vec::new(), Weight::one());
        for (die, count) in groups {
            let group = GroupRolls::new(die, count).collect_vec();
            let mut next = RollMap::new();
            for (roll, w1) in &acc {
                for (part, w2) in &group {
                    let merged = roll.iter().merge(part.iter()).cloned().collect_vec();
                    *next.entry(merged).or_default() += w1 * w2;
                }
            }
            acc = next;
        }
        debug!(rolls = acc.len(), "merged pool rolls");

        Rolls(RollsInner::Merged(acc.into_iter()))
    }

    /// Projects every sorted roll through `f`.
    #[must_use]
    pub fn map_rolls<F>(&self, f: F) -> Die
    where
        F: Fn(&[Outcome]) -> Outcome,
    {
        let mut map = Map::new();
        for (roll, weight) in self.rolls_with_counts() {
            *map.entry(f(&roll)).or_default() += weight;
        }
        Die::new(DieInner::from_map(map))
    }

    pub fn try_map_rolls<F>(&self, f: F) -> Result<Die>
    where
        F: Fn(&[Outcome]) -> Result<Outcome>,
    {
        let mut map = Map::new();
        for (roll, weight) in self.rolls_with_counts() {
            *map.entry(f(&roll)?).or_default() += weight;
        }
        Ok(Die::new(DieInner::from_map(map)))
    }

    /// Sum of all dice; zero for an empty pool.
    #[must_use]
    pub fn sum(&self) -> Die {
        self.groups()
            .into_iter()
            .fold(Die::scalar(0), |acc, (die, count)| acc.add(die.nsum(count)))
    }

    fn groups(&self) -> Vec<(&Die, usize)> {
        let mut groups: Vec<(&Die, usize)> = Vec::new();
        for die in &self.dice {
            match groups.iter().position(|(d, _)| *d == die) {
                Some(i) => groups[i].1 += 1,
                None => groups.push((die, 1)),
            }
        }
        groups
    }
}

impl FromIterator<Die> for Pool {
    fn from_iter<T: IntoIterator<Item = Die>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl<'a> GroupRolls<'a> {
    fn new(die: &'a Die, count: usize) -> Self {
        let mut factorials = Vec::with_capacity(count + 1);
        factorials.push(Weight::one());
        for i in 1..=count {
            let next = &factorials[i - 1] * Weight::from(i);
            factorials.push(next);
        }
        Self {
            die,
            count,
            factorials,
            combos: (0..die.len()).combinations_with_replacement(count),
        }
    }
}

impl Iterator for GroupRolls<'_> {
    type Item = (Vec<Outcome>, Weight);

    fn next(&mut self) -> Option<Self::Item> {
        let indices = self.combos.next()?;
        let outcomes = self.die.outcomes();
        let weights = self.die.weights();

        let mut multinomial = self.factorials[self.count].clone();
        let mut faces = Weight::one();
        for (run, &i) in indices.iter().dedup_with_count() {
            multinomial /= &self.factorials[run];
            faces *= num::pow::pow(weights[i].clone(), run);
        }

        let roll = indices.iter().map(|&i| outcomes[i].clone()).collect();
        Some((roll, multinomial * faces))
    }
}

impl Iterator for Rolls<'_> {
    type Item = (Vec<Outcome>, Weight);

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.0 {
            RollsInner::Group(rolls) => rolls.next(),
            RollsInner::Merged(rolls) => rolls.next(),
        }
    }
}
