use std::borrow::Borrow;
use std::collections::HashMap;

use itertools::Itertools;
use num::{BigInt, Integer, One, Zero};
use tracing::trace;

use super::DieLike;
use crate::{Error, Map, Outcome, Ratio, Result, Weight};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub(crate) struct DieInner {
    total: Weight,
    outcomes: Vec<Outcome>,
    weights: Vec<Weight>,
}

impl DieInner {
    #[must_use]
    pub fn scalar(value: Outcome) -> Self {
        Self {
            total: Weight::one(),
            outcomes: vec![value],
            weights: vec![Weight::one()],
        }
    }

    #[must_use]
    pub fn uniform<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Outcome>,
    {
        let mut map = Map::new();
        for value in values {
            *map.entry(value).or_default() += 1u32;
        }
        Self::from_map(map)
    }

    /// Builds the canonical form: ascending outcomes, zero weights pruned.
    #[must_use]
    pub fn from_map(map: Map) -> Self {
        let mut total = Weight::zero();
        let mut outcomes = Vec::with_capacity(map.len());
        let mut weights = Vec::with_capacity(map.len());
        for (outcome, weight) in map {
            if weight.is_zero() {
                continue;
            }
            total += &weight;
            outcomes.push(outcome);
            weights.push(weight);
        }
        Self {
            total,
            outcomes,
            weights,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn weight(&self, outcome: &Outcome) -> Weight {
        self.outcomes
            .binary_search(outcome)
            .map(|i| self.weights[i].clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn modes(&self) -> Vec<&Outcome> {
        self.iter()
            .max_set_by_key(|(_, w)| *w)
            .into_iter()
            .map(|(o, _)| o)
            .collect()
    }

    /// Lowest outcome whose cumulative weight reaches half of the total.
    pub fn median(&self) -> Result<&Outcome> {
        let mut acc = Weight::zero();
        for (outcome, weight) in self.iter() {
            acc += weight;
            if &acc * 2u32 >= self.total {
                return Ok(outcome);
            }
        }
        Err(Error::EmptyDie)
    }

    #[must_use]
    pub fn gcd(&self) -> Weight {
        self.weights
            .iter()
            .fold(Weight::zero(), |acc, w| acc.gcd(w))
    }

    #[must_use]
    pub fn lowest_terms(&self) -> Self {
        let gcd = self.gcd();
        if gcd <= Weight::one() {
            return self.clone();
        }
        Self {
            total: &self.total / &gcd,
            outcomes: self.outcomes.clone(),
            weights: self.weights.iter().map(|w| w / &gcd).collect(),
        }
    }

    #[must_use]
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(&Outcome) -> Outcome,
    {
        let mut map = Map::new();
        for (outcome, weight) in self.iter() {
            *map.entry(f(outcome)).or_default() += weight;
        }
        Self::from_map(map)
    }

    pub fn try_map<F>(&self, f: F) -> Result<Self>
    where
        F: Fn(&Outcome) -> Result<Outcome>,
    {
        let mut map = Map::new();
        for (outcome, weight) in self.iter() {
            *map.entry(f(outcome)?).or_default() += weight;
        }
        Ok(Self::from_map(map))
    }

    #[must_use]
    pub fn apply_two<F>(&self, d2: &DieInner, f: F) -> Self
    where
        F: Fn(&Outcome, &Outcome) -> Outcome,
    {
        let mut map = Map::new();
        for (v1, w1) in self.iter() {
            for (v2, w2) in d2.iter() {
                *map.entry(f(v1, v2)).or_default() += w1 * w2;
            }
        }
        Self::from_map(map)
    }

    /// Convolution where a pair may fail the whole operation or, by returning
    /// `None`, contribute nothing.
    pub fn try_apply_two<F>(&self, d2: &DieInner, f: F) -> Result<Self>
    where
        F: Fn(&Outcome, &Outcome) -> Result<Option<Outcome>>,
    {
        let mut map = Map::new();
        for (v1, w1) in self.iter() {
            for (v2, w2) in d2.iter() {
                if let Some(outcome) = f(v1, v2)? {
                    *map.entry(outcome).or_default() += w1 * w2;
                }
            }
        }
        Ok(Self::from_map(map))
    }

    #[must_use]
    pub fn apply<I, Q, F>(dice: I, f: F) -> Self
    where
        I: Borrow<[Q]>,
        Q: DieLike,
        F: Fn(&[&Outcome]) -> Outcome,
    {
        let dice = dice.borrow();
        let mut map = Map::new();
        let mut value = Vec::with_capacity(dice.len());

        for p in dice.iter().map(|d| d.iter()).multi_cartesian_product() {
            value.clear();
            let mut weight = Weight::one();
            for (v, w) in p {
                value.push(v);
                weight *= w;
            }
            *map.entry(f(value.as_slice())).or_default() += weight;
        }

        // multi_cartesian_product yields nothing for no dice
        if dice.is_empty() {
            *map.entry(f(&[])).or_default() += 1u32;
        }

        Self::from_map(map)
    }

    /// Folds `n` independent copies with an associative operation by
    /// repeated doubling. Zero copies give the empty die.
    #[must_use]
    pub fn fold_assoc<F>(&self, n: usize, f: F) -> Self
    where
        F: Fn(&Outcome, &Outcome) -> Outcome,
    {
        if n == 0 {
            return Self::default();
        }
        let mut cache = HashMap::new();
        cache.insert(1, self.clone());

        let mut stack = vec![n];
        while let Some(&x) = stack.last() {
            if cache.contains_key(&x) {
                stack.pop();
                continue;
            }
            let (m, step) = if x % 2 == 0 {
                let m = x / 2;
                (m, cache.get(&m).map(|d| d.apply_two(d, &f)))
            } else {
                let m = x - 1;
                (m, cache.get(&m).map(|d| d.apply_two(self, &f)))
            };
            match step {
                Some(d) => {
                    trace!(copies = x, outcomes = d.len(), "folded");
                    cache.insert(x, d);
                    stack.pop();
                }
                None => stack.push(m),
            }
        }

        cache.remove(&n).unwrap_or_default()
    }

    pub fn mean(&self) -> Result<Ratio> {
        if self.total.is_zero() {
            return Err(Error::EmptyDie);
        }
        let (s1, _) = self.moments();
        Ok(Ratio::new(s1, BigInt::from(self.total.clone())))
    }

    pub fn variance(&self) -> Result<Ratio> {
        if self.total.is_zero() {
            return Err(Error::EmptyDie);
        }
        let n = BigInt::from(self.total.clone());
        let (s1, s2) = self.moments();
        Ok(Ratio::new(&s2 * &n - &s1 * &s1, &n * &n))
    }

    fn moments(&self) -> (BigInt, BigInt) {
        self.iter()
            .fold((BigInt::zero(), BigInt::zero()), |(s1, s2), (o, w)| {
                let ow = o * BigInt::from(w.clone());
                let s2 = s2 + &ow * o;
                (s1 + ow, s2)
            })
    }
}

impl DieLike for DieInner {
    fn total(&self) -> &Weight {
        &self.total
    }

    fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    fn weights(&self) -> &[Weight] {
        &self.weights
    }
}
