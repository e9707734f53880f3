use std::borrow::Borrow;
use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};

use num::{ToPrimitive, Zero};
use tracing::debug;

use super::{DieInner, DieLike, Iter};
use crate::ops::{self, ZeroDivision};
use crate::{Error, IntoDie, Map, Outcome, Pool, Ptr, Ratio, Result, Weight};

/// Exact distribution over integer outcomes.
///
/// Cloning is cheap: the outcome table is shared and never mutated. Every
/// operation returns a new die. Weights are kept as computed; two dice with
/// the same probabilities but different totals compare unequal until both
/// are brought to [`Die::lowest_terms`].
#[derive(Clone, Default)]
pub struct Die(Ptr<DieInner>);

impl Die {
    /// The die with no outcomes.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn scalar<V>(value: V) -> Self
    where
        V: Into<Outcome>,
    {
        Self::new(DieInner::scalar(value.into()))
    }

    /// Fair die with faces `1..=sides`.
    #[must_use]
    pub fn uniform(sides: u32) -> Self {
        Self::range(1, sides)
    }

    /// Fair die over `lo..=hi`; empty when `lo > hi`.
    #[must_use]
    pub fn range<L, H>(lo: L, hi: H) -> Self
    where
        L: Into<Outcome>,
        H: Into<Outcome>,
    {
        let (lo, hi) = (lo.into(), hi.into());
        Self::new(DieInner::uniform(num::range_inclusive(lo, hi)))
    }

    /// Every element counts once; repeated outcomes accumulate.
    #[must_use]
    pub fn from_outcomes<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Outcome>,
    {
        Self::new(DieInner::uniform(values.into_iter().map(Into::into)))
    }

    /// Builds a die from `(outcome, weight)` pairs. Repeated outcomes
    /// accumulate, zero weights vanish and a negative weight is rejected.
    pub fn from_weights<I, V, W>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (V, W)>,
        V: Into<Outcome>,
        W: Into<num::BigInt>,
    {
        let mut map = Map::new();
        for (outcome, weight) in pairs {
            let outcome = outcome.into();
            let weight = weight.into();
            let Some(weight) = weight.to_biguint() else {
                return Err(Error::NegativeWeight { outcome, weight });
            };
            *map.entry(outcome).or_default() += weight;
        }
        Ok(Self::new(DieInner::from_map(map)))
    }

    #[must_use]
    pub fn total(&self) -> &Weight {
        self.0.total()
    }

    #[must_use]
    pub fn outcomes(&self) -> &[Outcome] {
        self.0.outcomes()
    }

    #[must_use]
    pub fn weights(&self) -> &[Weight] {
        self.0.weights()
    }

    pub fn iter(&self) -> Iter<'_> {
        self.0.iter()
    }

    /// Number of distinct outcomes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.len() == 0
    }

    /// Weight of `outcome`, zero when it cannot occur.
    #[must_use]
    pub fn weight<V>(&self, outcome: V) -> Weight
    where
        V: Into<Outcome>,
    {
        self.0.weight(&outcome.into())
    }

    pub fn min_outcome(&self) -> Result<&Outcome> {
        self.outcomes().first().ok_or(Error::EmptyDie)
    }

    pub fn max_outcome(&self) -> Result<&Outcome> {
        self.outcomes().last().ok_or(Error::EmptyDie)
    }

    #[must_use]
    pub fn modes(&self) -> Vec<&Outcome> {
        self.0.modes()
    }

    pub fn median(&self) -> Result<&Outcome> {
        self.0.median()
    }

    pub fn probability<V>(&self, outcome: V) -> Result<Ratio>
    where
        V: Into<Outcome>,
    {
        let total = self.nonzero_total()?;
        Ok(Ratio::new(self.weight(outcome).into(), total))
    }

    /// Exact probabilities in outcome order.
    pub fn probabilities(&self) -> Result<Vec<Ratio>> {
        let total = self.nonzero_total()?;
        Ok(self
            .weights()
            .iter()
            .map(|w| Ratio::new(w.clone().into(), total.clone()))
            .collect())
    }

    pub fn probabilities_f64(&self) -> Result<Vec<f64>> {
        self.probabilities()?
            .iter()
            .map(|p| p.to_f64().ok_or(Error::FloatConversion))
            .collect()
    }

    /// Divides every weight by their greatest common divisor.
    #[must_use]
    pub fn lowest_terms(&self) -> Self {
        if self.is_lowest_terms() {
            return self.clone();
        }
        Self::new(self.0.lowest_terms())
    }

    #[must_use]
    pub fn is_lowest_terms(&self) -> bool {
        self.0.gcd() <= Weight::from(1u32)
    }

    #[must_use]
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(&Outcome) -> Outcome,
    {
        Self::new(self.0.map(f))
    }

    pub fn try_map<F>(&self, f: F) -> Result<Self>
    where
        F: Fn(&Outcome) -> Result<Outcome>,
    {
        Ok(Self::new(self.0.try_map(f)?))
    }

    /// Convolution: every pair of outcomes contributes the product of their
    /// weights to `f(lhs, rhs)`.
    #[must_use]
    pub fn apply_two<F>(&self, rhs: &Die, f: F) -> Self
    where
        F: Fn(&Outcome, &Outcome) -> Outcome,
    {
        Self::new(self.0.apply_two(&rhs.0, f))
    }

    pub fn try_apply_two<F>(&self, rhs: &Die, f: F) -> Result<Self>
    where
        F: Fn(&Outcome, &Outcome) -> Result<Option<Outcome>>,
    {
        Ok(Self::new(self.0.try_apply_two(&rhs.0, f)?))
    }

    /// Distribution of `f` over every joint outcome of independent dice.
    #[must_use]
    pub fn apply<I, D, F>(dice: I, f: F) -> Self
    where
        I: Borrow<[D]>,
        D: DieLike,
        F: Fn(&[&Outcome]) -> Outcome,
    {
        Self::new(DieInner::apply(dice, f))
    }

    #[must_use]
    pub fn add<R: IntoDie>(&self, rhs: R) -> Self {
        self.apply_two(&rhs.into_die(), ops::add)
    }

    #[must_use]
    pub fn sub<R: IntoDie>(&self, rhs: R) -> Self {
        self.apply_two(&rhs.into_die(), ops::sub)
    }

    #[must_use]
    pub fn mul<R: IntoDie>(&self, rhs: R) -> Self {
        self.apply_two(&rhs.into_die(), ops::mul)
    }

    /// Floor division; fails on any zero divisor outcome.
    pub fn div_floor<R: IntoDie>(&self, rhs: R) -> Result<Self> {
        self.div_floor_with(rhs, ZeroDivision::Fail)
    }

    pub fn div_floor_with<R: IntoDie>(&self, rhs: R, policy: ZeroDivision) -> Result<Self> {
        self.try_apply_two(&rhs.into_die(), |a, b| ops::div_floor(a, b, policy))
    }

    /// Floor modulo; fails on any zero divisor outcome.
    pub fn mod_floor<R: IntoDie>(&self, rhs: R) -> Result<Self> {
        self.mod_floor_with(rhs, ZeroDivision::Fail)
    }

    pub fn mod_floor_with<R: IntoDie>(&self, rhs: R, policy: ZeroDivision) -> Result<Self> {
        self.try_apply_two(&rhs.into_die(), |a, b| ops::mod_floor(a, b, policy))
    }

    pub fn pow<R: IntoDie>(&self, rhs: R) -> Result<Self> {
        self.try_apply_two(&rhs.into_die(), |a, b| ops::pow(a, b).map(Some))
    }

    #[must_use]
    pub fn max<R: IntoDie>(&self, rhs: R) -> Self {
        self.apply_two(&rhs.into_die(), ops::max)
    }

    #[must_use]
    pub fn min<R: IntoDie>(&self, rhs: R) -> Self {
        self.apply_two(&rhs.into_die(), ops::min)
    }

    #[must_use]
    pub fn bitand<R: IntoDie>(&self, rhs: R) -> Self {
        self.apply_two(&rhs.into_die(), ops::bitand)
    }

    #[must_use]
    pub fn bitor<R: IntoDie>(&self, rhs: R) -> Self {
        self.apply_two(&rhs.into_die(), ops::bitor)
    }

    #[must_use]
    pub fn bitxor<R: IntoDie>(&self, rhs: R) -> Self {
        self.apply_two(&rhs.into_die(), ops::bitxor)
    }

    #[must_use]
    pub fn neg(&self) -> Self {
        self.map(|x| -x)
    }

    #[must_use]
    pub fn pos(&self) -> Self {
        self.clone()
    }

    #[must_use]
    pub fn abs(&self) -> Self {
        self.map(ops::abs)
    }

    #[must_use]
    pub fn invert(&self) -> Self {
        self.map(ops::invert)
    }

    #[must_use]
    pub fn lt<R: IntoDie>(&self, rhs: R) -> Self {
        self.apply_two(&rhs.into_die(), |a, b| ops::truth(a < b))
    }

    #[must_use]
    pub fn le<R: IntoDie>(&self, rhs: R) -> Self {
        self.apply_two(&rhs.into_die(), |a, b| ops::truth(a <= b))
    }

    #[must_use]
    pub fn eq<R: IntoDie>(&self, rhs: R) -> Self {
        self.apply_two(&rhs.into_die(), |a, b| ops::truth(a == b))
    }

    #[must_use]
    pub fn neq<R: IntoDie>(&self, rhs: R) -> Self {
        self.apply_two(&rhs.into_die(), |a, b| ops::truth(a != b))
    }

    #[must_use]
    pub fn ge<R: IntoDie>(&self, rhs: R) -> Self {
        self.apply_two(&rhs.into_die(), |a, b| ops::truth(a >= b))
    }

    #[must_use]
    pub fn gt<R: IntoDie>(&self, rhs: R) -> Self {
        self.apply_two(&rhs.into_die(), |a, b| ops::truth(a > b))
    }

    /// `1` where `lo <= outcome <= hi`, `0` elsewhere.
    #[must_use]
    pub fn within<L, H>(&self, lo: L, hi: H) -> Self
    where
        L: Into<Outcome>,
        H: Into<Outcome>,
    {
        let (lo, hi) = (lo.into(), hi.into());
        self.map(|x| ops::truth(&lo <= x && x <= &hi))
    }

    /// Loss, tie or win against `rhs` as `-1`, `0` or `1`.
    #[must_use]
    pub fn vs<R: IntoDie>(&self, rhs: R) -> Self {
        self.apply_two(&rhs.into_die(), ops::versus)
    }

    /// Sum of `n` independent copies.
    #[must_use]
    pub fn nsum(&self, n: usize) -> Self {
        if n == 0 {
            return Self::scalar(0);
        }
        debug!(copies = n, outcomes = self.len(), "summing copies");
        Self::new(self.0.fold_assoc(n, ops::add))
    }

    /// Highest of `n` independent copies.
    pub fn nmax(&self, n: usize) -> Result<Self> {
        if n == 0 {
            return Err(Error::EmptyPool);
        }
        Ok(Self::new(self.0.fold_assoc(n, ops::max)))
    }

    /// Lowest of `n` independent copies.
    pub fn nmin(&self, n: usize) -> Result<Self> {
        if n == 0 {
            return Err(Error::EmptyPool);
        }
        Ok(Self::new(self.0.fold_assoc(n, ops::min)))
    }

    #[must_use]
    pub fn pool(&self, n: usize) -> Pool {
        Pool::repeat(self, n)
    }

    pub fn mean(&self) -> Result<Ratio> {
        self.0.mean()
    }

    pub fn variance(&self) -> Result<Ratio> {
        self.0.variance()
    }

    pub fn mean_f64(&self) -> Result<f64> {
        self.mean()?.to_f64().ok_or(Error::FloatConversion)
    }

    pub fn variance_f64(&self) -> Result<f64> {
        self.variance()?.to_f64().ok_or(Error::FloatConversion)
    }

    pub fn stddev(&self) -> Result<f64> {
        self.variance_f64().map(f64::sqrt)
    }

    #[must_use]
    pub(crate) fn new(value: DieInner) -> Self {
        Self(Ptr::new(value))
    }

    fn nonzero_total(&self) -> Result<num::BigInt> {
        if self.total().is_zero() {
            return Err(Error::EmptyDie);
        }
        Ok(self.total().clone().into())
    }
}

impl DieLike for Die {
    fn total(&self) -> &Weight {
        self.0.total()
    }

    fn outcomes(&self) -> &[Outcome] {
        self.0.outcomes()
    }

    fn weights(&self) -> &[Weight] {
        self.0.weights()
    }
}

impl DieLike for &Die {
    fn total(&self) -> &Weight {
        self.0.total()
    }

    fn outcomes(&self) -> &[Outcome] {
        self.0.outcomes()
    }

    fn weights(&self) -> &[Weight] {
        self.0.weights()
    }
}

impl PartialEq for Die {
    fn eq(&self, other: &Self) -> bool {
        Ptr::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for Die {}

impl Hash for Die {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl Debug for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Die")
            .field("total", self.0.total())
            .field("outcomes", &self.0.outcomes())
            .field("weights", &self.0.weights())
            .finish()
    }
}

impl Display for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let probabilities = self.probabilities_f64().unwrap_or_default();
        for ((outcome, weight), p) in self.iter().zip(probabilities) {
            writeln!(f, "{outcome}: {weight} ({:6.2}%)", p * 100.0)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Die {
    type Item = (&'a Outcome, &'a Weight);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_d6_sum() {
        let d6 = Die::uniform(6);
        let sum = d6.add(&d6);
        assert_eq!(sum.weight(2), Weight::from(1u32));
        assert_eq!(sum.weight(7), Weight::from(6u32));
        assert_eq!(sum.weight(12), Weight::from(1u32));
        assert_eq!(sum.total(), &Weight::from(36u32));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let err = Die::from_weights([(1, 2), (2, -1)]).unwrap_err();
        assert_eq!(
            err,
            Error::NegativeWeight {
                outcome: 2.into(),
                weight: (-1).into()
            }
        );
    }

    #[test]
    fn duplicates_merge_and_zero_weights_vanish() {
        let die = Die::from_weights([(3, 1), (1, 0), (3, 2), (2, 4)]).unwrap();
        assert_eq!(die.outcomes(), &[Outcome::from(2), Outcome::from(3)]);
        assert_eq!(die.weights(), &[Weight::from(4u32), Weight::from(3u32)]);
        assert_eq!(Die::from_outcomes([1, 2, 2]).weight(2), Weight::from(2u32));
    }

    #[test]
    fn negate_merges_nothing_for_distinct_outcomes_but_abs_does() {
        let die = Die::range(-2, 2);
        assert_eq!(die.neg(), die);
        let abs = die.abs();
        assert_eq!(abs.outcomes().len(), 3);
        assert_eq!(abs.weight(2), Weight::from(2u32));
        assert_eq!(abs.weight(0), Weight::from(1u32));
    }

    #[test]
    fn division_by_zero_fails_or_skips() {
        let lhs = Die::uniform(4);
        let rhs = Die::range(0, 1);
        assert_eq!(lhs.div_floor(&rhs), Err(Error::DivisionByZero));
        let skipped = lhs.div_floor_with(&rhs, ZeroDivision::Skip).unwrap();
        assert_eq!(skipped, lhs);
        assert_eq!(lhs.mod_floor(2).unwrap().outcomes().len(), 2);
    }

    #[test]
    fn pow_builds_exact_powers() {
        let die = Die::uniform(3).pow(2).unwrap();
        assert_eq!(
            die.outcomes(),
            &[Outcome::from(1), Outcome::from(4), Outcome::from(9)]
        );
        assert!(Die::uniform(3).pow(Die::range(-1, 0)).is_err());
    }

    #[test]
    fn comparisons_produce_boolean_dice() {
        let d6 = Die::uniform(6);
        let lt = d6.lt(&d6);
        assert_eq!(lt.weight(1), Weight::from(15u32));
        assert_eq!(lt.weight(0), Weight::from(21u32));
        let ge = d6.ge(4);
        assert_eq!(ge.weight(1), Weight::from(3u32));
        assert_eq!(d6.eq(&d6).weight(1), Weight::from(6u32));
        assert_eq!(d6.neq(&d6).weight(1), Weight::from(30u32));
    }

    #[test]
    fn within_is_inclusive() {
        let sum = Die::uniform(6).nsum(2);
        let within = sum.within(2, 12);
        assert_eq!(within.weight(1), Weight::from(36u32));
        assert_eq!(within.weight(0), Weight::zero());
        assert_eq!(sum.within(6, 8).weight(1), Weight::from(16u32));
    }

    #[test]
    fn vs_counts_losses_ties_and_wins() {
        let d6 = Die::uniform(6);
        let vs = d6.vs(&d6);
        assert_eq!(vs.weight(-1), Weight::from(15u32));
        assert_eq!(vs.weight(0), Weight::from(6u32));
        assert_eq!(vs.weight(1), Weight::from(15u32));
    }

    #[test]
    fn nsum_matches_repeated_addition() {
        let d6 = Die::uniform(6);
        let repeated = d6.add(&d6).add(&d6).add(&d6).add(&d6);
        assert_eq!(d6.nsum(5), repeated);
        assert_eq!(d6.nsum(0), Die::scalar(0));
    }

    #[test]
    fn advantage_via_nmax() {
        let adv = Die::uniform(20).nmax(2).unwrap();
        assert_eq!(adv.weight(20), Weight::from(39u32));
        assert_eq!(adv.weight(1), Weight::from(1u32));
        assert_eq!(Die::uniform(20).nmin(0), Err(Error::EmptyPool));
    }

    #[test]
    fn lowest_terms_is_idempotent() {
        let die = Die::from_weights([(1, 4), (2, 6)]).unwrap();
        let reduced = die.lowest_terms();
        assert_eq!(reduced.weights(), &[Weight::from(2u32), Weight::from(3u32)]);
        assert_eq!(reduced.lowest_terms(), reduced);
        assert!(reduced.is_lowest_terms());
        assert_eq!(Die::empty().lowest_terms(), Die::empty());
    }

    #[test]
    fn statistics_of_empty_die_fail() {
        assert_eq!(Die::empty().mean(), Err(Error::EmptyDie));
        assert_eq!(Die::empty().variance(), Err(Error::EmptyDie));
        assert_eq!(Die::empty().probabilities(), Err(Error::EmptyDie));
        assert_eq!(Die::empty().min_outcome(), Err(Error::EmptyDie));
    }

    #[test]
    fn float_views() {
        let d6 = Die::uniform(6);
        assert!((d6.mean_f64().unwrap() - 3.5).abs() < 1e-12);
        assert!((d6.stddev().unwrap() - (35.0f64 / 12.0).sqrt()).abs() < 1e-12);
        let p = d6.probabilities_f64().unwrap();
        assert_eq!(p.len(), 6);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn modes_of_sums_and_flat_dice() {
        let d6 = Die::uniform(6);
        assert_eq!(d6.nsum(2).modes(), vec![&Outcome::from(7)]);
        assert_eq!(d6.modes().len(), 6);
        assert!(Die::empty().modes().is_empty());
    }

    #[test]
    fn display_lists_weights_and_percentages() {
        let coin = Die::uniform(2);
        assert_eq!(coin.to_string(), "1: 1 ( 50.00%)\n2: 1 ( 50.00%)\n");
        let die = Die::from_weights([(0, 3), (1, 1)]).unwrap();
        assert_eq!(die.to_string(), "0: 3 ( 75.00%)\n1: 1 ( 25.00%)\n");
        assert_eq!(Die::empty().to_string(), "");
    }

    #[test]
    fn apply_over_three_dice() {
        let d2 = Die::uniform(2);
        let die = Die::apply([&d2, &d2, &d2], |x| x.iter().copied().sum());
        assert_eq!(die, d2.nsum(3));
    }
}
