//! Property-based tests for the distribution algebra and dice pools.

use num::Zero;
use pooldie::prelude::*;
use proptest::prelude::*;

/// Strategy: a small die with outcomes in -5..=5 and weights 0..=4.
fn die_strategy() -> impl Strategy<Value = Die> {
    prop::collection::vec((-5..=5i64, 0..=4u32), 0..5).prop_map(|pairs| {
        Die::from_weights(pairs).unwrap_or_default()
    })
}

/// Strategy: a non-empty die.
fn live_die_strategy() -> impl Strategy<Value = Die> {
    die_strategy().prop_filter("non-empty", |d| !d.is_empty())
}

proptest! {
    // 1. Addition and multiplication commute
    #[test]
    fn convolution_commutes(a in die_strategy(), b in die_strategy()) {
        prop_assert_eq!(a.add(&b), b.add(&a));
        prop_assert_eq!(a.mul(&b), b.mul(&a));
        prop_assert_eq!(a.max(&b), b.max(&a));
    }

    // 2. Addition associates
    #[test]
    fn convolution_associates(
        a in die_strategy(),
        b in die_strategy(),
        c in die_strategy(),
    ) {
        prop_assert_eq!(a.add(&b).add(&c), a.add(b.add(&c)));
    }

    // 3. A binary operation multiplies the totals
    #[test]
    fn weight_is_conserved(a in die_strategy(), b in die_strategy()) {
        let total = a.total() * b.total();
        let sub = a.sub(&b);
        let lt = a.lt(&b);
        let vs = a.vs(&b);
        prop_assert_eq!(sub.total(), &total);
        prop_assert_eq!(lt.total(), &total);
        prop_assert_eq!(vs.total(), &total);
    }

    // 4. Canonical form holds after every operation
    #[test]
    fn results_are_canonical(a in die_strategy(), b in die_strategy()) {
        let die = a.bitxor(&b);
        prop_assert!(die.outcomes().windows(2).all(|w| w[0] < w[1]));
        prop_assert!(die.weights().iter().all(|w| !w.is_zero()));
    }

    // 5. Reducing twice changes nothing and keeps probabilities
    #[test]
    fn lowest_terms_is_idempotent(a in live_die_strategy()) {
        let once = a.lowest_terms();
        prop_assert_eq!(once.lowest_terms(), once.clone());
        prop_assert_eq!(once.probabilities(), a.probabilities());
    }

    // 6. A one-die pool selects back the die
    #[test]
    fn one_die_pool_is_the_die(a in live_die_strategy()) {
        let pool = a.pool(1);
        prop_assert_eq!(pool.index(0).unwrap(), a.clone());
        prop_assert_eq!(pool.lowest(1).unwrap(), a.clone());
        prop_assert_eq!(pool.highest(1).unwrap(), a);
    }

    // 7. Sorted rolls account for every ordered assignment
    #[test]
    fn roll_counts_are_conserved(a in die_strategy(), b in die_strategy(), n in 1..4usize) {
        let pool = a.pool(n).with(&b);
        let total = pool
            .rolls_with_counts()
            .fold(Weight::zero(), |acc, (_, w)| acc + w);
        prop_assert_eq!(total, pool.denom());
        prop_assert!(pool.rolls_with_counts().all(|(roll, _)| roll.windows(2).all(|w| w[0] <= w[1])));
    }

    // 8. Extremes of a pool match repeated folds
    #[test]
    fn extremes_match_repeated_folds(a in live_die_strategy(), n in 1..4usize) {
        let pool = a.pool(n);
        prop_assert_eq!(pool.highest(1).unwrap(), a.nmax(n).unwrap());
        prop_assert_eq!(pool.lowest(1).unwrap(), a.nmin(n).unwrap());
        prop_assert_eq!(pool.highest(n).unwrap(), a.nsum(n));
    }

    // 9. Substituting every outcome by itself is the identity
    #[test]
    fn identity_substitution(a in die_strategy()) {
        prop_assert_eq!(a.substitute(|_, x| x.clone()), a);
    }
}
