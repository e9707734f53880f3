//! The usual polyhedral dice.

use std::sync::LazyLock;

use crate::Die;

macro_rules! standard_dice {
    ($(($stat:ident, $func:ident, $sides:literal)),* $(,)?) => {
        $(
            #[doc = concat!("Shared fair die with ", stringify!($sides), " faces.")]
            pub static $stat: LazyLock<Die> = LazyLock::new(|| Die::uniform($sides));

            #[must_use]
            pub fn $func() -> Die {
                $stat.clone()
            }
        )*
    };
}

standard_dice!(
    (D2, d2, 2),
    (D3, d3, 3),
    (D4, d4, 4),
    (D6, d6, 6),
    (D8, d8, 8),
    (D10, d10, 10),
    (D12, d12, 12),
    (D20, d20, 20),
    (D100, d100, 100),
);

/// Always 1.
pub static D1: LazyLock<Die> = LazyLock::new(|| Die::scalar(1));

#[must_use]
pub fn d1() -> Die {
    D1.clone()
}

/// Fair die with faces `1..=sides`.
#[must_use]
pub fn d(sides: u32) -> Die {
    Die::uniform(sides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Outcome, Weight};

    #[test]
    fn standard_dice_are_uniform() {
        assert_eq!(d6(), Die::uniform(6));
        assert_eq!(d100().len(), 100);
        assert_eq!(d20().total(), &Weight::from(20u32));
        assert_eq!(d1(), Die::scalar(1));
        assert_eq!(d(0), Die::empty());
        assert_eq!(*D12, d(12));
        assert_eq!(d4().nsum(2).max_outcome(), Ok(&Outcome::from(8)));
    }
}
