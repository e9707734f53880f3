use crate::{Die, Outcome, Pool};

/// Anything that can stand on either side of die arithmetic.
///
/// Plain integers become single-outcome dice and pools contribute the sum of
/// their dice; the algebra itself only ever sees [`Die`].
pub trait IntoDie {
    fn into_die(self) -> Die;
}

impl IntoDie for Die {
    fn into_die(self) -> Die {
        self
    }
}

impl IntoDie for &Die {
    fn into_die(self) -> Die {
        self.clone()
    }
}

impl IntoDie for Pool {
    fn into_die(self) -> Die {
        self.sum()
    }
}

impl IntoDie for &Pool {
    fn into_die(self) -> Die {
        self.sum()
    }
}

impl IntoDie for &Outcome {
    fn into_die(self) -> Die {
        Die::scalar(self.clone())
    }
}

macro_rules! impl_into_die_scalar {
    ($($typ:ty),*) => {
        $(
            impl $crate::operand::IntoDie for $typ {
                fn into_die(self) -> $crate::Die {
                    $crate::Die::scalar(self)
                }
            }
        )*
    };
}

impl_into_die_scalar!(Outcome, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
