use std::ops::{Add, BitAnd, BitOr, BitXor, Mul, Neg, Not, Sub};

use crate::{Die, IntoDie, Outcome};

macro_rules! impl_die_binop {
    ($($trait:ident::$method:ident),*) => {
        $(
            impl<R> $trait<R> for Die
            where
                R: IntoDie,
            {
                type Output = Die;

                fn $method(self, rhs: R) -> Self::Output {
                    Die::$method(&self, rhs)
                }
            }

            impl<R> $trait<R> for &Die
            where
                R: IntoDie,
            {
                type Output = Die;

                fn $method(self, rhs: R) -> Self::Output {
                    Die::$method(self, rhs)
                }
            }
        )*
    };
}

macro_rules! impl_scalar_binop {
    ($($typ:ty),*) => {
        $(
            impl_scalar_binop!(@one $typ, Add::add, Sub::sub, Mul::mul);
        )*
    };
    (@one $typ:ty, $($trait:ident::$method:ident),*) => {
        $(
            impl $trait<Die> for $typ {
                type Output = Die;

                fn $method(self, rhs: Die) -> Self::Output {
                    Die::scalar(self).$method(rhs)
                }
            }

            impl $trait<&Die> for $typ {
                type Output = Die;

                fn $method(self, rhs: &Die) -> Self::Output {
                    Die::scalar(self).$method(rhs)
                }
            }
        )*
    };
}

impl_die_binop!(
    Add::add,
    Sub::sub,
    Mul::mul,
    BitAnd::bitand,
    BitOr::bitor,
    BitXor::bitxor
);

impl_scalar_binop!(Outcome, i32, i64, u32, u64, usize);

impl Neg for Die {
    type Output = Die;

    fn neg(self) -> Self::Output {
        Die::neg(&self)
    }
}

impl Neg for &Die {
    type Output = Die;

    fn neg(self) -> Self::Output {
        Die::neg(self)
    }
}

impl Not for Die {
    type Output = Die;

    fn not(self) -> Self::Output {
        self.invert()
    }
}

impl Not for &Die {
    type Output = Die;

    fn not(self) -> Self::Output {
        self.invert()
    }
}
