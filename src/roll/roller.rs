use crate::common::{NonZeroUInt, UInt};
use rand::{
    distributions::{DistIter, Distribution, Uniform},
    Rng,
};

/// Source of die faces. Every implementation must return values in `1..=sides`.
///
/// Any [`rand::Rng`] is a `Roller`; seed a [`rand::rngs::StdRng`] for
/// reproducible results.
pub trait Roller {
    type RollIter<'a>: Iterator<Item = UInt> + 'a
    where
        Self: 'a;

    fn roll(&mut self, sides: NonZeroUInt) -> UInt;

    fn roll_iter(&mut self, num: usize, sides: NonZeroUInt) -> Self::RollIter<'_>;
}

impl<R: Rng> Roller for R {
    type RollIter<'a> = std::iter::Take<DistIter<Uniform<UInt>, &'a mut Self, UInt>>
    where
        Self: 'a;

    fn roll(&mut self, sides: NonZeroUInt) -> UInt {
        self.gen_range(1..=sides.get())
    }

    fn roll_iter(&mut self, num: usize, sides: NonZeroUInt) -> Self::RollIter<'_> {
        Uniform::new_inclusive(1, sides.get())
            .sample_iter(self)
            .take(num)
    }
}

#[cfg(test)]
pub(crate) use scripted::{MaxRoller, SequenceRoller};

#[cfg(test)]
mod scripted {
    use super::*;

    /// Replays a fixed list of faces, cycling when it runs out.
    pub(crate) struct SequenceRoller {
        values: Vec<UInt>,
        next: usize,
    }

    impl SequenceRoller {
        pub fn new(values: impl Into<Vec<UInt>>) -> Self {
            let values = values.into();
            assert!(!values.is_empty());
            Self { values, next: 0 }
        }

        pub fn drawn(&self) -> usize {
            self.next
        }
    }

    impl Roller for SequenceRoller {
        type RollIter<'a> = ScriptIter<'a, Self>;

        fn roll(&mut self, sides: NonZeroUInt) -> UInt {
            let ret = self.values[self.next % self.values.len()];
            self.next += 1;
            assert!(
                (1..=sides.get()).contains(&ret),
                "scripted face {} does not fit a d{}",
                ret,
                sides
            );
            ret
        }

        fn roll_iter(&mut self, num: usize, sides: NonZeroUInt) -> Self::RollIter<'_> {
            ScriptIter {
                roller: self,
                num,
                sides,
            }
        }
    }

    /// Always rolls the highest face.
    pub(crate) struct MaxRoller;

    impl Roller for MaxRoller {
        type RollIter<'a> = ScriptIter<'a, Self>;

        fn roll(&mut self, sides: NonZeroUInt) -> UInt {
            sides.get()
        }

        fn roll_iter(&mut self, num: usize, sides: NonZeroUInt) -> Self::RollIter<'_> {
            ScriptIter {
                roller: self,
                num,
                sides,
            }
        }
    }

    pub(crate) struct ScriptIter<'a, R> {
        roller: &'a mut R,
        num: usize,
        sides: NonZeroUInt,
    }

    impl<R: Roller> Iterator for ScriptIter<'_, R> {
        type Item = UInt;

        fn next(&mut self) -> Option<Self::Item> {
            if self.num == 0 {
                None
            } else {
                self.num -= 1;
                Some(self.roller.roll(self.sides))
            }
        }
    }
}
