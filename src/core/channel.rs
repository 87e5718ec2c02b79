use std::fmt::{Display, Formatter};

use derive_more::{Add, AddAssign};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Channel {
    A,
    B,
    C,
}

impl Display for Channel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "load 1"),
            Self::B => write!(f, "load 2"),
            Self::C => write!(f, "load 3"),
        }
    }
}

/// One value per load channel.
#[must_use]
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize, Add, AddAssign)]
pub struct Channels<T> {
    pub a: T,
    pub b: T,
    pub c: T,
}

impl<T> Channels<T> {
    pub const fn new(a: T, b: T, c: T) -> Self {
        Self { a, b, c }
    }

    pub fn map<R>(self, mut f: impl FnMut(T) -> R) -> Channels<R> {
        Channels { a: f(self.a), b: f(self.b), c: f(self.c) }
    }

    pub fn zip<R>(self, rhs: Channels<R>) -> Channels<(T, R)> {
        Channels { a: (self.a, rhs.a), b: (self.b, rhs.b), c: (self.c, rhs.c) }
    }

    pub const fn as_ref(&self) -> Channels<&T> {
        Channels { a: &self.a, b: &self.b, c: &self.c }
    }

    pub fn get(&self, channel: Channel) -> &T {
        match channel {
            Channel::A => &self.a,
            Channel::B => &self.b,
            Channel::C => &self.c,
        }
    }

    pub fn get_mut(&mut self, channel: Channel) -> &mut T {
        match channel {
            Channel::A => &mut self.a,
            Channel::B => &mut self.b,
            Channel::C => &mut self.c,
        }
    }

    pub fn labeled(self) -> Channels<(Channel, T)> {
        Channels { a: (Channel::A, self.a), b: (Channel::B, self.b), c: (Channel::C, self.c) }
    }

    /// Iterate over the channels in the `a`, `b`, `c` order.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, &T)> {
        [(Channel::A, &self.a), (Channel::B, &self.b), (Channel::C, &self.c)].into_iter()
    }
}

impl<T, E> Channels<Result<T, E>> {
    /// Collect the per-channel results, failing on the first error in the channel order.
    pub fn transpose(self) -> Result<Channels<T>, E> {
        Ok(Channels { a: self.a?, b: self.b?, c: self.c? })
    }
}

impl Channels<f64> {
    #[must_use]
    pub fn total(self) -> f64 {
        self.a + self.b + self.c
    }

    #[must_use]
    pub fn mean(self) -> f64 {
        self.total() / 3.0
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_total() {
        assert_abs_diff_eq!(Channels::new(1.0, 2.0, 3.5).total(), 6.5);
    }

    #[test]
    fn test_transpose_reports_first_error() {
        let channels: Channels<Result<u8, Channel>> =
            Channels::new(Ok(1), Err(Channel::B), Err(Channel::C));
        assert_eq!(channels.transpose(), Err(Channel::B));
    }

    #[test]
    fn test_add() {
        let mut sum = Channels::new(1.0, 2.0, 3.0) + Channels::new(0.5, 0.5, 0.5);
        sum += Channels::new(1.0, 1.0, 1.0);
        assert_abs_diff_eq!(sum.a, 2.5);
        assert_abs_diff_eq!(sum.b, 3.5);
        assert_abs_diff_eq!(sum.c, 4.5);
    }
}
