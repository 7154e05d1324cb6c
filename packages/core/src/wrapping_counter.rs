use num_traits::{Bounded, One, Unsigned, WrappingAdd};

/// A counter that yields 1 as its first value and wraps back to 1 after
/// surpassing the maximum value of its type or the specified maximum.
/// 0 is never returned, so it can be used as a "none" sentinel by callers.
pub struct WrappingCounter<T>
where
    T: Bounded + Ord + Unsigned + WrappingAdd + One + Copy,
{
    value: T,
    max: T,
}

impl<T> Default for WrappingCounter<T>
where
    T: Bounded + Ord + Unsigned + WrappingAdd + One + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WrappingCounter<T>
where
    T: Bounded + Ord + Unsigned + WrappingAdd + One + Copy,
{
    pub fn new() -> Self {
        Self::new_with_max(T::max_value())
    }

    pub fn new_with_max(max: T) -> Self {
        Self {
            value: T::zero(),
            max,
        }
    }

    pub fn increment(&mut self) -> T {
        let next = self.value.wrapping_add(&T::one());
        self.value = if next > self.max || next.is_zero() {
            T::one()
        } else {
            next
        };
        self.value
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_increment_with_max() {
        let mut counter = WrappingCounter::new_with_max(3u8);
        let values: Vec<u8> = (0..7).map(|_| counter.increment()).collect();
        assert_eq!(values, vec![1, 2, 3, 1, 2, 3, 1]);
    }

    #[test]
    fn test_increment_wraps_around_zero() {
        let mut counter = WrappingCounter::<u8>::new();
        for _ in 0..255 {
            counter.increment();
        }
        // After 255, the counter must skip 0
        assert_eq!(counter.increment(), 1);
    }
}
