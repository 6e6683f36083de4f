//! Fixed-capacity time series used for the plot panel

/// What happens when a full series receives another sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Keep the oldest samples and drop new ones
    StopWhenFull,
    /// Shift everything left by one and append the new sample
    Roll,
}

/// Parallel `(time, value)` arrays with a fixed capacity
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    capacity: usize,
    policy: OverflowPolicy,
    times: Vec<f32>,
    values: Vec<f32>,
}

impl TimeSeries {
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        Self {
            capacity,
            policy,
            times: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Appends a sample. Returns false if the sample was dropped.
    pub fn push(&mut self, time: f32, value: f32) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.times.len() < self.capacity {
            self.times.push(time);
            self.values.push(value);
            return true;
        }
        match self.policy {
            OverflowPolicy::StopWhenFull => false,
            OverflowPolicy::Roll => {
                self.times.copy_within(1.., 0);
                self.values.copy_within(1.., 0);
                let last = self.capacity - 1;
                self.times[last] = time;
                self.values[last] = value;
                true
            }
        }
    }

    pub fn clear(&mut self) {
        self.times.clear();
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.times.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    pub fn times(&self) -> &[f32] {
        &self.times
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Most recent sample
    pub fn last(&self) -> Option<(f32, f32)> {
        Some((*self.times.last()?, *self.values.last()?))
    }

    /// Time range covered by the samples
    pub fn time_span(&self) -> Option<(f32, f32)> {
        Some((*self.times.first()?, *self.times.last()?))
    }

    /// Smallest and largest value, ignoring NaN
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_when_full_keeps_oldest() {
        let mut series = TimeSeries::new(3, OverflowPolicy::StopWhenFull);
        for i in 0..5 {
            series.push(i as f32, i as f32 * 10.0);
        }
        assert!(series.is_full());
        assert_eq!(series.times(), &[0.0, 1.0, 2.0]);
        assert_eq!(series.values(), &[0.0, 10.0, 20.0]);
        assert!(!series.push(9.0, 90.0));
    }

    #[test]
    fn test_roll_shifts_left() {
        let mut series = TimeSeries::new(3, OverflowPolicy::Roll);
        for i in 0..5 {
            assert!(series.push(i as f32, i as f32 * 10.0));
        }
        assert_eq!(series.len(), 3);
        assert_eq!(series.times(), &[2.0, 3.0, 4.0]);
        assert_eq!(series.values(), &[20.0, 30.0, 40.0]);
        assert_eq!(series.last(), Some((4.0, 40.0)));
        assert_eq!(series.time_span(), Some((2.0, 4.0)));
    }

    #[test]
    fn test_clear_matches_fresh_series() {
        let mut series = TimeSeries::new(4, OverflowPolicy::Roll);
        series.push(0.5, 1.0);
        series.push(1.0, -1.0);
        series.clear();
        assert_eq!(series, TimeSeries::new(4, OverflowPolicy::Roll));
        assert_eq!(series.last(), None);
        assert_eq!(series.value_range(), None);
    }

    #[test]
    fn test_value_range() {
        let mut series = TimeSeries::new(8, OverflowPolicy::StopWhenFull);
        series.push(0.0, 2.0);
        series.push(1.0, -3.0);
        series.push(2.0, f32::NAN);
        series.push(3.0, 5.0);
        assert_eq!(series.value_range(), Some((-3.0, 5.0)));
    }

    #[test]
    fn test_zero_capacity_drops_everything() {
        let mut series = TimeSeries::new(0, OverflowPolicy::Roll);
        assert!(!series.push(0.0, 0.0));
        assert!(series.is_empty());
    }
}
