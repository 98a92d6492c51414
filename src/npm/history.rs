use alloc::vec::Vec;

/// Append-only sequence of per-block misalignment values, in dB.
#[derive(Debug, Clone, Default)]
pub struct NpmHistory {
    values: Vec<f32>,
}

impl NpmHistory {
    pub fn new() -> Self {
        NpmHistory { values: Vec::new() }
    }

    pub fn push(&mut self, value_db: f32) {
        self.values.push(value_db);
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<f32> {
        self.values.last().copied()
    }

    /// Mean of the `count` values ending at (and excluding) `end`.
    /// Returns `None` if fewer than `count` values precede `end`.
    pub fn trailing_mean_at(&self, end: usize, count: usize) -> Option<f32> {
        if count == 0 || end > self.values.len() || end < count {
            return None;
        }
        let sum: f32 = self.values[end - count..end].iter().sum();
        Some(sum / (count as f32))
    }

    /// Mean of the most recent `count` values.
    pub fn trailing_mean(&self, count: usize) -> Option<f32> {
        self.trailing_mean_at(self.values.len(), count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_mean() {
        let mut history = NpmHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.trailing_mean(1), None);
        for value in [-1.0, -2.0, -3.0, -4.0] {
            history.push(value);
        }
        assert_eq!(history.len(), 4);
        assert_eq!(history.last(), Some(-4.0));
        assert_eq!(history.trailing_mean(2), Some(-3.5));
        assert_eq!(history.trailing_mean_at(2, 2), Some(-1.5));
        assert_eq!(history.trailing_mean(5), None);
        assert_eq!(history.trailing_mean(0), None);
    }
}
