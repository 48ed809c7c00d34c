/// Operand stack of the Piet engine. The last element is the top.
///
/// Nothing here fails: popping an empty stack gives 0 and malformed
/// duplicate/roll requests are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperandStack(Vec<i64>);

impl OperandStack {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    pub fn push(&mut self, value: i64) {
        self.0.push(value);
    }

    pub fn pop(&mut self) -> Option<i64> {
        self.0.pop()
    }

    pub fn pop_or_zero(&mut self) -> i64 {
        self.0.pop().unwrap_or(0)
    }

    pub fn duplicate(&mut self) {
        if let Some(top) = self.0.last().copied() {
            self.0.push(top);
        }
    }

    /// Rotates the top `depth` values `count` times. One positive turn moves
    /// the top value down to `depth` and lifts the others; negative counts
    /// turn the other way.
    pub fn roll(&mut self, depth: i64, count: i64) {
        if depth <= 0 || depth as u64 > self.0.len() as u64 {
            return;
        }

        let depth = depth as usize;
        let turns = count.rem_euclid(depth as i64) as usize;
        let start = self.0.len() - depth;
        self.0[start..].rotate_right(turns);
    }
}

impl From<Vec<i64>> for OperandStack {
    fn from(values: Vec<i64>) -> Self {
        Self(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(values: &[i64]) -> OperandStack {
        OperandStack::from(values.to_vec())
    }

    #[test]
    fn test_pop_empty_gives_zero() {
        let mut s = OperandStack::new();
        assert_eq!(0, s.pop_or_zero());
        assert_eq!(None, s.pop());
        assert!(s.is_empty());
    }

    #[test]
    fn test_duplicate_empty_is_noop() {
        let mut s = OperandStack::new();
        s.duplicate();
        assert!(s.is_empty());

        let mut s = stack(&[4]);
        s.duplicate();
        assert_eq!(&[4, 4], s.as_slice());
    }

    #[test]
    fn test_roll() {
        let mut s = stack(&[1, 2, 3, 4]);
        s.roll(3, 1);
        assert_eq!(&[1, 4, 2, 3], s.as_slice());

        let mut s = stack(&[1, 2, 3, 4]);
        s.roll(3, -1);
        assert_eq!(&[1, 3, 4, 2], s.as_slice());

        let mut s = stack(&[1, 2, 3, 4]);
        s.roll(4, 6);
        assert_eq!(&[3, 4, 1, 2], s.as_slice());
    }

    #[test]
    fn test_roll_out_of_range_is_noop() {
        let mut s = stack(&[1, 2, 3]);
        s.roll(4, 1);
        assert_eq!(&[1, 2, 3], s.as_slice());
        s.roll(-1, 1);
        assert_eq!(&[1, 2, 3], s.as_slice());
        s.roll(0, 5);
        assert_eq!(&[1, 2, 3], s.as_slice());
    }
}
