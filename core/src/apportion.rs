//! Remainder-to-last apportionment.
//!
//! Splits a set of integer totals across ordered buckets. Every bucket
//! but the last takes a truncated share of the original totals; the
//! last bucket takes whatever remains, so the buckets always sum to the
//! totals exactly regardless of truncation drift.

#[derive(Debug, Clone)]
pub struct Apportioner<const N: usize> {
    totals: [i64; N],
    remaining: [i64; N],
}

impl<const N: usize> Apportioner<N> {
    pub fn new(totals: [i64; N]) -> Self {
        Self {
            totals,
            remaining: totals,
        }
    }

    /// Take `share` of each original total, truncated toward zero.
    /// A share is never allowed to overdraw what is left, so the final
    /// remainder cannot go negative when noisy shares sum past 1.
    pub fn take_share(&mut self, share: f64) -> [i64; N] {
        let mut slice = [0i64; N];
        for i in 0..N {
            let want = (self.totals[i] as f64 * share) as i64;
            let take = want.clamp(0, self.remaining[i].max(0));
            self.remaining[i] -= take;
            slice[i] = take;
        }
        slice
    }

    /// Everything not yet taken. Leaves nothing behind.
    pub fn take_rest(&mut self) -> [i64; N] {
        std::mem::replace(&mut self.remaining, [0; N])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remainder_reconciles_exactly() {
        let totals = [9_871, 1_003, 247, 2_093_117];
        let mut a = Apportioner::new(totals);
        let mut parts = vec![
            a.take_share(0.33),
            a.take_share(0.21),
            a.take_share(0.179),
        ];
        parts.push(a.take_rest());
        for i in 0..4 {
            let sum: i64 = parts.iter().map(|p| p[i]).sum();
            assert_eq!(sum, totals[i]);
        }
    }

    #[test]
    fn oversubscribed_shares_never_go_negative() {
        let mut a = Apportioner::new([100]);
        assert_eq!(a.take_share(0.7), [70]);
        assert_eq!(a.take_share(0.7), [30]);
        assert_eq!(a.take_share(0.7), [0]);
        assert_eq!(a.take_rest(), [0]);
    }

    #[test]
    fn truncates_toward_zero() {
        let mut a = Apportioner::new([10, 3]);
        assert_eq!(a.take_share(0.25), [2, 0]);
        assert_eq!(a.take_rest(), [8, 3]);
    }
}
