use std::fmt;

/// Tally is a distribution over small counts, gathered while validating
/// an index. Leaf-node depths for [`Llrb`], chain lengths for
/// [`ChainMap`]. Gives minimum, maximum, average and percentiles.
///
/// [`Llrb`]: crate::Llrb
/// [`ChainMap`]: crate::ChainMap
#[derive(Clone, Debug, Default)]
pub struct Tally {
    samples: usize,
    min: usize,
    max: usize,
    total: usize,
    counts: Vec<u64>,
}

impl Tally {
    pub(crate) fn new() -> Tally {
        Default::default()
    }

    pub(crate) fn sample(&mut self, count: usize) {
        self.samples += 1;
        self.total += count;
        // zero is a legitimate count, only the first sample seeds min/max.
        if self.samples == 1 || count < self.min {
            self.min = count
        }
        if self.samples == 1 || count > self.max {
            self.max = count
        }
        if count >= self.counts.len() {
            self.counts.resize(count + 1, 0);
        }
        self.counts[count] += 1;
    }

    /// Return number of samples gathered.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Return the smallest sampled count.
    pub fn min(&self) -> usize {
        self.min
    }

    /// Return the largest sampled count.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Return the average count, 0 when nothing was sampled.
    pub fn mean(&self) -> usize {
        if self.samples == 0 {
            0
        } else {
            self.total / self.samples
        }
    }

    /// Return counts as tuples of (percentile, count), for percentiles
    /// from 90 upward.
    pub fn percentiles(&self) -> Vec<(u8, usize)> {
        let mut percentiles: Vec<(u8, usize)> = vec![];
        let (mut acc, mut from) = (0_u64, 90_u8);
        let iter = self.counts.iter().enumerate().filter(|(_, &n)| n > 0);
        for (count, n) in iter {
            acc += *n;
            let perc = ((acc as f64 / self.samples as f64) * 100_f64) as u8;
            if perc >= from {
                percentiles.push((perc, count));
                from = perc.saturating_add(1);
            }
        }
        percentiles
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(min:{} mean:{} max:{}", self.min, self.mean(), self.max)?;
        for (perc, count) in self.percentiles() {
            write!(f, " {}th:{}", perc, count)?;
        }
        write!(f, ")")
    }
}
