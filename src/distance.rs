//! Distance metrics over encoded samples.

/// Number of coordinates at which `a` and `b` differ.
///
/// Extra coordinates of the longer slice are ignored.
#[must_use]
pub fn hamming_distance(a: &[usize], b: &[usize]) -> usize {
    a.iter().zip(b).filter(|(x, y)| x != y).count()
}
