use crate::foundation::math::Rng64;

/// Pick which search result to play.
///
/// No results yields `None` and a single result is always chosen. Otherwise every result is
/// equally likely.
pub fn select_result<T>(results: &[T], rng: &mut Rng64) -> Option<usize> {
    match results.len() {
        0 => None,
        1 => Some(0),
        n => Some(rng.below(n)),
    }
}
