use super::*;

#[test]
fn rng_is_deterministic() {
    let mut a = Rng64::new(123);
    let mut b = Rng64::new(123);
    for _ in 0..16 {
        assert_eq!(a.next_u64(), b.next_u64());
    }
}

#[test]
fn below_stays_in_range_and_covers_it() {
    let mut rng = Rng64::new(7);
    let mut seen = [false; 5];
    for _ in 0..500 {
        let v = rng.below(5);
        assert!(v < 5);
        seen[v] = true;
    }
    assert!(seen.iter().all(|s| *s));
    assert_eq!(rng.below(0), 0);
    assert_eq!(rng.below(1), 0);
}

#[test]
fn mul_div255_edges() {
    assert_eq!(mul_div255(255, 255), 255);
    assert_eq!(mul_div255(0, 255), 0);
    assert_eq!(mul_div255(255, 128), 128);
}
