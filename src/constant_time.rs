// Kept out of line so the optimizer cannot short-circuit on the first differing byte.
#[inline(never)]
fn constant_time_ne(a: &[u8], b: &[u8]) -> u8 {
    assert!(a.len() == b.len());

    // Reslicing lets the optimizer elide the bounds checks in the loop below.
    let len = a.len();
    let a = &a[..len];
    let b = &b[..len];

    let mut acc = 0;
    for (x, y) in a.iter().zip(b) {
        acc |= x ^ y;
    }
    acc // The compare with 0 must happen outside this function.
}

/// Compares byte strings in constant time.
pub(crate) fn eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && constant_time_ne(a, b) == 0
}

#[cfg(test)]
mod tests {
    use super::eq;

    #[test]
    fn equality() {
        assert!(eq(&[1, 2, 3], &[1, 2, 3]));
        assert!(!eq(&[1, 2, 3], &[1, 2, 4]));
        assert!(!eq(&[1, 2, 3], &[1, 2]));
        assert!(eq(&[], &[]));
    }
}
