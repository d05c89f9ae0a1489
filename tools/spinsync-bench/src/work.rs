//!
//! Synthetic Work
//!
//! Trial-division primality test used to put load inside and outside the
//! critical sections. The result goes through `black_box` so the optimizer
//! cannot drop the loop.
//!

use std::hint::black_box;

pub fn is_prime(candidate: u64) -> bool {
    let candidate = black_box(candidate);
    if candidate <= 1 {
        return false;
    }
    let mut divisor = 2;
    while divisor < candidate {
        if candidate % divisor == 0 {
            return black_box(false);
        }
        divisor += 1;
    }
    black_box(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_values() {
        assert!(!is_prime(0));
        assert!(!is_prime(1));
        assert!(is_prime(2));
        assert!(is_prime(3));
        assert!(!is_prime(4));
        assert!(!is_prime(1_000));
        assert!(is_prime(1_009));
    }

    #[test]
    fn test_primes_below_fifty() {
        let primes: Vec<u64> = (0..50).filter(|&n| is_prime(n)).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47]);
    }
}
