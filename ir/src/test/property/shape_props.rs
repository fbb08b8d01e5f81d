use proptest::prelude::*;

use super::generators::arb_array_shape;

proptest! {
    /// Row-major linearization is a bijection onto [0, element_count).
    #[test]
    fn linear_index_is_bijective(shape in arb_array_shape()) {
        let count = shape.element_count();
        let mut seen = vec![false; count as usize];
        let mut index = vec![0i64; shape.rank()];

        loop {
            let offset = shape.linear_index(&index).expect("index within bounds");
            prop_assert!(!seen[offset as usize]);
            seen[offset as usize] = true;

            // Odometer increment, innermost dimension fastest.
            let mut d = shape.rank();
            loop {
                if d == 0 {
                    prop_assert!(seen.iter().all(|&s| s));
                    return Ok(());
                }
                d -= 1;
                index[d] += 1;
                if index[d] < shape.dims()[d] {
                    break;
                }
                index[d] = 0;
            }
        }
    }
}
