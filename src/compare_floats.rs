pub fn max_of_2<T: PartialOrd + Copy>(first: T, second: T) -> T {
    if first > second {
        first
    } else {
        second
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(2., 4., 4.)]
    #[case(4., 2., 4.)]
    #[case(-1200., 0., 0.)]
    fn should_calc_max_of_2(#[case] first: f64, #[case] second: f64, #[case] expected: f64) {
        assert_eq!(max_of_2(first, second), expected);
    }
}
