/// Newton's method with a fixed budget, starting from `initial_guess`.
///
/// Stops once a step is smaller than `tolerance`, or when the derivative gets
/// so small (below `min_derivative`) that the next step would be meaningless.
/// Unlike a bracketed search, this never fails: if the budget runs out, the
/// latest iterate is returned as the best estimate.
pub fn newton_raphson(
    f_and_f_prime: impl Fn(f64) -> (f64, f64),
    initial_guess: f64,
    tolerance: f64,
    min_derivative: f64,
    num_iterations: usize,
) -> f64 {
    let mut guess = initial_guess;

    for _ in 0..num_iterations {
        let (f, f_prime) = f_and_f_prime(guess);
        if f_prime.abs() < min_derivative {
            break;
        }

        let step = f / f_prime;
        guess -= step;

        if step.abs() < tolerance {
            break;
        }
    }

    guess
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_cubics() {
        // Find the root of x^3 - a for several a
        for a in [2.0, 50.0, -1.0, 0.1].iter() {
            let root = newton_raphson(|x| (x * x * x - a, 3.0 * x * x), 1.0, 1e-14, 1e-12, 100);
            assert_relative_eq!(root, a.cbrt(), max_relative = 1e-12);
        }
    }

    #[test]
    fn test_trig() {
        // There's a unique fixed point cos(x) = x
        let root = newton_raphson(|x| (x.cos() - x, -x.sin() - 1.0), 0.0, 1e-14, 1e-12, 100);
        assert_relative_eq!(root, 0.73908513321516064);
    }

    #[test]
    fn test_flat_derivative_stops() {
        // Starting on the flat spot of x^2 - 1 would divide by zero
        let root = newton_raphson(|x| (x * x - 1.0, 2.0 * x), 0.0, 1e-14, 1e-12, 100);
        assert_eq!(root, 0.0);
    }

    #[test]
    fn test_budget_exhausted() {
        // One step only; we get the first Newton iterate back rather than a panic
        let root = newton_raphson(|x| (x * x - 2.0, 2.0 * x), 1.0, 1e-14, 1e-12, 1);
        assert_relative_eq!(root, 1.5);
    }
}
