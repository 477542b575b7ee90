//! Bounded samplers over `rand_distr` families.
//!
//! Every sampler returns a finite value for any parameters, falling back to
//! the distribution mean when the parameters are degenerate.

use prior_store::Dist;
use rand::Rng;
use rand_distr::{Beta, Binomial, Distribution, Normal, Poisson, StandardNormal};

/// Rejection attempts before a bounded shock gives up and returns zero
const MAX_REJECTIONS: usize = 32;

/// Zero-mean normal shock rejected outside `bound` standard deviations
pub fn bounded_shock<R: Rng + ?Sized>(rng: &mut R, sd: f64, bound: f64) -> f64 {
    if !(sd.is_finite() && sd > 0.0 && bound > 0.0) {
        return 0.0;
    }

    for _ in 0..MAX_REJECTIONS {
        let z: f64 = rng.sample(StandardNormal);
        if z.abs() <= bound {
            return z * sd;
        }
    }
    0.0
}

/// Normal draw floored at zero
pub fn normal_floor<R: Rng + ?Sized>(rng: &mut R, dist: Dist) -> f64 {
    if !(dist.sd.is_finite() && dist.sd > 0.0) {
        return dist.mean.max(0.0);
    }
    match Normal::new(dist.mean, dist.sd) {
        Ok(normal) => normal.sample(rng).max(0.0),
        Err(_) => dist.mean.max(0.0),
    }
}

/// Share in `[0, max_share]` from a Beta matched to `dist` by moments.
///
/// A standard deviation beyond what a Beta with that mean allows is shrunk
/// to just inside the limit.
pub fn beta_share<R: Rng + ?Sized>(rng: &mut R, dist: Dist, max_share: f64) -> f64 {
    let mean = dist.mean;
    if !(mean.is_finite() && mean > 0.0) {
        return 0.0;
    }
    if mean >= 1.0 {
        return max_share;
    }

    let max_var = mean * (1.0 - mean);
    let var = (dist.sd * dist.sd).min(max_var * 0.99);
    if !(var.is_finite() && var > 0.0) {
        return mean.min(max_share);
    }

    let k = max_var / var - 1.0;
    match Beta::new(mean * k, (1.0 - mean) * k) {
        Ok(beta) => beta.sample(rng).clamp(0.0, max_share),
        Err(_) => mean.min(max_share),
    }
}

/// Poisson count; zero for non-positive rates
pub fn poisson_count<R: Rng + ?Sized>(rng: &mut R, lambda: f64) -> u32 {
    if !(lambda.is_finite() && lambda > 0.0) {
        return 0;
    }
    match Poisson::new(lambda) {
        Ok(poisson) => {
            let count: f64 = poisson.sample(rng);
            count as u32
        }
        Err(_) => 0,
    }
}

/// Binomial count of successes in `trials`
pub fn binomial_count<R: Rng + ?Sized>(rng: &mut R, trials: u32, p: f64) -> u32 {
    if trials == 0 || !(p.is_finite() && p > 0.0) {
        return 0;
    }
    match Binomial::new(trials as u64, p.min(1.0)) {
        Ok(binomial) => binomial.sample(rng) as u32,
        Err(_) => 0,
    }
}

/// Lognormal multiplier with mean exactly one
pub fn unit_lognormal<R: Rng + ?Sized>(rng: &mut R, sigma: f64) -> f64 {
    if !(sigma.is_finite() && sigma > 0.0) {
        return 1.0;
    }
    let z: f64 = rng.sample(StandardNormal);
    (sigma * z - 0.5 * sigma * sigma).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn mean(xs: &[f64]) -> f64 {
        xs.iter().sum::<f64>() / xs.len() as f64
    }

    #[test]
    fn test_bounded_shock_respects_bound() {
        let mut rng = rng();
        for _ in 0..10_000 {
            let x = bounded_shock(&mut rng, 0.1, 2.0);
            assert!(x.abs() <= 0.2 + 1e-12);
        }
        assert_eq!(bounded_shock(&mut rng, 0.0, 2.0), 0.0);
        assert_eq!(bounded_shock(&mut rng, 0.1, 0.0), 0.0);
    }

    #[test]
    fn test_beta_share_matches_mean() {
        let mut rng = rng();
        let draws: Vec<f64> =
            (0..20_000).map(|_| beta_share(&mut rng, Dist::new(0.22, 0.06), 0.95)).collect();
        assert!((mean(&draws) - 0.22).abs() < 0.005);
        assert!(draws.iter().all(|&s| (0.0..=0.95).contains(&s)));
    }

    #[test]
    fn test_beta_share_degenerate_inputs() {
        let mut rng = rng();
        assert_eq!(beta_share(&mut rng, Dist::new(0.0, 0.1), 0.95), 0.0);
        assert_eq!(beta_share(&mut rng, Dist::new(0.3, 0.0), 0.95), 0.3);
        assert_eq!(beta_share(&mut rng, Dist::new(1.2, 0.1), 0.95), 0.95);
        // Variance above the Beta limit is shrunk, not rejected
        let s = beta_share(&mut rng, Dist::new(0.5, 0.9), 0.95);
        assert!((0.0..=0.95).contains(&s));
    }

    #[test]
    fn test_counts() {
        let mut rng = rng();
        assert_eq!(poisson_count(&mut rng, 0.0), 0);
        assert_eq!(poisson_count(&mut rng, f64::NAN), 0);
        assert_eq!(binomial_count(&mut rng, 0, 0.5), 0);
        assert_eq!(binomial_count(&mut rng, 10, 1.5), 10);

        let draws: Vec<f64> = (0..20_000).map(|_| poisson_count(&mut rng, 3.0) as f64).collect();
        assert!((mean(&draws) - 3.0).abs() < 0.05);
    }

    #[test]
    fn test_unit_lognormal_mean_one() {
        let mut rng = rng();
        let draws: Vec<f64> = (0..40_000).map(|_| unit_lognormal(&mut rng, 0.5)).collect();
        assert!((mean(&draws) - 1.0).abs() < 0.02);
        assert!(draws.iter().all(|&x| x > 0.0));
    }

    #[test]
    fn test_normal_floor_non_negative() {
        let mut rng = rng();
        for _ in 0..1000 {
            assert!(normal_floor(&mut rng, Dist::new(1.0, 3.0)) >= 0.0);
        }
        assert_eq!(normal_floor(&mut rng, Dist::new(-2.0, 0.0)), 0.0);
    }
}
