use std::f64::consts::PI;

use rand::Rng;
use rand_distr::{Distribution, Normal, NormalError};
use time::OffsetDateTime;

const SECONDS_PER_DAY: f64 = 86400.0;

/// Fraction of the local day elapsed, in `[0, 1)`.
pub fn day_fraction(now: OffsetDateTime) -> f64 {
    let (hour, minute, second) = now.time().as_hms();

    (hour as u32 * 3600 + minute as u32 * 60 + second as u32) as f64 / SECONDS_PER_DAY
}

/// Coolest around 04:00, warmest around 16:00.
pub fn simulated_temperature(day_fraction: f64) -> f64 {
    let radians = (day_fraction - 0.42) * 2.0 * PI;

    22.0 + radians.sin() * 5.0
}

/// Runs opposite to temperature: damp nights, dry afternoons.
pub fn simulated_humidity(day_fraction: f64) -> f64 {
    let radians = (day_fraction - 0.42) * 2.0 * PI;

    (35.0 - radians.sin() * 8.0).clamp(0.0, 100.0)
}

pub struct Simulator {
    temperature_noise: Normal<f64>,
    humidity_noise: Normal<f64>,
}

impl Simulator {
    /// Gaussian noise with the given standard deviations on top of the curves.
    pub fn new(temperature_deviation: f64, humidity_deviation: f64) -> Result<Self, NormalError> {
        Ok(Self {
            temperature_noise: Normal::new(0.0, temperature_deviation)?,
            humidity_noise: Normal::new(0.0, humidity_deviation)?,
        })
    }

    /// One noisy sample for the given point of the day, rounded to 0.1.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, day_fraction: f64) -> (f64, f64) {
        let temperature = simulated_temperature(day_fraction) + self.temperature_noise.sample(rng);
        let humidity = simulated_humidity(day_fraction) + self.humidity_noise.sample(rng);

        (round_tenth(temperature), round_tenth(humidity.clamp(0.0, 100.0)))
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use time::macros::datetime;

    use super::*;

    #[test]
    fn test_day_fraction() {
        assert_eq!(day_fraction(datetime!(2024-01-01 00:00 UTC)), 0.0);
        assert_eq!(day_fraction(datetime!(2024-01-01 12:00 UTC)), 0.5);
        assert_eq!(day_fraction(datetime!(2024-01-01 18:00 UTC)), 0.75);
    }

    #[test]
    fn test_negative_deviation_rejected() {
        assert!(Simulator::new(-1.0, 1.0).is_err());
    }

    #[test]
    fn test_curves_peak_in_the_afternoon() {
        let night = simulated_temperature(4.0 / 24.0);
        let afternoon = simulated_temperature(16.0 / 24.0);

        assert!(afternoon > night);
        assert!(afternoon > 26.0);
        assert!(simulated_humidity(16.0 / 24.0) < simulated_humidity(4.0 / 24.0));
    }

    #[test]
    fn test_samples_stay_near_curve() {
        let simulator = Simulator::new(0.3, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            let (temperature, humidity) = simulator.sample(&mut rng, 0.5);

            assert!((temperature - simulated_temperature(0.5)).abs() < 3.0);
            assert!((0.0..=100.0).contains(&humidity));
        }
    }
}
