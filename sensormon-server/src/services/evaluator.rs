use std::fmt;

use crate::configs::Thresholds;
use crate::models::{AggregateStats, Reading};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    Temperature,
    Humidity,
}

/// A single threshold breach.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anomaly {
    pub metric: Metric,
    pub value: f64,
    pub threshold: f64,
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.metric {
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
        };

        write!(f, "{name} anomaly, {:.1} > {:.1}", self.value, self.threshold)
    }
}

/// Stateless threshold checks.
#[derive(Clone, Copy, Debug)]
pub struct AnomalyEvaluator {
    thresholds: Thresholds,
}

impl AnomalyEvaluator {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Both checks always run; one anomaly per breached threshold.
    pub fn evaluate(&self, reading: &Reading) -> Vec<Anomaly> {
        let mut anomalies = Vec::with_capacity(2);

        if reading.temperature > self.thresholds.anomaly_temp {
            anomalies.push(Anomaly {
                metric: Metric::Temperature,
                value: reading.temperature,
                threshold: self.thresholds.anomaly_temp,
            });
        }

        if reading.humidity > self.thresholds.anomaly_humidity {
            anomalies.push(Anomaly {
                metric: Metric::Humidity,
                value: reading.humidity,
                threshold: self.thresholds.anomaly_humidity,
            });
        }

        anomalies
    }

    /// The temperature itself when it is above the live warning threshold.
    pub fn live_warning(&self, temperature: f64) -> Option<f64> {
        (temperature > self.thresholds.live_temp_warn).then_some(temperature)
    }

    /// The aggregate maximum when it is above the statistical threshold.
    /// Recomputed on every refresh, so it clears once the maximum drops back.
    pub fn statistical_warning(&self, stats: &AggregateStats) -> Option<f64> {
        stats
            .max_temperature
            .filter(|max| *max > self.thresholds.stat_temp_warn)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::local_now;

    use super::*;

    fn reading(temperature: f64, humidity: f64) -> Reading {
        Reading {
            time: local_now(),
            temperature,
            humidity,
        }
    }

    #[test]
    fn test_temperature_only() {
        let evaluator = AnomalyEvaluator::new(Thresholds::default());

        let anomalies = evaluator.evaluate(&reading(26.0, 35.0));

        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].metric, Metric::Temperature);
        assert_eq!(anomalies[0].to_string(), "temperature anomaly, 26.0 > 25.0");
        assert_eq!(evaluator.live_warning(26.0), Some(26.0));
    }

    #[test]
    fn test_both_checks_run() {
        let evaluator = AnomalyEvaluator::new(Thresholds::default());

        let anomalies = evaluator.evaluate(&reading(30.0, 50.0));

        assert_eq!(anomalies.len(), 2);
        assert_eq!(anomalies[1].to_string(), "humidity anomaly, 50.0 > 40.0");
    }

    #[test]
    fn test_humidity_only() {
        let evaluator = AnomalyEvaluator::new(Thresholds::default());

        let anomalies = evaluator.evaluate(&reading(20.0, 45.0));

        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].metric, Metric::Humidity);
        assert_eq!(anomalies[0].to_string(), "humidity anomaly, 45.0 > 40.0");
        assert_eq!(evaluator.live_warning(20.0), None);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let evaluator = AnomalyEvaluator::new(Thresholds::default());

        assert!(evaluator.evaluate(&reading(25.0, 40.0)).is_empty());
        assert_eq!(evaluator.live_warning(25.0), None);
    }

    #[test]
    fn test_statistical_warning_levels() {
        let evaluator = AnomalyEvaluator::new(Thresholds::default());
        let mut stats = AggregateStats::default();

        assert_eq!(evaluator.statistical_warning(&stats), None);

        stats.max_temperature = Some(41.5);
        assert_eq!(evaluator.statistical_warning(&stats), Some(41.5));

        stats.max_temperature = Some(40.0);
        assert_eq!(evaluator.statistical_warning(&stats), None);
    }
}
