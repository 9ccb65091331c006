// Statistic Engine - Pure computations over a window snapshot
// Closed set of statistics selected by tag; no state, no side effects

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("no data")]
    EmptyInput,
}

/// Quartile probabilities used by `Statistic::Quantiles`
pub const QUARTILES: [f64; 3] = [0.25, 0.50, 0.75];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Statistic {
    Mean,
    StdDev,
    Quantiles,
    MaxMin,
}

impl Statistic {
    pub const ALL: [Statistic; 4] = [
        Statistic::Mean,
        Statistic::StdDev,
        Statistic::Quantiles,
        Statistic::MaxMin,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::StdDev => "std_dev",
            Statistic::Quantiles => "quantiles",
            Statistic::MaxMin => "max_min",
        }
    }

    pub fn compute(&self, data: &[f64]) -> Result<StatisticValue, StatsError> {
        match self {
            Statistic::Mean => mean(data).map(StatisticValue::Scalar),
            Statistic::StdDev => std_dev(data).map(StatisticValue::Scalar),
            Statistic::Quantiles => quantiles(data).map(StatisticValue::Quartiles),
            Statistic::MaxMin => max_min(data).map(|(max, min)| StatisticValue::MaxMin { max, min }),
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of one engine call. Transient, never retained by stages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum StatisticValue {
    Scalar(f64),
    Quartiles([f64; 3]),
    MaxMin { max: f64, min: f64 },
}

impl fmt::Display for StatisticValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatisticValue::Scalar(v) => write!(f, "{:.2}", v),
            StatisticValue::Quartiles([q1, q2, q3]) => write!(f, "[{}, {}, {}]", q1, q2, q3),
            StatisticValue::MaxMin { max, min } => write!(f, "{{max: {}, min: {}}}", max, min),
        }
    }
}

pub fn mean(data: &[f64]) -> Result<f64, StatsError> {
    if data.is_empty() {
        return Err(StatsError::EmptyInput);
    }
    Ok(data.iter().sum::<f64>() / data.len() as f64)
}

/// Population standard deviation (divides by N)
pub fn std_dev(data: &[f64]) -> Result<f64, StatsError> {
    let avg = mean(data)?;
    let sum_sq: f64 = data.iter().map(|x| (x - avg).powi(2)).sum();
    Ok((sum_sq / data.len() as f64).sqrt())
}

/// Nearest-rank quartiles: index = floor((N - 1) * p) into the sorted data
pub fn quantiles(data: &[f64]) -> Result<[f64; 3], StatsError> {
    if data.is_empty() {
        return Err(StatsError::EmptyInput);
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let last = (sorted.len() - 1) as f64;
    let pick = |p: f64| sorted[(last * p).floor() as usize];
    Ok([pick(QUARTILES[0]), pick(QUARTILES[1]), pick(QUARTILES[2])])
}

/// Returns `(max, min)`
pub fn max_min(data: &[f64]) -> Result<(f64, f64), StatsError> {
    let (first, rest) = data.split_first().ok_or(StatsError::EmptyInput)?;
    Ok(rest.iter().fold((*first, *first), |(max, min), &x| {
        (if x > max { x } else { max }, if x < min { x } else { min })
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: [f64; 6] = [20.0, 21.0, 22.0, 23.0, 24.0, 25.0];

    #[test]
    fn test_mean() {
        assert!((mean(&SAMPLE).unwrap() - 22.5).abs() < 1e-12);
    }

    #[test]
    fn test_std_dev_is_population() {
        // variance = 17.5 / 6
        let expected = (17.5_f64 / 6.0).sqrt();
        assert!((std_dev(&SAMPLE).unwrap() - expected).abs() < 1e-12);
        assert_eq!(std_dev(&[4.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_quantiles_nearest_rank() {
        // floor(5 * 0.25) = 1, floor(5 * 0.5) = 2, floor(5 * 0.75) = 3
        assert_eq!(quantiles(&SAMPLE).unwrap(), [21.0, 22.0, 23.0]);
    }

    #[test]
    fn test_quantiles_sorts_input() {
        let shuffled = [25.0, 20.0, 23.0, 21.0, 24.0, 22.0];
        assert_eq!(quantiles(&shuffled).unwrap(), [21.0, 22.0, 23.0]);
        assert_eq!(quantiles(&[7.0]).unwrap(), [7.0, 7.0, 7.0]);
    }

    #[test]
    fn test_max_min() {
        assert_eq!(max_min(&[22.1, 19.4, 30.2, 25.0]).unwrap(), (30.2, 19.4));
    }

    #[test]
    fn test_empty_input_is_signalled() {
        for statistic in Statistic::ALL {
            assert_eq!(statistic.compute(&[]), Err(StatsError::EmptyInput));
        }
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Statistic::Mean.compute(&SAMPLE).unwrap().to_string(), "22.50");
        assert_eq!(Statistic::Quantiles.compute(&SAMPLE).unwrap().to_string(), "[21, 22, 23]");
        assert_eq!(Statistic::MaxMin.compute(&SAMPLE).unwrap().to_string(), "{max: 25, min: 20}");
    }
}
