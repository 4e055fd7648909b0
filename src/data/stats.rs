//! Reducers over `f64` slices, shaped to plug into `element_apply` and
//! `group_apply`.
//!
//! Empty input yields `NaN` for every statistic except [`sum`], which is `0.0`.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;

pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    sum(values) / values.len() as f64
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sample standard deviation (n - 1 denominator).
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Geometric mean; zeros are floored at 1 so sparse probe counts stay finite.
pub fn geometric_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let log_sum: f64 = values.iter().map(|v| v.max(1.0).ln()).sum();
    (log_sum / values.len() as f64).exp()
}

pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::min).unwrap_or(f64::NAN)
}

pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(f64::NAN)
}

// ---------------------------------------------------------------------------
// Named statistic, for choosing a reducer at run time
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    Sum,
    Mean,
    Median,
    StdDev,
    GeoMean,
    Min,
    Max,
}

impl Statistic {
    pub fn apply(self, values: &[f64]) -> f64 {
        match self {
            Statistic::Sum => sum(values),
            Statistic::Mean => mean(values),
            Statistic::Median => median(values),
            Statistic::StdDev => std_dev(values),
            Statistic::GeoMean => geometric_mean(values),
            Statistic::Min => min(values),
            Statistic::Max => max(values),
        }
    }
}

impl FromStr for Statistic {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "sum" => Statistic::Sum,
            "mean" => Statistic::Mean,
            "median" => Statistic::Median,
            "sd" | "std" | "stddev" => Statistic::StdDev,
            "geomean" | "ngeomean" => Statistic::GeoMean,
            "min" => Statistic::Min,
            "max" => Statistic::Max,
            other => bail!("Unknown statistic: {other}"),
        })
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Statistic::Sum => "sum",
            Statistic::Mean => "mean",
            Statistic::Median => "median",
            Statistic::StdDev => "sd",
            Statistic::GeoMean => "geomean",
            Statistic::Min => "min",
            Statistic::Max => "max",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_median() {
        assert!((mean(&[1.0, 2.0, 6.0]) - 3.0).abs() < 1e-12);
        assert_eq!(median(&[5.0, 1.0, 3.0]), 3.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_std_dev() {
        let sd = std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((sd - 2.138089935).abs() < 1e-6);
        assert!(std_dev(&[1.0]).is_nan());
    }

    #[test]
    fn test_geometric_mean_floors_zero() {
        assert!((geometric_mean(&[1.0, 100.0]) - 10.0).abs() < 1e-9);
        assert!((geometric_mean(&[0.0, 4.0]) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(sum(&[]), 0.0);
        assert!(mean(&[]).is_nan());
        assert!(min(&[]).is_nan());
    }

    #[test]
    fn test_statistic_parse() {
        assert_eq!("Mean".parse::<Statistic>().unwrap(), Statistic::Mean);
        assert_eq!("sd".parse::<Statistic>().unwrap(), Statistic::StdDev);
        assert!("mode".parse::<Statistic>().is_err());
        assert_eq!(Statistic::Max.apply(&[1.0, 7.0, 3.0]), 7.0);
    }
}
