use crate::error::{KalmanError, Result};
use crate::kalman_filter::{DetectBox, KalmanFilter, StateCov, StateMean};
use nalgebra::SMatrix;
use std::fmt;
use std::str::FromStr;

/* -----------------------------------------------------------------------------
 * Chi-square table
 * ----------------------------------------------------------------------------- */

/// 0.95 quantile of the chi-square distribution for 1..=9 degrees of
/// freedom, used as the Mahalanobis gating threshold. Index `dof - 1`.
pub const CHI2INV95: [f32; 9] = [
    3.8415, 5.9915, 7.8147, 9.4877, 11.070, 12.592, 14.067, 15.507, 16.919,
];

/// Gating threshold for `dof` degrees of freedom: 4 for full boxes, 2 when
/// gating on position only.
pub fn chi2inv95(dof: usize) -> Option<f32> {
    dof.checked_sub(1).and_then(|i| CHI2INV95.get(i).copied())
}

/* -----------------------------------------------------------------------------
 * GatingMetric
 * ----------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatingMetric {
    /// Squared euclidean distance in measurement space.
    Gaussian,
    /// Squared Mahalanobis distance against the projected covariance.
    #[default]
    Mahalanobis,
}

impl FromStr for GatingMetric {
    type Err = KalmanError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "gaussian" => Ok(Self::Gaussian),
            "maha" | "mahalanobis" => Ok(Self::Mahalanobis),
            _ => {
                log::debug!("rejected gating metric {:?}", name);
                Err(KalmanError::InvalidMetric(name.to_string()))
            }
        }
    }
}

impl fmt::Display for GatingMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gaussian => write!(f, "gaussian"),
            Self::Mahalanobis => write!(f, "maha"),
        }
    }
}

/* -----------------------------------------------------------------------------
 * Gating distance
 * ----------------------------------------------------------------------------- */

impl KalmanFilter {
    /// Squared distance between the projected state and every measurement.
    ///
    /// With `only_position` only the box center `(x, y)` is compared. The
    /// returned values are not thresholded, compare them with
    /// [`chi2inv95`] (`4` degrees of freedom, or `2` for positions).
    pub fn gating_distance(
        &self,
        mean: &StateMean,
        covariance: &StateCov,
        measurements: &[DetectBox],
        only_position: bool,
        metric: GatingMetric,
    ) -> Result<Vec<f32>> {
        let (projected_mean, projected_cov) = self.project(mean, covariance);

        if only_position {
            let projected_mean = projected_mean.fixed_view::<1, 2>(0, 0).into_owned();
            let projected_cov = projected_cov.fixed_view::<2, 2>(0, 0).into_owned();
            let diffs = measurements
                .iter()
                .map(|m| m.fixed_view::<1, 2>(0, 0).into_owned() - projected_mean)
                .collect::<Vec<_>>();
            squared_distances(projected_cov, &diffs, metric)
        } else {
            let diffs = measurements
                .iter()
                .map(|m| m - projected_mean)
                .collect::<Vec<_>>();
            squared_distances(projected_cov, &diffs, metric)
        }
    }

    /// Same as [`gating_distance`](KalmanFilter::gating_distance) with the
    /// metric given by name (`"gaussian"` or `"maha"`). Unknown names fail
    /// before anything is computed.
    pub fn gating_distance_by_name(
        &self,
        mean: &StateMean,
        covariance: &StateCov,
        measurements: &[DetectBox],
        only_position: bool,
        metric: &str,
    ) -> Result<Vec<f32>> {
        let metric = metric.parse::<GatingMetric>()?;
        self.gating_distance(mean, covariance, measurements, only_position, metric)
    }
}

fn squared_distances<const D: usize>(
    covariance: SMatrix<f32, D, D>,
    diffs: &[SMatrix<f32, 1, D>],
    metric: GatingMetric,
) -> Result<Vec<f32>> {
    match metric {
        GatingMetric::Gaussian => Ok(diffs.iter().map(|d| d.norm_squared()).collect()),
        GatingMetric::Mahalanobis => {
            let cholesky_factor = covariance.cholesky().ok_or_else(|| {
                log::warn!("gating covariance is not positive definite: {:?}", covariance);
                KalmanError::NotPositiveDefinite("gating_distance")
            })?;
            let lower = cholesky_factor.l();
            diffs
                .iter()
                .map(|d| {
                    // L z = d^T, |z|^2 = d S^-1 d^T
                    lower
                        .solve_lower_triangular(&d.transpose())
                        .map(|z| z.norm_squared())
                        .ok_or(KalmanError::NotPositiveDefinite("gating_distance"))
                })
                .collect()
        }
    }
}
