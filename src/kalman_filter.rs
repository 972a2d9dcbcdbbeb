use crate::config::KalmanFilterConfig;
use crate::error::{KalmanError, Result};
use nalgebra::{SMatrix, SVector};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/* -----------------------------------------------------------------------------
 * Type aliases
 * ----------------------------------------------------------------------------- */
// 1x4, (x, y, a, h)
pub type DetectBox = SMatrix<f32, 1, 4>;
// 1x8, (x, y, a, h, vx, vy, va, vh)
pub type StateMean = SMatrix<f32, 1, 8>;
// 8x8
pub type StateCov = SMatrix<f32, 8, 8>;
// 1x4
pub type StateHMean = SMatrix<f32, 1, 4>;
// 4x4
pub type StateHCov = SMatrix<f32, 4, 4>;

/* -----------------------------------------------------------------------------
 * Kalman Filter
 * ----------------------------------------------------------------------------- */

/// Kalman filter for bounding boxes in image space.
///
/// The state `(x, y, a, h, vx, vy, va, vh)` holds the box center, aspect
/// ratio, height and their velocities. Motion follows a constant velocity
/// model and `(x, y, a, h)` is observed directly.
///
/// The filter only holds the model. Every track keeps its own
/// `(StateMean, StateCov)` pair and passes it in, so a single filter can be
/// shared across threads.
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    std_weight_position: f32,
    std_weight_velocity: f32,
    dt: f32,
    motion_mat: SMatrix<f32, 8, 8>, // 8x8
    update_mat: SMatrix<f32, 4, 8>, // 4x8
}

impl Default for KalmanFilter {
    fn default() -> Self {
        Self::with_config(&KalmanFilterConfig::default())
    }
}

impl KalmanFilter {
    pub fn new(std_weight_position: f32, std_weight_velocity: f32) -> Self {
        Self::with_config(&KalmanFilterConfig::new(
            std_weight_position,
            std_weight_velocity,
        ))
    }

    /// Builds the filter from a config, rejecting invalid weights.
    pub fn from_config(config: &KalmanFilterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: &KalmanFilterConfig) -> Self {
        let ndim = 4;

        let mut motion_mat = SMatrix::<f32, 8, 8>::identity();
        for i in 0..ndim {
            motion_mat[(i, i + ndim)] = config.dt;
        }

        let mut update_mat = SMatrix::<f32, 4, 8>::zeros();
        for i in 0..ndim {
            update_mat[(i, i)] = 1.0;
        }

        Self {
            std_weight_position: config.std_weight_position,
            std_weight_velocity: config.std_weight_velocity,
            dt: config.dt,
            motion_mat,
            update_mat,
        }
    }

    pub fn config(&self) -> KalmanFilterConfig {
        KalmanFilterConfig {
            std_weight_position: self.std_weight_position,
            std_weight_velocity: self.std_weight_velocity,
            dt: self.dt,
        }
    }

    pub fn motion_mat(&self) -> &SMatrix<f32, 8, 8> {
        &self.motion_mat
    }

    pub fn update_mat(&self) -> &SMatrix<f32, 4, 8> {
        &self.update_mat
    }

    /// Creates the state of a new track from an unassociated measurement.
    /// Velocities start at zero.
    pub fn initiate(&self, measurement: &DetectBox) -> (StateMean, StateCov) {
        let mut mean = StateMean::zeros();
        mean.as_mut_slice()[0..4].copy_from_slice(measurement.as_slice());

        let height = measurement[(0, 3)];
        let std = SVector::<f32, 8>::from_iterator([
            2.0 * self.std_weight_position * height,
            2.0 * self.std_weight_position * height,
            1e-2,
            2.0 * self.std_weight_position * height,
            10.0 * self.std_weight_velocity * height,
            10.0 * self.std_weight_velocity * height,
            1e-5,
            10.0 * self.std_weight_velocity * height,
        ]);
        let covariance = StateCov::from_diagonal(&std.component_mul(&std));

        (mean, covariance)
    }

    /// Process noise, scaled by the current height estimate.
    fn motion_cov(&self, mean: &StateMean) -> StateCov {
        let height = mean[(0, 3)];
        let std = SVector::<f32, 8>::from_iterator([
            self.std_weight_position * height,
            self.std_weight_position * height,
            1e-2,
            self.std_weight_position * height,
            self.std_weight_velocity * height,
            self.std_weight_velocity * height,
            1e-5,
            self.std_weight_velocity * height,
        ]);
        StateCov::from_diagonal(&std.component_mul(&std))
    }

    /// Runs the prediction step for one track.
    pub fn predict(
        &self,
        mean: &StateMean,      // 1x8
        covariance: &StateCov, // 8x8
    ) -> (StateMean, StateCov) {
        let motion_cov = self.motion_cov(mean);
        let mean = (self.motion_mat * mean.transpose()).transpose();
        let covariance = self.motion_mat * covariance * self.motion_mat.transpose()
            + motion_cov;

        (mean, covariance)
    }

    /// Runs the prediction step over a batch of tracks.
    ///
    /// Rows are independent, the result equals calling [`predict`] on each
    /// `(means[i], covariances[i])`. With the `rayon` feature the rows are
    /// processed in parallel.
    ///
    /// [`predict`]: KalmanFilter::predict
    pub fn multi_predict(
        &self,
        means: &[StateMean],
        covariances: &[StateCov],
    ) -> Result<(Vec<StateMean>, Vec<StateCov>)> {
        if means.len() != covariances.len() {
            return Err(KalmanError::ShapeMismatch {
                expected: means.len(),
                got: covariances.len(),
                context: "multi_predict covariances",
            });
        }
        log::debug!("multi_predict over {} tracks", means.len());

        #[cfg(feature = "rayon")]
        let predicted = means
            .par_iter()
            .zip(covariances.par_iter())
            .map(|(mean, covariance)| self.predict(mean, covariance))
            .unzip();

        #[cfg(not(feature = "rayon"))]
        let predicted = means
            .iter()
            .zip(covariances.iter())
            .map(|(mean, covariance)| self.predict(mean, covariance))
            .unzip();

        Ok(predicted)
    }

    /// Projects a state distribution into measurement space.
    pub fn project(
        &self,
        mean: &StateMean,      // 1x8
        covariance: &StateCov, // 8x8
    ) -> (StateHMean, StateHCov) {
        let height = mean[(0, 3)];
        let std = SVector::<f32, 4>::from_iterator([
            self.std_weight_position * height,
            self.std_weight_position * height,
            1e-1,
            self.std_weight_position * height,
        ]);
        let innovation_cov = StateHCov::from_diagonal(&std.component_mul(&std));

        // update_mat: 4x8, mean: 1x8
        let projected_mean = mean * self.update_mat.transpose();
        let projected_cov =
            self.update_mat * covariance * self.update_mat.transpose();

        (projected_mean, projected_cov + innovation_cov)
    }

    /// Runs the correction step with an associated measurement.
    ///
    /// Fails with [`KalmanError::NotPositiveDefinite`] when the projected
    /// covariance cannot be Cholesky-factored. The track is then corrupt and
    /// should be dropped by the caller.
    pub fn update(
        &self,
        mean: &StateMean,         // 1x8
        covariance: &StateCov,    // 8x8
        measurement: &DetectBox, // 1x4
    ) -> Result<(StateMean, StateCov)> {
        let (projected_mean, projected_cov) = self.project(mean, covariance);

        let cholesky_factor = projected_cov.cholesky().ok_or_else(|| {
            log::warn!("projected covariance is not positive definite: {:?}", projected_cov);
            KalmanError::NotPositiveDefinite("update")
        })?;

        // (P * H^T)^T: 4x8
        let b = (covariance * self.update_mat.transpose()).transpose();
        // kalman_gain^T: 4x8, solved through L and L^T
        let kalman_gain = cholesky_factor.solve(&b);
        // innovation: 1x4
        let innovation = measurement - projected_mean;

        let new_mean = mean + innovation * kalman_gain;
        let new_covariance = covariance
            - kalman_gain.transpose() * projected_cov * kalman_gain;

        Ok((new_mean, new_covariance))
    }
}

/* -----------------------------------------------------------------------------
 * Slice constructors
 * ----------------------------------------------------------------------------- */

fn from_row_slice<const R: usize, const C: usize>(
    values: &[f32],
    context: &'static str,
) -> Result<SMatrix<f32, R, C>> {
    if values.len() != R * C {
        return Err(KalmanError::ShapeMismatch {
            expected: R * C,
            got: values.len(),
            context,
        });
    }
    Ok(SMatrix::<f32, R, C>::from_row_slice(values))
}

/// Builds a measurement from `[x, y, a, h]`.
pub fn detect_box_from_slice(values: &[f32]) -> Result<DetectBox> {
    from_row_slice(values, "measurement")
}

/// Builds a state mean from 8 values.
pub fn state_mean_from_slice(values: &[f32]) -> Result<StateMean> {
    from_row_slice(values, "state mean")
}

/// Builds a state covariance from 64 values in row-major order.
pub fn state_cov_from_slice(values: &[f32]) -> Result<StateCov> {
    from_row_slice(values, "state covariance")
}
