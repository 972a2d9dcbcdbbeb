//! Constant-velocity Kalman filter for tracking bounding boxes across video
//! frames, with Gaussian and Mahalanobis gating distances for data
//! association.
//!
//! ```
//! use kftrack_rs::{chi2inv95, DetectBox, GatingMetric, KalmanFilter};
//!
//! let kf = KalmanFilter::default();
//! let (mean, covariance) = kf.initiate(&DetectBox::new(100.0, 50.0, 0.5, 200.0));
//! let (mean, covariance) = kf.predict(&mean, &covariance);
//!
//! let candidates = [DetectBox::new(104.0, 52.0, 0.5, 201.0)];
//! let distances = kf
//!     .gating_distance(&mean, &covariance, &candidates, false, GatingMetric::Mahalanobis)
//!     .unwrap();
//! assert!(distances[0] < chi2inv95(4).unwrap());
//!
//! let (mean, covariance) = kf.update(&mean, &covariance, &candidates[0]).unwrap();
//! # let _ = (mean, covariance);
//! ```
pub mod config;
pub mod error;
pub mod gating;
pub mod kalman_filter;
pub mod rect;

pub use config::KalmanFilterConfig;
pub use error::{KalmanError, Result};
pub use gating::{chi2inv95, GatingMetric, CHI2INV95};
pub use kalman_filter::{
    detect_box_from_slice, state_cov_from_slice, state_mean_from_slice,
    DetectBox, KalmanFilter, StateCov, StateHCov, StateHMean, StateMean,
};
pub use rect::{Rect, Xyah};
