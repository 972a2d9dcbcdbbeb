use crate::kalman_filter::StateMean;
use nalgebra::Matrix1x4;
use num::Float;
use std::fmt::Debug;

/* ------------------------------------------------------------------------------
 * Type aliases
 * ------------------------------------------------------------------------------ */
/// Center x, center y, aspect ratio (width / height), height.
pub type Xyah<T> = Matrix1x4<T>;

/* ------------------------------------------------------------------------------
 * Rect struct
 * ------------------------------------------------------------------------------ */

/// Axis-aligned box stored as top-left corner, width and height.
#[derive(Debug, Clone, PartialEq)]
pub struct Rect<T>
where
    T: Debug + Float,
{
    tlwh: Matrix1x4<T>,
}

impl<T> Rect<T>
where
    T: Debug + Float + 'static,
{
    pub fn new(x: T, y: T, width: T, height: T) -> Self {
        Self {
            tlwh: Matrix1x4::new(x, y, width, height),
        }
    }

    #[inline(always)]
    pub fn x(&self) -> T {
        self.tlwh[(0, 0)]
    }

    #[inline(always)]
    pub fn y(&self) -> T {
        self.tlwh[(0, 1)]
    }

    #[inline(always)]
    pub fn width(&self) -> T {
        self.tlwh[(0, 2)]
    }

    #[inline(always)]
    pub fn height(&self) -> T {
        self.tlwh[(0, 3)]
    }

    /// Measurement for the Kalman filter.
    pub fn get_xyah(&self) -> Xyah<T> {
        let two = T::one() + T::one();
        Matrix1x4::new(
            self.x() + self.width() / two,
            self.y() + self.height() / two,
            self.width() / self.height(),
            self.height(),
        )
    }

    /// Get bounding box as [x1, y1, x2, y2] format
    pub fn get_xyxy(&self) -> [T; 4] {
        [
            self.x(),
            self.y(),
            self.x() + self.width(),
            self.y() + self.height(),
        ]
    }

    /// Create Rect from [x1, y1, x2, y2] format
    pub fn from_xyxy(x1: T, y1: T, x2: T, y2: T) -> Self {
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Create Rect from (center_x, center_y, aspect_ratio, height).
    /// A non-positive aspect ratio collapses the width to zero.
    pub fn from_xyah(xyah: &Xyah<T>) -> Self {
        let two = T::one() + T::one();
        let (x, y, a, h) = (xyah[(0, 0)], xyah[(0, 1)], xyah[(0, 2)], xyah[(0, 3)]);
        let w = if a <= T::zero() { T::zero() } else { a * h };
        Self::new(x - w / two, y - h / two, w, h)
    }
}

impl Rect<f32> {
    /// Box described by the position part of a filtered state.
    pub fn from_mean(mean: &StateMean) -> Self {
        let xyah = mean.fixed_view::<1, 4>(0, 0).into_owned();
        Self::from_xyah(&xyah)
    }
}
