use crate::point::Point2D;

/// Normalized error `(center - position) / scale`, per axis.
///
/// `scale` must have nonzero components; `SimulationConfig::validate`
/// guarantees this for the frame dimensions.
pub fn error(center: Point2D, position: Point2D, scale: Point2D) -> Point2D {
    (center - position) / scale
}

/// Error model bound to the frame dimensions of one session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorModel {
    scale: Point2D,
}

impl ErrorModel {
    pub fn new(scale: Point2D) -> Self {
        Self { scale }
    }

    pub fn error(&self, center: Point2D, position: Point2D) -> Point2D {
        error(center, position, self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn error_is_normalized_by_frame() {
        let model = ErrorModel::new(Point2D::new(1024.0, 800.0));
        let e = model.error(Point2D::new(400.0, 300.0), Point2D::new(100.0, 100.0));

        assert_relative_eq!(e.x, 300.0 / 1024.0, epsilon = 1e-12);
        assert_relative_eq!(e.y, 200.0 / 800.0, epsilon = 1e-12);
    }

    #[test]
    fn error_is_not_clamped() {
        let e = error(
            Point2D::new(3000.0, -2000.0),
            Point2D::ZERO,
            Point2D::new(1000.0, 1000.0),
        );
        assert_eq!(e, Point2D::new(3.0, -2.0));
    }
}
