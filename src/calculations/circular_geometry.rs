use std::f64::consts::PI;

/// Filling state of a circular conduit for a given liquid height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowRegime {
    Full,
    PartiallyFull,
}

/// Wetted cross section of a circular pipe at one liquid height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WettedSection {
    pub regime: FlowRegime,
    pub area: f64,
    pub perimeter: f64,
    pub hydraulic_radius: f64,
}

pub struct CircularGeometry {
    pipe_radius: f64,
    radius_squared: f64,
    circle_area: f64,
}

impl CircularGeometry {
    pub fn new(pipe_radius: f64) -> Self {
        let radius_squared = pipe_radius.powi(2);
        CircularGeometry {
            pipe_radius,
            radius_squared,
            circle_area: PI * radius_squared,
        }
    }

    pub fn pipe_radius(&self) -> f64 {
        self.pipe_radius
    }

    pub fn regime(&self, height: f64) -> FlowRegime {
        if height > 2.0 * self.pipe_radius {
            FlowRegime::Full
        } else {
            FlowRegime::PartiallyFull
        }
    }

    /// Central angle of the wetted segment, in radians within [0, 2π].
    pub fn central_angle(&self, height: f64) -> f64 {
        let cosine = ((self.pipe_radius - height) / self.pipe_radius).clamp(-1.0, 1.0);
        2.0 * cosine.acos()
    }

    /// Geometry at `height`. At zero height area and perimeter are both zero, so the
    /// hydraulic radius is NaN; callers treat that depth before dividing.
    pub fn section(&self, height: f64) -> WettedSection {
        match self.regime(height) {
            FlowRegime::Full => WettedSection {
                regime: FlowRegime::Full,
                area: self.circle_area,
                perimeter: 2.0 * PI * self.pipe_radius,
                // half the pipe radius, independent of the head above the crown
                hydraulic_radius: self.pipe_radius / 2.0,
            },
            FlowRegime::PartiallyFull => {
                let theta = self.central_angle(height);
                let area = self.radius_squared * (theta - theta.sin()) / 2.0;
                let perimeter = self.pipe_radius * theta;
                WettedSection {
                    regime: FlowRegime::PartiallyFull,
                    area,
                    perimeter,
                    hydraulic_radius: area / perimeter,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_full_pipe() {
        let geometry = CircularGeometry::new(0.5);
        let section = geometry.section(0.5);
        assert_eq!(section.regime, FlowRegime::PartiallyFull);
        assert!((section.area - PI * 0.25 / 2.0).abs() < 1e-12);
        assert!((section.perimeter - PI * 0.5).abs() < 1e-12);
        assert!((section.hydraulic_radius - 0.25).abs() < 1e-12);
    }

    #[test]
    fn zero_height_has_undefined_hydraulic_radius() {
        let section = CircularGeometry::new(0.165).section(0.0);
        assert_eq!(section.area, 0.0);
        assert_eq!(section.perimeter, 0.0);
        assert!(section.hydraulic_radius.is_nan());
    }

    #[test]
    fn above_crown_is_full() {
        let geometry = CircularGeometry::new(0.2);
        assert_eq!(geometry.regime(0.4), FlowRegime::PartiallyFull);
        assert_eq!(geometry.regime(0.41), FlowRegime::Full);
        assert!((geometry.section(3.0).hydraulic_radius - 0.1).abs() < 1e-15);
    }
}
