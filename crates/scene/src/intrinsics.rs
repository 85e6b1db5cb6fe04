use foundation::math::Vec3;

/// Default visual size of a frustum: distance from the optical center to the
/// image plane in scene units.
pub const DEFAULT_FRUSTUM_SCALE: f64 = 0.35;

/// Pinhole camera intrinsics used to shape frustum wireframes.
///
/// The pose endpoint carries extrinsics only, so a fixed set of intrinsics is
/// shared by every camera.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PinholeIntrinsics {
    pub focal: f64,
    pub cx: f64,
    pub cy: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for PinholeIntrinsics {
    fn default() -> Self {
        Self {
            focal: 500.0,
            cx: 320.0,
            cy: 240.0,
            width: 640.0,
            height: 480.0,
        }
    }
}

impl PinholeIntrinsics {
    /// Rays through the four image corners at unit depth, in camera space.
    ///
    /// Ordered around the image rectangle (top-left, top-right, bottom-right,
    /// bottom-left) so consecutive entries are base-rectangle neighbors.
    pub fn corner_rays(&self) -> [Vec3; 4] {
        let corners = [
            (0.0, 0.0),
            (self.width, 0.0),
            (self.width, self.height),
            (0.0, self.height),
        ];
        corners.map(|(u, v)| Vec3::new((u - self.cx) / self.focal, (v - self.cy) / self.focal, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::PinholeIntrinsics;

    #[test]
    fn corner_rays_sit_on_the_unit_depth_plane() {
        for ray in PinholeIntrinsics::default().corner_rays() {
            assert_eq!(ray.z, 1.0);
        }
    }

    #[test]
    fn centered_principal_point_gives_symmetric_corners() {
        let rays = PinholeIntrinsics::default().corner_rays();
        // top-left mirrors bottom-right, top-right mirrors bottom-left
        assert!((rays[0].x + rays[2].x).abs() < 1e-12);
        assert!((rays[0].y + rays[2].y).abs() < 1e-12);
        assert!((rays[1].x + rays[3].x).abs() < 1e-12);
        assert!((rays[1].y + rays[3].y).abs() < 1e-12);
    }

    #[test]
    fn wider_image_spreads_rays_horizontally() {
        let narrow = PinholeIntrinsics {
            width: 320.0,
            cx: 160.0,
            ..Default::default()
        };
        let wide = PinholeIntrinsics::default();
        assert!(wide.corner_rays()[1].x > narrow.corner_rays()[1].x);
    }
}
