use foundation::color::Color;
use foundation::math::{RigidTransform, Vec3};

use crate::intrinsics::PinholeIntrinsics;

/// Wireframe edges as index pairs into [`FrustumGeometry::vertices`]:
/// four spokes from the apex, then the base rectangle.
pub const FRUSTUM_EDGES: [[usize; 2]; 8] = [
    [0, 1],
    [0, 2],
    [0, 3],
    [0, 4],
    [1, 2],
    [2, 3],
    [3, 4],
    [4, 1],
];

/// The five world-space vertices of a camera frustum: the optical center
/// (apex, index 0) and the four image corners at scaled unit depth.
#[derive(Debug, Clone, PartialEq)]
pub struct FrustumGeometry {
    pub vertices: [Vec3; 5],
}

impl FrustumGeometry {
    /// Build the wireframe for one camera.
    ///
    /// `cam_to_world` is the inverted pose; `scale` sets the apex-to-plane
    /// distance in scene units.
    pub fn from_pose(
        intrinsics: &PinholeIntrinsics,
        cam_to_world: &RigidTransform,
        scale: f64,
    ) -> Self {
        let rays = intrinsics.corner_rays();
        let vertices = [
            cam_to_world.apply(Vec3::ZERO),
            cam_to_world.apply(rays[0] * scale),
            cam_to_world.apply(rays[1] * scale),
            cam_to_world.apply(rays[2] * scale),
            cam_to_world.apply(rays[3] * scale),
        ];
        Self { vertices }
    }

    pub fn apex(&self) -> Vec3 {
        self.vertices[0]
    }

    /// Edge endpoints in draw order, 16 vertices for 8 line segments.
    pub fn edge_vertices(&self) -> impl Iterator<Item = Vec3> + '_ {
        FRUSTUM_EDGES
            .iter()
            .flat_map(move |[a, b]| [self.vertices[*a], self.vertices[*b]])
    }
}

/// One renderable frustum: fixed geometry, mutable color and visibility.
///
/// Built once at startup; search and hover only mutate `color`/`visible`.
/// Each frustum owns its color so changing one never affects another.
#[derive(Debug, Clone, PartialEq)]
pub struct Frustum {
    pub geometry: FrustumGeometry,
    pub color: Color,
    pub visible: bool,
}

impl Frustum {
    pub fn new(geometry: FrustumGeometry, color: Color) -> Self {
        Self {
            geometry,
            color,
            visible: true,
        }
    }
}
