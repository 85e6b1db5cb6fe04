use foundation::math::{Quat, Vec3};
use formats::PointCloud;
use scene::FrustumRegistry;

/// Fixed orientation for all map content: half a turn about X, mapping the
/// reconstruction's Y-down convention into the viewer's Y-up world. Applied
/// here, once, so individual entities never carry it.
pub const MAP_ORIENTATION: Quat = Quat {
    w: 0.0,
    x: 1.0,
    y: 0.0,
    z: 0.0,
};

/// Point color used when the cloud carries no per-vertex colors.
const UNCOLORED_POINT: [f32; 3] = [0.78, 0.78, 0.78];

#[derive(Debug, Default, Clone, PartialEq)]
pub struct PointBatch {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
}

/// Flattened line list: consecutive vertex pairs form segments.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LineBatch {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RenderFrame {
    pub points: PointBatch,
    pub lines: LineBatch,
}

/// Gather everything drawable into flat vertex batches.
///
/// Hidden frustums are skipped; each visible frustum contributes 16 line-list
/// vertices carrying its own color.
pub fn collect_render_frame(
    cloud: Option<&PointCloud>,
    registry: &FrustumRegistry,
) -> RenderFrame {
    let mut frame = RenderFrame::default();

    if let Some(cloud) = cloud {
        frame.points.positions.reserve(cloud.len());
        frame.points.colors.reserve(cloud.len());
        for (i, p) in cloud.positions.iter().enumerate() {
            frame
                .points
                .positions
                .push(orient([p[0] as f64, p[1] as f64, p[2] as f64]));
            let color = match &cloud.colors {
                Some(colors) => {
                    let c = colors[i];
                    [
                        c[0] as f32 / 255.0,
                        c[1] as f32 / 255.0,
                        c[2] as f32 / 255.0,
                    ]
                }
                None => UNCOLORED_POINT,
            };
            frame.points.colors.push(color);
        }
    }

    for (_, frustum) in registry.iter() {
        if !frustum.visible {
            continue;
        }
        let color = frustum.color.to_array();
        for vertex in frustum.geometry.edge_vertices() {
            frame
                .lines
                .positions
                .push(orient([vertex.x, vertex.y, vertex.z]));
            frame.lines.colors.push(color);
        }
    }

    frame
}

fn orient(p: [f64; 3]) -> [f32; 3] {
    MAP_ORIENTATION
        .rotate(Vec3::new(p[0], p[1], p[2]))
        .to_f32_array()
}
