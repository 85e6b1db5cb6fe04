pub mod frustum;
pub mod highlight;
pub mod intrinsics;
pub mod registry;

pub use frustum::{FRUSTUM_EDGES, Frustum, FrustumGeometry};
pub use highlight::{HighlightPalette, HoverState, SCORE_EPSILON};
pub use intrinsics::PinholeIntrinsics;
pub use registry::FrustumRegistry;
