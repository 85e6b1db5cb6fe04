pub mod ply;
pub mod poses;
pub mod search;

pub use ply::{PlyError, PointCloud, parse_ply};
pub use poses::{FramePoseRecord, PoseFileError, PoseLoad, parse_frame_poses};
pub use search::{SearchHit, SearchResponseError, parse_search_response};
