use foundation::ids::FrameId;
use foundation::math::{Quat, RigidTransform, Vec3};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::search::frame_id_from_json;

/// One `/frame_poses` record: world-to-camera extrinsics for a frame.
///
/// The quaternion is scalar-first `[w, x, y, z]`. Records are consumed once
/// during frustum construction and not retained.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FramePoseRecord {
    #[serde(deserialize_with = "deserialize_frame_id")]
    pub image_id: FrameId,
    pub qvec_world_to_cam: [f64; 4],
    pub tvec_world_to_cam: [f64; 3],
}

impl FramePoseRecord {
    /// The record's world-to-camera transform, with the wire quaternion
    /// normalized so inversion stays a conjugate.
    pub fn world_to_cam(&self) -> RigidTransform {
        RigidTransform::new(
            Quat::from_wxyz(self.qvec_world_to_cam).normalized(),
            Vec3::new(
                self.tvec_world_to_cam[0],
                self.tvec_world_to_cam[1],
                self.tvec_world_to_cam[2],
            ),
        )
    }
}

fn deserialize_frame_id<'de, D>(deserializer: D) -> Result<FrameId, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    frame_id_from_json(&value)
        .ok_or_else(|| serde::de::Error::custom("image_id must be a string or integer"))
}

/// Result of parsing a `/frame_poses` body: the usable records plus a count
/// of records that were skipped as malformed (missing identifier, bad pose
/// fields). A bad record never aborts the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseLoad {
    pub records: Vec<FramePoseRecord>,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PoseFileError {
    Json(String),
    NotAnArray,
}

impl std::fmt::Display for PoseFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoseFileError::Json(msg) => write!(f, "invalid JSON: {msg}"),
            PoseFileError::NotAnArray => write!(f, "pose payload is not an array"),
        }
    }
}

impl std::error::Error for PoseFileError {}

pub fn parse_frame_poses(body: &str) -> Result<PoseLoad, PoseFileError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| PoseFileError::Json(e.to_string()))?;
    let entries = value.as_array().ok_or(PoseFileError::NotAnArray)?;

    let mut records = Vec::with_capacity(entries.len());
    let mut skipped = 0usize;
    for entry in entries {
        match serde_json::from_value::<FramePoseRecord>(entry.clone()) {
            Ok(record) => records.push(record),
            Err(_) => skipped += 1,
        }
    }
    Ok(PoseLoad { records, skipped })
}
