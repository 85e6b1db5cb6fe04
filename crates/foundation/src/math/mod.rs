pub mod quat;
pub mod rigid;
pub mod vec;

pub use quat::Quat;
pub use rigid::RigidTransform;
pub use vec::Vec3;
