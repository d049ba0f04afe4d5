//! Core types shared by the grid and the builders

pub mod region;
pub mod vec3;

pub use region::Region;
pub use vec3::Vec3;
