pub mod camera;
pub mod frame;

pub use camera::Camera;
pub use frame::Frame;
