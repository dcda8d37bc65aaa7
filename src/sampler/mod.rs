pub mod color;
pub mod gate;
pub mod region;

pub use color::SampledColor;
pub use gate::UpdateGate;
pub use region::{sample_region, SampleError};
