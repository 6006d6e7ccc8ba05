pub mod angle;
pub mod platform;

pub use angle::Angle;
pub use platform::Platform;
