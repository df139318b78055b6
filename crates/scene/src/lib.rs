pub mod camera;
pub mod projection;
pub mod selection;

pub use camera::*;
pub use projection::*;
pub use selection::*;
