pub mod geojson;
pub mod map_data;
pub mod model;

pub use geojson::*;
pub use map_data::*;
pub use model::*;
