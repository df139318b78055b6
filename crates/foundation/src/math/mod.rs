pub mod ginzburg;
pub mod vec;

pub use ginzburg::*;
pub use vec::*;
