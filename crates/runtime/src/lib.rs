pub mod anim;
pub mod event_bus;

pub use anim::*;
pub use event_bus::*;
