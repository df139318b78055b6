pub mod countries;
pub mod disputed;

pub use countries::*;
pub use disputed::*;
