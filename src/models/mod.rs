pub mod doctor;
pub mod filters;

pub use doctor::*;
pub use filters::*;
