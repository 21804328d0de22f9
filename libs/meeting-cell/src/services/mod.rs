pub mod codes;
pub mod rooms;

pub use codes::*;
pub use rooms::*;
