pub mod availability;
pub mod calendar;
pub mod lifecycle;
pub mod locks;
pub mod notifications;
pub mod scheduling;

pub use availability::*;
pub use calendar::*;
pub use lifecycle::*;
pub use locks::*;
pub use notifications::*;
pub use scheduling::*;
