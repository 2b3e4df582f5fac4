pub mod activity;
pub mod constraints;
pub mod registry;
pub mod report;

pub use activity::*;
pub use constraints::*;
pub use report::*;
