pub mod capture;
pub mod models;
pub mod util;

pub use capture::*;
pub use models::*;
pub use util::*;
