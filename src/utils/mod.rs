pub mod cache;
pub mod errors;
pub mod invert;

pub use cache::{Clock, SystemClock, TtlCache};
pub use errors::RefreshError;
pub use invert::invert_colors;
