pub mod indicators;
pub mod options;
pub mod price;

pub use indicators::*;
pub use options::*;
pub use price::*;
