mod base;
mod prod;
mod sum;

pub use base::*;
pub use prod::*;
pub use sum::*;
