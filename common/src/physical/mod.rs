mod constants;
mod temperature;

pub use constants::*;
pub use temperature::*;
