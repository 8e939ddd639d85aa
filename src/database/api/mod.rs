pub use car::*;
pub use winner::*;

mod car;
mod winner;
