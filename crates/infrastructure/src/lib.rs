pub mod memory;
pub mod transport;

pub use memory::*;
pub use transport::*;
