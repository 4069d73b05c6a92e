pub mod repository;
pub mod transport;

pub use repository::*;
pub use transport::*;
