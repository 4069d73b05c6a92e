pub mod factory;
pub mod in_app;
pub mod simulated;

pub use factory::TransportFactory;
pub use in_app::InAppTransport;
pub use simulated::SimulatedTransport;
