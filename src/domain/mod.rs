// Domain layer: wire models and ports. No transport or Azure specifics here.

pub mod model;
pub mod ports;
