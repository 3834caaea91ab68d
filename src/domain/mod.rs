// Domain layer: core models, ports (interfaces) and the pure services behind each stage.

pub mod model;
pub mod ports;

pub mod services;
