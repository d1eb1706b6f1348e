// Domain layer: record shapes and the ports the pipeline consumes.

pub mod model;
pub mod ports;
