// Domain layer: retry policy, readiness results and the ports the core drives.

pub mod model;
pub mod ports;
