// Domain layer: deal model and ports. No IO here.

pub mod model;
pub mod ports;
