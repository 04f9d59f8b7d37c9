// Domain layer: wire types, status records and the ports the core depends on.

pub mod base64;
pub mod model;
pub mod ports;
pub mod status;
pub mod tags;
pub mod transaction;
