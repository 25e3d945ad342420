pub mod model;
pub mod num;
pub mod ports;
pub mod serialization;
