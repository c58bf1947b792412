//! Device module - the foot pedal's removable drive and serial log

pub mod drive;
pub mod serial;

pub use drive::{CircuitPyDrive, DeviceTransport};
pub use serial::SerialReader;
