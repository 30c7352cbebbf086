// Application layer: wires config, adapters and core for each binary.

pub mod notify;
pub mod sync;
