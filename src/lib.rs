pub mod addr;
pub mod config;
pub mod error;
pub mod handler;
pub mod neighbor;
pub mod reactor;
pub mod rib;
pub mod transport;
pub mod wire;
