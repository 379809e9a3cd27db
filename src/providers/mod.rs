//! Concrete byte sources: TCP, UDP and recorded-log replay

mod replay;
mod socket;
mod tcp;
mod udp;

pub use replay::{ReplayConnector, ReplayProvider, ReplaySource};
pub use socket::SocketConnector;
pub use tcp::TcpProvider;
pub use udp::UdpProvider;
