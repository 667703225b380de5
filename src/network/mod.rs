pub mod address;
pub mod port;

pub use address::{in_range, parse_ip, AddressError, IpSpec};
pub use port::{parse_port, PortError, PortSet};
