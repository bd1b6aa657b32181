use std::net::{IpAddr, Ipv4Addr};

use spinet_common::env_or;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: IpAddr,
    pub port: u16,
    pub device_id_max_len: usize,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env_or("HOST", defaults.host),
            port: env_or("PORT", defaults.port),
            device_id_max_len: env_or("DEVICE_ID_MAX_LEN", defaults.device_id_max_len),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        // Sensors in the field are flashed with port 5000.
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5000,
            device_id_max_len: 128,
        }
    }
}
