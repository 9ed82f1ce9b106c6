use serde::{Deserialize, Serialize};

use crate::constants::IpProtocolType;
use crate::error::Result;

/// Connection parameters for a board. Unused fields stay at their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrainFlowInputParams {
    pub serial_port: String,
    pub mac_address: String,
    pub ip_address: String,
    pub ip_port: i32,
    pub ip_protocol: IpProtocolType,
    pub other_info: String,
    pub timeout: i32,
    pub serial_number: String,
    pub file: String,
}

impl BrainFlowInputParams {
    /// JSON form handed to every session call.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
