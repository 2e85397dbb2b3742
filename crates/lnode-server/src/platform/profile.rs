//! The `RAK_ABP` device profile every tenant is provisioned with.
//!
//! AS923-2 region, LoRaWAN 1.0.3, class C, ABP only, with a JavaScript
//! uplink decoder for the lamp/GPS/clock/status frame types.

use std::collections::BTreeMap;

use serde::Serialize;

pub const PROFILE_NAME: &str = "RAK_ABP";
pub const REGION: &str = "AS923_2";
pub const REGION_CONFIG_ID: &str = "as923_2";
pub const MAC_VERSION: &str = "LORAWAN_1_0_3";

/// RX2 frequency in Hz for AS923-2.
pub const ABP_RX2_FREQ: u32 = 921_400_000;

/// Uplink decoder installed on the profile.
pub const CODEC_SCRIPT: &str = include_str!("codec.js");

/// Measurement keys emitted by [`CODEC_SCRIPT`].
pub const MEASUREMENT_KEYS: [&str; 14] = [
    "Dimming",
    "Energy",
    "PF",
    "Power",
    "Status_lamp",
    "Tilt",
    "alt",
    "current",
    "header_device",
    "lat",
    "lng",
    "status_code",
    "timestamp",
    "voltage",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Measurement {
    pub name: String,
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct DeviceProfile {
    pub tenant_id: String,
    pub name: String,
    pub description: String,
    pub region: String,
    pub mac_version: String,
    pub reg_params_revision: String,
    pub adr_algorithm_id: String,
    pub payload_codec_runtime: String,
    pub payload_codec_script: String,
    pub flush_queue_on_activate: bool,
    pub uplink_interval: u32,
    pub device_status_req_interval: u32,
    pub supports_otaa: bool,
    pub supports_class_b: bool,
    pub supports_class_c: bool,
    pub class_b_timeout: u32,
    pub class_b_ping_slot_nb_k: u32,
    pub class_b_ping_slot_dr: u32,
    pub class_b_ping_slot_freq: u32,
    pub class_c_timeout: u32,
    pub abp_rx1_delay: u32,
    pub abp_rx1_dr_offset: u32,
    pub abp_rx2_dr: u32,
    pub abp_rx2_freq: u32,
    pub tags: BTreeMap<String, String>,
    pub measurements: BTreeMap<String, Measurement>,
    pub auto_detect_measurements: bool,
    pub region_config_id: String,
    pub is_relay: bool,
    pub is_relay_ed: bool,
    pub relay_ed_relay_only: bool,
    pub relay_enabled: bool,
    pub relay_cad_periodicity: String,
    pub relay_default_channel_index: u32,
    pub relay_second_channel_freq: u32,
    pub relay_second_channel_dr: u32,
    pub relay_second_channel_ack_offset: String,
    pub relay_ed_activation_mode: String,
    pub relay_ed_smart_enable_level: u32,
    pub relay_ed_back_off: u32,
    pub relay_ed_uplink_limit_bucket_size: u32,
    pub relay_ed_uplink_limit_reload_rate: u32,
    pub relay_join_req_limit_reload_rate: u32,
    pub relay_notify_limit_reload_rate: u32,
    pub relay_global_uplink_limit_reload_rate: u32,
    pub relay_overall_limit_reload_rate: u32,
    pub relay_join_req_limit_bucket_size: u32,
    pub relay_notify_limit_bucket_size: u32,
    pub relay_global_uplink_limit_bucket_size: u32,
    pub relay_overall_limit_bucket_size: u32,
    pub allow_roaming: bool,
    pub rx1_delay: u32,
}

impl DeviceProfile {
    /// The `RAK_ABP` preset for a tenant. Relay and class B are off.
    pub fn rak_abp(tenant_id: &str) -> Self {
        let measurements = MEASUREMENT_KEYS
            .iter()
            .map(|key| {
                (
                    (*key).to_string(),
                    Measurement {
                        name: String::new(),
                        kind: "UNKNOWN".to_string(),
                    },
                )
            })
            .collect();

        Self {
            tenant_id: tenant_id.to_string(),
            name: PROFILE_NAME.to_string(),
            description: String::new(),
            region: REGION.to_string(),
            mac_version: MAC_VERSION.to_string(),
            reg_params_revision: "A".to_string(),
            adr_algorithm_id: "default".to_string(),
            payload_codec_runtime: "JS".to_string(),
            payload_codec_script: CODEC_SCRIPT.to_string(),
            flush_queue_on_activate: true,
            uplink_interval: 3600,
            device_status_req_interval: 1,
            supports_otaa: false,
            supports_class_b: false,
            supports_class_c: true,
            class_b_timeout: 0,
            class_b_ping_slot_nb_k: 0,
            class_b_ping_slot_dr: 0,
            class_b_ping_slot_freq: 0,
            class_c_timeout: 0,
            abp_rx1_delay: 1,
            abp_rx1_dr_offset: 0,
            abp_rx2_dr: 2,
            abp_rx2_freq: ABP_RX2_FREQ,
            tags: BTreeMap::new(),
            measurements,
            auto_detect_measurements: true,
            region_config_id: REGION_CONFIG_ID.to_string(),
            is_relay: false,
            is_relay_ed: false,
            relay_ed_relay_only: false,
            relay_enabled: false,
            relay_cad_periodicity: "SEC_1".to_string(),
            relay_default_channel_index: 0,
            relay_second_channel_freq: 0,
            relay_second_channel_dr: 0,
            relay_second_channel_ack_offset: "KHZ_0".to_string(),
            relay_ed_activation_mode: "DISABLE_RELAY_MODE".to_string(),
            relay_ed_smart_enable_level: 0,
            relay_ed_back_off: 0,
            relay_ed_uplink_limit_bucket_size: 0,
            relay_ed_uplink_limit_reload_rate: 0,
            relay_join_req_limit_reload_rate: 0,
            relay_notify_limit_reload_rate: 0,
            relay_global_uplink_limit_reload_rate: 0,
            relay_overall_limit_reload_rate: 0,
            relay_join_req_limit_bucket_size: 0,
            relay_notify_limit_bucket_size: 0,
            relay_global_uplink_limit_bucket_size: 0,
            relay_overall_limit_bucket_size: 0,
            allow_roaming: false,
            rx1_delay: 0,
        }
    }
}
