//! Request and response bodies for the platform REST API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::profile::DeviceProfile;

/// Join EUI sent for ABP devices, which never join.
pub const ABP_JOIN_EUI: &str = "0000000000000000";

/// Body of every create call that returns a resource id.
#[derive(Debug, Clone, Deserialize)]
pub struct IdResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub can_have_gateways: bool,
    pub description: String,
    pub max_device_count: u32,
    pub max_gateway_count: u32,
    pub name: String,
    pub private_gateways_down: bool,
    pub private_gateways_up: bool,
    pub tags: BTreeMap<String, String>,
}

impl Tenant {
    /// A tenant with gateway support and room for 10000 devices/gateways.
    pub fn named(name: &str) -> Self {
        Self {
            can_have_gateways: true,
            description: name.to_string(),
            max_device_count: 10_000,
            max_gateway_count: 10_000,
            name: name.to_string(),
            private_gateways_down: true,
            private_gateways_up: true,
            tags: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTenantRequest {
    pub tenant: Tenant,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub tenant_id: String,
    pub name: String,
    pub description: String,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateApplicationRequest {
    pub application: Application,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeviceProfileRequest {
    pub device_profile: DeviceProfile,
}

/// A device as registered under an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub application_id: String,
    pub description: String,
    pub dev_eui: String,
    pub device_profile_id: String,
    pub is_disabled: bool,
    pub join_eui: String,
    pub name: String,
    pub skip_fcnt_check: bool,
    pub tags: BTreeMap<String, String>,
    pub variables: BTreeMap<String, String>,
}

impl DeviceInfo {
    /// An enabled ABP device with frame-counter checks skipped.
    pub fn abp(
        application_id: &str,
        device_profile_id: &str,
        dev_eui: &str,
        name: &str,
        description: &str,
    ) -> Self {
        Self {
            application_id: application_id.to_string(),
            description: description.to_string(),
            dev_eui: dev_eui.to_string(),
            device_profile_id: device_profile_id.to_string(),
            is_disabled: false,
            join_eui: ABP_JOIN_EUI.to_string(),
            name: name.to_string(),
            skip_fcnt_check: true,
            tags: BTreeMap::new(),
            variables: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateDeviceRequest<'a> {
    pub device: &'a DeviceInfo,
}

/// ABP session keys and frame counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceActivation {
    pub a_f_cnt_down: u32,
    pub app_s_key: String,
    pub dev_addr: String,
    pub f_cnt_up: u32,
    pub f_nwk_s_int_key: String,
    pub n_f_cnt_down: u32,
    pub nwk_s_enc_key: String,
    pub s_nwk_s_int_key: String,
}

impl DeviceActivation {
    /// Activation from allow-listed credentials with all counters at zero.
    ///
    /// LoRaWAN 1.0.x has a single network session key, so it fills all
    /// three network key roles.
    pub fn from_keys(nwk_key: &str, app_key: &str, addr_key: &str) -> Self {
        Self {
            a_f_cnt_down: 0,
            app_s_key: app_key.to_string(),
            dev_addr: addr_key.to_string(),
            f_cnt_up: 0,
            f_nwk_s_int_key: nwk_key.to_string(),
            n_f_cnt_down: 0,
            nwk_s_enc_key: nwk_key.to_string(),
            s_nwk_s_int_key: nwk_key.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateDeviceRequest<'a> {
    pub device_activation: &'a DeviceActivation,
}
