use serde::{Deserialize, Serialize};

/// A character with the hit points read from its sheet.
///
/// HP values are kept as text: sheets can show dashes, negative values or
/// temporary-HP annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub current_hp: String,
    pub max_hp: String,
}

/// Device the browser pretends to be.
///
/// The character sheet only renders the compact HP summary under a phone
/// layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceProfile {
    pub user_agent: &'static str,
    pub width: u32,
    pub height: u32,
    pub device_scale_factor: f64,
    pub mobile: bool,
    pub touch: bool,
}

pub const IPHONE_7_LANDSCAPE: DeviceProfile = DeviceProfile {
    user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 11_0 like Mac OS X) AppleWebKit/604.1.38 (KHTML, like Gecko) Version/11.0 Mobile/15A372 Safari/604.1",
    width: 667,
    height: 375,
    device_scale_factor: 2.0,
    mobile: true,
    touch: true,
};

/// CSS selectors for the two HP nodes on the mobile character sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HpSelectors {
    pub current: String,
    pub max: String,
}

impl Default for HpSelectors {
    fn default() -> Self {
        Self {
            current: ".ct-status-summary-mobile__hp-current".to_string(),
            max: ".ct-status-summary-mobile__hp-max".to_string(),
        }
    }
}
