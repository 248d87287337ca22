//! Device profile resolution
//!
//! Maps human-readable device names (e.g. "iPhone 16 Pro Max") to concrete
//! rendering profiles. The preset table is injectable so tests can supply
//! their own table instead of the built-in one.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const IOS_18_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 18_0 like Mac OS X) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.0 Mobile/15E148 Safari/604.1";

const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// A bundle of rendering parameters simulating a physical device.
///
/// Immutable once resolved; multiple device names may resolve to the same
/// profile value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub user_agent: String,
    pub device_scale_factor: f64,
    pub is_mobile: bool,
    pub has_touch: bool,
}

impl DeviceProfile {
    /// Synthetic profile approximating the base iPhone 16.
    pub fn iphone_16() -> Self {
        Self {
            viewport_width: 393,
            viewport_height: 852,
            user_agent: IOS_18_USER_AGENT.to_string(),
            device_scale_factor: 3.0,
            is_mobile: true,
            has_touch: true,
        }
    }

    /// Synthetic profile approximating the iPhone 16 Pro Max / Plus sizes.
    pub fn iphone_16_pro_max() -> Self {
        Self {
            viewport_width: 430,
            viewport_height: 932,
            user_agent: IOS_18_USER_AGENT.to_string(),
            device_scale_factor: 3.0,
            is_mobile: true,
            has_touch: true,
        }
    }

    /// Orchestrator-level default used only when the preset lookup misses
    /// for the exact name "Desktop Chrome".
    pub fn desktop_chrome_default() -> Self {
        Self {
            viewport_width: 1280,
            viewport_height: 720,
            user_agent: DESKTOP_USER_AGENT.to_string(),
            device_scale_factor: 1.0,
            is_mobile: false,
            has_touch: false,
        }
    }
}

fn iphone(width: u32, height: u32, ios_version: &str) -> DeviceProfile {
    DeviceProfile {
        viewport_width: width,
        viewport_height: height,
        user_agent: format!(
            "Mozilla/5.0 (iPhone; CPU iPhone OS {ios_version} like Mac OS X) \
             AppleWebKit/605.1.15 (KHTML, like Gecko) Version/{} Mobile/15E148 Safari/604.1",
            ios_version.replace('_', ".")
        ),
        device_scale_factor: 3.0,
        is_mobile: true,
        has_touch: true,
    }
}

fn builtin_presets() -> HashMap<String, DeviceProfile> {
    let mut presets = HashMap::new();
    presets.insert(
        "Desktop Chrome".to_string(),
        DeviceProfile::desktop_chrome_default(),
    );
    presets.insert("iPhone 12".to_string(), iphone(390, 844, "14_4"));
    presets.insert("iPhone 12 Pro".to_string(), iphone(390, 844, "14_4"));
    presets.insert("iPhone 12 Pro Max".to_string(), iphone(428, 926, "14_4"));
    presets.insert("iPhone 13".to_string(), iphone(390, 844, "15_0"));
    presets.insert("iPhone 13 Pro".to_string(), iphone(390, 844, "15_0"));
    presets.insert("iPhone 13 Pro Max".to_string(), iphone(428, 926, "15_0"));
    presets.insert("iPhone 14".to_string(), iphone(390, 844, "16_6"));
    presets.insert("iPhone 14 Pro".to_string(), iphone(393, 852, "16_6"));
    presets.insert("iPhone 14 Pro Max".to_string(), iphone(430, 932, "16_6"));
    presets.insert("iPhone 15".to_string(), iphone(393, 852, "17_0"));
    presets.insert("iPhone 15 Pro".to_string(), iphone(393, 852, "17_0"));
    presets.insert("iPhone 15 Plus".to_string(), iphone(430, 932, "17_0"));
    presets.insert("iPhone 15 Pro Max".to_string(), iphone(430, 932, "17_0"));
    presets
}

/// The device list captured by default: one desktop profile plus the
/// iPhone 12 through 16 families. The iPhone 16 family is not in the preset
/// table and resolves through the substring fallback.
pub fn default_target_devices() -> Vec<String> {
    [
        "Desktop Chrome",
        "iPhone 12",
        "iPhone 12 Pro",
        "iPhone 12 Pro Max",
        "iPhone 13",
        "iPhone 13 Pro",
        "iPhone 13 Pro Max",
        "iPhone 14",
        "iPhone 14 Pro",
        "iPhone 14 Pro Max",
        "iPhone 15",
        "iPhone 15 Pro",
        "iPhone 15 Pro Max",
        "iPhone 16",
        "iPhone 16 Pro",
        "iPhone 16 Pro Max",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Resolves device names against a preset table, with a lossy substring
/// fallback for iPhone 15/16 name variants that third-party preset tables do
/// not carry yet. The fallback deliberately collapses many distinct device
/// names onto two synthetic profiles.
pub struct DeviceRegistry {
    presets: HashMap<String, DeviceProfile>,
}

impl DeviceRegistry {
    pub fn builtin() -> Self {
        Self {
            presets: builtin_presets(),
        }
    }

    pub fn with_presets(presets: HashMap<String, DeviceProfile>) -> Self {
        Self { presets }
    }

    /// `None` means "device not recognized" and is not an error; callers
    /// decide whether to skip or substitute a default.
    pub fn resolve(&self, device_name: &str) -> Option<DeviceProfile> {
        if let Some(preset) = self.presets.get(device_name) {
            return Some(preset.clone());
        }

        if device_name.contains("iPhone 15") || device_name.contains("iPhone 16") {
            if device_name.contains("Pro Max") || device_name.contains("Plus") {
                return Some(DeviceProfile::iphone_16_pro_max());
            }
            return Some(DeviceProfile::iphone_16());
        }

        None
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_returned_verbatim() {
        let registry = DeviceRegistry::builtin();
        let presets = builtin_presets();

        for (name, expected) in &presets {
            assert_eq!(registry.resolve(name).as_ref(), Some(expected));
        }
    }

    #[test]
    fn test_iphone_16_fallback() {
        let registry = DeviceRegistry::builtin();

        assert_eq!(
            registry.resolve("iPhone 16"),
            Some(DeviceProfile::iphone_16())
        );
        assert_eq!(
            registry.resolve("iPhone 16 Pro"),
            Some(DeviceProfile::iphone_16())
        );
        assert_eq!(
            registry.resolve("iPhone 16 Pro Max"),
            Some(DeviceProfile::iphone_16_pro_max())
        );
        assert_eq!(
            registry.resolve("iPhone 16 Plus"),
            Some(DeviceProfile::iphone_16_pro_max())
        );
    }

    #[test]
    fn test_iphone_15_variant_fallback() {
        let registry = DeviceRegistry::builtin();

        // Not in the preset table, so the substring rule applies.
        assert_eq!(
            registry.resolve("iPhone 15 Plus Custom"),
            Some(DeviceProfile::iphone_16_pro_max())
        );
        assert_eq!(
            registry.resolve("iPhone 15 Custom"),
            Some(DeviceProfile::iphone_16())
        );
    }

    #[test]
    fn test_unknown_device_is_none() {
        let registry = DeviceRegistry::builtin();

        assert_eq!(registry.resolve("NonExistentDevice"), None);
        assert_eq!(registry.resolve("Pixel 9"), None);
        // The substring rule does not apply to desktop names.
        assert_eq!(registry.resolve("Desktop Firefox"), None);
    }

    #[test]
    fn test_injected_preset_table() {
        let mut presets = HashMap::new();
        let profile = DeviceProfile {
            viewport_width: 800,
            viewport_height: 600,
            user_agent: "TestAgent/1.0".to_string(),
            device_scale_factor: 2.0,
            is_mobile: false,
            has_touch: true,
        };
        presets.insert("TestDevice".to_string(), profile.clone());
        let registry = DeviceRegistry::with_presets(presets);

        assert_eq!(registry.resolve("TestDevice"), Some(profile));
        // The injected table replaces the built-in one entirely.
        assert_eq!(registry.resolve("iPhone 12"), None);
        // The substring fallback still applies on a miss.
        assert_eq!(
            registry.resolve("iPhone 16"),
            Some(DeviceProfile::iphone_16())
        );
    }

    #[test]
    fn test_default_target_devices() {
        let devices = default_target_devices();
        assert_eq!(devices.len(), 16);
        assert_eq!(devices[0], "Desktop Chrome");

        let registry = DeviceRegistry::builtin();
        for name in &devices {
            assert!(registry.resolve(name).is_some(), "unresolved: {name}");
        }
    }
}
