use crate::text::BoundedText;
use serde::{Deserialize, Serialize};

/// Field capacities of the ECP records, in bytes of usable text.
///
/// These match the buffer sizes of the reference C API so records stay
/// interchangeable with it.
pub mod capacity {
    pub const DEVICE_NAME: usize = 120;
    pub const DEVICE_LOCATION: usize = 60;
    pub const DEVICE_URL: usize = 29;
    pub const DEVICE_MODEL: usize = 31;
    pub const DEVICE_SERIAL: usize = 13;
    pub const RESOLUTION: usize = 7;
    pub const MAC_ADDRESS: usize = 17;
    pub const SOFTWARE_VERSION: usize = 9;

    pub const CHANNEL_ID: usize = 7;
    pub const CHANNEL_NAME: usize = 7;
    pub const CHANNEL_TYPE: usize = 13;
    pub const CHANNEL_NETWORK: usize = 30;

    pub const PROGRAM_TITLE: usize = 111;
    pub const PROGRAM_DESCRIPTION: usize = 255;
    pub const PROGRAM_RATING: usize = 14;

    pub const APP_ID: usize = 13;
    pub const APP_NAME: usize = 30;
    pub const APP_TYPE: usize = 4;
    pub const APP_VERSION: usize = 21;

    pub const TMS_ID: usize = 14;
}

use capacity::*;

/// Identity and capability snapshot of a Roku device, as reported by
/// `/query/device-info`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RokuDevice {
    /// ECP base URL (like "http://192.168.1.162:8060/")
    pub url: BoundedText<DEVICE_URL>,
    /// User-assigned name
    pub name: BoundedText<DEVICE_NAME>,
    /// User-assigned location (like "Bedroom")
    pub location: BoundedText<DEVICE_LOCATION>,
    pub model: BoundedText<DEVICE_MODEL>,
    pub serial: BoundedText<DEVICE_SERIAL>,
    /// UI resolution (like "1080p")
    pub resolution: BoundedText<RESOLUTION>,
    pub mac_address: BoundedText<MAC_ADDRESS>,
    pub software_version: BoundedText<SOFTWARE_VERSION>,
    pub is_tv: bool,
    pub is_on: bool,
    /// Remote control is set to "limited": only device-info and basic queries are allowed
    pub is_limited: bool,
    pub developer_mode: bool,
    pub has_search_support: bool,
    /// Supports Private Listening
    pub has_headphone_support: bool,
    /// Currently in Private Listening mode
    pub headphones_connected: bool,
}

impl RokuDevice {
    /// A device record that only knows its base URL.
    ///
    /// Every capability flag is false, so TV-only and search operations are
    /// rejected until the record is refreshed from the device.
    pub fn with_url(url: &str) -> Self {
        Self {
            url: BoundedText::new(url),
            ..Default::default()
        }
    }

    /// Join an ECP path onto the base URL without doubling the slash
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// A TV tuner channel
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TvChannel {
    /// Usually the channel number (like "3.1")
    pub id: BoundedText<CHANNEL_ID>,
    pub name: BoundedText<CHANNEL_NAME>,
    /// Like "air-digital"
    pub channel_type: BoundedText<CHANNEL_TYPE>,
    pub network: BoundedText<CHANNEL_NETWORK>,
    pub is_hidden: bool,
    pub is_favorite: bool,
    /// Physical RF channel (2-69), 0 when unknown
    pub physical_channel: u16,
    /// Frequency in Hz, 0 when unknown
    pub frequency: u64,
}

/// The program currently airing on an active channel
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TvProgram {
    pub title: BoundedText<PROGRAM_TITLE>,
    pub description: BoundedText<PROGRAM_DESCRIPTION>,
    /// Like "TV-14"
    pub rating: BoundedText<PROGRAM_RATING>,
    pub has_cc: bool,
}

/// Channel details only available for the current or last active channel
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtendedTvChannel {
    pub channel: TvChannel,
    /// When false, nothing but `channel` is populated
    pub is_active: bool,
    pub program: TvProgram,
    pub signal_received: bool,
    /// Like "1080i"
    pub resolution: BoundedText<RESOLUTION>,
    /// 0-100
    pub signal_quality: u16,
    /// In dB
    pub signal_strength: i16,
}

impl ExtendedTvChannel {
    /// Reset everything that only makes sense while the channel is playing
    pub fn clear_active_fields(&mut self) {
        self.is_active = false;
        self.program = TvProgram::default();
        self.signal_received = false;
        self.resolution.clear();
        self.signal_quality = 0;
        self.signal_strength = 0;
    }
}

/// An installed app (a "channel" in Roku's own terminology)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RokuApp {
    pub id: BoundedText<APP_ID>,
    pub name: BoundedText<APP_NAME>,
    /// Usually "appl"
    pub app_type: BoundedText<APP_TYPE>,
    pub version: BoundedText<APP_VERSION>,
}

impl RokuApp {
    /// App record for a known id, used to request an icon or launch
    pub fn with_id(id: &str) -> Self {
        Self {
            id: BoundedText::new(id),
            ..Default::default()
        }
    }
}

/// App icon bytes as returned by `/query/icon/{id}`.
///
/// The buffer is owned by the caller and holds whatever the device sent,
/// even for a non-success status (it may be empty).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AppIcon {
    /// HTTP status the icon arrived with
    pub status: u16,
    pub content_type: Option<String>,
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl AppIcon {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Take ownership of the icon bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let device = RokuDevice::with_url("http://192.168.1.162:8060/");
        assert_eq!(
            device.endpoint("/query/device-info"),
            "http://192.168.1.162:8060/query/device-info"
        );

        let device = RokuDevice::with_url("http://10.0.0.2:8060");
        assert_eq!(device.endpoint("keypress/Home"), "http://10.0.0.2:8060/keypress/Home");
    }

    #[test]
    fn test_url_is_bounded() {
        let device = RokuDevice::with_url("http://roku-living-room.example.internal:8060/");
        assert_eq!(device.url.len(), capacity::DEVICE_URL);
        assert!(!device.is_tv);
        assert!(!device.is_limited);
    }

    #[test]
    fn test_clear_active_fields() {
        let mut channel = ExtendedTvChannel {
            is_active: true,
            signal_received: true,
            signal_quality: 88,
            signal_strength: -47,
            resolution: BoundedText::new("1080i"),
            program: TvProgram {
                title: BoundedText::new("News"),
                description: BoundedText::new("Evening news"),
                rating: BoundedText::new("TV-G"),
                has_cc: true,
            },
            ..Default::default()
        };
        channel.channel.id.set("3.1");

        channel.clear_active_fields();

        assert!(!channel.is_active);
        assert_eq!(channel.program, TvProgram::default());
        assert!(channel.resolution.is_empty());
        assert_eq!(channel.signal_quality, 0);
        assert_eq!(channel.signal_strength, 0);
        assert!(!channel.signal_received);
        assert_eq!(channel.channel.id, "3.1");
    }

    #[test]
    fn test_icon_status() {
        let icon = AppIcon {
            status: 404,
            content_type: None,
            data: Vec::new(),
        };
        assert!(!icon.is_success());
        assert!(icon.is_empty());
    }
}
