//! Device query layer: `/query/*` endpoints decoded into typed records.

use crate::client::{require_full_control, require_tv, EcpClient};
use crate::extract::{fill_from_xml, parse_signed, parse_unsigned, ExtractMode, FieldMap, Scratch};
use crate::xml::XmlElement;
use rokuecp_core::{
    capacity, AppIcon, BoundedText, ExtendedTvChannel, Method, Result, RokuApp, RokuDevice, RokuError,
    Transport, TransportError, TvChannel,
};

pub const DEVICE_INFO_PATH: &str = "query/device-info";
pub const TV_CHANNELS_PATH: &str = "query/tv-channels";
pub const TV_ACTIVE_CHANNEL_PATH: &str = "query/tv-active-channel";
pub const APPS_PATH: &str = "query/apps";
pub const ACTIVE_APP_PATH: &str = "query/active-app";
pub const ICON_PATH: &str = "query/icon";

/// `power-mode` value of a device that is switched on
const POWER_ON: &str = "PowerOn";
/// `ecp-setting-mode` value of a device in limited mode
const ECP_LIMITED: &str = "limited";
const TRUE: &str = "true";
/// `signal-state` value when the tuner has no signal
const NO_SIGNAL: &str = "none";

impl<T: Transport> EcpClient<T> {
    /// Fetch identity and capabilities of the device at `url`
    ///
    /// Endpoint: GET /query/device-info
    ///
    /// Base URLs longer than the device record can hold are rejected before
    /// any request is made.
    pub fn device_info(&self, url: &str) -> Result<RokuDevice> {
        if url.len() > capacity::DEVICE_URL {
            return Err(TransportError::new(format!(
                "base URL {} is longer than {} bytes",
                url,
                capacity::DEVICE_URL
            ))
            .into());
        }

        let mut device = RokuDevice::with_url(url);
        let root = self.get_document(&device.endpoint(DEVICE_INFO_PATH))?;
        if root.name != "device-info" {
            return Err(RokuError::EmptyDocument);
        }

        decode_device_info(&root, &mut device);
        tracing::debug!(
            "Device '{}' ({}) at {}: tv={} limited={}",
            device.name,
            device.model,
            device.url,
            device.is_tv,
            device.is_limited
        );
        Ok(device)
    }

    /// List up to `max` TV channels known to a Roku TV
    ///
    /// Endpoint: GET /query/tv-channels
    pub fn tv_channels(&self, device: &RokuDevice, max: usize) -> Result<Vec<TvChannel>> {
        require_tv(device)?;
        require_full_control(device)?;

        let root = self.get_document(&device.endpoint(TV_CHANNELS_PATH))?;
        let channels: Vec<TvChannel> = root.elements().take(max).map(decode_channel).collect();

        tracing::debug!("Found {} TV channel(s) on {}", channels.len(), device.url);
        Ok(channels)
    }

    /// Get the current (or last) active TV channel with program and signal details
    ///
    /// Endpoint: GET /query/tv-active-channel
    pub fn active_tv_channel(&self, device: &RokuDevice) -> Result<ExtendedTvChannel> {
        require_tv(device)?;
        require_full_control(device)?;

        let root = self.get_document(&device.endpoint(TV_ACTIVE_CHANNEL_PATH))?;
        let element = root.elements().next().ok_or(RokuError::EmptyDocument)?;
        Ok(decode_active_channel(element))
    }

    /// List up to `max` installed apps
    ///
    /// Endpoint: GET /query/apps
    pub fn apps(&self, device: &RokuDevice, max: usize) -> Result<Vec<RokuApp>> {
        require_full_control(device)?;

        let root = self.get_document(&device.endpoint(APPS_PATH))?;
        let apps: Vec<RokuApp> = root.elements().take(max).map(decode_app).collect();

        tracing::debug!("Found {} app(s) on {}", apps.len(), device.url);
        Ok(apps)
    }

    /// Get the app in the foreground (Home when nothing is running)
    ///
    /// Endpoint: GET /query/active-app
    pub fn active_app(&self, device: &RokuDevice) -> Result<RokuApp> {
        let root = self.get_document(&device.endpoint(ACTIVE_APP_PATH))?;
        let element = root.elements().next().ok_or(RokuError::EmptyDocument)?;
        Ok(decode_app(element))
    }

    /// Download an app's icon
    ///
    /// Endpoint: GET /query/icon/{appID}
    ///
    /// The bytes are returned for any status except 401/403 so callers can
    /// inspect what the device sent.
    pub fn app_icon(&self, device: &RokuDevice, app: &RokuApp) -> Result<AppIcon> {
        require_full_control(device)?;

        let url = device.endpoint(&format!("{}/{}", ICON_PATH, urlencoding::encode(&app.id)));
        let response = self.transport().send(Method::Get, &url)?;
        if matches!(response.status, 401 | 403) {
            return Err(RokuError::Unauthorized);
        }

        Ok(AppIcon {
            status: response.status,
            content_type: response.content_type,
            data: response.body,
        })
    }
}

/// Fill `device` from a `<device-info>` element
pub fn decode_device_info(root: &XmlElement, device: &mut RokuDevice) {
    let mut wifi_mac = Scratch::empty();
    let mut ethernet_mac = Scratch::empty();
    let mut power_mode = Scratch::empty();
    let mut is_tv = Scratch::empty();
    let mut ecp_mode = Scratch::empty();
    let mut developer = Scratch::empty();
    let mut search = Scratch::empty();
    let mut private_listening = Scratch::empty();
    let mut headphones = Scratch::empty();

    fill_from_xml(
        root,
        ExtractMode::Children,
        &mut [
            FieldMap::new("user-device-name", &mut device.name),
            FieldMap::new("user-device-location", &mut device.location),
            FieldMap::new("friendly-model-name", &mut device.model),
            FieldMap::new("serial-number", &mut device.serial),
            FieldMap::new("ui-resolution", &mut device.resolution),
            FieldMap::new("software-version", &mut device.software_version),
            FieldMap::new("wifi-mac", &mut wifi_mac),
            FieldMap::new("ethernet-mac", &mut ethernet_mac),
            FieldMap::new("power-mode", &mut power_mode),
            FieldMap::new("is-tv", &mut is_tv),
            FieldMap::new("ecp-setting-mode", &mut ecp_mode),
            FieldMap::new("developer-enabled", &mut developer),
            FieldMap::new("search-enabled", &mut search),
            FieldMap::new("supports-private-listening", &mut private_listening),
            FieldMap::new("headphones-connected", &mut headphones),
        ],
    );

    // Wired devices only report an ethernet MAC
    let mac = if wifi_mac.is_empty() { &ethernet_mac } else { &wifi_mac };
    device.mac_address.set(mac);

    device.is_on = power_mode == POWER_ON;
    device.is_tv = is_tv == TRUE;
    device.is_limited = ecp_mode == ECP_LIMITED;
    device.developer_mode = developer == TRUE;
    device.has_search_support = search == TRUE;
    device.has_headphone_support = private_listening == TRUE;
    device.headphones_connected = headphones == TRUE;
}

/// Decode a `<channel>` element
pub fn decode_channel(element: &XmlElement) -> TvChannel {
    let mut channel = TvChannel::default();
    let mut physical_channel = Scratch::empty();
    let mut frequency = Scratch::empty();
    let mut hidden = Scratch::empty();
    let mut favorite = Scratch::empty();

    fill_from_xml(
        element,
        ExtractMode::Children,
        &mut [
            FieldMap::new("channel-id", &mut channel.id),
            FieldMap::new("broadcast-network-label", &mut channel.network),
            FieldMap::new("name", &mut channel.name),
            FieldMap::new("type", &mut channel.channel_type),
            FieldMap::new("user-hidden", &mut hidden),
            FieldMap::new("user-favorite", &mut favorite),
            FieldMap::new("physical-channel", &mut physical_channel),
            FieldMap::new("physical-frequency", &mut frequency),
        ],
    );

    channel.is_hidden = hidden == TRUE;
    channel.is_favorite = favorite == TRUE;
    channel.physical_channel = u16::try_from(parse_unsigned(&physical_channel)).unwrap_or(0);
    // kHz on the wire
    channel.frequency = parse_unsigned(&frequency).saturating_mul(1000);
    channel
}

/// Decode the `<channel>` element of `/query/tv-active-channel`
pub fn decode_active_channel(element: &XmlElement) -> ExtendedTvChannel {
    let mut active = ExtendedTvChannel {
        channel: decode_channel(element),
        ..Default::default()
    };

    let mut active_input = Scratch::empty();
    fill_from_xml(
        element,
        ExtractMode::Children,
        &mut [FieldMap::new("active-input", &mut active_input)],
    );
    if active_input != TRUE {
        // Inactive channels carry stale program data; never let it through
        active.clear_active_fields();
        return active;
    }
    active.is_active = true;

    let mut has_cc = Scratch::empty();
    let mut signal_state = Scratch::empty();
    let mut signal_quality = Scratch::empty();
    let mut signal_strength = Scratch::empty();
    fill_from_xml(
        element,
        ExtractMode::Children,
        &mut [
            FieldMap::new("program-title", &mut active.program.title),
            FieldMap::new("program-description", &mut active.program.description),
            FieldMap::new("program-ratings", &mut active.program.rating),
            FieldMap::new("program-has-cc", &mut has_cc),
            FieldMap::new("signal-mode", &mut active.resolution),
            FieldMap::new("signal-state", &mut signal_state),
            FieldMap::new("signal-quality", &mut signal_quality),
            FieldMap::new("signal-strength", &mut signal_strength),
        ],
    );

    active.program.has_cc = has_cc == TRUE;
    active.signal_received = !signal_state.is_empty() && signal_state != NO_SIGNAL;
    active.signal_quality = u16::try_from(parse_unsigned(&signal_quality)).unwrap_or(0);
    active.signal_strength = i16::try_from(parse_signed(&signal_strength)).unwrap_or(0);
    active
}

/// Decode an `<app>` element: id, type and version are attributes, the name is the text
pub fn decode_app(element: &XmlElement) -> RokuApp {
    let mut app = RokuApp::default();
    fill_from_xml(
        element,
        ExtractMode::Attributes,
        &mut [
            FieldMap::new("id", &mut app.id),
            FieldMap::new("type", &mut app.app_type),
            FieldMap::new("version", &mut app.version),
        ],
    );
    app.name = BoundedText::new(&element.text_content());
    app
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;

    fn root(xml: &str) -> XmlElement {
        XmlDocument::parse_str(xml).unwrap().root.unwrap()
    }

    #[test]
    fn test_decode_device_info() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" ?>
<device-info>
    <udn>015e5108-9000-1046-8035-b0a737964dfb</udn>
    <serial-number>1GU48T017973</serial-number>
    <friendly-model-name>Roku Ultra</friendly-model-name>
    <wifi-mac>b0:a7:37:96:4d:fb</wifi-mac>
    <ethernet-mac>b0:a7:37:96:4d:fa</ethernet-mac>
    <user-device-name>Living Room Roku</user-device-name>
    <user-device-location>Living Room</user-device-location>
    <software-version>11.5.0</software-version>
    <ui-resolution>1080p</ui-resolution>
    <is-tv>false</is-tv>
    <search-enabled>true</search-enabled>
    <supports-private-listening>true</supports-private-listening>
    <headphones-connected>false</headphones-connected>
    <developer-enabled>true</developer-enabled>
    <power-mode>PowerOn</power-mode>
    <ecp-setting-mode>enabled</ecp-setting-mode>
</device-info>"#;

        let mut device = RokuDevice::with_url("http://192.168.1.162:8060/");
        decode_device_info(&root(xml), &mut device);

        assert_eq!(device.name, "Living Room Roku");
        assert_eq!(device.location, "Living Room");
        assert_eq!(device.model, "Roku Ultra");
        assert_eq!(device.serial, "1GU48T017973");
        assert_eq!(device.mac_address, "b0:a7:37:96:4d:fb");
        assert_eq!(device.software_version, "11.5.0");
        assert_eq!(device.resolution, "1080p");
        assert!(device.is_on);
        assert!(!device.is_tv);
        assert!(!device.is_limited);
        assert!(device.developer_mode);
        assert!(device.has_search_support);
        assert!(device.has_headphone_support);
        assert!(!device.headphones_connected);
    }

    #[test]
    fn test_device_info_sentinels_are_exact() {
        let xml = "<device-info><is-tv>TRUE</is-tv><power-mode>DisplayOff</power-mode>\
                   <ecp-setting-mode>limited</ecp-setting-mode><ethernet-mac>aa:bb:cc:dd:ee:ff</ethernet-mac>\
                   </device-info>";
        let mut device = RokuDevice::with_url("http://10.0.0.5:8060");
        decode_device_info(&root(xml), &mut device);

        assert!(!device.is_tv);
        assert!(!device.is_on);
        assert!(device.is_limited);
        assert_eq!(device.mac_address, "aa:bb:cc:dd:ee:ff");
        assert!(device.name.is_empty());
    }

    #[test]
    fn test_decode_channel() {
        let xml = "<channel><channel-id>1.1</channel-id><name>WRAL-HD</name><type>air-digital</type>\
                   <user-hidden>false</user-hidden><user-favorite>true</user-favorite>\
                   <physical-channel>27</physical-channel><physical-frequency>551000</physical-frequency>\
                   <broadcast-network-label>NBC</broadcast-network-label></channel>";
        let channel = decode_channel(&root(xml));

        assert_eq!(channel.id, "1.1");
        assert_eq!(channel.name, "WRAL-HD");
        assert_eq!(channel.channel_type, "air-digital");
        assert_eq!(channel.network, "NBC");
        assert!(!channel.is_hidden);
        assert!(channel.is_favorite);
        assert_eq!(channel.physical_channel, 27);
        assert_eq!(channel.frequency, 551_000_000);
    }

    #[test]
    fn test_channel_numbers_default_to_zero() {
        let channel = decode_channel(&root("<channel><channel-id>5.1</channel-id></channel>"));
        assert_eq!(channel.physical_channel, 0);
        assert_eq!(channel.frequency, 0);
    }

    #[test]
    fn test_frequency_is_scaled_to_hz() {
        let channel = decode_channel(&root(
            "<channel><physical-frequency>609000</physical-frequency></channel>",
        ));
        assert_eq!(channel.frequency, 609_000_000);
    }

    #[test]
    fn test_decode_active_channel() {
        let xml = "<channel><channel-id>1.1</channel-id><name>WRAL-HD</name><active-input>true</active-input>\
                   <signal-state>valid</signal-state><signal-mode>1080i</signal-mode>\
                   <signal-quality>100</signal-quality><signal-strength>-51</signal-strength>\
                   <program-title>Local News</program-title><program-description>Top stories</program-description>\
                   <program-ratings>TV-G</program-ratings><program-has-cc>true</program-has-cc></channel>";
        let active = decode_active_channel(&root(xml));

        assert!(active.is_active);
        assert_eq!(active.channel.id, "1.1");
        assert_eq!(active.program.title, "Local News");
        assert_eq!(active.program.description, "Top stories");
        assert_eq!(active.program.rating, "TV-G");
        assert!(active.program.has_cc);
        assert!(active.signal_received);
        assert_eq!(active.resolution, "1080i");
        assert_eq!(active.signal_quality, 100);
        assert_eq!(active.signal_strength, -51);
    }

    #[test]
    fn test_inactive_channel_drops_program_data() {
        let xml = "<channel><channel-id>2.1</channel-id><active-input>false</active-input>\
                   <program-title>Stale Show</program-title><program-has-cc>true</program-has-cc>\
                   <signal-state>valid</signal-state><signal-quality>80</signal-quality>\
                   <signal-strength>-40</signal-strength><signal-mode>720p</signal-mode></channel>";
        let active = decode_active_channel(&root(xml));

        assert!(!active.is_active);
        assert_eq!(active.channel.id, "2.1");
        assert!(active.program.title.is_empty());
        assert!(active.program.description.is_empty());
        assert!(active.program.rating.is_empty());
        assert!(!active.program.has_cc);
        assert!(!active.signal_received);
        assert!(active.resolution.is_empty());
        assert_eq!(active.signal_quality, 0);
        assert_eq!(active.signal_strength, 0);
    }

    #[test]
    fn test_no_signal() {
        let xml = "<channel><active-input>true</active-input><signal-state>none</signal-state></channel>";
        let active = decode_active_channel(&root(xml));
        assert!(active.is_active);
        assert!(!active.signal_received);
    }

    #[test]
    fn test_decode_app() {
        let app = decode_app(&root(r#"<app id="12" type="appl" version="4.1.218">Netflix</app>"#));
        assert_eq!(app.id, "12");
        assert_eq!(app.name, "Netflix");
        assert_eq!(app.app_type, "appl");
        assert_eq!(app.version, "4.1.218");

        let home = decode_app(&root("<app>Roku</app>"));
        assert!(home.id.is_empty());
        assert_eq!(home.name, "Roku");
    }
}
