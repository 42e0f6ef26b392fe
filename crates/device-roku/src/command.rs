//! Command dispatch layer: keypress, launch, input and search requests.
//!
//! URL construction is kept in pure functions so the exact wire format can be
//! checked without a device.

use crate::client::{require_full_control, require_tv, EcpClient};
use rokuecp_core::{
    is_tv_only_key, AppLaunchParams, CapabilityError, Result, RokuDevice, SearchParams,
    Transport, TvChannel, MAX_PROVIDER_IDS,
};
use urlencoding::encode;

/// App id of the built-in TV tuner
pub const TV_INPUT_APP_ID: &str = "tvinput.dtv";

/// Parameter names firmware versions use for the channel to tune
pub const CHANNEL_PARAM_ALIASES: [&str; 3] = ["chan", "lcn", "ch"];

impl<T: Transport> EcpClient<T> {
    /// Emulate a remote control button press
    ///
    /// Endpoint: POST /keypress/{key}
    pub fn send_key(&self, device: &RokuDevice, key: impl AsRef<str>) -> Result<()> {
        let key = key.as_ref();
        if !device.is_tv && is_tv_only_key(key) {
            return Err(CapabilityError::InvalidKeyForDeviceClass(key.to_string()).into());
        }
        require_full_control(device)?;

        self.post(&keypress_url(device, key))
    }

    /// Launch an app, optionally deep-linking into content
    ///
    /// Endpoint: POST /launch/{appID}[?contentId=..&MediaType=..&..]
    pub fn launch_app(&self, device: &RokuDevice, params: &AppLaunchParams) -> Result<()> {
        tracing::info!("Launching app {} on {}", params.app_id, device.url);
        self.post(&launch_url(device, params))
    }

    /// Tune a Roku TV to `channel`
    pub fn launch_tv_channel(&self, device: &RokuDevice, channel: &TvChannel) -> Result<()> {
        require_tv(device)?;
        require_full_control(device)?;

        self.launch_app(device, &tv_channel_launch_params(&channel.id))
    }

    /// Send arbitrary name/value input to the foreground app
    ///
    /// Endpoint: POST /input?{name=value&...}
    pub fn send_input<N, V>(&self, device: &RokuDevice, params: &[(N, V)]) -> Result<()>
    where
        N: AsRef<str>,
        V: AsRef<str>,
    {
        require_full_control(device)?;
        self.post(&input_url(device, params))
    }

    /// Search for a movie, show, person, app or game
    ///
    /// Endpoint: POST /search/browse?keyword=..&{filters}
    pub fn search(&self, device: &RokuDevice, keyword: &str, params: &SearchParams) -> Result<()> {
        if !device.has_search_support {
            return Err(CapabilityError::SearchUnsupported.into());
        }
        require_full_control(device)?;
        if keyword.is_empty() {
            return Err(CapabilityError::EmptyKeyword.into());
        }

        self.post(&search_url(device, keyword, params))
    }
}

pub fn keypress_url(device: &RokuDevice, key: &str) -> String {
    device.endpoint(&format!("keypress/{}", key))
}

/// Join `name=value` pairs with `&`, escaping both sides
fn push_pairs<N: AsRef<str>, V: AsRef<str>>(url: &mut String, pairs: &[(N, V)]) {
    for (i, (name, value)) in pairs.iter().enumerate() {
        if i > 0 {
            url.push('&');
        }
        url.push_str(&encode(name.as_ref()));
        url.push('=');
        url.push_str(&encode(value.as_ref()));
    }
}

pub fn launch_url(device: &RokuDevice, params: &AppLaunchParams) -> String {
    let mut url = device.endpoint(&format!("launch/{}", encode(&params.app_id)));

    let mut query: Vec<String> = Vec::new();
    if let Some(content_id) = params.content_id.as_deref().filter(|id| !id.is_empty()) {
        query.push(format!("contentId={}", encode(content_id)));
    }
    if let Some(media_type) = params.media_type {
        query.push(format!("MediaType={}", media_type.as_str()));
    }
    if !params.extra.is_empty() {
        let mut extra = String::new();
        push_pairs(&mut extra, &params.extra);
        query.push(extra);
    }

    if !query.is_empty() {
        url.push('?');
        url.push_str(&query.join("&"));
    }
    url
}

/// Launch parameters that tune the TV input to `channel_id`
pub fn tv_channel_launch_params(channel_id: &str) -> AppLaunchParams {
    CHANNEL_PARAM_ALIASES
        .iter()
        .fold(AppLaunchParams::new(TV_INPUT_APP_ID), |params, name| {
            params.with_param(*name, channel_id)
        })
}

pub fn input_url<N: AsRef<str>, V: AsRef<str>>(device: &RokuDevice, params: &[(N, V)]) -> String {
    let mut url = device.endpoint("input?");
    push_pairs(&mut url, params);
    url
}

pub fn search_url(device: &RokuDevice, keyword: &str, params: &SearchParams) -> String {
    let mut url = device.endpoint("search/browse?keyword=");
    url.push_str(&encode(keyword));

    if let Some(search_type) = params.search_type {
        url.push_str("&type=");
        url.push_str(search_type.as_str());
    }
    if params.include_unavailable {
        url.push_str("&show-unavailable=true");
    }
    if params.auto_launch {
        url.push_str("&launch=true");
    }
    if params.auto_select {
        url.push_str("&match-any=true");
    }
    if params.season != 0 {
        url.push_str(&format!("&season={}", params.season));
    }
    if !params.tms_id.is_empty() {
        url.push_str("&tmsid=");
        url.push_str(&encode(&params.tms_id));
    }

    let providers: Vec<String> = params
        .provider_ids
        .iter()
        .take(MAX_PROVIDER_IDS)
        .filter(|id| !id.is_empty())
        .map(|id| encode(id).into_owned())
        .collect();
    if !providers.is_empty() {
        url.push_str("&provider-id=");
        url.push_str(&providers.join(","));
    }

    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use rokuecp_core::{MediaType, SearchType};

    fn device() -> RokuDevice {
        RokuDevice::with_url("http://192.168.1.162:8060/")
    }

    #[test]
    fn test_keypress_url() {
        assert_eq!(
            keypress_url(&device(), "Home"),
            "http://192.168.1.162:8060/keypress/Home"
        );
    }

    #[test]
    fn test_launch_url_without_params() {
        let url = launch_url(&device(), &AppLaunchParams::new("12"));
        assert_eq!(url, "http://192.168.1.162:8060/launch/12");
    }

    #[test]
    fn test_launch_url_with_content_and_media_type() {
        let params = AppLaunchParams::new("12").with_content("80057281 s1", Some(MediaType::Episode));
        assert_eq!(
            launch_url(&device(), &params),
            "http://192.168.1.162:8060/launch/12?contentId=80057281%20s1&MediaType=episode"
        );
    }

    #[test]
    fn test_launch_url_media_type_only() {
        let params = AppLaunchParams {
            app_id: "12".into(),
            media_type: Some(MediaType::Film),
            ..Default::default()
        };
        assert_eq!(
            launch_url(&device(), &params),
            "http://192.168.1.162:8060/launch/12?MediaType=movie"
        );
    }

    #[test]
    fn test_launch_url_extra_params_keep_order() {
        let params = AppLaunchParams::new("dev")
            .with_content("abc", None)
            .with_param("z", "1")
            .with_param("a b", "x&y");
        assert_eq!(
            launch_url(&device(), &params),
            "http://192.168.1.162:8060/launch/dev?contentId=abc&z=1&a%20b=x%26y"
        );

        let params = AppLaunchParams::new("dev").with_param("only", "one");
        assert_eq!(
            launch_url(&device(), &params),
            "http://192.168.1.162:8060/launch/dev?only=one"
        );
    }

    #[test]
    fn test_tv_channel_launch_uses_all_aliases() {
        let params = tv_channel_launch_params("3.1");
        assert_eq!(
            launch_url(&device(), &params),
            "http://192.168.1.162:8060/launch/tvinput.dtv?chan=3.1&lcn=3.1&ch=3.1"
        );
    }

    #[test]
    fn test_input_url() {
        let url = input_url(&device(), &[("acceleration.x", "0.0"), ("touch.0.op", "down")]);
        assert_eq!(
            url,
            "http://192.168.1.162:8060/input?acceleration.x=0.0&touch.0.op=down"
        );

        let empty: [(&str, &str); 0] = [];
        assert_eq!(input_url(&device(), &empty), "http://192.168.1.162:8060/input?");
    }

    #[test]
    fn test_search_url_keyword_and_type() {
        let params = SearchParams::new().with_type(SearchType::Show);
        let url = search_url(&device(), "Friends", &params);
        assert!(url.contains("keyword=Friends&type=tv-show"));
        assert_eq!(
            url,
            "http://192.168.1.162:8060/search/browse?keyword=Friends&type=tv-show"
        );
    }

    #[test]
    fn test_search_url_all_filters() {
        let params = SearchParams {
            search_type: Some(SearchType::Movie),
            include_unavailable: true,
            tms_id: "MV000123450000".into(),
            season: 2,
            auto_select: true,
            auto_launch: true,
            provider_ids: vec!["12".into(), "".into(), "13".into()],
        };
        assert_eq!(
            search_url(&device(), "The Martian", &params),
            "http://192.168.1.162:8060/search/browse?keyword=The%20Martian&type=movie\
             &show-unavailable=true&launch=true&match-any=true&season=2&tmsid=MV000123450000\
             &provider-id=12,13"
        );
    }

    #[test]
    fn test_search_url_defaults_add_nothing() {
        assert_eq!(
            search_url(&device(), "news", &SearchParams::default()),
            "http://192.168.1.162:8060/search/browse?keyword=news"
        );
    }
}
