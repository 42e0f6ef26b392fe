use crate::models::capacity::{APP_ID, TMS_ID};
use crate::text::BoundedText;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Most provider ids a single search can filter on
pub const MAX_PROVIDER_IDS: usize = 8;

/// Search result filter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Movie,
    Show,
    Person,
    App,
    Game,
}

impl SearchType {
    /// Value of the `type` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Movie => "movie",
            SearchType::Show => "tv-show",
            SearchType::Person => "person",
            SearchType::App => "channel",
            SearchType::Game => "game",
        }
    }
}

/// Error type for invalid enum strings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseParamError(pub String);

impl fmt::Display for ParseParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid value: {}", self.0)
    }
}

impl std::error::Error for ParseParamError {}

impl FromStr for SearchType {
    type Err = ParseParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "movie" => Ok(SearchType::Movie),
            "show" | "tv-show" => Ok(SearchType::Show),
            "person" => Ok(SearchType::Person),
            "app" | "channel" => Ok(SearchType::App),
            "game" => Ok(SearchType::Game),
            _ => Err(ParseParamError(s.to_string())),
        }
    }
}

/// Optional refinements of a search. The default is a plain keyword search.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub search_type: Option<SearchType>,
    /// Include results that are unavailable in the device's region
    pub include_unavailable: bool,
    /// TMS id of the movie or show
    pub tms_id: BoundedText<TMS_ID>,
    /// Season of the show, 0 for none
    pub season: u16,
    /// Automatically select the first result
    pub auto_select: bool,
    /// Launch the first provider in `provider_ids` that has a result
    pub auto_launch: bool,
    /// App ids of providers to look for results from (like "12" for Netflix).
    /// Only the first [`MAX_PROVIDER_IDS`] are sent.
    pub provider_ids: Vec<BoundedText<APP_ID>>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, search_type: SearchType) -> Self {
        self.search_type = Some(search_type);
        self
    }

    pub fn with_season(mut self, season: u16) -> Self {
        self.season = season;
        self
    }

    pub fn with_tms_id(mut self, tms_id: &str) -> Self {
        self.tms_id.set(tms_id);
        self
    }

    /// Add a provider, ignored once [`MAX_PROVIDER_IDS`] are set
    pub fn with_provider(mut self, app_id: &str) -> Self {
        if self.provider_ids.len() < MAX_PROVIDER_IDS {
            self.provider_ids.push(BoundedText::new(app_id));
        }
        self
    }
}

/// Content type passed to an app on launch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaType {
    Film,
    Series,
    Season,
    Episode,
    ShortFormVideo,
    TvSpecial,
}

impl MediaType {
    /// Value of the `MediaType` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Film => "movie",
            MediaType::Series => "series",
            MediaType::Season => "season",
            MediaType::Episode => "episode",
            MediaType::ShortFormVideo => "shortFormVideo",
            MediaType::TvSpecial => "tvSpecial",
        }
    }
}

impl FromStr for MediaType {
    type Err = ParseParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "movie" | "film" => Ok(MediaType::Film),
            "series" => Ok(MediaType::Series),
            "season" => Ok(MediaType::Season),
            "episode" => Ok(MediaType::Episode),
            "shortformvideo" => Ok(MediaType::ShortFormVideo),
            "tvspecial" => Ok(MediaType::TvSpecial),
            _ => Err(ParseParamError(s.to_string())),
        }
    }
}

/// What to launch and with which deep-link parameters
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AppLaunchParams {
    pub app_id: String,
    pub content_id: Option<String>,
    pub media_type: Option<MediaType>,
    /// Extra name/value pairs, sent in this order
    pub extra: Vec<(String, String)>,
}

impl AppLaunchParams {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            ..Default::default()
        }
    }

    pub fn with_content(mut self, content_id: impl Into<String>, media_type: Option<MediaType>) -> Self {
        self.content_id = Some(content_id.into());
        self.media_type = media_type;
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((name.into(), value.into()));
        self
    }
}
