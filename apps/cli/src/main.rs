mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use rokuecp::{
    AppLaunchParams, DiscoveryOptions, EcpClient, Key, MediaType, RokuApp, RokuDevice, SearchParams,
    SearchType, TextEncoding, TvChannel, TypingPolicy, DEFAULT_REQUEST_TIMEOUT, DISCOVERY_TIMEOUT,
};
use serde::Serialize;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_MAX_DEVICES: usize = 8;
const DEFAULT_LIST_LIMIT: usize = 500;

#[derive(Parser)]
#[command(name = "rokuctl", version)]
#[command(about = "Control Roku devices over the External Control Protocol")]
struct Cli {
    /// ECP base URL of the device (like http://192.168.1.162:8060/)
    #[arg(long, short, global = true)]
    device: Option<String>,

    /// IPv4 address of the interface to discover on
    #[arg(long, global = true)]
    interface: Option<Ipv4Addr>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Config file (defaults to <config dir>/rokuecp/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find Roku devices on the local network
    Discover {
        /// Stop after this many devices
        #[arg(long)]
        max: Option<usize>,
        /// Seconds to wait for answers
        #[arg(long)]
        wait: Option<u64>,
        /// Also fetch device info for every device found
        #[arg(long)]
        info: bool,
    },
    /// Show device identity and capabilities
    Info,
    /// Press one or more remote keys (like Home, Select, VolumeUp)
    Key {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Type text into the focused field
    Type {
        text: String,
        /// utf-8, latin-1 or ascii
        #[arg(long)]
        encoding: Option<TextEncoding>,
        /// Stop at the first failed keypress
        #[arg(long)]
        fail_fast: bool,
    },
    /// List installed apps
    Apps {
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        max: usize,
    },
    /// Show the app in the foreground
    ActiveApp,
    /// Download an app icon
    Icon {
        app_id: String,
        /// Where to write the image
        #[arg(long, short)]
        output: PathBuf,
    },
    /// List TV channels (Roku TV only)
    Channels {
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        max: usize,
    },
    /// Show the active TV channel (Roku TV only)
    ActiveChannel,
    /// Launch an app, optionally deep-linking into content
    Launch {
        app_id: String,
        #[arg(long)]
        content_id: Option<String>,
        /// movie, series, season, episode, shortFormVideo or tvSpecial
        #[arg(long)]
        media_type: Option<MediaType>,
        /// Extra launch parameter as name=value
        #[arg(long = "param", value_parser = parse_pair)]
        params: Vec<(String, String)>,
    },
    /// Tune a Roku TV to a channel
    LaunchChannel { channel_id: String },
    /// Send name=value input to the foreground app
    Input {
        #[arg(required = true, value_parser = parse_pair)]
        params: Vec<(String, String)>,
    },
    /// Search for content
    Search {
        keyword: String,
        /// movie, tv-show, person, channel or game
        #[arg(long = "type")]
        search_type: Option<SearchType>,
        /// Include results not available on installed apps
        #[arg(long)]
        unavailable: bool,
        #[arg(long)]
        tms_id: Option<String>,
        #[arg(long)]
        season: Option<u16>,
        /// Select the first match
        #[arg(long)]
        select: bool,
        /// Launch the first match
        #[arg(long)]
        launch: bool,
        /// Restrict to these provider app ids
        #[arg(long = "provider")]
        providers: Vec<String>,
    },
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", s))?;
    if name.is_empty() {
        return Err(format!("missing name in '{}'", s));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Attach the numeric result code to a library error
fn ecp<T>(result: rokuecp::Result<T>, action: &str) -> Result<T> {
    result.map_err(|e| {
        let code = e.code();
        anyhow::Error::new(e).context(format!("{} failed (code {})", action, code))
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

struct Session {
    client: EcpClient,
    config: Config,
    device_url: Option<String>,
    json: bool,
}

impl Session {
    /// Refresh the target device's capabilities before acting on it
    fn device(&self) -> Result<RokuDevice> {
        let url = self
            .device_url
            .as_deref()
            .context("No device given; pass --device or set `device` in the config file")?;
        ecp(self.client.device_info(url), "device-info")
    }

    fn run(&self, command: Command, interface: Option<Ipv4Addr>) -> Result<()> {
        match command {
            Command::Discover { max, wait, info } => {
                let options = DiscoveryOptions {
                    interface: interface.or(self.config.interface),
                    max_devices: max.or(self.config.max_devices).unwrap_or(DEFAULT_MAX_DEVICES),
                    timeout: wait
                        .or(self.config.discovery_timeout_secs)
                        .map(Duration::from_secs)
                        .unwrap_or(DISCOVERY_TIMEOUT),
                };
                let locations = ecp(rokuecp::find_devices(&options), "discovery")?;
                if info {
                    let devices: Vec<RokuDevice> = locations
                        .iter()
                        .filter_map(|url| match self.client.device_info(url) {
                            Ok(device) => Some(device),
                            Err(e) => {
                                tracing::warn!("Skipping {}: {}", url, e);
                                None
                            }
                        })
                        .collect();
                    if self.json {
                        return print_json(&devices);
                    }
                    for device in &devices {
                        println!("{}  {} ({}) {}", device.url, device.name, device.model, device.location);
                    }
                } else if self.json {
                    print_json(&locations)?;
                } else if locations.is_empty() {
                    println!("No Roku devices found");
                } else {
                    for location in &locations {
                        println!("{}", location);
                    }
                }
            }
            Command::Info => {
                let device = self.device()?;
                if self.json {
                    return print_json(&device);
                }
                print_device(&device);
            }
            Command::Key { keys } => {
                let device = self.device()?;
                for key in keys {
                    // Known keys are sent with their canonical spelling
                    let name = key.parse::<Key>().map(|k| k.as_str().to_string()).unwrap_or(key);
                    ecp(self.client.send_key(&device, &name), &format!("keypress {}", name))?;
                }
            }
            Command::Type { text, encoding, fail_fast } => {
                let device = self.device()?;
                let encoding = encoding.or(self.config.text_encoding).unwrap_or_default();
                let policy = if fail_fast { TypingPolicy::FailFast } else { TypingPolicy::LastWins };
                ecp(self.client.type_text_with(&device, &text, encoding, policy), "type")?;
            }
            Command::Apps { max } => {
                let device = self.device()?;
                let apps = ecp(self.client.apps(&device, max), "apps")?;
                if self.json {
                    return print_json(&apps);
                }
                for app in &apps {
                    println!("{:>14}  {:<5} {:<22} {}", app.id, app.app_type, app.version, app.name);
                }
            }
            Command::ActiveApp => {
                let device = self.device()?;
                let app = ecp(self.client.active_app(&device), "active-app")?;
                if self.json {
                    return print_json(&app);
                }
                if app.id.is_empty() {
                    println!("{}", app.name);
                } else {
                    println!("{} ({})", app.name, app.id);
                }
            }
            Command::Icon { app_id, output } => {
                let device = self.device()?;
                let icon = ecp(self.client.app_icon(&device, &RokuApp::with_id(&app_id)), "icon")?;
                if !icon.is_success() {
                    bail!("Device returned status {} for icon of app {}", icon.status, app_id);
                }
                let size = icon.len();
                std::fs::write(&output, icon.into_bytes())
                    .with_context(|| format!("Failed to write {}", output.display()))?;
                println!("Wrote {} bytes to {}", size, output.display());
            }
            Command::Channels { max } => {
                let device = self.device()?;
                let channels = ecp(self.client.tv_channels(&device, max), "tv-channels")?;
                if self.json {
                    return print_json(&channels);
                }
                for channel in &channels {
                    println!(
                        "{:>7}  {:<8} {:<14} {}{}",
                        channel.id,
                        channel.name,
                        channel.channel_type,
                        channel.network,
                        if channel.is_hidden { " (hidden)" } else { "" }
                    );
                }
            }
            Command::ActiveChannel => {
                let device = self.device()?;
                let active = ecp(self.client.active_tv_channel(&device), "tv-active-channel")?;
                if self.json {
                    return print_json(&active);
                }
                println!("{} {}", active.channel.id, active.channel.name);
                if active.is_active {
                    println!("  Program: {}", active.program.title);
                    println!(
                        "  Signal:  {} ({}, quality {}, strength {})",
                        if active.signal_received { "yes" } else { "no" },
                        active.resolution,
                        active.signal_quality,
                        active.signal_strength
                    );
                } else {
                    println!("  (not the active input)");
                }
            }
            Command::Launch { app_id, content_id, media_type, params } => {
                let device = self.device()?;
                let mut launch = AppLaunchParams::new(&app_id);
                launch.content_id = content_id;
                launch.media_type = media_type;
                launch.extra = params;
                ecp(self.client.launch_app(&device, &launch), "launch")?;
            }
            Command::LaunchChannel { channel_id } => {
                let device = self.device()?;
                let channel = TvChannel {
                    id: channel_id.as_str().into(),
                    ..Default::default()
                };
                ecp(self.client.launch_tv_channel(&device, &channel), "launch channel")?;
            }
            Command::Input { params } => {
                let device = self.device()?;
                ecp(self.client.send_input(&device, &params), "input")?;
            }
            Command::Search {
                keyword,
                search_type,
                unavailable,
                tms_id,
                season,
                select,
                launch,
                providers,
            } => {
                let device = self.device()?;
                let mut params = SearchParams::new();
                params.search_type = search_type;
                params.include_unavailable = unavailable;
                params.auto_select = select;
                params.auto_launch = launch;
                if let Some(tms_id) = tms_id {
                    params = params.with_tms_id(&tms_id);
                }
                if let Some(season) = season {
                    params = params.with_season(season);
                }
                for provider in &providers {
                    params = params.with_provider(provider);
                }
                ecp(self.client.search(&device, &keyword, &params), "search")?;
            }
        }
        Ok(())
    }
}

fn print_device(device: &RokuDevice) {
    println!("{} ({})", device.name, device.model);
    println!("  URL:        {}", device.url);
    println!("  Location:   {}", device.location);
    println!("  Serial:     {}", device.serial);
    println!("  MAC:        {}", device.mac_address);
    println!("  Software:   {}", device.software_version);
    println!("  Resolution: {}", device.resolution);
    println!("  Roku TV:    {}", device.is_tv);
    println!("  Powered on: {}", device.is_on);
    println!("  Limited:    {}", device.is_limited);
    println!("  Search:     {}", device.has_search_support);
    println!("  Developer:  {}", device.developer_mode);
    println!(
        "  Headphones: {} (connected: {})",
        device.has_headphone_support, device.headphones_connected
    );
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,rokuecp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let timeout = cli
        .timeout
        .or(config.request_timeout_secs)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT);
    let client = ecp(EcpClient::with_timeout(timeout), "HTTP client setup")?;

    let session = Session {
        client,
        device_url: cli.device.or_else(|| config.device.clone()),
        config,
        json: cli.json,
    };
    session.run(cli.command, cli.interface)
}
