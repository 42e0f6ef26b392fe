use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Keys that only exist on Roku TVs
pub const TV_ONLY_KEYS: [&str; 12] = [
    "VolumeUp",
    "VolumeDown",
    "VolumeMute",
    "PowerOff",
    "ChannelUp",
    "ChannelDown",
    "InputTuner",
    "InputHDMI1",
    "InputHDMI2",
    "InputHDMI3",
    "InputHDMI4",
    "InputAV1",
];

/// Whether `key` is only valid on a Roku TV
pub fn is_tv_only_key(key: &str) -> bool {
    TV_ONLY_KEYS.contains(&key)
}

/// Remote control keys understood by `/keypress`
///
/// Any other key name (including `Lit_` keys) can be sent as a plain string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Home,
    Rev,
    Fwd,
    Play,
    Select,
    Left,
    Right,
    Down,
    Up,
    Back,
    InstantReplay,
    Info,
    Backspace,
    Search,
    Enter,
    FindRemote,
    VolumeDown,
    VolumeMute,
    VolumeUp,
    PowerOff,
    PowerOn,
    Power,
    ChannelUp,
    ChannelDown,
    InputTuner,
    InputHdmi1,
    InputHdmi2,
    InputHdmi3,
    InputHdmi4,
    InputAv1,
}

impl Key {
    pub const ALL: [Key; 30] = [
        Key::Home,
        Key::Rev,
        Key::Fwd,
        Key::Play,
        Key::Select,
        Key::Left,
        Key::Right,
        Key::Down,
        Key::Up,
        Key::Back,
        Key::InstantReplay,
        Key::Info,
        Key::Backspace,
        Key::Search,
        Key::Enter,
        Key::FindRemote,
        Key::VolumeDown,
        Key::VolumeMute,
        Key::VolumeUp,
        Key::PowerOff,
        Key::PowerOn,
        Key::Power,
        Key::ChannelUp,
        Key::ChannelDown,
        Key::InputTuner,
        Key::InputHdmi1,
        Key::InputHdmi2,
        Key::InputHdmi3,
        Key::InputHdmi4,
        Key::InputAv1,
    ];

    /// ECP key name
    pub fn as_str(&self) -> &'static str {
        match self {
            Key::Home => "Home",
            Key::Rev => "Rev",
            Key::Fwd => "Fwd",
            Key::Play => "Play",
            Key::Select => "Select",
            Key::Left => "Left",
            Key::Right => "Right",
            Key::Down => "Down",
            Key::Up => "Up",
            Key::Back => "Back",
            Key::InstantReplay => "InstantReplay",
            Key::Info => "Info",
            Key::Backspace => "Backspace",
            Key::Search => "Search",
            Key::Enter => "Enter",
            Key::FindRemote => "FindRemote",
            Key::VolumeDown => "VolumeDown",
            Key::VolumeMute => "VolumeMute",
            Key::VolumeUp => "VolumeUp",
            Key::PowerOff => "PowerOff",
            Key::PowerOn => "PowerOn",
            Key::Power => "Power",
            Key::ChannelUp => "ChannelUp",
            Key::ChannelDown => "ChannelDown",
            Key::InputTuner => "InputTuner",
            Key::InputHdmi1 => "InputHDMI1",
            Key::InputHdmi2 => "InputHDMI2",
            Key::InputHdmi3 => "InputHDMI3",
            Key::InputHdmi4 => "InputHDMI4",
            Key::InputAv1 => "InputAV1",
        }
    }

    pub fn is_tv_only(&self) -> bool {
        is_tv_only_key(self.as_str())
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for unknown key names
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseKeyError(pub String);

impl fmt::Display for ParseKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown key: {}", self.0)
    }
}

impl std::error::Error for ParseKeyError {}

impl FromStr for Key {
    type Err = ParseKeyError;

    /// Case-insensitive lookup by ECP key name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Key::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseKeyError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tv_only_keys() {
        assert!(is_tv_only_key("PowerOff"));
        assert!(is_tv_only_key("InputHDMI3"));
        assert!(!is_tv_only_key("Home"));
        assert!(!is_tv_only_key("poweroff"));
        assert!(Key::VolumeMute.is_tv_only());
        assert!(!Key::PowerOn.is_tv_only());
    }

    #[test]
    fn test_every_tv_only_key_has_a_variant() {
        for name in TV_ONLY_KEYS {
            let key: Key = name.parse().unwrap();
            assert_eq!(key.as_str(), name);
        }
    }

    #[test]
    fn test_parse_key_is_case_insensitive() {
        assert_eq!("home".parse::<Key>().unwrap(), Key::Home);
        assert_eq!("inputhdmi1".parse::<Key>().unwrap(), Key::InputHdmi1);
        assert!("Lit_a".parse::<Key>().is_err());
    }
}
