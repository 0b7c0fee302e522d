//! Connection settings.
//!
//! [`PortSettings`] is the raw, untrusted form a UI or CLI collects (every
//! field is a string). [`ConnectionConfig`] is the validated, immutable
//! record a transport is opened with. Parity and stop bits are closed enums
//! matched against a literal whitelist, independent of any driver crate.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

impl DataBits {
    pub fn as_u8(self) -> u8 {
        match self {
            DataBits::Five => 5,
            DataBits::Six => 6,
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        }
    }
}

impl FromStr for DataBits {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "5" => Ok(DataBits::Five),
            "6" => Ok(DataBits::Six),
            "7" => Ok(DataBits::Seven),
            "8" => Ok(DataBits::Eight),
            _ => Err(ConfigError::InvalidDataBits(s.to_string())),
        }
    }
}

impl fmt::Display for DataBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Parity checking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
    Mark,
    Space,
}

impl Parity {
    pub fn name(self) -> &'static str {
        match self {
            Parity::None => "none",
            Parity::Odd => "odd",
            Parity::Even => "even",
            Parity::Mark => "mark",
            Parity::Space => "space",
        }
    }

    /// Single-letter form used in `8N1` style summaries.
    pub fn letter(self) -> char {
        match self {
            Parity::None => 'N',
            Parity::Odd => 'O',
            Parity::Even => 'E',
            Parity::Mark => 'M',
            Parity::Space => 'S',
        }
    }
}

impl FromStr for Parity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "n" => Ok(Parity::None),
            "odd" | "o" => Ok(Parity::Odd),
            "even" | "e" => Ok(Parity::Even),
            "mark" | "m" => Ok(Parity::Mark),
            "space" | "s" => Ok(Parity::Space),
            _ => Err(ConfigError::InvalidParity(s.to_string())),
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Number of stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StopBits {
    #[default]
    One,
    OnePointFive,
    Two,
}

impl StopBits {
    pub fn name(self) -> &'static str {
        match self {
            StopBits::One => "1",
            StopBits::OnePointFive => "1.5",
            StopBits::Two => "2",
        }
    }
}

impl FromStr for StopBits {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "one" => Ok(StopBits::One),
            "1.5" | "onepointfive" => Ok(StopBits::OnePointFive),
            "2" | "two" => Ok(StopBits::Two),
            _ => Err(ConfigError::InvalidStopBits(s.to_string())),
        }
    }
}

impl fmt::Display for StopBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unvalidated connection settings, as selected by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSettings {
    pub port: String,
    pub baud_rate: String,
    pub data_bits: String,
    pub parity: String,
    pub stop_bits: String,
}

impl PortSettings {
    /// Settings for `port` with the default line parameters (9600 8N1).
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Self::default()
        }
    }

    /// Validate into a [`ConnectionConfig`].
    pub fn validate(&self) -> Result<ConnectionConfig, ConfigError> {
        ConnectionConfig::try_from(self)
    }
}

impl Default for PortSettings {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: DEFAULT_BAUD_RATE.to_string(),
            data_bits: "8".to_string(),
            parity: "none".to_string(),
            stop_bits: "1".to_string(),
        }
    }
}

/// Default baud rate.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Baud rates offered by default in pickers. Any positive rate is accepted.
pub const COMMON_BAUD_RATES: [u32; 5] = [9600, 19200, 38400, 57600, 115200];

/// Validated connection parameters for one open session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    port: String,
    baud_rate: u32,
    data_bits: DataBits,
    parity: Parity,
    stop_bits: StopBits,
}

impl ConnectionConfig {
    /// Build a config from typed parameters.
    pub fn new(
        port: impl Into<String>,
        baud_rate: u32,
        data_bits: DataBits,
        parity: Parity,
        stop_bits: StopBits,
    ) -> Result<Self, ConfigError> {
        let port = port.into().trim().to_string();
        if port.is_empty() {
            return Err(ConfigError::MissingPort);
        }
        if baud_rate == 0 {
            return Err(ConfigError::InvalidBaudRate(baud_rate.to_string()));
        }
        Ok(Self {
            port,
            baud_rate,
            data_bits,
            parity,
            stop_bits,
        })
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    pub fn data_bits(&self) -> DataBits {
        self.data_bits
    }

    pub fn parity(&self) -> Parity {
        self.parity
    }

    pub fn stop_bits(&self) -> StopBits {
        self.stop_bits
    }

    /// Line parameters in the usual `8N1` notation.
    pub fn frame_summary(&self) -> String {
        format!(
            "{}{}{}",
            self.data_bits,
            self.parity.letter(),
            self.stop_bits
        )
    }
}

impl TryFrom<&PortSettings> for ConnectionConfig {
    type Error = ConfigError;

    fn try_from(settings: &PortSettings) -> Result<Self, Self::Error> {
        let port = settings.port.trim();
        if port.is_empty() {
            return Err(ConfigError::MissingPort);
        }
        let baud_rate = settings
            .baud_rate
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|rate| *rate > 0)
            .ok_or_else(|| ConfigError::InvalidBaudRate(settings.baud_rate.clone()))?;
        let data_bits = settings.data_bits.parse()?;
        let parity = settings.parity.parse()?;
        let stop_bits = settings.stop_bits.parse()?;

        Self::new(port, baud_rate, data_bits, parity, stop_bits)
    }
}

impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {} baud ({})",
            self.port,
            self.baud_rate,
            self.frame_summary()
        )
    }
}
