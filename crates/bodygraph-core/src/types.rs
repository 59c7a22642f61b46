//! Core value types for bodygraph charts

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Gate number. Always within 1..=64 once constructed.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Gate(u8);

impl Gate {
    pub const COUNT: usize = 64;

    pub fn new(number: i64) -> Result<Self> {
        if (1..=64).contains(&number) {
            Ok(Self(number as u8))
        } else {
            Err(Error::InvalidGate(number))
        }
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// All 64 gates in ascending order.
    pub fn all() -> impl Iterator<Item = Gate> {
        (1..=64u8).map(Gate)
    }

    /// Table constructor for static reference data already known to be in range.
    pub(crate) const fn known(number: u8) -> Self {
        Self(number)
    }
}

impl TryFrom<i64> for Gate {
    type Error = Error;

    fn try_from(number: i64) -> Result<Self> {
        Self::new(number)
    }
}

impl From<Gate> for u8 {
    fn from(gate: Gate) -> u8 {
        gate.0
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Line within a gate, 1..=6. Supplied per activation, not intrinsic to a gate.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Line(u8);

impl Line {
    pub fn new(number: i64) -> Result<Self> {
        if (1..=6).contains(&number) {
            Ok(Self(number as u8))
        } else {
            Err(Error::InvalidLine(number))
        }
    }

    pub(crate) const fn known(number: u8) -> Self {
        Self(number)
    }

    pub fn number(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Line {
    type Error = Error;

    fn try_from(number: i64) -> Result<Self> {
        Self::new(number)
    }
}

impl From<Line> for u8 {
    fn from(line: Line) -> u8 {
        line.0
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which of the two independent activation passes produced an activation.
///
/// Personality is the conscious pass (birth moment); Design is the
/// unconscious pass (88 degrees of solar arc before birth).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    Personality,
    Design,
}

impl Stream {
    pub const ALL: [Stream; 2] = [Stream::Personality, Stream::Design];

    pub(crate) fn index(self) -> usize {
        match self {
            Stream::Personality => 0,
            Stream::Design => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stream::Personality => "personality",
            Stream::Design => "design",
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Celestial body that produced an activation
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Body {
    Sun,
    Earth,
    Moon,
    #[serde(rename = "North Node")]
    NorthNode,
    #[serde(rename = "South Node")]
    SouthNode,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    Chiron,
}

impl Body {
    pub const ALL: [Body; 14] = [
        Body::Sun,
        Body::Earth,
        Body::Moon,
        Body::NorthNode,
        Body::SouthNode,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
        Body::Chiron,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Earth => "Earth",
            Body::Moon => "Moon",
            Body::NorthNode => "North Node",
            Body::SouthNode => "South Node",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
            Body::Pluto => "Pluto",
            Body::Chiron => "Chiron",
        }
    }
}

impl FromStr for Body {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().replace('_', " ");
        Body::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| Error::unknown("body", s))
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stable code of one of the nine centers
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CenterCode {
    Head,
    Ajna,
    Throat,
    G,
    Heart,
    Sacral,
    Spleen,
    #[serde(rename = "solar")]
    SolarPlexus,
    Root,
}

impl CenterCode {
    pub const ALL: [CenterCode; 9] = [
        CenterCode::Head,
        CenterCode::Ajna,
        CenterCode::Throat,
        CenterCode::G,
        CenterCode::Heart,
        CenterCode::Sacral,
        CenterCode::Spleen,
        CenterCode::SolarPlexus,
        CenterCode::Root,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CenterCode::Head => "head",
            CenterCode::Ajna => "ajna",
            CenterCode::Throat => "throat",
            CenterCode::G => "g",
            CenterCode::Heart => "heart",
            CenterCode::Sacral => "sacral",
            CenterCode::Spleen => "spleen",
            CenterCode::SolarPlexus => "solar",
            CenterCode::Root => "root",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Centers that can power the throat.
    pub fn is_motor(self) -> bool {
        matches!(
            self,
            CenterCode::Heart | CenterCode::SolarPlexus | CenterCode::Root | CenterCode::Sacral
        )
    }
}

impl FromStr for CenterCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CenterCode::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::unknown("center", s))
    }
}

impl fmt::Display for CenterCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Channel identity: an unordered gate pair stored lower-first.
///
/// Displays and serializes as `"20-34"`. Parsing accepts either order but
/// does not check that the pair is a real channel; use
/// [`Topology::channel`](crate::Topology::channel) for that.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ChannelId {
    low: Gate,
    high: Gate,
}

impl ChannelId {
    pub fn new(a: Gate, b: Gate) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn low(self) -> Gate {
        self.low
    }

    pub fn high(self) -> Gate {
        self.high
    }

    pub fn gates(self) -> (Gate, Gate) {
        (self.low, self.high)
    }

    pub fn contains(self, gate: Gate) -> bool {
        self.low == gate || self.high == gate
    }

    /// The other endpoint, if `gate` is one of the two.
    pub fn partner(self, gate: Gate) -> Option<Gate> {
        if gate == self.low {
            Some(self.high)
        } else if gate == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

impl FromStr for ChannelId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (a, b) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| Error::unknown("channel", s))?;
        let parse = |part: &str| -> Result<Gate> {
            let n: i64 = part.trim().parse().map_err(|_| Error::unknown("channel", s))?;
            Gate::new(n).map_err(|_| Error::unknown("channel", s))
        };
        Ok(Self::new(parse(a)?, parse(b)?))
    }
}

impl Serialize for ChannelId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChannelId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_id_orders_lower_first() {
        let id = ChannelId::new(Gate::known(34), Gate::known(20));
        assert_eq!(id.to_string(), "20-34");
        assert_eq!(id.partner(Gate::known(20)), Some(Gate::known(34)));
        assert_eq!(id.partner(Gate::known(1)), None);
    }

    #[test]
    fn channel_id_rejects_garbage() {
        assert!("20".parse::<ChannelId>().is_err());
        assert!("20-x".parse::<ChannelId>().is_err());
        assert!("0-34".parse::<ChannelId>().is_err());
    }

    #[test]
    fn center_index_matches_all_order() {
        for (i, code) in CenterCode::ALL.iter().enumerate() {
            assert_eq!(code.index(), i);
        }
    }
}
