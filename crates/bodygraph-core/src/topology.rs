//! Topology registry - the fixed 9 centers, 64 gates and 36 channels
//!
//! Pure reference data. Built once on first use and shared read-only by
//! every chart; nothing here is derived from chart input.

use crate::error::{Error, Result};
use crate::types::{CenterCode, ChannelId, Gate, Line};
use std::sync::OnceLock;

/// Gate ownership per center, in display order.
const CENTER_TABLE: [(CenterCode, &str, &[u8]); 9] = [
    (CenterCode::Head, "Head", &[64, 61, 63]),
    (CenterCode::Ajna, "Ajna", &[47, 24, 4, 17, 43, 11]),
    (
        CenterCode::Throat,
        "Throat",
        &[62, 23, 56, 16, 20, 31, 8, 33, 35, 12, 45],
    ),
    (CenterCode::G, "G Center", &[1, 7, 10, 15, 2, 46, 25, 13]),
    (CenterCode::Heart, "Heart", &[21, 51, 26, 40]),
    (CenterCode::Sacral, "Sacral", &[34, 5, 14, 29, 59, 9, 3, 42, 27]),
    (CenterCode::Spleen, "Spleen", &[48, 57, 44, 50, 32, 28, 18]),
    (
        CenterCode::SolarPlexus,
        "Solar Plexus",
        &[36, 22, 37, 6, 49, 55, 30],
    ),
    (CenterCode::Root, "Root", &[41, 19, 53, 60, 52, 54, 38, 39, 58]),
];

/// The 36 channels as unordered gate pairs.
const CHANNEL_TABLE: [(u8, u8); 36] = [
    (1, 8),
    (2, 14),
    (3, 60),
    (4, 63),
    (5, 15),
    (6, 59),
    (7, 31),
    (9, 52),
    (10, 20),
    (10, 34),
    (10, 57),
    (11, 56),
    (12, 22),
    (13, 33),
    (16, 48),
    (17, 62),
    (18, 58),
    (19, 49),
    (20, 34),
    (20, 57),
    (21, 45),
    (23, 43),
    (24, 61),
    (25, 51),
    (26, 44),
    (27, 50),
    (28, 38),
    (29, 46),
    (30, 41),
    (32, 54),
    (34, 57),
    (35, 36),
    (37, 40),
    (39, 55),
    (42, 53),
    (47, 64),
];

/// Tropical longitude where the first wheel position begins.
const WHEEL_START: f64 = 58.0;
const GATE_ARC: f64 = 360.0 / 64.0;
const LINE_ARC: f64 = GATE_ARC / 6.0;

/// Gates in wheel order, starting at 58 degrees of tropical longitude.
const WHEEL: [u8; 64] = [
    41, 19, 13, 49, 30, 55, 37, 63, 22, 36, 25, 17, 21, 51, 42, 3, //
    27, 24, 2, 23, 8, 20, 16, 35, 45, 12, 15, 52, 39, 53, 62, 56, //
    31, 33, 7, 4, 29, 59, 40, 64, 47, 6, 46, 18, 48, 57, 32, 50, //
    28, 44, 1, 43, 14, 34, 9, 5, 26, 11, 10, 58, 38, 54, 61, 60,
];

/// One of the nine centers
#[derive(Clone, Debug)]
pub struct Center {
    pub code: CenterCode,
    pub name: &'static str,
    gates: Vec<Gate>,
}

impl Center {
    /// Owned gates in reference order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn owns(&self, gate: Gate) -> bool {
        self.gates.contains(&gate)
    }
}

/// One of the 36 channels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Channel {
    pub id: ChannelId,
    /// Centers owning the lower and higher gate respectively.
    pub centers: (CenterCode, CenterCode),
}

impl Channel {
    pub fn code(&self) -> String {
        self.id.to_string()
    }

    pub fn endpoints(&self) -> (Gate, Gate) {
        self.id.gates()
    }

    pub fn touches(&self, center: CenterCode) -> bool {
        self.centers.0 == center || self.centers.1 == center
    }
}

/// Read-only registry over the fixed topology.
#[derive(Debug)]
pub struct Topology {
    centers: Vec<Center>,
    channels: Vec<Channel>,
    owners: Vec<CenterCode>,
}

impl Topology {
    /// The process-wide registry.
    pub fn global() -> &'static Topology {
        static TOPOLOGY: OnceLock<Topology> = OnceLock::new();
        TOPOLOGY.get_or_init(Topology::build)
    }

    fn build() -> Self {
        let mut owners = vec![CenterCode::Head; Gate::COUNT];
        let centers = CENTER_TABLE
            .iter()
            .map(|&(code, name, gates)| {
                for &g in gates {
                    owners[usize::from(g) - 1] = code;
                }
                Center {
                    code,
                    name,
                    gates: gates.iter().map(|&g| Gate::known(g)).collect(),
                }
            })
            .collect();

        let mut channels: Vec<Channel> = CHANNEL_TABLE
            .iter()
            .map(|&(a, b)| {
                let id = ChannelId::new(Gate::known(a), Gate::known(b));
                let (low, high) = id.gates();
                Channel {
                    id,
                    centers: (
                        owners[usize::from(low.number()) - 1],
                        owners[usize::from(high.number()) - 1],
                    ),
                }
            })
            .collect();
        channels.sort_by_key(|c| c.id);

        Self {
            centers,
            channels,
            owners,
        }
    }

    // -----------------------------------------------------------------------
    // Typed access (total over the closed domain)
    // -----------------------------------------------------------------------

    pub fn center(&self, code: CenterCode) -> &Center {
        &self.centers[code.index()]
    }

    /// All nine centers in display order.
    pub fn centers(&self) -> &[Center] {
        &self.centers
    }

    /// All 36 channels, ascending by code.
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn owner(&self, gate: Gate) -> CenterCode {
        self.owners[usize::from(gate.number()) - 1]
    }

    pub fn channel_by_id(&self, id: ChannelId) -> Option<&Channel> {
        self.channels
            .binary_search_by_key(&id, |c| c.id)
            .ok()
            .map(|i| &self.channels[i])
    }

    pub fn channels_of_gate(&self, gate: Gate) -> impl Iterator<Item = &Channel> + '_ {
        self.channels.iter().filter(move |c| c.id.contains(gate))
    }

    pub fn channels_of_center(&self, center: CenterCode) -> impl Iterator<Item = &Channel> + '_ {
        self.channels.iter().filter(move |c| c.touches(center))
    }

    /// Partner gates of `gate` across every channel it belongs to.
    pub fn harmonic(&self, gate: Gate) -> Vec<Gate> {
        self.channels_of_gate(gate)
            .filter_map(|c| c.id.partner(gate))
            .collect()
    }

    /// Gate diametrically opposite on the wheel (Sun ↔ Earth).
    pub fn opposite_gate(&self, gate: Gate) -> Gate {
        let position = WHEEL
            .iter()
            .position(|&g| g == gate.number())
            .unwrap_or_default();
        Gate::known(WHEEL[(position + WHEEL.len() / 2) % WHEEL.len()])
    }

    /// Gate and line at an ecliptic longitude in degrees; any value wraps.
    pub fn gate_line_at(&self, longitude: f64) -> (Gate, Line) {
        let adjusted = (longitude - WHEEL_START).rem_euclid(360.0);
        let position = ((adjusted / GATE_ARC) as usize).min(WHEEL.len() - 1);
        let line = (((adjusted % GATE_ARC) / LINE_ARC) as u8 + 1).clamp(1, 6);
        (Gate::known(WHEEL[position]), Line::known(line))
    }

    // -----------------------------------------------------------------------
    // Code lookups (fail loudly on anything outside the fixed domain)
    // -----------------------------------------------------------------------

    pub fn center_of(&self, gate: i64) -> Result<&Center> {
        let gate = Gate::new(gate).map_err(|_| Error::unknown("gate", gate))?;
        Ok(self.center(self.owner(gate)))
    }

    pub fn gates_of(&self, center: &str) -> Result<&[Gate]> {
        let code: CenterCode = center.parse()?;
        Ok(self.center(code).gates())
    }

    pub fn channels_of(&self, center: &str) -> Result<Vec<&Channel>> {
        let code: CenterCode = center.parse()?;
        Ok(self.channels_of_center(code).collect())
    }

    /// Look up a channel by code; either gate order is accepted.
    pub fn channel(&self, code: &str) -> Result<&Channel> {
        let id: ChannelId = code.parse()?;
        self.channel_by_id(id)
            .ok_or_else(|| Error::unknown("channel", code))
    }

    pub fn endpoints_of(&self, channel: &str) -> Result<(Gate, Gate)> {
        Ok(self.channel(channel)?.endpoints())
    }
}
