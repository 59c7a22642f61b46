//! Chart summary - type, authority, profile and incarnation cross
//!
//! Read-only interpretation of a resolved graph. Never fails: missing
//! Sun activations only drop the profile and cross.

use crate::activation::ActivationSet;
use crate::resolver::ResolvedGraph;
use crate::topology::Topology;
use crate::types::{Body, CenterCode, Gate, Line, Stream};
use serde::Serialize;
use std::collections::{BTreeSet, VecDeque};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Generator,
    ManifestingGenerator,
    Projector,
    Manifestor,
    Reflector,
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChartType::Generator => "Generator",
            ChartType::ManifestingGenerator => "Manifesting Generator",
            ChartType::Projector => "Projector",
            ChartType::Manifestor => "Manifestor",
            ChartType::Reflector => "Reflector",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Authority {
    Lunar,
    Emotional,
    Sacral,
    #[serde(rename = "spleen")]
    Splenic,
    EgoManifested,
    EgoProjected,
    SelfProjected,
    Mental,
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Authority::Lunar => "Lunar",
            Authority::Emotional => "Emotional",
            Authority::Sacral => "Sacral",
            Authority::Splenic => "Splenic",
            Authority::EgoManifested => "Ego Manifested",
            Authority::EgoProjected => "Ego Projected",
            Authority::SelfProjected => "Self Projected",
            Authority::Mental => "Mental",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Angle {
    RightAngle,
    Juxtaposition,
    LeftAngle,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub code: String,
    pub personality_line: Line,
    pub design_line: Line,
    pub keynote: String,
    pub angle: Angle,
}

impl Profile {
    pub fn new(personality_line: Line, design_line: Line) -> Self {
        let (p, d) = (personality_line.number(), design_line.number());
        let angle = match (p, d) {
            (1, 3) | (1, 4) | (2, 4) | (2, 5) | (3, 5) | (3, 6) | (4, 6) => Angle::RightAngle,
            (4, 1) => Angle::Juxtaposition,
            _ => Angle::LeftAngle,
        };
        Self {
            code: format!("{p}/{d}"),
            personality_line,
            design_line,
            keynote: format!("{} / {}", line_keynote(p), line_keynote(d)),
            angle,
        }
    }
}

fn line_keynote(line: u8) -> &'static str {
    match line {
        1 => "Investigator",
        2 => "Hermit",
        3 => "Martyr",
        4 => "Opportunist",
        5 => "Heretic",
        _ => "Role Model",
    }
}

/// Sun and Earth gates of both streams
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IncarnationCross {
    pub code: String,
    /// Personality Sun, Personality Earth, Design Sun, Design Earth.
    pub gates: [Gate; 4],
    pub angle: Angle,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub chart_type: ChartType,
    pub authority: Authority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incarnation_cross: Option<IncarnationCross>,
}

pub fn summarize(graph: &ResolvedGraph, activations: &ActivationSet, topology: &Topology) -> Summary {
    let chart_type = chart_type(graph, topology);
    let authority = authority(graph, chart_type);

    let p_sun = activations.find_body(Stream::Personality, Body::Sun);
    let d_sun = activations.find_body(Stream::Design, Body::Sun);
    let (profile, incarnation_cross) = match (p_sun, d_sun) {
        (Some(p), Some(d)) => {
            let profile = Profile::new(p.line, d.line);
            let earth = |stream: Stream, sun: Gate| {
                activations
                    .find_body(stream, Body::Earth)
                    .map(|a| a.gate)
                    .unwrap_or_else(|| topology.opposite_gate(sun))
            };
            let gates = [
                p.gate,
                earth(Stream::Personality, p.gate),
                d.gate,
                earth(Stream::Design, d.gate),
            ];
            let cross = IncarnationCross {
                code: format!("{}-{}-{}-{}", gates[0], gates[1], gates[2], gates[3]),
                gates,
                angle: profile.angle,
            };
            (Some(profile), Some(cross))
        }
        _ => (None, None),
    };

    Summary {
        chart_type,
        authority,
        profile,
        incarnation_cross,
    }
}

pub fn chart_type(graph: &ResolvedGraph, topology: &Topology) -> ChartType {
    let motor_to_throat = motor_connected_to_throat(graph, topology);
    if graph.is_defined(CenterCode::Sacral) {
        if motor_to_throat {
            ChartType::ManifestingGenerator
        } else {
            ChartType::Generator
        }
    } else if motor_to_throat {
        ChartType::Manifestor
    } else if !graph.defined_centers.is_empty() {
        ChartType::Projector
    } else {
        ChartType::Reflector
    }
}

pub fn authority(graph: &ResolvedGraph, chart_type: ChartType) -> Authority {
    if chart_type == ChartType::Reflector {
        return Authority::Lunar;
    }
    if graph.is_defined(CenterCode::SolarPlexus) {
        Authority::Emotional
    } else if graph.is_defined(CenterCode::Sacral) {
        Authority::Sacral
    } else if graph.is_defined(CenterCode::Spleen) {
        Authority::Splenic
    } else if graph.is_defined(CenterCode::Heart) {
        if chart_type == ChartType::Manifestor {
            Authority::EgoManifested
        } else {
            Authority::EgoProjected
        }
    } else if graph.is_defined(CenterCode::G) {
        Authority::SelfProjected
    } else {
        Authority::Mental
    }
}

/// Breadth-first walk from the throat over complete channels.
pub fn motor_connected_to_throat(graph: &ResolvedGraph, topology: &Topology) -> bool {
    if !graph.is_defined(CenterCode::Throat) {
        return false;
    }
    let links: Vec<(CenterCode, CenterCode)> = graph
        .complete_channels
        .iter()
        .filter_map(|id| topology.channel_by_id(*id))
        .map(|c| c.centers)
        .collect();

    let mut visited = BTreeSet::from([CenterCode::Throat]);
    let mut queue = VecDeque::from([CenterCode::Throat]);
    while let Some(current) = queue.pop_front() {
        if current.is_motor() {
            return true;
        }
        for &(a, b) in &links {
            let next = if a == current {
                b
            } else if b == current {
                a
            } else {
                continue;
            };
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    false
}
