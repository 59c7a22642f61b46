//! Activation set - the "on" gates of one chart, tagged by stream

use crate::error::Result;
use crate::topology::Topology;
use crate::types::{Body, Gate, Line, Stream};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One observed activation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activation {
    pub gate: Gate,
    pub line: Line,
    pub stream: Stream,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
}

impl Activation {
    pub fn new(gate: Gate, line: Line, stream: Stream) -> Self {
        Self {
            gate,
            line,
            stream,
            body: None,
        }
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    /// Validate raw numbers from the calculation service.
    pub fn parse(gate: i64, line: i64, stream: Stream) -> Result<Self> {
        Ok(Self::new(Gate::new(gate)?, Line::new(line)?, stream))
    }
}

/// Every activation of one chart. Immutable once built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivationSet {
    activations: Vec<Activation>,
    /// First line seen per gate, indexed by stream.
    lines: BTreeMap<Gate, [Option<Line>; 2]>,
}

impl ActivationSet {
    /// Build from the two raw `(gate, line)` streams.
    ///
    /// Fails with `InvalidGate` / `InvalidLine` on the first out-of-range value.
    pub fn from_streams<P, D>(personality: P, design: D) -> Result<Self>
    where
        P: IntoIterator<Item = (i64, i64)>,
        D: IntoIterator<Item = (i64, i64)>,
    {
        let mut activations = Vec::new();
        for (gate, line) in personality {
            activations.push(Activation::parse(gate, line, Stream::Personality)?);
        }
        for (gate, line) in design {
            activations.push(Activation::parse(gate, line, Stream::Design)?);
        }
        Ok(Self::from_activations(activations))
    }

    /// Build from already-validated activations.
    pub fn from_activations(activations: impl IntoIterator<Item = Activation>) -> Self {
        let activations: Vec<Activation> = activations.into_iter().collect();
        let mut lines: BTreeMap<Gate, [Option<Line>; 2]> = BTreeMap::new();
        for a in &activations {
            let slot = &mut lines.entry(a.gate).or_default()[a.stream.index()];
            if slot.is_none() {
                *slot = Some(a.line);
            }
        }
        Self { activations, lines }
    }

    /// Add an Earth activation opposite the Sun in every stream that has a
    /// tagged Sun but no tagged Earth.
    ///
    /// `sun_longitude` yields the Sun's ecliptic longitude per stream when
    /// known; Earth then sits at that longitude plus 180 degrees. Otherwise
    /// Earth takes the wheel-opposite gate and the Sun's line, which is the
    /// same point on the wheel.
    pub fn with_inferred_earth<F>(self, topology: &Topology, sun_longitude: F) -> Self
    where
        F: Fn(Stream) -> Option<f64>,
    {
        let mut activations = self.activations;
        for stream in Stream::ALL {
            let tagged = |body| {
                activations
                    .iter()
                    .find(|a| a.stream == stream && a.body == Some(body))
                    .copied()
            };
            if tagged(Body::Earth).is_some() {
                continue;
            }
            let Some(sun) = tagged(Body::Sun) else {
                continue;
            };
            let (gate, line) = match sun_longitude(stream) {
                Some(longitude) => topology.gate_line_at(longitude + 180.0),
                None => (topology.opposite_gate(sun.gate), sun.line),
            };
            activations.push(Activation::new(gate, line, stream).with_body(Body::Earth));
        }
        Self::from_activations(activations)
    }

    pub fn is_active(&self, gate: Gate) -> bool {
        self.lines.contains_key(&gate)
    }

    pub fn is_active_in(&self, gate: Gate, stream: Stream) -> bool {
        self.line_of(gate, stream).is_some()
    }

    pub fn line_of(&self, gate: Gate, stream: Stream) -> Option<Line> {
        self.lines.get(&gate).and_then(|l| l[stream.index()])
    }

    /// Union over both streams.
    pub fn active_gates(&self) -> BTreeSet<Gate> {
        self.lines.keys().copied().collect()
    }

    pub fn gates_in(&self, stream: Stream) -> BTreeSet<Gate> {
        self.lines
            .iter()
            .filter(|(_, l)| l[stream.index()].is_some())
            .map(|(g, _)| *g)
            .collect()
    }

    /// Activations of one stream in arrival order.
    pub fn activations(&self, stream: Stream) -> impl Iterator<Item = &Activation> + '_ {
        self.activations.iter().filter(move |a| a.stream == stream)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Activation> + '_ {
        self.activations.iter()
    }

    pub fn find_body(&self, stream: Stream, body: Body) -> Option<&Activation> {
        self.activations(stream).find(|a| a.body == Some(body))
    }

    pub fn len(&self) -> usize {
        self.activations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activations.is_empty()
    }
}
