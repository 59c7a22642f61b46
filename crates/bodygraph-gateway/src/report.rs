//! Chart report assembled from one activation set

use bodygraph_client::CalculationResponse;
use bodygraph_core::{
    gates_by_center, project, resolve, summarize, Activation, ActivationSet, Body, CenterCode,
    CenterGates, ChannelId, ChartLayout, Gate, ResolvedGraph, Stream, Summary, Topology,
};
use serde::{Deserialize, Serialize};

/// One activation as submitted directly to `/api/resolve`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawActivation {
    pub gate: i64,
    pub line: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecliptic_longitude: Option<f64>,
}

impl RawActivation {
    fn is_sun(&self) -> bool {
        self.body.as_deref().and_then(|b| b.parse::<Body>().ok()) == Some(Body::Sun)
    }

    fn to_activation(&self, stream: Stream) -> bodygraph_core::Result<Activation> {
        let activation = Activation::parse(self.gate, self.line, stream)?;
        match &self.body {
            Some(name) => Ok(activation.with_body(name.parse::<Body>()?)),
            None => Ok(activation),
        }
    }
}

/// Pre-computed activation streams, bypassing the calculation service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolveRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub personality: Vec<RawActivation>,
    #[serde(default)]
    pub design: Vec<RawActivation>,
}

impl ResolveRequest {
    /// Validated activations; a stream with a Sun but no Earth gets its Earth
    /// inferred half a turn from the Sun.
    pub fn to_activation_set(&self) -> bodygraph_core::Result<ActivationSet> {
        let personality = self
            .personality
            .iter()
            .map(|a| a.to_activation(Stream::Personality));
        let design = self.design.iter().map(|a| a.to_activation(Stream::Design));
        let activations = personality
            .chain(design)
            .collect::<bodygraph_core::Result<Vec<_>>>()?;
        Ok(ActivationSet::from_activations(activations)
            .with_inferred_earth(Topology::global(), |stream| self.sun_longitude(stream)))
    }

    fn sun_longitude(&self, stream: Stream) -> Option<f64> {
        let raw = match stream {
            Stream::Personality => &self.personality,
            Stream::Design => &self.design,
        };
        raw.iter()
            .find(|a| a.is_sun())
            .and_then(|a| a.ecliptic_longitude)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CenterReport {
    pub code: CenterCode,
    pub name: &'static str,
    pub defined: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChannelReport {
    pub code: ChannelId,
    pub centers: (CenterCode, CenterCode),
}

/// `gate.line` labels per stream
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GateReport {
    pub personality: Vec<String>,
    pub design: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartReport {
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculation_source: Option<String>,
    pub centers: Vec<CenterReport>,
    pub channels: Vec<ChannelReport>,
    pub hanging_gates: Vec<Gate>,
    pub gates: GateReport,
    pub gates_by_center: Vec<CenterGates>,
    pub summary: Summary,
    pub layout: ChartLayout,
}

impl ChartReport {
    pub fn build(name: Option<String>, activations: &ActivationSet) -> Self {
        let topology = Topology::global();
        let graph = resolve(activations, topology);
        Self::from_graph(name, &graph, activations, topology)
    }

    /// Report for a calculation service response. Fails only when the
    /// service returned gates, lines or bodies outside the fixed domain.
    pub fn from_response(response: &CalculationResponse) -> bodygraph_core::Result<Self> {
        let activations = response.to_activation_set()?;
        let mut report = Self::build(response.name.clone(), &activations);
        report.calculation_source = response.calculation_source.clone();
        Ok(report)
    }

    fn from_graph(
        name: Option<String>,
        graph: &ResolvedGraph,
        activations: &ActivationSet,
        topology: &Topology,
    ) -> Self {
        let centers = topology
            .centers()
            .iter()
            .map(|c| CenterReport {
                code: c.code,
                name: c.name,
                defined: graph.is_defined(c.code),
            })
            .collect();

        let channels = graph
            .complete_channels
            .iter()
            .filter_map(|id| topology.channel_by_id(*id))
            .map(|ch| ChannelReport {
                code: ch.id,
                centers: ch.centers,
            })
            .collect();

        let layout = project(graph, activations, topology);
        let labels = |labels: &[bodygraph_core::GateLabel]| {
            labels.iter().map(ToString::to_string).collect::<Vec<_>>()
        };
        let gates = GateReport {
            personality: labels(&layout.personality_gates),
            design: labels(&layout.design_gates),
        };

        Self {
            first_name: name,
            calculation_source: None,
            centers,
            channels,
            hanging_gates: graph.hanging_gates.iter().copied().collect(),
            gates,
            gates_by_center: gates_by_center(activations, topology),
            summary: summarize(graph, activations, topology),
            layout,
        }
    }

    pub fn defined_centers(&self) -> impl Iterator<Item = CenterCode> + '_ {
        self.centers.iter().filter(|c| c.defined).map(|c| c.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_body_is_checked() {
        let raw = RawActivation {
            gate: 1,
            line: 1,
            body: Some("Pluto".into()),
            ecliptic_longitude: None,
        };
        assert_eq!(
            raw.to_activation(Stream::Design).unwrap().body,
            Some(Body::Pluto)
        );
        let raw = RawActivation {
            body: Some("Planet X".into()),
            ..raw
        };
        assert!(raw.to_activation(Stream::Design).is_err());
    }
}
