//! Layout projector - static node geometry plus per-chart fill, edges and labels
//!
//! Reads already-resolved state only. Coordinates live here, apart from the
//! logical topology, so the resolver never depends on a visual layout.

use crate::activation::ActivationSet;
use crate::resolver::ResolvedGraph;
use crate::topology::{Channel, Topology};
use crate::types::{CenterCode, ChannelId, Gate, Line, Stream};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub const CANVAS_WIDTH: f64 = 480.0;
pub const CANVAS_HEIGHT: f64 = 580.0;

/// Gap between parallel edges joining the same two centers.
const EDGE_SPACING: f64 = 6.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Triangle,
    Square,
    Diamond,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Node box. `x` is the horizontal middle, `y` the top edge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct NodeGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub shape: Shape,
    /// Distance of a triangle's apex below `y`.
    pub apex_inset: f64,
}

impl NodeGeometry {
    const fn new(x: f64, y: f64, width: f64, height: f64, shape: Shape) -> Self {
        Self {
            x,
            y,
            width,
            height,
            shape,
            apex_inset: 0.0,
        }
    }

    fn with_apex_inset(mut self, inset: f64) -> Self {
        self.apex_inset = inset;
        self
    }

    /// Geometric middle of the box; edges attach here.
    pub fn anchor(&self) -> Point {
        Point {
            x: self.x,
            y: self.y + self.height / 2.0,
        }
    }

    /// Outline vertices, clockwise from the top.
    pub fn polygon(&self) -> Vec<Point> {
        let half = self.width / 2.0;
        let (x, y, h) = (self.x, self.y, self.height);
        let p = |x, y| Point { x, y };
        match self.shape {
            Shape::Triangle => vec![
                p(x, y + self.apex_inset),
                p(x + half, y + h),
                p(x - half, y + h),
            ],
            Shape::Square => vec![
                p(x - half, y),
                p(x + half, y),
                p(x + half, y + h),
                p(x - half, y + h),
            ],
            Shape::Diamond => vec![
                p(x, y),
                p(x + half, y + h / 2.0),
                p(x, y + h),
                p(x - half, y + h / 2.0),
            ],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Fill {
    Defined,
    Open,
}

/// Hand-tuned node table.
pub fn node_geometry(center: CenterCode) -> NodeGeometry {
    use Shape::*;
    match center {
        CenterCode::Head => NodeGeometry::new(200.0, 20.0, 80.0, 50.0, Triangle).with_apex_inset(10.0),
        CenterCode::Ajna => NodeGeometry::new(200.0, 90.0, 80.0, 50.0, Triangle).with_apex_inset(10.0),
        CenterCode::Throat => NodeGeometry::new(200.0, 170.0, 80.0, 50.0, Square),
        CenterCode::G => NodeGeometry::new(200.0, 280.0, 80.0, 80.0, Diamond),
        CenterCode::Heart => NodeGeometry::new(100.0, 240.0, 70.0, 50.0, Triangle),
        CenterCode::Sacral => NodeGeometry::new(200.0, 390.0, 80.0, 60.0, Square),
        CenterCode::Spleen => NodeGeometry::new(100.0, 330.0, 70.0, 50.0, Triangle),
        CenterCode::SolarPlexus => NodeGeometry::new(300.0, 330.0, 70.0, 50.0, Triangle),
        CenterCode::Root => NodeGeometry::new(200.0, 480.0, 80.0, 50.0, Square),
    }
}

pub fn node_fill(center: CenterCode, graph: &ResolvedGraph) -> Fill {
    if graph.is_defined(center) {
        Fill::Defined
    } else {
        Fill::Open
    }
}

/// Drawable connection for one complete channel
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Edge {
    pub channel: ChannelId,
    /// Owners of the lower and higher gate, as on the channel itself.
    pub centers: (CenterCode, CenterCode),
    pub from: Point,
    pub to: Point,
}

/// Complete channels in ascending code order, with endpoint positions.
///
/// Parallel channels between the same two centers are fanned out sideways
/// so each stays visible. `from` is the anchor of the channel's first center.
pub fn edge_list(graph: &ResolvedGraph, topology: &Topology) -> Vec<Edge> {
    let mut bundles: BTreeMap<(CenterCode, CenterCode), Vec<&Channel>> = BTreeMap::new();
    for &id in &graph.complete_channels {
        if let Some(channel) = topology.channel_by_id(id) {
            let (a, b) = channel.centers;
            bundles.entry((a.min(b), a.max(b))).or_default().push(channel);
        }
    }

    let mut edges = Vec::with_capacity(graph.complete_channels.len());
    for ((a, b), channels) in bundles {
        // one normal per bundle, whatever the direction of each channel
        let (pa, pb) = (node_geometry(a).anchor(), node_geometry(b).anchor());
        let (dx, dy) = (pb.x - pa.x, pb.y - pa.y);
        let len = (dx * dx + dy * dy).sqrt();
        let (nx, ny) = if len > 0.0 {
            (-dy / len, dx / len)
        } else {
            (0.0, 0.0)
        };
        let mid = (channels.len() as f64 - 1.0) / 2.0;
        for (i, channel) in channels.into_iter().enumerate() {
            let offset = (i as f64 - mid) * EDGE_SPACING;
            let shift = |p: Point| Point {
                x: p.x + nx * offset,
                y: p.y + ny * offset,
            };
            let (from, to) = channel.centers;
            edges.push(Edge {
                channel: channel.id,
                centers: channel.centers,
                from: shift(node_geometry(from).anchor()),
                to: shift(node_geometry(to).anchor()),
            });
        }
    }
    edges.sort_by_key(|e| e.channel);
    edges
}

/// `gate.line` label for the per-stream gate lists
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GateLabel {
    pub gate: Gate,
    pub line: Line,
}

impl fmt::Display for GateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.gate, self.line)
    }
}

/// Gates active in `stream`, ascending, each once.
pub fn grouped_gate_labels(activations: &ActivationSet, stream: Stream) -> Vec<GateLabel> {
    activations
        .gates_in(stream)
        .into_iter()
        .filter_map(|gate| {
            activations
                .line_of(gate, stream)
                .map(|line| GateLabel { gate, line })
        })
        .collect()
}

/// Active gates of one center, split by stream
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CenterGates {
    pub center: CenterCode,
    pub personality: Vec<GateLabel>,
    pub design: Vec<GateLabel>,
}

/// Per-stream labels grouped under their owning center, in display order.
/// Centers with no active gate are left out.
pub fn gates_by_center(activations: &ActivationSet, topology: &Topology) -> Vec<CenterGates> {
    let personality = grouped_gate_labels(activations, Stream::Personality);
    let design = grouped_gate_labels(activations, Stream::Design);
    let owned_by = |labels: &[GateLabel], center: CenterCode| {
        labels
            .iter()
            .filter(|l| topology.owner(l.gate) == center)
            .copied()
            .collect::<Vec<_>>()
    };
    topology
        .centers()
        .iter()
        .map(|c| CenterGates {
            center: c.code,
            personality: owned_by(&personality, c.code),
            design: owned_by(&design, c.code),
        })
        .filter(|g| !g.personality.is_empty() || !g.design.is_empty())
        .collect()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeView {
    pub code: CenterCode,
    pub name: &'static str,
    pub geometry: NodeGeometry,
    pub fill: Fill,
}

/// Everything a renderer needs for one chart
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<NodeView>,
    pub edges: Vec<Edge>,
    pub personality_gates: Vec<GateLabel>,
    pub design_gates: Vec<GateLabel>,
}

pub fn project(graph: &ResolvedGraph, activations: &ActivationSet, topology: &Topology) -> ChartLayout {
    let nodes = topology
        .centers()
        .iter()
        .map(|center| NodeView {
            code: center.code,
            name: center.name,
            geometry: node_geometry(center.code),
            fill: node_fill(center.code, graph),
        })
        .collect();

    ChartLayout {
        width: CANVAS_WIDTH,
        height: CANVAS_HEIGHT,
        nodes,
        edges: edge_list(graph, topology),
        personality_gates: grouped_gate_labels(activations, Stream::Personality),
        design_gates: grouped_gate_labels(activations, Stream::Design),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_are_distinct() {
        for a in CenterCode::ALL {
            for b in CenterCode::ALL {
                if a != b {
                    assert_ne!(node_geometry(a).anchor(), node_geometry(b).anchor());
                }
            }
        }
    }

    #[test]
    fn polygon_vertex_count_follows_shape() {
        assert_eq!(node_geometry(CenterCode::Head).polygon().len(), 3);
        assert_eq!(node_geometry(CenterCode::Throat).polygon().len(), 4);
        assert_eq!(node_geometry(CenterCode::G).polygon().len(), 4);
    }

    #[test]
    fn head_and_ajna_apex_sits_below_the_box_top() {
        let head = node_geometry(CenterCode::Head).polygon();
        assert_eq!(head[0], Point { x: 200.0, y: 30.0 });
        assert_eq!(head[1], Point { x: 240.0, y: 70.0 });
        assert_eq!(node_geometry(CenterCode::Ajna).polygon()[0], Point { x: 200.0, y: 100.0 });
        assert_eq!(node_geometry(CenterCode::Heart).polygon()[0], Point { x: 100.0, y: 240.0 });
    }

    #[test]
    fn gate_label_display() {
        let label = GateLabel {
            gate: Gate::known(34),
            line: Line::new(2).unwrap(),
        };
        assert_eq!(label.to_string(), "34.2");
    }
}
