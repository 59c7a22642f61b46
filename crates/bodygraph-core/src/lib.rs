//! Bodygraph Core - topology, activation sets, definition resolver and layout

pub mod activation;
pub mod error;
pub mod layout;
pub mod resolver;
pub mod summary;
pub mod topology;
pub mod types;

pub use activation::{Activation, ActivationSet};
pub use error::{Error, Result};
pub use layout::{
    edge_list, gates_by_center, grouped_gate_labels, node_fill, node_geometry, project,
    CenterGates, ChartLayout, Edge, Fill, GateLabel, NodeGeometry, NodeView, Point, Shape,
};
pub use resolver::{resolve, ResolvedGraph};
pub use summary::{summarize, Angle, Authority, ChartType, IncarnationCross, Profile, Summary};
pub use topology::{Center, Channel, Topology};
pub use types::*;
