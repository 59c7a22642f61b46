//! SVG rendering of a projected chart layout

use bodygraph_core::{ChartLayout, Fill, GateLabel, Point};

pub const DEFINED_FILL: &str = "#2C3E50";
pub const OPEN_FILL: &str = "white";
const STROKE: &str = "#2C3E50";
const EDGE_STROKE: &str = "#8B95A5";
const LABEL_STEP: f64 = 14.0;

pub fn render_svg(layout: &ChartLayout) -> String {
    let mut out = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {w} {h}\" width=\"{w}\" height=\"{h}\">\n",
        w = layout.width,
        h = layout.height
    );

    // edges go underneath the nodes
    out.push_str("<g class=\"channels\">\n");
    for edge in &layout.edges {
        out.push_str(&format!(
            "<line data-channel=\"{}\" x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"3\" opacity=\"0.6\"/>\n",
            edge.channel, edge.from.x, edge.from.y, edge.to.x, edge.to.y, EDGE_STROKE
        ));
    }
    out.push_str("</g>\n");

    out.push_str("<g class=\"centers\">\n");
    for node in &layout.nodes {
        let fill = match node.fill {
            Fill::Defined => DEFINED_FILL,
            Fill::Open => OPEN_FILL,
        };
        out.push_str(&format!(
            "<polygon data-center=\"{}\" points=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"2\"/>\n",
            node.code.as_str(),
            points(&node.geometry.polygon()),
            fill,
            STROKE
        ));
        let g = &node.geometry;
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"10\" fill=\"{}\">{}</text>\n",
            g.x,
            g.y + g.height + 15.0,
            STROKE,
            escape(node.name)
        ));
    }
    out.push_str("</g>\n");

    label_column(&mut out, "design", "Design", 40.0, &layout.design_gates);
    label_column(
        &mut out,
        "personality",
        "Personality",
        layout.width - 40.0,
        &layout.personality_gates,
    );

    out.push_str("</svg>\n");
    out
}

fn label_column(out: &mut String, class: &str, title: &str, x: f64, labels: &[GateLabel]) {
    out.push_str(&format!(
        "<g class=\"{}\" font-size=\"10\" text-anchor=\"middle\" fill=\"{}\">\n",
        class, STROKE
    ));
    out.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" font-weight=\"bold\">{}</text>\n",
        x, LABEL_STEP, title
    ));
    for (i, label) in labels.iter().enumerate() {
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\">{}</text>\n",
            x,
            LABEL_STEP * (i as f64 + 2.0),
            label
        ));
    }
    out.push_str("</g>\n");
}

fn points(polygon: &[Point]) -> String {
    polygon
        .iter()
        .map(|p| format!("{:.1},{:.1}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("a<b & \"c\">"), "a&lt;b &amp; &quot;c&quot;&gt;");
    }

    #[test]
    fn points_are_space_separated() {
        let poly = [Point { x: 1.0, y: 2.0 }, Point { x: 3.5, y: 4.3 }];
        assert_eq!(points(&poly), "1.0,2.0 3.5,4.3");
    }
}
