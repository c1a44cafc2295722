//! Network serialization — render derived networks for SNA tools.
//!
//! ```text
//! [Network, ...] → write_networks(format) → CSV edge list
//!                                         → tab-delimited matrix
//!                                         → GraphML (one graph per slice/layer)
//!                                         → JSON
//! ```
//!
//! One-mode layers store each pair once; matrix output mirrors them.

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::*;
use crate::{Error, Result};

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma-separated `slice,layer,source,target,weight` rows.
    #[default]
    Csv,
    /// Tab-delimited matrices with a header row and column of labels.
    Matrix,
    GraphMl,
    Json,
}

impl OutputFormat {
    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Matrix => "matrix",
            OutputFormat::GraphMl => "graphml",
            OutputFormat::Json => "json",
        }
    }

    /// Guess a format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(OutputFormat::Csv),
            "tsv" | "txt" | "dl" => Some(OutputFormat::Matrix),
            "graphml" | "xml" => Some(OutputFormat::GraphMl),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" | "edgelist" => Ok(OutputFormat::Csv),
            "matrix" => Ok(OutputFormat::Matrix),
            "graphml" => Ok(OutputFormat::GraphMl),
            "json" => Ok(OutputFormat::Json),
            other => Err(Error::Serialization(format!("unknown output format '{other}'"))),
        }
    }
}

/// Write networks in the given format.
pub fn write_networks(networks: &[Network], format: OutputFormat, writer: &mut dyn Write) -> Result<()> {
    match format {
        OutputFormat::Csv => write_edge_list(networks, writer),
        OutputFormat::Matrix => write_matrix(networks, writer),
        OutputFormat::GraphMl => write_graphml(networks, writer),
        OutputFormat::Json => write_json(networks, writer),
    }
}

/// Write networks to `path` atomically.
///
/// Output goes to a temporary file in the same directory, which is renamed
/// over `path` only once it is complete. On any failure `path` is left
/// untouched and the temporary file is removed.
pub fn write_file(networks: &[Network], format: OutputFormat, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut writer = std::io::BufWriter::new(tmp.as_file_mut());
        write_networks(networks, format, &mut writer)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    tracing::debug!(path = %path.display(), format = %format, "output written");
    Ok(())
}

/// Weight at matrix cell (r, c), mirroring one-mode layers.
fn cell(network: &Network, layer: &Layer, r: usize, c: usize) -> Weight {
    let key = if network.is_one_mode() { (r.min(c), r.max(c)) } else { (r, c) };
    layer.edges.get(&key).copied().unwrap_or(0)
}

// ============================================================================
// CSV edge list
// ============================================================================

pub fn write_edge_list(networks: &[Network], writer: &mut dyn Write) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["slice", "layer", "source", "target", "weight"])
        .map_err(csv_error)?;
    for network in networks {
        let slice = network.label.to_string();
        for layer in &network.layers {
            for (source, target, weight) in network.edges(layer.kind) {
                csv.write_record([
                    slice.as_str(),
                    layer.kind.name(),
                    source,
                    target,
                    weight.to_string().as_str(),
                ])
                .map_err(csv_error)?;
            }
        }
    }
    csv.flush()?;
    Ok(())
}

fn csv_error(e: csv::Error) -> Error {
    Error::Serialization(format!("csv: {e}"))
}

// ============================================================================
// Matrix
// ============================================================================

pub fn write_matrix(networks: &[Network], writer: &mut dyn Write) -> Result<()> {
    let mut first = true;
    for network in networks {
        for layer in &network.layers {
            if !first {
                writeln!(writer)?;
            }
            first = false;

            writeln!(writer, "# slice: {}", network.label)?;
            writeln!(writer, "# layer: {}", layer.kind)?;
            let header: Vec<String> = network.columns.iter().map(matrix_label).collect();
            writeln!(writer, "\t{}", header.join("\t"))?;
            for (r, row) in network.rows.iter().enumerate() {
                let cells: Vec<String> = (0..network.columns.len())
                    .map(|c| cell(network, layer, r, c).to_string())
                    .collect();
                writeln!(writer, "{}\t{}", matrix_label(row), cells.join("\t"))?;
            }
        }
    }
    Ok(())
}

fn matrix_label(label: &str) -> String {
    label.replace(['\t', '\n', '\r'], " ")
}

// ============================================================================
// GraphML
// ============================================================================

pub fn write_graphml(networks: &[Network], writer: &mut dyn Write) -> Result<()> {
    writeln!(writer, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(writer, r#"<graphml xmlns="http://graphml.graphdrawing.org/xmlns">"#)?;
    writeln!(writer, r#"  <key id="slice" for="graph" attr.name="slice" attr.type="string"/>"#)?;
    writeln!(writer, r#"  <key id="layer" for="graph" attr.name="layer" attr.type="string"/>"#)?;
    writeln!(writer, r#"  <key id="label" for="node" attr.name="label" attr.type="string"/>"#)?;
    writeln!(writer, r#"  <key id="mode" for="node" attr.name="mode" attr.type="int"/>"#)?;
    writeln!(writer, r#"  <key id="weight" for="edge" attr.name="weight" attr.type="long"/>"#)?;

    for (i, network) in networks.iter().enumerate() {
        for layer in &network.layers {
            writeln!(writer, r#"  <graph id="g{i}-{}" edgedefault="undirected">"#, layer.kind)?;
            writeln!(writer, r#"    <data key="slice">{}</data>"#, xml_escape(&network.label.to_string()))?;
            writeln!(writer, r#"    <data key="layer">{}</data>"#, layer.kind)?;

            for (r, label) in network.rows.iter().enumerate() {
                write_graphml_node(writer, &format!("r{r}"), label, 1)?;
            }
            if !network.is_one_mode() {
                for (c, label) in network.columns.iter().enumerate() {
                    write_graphml_node(writer, &format!("c{c}"), label, 2)?;
                }
            }

            let target_prefix = if network.is_one_mode() { 'r' } else { 'c' };
            for (&(r, c), weight) in &layer.edges {
                writeln!(
                    writer,
                    r#"    <edge source="r{r}" target="{target_prefix}{c}"><data key="weight">{weight}</data></edge>"#,
                )?;
            }
            writeln!(writer, "  </graph>")?;
        }
    }
    writeln!(writer, "</graphml>")?;
    Ok(())
}

fn write_graphml_node(writer: &mut dyn Write, id: &str, label: &str, mode: u8) -> Result<()> {
    writeln!(
        writer,
        r#"    <node id="{id}"><data key="label">{}</data><data key="mode">{mode}</data></node>"#,
        xml_escape(label),
    )?;
    Ok(())
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

// ============================================================================
// JSON
// ============================================================================

#[derive(Serialize)]
struct JsonNetwork<'a> {
    slice: &'a SliceLabel,
    slice_text: String,
    network_type: NetworkType,
    rows: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    columns: Option<&'a [String]>,
    layers: Vec<JsonLayer<'a>>,
}

#[derive(Serialize)]
struct JsonLayer<'a> {
    kind: LayerKind,
    edges: Vec<JsonEdge<'a>>,
}

#[derive(Serialize)]
struct JsonEdge<'a> {
    source: &'a str,
    target: &'a str,
    weight: Weight,
}

pub fn write_json(networks: &[Network], writer: &mut dyn Write) -> Result<()> {
    let docs: Vec<JsonNetwork<'_>> = networks
        .iter()
        .map(|n| JsonNetwork {
            slice: &n.label,
            slice_text: n.label.to_string(),
            network_type: n.network_type,
            rows: n.rows.as_slice(),
            columns: (!n.is_one_mode()).then(|| n.columns.as_slice()),
            layers: n
                .layers
                .iter()
                .map(|l| JsonLayer {
                    kind: l.kind,
                    edges: n
                        .edges(l.kind)
                        .into_iter()
                        .map(|(source, target, weight)| JsonEdge { source, target, weight })
                        .collect(),
                })
                .collect(),
        })
        .collect();
    serde_json::to_writer_pretty(&mut *writer, &docs)?;
    writeln!(writer)?;
    Ok(())
}
