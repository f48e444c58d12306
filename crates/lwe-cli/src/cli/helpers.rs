use super::CliError;
use anyhow::Context;
use lwe_core::common::config::{FusionConfig, FusionConfigError, load_fusion_config};
use lwe_core::domain::LweError;
use lwe_core::modules::fusion::FusionReport;
use lwe_core::modules::serialization::{BatchAxisSummary, ResultSummary};
use serde::Serialize;
use std::path::Path;

pub(super) fn load_config(path: Option<&Path>) -> Result<FusionConfig, CliError> {
    let Some(path) = path else {
        return Ok(FusionConfig::default());
    };
    load_fusion_config(path).map_err(|error| {
        let message = error.to_string();
        CliError::Compute(match error {
            FusionConfigError::Read { .. } => LweError::io("IO.FUSION_CONFIG", message),
            FusionConfigError::Parse { .. } | FusionConfigError::Invalid { .. } => {
                LweError::input_validation("INPUT.FUSION_CONFIG", message)
            }
        })
    })
}

pub(super) fn emit_summary(summary: &ResultSummary, json: bool) -> Result<(), CliError> {
    if json {
        print_json(summary)
    } else {
        print!("{}", render_summary(summary));
        Ok(())
    }
}

pub(super) fn emit_fusion_report(report: &FusionReport, json: bool) -> Result<(), CliError> {
    if json {
        print_json(&FusionReportView::from(report))
    } else {
        print!("{}", render_fusion_report(report));
        Ok(())
    }
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render JSON output")?;
    println!("{rendered}");
    Ok(())
}

pub(super) fn render_summary(summary: &ResultSummary) -> String {
    let grid = &summary.grid;
    let mut lines = vec![
        format!("Source: {}", summary.source_kind),
        format!(
            "Grid: Ntime={} Nfreq={} Nspace={} Nspace2={} Ngrid={} ({})",
            grid.ntime,
            grid.nfreq,
            grid.nspace,
            grid.nspace2,
            grid.ngrid,
            if grid.volumetric { "volumetric" } else { "planar" }
        ),
        format!("Frequency step: {:e} Hz", grid.f_step),
        format!(
            "Batch: Nsims={} Nsims2={} symmetryType={}",
            summary.nsims, summary.nsims2, summary.symmetry_type
        ),
        render_axis("Batch axis", &summary.batch_axis),
        render_axis("Batch axis 2", &summary.batch_axis2),
    ];
    match &summary.ext_shape {
        Some(shape) => lines.push(format!("Field arrays: {shape:?}")),
        None => lines.push("Field arrays: not loaded".to_string()),
    }
    lines.push(format!("Spectra: {:?}", summary.spectrum_shape));

    let mut rendered = lines.join("\n");
    rendered.push('\n');
    rendered
}

fn render_axis(label: &str, axis: &BatchAxisSummary) -> String {
    format!(
        "{label}: index {} from {:e} to {:e} ({} points)",
        axis.batch_index, axis.start, axis.destination, axis.length
    )
}

pub(super) fn render_fusion_report(report: &FusionReport) -> String {
    let mut rendered = String::new();
    for output in &report.outputs {
        let target = match &output.entry {
            Some(entry) => format!("{}:{}", output.destination.display(), entry),
            None => output.destination.display().to_string(),
        };
        rendered.push_str(&format!(
            "Fused {} ({} bytes) from {} shards:\n",
            target,
            output.bytes,
            output.shards.len()
        ));
        for shard in &output.shards {
            rendered.push_str(&format!("  {shard}\n"));
        }
    }
    rendered
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FusionReportView {
    outputs: Vec<FusedOutputView>,
    total_bytes: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FusedOutputView {
    kind: String,
    destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    entry: Option<String>,
    shards: Vec<String>,
    bytes: u64,
}

impl From<&FusionReport> for FusionReportView {
    fn from(report: &FusionReport) -> Self {
        Self {
            outputs: report
                .outputs
                .iter()
                .map(|output| FusedOutputView {
                    kind: output.kind.as_str().to_string(),
                    destination: output.destination.display().to_string(),
                    entry: output.entry.clone(),
                    shards: output.shards.clone(),
                    bytes: output.bytes,
                })
                .collect(),
            total_bytes: report.total_bytes(),
        }
    }
}
