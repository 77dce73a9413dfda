use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;

use entitygen::{load_manifest_with_base, EntityGenerator, FileReport};

use crate::output::{GlobalOptions, OutputManager, TableDisplay};
use crate::theme::ICONS;

#[derive(Args)]
pub struct GenerateArgs {
    /// Path to the TOML schema manifest
    pub manifest: PathBuf,

    /// Resolve relative class paths against this directory instead of
    /// the manifest's directory
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Do not back up existing files to <file>~ before overwriting
    #[arg(long)]
    pub no_backup: bool,

    /// Spaces per indent level in generated code
    #[arg(long, default_value_t = 4)]
    pub spaces: usize,

    /// Prefix for metadata annotations in generated docblocks
    #[arg(long, default_value = "")]
    pub annotation_prefix: String,
}

#[derive(Serialize)]
struct GenerateReport {
    reports: Vec<FileReport>,
}

pub fn handle_generate(args: GenerateArgs, output: &OutputManager) -> Result<()> {
    let classes = load_manifest_with_base(&args.manifest, args.dir.as_deref())?;

    if classes.is_empty() {
        output.warning("Manifest contains no classes; nothing to do.");
        return Ok(());
    }

    output.heading("Regenerating entity classes");

    let generator = EntityGenerator::new()
        .backup_existing(!args.no_backup)
        .num_spaces(args.spaces)
        .annotation_prefix(args.annotation_prefix);

    let reports = generator.generate(&classes);

    if !output.is_json() {
        for report in &reports {
            describe(report, output);
        }
    }

    let failed = reports.iter().filter(|r| r.is_err()).count();
    let generated: usize = reports.iter().map(|r| r.generated).sum();

    let report = GenerateReport { reports };
    output.display(&report)?;

    if failed > 0 {
        anyhow::bail!("{failed} of {} file(s) failed", report.reports.len());
    }

    output.success(&format!(
        "Processed {} file(s), generated {generated} member(s)",
        report.reports.len()
    ));
    Ok(())
}

fn describe(report: &FileReport, output: &OutputManager) {
    let path = report.path.display();
    if let Some(error) = &report.error {
        output.error(&format!("{}: {error}", report.class));
    } else if report.changed {
        output.indented(
            ICONS.changed,
            &format!("{} ({path}): {} new member(s)", report.class, report.generated),
        );
    } else {
        output.indented(ICONS.success, &format!("{} ({path}): up to date", report.class));
    }
}

impl TableDisplay for GenerateReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = Table::new();
        if !options.no_color {
            table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
        } else {
            table.load_preset(comfy_table::presets::ASCII_FULL);
        }
        table.set_header(vec!["Class", "Path", "Generated", "Status"]);

        for report in &self.reports {
            let status = match &report.error {
                Some(error) => format!("failed: {error}"),
                None if report.changed => "updated".to_string(),
                None => "unchanged".to_string(),
            };
            table.add_row(vec![
                Cell::new(&report.class),
                Cell::new(report.path.display().to_string()),
                Cell::new(report.generated.to_string()),
                Cell::new(status),
            ]);
        }

        table
    }

    fn to_compact(&self) -> String {
        let failed = self.reports.iter().filter(|r| r.is_err()).count();
        let generated: usize = self.reports.iter().map(|r| r.generated).sum();
        format!(
            "files: {}, generated: {generated}, failed: {failed}",
            self.reports.len()
        )
    }
}
