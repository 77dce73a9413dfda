use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Table};
use walkdir::WalkDir;

use entitygen::{scan, DeclarationIndex};

use crate::output::{GlobalOptions, OutputManager, TableDisplay};

#[derive(Args)]
pub struct InspectArgs {
    /// PHP file or directory to scan for class declarations
    pub path: PathBuf,
}

pub fn handle_inspect(args: InspectArgs, output: &OutputManager) -> Result<()> {
    let files = collect_php_files(&args.path)?;
    if files.is_empty() {
        output.warning(&format!("No PHP files found under {}", args.path.display()));
        return Ok(());
    }

    let mut index = DeclarationIndex::new();
    for file in &files {
        let source = fs::read_to_string(file)
            .with_context(|| format!("cannot read {}", file.display()))?;
        output.verbose(&format!("scanning {}", file.display()));
        index.merge(scan(&source));
    }

    if !output.is_json() {
        output.heading("Declared members");
    }
    output.display(&index)?;
    Ok(())
}

fn collect_php_files(path: &PathBuf) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.clone()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.with_context(|| format!("cannot walk {}", path.display()))?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == "php")
        {
            files.push(entry.path().to_path_buf());
        }
    }
    Ok(files)
}

impl TableDisplay for DeclarationIndex {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = Table::new();
        if !options.no_color {
            table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
        } else {
            table.load_preset(comfy_table::presets::ASCII_FULL);
        }
        table.set_header(vec!["Class", "Properties", "Methods"]);

        for (class, declarations) in self.classes() {
            let properties: Vec<&str> =
                declarations.properties.iter().map(String::as_str).collect();
            let methods: Vec<&str> = declarations.methods.iter().map(String::as_str).collect();
            table.add_row(vec![
                Cell::new(class),
                Cell::new(properties.join("\n")),
                Cell::new(methods.join("\n")),
            ]);
        }

        table
    }

    fn to_compact(&self) -> String {
        format!("classes: {}", self.len())
    }
}
