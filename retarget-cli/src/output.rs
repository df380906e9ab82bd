use comfy_table::{presets, CellAlignment, ContentArrangement, Table};
use retarget::retarget::RunSummary;
use serde::Serialize;

/// Print `data` as JSON (if `json`) or call `display_fn` for human-readable output.
pub fn print_output<T: Serialize>(
    data: &T,
    json: bool,
    display_fn: impl FnOnce(&T),
) -> anyhow::Result<()> {
    if json {
        let json = serde_json::to_string_pretty(data)?;
        println!("{json}");
    } else {
        display_fn(data);
    }
    Ok(())
}

/// Whitespace-aligned table: first column left-aligned, counts right-aligned.
fn module_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Module", "Remapped", "Unmapped", "Accessors", "Stubs"]);

    let last = 4;
    for i in 0..=last {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(if i == 0 {
                CellAlignment::Left
            } else {
                CellAlignment::Right
            });
            let pad_left = if i == 0 { 0 } else { 1 };
            let pad_right = if i == last { 0 } else { 1 };
            col.set_padding((pad_left, pad_right));
        }
    }
    table
}

/// Human-readable run summary.
pub fn print_summary(summary: &RunSummary) {
    if !summary.modules.is_empty() {
        let mut table = module_table();
        for report in &summary.modules {
            table.add_row(vec![
                report.module.clone(),
                report.total_remapped().to_string(),
                report.unmapped.len().to_string(),
                report.accessors.len().to_string(),
                report.stubs.len().to_string(),
            ]);
        }
        for line in table.to_string().lines() {
            println!("{}", line.trim_end());
        }
        println!();
    }

    println!(
        "{} processed, {} skipped, {} errors",
        summary.processed, summary.skipped, summary.errors
    );
}
