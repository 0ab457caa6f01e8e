//! Human-readable table rendering for batch, filter, and store summaries.
//! Table styling (preset, corner/border modifiers, bold cyan headers, dim
//! cells for zero/absent values) follows `sdtm_cli::summary`'s
//! `apply_summary_table_style`/`header_cell`/`dim_cell`/`count_cell`.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use mailqual_blocklist::BlocklistStats;
use mailqual_pipeline::BatchResult;
use mailqual_store::MetadataStats;

fn apply_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).fg(Color::Cyan).add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn count_cell(value: u64, color: Color) -> Cell {
    if value > 0 {
        Cell::new(value).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(value)
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn print_batch_summary(result: &BatchResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Status"),
        header_cell("Records"),
        header_cell("Duplicates"),
        header_cell("Errors"),
    ]);
    apply_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);

    for file in &result.files {
        table.add_row(vec![
            Cell::new(&file.path),
            status_cell(file.status),
            Cell::new(file.records_read()),
            count_cell(file.duplicates_suppressed, Color::Yellow),
            count_cell(file.errors.len() as u64, Color::Red),
        ]);
    }
    println!("{table}");

    println!("Totals by classification:");
    let mut totals = Table::new();
    totals.set_header(vec![header_cell("Classification"), header_cell("Count")]);
    apply_style(&mut totals);
    align_column(&mut totals, 1, CellAlignment::Right);
    for (classification, count) in &result.totals {
        totals.add_row(vec![Cell::new(classification.to_string()), Cell::new(count)]);
    }
    println!("{totals}");
    println!(
        "{} file(s), {:.2}s wall time, {} duplicate(s) suppressed, status {:?}",
        result.files.len(),
        result.wall_time.as_secs_f64(),
        result.duplicates_suppressed,
        result.status,
    );
}

fn status_cell(status: mailqual_pipeline::FileStatus) -> Cell {
    use mailqual_pipeline::FileStatus;
    match status {
        FileStatus::Processed => Cell::new("processed").fg(Color::Green),
        FileStatus::SkippedCached => dim_cell("skipped (cached)"),
        FileStatus::Failed => Cell::new("failed").fg(Color::Red).add_attribute(Attribute::Bold),
        FileStatus::Cancelled => Cell::new("cancelled").fg(Color::Yellow),
    }
}

pub fn print_filter_summary(counts: &mailqual_filter::FilterCounts, paths: &mailqual_filter::FilterOutputPaths) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Tier"), header_cell("Count"), header_cell("File")]);
    apply_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);

    table.add_row(vec![Cell::new("high"), count_cell(counts.high as u64, Color::Green), Cell::new(paths.high.display().to_string())]);
    table.add_row(vec![Cell::new("medium"), count_cell(counts.medium as u64, Color::Cyan), Cell::new(paths.medium.display().to_string())]);
    table.add_row(vec![Cell::new("low"), count_cell(counts.low as u64, Color::Yellow), Cell::new(paths.low.display().to_string())]);
    table.add_row(vec![Cell::new("excluded"), count_cell(counts.excluded as u64, Color::Red), Cell::new(paths.excluded.display().to_string())]);
    println!("{table}");
    println!("Report: {}", paths.report.display());
}

pub fn print_error(error: &anyhow::Error) {
    eprintln!("error: {error}");
    for cause in error.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
}

pub fn print_blocklist_stats(stats: &BlocklistStats) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Kind"), header_cell("Count")]);
    apply_style(&mut table);
    table.add_row(vec![Cell::new("emails"), Cell::new(stats.email_count)]);
    table.add_row(vec![Cell::new("domains"), Cell::new(stats.domain_count)]);
    println!("{table}");
}

pub fn print_metadata_stats(stats: &MetadataStats) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Total addresses")]);
    apply_style(&mut table);
    table.add_row(vec![Cell::new(stats.total_addresses)]);
    println!("{table}");

    let mut by_country = Table::new();
    by_country.set_header(vec![header_cell("Country"), header_cell("Count")]);
    apply_style(&mut by_country);
    for (country, count) in &stats.by_country {
        by_country.add_row(vec![Cell::new(country), Cell::new(count)]);
    }
    println!("{by_country}");

    let mut by_category = Table::new();
    by_category.set_header(vec![header_cell("Category"), header_cell("Count")]);
    apply_style(&mut by_category);
    for (category, count) in &stats.by_category {
        by_category.add_row(vec![Cell::new(category), Cell::new(count)]);
    }
    println!("{by_category}");
}
