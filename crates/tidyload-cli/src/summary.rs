use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use tidyload_ingest::{DataInfo, Preview};
use tidyload_model::{NullRendering, Value};
use tidyload_output::TableInfo;

use tidyload_cli::types::EtlResult;

pub fn print_summary(result: &EtlResult) {
    println!("Source: {}", result.csv_file.display());
    if let Some(loading) = &result.loading {
        println!("Warehouse: {}", loading.warehouse_dir.display());
    }
    if let Some(path) = &result.events_file {
        println!("Events: {}", path.display());
    }
    println!("{}", statistics_table(result));
    println!("{}", stage_table(result));
    if let Some(table) = issue_table(result) {
        println!("{table}");
    }
}

pub fn print_inspection(info: &DataInfo, preview: &Preview) {
    println!(
        "{} rows, {} columns, {} duplicate rows",
        info.total_rows, info.total_columns, info.duplicate_rows
    );
    println!("{}", column_table(info));
    println!("{}", preview_table(preview));
}

fn statistics_table(result: &EtlResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Phase"),
        header_cell("Metric"),
        header_cell("Value"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);

    let extraction = &result.extraction;
    table.add_row(vec![
        phase_cell("Extraction"),
        Cell::new("Rows"),
        Cell::new(extraction.total_rows),
    ]);
    table.add_row(vec![
        dim_cell(""),
        Cell::new("Columns"),
        Cell::new(extraction.total_columns),
    ]);

    let report = &result.report;
    table.add_row(vec![
        phase_cell("Transformation"),
        Cell::new("Rows in / out"),
        Cell::new(format!("{} / {}", report.initial_rows, report.final_rows)),
    ]);
    table.add_row(vec![
        dim_cell(""),
        Cell::new("Rows removed"),
        Cell::new(report.rows_removed),
    ]);
    table.add_row(vec![
        dim_cell(""),
        Cell::new("Duplicates removed"),
        Cell::new(report.duplicates_removed),
    ]);
    table.add_row(vec![
        dim_cell(""),
        Cell::new("Valid rows"),
        Cell::new(report.valid_rows),
    ]);
    table.add_row(vec![
        dim_cell(""),
        Cell::new("Data quality"),
        quality_cell(report.data_quality_score),
    ]);

    match &result.loading {
        Some(loading) => {
            table.add_row(vec![
                phase_cell("Loading"),
                Cell::new("Table"),
                Cell::new(format!(
                    "{} ({})",
                    loading.summary.table, loading.summary.disposition
                )),
            ]);
            table.add_row(vec![
                dim_cell(""),
                Cell::new("Rows loaded"),
                Cell::new(loading.summary.rows_loaded),
            ]);
            if let Some(info) = &loading.table {
                add_table_info_rows(&mut table, info);
            }
        }
        None => {
            table.add_row(vec![
                phase_cell("Loading"),
                Cell::new("Skipped"),
                dim_cell("dry run"),
            ]);
        }
    }

    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new("Elapsed"),
        Cell::new(format!("{:.2}s", result.elapsed.as_secs_f64())).add_attribute(Attribute::Bold),
    ]);
    table
}

fn add_table_info_rows(table: &mut Table, info: &TableInfo) {
    table.add_row(vec![
        dim_cell(""),
        Cell::new("Table rows"),
        Cell::new(info.num_rows),
    ]);
    table.add_row(vec![
        dim_cell(""),
        Cell::new("Table size (bytes)"),
        Cell::new(info.num_bytes),
    ]);
}

fn stage_table(result: &EtlResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Rows in"),
        header_cell("Rows out"),
        header_cell("Removed"),
        header_cell("ms"),
    ]);
    apply_table_style(&mut table);
    for index in 1..=4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for stage in &result.report.stages {
        let removed = stage.rows_in.saturating_sub(stage.rows_out);
        table.add_row(vec![
            Cell::new(stage.stage.as_str()),
            Cell::new(stage.rows_in),
            Cell::new(stage.rows_out),
            count_cell(removed, Color::Yellow),
            dim_cell(stage.duration_ms),
        ]);
    }
    table
}

fn issue_table(result: &EtlResult) -> Option<Table> {
    let report = &result.report;
    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for (rule, violations) in &report.rule_violations {
        if *violations > 0 {
            rows.push(vec![
                Cell::new("WARN").fg(Color::Yellow),
                Cell::new("business rule"),
                Cell::new(rule),
                Cell::new(violations),
            ]);
        }
    }
    for (column, count) in &report.nulled_cells {
        rows.push(vec![
            Cell::new("WARN").fg(Color::Yellow),
            Cell::new("cells nulled"),
            Cell::new(column),
            Cell::new(count),
        ]);
    }
    for (column, reason) in &report.coercion_failures {
        rows.push(vec![
            Cell::new("ERROR").fg(Color::Red),
            Cell::new("type coercion"),
            Cell::new(column),
            Cell::new(reason),
        ]);
    }
    if let Some(reason) = &report.calculation_failure {
        rows.push(vec![
            Cell::new("ERROR").fg(Color::Red),
            Cell::new("derived fields"),
            dim_cell("-"),
            Cell::new(reason),
        ]);
    }
    if rows.is_empty() {
        return None;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Kind"),
        header_cell("Subject"),
        header_cell("Detail"),
    ]);
    apply_table_style(&mut table);
    for row in rows {
        table.add_row(row);
    }
    Some(table)
}

fn column_table(info: &DataInfo) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Nulls"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for column in &info.columns {
        table.add_row(vec![
            Cell::new(&column.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(column.semantic_type.name()),
            count_cell(column.null_count, Color::Yellow),
        ]);
    }
    table
}

fn preview_table(preview: &Preview) -> Table {
    let mut table = Table::new();
    table.set_header(
        preview
            .columns
            .iter()
            .map(|name| header_cell(name))
            .collect::<Vec<_>>(),
    );
    apply_table_style(&mut table);
    for row in &preview.head {
        table.add_row(row.iter().map(value_cell).collect::<Vec<_>>());
    }
    if !preview.tail.is_empty() {
        table.add_row(preview.columns.iter().map(|_| dim_cell("...")).collect::<Vec<_>>());
        for row in &preview.tail {
            table.add_row(row.iter().map(value_cell).collect::<Vec<_>>());
        }
    }
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn phase_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn quality_cell(score: f64) -> Cell {
    let color = if score >= 95.0 {
        Color::Green
    } else if score >= 80.0 {
        Color::Yellow
    } else {
        Color::Red
    };
    Cell::new(format!("{score:.2}%")).fg(color)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count == 0 {
        dim_cell(count)
    } else {
        Cell::new(count).fg(color)
    }
}

fn value_cell(value: &Value) -> Cell {
    match value.to_text(NullRendering::Keep) {
        Some(text) => Cell::new(text),
        None => dim_cell("null"),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
