use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use gestpipe_core::collector::PendingSubmission;
use gestpipe_core::evaluator::SessionStats;

pub fn practice_summary(target: &str, stats: &SessionStats) -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Result"),
        Cell::new("Code"),
        Cell::new("Message"),
    ]);

    for o in &stats.outcomes {
        let verdict = if o.correct {
            Cell::new("correct").fg(Color::Green)
        } else {
            Cell::new("wrong").fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(o.index).set_alignment(CellAlignment::Right),
            verdict,
            Cell::new(o.error_code.as_deref().unwrap_or("-")),
            Cell::new(&o.message),
        ]);
    }

    table.add_row(vec![
        Cell::new(target).add_attribute(Attribute::Bold),
        Cell::new(format!("{}/{}", stats.correct, stats.attempt_count)),
        Cell::new(format!("{} wrong", stats.wrong)),
        Cell::new(format!("{}% accuracy", stats.accuracy_percent())).fg(Color::Cyan),
    ]);
    table
}

pub fn pending_submissions(pending: &[PendingSubmission]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Gesture").add_attribute(Attribute::Bold),
        Cell::new("Samples"),
        Cell::new("Validation"),
        Cell::new("Raw file"),
        Cell::new("Master file"),
    ]);
    for p in pending {
        table.add_row(vec![
            Cell::new(&p.label),
            Cell::new(p.sample_count).set_alignment(CellAlignment::Right),
            Cell::new(p.validation.as_deref().unwrap_or("-")),
            Cell::new(p.raw_file.as_deref().unwrap_or("-")),
            Cell::new(p.master_file.as_deref().unwrap_or("-")),
        ]);
    }
    table
}
