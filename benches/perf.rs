use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use star_desk::api::parse_team_members_json;
use star_desk::csv_table::CsvTable;
use star_desk::selection::SelectionState;

fn report_text(rows: usize) -> String {
    let mut out = String::from("member,email,stars,last_session\n");
    for i in 0..rows {
        out.push_str(&format!("Member {i},m{i}@example.com,{},2026-10-{:02}\n", i % 7, i % 28 + 1));
    }
    out
}

fn members_json(count: usize) -> String {
    let items = (0..count)
        .map(|i| format!(r#"{{"id":"m-{i}","name":"Member {i}","email":"m{i}@example.com"}}"#))
        .collect::<Vec<_>>()
        .join(",");
    format!("[{items}]")
}

fn bench_csv_parse(c: &mut Criterion) {
    let text = report_text(2_000);
    c.bench_function("csv_table_parse_2k", |b| {
        b.iter(|| {
            let table = CsvTable::parse(black_box(&text));
            black_box(table.rows.len());
        })
    });
}

fn bench_members_and_selection(c: &mut Criterion) {
    let raw = members_json(500);
    c.bench_function("members_parse_seed_toggle", |b| {
        b.iter(|| {
            let members = parse_team_members_json(black_box(&raw)).unwrap();
            let mut selection = SelectionState::from_members(&members);
            for member in members.iter().step_by(3) {
                selection.toggle(&member.id);
            }
            black_box(selection.assignments().len());
        })
    });
}

criterion_group!(benches, bench_csv_parse, bench_members_and_selection);
criterion_main!(benches);
