use std::fs;

use star_desk::config::ApiConfig;
use star_desk::csv_table::CsvTable;
use star_desk::gate::check_date_range;
use star_desk::provider::{ball_collection_message, handle_command};
use star_desk::report_export::{cell_index, export_report, report_file_stem};
use star_desk::state::{Delta, ProviderCommand, StarsReport};

fn report(team_id: &str) -> StarsReport {
    let raw = "member,stars\nAda,3\n".to_string();
    StarsReport {
        team_id: team_id.to_string(),
        range: check_date_range("2026-10-01", "2026-10-31").expect("range"),
        table: CsvTable::parse(&raw),
        raw,
    }
}

#[test]
fn file_stem_is_filesystem_safe() {
    assert_eq!(
        report_file_stem(&report("team/7")),
        "stars_report_team_7_2026-10-01_2026-10-31"
    );
}

#[test]
fn writes_csv_and_workbook() {
    let dir = std::env::temp_dir().join(format!("star_desk_export_{}", std::process::id()));
    let paths = export_report(&dir, &report("team-7")).expect("export");
    assert_eq!(
        fs::read_to_string(&paths.csv).expect("csv written"),
        "member,stars\nAda,3\n"
    );
    assert!(fs::metadata(&paths.xlsx).expect("xlsx written").len() > 0);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn worker_handles_ball_collection_without_network() {
    let range = check_date_range("2026-10-01", "2026-10-02").expect("range");
    let deltas = handle_command(
        &ApiConfig::default(),
        ProviderCommand::RequestBallCollection {
            team_id: "team-9".to_string(),
            range,
        },
    );
    assert_eq!(deltas.len(), 1);
    let Delta::BallCollectionRequested { message } = &deltas[0] else {
        panic!("expected ball collection delta");
    };
    assert_eq!(
        message,
        &ball_collection_message("team-9", "2026-10-01".to_string(), "2026-10-02".to_string())
    );
    assert_eq!(
        message,
        "retrieving ball collection services for team team-9 from dates 2026-10-01 to 2026-10-02"
    );
}

#[test]
fn oversized_cell_positions_are_rejected() {
    assert_eq!(cell_index(3, 2).expect("fits"), (3, 2));
    let err = cell_index(0, usize::from(u16::MAX) + 1).unwrap_err();
    assert!(err.to_string().contains("report column 65536"));
    if let Ok(row) = usize::try_from(u64::from(u32::MAX) + 1) {
        assert!(cell_index(row, 0).is_err());
    }
}
