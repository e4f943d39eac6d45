use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use anyhow::Result;

use crate::api;
use crate::config::ApiConfig;
use crate::csv_table::CsvTable;
use crate::report_export;
use crate::state::{Delta, ProviderCommand, StarsReport};

/// Worker thread that owns all network and file I/O. One command is handled
/// at a time; it exits when the command channel closes.
pub fn spawn_provider(
    cfg: ApiConfig,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            for delta in handle_command(&cfg, cmd) {
                if tx.send(delta).is_err() {
                    return;
                }
            }
        }
    })
}

pub fn handle_command(cfg: &ApiConfig, cmd: ProviderCommand) -> Vec<Delta> {
    match cmd {
        ProviderCommand::LoadAssignment { session_id } => {
            let mut out = Vec::new();
            if let Ok(url) = api::star_sessions_url(cfg) {
                out.push(Delta::Log(format!("[INFO] Fetching star sessions from: {url}")));
            }
            match load_assignment(cfg, &session_id) {
                Ok(delta) => out.push(delta),
                Err(err) => out.push(Delta::LoadFailed(format!("{err:#}"))),
            }
            out
        }
        ProviderCommand::SubmitAssignments {
            session_id,
            assignments,
        } => {
            let mut out = Vec::new();
            if let Ok(body) = api::assignments_body_json(&session_id, &assignments) {
                out.push(Delta::Log(format!("[INFO] Submitting selection: {body}")));
            }
            let selected = assignments.iter().filter(|a| a.selected).count();
            match api::submit_assignments(cfg, &session_id, &assignments) {
                Ok(response) => out.push(Delta::AssignmentsSubmitted { selected, response }),
                Err(err) => out.push(failed("submitting star assignments", err)),
            }
            out
        }
        ProviderCommand::DownloadReport { team_id, range } => {
            let mut out = Vec::new();
            if let Ok(url) = api::stars_report_url(cfg, &team_id, &range) {
                out.push(Delta::Log(format!("[INFO] Fetching team stars from: {url}")));
            }
            match api::download_stars_report(cfg, &team_id, &range) {
                Ok(raw) => {
                    let table = CsvTable::parse(&raw);
                    out.push(Delta::ReportDownloaded(StarsReport {
                        team_id,
                        range,
                        raw,
                        table,
                    }));
                }
                Err(err) => out.push(failed("fetching team stars", err)),
            }
            out
        }
        ProviderCommand::RequestBallCollection { team_id, range } => {
            vec![Delta::BallCollectionRequested {
                message: ball_collection_message(&team_id, range.start_param(), range.end_param()),
            }]
        }
        ProviderCommand::ExportReport { dir, report } => {
            match report_export::export_report(&dir, &report) {
                Ok(paths) => vec![Delta::ReportExported {
                    csv_path: paths.csv,
                    xlsx_path: paths.xlsx,
                }],
                Err(err) => vec![failed("saving report", err)],
            }
        }
    }
}

fn load_assignment(cfg: &ApiConfig, session_id: &str) -> Result<Delta> {
    let sessions = api::fetch_star_sessions(cfg)?;
    let session = api::find_session(sessions, session_id)?;
    let members = api::fetch_team_members(cfg, &session.team_id)?;
    Ok(Delta::AssignmentLoaded { session, members })
}

fn failed(action: &str, err: anyhow::Error) -> Delta {
    Delta::RequestFailed {
        action: action.to_string(),
        error: format!("{err:#}"),
    }
}

pub fn ball_collection_message(team_id: &str, start: String, end: String) -> String {
    format!("retrieving ball collection services for team {team_id} from dates {start} to {end}")
}
