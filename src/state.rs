use std::collections::VecDeque;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::csv_table::CsvTable;
use crate::gate::{self, DateRange};
use crate::location::{self, Location, Route};
use crate::selection::SelectionState;

const MAX_LOGS: usize = 200;
const DATE_INPUT_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarSession {
    pub id: String,
    pub team_id: String,
    pub session_date: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarAssignment {
    pub team_member_id: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Error(String),
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Info,
    Error,
}

/// Blocking notification; input is swallowed until it is dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarsReport {
    pub team_id: String,
    pub range: DateRange,
    pub raw: String,
    pub table: CsvTable,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub location: String,
    pub route: Option<Route>,
    pub status: LoadStatus,
    pub team_id: Option<String>,
    pub session_id: Option<String>,
    pub session: Option<StarSession>,
    pub members: Vec<TeamMember>,
    pub selection: SelectionState,
    pub cursor: usize,
    pub start_date: String,
    pub end_date: String,
    pub focus: DateField,
    pub report: Option<StarsReport>,
    pub report_scroll: usize,
    pub in_flight: bool,
    pub alert: Option<Alert>,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
}

impl AppState {
    /// Resolves the view for `raw` and the parameter it needs. Missing or
    /// unknown pieces put the view straight into its error state.
    pub fn open(raw: &str) -> Self {
        let mut state = Self {
            location: raw.trim().to_string(),
            route: None,
            status: LoadStatus::Loading,
            team_id: None,
            session_id: None,
            session: None,
            members: Vec::new(),
            selection: SelectionState::new(),
            cursor: 0,
            start_date: String::new(),
            end_date: String::new(),
            focus: DateField::Start,
            report: None,
            report_scroll: 0,
            in_flight: false,
            alert: None,
            help_overlay: false,
            logs: VecDeque::new(),
        };

        let parsed = Location::parse(raw).and_then(|loc| loc.route().map(|route| (loc, route)));
        let (loc, route) = match parsed {
            Ok(found) => found,
            Err(err) => {
                state.status = LoadStatus::Error(err.to_string());
                return state;
            }
        };
        state.route = Some(route);

        let param = match route {
            Route::StarAssignment => location::require_param(&loc, location::STAR_SESSION_ID)
                .map(|id| state.session_id = Some(id)),
            Route::TeamStarReport | Route::BallCollection => {
                loc.team_id().map(|id| state.team_id = Some(id))
            }
        };
        state.status = match param {
            Err(err) => LoadStatus::Error(err.to_string()),
            Ok(()) if route == Route::StarAssignment => LoadStatus::Loading,
            Ok(()) => LoadStatus::Ready,
        };
        state
    }

    /// The fetch a view needs before it can render, if any.
    pub fn initial_command(&self) -> Option<ProviderCommand> {
        if self.route != Some(Route::StarAssignment) || self.status != LoadStatus::Loading {
            return None;
        }
        self.session_id
            .clone()
            .map(|session_id| ProviderCommand::LoadAssignment { session_id })
    }

    /// Refetch the session and members. Resets the selection once they land.
    pub fn reload_command(&mut self) -> Option<ProviderCommand> {
        if self.route != Some(Route::StarAssignment) || self.in_flight {
            return None;
        }
        if self.status == LoadStatus::Loading {
            self.push_log("[INFO] Load already in flight");
            return None;
        }
        let session_id = self.session_id.clone()?;
        self.status = LoadStatus::Loading;
        Some(ProviderCommand::LoadAssignment { session_id })
    }

    pub fn is_ready(&self) -> bool {
        self.status == LoadStatus::Ready
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn show_alert(&mut self, kind: AlertKind, message: impl Into<String>) {
        self.alert = Some(Alert {
            kind,
            message: message.into(),
        });
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn select_next(&mut self) {
        match self.route {
            Some(Route::StarAssignment) => {
                if !self.members.is_empty() {
                    self.cursor = (self.cursor + 1).min(self.members.len() - 1);
                }
            }
            Some(Route::TeamStarReport) => {
                let rows = self.report.as_ref().map(|r| r.table.body().len()).unwrap_or(0);
                self.report_scroll = (self.report_scroll + 1).min(rows.saturating_sub(1));
            }
            _ => {}
        }
    }

    pub fn select_prev(&mut self) {
        match self.route {
            Some(Route::StarAssignment) => self.cursor = self.cursor.saturating_sub(1),
            Some(Route::TeamStarReport) => {
                self.report_scroll = self.report_scroll.saturating_sub(1)
            }
            _ => {}
        }
    }

    pub fn selected_member(&self) -> Option<&TeamMember> {
        self.members.get(self.cursor)
    }

    /// Flips the checkbox under the cursor.
    pub fn toggle_current(&mut self) -> Option<bool> {
        let id = self.selected_member()?.id.clone();
        self.selection.toggle(&id)
    }

    pub fn has_date_inputs(&self) -> bool {
        matches!(
            self.route,
            Some(Route::TeamStarReport) | Some(Route::BallCollection)
        )
    }

    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            DateField::Start => DateField::End,
            DateField::End => DateField::Start,
        };
    }

    fn focused_input(&mut self) -> &mut String {
        match self.focus {
            DateField::Start => &mut self.start_date,
            DateField::End => &mut self.end_date,
        }
    }

    /// Date inputs only take `YYYY-MM-DD` characters.
    pub fn type_char(&mut self, ch: char) {
        if !self.has_date_inputs() || !(ch.is_ascii_digit() || ch == '-') {
            return;
        }
        let input = self.focused_input();
        if input.len() < DATE_INPUT_LEN {
            input.push(ch);
        }
    }

    pub fn backspace(&mut self) {
        if self.has_date_inputs() {
            self.focused_input().pop();
        }
    }

    /// Runs the submission gate for the current view. On failure the reason is
    /// raised as an alert and nothing is sent.
    pub fn prepare_submit(&mut self, today: NaiveDate) -> Option<ProviderCommand> {
        if self.in_flight {
            self.push_log("[INFO] Request already in flight");
            return None;
        }
        if !self.is_ready() {
            return None;
        }
        let route = self.route?;
        let outcome = match route {
            Route::StarAssignment => self.assignment_command(today),
            Route::TeamStarReport | Route::BallCollection => self.range_command(route),
        };
        match outcome {
            Ok(cmd) => {
                self.in_flight = true;
                Some(cmd)
            }
            Err(msg) => {
                self.push_log(format!("[WARN] Validation failed: {msg}"));
                self.show_alert(AlertKind::Error, msg);
                None
            }
        }
    }

    fn assignment_command(&self, today: NaiveDate) -> Result<ProviderCommand, String> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| "Star session is not loaded.".to_string())?;
        gate::check_assignment(session, &self.selection, today).map_err(|e| e.to_string())?;
        Ok(ProviderCommand::SubmitAssignments {
            session_id: session.id.clone(),
            assignments: self.selection.assignments(),
        })
    }

    fn range_command(&self, route: Route) -> Result<ProviderCommand, String> {
        let team_id = self
            .team_id
            .clone()
            .ok_or_else(|| "Team ID is missing from the URL.".to_string())?;
        let range =
            gate::check_date_range(&self.start_date, &self.end_date).map_err(|e| e.to_string())?;
        Ok(if route == Route::TeamStarReport {
            ProviderCommand::DownloadReport { team_id, range }
        } else {
            ProviderCommand::RequestBallCollection { team_id, range }
        })
    }

    /// Saving is only offered once a report has been downloaded.
    pub fn export_command(&mut self, dir: PathBuf) -> Option<ProviderCommand> {
        if self.in_flight {
            self.push_log("[INFO] Request already in flight");
            return None;
        }
        let Some(report) = self.report.clone() else {
            self.push_log("[INFO] No report downloaded yet");
            return None;
        };
        self.in_flight = true;
        Some(ProviderCommand::ExportReport { dir, report })
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    AssignmentLoaded {
        session: StarSession,
        members: Vec<TeamMember>,
    },
    LoadFailed(String),
    AssignmentsSubmitted {
        selected: usize,
        response: String,
    },
    ReportDownloaded(StarsReport),
    BallCollectionRequested {
        message: String,
    },
    ReportExported {
        csv_path: PathBuf,
        xlsx_path: PathBuf,
    },
    RequestFailed {
        action: String,
        error: String,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    LoadAssignment {
        session_id: String,
    },
    SubmitAssignments {
        session_id: String,
        assignments: Vec<StarAssignment>,
    },
    DownloadReport {
        team_id: String,
        range: DateRange,
    },
    RequestBallCollection {
        team_id: String,
        range: DateRange,
    },
    ExportReport {
        dir: PathBuf,
        report: StarsReport,
    },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::AssignmentLoaded { session, members } => {
            state.selection.seed(&members);
            state.cursor = 0;
            state.push_log(format!(
                "[INFO] Loaded {} members for {}",
                members.len(),
                session.name
            ));
            state.members = members;
            state.session = Some(session);
            state.status = LoadStatus::Ready;
        }
        Delta::LoadFailed(msg) => {
            state.push_log(format!("[WARN] {msg}"));
            state.status = LoadStatus::Error(msg);
        }
        Delta::AssignmentsSubmitted { selected, response } => {
            state.in_flight = false;
            if !response.trim().is_empty() {
                state.push_log(format!("[INFO] Batch create response: {}", response.trim()));
            }
            state.show_alert(
                AlertKind::Info,
                format!("Star assignments saved ({selected} selected)."),
            );
        }
        Delta::ReportDownloaded(report) => {
            state.in_flight = false;
            state.push_log(format!(
                "[INFO] Report for team {} has {} rows",
                report.team_id,
                report.table.body().len()
            ));
            state.report_scroll = 0;
            state.report = Some(report);
        }
        Delta::BallCollectionRequested { message } => {
            state.in_flight = false;
            state.push_log(format!("[INFO] {message}"));
            state.show_alert(AlertKind::Info, "Message logged to the console!");
        }
        Delta::ReportExported {
            csv_path,
            xlsx_path,
        } => {
            state.in_flight = false;
            state.push_log(format!("[INFO] Saved {}", csv_path.display()));
            state.push_log(format!("[INFO] Saved {}", xlsx_path.display()));
            state.show_alert(
                AlertKind::Info,
                format!("Report saved to {}", csv_path.display()),
            );
        }
        Delta::RequestFailed { action, error } => {
            state.in_flight = false;
            state.push_log(format!("[WARN] {action} failed: {error}"));
            state.show_alert(AlertKind::Error, format!("Error {action}: {error}"));
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
