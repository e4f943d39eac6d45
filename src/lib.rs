pub mod api;
pub mod config;
pub mod csv_table;
pub mod gate;
pub mod http_client;
pub mod location;
pub mod provider;
pub mod report_export;
pub mod selection;
pub mod state;
