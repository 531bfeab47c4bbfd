pub mod api;
pub mod attachments;
pub mod commands;
pub mod config;
pub mod models;
pub mod refresh; // review board staleness scheduler
pub mod review;
pub mod state;
pub mod submission;
pub mod upload;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("CampusMed starting v{}", config::APP_VERSION);

    tauri::Builder::default()
        .plugin(tauri_plugin_shell::init())
        .plugin(tauri_plugin_dialog::init())
        .manage(Arc::new(state::AppState::new()))
        .invoke_handler(tauri::generate_handler![
            commands::health_check,
            commands::check_backend_status,
            commands::session::establish_session,
            commands::session::get_session_info,
            commands::session::check_inactivity,
            commands::session::update_activity,
            commands::session::clear_session,
            commands::medications::get_my_requests,
            commands::medications::submit_medication_request,
            commands::medications::update_medication_request,
            commands::medications::delete_medication_request,
            commands::medications::get_student_history,
            commands::medications::find_student_by_code,
            commands::medications::pick_prescription_file,
            commands::medications::attach_prescription_file,
            commands::medications::clear_prescription_file,
            commands::medications::modal_opened,
            commands::medications::modal_closed,
            commands::review::get_review_board,
            commands::review::get_pending_count,
            commands::review::confirm_medication_request,
            commands::review::reject_medication_request,
            commands::review::start_auto_refresh,
            commands::review::stop_auto_refresh,
            commands::review::focus_refresh,
            commands::attachments::view_prescription,
        ])
        .run(tauri::generate_context!())
        .expect("error while running CampusMed");
}
