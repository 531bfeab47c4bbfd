//! Managed application state shared by every IPC command.
//!
//! Holds the HTTP client, the authenticated session with its inactivity
//! clock, the attachment slot for the open form, the scroll-lock counter,
//! the single tracked review action, and the auto-refresh scheduler handle.
//! Wrapped in an `Arc` and registered with the Tauri builder at startup.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Instant;

use crate::api::{ApiClient, ApiError};
use crate::models::session::{AuthSession, SessionInfo, UserRole};
use crate::refresh::RefreshHandle;
use crate::submission::AttachmentSlot;
use crate::upload::PrescriptionFile;

/// Default inactivity timeout: 30 minutes.
pub const DEFAULT_INACTIVITY_TIMEOUT_SECS: u64 = 30 * 60;

pub struct AppState {
    api: ApiClient,
    session: RwLock<Option<AuthSession>>,
    inactivity_timeout_secs: u64,
    last_activity: Mutex<Instant>,
    attachment: Mutex<AttachmentSlot>,
    scroll_locks: Mutex<u32>,
    review_in_flight: Mutex<Option<i64>>,
    refresh_busy: AtomicBool,
    /// Auto-refresh scheduler for the review board, present while a nurse
    /// has the board mounted.
    pub refresh: tokio::sync::Mutex<Option<RefreshHandle>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_client(ApiClient::from_config(), DEFAULT_INACTIVITY_TIMEOUT_SECS)
    }

    pub fn with_client(api: ApiClient, inactivity_timeout_secs: u64) -> Self {
        Self {
            api,
            session: RwLock::new(None),
            inactivity_timeout_secs,
            last_activity: Mutex::new(Instant::now()),
            attachment: Mutex::new(AttachmentSlot::default()),
            scroll_locks: Mutex::new(0),
            review_in_flight: Mutex::new(None),
            refresh_busy: AtomicBool::new(false),
            refresh: tokio::sync::Mutex::new(None),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    // ═══════════════════════════════════════════════════════════
    // Session
    // ═══════════════════════════════════════════════════════════

    pub fn establish_session(&self, session: AuthSession) -> Result<SessionInfo, ApiError> {
        let info = SessionInfo::from(&session);
        let mut guard = self
            .session
            .write()
            .map_err(|_| ApiError::Internal("session lock poisoned".into()))?;
        *guard = Some(session);
        drop(guard);
        self.update_activity();
        Ok(info)
    }

    pub fn clear_session(&self) -> Result<(), ApiError> {
        let mut guard = self
            .session
            .write()
            .map_err(|_| ApiError::Internal("session lock poisoned".into()))?;
        *guard = None;
        Ok(())
    }

    /// The gate every workflow passes through: no session is an auth error,
    /// and a session idle past the timeout is expired on the spot.
    pub fn require_session(&self) -> Result<AuthSession, ApiError> {
        if self.timed_out() {
            self.expire_session();
            return Err(ApiError::SessionExpired);
        }
        let guard = self
            .session
            .read()
            .map_err(|_| ApiError::Internal("session lock poisoned".into()))?;
        guard.clone().ok_or(ApiError::AuthRequired)
    }

    /// Require a session with a specific role.
    pub fn require_role(&self, role: UserRole) -> Result<AuthSession, ApiError> {
        let session = self.require_session()?;
        if session.role != role {
            return Err(ApiError::PermissionDenied);
        }
        Ok(session)
    }

    pub fn session_info(&self) -> Option<SessionInfo> {
        self.session
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(SessionInfo::from))
    }

    pub fn is_authenticated(&self) -> bool {
        self.session
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    // ── Inactivity ──

    pub fn update_activity(&self) {
        if let Ok(mut last) = self.last_activity.lock() {
            *last = Instant::now();
        }
    }

    /// Whether the session has been idle past the timeout. Always false when
    /// no one is signed in.
    pub fn timed_out(&self) -> bool {
        if !self.is_authenticated() {
            return false;
        }
        self.last_activity
            .lock()
            .map(|last| last.elapsed().as_secs() > self.inactivity_timeout_secs)
            .unwrap_or(false)
    }

    /// Expire on inactivity: clear the session and report true if one was
    /// cleared.
    pub fn expire_if_inactive(&self) -> bool {
        if self.timed_out() {
            self.expire_session();
            return true;
        }
        false
    }

    fn expire_session(&self) {
        if let Ok(mut guard) = self.session.write() {
            if guard.take().is_some() {
                tracing::info!(
                    timeout_secs = self.inactivity_timeout_secs,
                    "Session expired after inactivity"
                );
            }
        }
    }

    // ═══════════════════════════════════════════════════════════
    // Attachment slot
    // ═══════════════════════════════════════════════════════════

    pub fn attach_prescription(
        &self,
        path: &Path,
        declared_type: Option<&str>,
    ) -> Result<PrescriptionFile, ApiError> {
        let mut slot = self
            .attachment
            .lock()
            .map_err(|_| ApiError::Internal("attachment lock poisoned".into()))?;
        slot.attach(path, declared_type)
    }

    pub fn clear_prescription(&self) {
        if let Ok(mut slot) = self.attachment.lock() {
            slot.clear();
        }
    }

    pub fn prescription_file(&self) -> Option<PrescriptionFile> {
        self.attachment
            .lock()
            .ok()
            .and_then(|slot| slot.file().cloned())
    }

    // ═══════════════════════════════════════════════════════════
    // Scroll lock
    // ═══════════════════════════════════════════════════════════
    //
    // Counted, not boolean: nested modals each take a lock and background
    // scrolling resumes only when the last one releases.

    pub fn lock_scroll(&self) -> bool {
        if let Ok(mut locks) = self.scroll_locks.lock() {
            *locks += 1;
            *locks > 0
        } else {
            false
        }
    }

    pub fn unlock_scroll(&self) -> bool {
        if let Ok(mut locks) = self.scroll_locks.lock() {
            *locks = locks.saturating_sub(1);
            *locks > 0
        } else {
            false
        }
    }

    pub fn scroll_locked(&self) -> bool {
        self.scroll_locks.lock().map(|locks| *locks > 0).unwrap_or(false)
    }

    // ═══════════════════════════════════════════════════════════
    // Review action tracking
    // ═══════════════════════════════════════════════════════════

    /// Mark `request_id` as the one review action in flight. Fails while
    /// another is still running; the returned guard clears the marker when
    /// dropped, whatever the outcome of the action.
    pub fn begin_review_action(&self, request_id: i64) -> Result<ReviewActionGuard<'_>, ApiError> {
        let mut in_flight = self
            .review_in_flight
            .lock()
            .map_err(|_| ApiError::Internal("review lock poisoned".into()))?;
        if in_flight.is_some() {
            return Err(ApiError::Validation(
                "Another request is still being processed. Please wait for it to finish.".into(),
            ));
        }
        *in_flight = Some(request_id);
        Ok(ReviewActionGuard {
            state: self,
            request_id,
        })
    }

    pub fn review_in_flight(&self) -> Option<i64> {
        self.review_in_flight.lock().ok().and_then(|guard| *guard)
    }

    // ── Refresh busy flag ──

    pub fn set_refresh_busy(&self, busy: bool) {
        self.refresh_busy.store(busy, Ordering::Relaxed);
    }

    pub fn refresh_busy(&self) -> bool {
        self.refresh_busy.load(Ordering::Relaxed)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard for the single tracked review action.
pub struct ReviewActionGuard<'a> {
    state: &'a AppState,
    request_id: i64,
}

impl ReviewActionGuard<'_> {
    pub fn request_id(&self) -> i64 {
        self.request_id
    }
}

impl std::fmt::Debug for ReviewActionGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewActionGuard")
            .field("request_id", &self.request_id)
            .finish_non_exhaustive()
    }
}

impl Drop for ReviewActionGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.state.review_in_flight.lock() {
            if *in_flight == Some(self.request_id) {
                *in_flight = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_timeout(secs: u64) -> AppState {
        AppState::with_client(ApiClient::new("http://localhost:8080/api"), secs)
    }

    fn session(role: UserRole) -> AuthSession {
        AuthSession::new("tok".into(), role, 1, "Dana Field".into())
    }

    #[test]
    fn no_session_fails_the_gate_with_auth_required() {
        let state = state_with_timeout(DEFAULT_INACTIVITY_TIMEOUT_SECS);
        match state.require_session() {
            Err(ApiError::AuthRequired) => {}
            other => panic!("expected AuthRequired, got {other:?}"),
        }
    }

    #[test]
    fn established_session_passes_the_gate() {
        let state = state_with_timeout(DEFAULT_INACTIVITY_TIMEOUT_SECS);
        state.establish_session(session(UserRole::Parent)).unwrap();
        let fetched = state.require_session().unwrap();
        assert_eq!(fetched.role, UserRole::Parent);
    }

    #[test]
    fn wrong_role_is_denied() {
        let state = state_with_timeout(DEFAULT_INACTIVITY_TIMEOUT_SECS);
        state.establish_session(session(UserRole::Parent)).unwrap();
        match state.require_role(UserRole::Nurse) {
            Err(ApiError::PermissionDenied) => {}
            other => panic!("expected PermissionDenied, got {other:?}"),
        }
        assert!(state.require_role(UserRole::Parent).is_ok());
    }

    #[test]
    fn idle_session_expires_at_the_gate() {
        let state = state_with_timeout(0);
        state.establish_session(session(UserRole::Parent)).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(1100));
        match state.require_session() {
            Err(ApiError::SessionExpired) => {}
            other => panic!("expected SessionExpired, got {other:?}"),
        }
        // The expired session is gone, so the next failure is auth-required.
        assert!(!state.is_authenticated());
        match state.require_session() {
            Err(ApiError::AuthRequired) => {}
            other => panic!("expected AuthRequired, got {other:?}"),
        }
    }

    #[test]
    fn activity_resets_the_idle_clock() {
        let state = state_with_timeout(10);
        state.establish_session(session(UserRole::Nurse)).unwrap();
        state.update_activity();
        assert!(!state.timed_out());
        assert!(!state.expire_if_inactive());
        assert!(state.is_authenticated());
    }

    #[test]
    fn timeout_without_a_session_reports_nothing() {
        let state = state_with_timeout(0);
        assert!(!state.timed_out());
        assert!(!state.expire_if_inactive());
    }

    #[test]
    fn scroll_locks_balance() {
        let state = state_with_timeout(DEFAULT_INACTIVITY_TIMEOUT_SECS);
        assert!(!state.scroll_locked());
        state.lock_scroll();
        state.lock_scroll();
        assert!(state.scroll_locked());
        state.unlock_scroll();
        assert!(state.scroll_locked());
        state.unlock_scroll();
        assert!(!state.scroll_locked());
        // Extra unlocks stay at zero rather than underflowing.
        state.unlock_scroll();
        assert!(!state.scroll_locked());
    }

    #[test]
    fn one_review_action_at_a_time() {
        let state = state_with_timeout(DEFAULT_INACTIVITY_TIMEOUT_SECS);
        let guard = state.begin_review_action(7).unwrap();
        assert_eq!(state.review_in_flight(), Some(7));
        assert_eq!(guard.request_id(), 7);

        match state.begin_review_action(9) {
            Err(ApiError::Validation(message)) => {
                assert!(message.contains("still being processed"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }

        drop(guard);
        assert_eq!(state.review_in_flight(), None);
        // Cleared even though the first action never "completed".
        let second = state.begin_review_action(9).unwrap();
        assert_eq!(state.review_in_flight(), Some(9));
        drop(second);
    }

    #[test]
    fn attachment_slot_round_trips_through_state() {
        use std::io::Write;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rx.pdf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"%PDF-1.4")
            .unwrap();

        let state = state_with_timeout(DEFAULT_INACTIVITY_TIMEOUT_SECS);
        assert!(state.prescription_file().is_none());
        state.attach_prescription(&path, Some("application/pdf")).unwrap();
        assert_eq!(state.prescription_file().unwrap().file_name, "rx.pdf");
        state.clear_prescription();
        assert!(state.prescription_file().is_none());
    }

    #[test]
    fn refresh_busy_flag_round_trips() {
        let state = state_with_timeout(DEFAULT_INACTIVITY_TIMEOUT_SECS);
        assert!(!state.refresh_busy());
        state.set_refresh_busy(true);
        assert!(state.refresh_busy());
        state.set_refresh_busy(false);
        assert!(!state.refresh_busy());
    }
}
