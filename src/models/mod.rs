pub mod medication;
pub mod session;
pub mod student;

pub use medication::{MedicationRequest, MedicationRequestPayload, StudentRef};
pub use session::{AuthSession, SessionInfo, UserRole};
pub use student::Student;
