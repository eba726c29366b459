pub mod assignment;
pub mod preference;
pub mod semester;
pub mod user;

pub use assignment::{Assignment, AssignmentStatus, NewAssignmentRequest, UpdateAssignmentRequest};
pub use preference::{Preference, PreferenceKind, PreferenceRequest};
pub use semester::{NewSemesterRequest, Semester, UpdateSemesterRequest, current_semester};
pub use user::{UpdateUserRequest, User};
