//! Google services used by wedplan.
//!
//! - `firestore`: remote document store
//! - `calendar`: task export to Google Calendar
//! - `gemini`: planning suggestions and vows help
//! - `storage`: photo upload to Firebase Storage

pub mod calendar;
pub mod firestore;
pub mod gemini;
pub mod storage;

pub use calendar::GoogleCalendar;
pub use firestore::FirestoreStore;
pub use gemini::GeminiClient;
pub use storage::{FirebaseStorage, couple_image_path};
