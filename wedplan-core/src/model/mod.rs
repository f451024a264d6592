//! The synchronized wedding document and its entities.

/// Closed set of variants that travel as human-readable labels.
///
/// Unknown labels coming back from a remote document degrade to the
/// `$fallback` variant rather than failing the whole document.
macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $name:ident, fallback = $fallback:ident {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire label, as stored in the remote document.
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn from_label(label: &str) -> Option<Self> {
                match label {
                    $($label => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$fallback
            }
        }

        impl From<String> for $name {
            fn from(label: String) -> Self {
                $name::from_label(&label).unwrap_or_default()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.label().to_string()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "{}", self.label())
            }
        }
    };
}

mod document;
mod guest;
mod table;
mod task;
mod timeline;

pub use document::{WeddingDocument, merge_fields};
pub use guest::{Guest, GuestGroup, GuestSide};
pub use table::Table;
pub use task::{Task, TaskCategory, TaskStatus, initial_tasks};
pub use timeline::{TimelineItem, normalize_time, sort_timeline};
