//! Guest registry entries.

use serde::{Deserialize, Serialize};

use crate::id::new_id;

labelled_enum! {
    GuestGroup, fallback = Other {
        Family => "Familia",
        Friends => "Amigos",
        Work => "Trabajo",
        Other => "Otros",
    }
}

labelled_enum! {
    /// Which side of the couple invited the guest.
    GuestSide, fallback = Both {
        Bride => "Novia",
        Groom => "Novio",
        Both => "Ambos",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub group: GuestGroup,
    #[serde(default)]
    pub side: GuestSide,
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default)]
    pub dietary_notes: String,
    /// Id of the table this guest sits at. Not an owning reference: deleting
    /// the table clears it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_number: Option<u32>,
}

impl Guest {
    pub fn new(name: &str) -> Self {
        Guest {
            id: new_id(),
            name: name.to_string(),
            group: GuestGroup::Other,
            side: GuestSide::Both,
            confirmed: false,
            dietary_notes: String::new(),
            table_id: None,
            table_number: None,
        }
    }

    pub fn is_seated_at(&self, table_id: &str) -> bool {
        self.table_id.as_deref() == Some(table_id)
    }
}
