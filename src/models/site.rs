use crate::store::document::Entity;
use crate::store::Collection;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub created_at: DateTime<Local>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Site {
    pub fn new(name: &str, address: &str) -> Self {
        Self {
            id: String::new(),
            name: name.trim().to_string(),
            address: address.trim().to_string(),
            created_at: Local::now(),
            is_active: true,
        }
    }
}

impl Entity for Site {
    const COLLECTION: Collection = Collection::Sites;
    const KIND: &'static str = "Site";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
