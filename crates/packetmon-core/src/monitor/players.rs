use std::collections::HashMap;

use crate::outbound::fields::NO_CLIENT;

/// Connected players by client slot.
#[derive(Debug, Default, Clone)]
pub struct PlayerDirectory {
    names: HashMap<i32, String>,
}

impl PlayerDirectory {
    pub fn join(&mut self, client: i32, name: impl Into<String>) {
        self.names.insert(client, name.into());
    }

    pub fn leave(&mut self, client: i32) {
        self.names.remove(&client);
    }

    pub fn name(&self, client: i32) -> Option<&str> {
        self.names.get(&client).map(String::as_str)
    }

    /// Name for text output: `-` for the no-client slot, `?` when unknown.
    pub fn label(&self, client: i32) -> &str {
        if client == NO_CLIENT {
            return "-";
        }
        self.name(client).unwrap_or("?")
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
