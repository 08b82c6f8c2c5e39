// Location and movement schemas

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Where an item lives: the global space, a workspace, or (chats only) a folder
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Global,
    Workspace,
    Folder,
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LocationType::Global => "global",
            LocationType::Workspace => "workspace",
            LocationType::Folder => "folder",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Chat,
    Folder,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemType::Chat => "chat",
            ItemType::Folder => "folder",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    #[serde(rename = "type")]
    pub location_type: LocationType,
    #[serde(default)]
    pub id: Option<Uuid>,
}

impl Location {
    pub fn global() -> Self {
        Self {
            location_type: LocationType::Global,
            id: None,
        }
    }

    pub fn workspace(id: Uuid) -> Self {
        Self {
            location_type: LocationType::Workspace,
            id: Some(id),
        }
    }

    pub fn folder(id: Uuid) -> Self {
        Self {
            location_type: LocationType::Folder,
            id: Some(id),
        }
    }

    /// Global locations carry no id; every other location must carry one.
    pub fn validate(&self) -> Result<(), String> {
        match (self.location_type, self.id) {
            (LocationType::Global, Some(_)) => {
                Err("Global location should not have an ID".to_string())
            }
            (LocationType::Workspace | LocationType::Folder, None) => {
                Err("Non-global locations must have an ID".to_string())
            }
            _ => Ok(()),
        }
    }

    /// Column values (`workspace_id`, `folder_id`) for an item placed here
    pub fn columns(&self) -> (Option<Uuid>, Option<Uuid>) {
        match self.location_type {
            LocationType::Global => (None, None),
            LocationType::Workspace => (self.id, None),
            LocationType::Folder => (None, self.id),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MoveRequest {
    pub item_type: ItemType,
    pub item_id: Uuid,
    pub destination: Location,
}

impl MoveRequest {
    pub fn validate(&self) -> Result<(), String> {
        self.destination.validate()?;

        if self.item_type == ItemType::Folder
            && self.destination.location_type == LocationType::Folder
            && self.destination.id == Some(self.item_id)
        {
            return Err("Cannot move folder into itself".to_string());
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveResponse {
    pub item_type: ItemType,
    pub item_id: Uuid,
    pub previous_location: Location,
    pub new_location: Location,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_location_serialization() {
        let value = serde_json::to_value(Location::global()).unwrap();
        assert_eq!(value, json!({"type": "global", "id": null}));

        let id = Uuid::new_v4();
        let value = serde_json::to_value(Location::workspace(id)).unwrap();
        assert_eq!(value["type"], "workspace");
        assert_eq!(value["id"], id.to_string());
    }

    #[test]
    fn test_location_deserialization_without_id() {
        let location: Location = serde_json::from_str(r#"{"type":"global"}"#).unwrap();
        assert_eq!(location, Location::global());
    }

    #[test]
    fn test_global_location_with_id_is_invalid() {
        let location = Location {
            location_type: LocationType::Global,
            id: Some(Uuid::new_v4()),
        };
        assert_eq!(
            location.validate().unwrap_err(),
            "Global location should not have an ID"
        );
    }

    #[test]
    fn test_non_global_location_requires_id() {
        for location_type in [LocationType::Workspace, LocationType::Folder] {
            let location = Location {
                location_type,
                id: None,
            };
            assert_eq!(
                location.validate().unwrap_err(),
                "Non-global locations must have an ID"
            );
        }
    }

    #[test]
    fn test_location_columns() {
        let id = Uuid::new_v4();
        assert_eq!(Location::global().columns(), (None, None));
        assert_eq!(Location::workspace(id).columns(), (Some(id), None));
        assert_eq!(Location::folder(id).columns(), (None, Some(id)));
    }

    #[test]
    fn test_folder_cannot_move_into_itself() {
        let id = Uuid::new_v4();
        let request = MoveRequest {
            item_type: ItemType::Folder,
            item_id: id,
            destination: Location::folder(id),
        };
        assert_eq!(request.validate().unwrap_err(), "Cannot move folder into itself");
    }

    #[test]
    fn test_chat_move_to_folder_is_valid() {
        let request = MoveRequest {
            item_type: ItemType::Chat,
            item_id: Uuid::new_v4(),
            destination: Location::folder(Uuid::new_v4()),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_move_request_deserialization() {
        let request: MoveRequest = serde_json::from_value(json!({
            "item_type": "chat",
            "item_id": Uuid::nil(),
            "destination": {"type": "workspace", "id": Uuid::nil()}
        }))
        .unwrap();
        assert_eq!(request.item_type, ItemType::Chat);
        assert_eq!(request.destination.location_type, LocationType::Workspace);
    }

    #[test]
    fn test_item_type_display() {
        assert_eq!(ItemType::Chat.to_string(), "chat");
        assert_eq!(ItemType::Folder.to_string(), "folder");
    }
}
