use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentState {
    #[default]
    Stopped,
    Running,
}

impl EquipmentState {
    pub fn toggled(self) -> Self {
        match self {
            EquipmentState::Stopped => EquipmentState::Running,
            EquipmentState::Running => EquipmentState::Stopped,
        }
    }

    pub fn is_running(self) -> bool {
        self == EquipmentState::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_round_trip() {
        let state = EquipmentState::default();

        assert_eq!(state, EquipmentState::Stopped);
        assert!(state.toggled().is_running());
        assert_eq!(state.toggled().toggled(), EquipmentState::Stopped);
    }

    #[test]
    fn test_serialized_as_snake_case() {
        assert_eq!(serde_json::to_string(&EquipmentState::Running).unwrap(), r#""running""#);
        assert_eq!(serde_json::to_string(&EquipmentState::Stopped).unwrap(), r#""stopped""#);
    }
}
