use serde::{Deserialize, Serialize};

/// Where an employee clocks in from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Office,
    Remote,
}

impl Default for LocationType {
    fn default() -> Self {
        Self::Office
    }
}

/// Authenticated user as embedded in login responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub department_id: i64,
    pub department_name: String,
    pub position_id: i64,
    pub position_name: String,
    pub role: String,
    pub location_type: LocationType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_deserializes_from_camel_case() {
        let user: User = serde_json::from_str(
            r#"{
                "id": 7,
                "name": "Tanaka Yuki",
                "departmentId": 2,
                "departmentName": "Engineering",
                "positionId": 4,
                "positionName": "Developer",
                "role": "employee",
                "locationType": "remote"
            }"#,
        )
        .unwrap();

        assert_eq!(user.id, 7);
        assert_eq!(user.location_type, LocationType::Remote);
    }
}
