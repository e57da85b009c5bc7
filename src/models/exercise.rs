use serde::{Deserialize, Serialize};

/// An exercise from the catalog, as listed per muscle group and shown on
/// the detail screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub group: String,
    pub series: i32,
    pub repetitions: i32,
    /// Thumbnail file name, resolved against the API media routes.
    pub thumb: String,
    /// Demonstration GIF file name.
    pub demo: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exercise() {
        let json = r#"{
            "id": 3,
            "name": "Remada unilateral",
            "group": "costas",
            "series": 4,
            "repetitions": 12,
            "thumb": "remada_unilateral.png",
            "demo": "remada_unilateral.gif",
            "updated_at": "2023-02-01T14:44:12.000Z"
        }"#;

        let exercise: Exercise = serde_json::from_str(json).unwrap();
        assert_eq!(exercise.id, 3);
        assert_eq!(exercise.group, "costas");
        assert_eq!(exercise.series, 4);
        assert_eq!(exercise.repetitions, 12);
    }
}
