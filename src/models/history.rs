use serde::{Deserialize, Serialize};

/// A single completed exercise, as recorded by `POST /history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub name: String,
    pub group: String,
    /// Time of day the exercise was completed, formatted by the server.
    pub hour: String,
    pub created_at: String,
}

/// History entries for one calendar day, as grouped by `GET /history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryByDay {
    /// Day label, e.g. "26.08.22".
    pub title: String,
    pub data: Vec<HistoryEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_history_by_day() {
        let json = r#"[
            {
                "title": "26.08.22",
                "data": [
                    {
                        "id": 1,
                        "name": "Puxada frontal",
                        "group": "costas",
                        "hour": "08:12",
                        "created_at": "2022-08-26T08:12:00.000Z"
                    },
                    {
                        "id": 2,
                        "name": "Remada curvada",
                        "group": "costas",
                        "hour": "08:45",
                        "created_at": "2022-08-26T08:45:00.000Z"
                    }
                ]
            }
        ]"#;

        let days: Vec<HistoryByDay> = serde_json::from_str(json).unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].title, "26.08.22");
        assert_eq!(days[0].data.len(), 2);
        assert_eq!(days[0].data[1].hour, "08:45");
    }
}
