use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One page of a listing from the plan-storage service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_elements: u64,
    pub first: bool,
    pub last: bool,
}

/// Stored plan. `plan_data` is the storage service's serialized document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRecord {
    pub id: i64,
    pub plan_data: String,
    pub created_at: NaiveDateTime,
}

/// Identifier returned by the storage service after a plan is saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanCreated {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_storage_page() {
        let page: PageResponse<PlanRecord> = serde_json::from_value(json!({
            "content": [
                {
                    "id": 1,
                    "planData": "{\"rooms\": 3}",
                    "createdAt": "2025-11-30T08:54:33.336046"
                }
            ],
            "pageNumber": 0,
            "pageSize": 10,
            "totalPages": 5,
            "totalElements": 42,
            "first": true,
            "last": false
        }))
        .unwrap();

        assert_eq!(page.content[0].plan_data, "{\"rooms\": 3}");
        assert_eq!(page.total_elements, 42);

        let back = serde_json::to_value(&page).unwrap();
        assert_eq!(back["content"][0]["createdAt"], "2025-11-30T08:54:33.336046");
        assert_eq!(back["totalPages"], 5);
    }

    #[test]
    fn empty_page_round_trips() {
        let page: PageResponse<PlanRecord> = serde_json::from_value(json!({
            "content": [],
            "pageNumber": 0,
            "pageSize": 10,
            "totalPages": 0,
            "totalElements": 0,
            "first": true,
            "last": true
        }))
        .unwrap();
        assert!(page.content.is_empty());
        assert_eq!(serde_json::to_value(&page).unwrap()["content"], json!([]));
    }
}
