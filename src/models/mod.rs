pub mod page;
pub mod plan;
pub mod report;

pub use page::*;
pub use plan::*;
pub use report::*;

use thiserror::Error;

/// A document did not match the plan or report model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("{0}")]
    Shape(String),

    #[error("Room at index {0} has a blank id")]
    BlankRoomId(usize),

    #[error("Room id {0:?} appears more than once")]
    DuplicateRoomId(String),
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{json, Value};

    /// Parser-style plan used across module tests.
    pub(crate) fn sample_plan_value() -> Value {
        json!({
            "walls": [
                {"position": [[158, 12], [248, 12]]},
                {"position": [[20, 209], [416, 209]]}
            ],
            "doors": [
                {"bbox": [[102, 40], [137, 40], [137, 51], [102, 51]]}
            ],
            "rooms": [
                {"id": "5", "x": 258, "y": 370},
                {"id": "16", "x": 201, "y": 251}
            ],
            "area": 157212,
            "perimeter": 6753.35
        })
    }

    pub(crate) fn sample_plan() -> crate::models::PlanDocument {
        crate::models::PlanDocument::from_value(sample_plan_value())
            .expect("fixture plan is valid")
    }
}
