use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::ModelError;

/// 2D point `[x, y]`. Numbers keep their original textual form.
pub type Point = [Number; 2];

/// Line segment between two points.
pub type Segment = [Point; 2];

/// Four corners of a door's bounding quadrilateral.
pub type Quad = [Point; 4];

/// Vectorized floor plan as produced by the parser service.
///
/// Fields the gateway does not model are kept in `extra` and written back
/// unchanged, so a plan survives the pipeline with its unknown fields intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    pub walls: Vec<Wall>,
    pub doors: Vec<Door>,
    pub rooms: Vec<Room>,
    pub area: Number,
    pub perimeter: Number,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_bearing_walls: Option<Vec<Wall>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub position: Segment,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub bbox: Quad,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub x: Number,
    pub y: Number,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlanDocument {
    /// Decode an untyped document and check the plan invariants.
    pub fn from_value(value: Value) -> Result<Self, ModelError> {
        let plan: PlanDocument =
            serde_json::from_value(value).map_err(|e| ModelError::Shape(e.to_string()))?;
        plan.validate()?;
        Ok(plan)
    }

    /// Room ids must be non-blank and unique.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut seen = HashSet::with_capacity(self.rooms.len());
        for (index, room) in self.rooms.iter().enumerate() {
            if room.id.trim().is_empty() {
                return Err(ModelError::BlankRoomId(index));
            }
            if !seen.insert(room.id.as_str()) {
                return Err(ModelError::DuplicateRoomId(room.id.clone()));
            }
        }
        Ok(())
    }

    /// Canonical compact JSON text embedded into prompts.
    pub fn to_canonical_json(&self) -> Result<String, ModelError> {
        serde_json::to_string(self).map_err(|e| ModelError::Shape(e.to_string()))
    }
}
