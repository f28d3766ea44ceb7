//! Fixed prompt templates for the two enrichment stages.
//!
//! Both builders are pure: they serialize the plan to compact JSON and embed
//! it verbatim between fixed instruction blocks.

use crate::models::PlanDocument;

use super::EnrichmentError;

/// A room with no door within this distance of its (x, y) is isolated.
pub const ISOLATION_RADIUS: u32 = 50;
pub const DOOR_WIDTH_RANGE: (u32, u32) = (20, 35);
pub const DOOR_HEIGHT_RANGE: (u32, u32) = (6, 10);
/// Walls longer than this are load-bearing candidates.
pub const LOAD_BEARING_MIN_LENGTH: u32 = 100;
pub const LOAD_BEARING_COUNT: (u32, u32) = (4, 6);

const BUILDING_CODE: &str = "the Russian Federation housing code (ЖК РФ)";

/// Stage 1: preserve the plan, add doors to isolated rooms, pick load-bearing walls.
pub fn build_door_completion_prompt(plan: &PlanDocument) -> Result<String, EnrichmentError> {
    plan.validate()?;
    let plan_json = plan.to_canonical_json()?;
    let (min_width, max_width) = DOOR_WIDTH_RANGE;
    let (min_height, max_height) = DOOR_HEIGHT_RANGE;
    let (min_walls, max_walls) = LOAD_BEARING_COUNT;

    Ok(format!(
        "You are a floor plan analyzer that enhances architectural plans.\n\n\
INPUT FLOOR PLAN:\n\
{plan_json}\n\n\
YOUR TASK:\n\
1. Preserve ALL existing fields (walls, doors, rooms, area, perimeter and any other field) exactly as given. Do not modify them.\n\
2. For each room, decide whether it is isolated: a room is isolated if no door bounding box lies within {ISOLATION_RADIUS} units of the room's (x, y).\n\
3. Add exactly one NEW door for EVERY isolated room.\n\
4. Select {min_walls}-{max_walls} load-bearing walls.\n\n\
DOOR PLACEMENT:\n\
- Place the door on the wall segment nearest to the isolated room.\n\
- The door is a rectangle {min_width}-{max_width} units wide and {min_height}-{max_height} units high.\n\
- Door format: {{\"bbox\": [[x1,y1],[x2,y2],[x3,y3],[x4,y4]]}} with the four corners of the rectangle.\n\
- Example: an isolated room at (201,251) gets {{\"bbox\": [[210,251],[235,251],[235,257],[210,257]]}}.\n\n\
LOAD-BEARING WALL CRITERIA:\n\
- Wall segments longer than {LOAD_BEARING_MIN_LENGTH} units.\n\
- Prefer exterior perimeter walls.\n\
- Prefer long horizontal or vertical structural walls.\n\n\
REQUIRED OUTPUT STRUCTURE:\n\
{{\n\
  \"walls\": [...exact copy of the input walls...],\n\
  \"doors\": [...existing doors followed by the new doors...],\n\
  \"rooms\": [...exact copy of the input rooms...],\n\
  \"area\": <input area, unchanged>,\n\
  \"perimeter\": <input perimeter, unchanged>,\n\
  \"load_bearing_walls\": [{{\"position\": [[x1,y1],[x2,y2]]}}, ...]\n\
}}\n\n\
OUTPUT RULES:\n\
- Return only syntactically valid JSON.\n\
- No explanations, no markdown, no text before or after the JSON.\n\
- Every point is a two-number array; do not nest arrays deeper than shown.\n\n\
Return JSON:\n"
    ))
}

/// Stage 2: audit the door-completed plan and report issues, positives and fixes.
pub fn build_validation_prompt(plan: &PlanDocument) -> Result<String, EnrichmentError> {
    plan.validate()?;
    let plan_json = plan.to_canonical_json()?;

    Ok(format!(
        "You are a building code compliance validator for {BUILDING_CODE}.\n\n\
INPUT FLOOR PLAN:\n\
{plan_json}\n\n\
VALIDATION CHECKLIST:\n\
1. Room accessibility: every room must have a door within {ISOLATION_RADIUS} units of its (x, y).\n\
2. Fire safety: adequate emergency exits.\n\
3. Circulation: a usable corridor or hallway system.\n\
4. Sanitary access: bathrooms and toilets are reachable.\n\
5. Structure: load-bearing walls are respected; minimum room dimensions are met.\n\n\
OUTPUT FORMAT:\n\
{{\n\
  \"valid\": false,\n\
  \"issues\": [\n\
    {{\"description\": \"Room 5 at (258,370) is isolated with no door access\", \"location\": [[258,370],[258,407]]}}\n\
  ],\n\
  \"good\": [\n\
    {{\"description\": \"Main entrance is positioned with adequate width\", \"location\": [[102,40],[137,51]]}}\n\
  ],\n\
  \"suggestions\": [\n\
    {{\"description\": \"Add a door from the corridor to Room 5\", \"move_door\": {{\"from\": null, \"to\": [[203,370],[228,370]]}}, \"remove_wall\": null}},\n\
    {{\"description\": \"Remove a non-load-bearing wall to improve circulation\", \"move_door\": null, \"remove_wall\": {{\"position\": [[226,251],[258,251]]}}}}\n\
  ]\n\
}}\n\n\
VALIDATION RULES:\n\
- \"valid\" is false if ANY issue exists and true only if there are none.\n\
- \"issues\": every isolated or non-compliant room, with an explicit description naming the room and a two-point \"location\".\n\
- \"good\": at least 1-2 positive observations, even when issues exist. \"location\" may be null.\n\
- \"suggestions\": actionable fixes with exact coordinates for added doors (\"move_door\") or removed walls (\"remove_wall\"); use null when not applicable.\n\
- Every coordinate pair is [[x1,y1],[x2,y2]].\n\n\
OUTPUT RULES:\n\
- Return only syntactically valid JSON.\n\
- No explanations, no markdown, no text before or after the JSON.\n\n\
Return JSON:\n"
    ))
}
