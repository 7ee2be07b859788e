//! The shared vocabulary for NPC memory categories (`spec.md` §4.7, §4.9).
//! The `Memory` record itself (with its `target_id`/`recorded_at` fields)
//! lives alongside `Npc` in `sim-core`, since only the kernel owns NPCs;
//! this enum is shared because the World Event Processor in `director`
//! needs to name a category without depending on `sim-core`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryCategory {
    Betrayed,
    LostLovedOne,
    WasSaved,
    CommittedViolence,
    Witnessed,
    Honored,
}
