mod breeding;
mod detail;
mod drop;
mod entity;
mod habitat;
mod keyvalue;
mod partner;
mod relation;
mod skill;
mod summary;
mod work;

pub use self::breeding::BreedingCombo;
pub use self::detail::PalDetail;
pub use self::drop::DropEntry;
pub use self::entity::{EntityRef, ItemRef, Link};
pub use self::habitat::{HabitatInfo, HabitatSlot};
pub use self::keyvalue::{KeyValueRow, KeyValues, LevelRow};
pub use self::partner::PartnerSkill;
pub use self::relation::{SpawnRow, TribeRow};
pub use self::skill::SkillEntry;
pub use self::summary::PalSummary;
pub use self::work::WorkSuitability;
