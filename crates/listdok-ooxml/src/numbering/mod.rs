//! List numbering: catalog definitions, instance allocation and the
//! numbering part merge performed at write time.

pub mod catalog;
pub mod manager;
pub mod part;

pub use catalog::{
    normalize_abstract, ListKind, BULLET_ABSTRACT_ID, LEVEL_COUNT, ORDERED_ABSTRACT_ID,
};
pub use manager::{
    NumberingInstance, NumberingManager, NUMBERING_PART_PATH, WORDPROCESSINGML_NS,
};
pub use part::{NumEntry, NumberingPart, NumberingSummary};
