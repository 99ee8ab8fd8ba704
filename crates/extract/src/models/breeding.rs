use super::EntityRef;

/// One breeding combination: two parents produce one child.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "camelCase"))]
pub struct BreedingCombo {
    pub parents: [EntityRef; 2],
    pub child: EntityRef,
}
