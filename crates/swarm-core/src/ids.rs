//! Strongly typed agent identifier.
//!
//! `AgentId` is the host's stable particle/entity id.  It is `Copy + Ord +
//! Hash` so it can key maps and sets without ceremony.  Ids are *not*
//! guaranteed to be dense (hosts may remove entities), so never index a
//! `Vec` with one directly; the flock keeps its agents ordered by id and
//! searches.

use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentId(pub u32);

impl AgentId {
    /// Sentinel meaning "no valid ID", equal to `u32::MAX`.
    pub const INVALID: AgentId = AgentId(u32::MAX);
}

impl Default for AgentId {
    /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
    #[inline(always)]
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AgentId({})", self.0)
    }
}

impl From<u32> for AgentId {
    #[inline(always)]
    fn from(id: u32) -> Self {
        AgentId(id)
    }
}

impl TryFrom<usize> for AgentId {
    type Error = std::num::TryFromIntError;
    fn try_from(n: usize) -> Result<AgentId, Self::Error> {
        u32::try_from(n).map(AgentId)
    }
}
