use core::fmt;
use core::num::NonZeroU32;

/// Identifier of a subsystem within one model.
///
/// Ids are handed out in registration order, so the 0-based [`slot`](Self::slot)
/// indexes every registration-ordered table of the model. The niche keeps
/// `Option<SubsystemId>` at four bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubsystemId(NonZeroU32);

impl SubsystemId {
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    pub fn slot(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for SubsystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubsystemId({})", self.index())
    }
}

impl fmt::Display for SubsystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}
