/// UI regions that surface inline, non-fatal status text.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StatusRegion {
    SearchResults,
    Viewer,
}

#[derive(Debug, Default)]
struct Slot {
    message: Option<String>,
    dirty: bool,
}

/// Region-scoped status messages, drained by the DOM layer.
///
/// One slot per region: newer text replaces older text instead of
/// accumulating, and `take_change` reports each transition exactly once so
/// the drain loop only touches regions that actually changed.
#[derive(Debug, Default)]
pub struct StatusBus {
    search_results: Slot,
    viewer: Slot,
}

impl StatusBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, region: StatusRegion, message: impl Into<String>) {
        let slot = self.slot_mut(region);
        slot.message = Some(message.into());
        slot.dirty = true;
    }

    pub fn clear(&mut self, region: StatusRegion) {
        let slot = self.slot_mut(region);
        if slot.message.take().is_some() {
            slot.dirty = true;
        }
    }

    /// Returns `Some(current_message)` if the region changed since the last
    /// take; `Some(None)` means "cleared".
    pub fn take_change(&mut self, region: StatusRegion) -> Option<Option<String>> {
        let slot = self.slot_mut(region);
        if !slot.dirty {
            return None;
        }
        slot.dirty = false;
        Some(slot.message.clone())
    }

    fn slot_mut(&mut self, region: StatusRegion) -> &mut Slot {
        match region {
            StatusRegion::SearchResults => &mut self.search_results,
            StatusRegion::Viewer => &mut self.viewer,
        }
    }
}
