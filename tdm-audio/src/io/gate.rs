//! Short critical sections between the main loop and the transfer interrupt.
//!
//! The only shared state that crosses that boundary without atomics is the
//! pool-capture working set. Swapping it happens inside a [`GateGuard`],
//! which masks the interrupt on creation and unmasks it when dropped, on
//! every exit path. Nothing slower than a pointer swap belongs inside.

/// Masks and unmasks the interrupt source that services the transfer.
///
/// # Safety
///
/// Between `mask` and the matching `unmask`, no other context that shares
/// state guarded by this gate may run. On a single core that means the
/// transfer interrupt is held off; with the `critical-section` backing it
/// means every other holder of the section is excluded.
pub unsafe trait InterruptGate {
    fn mask(&mut self);
    fn unmask(&mut self);
}

/// RAII critical section over an [`InterruptGate`].
pub struct GateGuard<'g, G: InterruptGate> {
    gate: &'g mut G,
}

impl<'g, G: InterruptGate> GateGuard<'g, G> {
    /// Mask the interrupt until the guard is dropped.
    pub fn new(gate: &'g mut G) -> Self {
        gate.mask();
        GateGuard { gate }
    }
}

impl<G: InterruptGate> Drop for GateGuard<'_, G> {
    fn drop(&mut self) {
        self.gate.unmask();
    }
}

/// Gate backed by the `critical-section` implementation linked into the
/// application (interrupts off on single-core Cortex-M).
#[derive(Default)]
pub struct CriticalSectionGate {
    restore: Option<critical_section::RestoreState>,
}

impl CriticalSectionGate {
    pub const fn new() -> Self {
        CriticalSectionGate { restore: None }
    }

    /// Whether the gate is currently held.
    pub fn is_masked(&self) -> bool {
        self.restore.is_some()
    }
}

// SAFETY: `critical_section::acquire` excludes every other context until
// the matching release.
unsafe impl InterruptGate for CriticalSectionGate {
    fn mask(&mut self) {
        if self.restore.is_none() {
            // SAFETY: paired with the release in `unmask`; nesting is
            // prevented by the `Option`.
            self.restore = Some(unsafe { critical_section::acquire() });
        }
    }

    fn unmask(&mut self) {
        if let Some(state) = self.restore.take() {
            // SAFETY: `state` came from the matching `acquire`.
            unsafe { critical_section::release(state) }
        }
    }
}
