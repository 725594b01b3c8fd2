//! # Escape Hatch
//!
//! Two-party emergency freeze. The enabler arms it, the foreperson
//! activates it; once active, ordinary fund movement stops and only the
//! foreperson sweep remains.

use super::errors::RoscaError;
use super::value_objects::{Address, EscapeHatchState};

/// Escape hatch of one pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EscapeHatch {
    enabler: Address,
    state: EscapeHatchState,
}

impl EscapeHatch {
    /// Disabled hatch armed only by `enabler`.
    #[must_use]
    pub fn new(enabler: Address) -> Self {
        Self {
            enabler,
            state: EscapeHatchState::Disabled,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> EscapeHatchState {
        self.state
    }

    /// Designated enabler.
    #[must_use]
    pub fn enabler(&self) -> Address {
        self.enabler
    }

    /// Whether fund movement is frozen.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.blocks_fund_movement()
    }

    /// Fail while the hatch is active.
    pub fn ensure_inactive(&self) -> Result<(), RoscaError> {
        if self.is_active() {
            return Err(RoscaError::EscapeHatchActive);
        }
        Ok(())
    }

    fn transition(&mut self, next: EscapeHatchState) -> Result<(), RoscaError> {
        if !self.state.can_transition_to(next) {
            return Err(RoscaError::InvalidEscapeHatchTransition {
                from: format!("{:?}", self.state),
                to: format!("{:?}", next),
            });
        }
        self.state = next;
        Ok(())
    }

    /// `Disabled -> Enabled`, enabler only.
    pub fn enable(&mut self, caller: Address) -> Result<(), RoscaError> {
        if caller != self.enabler {
            return Err(RoscaError::NotEscapeHatchEnabler(caller));
        }
        self.transition(EscapeHatchState::Enabled)
    }

    /// `Enabled -> Active`, foreperson only.
    pub fn activate(&mut self, caller: Address, foreperson: Address) -> Result<(), RoscaError> {
        if caller != foreperson {
            return Err(RoscaError::NotForeperson(caller));
        }
        self.transition(EscapeHatchState::Active)
    }

    /// Fail unless the hatch is active.
    pub fn ensure_active(&self) -> Result<(), RoscaError> {
        if !self.is_active() {
            return Err(RoscaError::InvalidEscapeHatchTransition {
                from: format!("{:?}", self.state),
                to: "EmergencyWithdrawal".to_string(),
            });
        }
        Ok(())
    }
}
