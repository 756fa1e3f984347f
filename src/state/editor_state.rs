//! Editor mode state machine.
//!
//! ```text
//! ┌──────────┐  start_crop   ┌────────────┐
//! │   Idle   ├───────────────►  Cropping  │
//! │          ◄───────────────┤            │
//! └──────────┘ apply/cancel  └────────────┘
//! ```
//!
//! Transitions go through `EditorContext`, which validates them with
//! [`EditorState::can_transition_to`].

use crate::crop::TempCropData;
use crate::id_generator::ElementId;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditorState {
    /// No active operation
    #[default]
    Idle,
    /// Cropping one image element
    Cropping {
        element_id: ElementId,
        crop: TempCropData,
    },
}

impl EditorState {
    /// Validates whether a transition to the new state is allowed
    pub fn can_transition_to(&self, new_state: &EditorState) -> bool {
        matches!(
            (self, new_state),
            (EditorState::Idle, EditorState::Cropping { .. }) | (EditorState::Cropping { .. }, EditorState::Idle)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            EditorState::Idle => "Idle",
            EditorState::Cropping { .. } => "Cropping",
        }
    }

    /// Returns true if the editor is currently in an idle state
    pub fn is_idle(&self) -> bool {
        matches!(self, EditorState::Idle)
    }

    pub fn is_cropping(&self) -> bool {
        matches!(self, EditorState::Cropping { .. })
    }

    /// Returns the element being cropped if in cropping state
    pub fn cropping_element(&self) -> Option<&ElementId> {
        match self {
            EditorState::Cropping { element_id, .. } => Some(element_id),
            _ => None,
        }
    }

    pub fn crop_data(&self) -> Option<&TempCropData> {
        match self {
            EditorState::Cropping { crop, .. } => Some(crop),
            _ => None,
        }
    }

    pub fn crop_data_mut(&mut self) -> Option<&mut TempCropData> {
        match self {
            EditorState::Cropping { crop, .. } => Some(crop),
            _ => None,
        }
    }
}
