//!
//! The three step grab sequence of the input grab probe.
//!
//! Each key press moves one step: grab the pointer, swap the pointer grab for a keyboard grab,
//! release the keyboard and stop.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrabStage {
    /// Normal event delivery, nothing grabbed.
    Ungrabbed,
    /// The pointer is grabbed by the probe window.
    PointerGrabbed,
    /// The keyboard is grabbed by the probe window.
    KeyboardGrabbed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// What a key press in a given stage asks for.
pub enum StageAction {
    GrabPointer,
    ReleasePointerGrabKeyboard,
    ReleaseKeyboardAndExit,
}

impl GrabStage {
    /// The 1-based stage number shown to the user.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Ungrabbed => 1,
            Self::PointerGrabbed => 2,
            Self::KeyboardGrabbed => 3,
        }
    }

    #[must_use]
    pub const fn on_key_press(self) -> StageAction {
        match self {
            Self::Ungrabbed => StageAction::GrabPointer,
            Self::PointerGrabbed => StageAction::ReleasePointerGrabKeyboard,
            Self::KeyboardGrabbed => StageAction::ReleaseKeyboardAndExit,
        }
    }

    /// Only the pointer grab stage cares where clicks land.
    #[must_use]
    pub const fn tracks_pointer(self) -> bool {
        matches!(self, Self::PointerGrabbed)
    }
}

impl StageAction {
    /// The stage after the action ran, `None` once the sequence is over.
    #[must_use]
    pub const fn next_stage(self) -> Option<GrabStage> {
        match self {
            Self::GrabPointer => Some(GrabStage::PointerGrabbed),
            Self::ReleasePointerGrabKeyboard => Some(GrabStage::KeyboardGrabbed),
            Self::ReleaseKeyboardAndExit => None,
        }
    }
}
