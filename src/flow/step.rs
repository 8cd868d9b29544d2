//! Tutorial steps.

use crate::host::Element;
use crate::state_enum;

state_enum! {
    /// Steps of the guided-walking tutorial. Signals are step names: each
    /// step advances only on the signal naming its successor.
    pub enum Step {
        Menu,
        GroundCalibration,
        PhoneCalibration,
        SetHandHeight,
        PhoneInPocket,
        GetWalker,
        StandStraight,
        Follow,
    }
    final: [Follow]
}

impl Step {
    /// Scene elements this step shows and hides again when left.
    pub fn elements(self) -> &'static [Element] {
        match self {
            Step::Menu => &[Element::Menu],
            Step::GroundCalibration => &[Element::Instruction],
            Step::PhoneCalibration => &[Element::StepPanel(0)],
            Step::SetHandHeight => &[Element::StepPanel(1)],
            Step::PhoneInPocket => &[Element::StepPanel(2)],
            Step::GetWalker => &[Element::StepPanel(3)],
            Step::StandStraight => &[Element::StepPanel(4), Element::StepPanel(5)],
            Step::Follow => &[Element::Bubble, Element::Signs, Element::Warning],
        }
    }

    /// Successor in the calibration chain, `None` for the terminal step.
    pub fn successor(self) -> Option<Step> {
        match self {
            Step::Menu | Step::GroundCalibration => Some(Step::PhoneCalibration),
            Step::PhoneCalibration => Some(Step::SetHandHeight),
            Step::SetHandHeight => Some(Step::PhoneInPocket),
            Step::PhoneInPocket => Some(Step::GetWalker),
            Step::GetWalker => Some(Step::StandStraight),
            Step::StandStraight => Some(Step::Follow),
            Step::Follow => None,
        }
    }
}
