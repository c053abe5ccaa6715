//! Step navigation gate.
//!
//! Rules are evaluated in order:
//! 1. `target == previous` is ignored.
//! 2. Step 0 is always reachable while no step has been validated.
//! 3. Moving backward requires the target step to be validated.
//! 4. Moving forward is limited to the next step, and only once the step being left is
//!    validated.
//!
//! A refused move reverts to `previous` one tick later; see `WizardSession`.

use serde::Serialize;

use super::domain::{ValidityVector, WizardStep};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "step", rename_all = "snake_case")]
pub enum NavigationDecision {
    Ignore,
    Allow(WizardStep),
    Revert(WizardStep),
}

pub fn decide(
    previous: WizardStep,
    target: WizardStep,
    validity: &ValidityVector,
) -> NavigationDecision {
    if target == previous {
        return NavigationDecision::Ignore;
    }

    if target == WizardStep::PersonalData && validity.none_validated() {
        return NavigationDecision::Allow(target);
    }

    let allowed = if target < previous {
        validity.get(target)
    } else {
        previous.next() == Some(target) && validity.get(previous)
    };

    if allowed {
        NavigationDecision::Allow(target)
    } else {
        NavigationDecision::Revert(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(bits: u8) -> ValidityVector {
        ValidityVector::from_flags([
            bits & 0b0001 != 0,
            bits & 0b0010 != 0,
            bits & 0b0100 != 0,
            bits & 0b1000 != 0,
        ])
    }

    fn expected(previous: WizardStep, target: WizardStep, validity: &ValidityVector) -> NavigationDecision {
        let (p, t) = (previous.index(), target.index());
        if p == t {
            NavigationDecision::Ignore
        } else if t == 0 && validity.flags().iter().all(|flag| !flag) {
            NavigationDecision::Allow(target)
        } else if t < p && validity.flags()[t] {
            NavigationDecision::Allow(target)
        } else if t == p + 1 && validity.flags()[p] {
            NavigationDecision::Allow(target)
        } else {
            NavigationDecision::Revert(previous)
        }
    }

    #[test]
    fn decision_matches_rules_for_every_configuration() {
        for bits in 0..16u8 {
            let validity = vector(bits);
            for previous in WizardStep::ordered() {
                for target in WizardStep::ordered() {
                    let decision = decide(previous, target, &validity);
                    assert_eq!(
                        decision,
                        expected(previous, target, &validity),
                        "previous={previous} target={target} validity={:?}",
                        validity.flags()
                    );
                    if let NavigationDecision::Revert(step) = decision {
                        assert_eq!(step, previous, "reverts always return to the previous step");
                    }
                }
            }
        }
    }

    #[test]
    fn first_step_is_reachable_on_untouched_form() {
        assert_eq!(
            decide(WizardStep::Summary, WizardStep::PersonalData, &vector(0)),
            NavigationDecision::Allow(WizardStep::PersonalData)
        );
    }

    #[test]
    fn skipping_ahead_is_reverted_even_when_current_step_is_valid() {
        assert_eq!(
            decide(WizardStep::ResidentialInfo, WizardStep::Summary, &vector(0b0011)),
            NavigationDecision::Revert(WizardStep::ResidentialInfo)
        );
    }

    #[test]
    fn forward_requires_the_step_being_left_to_be_validated() {
        assert_eq!(
            decide(WizardStep::PersonalData, WizardStep::ResidentialInfo, &vector(0)),
            NavigationDecision::Revert(WizardStep::PersonalData)
        );
        assert_eq!(
            decide(WizardStep::PersonalData, WizardStep::ResidentialInfo, &vector(0b0001)),
            NavigationDecision::Allow(WizardStep::ResidentialInfo)
        );
    }

    #[test]
    fn backward_requires_the_target_to_be_validated() {
        assert_eq!(
            decide(WizardStep::ProfessionalInfo, WizardStep::PersonalData, &vector(0b0010)),
            NavigationDecision::Revert(WizardStep::ProfessionalInfo)
        );
        assert_eq!(
            decide(WizardStep::ProfessionalInfo, WizardStep::ResidentialInfo, &vector(0b0010)),
            NavigationDecision::Allow(WizardStep::ResidentialInfo)
        );
    }
}
