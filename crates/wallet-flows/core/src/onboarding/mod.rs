//! The welcome sequence shown to new users and the reward claim that follows
//! phone verification.

mod screens;

use std::sync::Arc;

pub use screens::*;

use crate::{
    error::FlowError,
    models::Route,
    persist::{ObjectCacheRepository, Storage},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OnboardingStep {
    Galoy,
    Bank,
    Bitcoin,
    Earn,
    FirstSats,
    /// Phone verification, owned by another flow
    PhoneInput,
    WelcomeBackCompleted,
    FirstReward,
    AllDone,
}

/// What a step screen shows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepContent {
    pub image: &'static str,
    pub header: Option<&'static str>,
    pub text: &'static str,
}

impl OnboardingStep {
    pub const ALL: [OnboardingStep; 9] = [
        OnboardingStep::Galoy,
        OnboardingStep::Bank,
        OnboardingStep::Bitcoin,
        OnboardingStep::Earn,
        OnboardingStep::FirstSats,
        OnboardingStep::PhoneInput,
        OnboardingStep::WelcomeBackCompleted,
        OnboardingStep::FirstReward,
        OnboardingStep::AllDone,
    ];

    /// Where the step's primary action leads. `None` for steps this crate
    /// does not drive.
    pub fn next(self) -> Option<Route> {
        match self {
            OnboardingStep::Galoy => Some(Route::Onboarding(OnboardingStep::Bank)),
            OnboardingStep::Bank => Some(Route::Onboarding(OnboardingStep::Bitcoin)),
            OnboardingStep::Bitcoin => Some(Route::Onboarding(OnboardingStep::Earn)),
            OnboardingStep::Earn => Some(Route::Onboarding(OnboardingStep::FirstSats)),
            OnboardingStep::FirstSats => Some(Route::Onboarding(OnboardingStep::PhoneInput)),
            OnboardingStep::PhoneInput => None,
            OnboardingStep::WelcomeBackCompleted => {
                Some(Route::Onboarding(OnboardingStep::FirstReward))
            }
            OnboardingStep::FirstReward => Some(Route::Onboarding(OnboardingStep::AllDone)),
            OnboardingStep::AllDone => Some(Route::PrimaryStack),
        }
    }

    pub fn route_name(self) -> &'static str {
        match self {
            OnboardingStep::Galoy => "welcomeGaloy",
            OnboardingStep::Bank => "welcomeBank",
            OnboardingStep::Bitcoin => "welcomeBitcoin",
            OnboardingStep::Earn => "welcomeEarn",
            OnboardingStep::FirstSats => "welcomeFirstSats",
            OnboardingStep::PhoneInput => "welcomePhoneInput",
            OnboardingStep::WelcomeBackCompleted => "welcomeBackCompleted",
            OnboardingStep::FirstReward => "firstReward",
            OnboardingStep::AllDone => "allDone",
        }
    }

    /// Only steps that need nothing beyond navigation can be driven by
    /// [`StaticStepScreen`]
    pub fn is_static(self) -> bool {
        matches!(
            self,
            OnboardingStep::Galoy
                | OnboardingStep::Bank
                | OnboardingStep::Bitcoin
                | OnboardingStep::Earn
                | OnboardingStep::FirstSats
        )
    }

    pub fn content(self) -> Option<StepContent> {
        let content = match self {
            OnboardingStep::Galoy => StepContent {
                image: "GaloyLogo.png",
                header: None,
                text: "Welcome! Galoy is a new type of app for managing your money",
            },
            OnboardingStep::Bank => StepContent {
                image: "DollarCardATMLogo.png",
                header: None,
                text: "It's a digital bank account",
            },
            OnboardingStep::Bitcoin => StepContent {
                image: "BitcoinLockLogo.png",
                header: None,
                text: "And a secure Bitcoin wallet too!",
            },
            OnboardingStep::Earn => StepContent {
                image: "PresentLogo.png",
                header: None,
                text: "By using Galoy you earn Bitcoin",
            },
            OnboardingStep::FirstSats => StepContent {
                image: "PartyPopperLogo.png",
                header: Some("+1,000 sats"),
                text: "You've earned some sats for installing the Galoy app. Sats are small portions of bitcoin. Hooray!",
            },
            OnboardingStep::PhoneInput => return None,
            OnboardingStep::WelcomeBackCompleted => StepContent {
                image: "PartyPopperLogo.png",
                header: Some("Welcome back!"),
                text: "Your wallet is ready.\nNow send us a payment request so we can send your sats.",
            },
            // The header shows the live balance
            OnboardingStep::FirstReward => StepContent {
                image: "LightningBolt.png",
                header: None,
                text: "Success!\n\nYou\u{2019}ve been paid\nyour first reward.",
            },
            OnboardingStep::AllDone => StepContent {
                image: "GaloyLogo.png",
                header: None,
                text: "All done here, you're finished setting up a wallet",
            },
        };
        Some(content)
    }
}

/// Whether the user went through the welcome sequence. Once onboarded, the
/// marker is never cleared by the flows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OnboardingProgress {
    #[default]
    NotStarted,
    Onboarded,
}

impl OnboardingProgress {
    pub async fn load(storage: Arc<dyn Storage>) -> Result<Self, FlowError> {
        Ok(ObjectCacheRepository::new(storage)
            .fetch_onboarding_progress()
            .await?)
    }

    /// Screen to open on launch
    pub fn initial_route(self) -> Route {
        match self {
            OnboardingProgress::NotStarted => Route::Onboarding(OnboardingStep::Galoy),
            OnboardingProgress::Onboarded => Route::PrimaryStack,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{OnboardingProgress, OnboardingStep};
    use crate::{
        models::Route,
        persist::{MemoryStorage, Storage},
    };

    #[test]
    fn test_transition_table() {
        let mut route = Route::Onboarding(OnboardingStep::Galoy);
        let mut visited = vec![route.name()];
        while let Route::Onboarding(step) = route {
            let Some(next) = step.next() else { break };
            visited.push(next.name());
            route = next;
        }
        assert_eq!(
            visited,
            vec![
                "welcomeGaloy",
                "welcomeBank",
                "welcomeBitcoin",
                "welcomeEarn",
                "welcomeFirstSats",
                "welcomePhoneInput",
            ]
        );

        assert_eq!(
            OnboardingStep::WelcomeBackCompleted.next(),
            Some(Route::Onboarding(OnboardingStep::FirstReward))
        );
        assert_eq!(
            OnboardingStep::FirstReward.next(),
            Some(Route::Onboarding(OnboardingStep::AllDone))
        );
        assert_eq!(OnboardingStep::AllDone.next(), Some(Route::PrimaryStack));
        assert_eq!(Route::PrimaryStack.name(), "primaryStack");
    }

    #[test]
    fn test_every_driven_step_has_content() {
        for step in OnboardingStep::ALL {
            assert_eq!(
                step.content().is_some(),
                step != OnboardingStep::PhoneInput,
                "{step:?}"
            );
        }
        assert_eq!(
            OnboardingStep::FirstSats.content().unwrap().header,
            Some("+1,000 sats")
        );
    }

    #[tokio::test]
    async fn test_initial_route_follows_marker() {
        let storage = Arc::new(MemoryStorage::new());
        let progress = OnboardingProgress::load(storage.clone()).await.unwrap();
        assert_eq!(progress, OnboardingProgress::NotStarted);
        assert_eq!(
            progress.initial_route(),
            Route::Onboarding(OnboardingStep::Galoy)
        );

        storage
            .set_cached_item("onboarding".to_string(), "onboarded".to_string())
            .await
            .unwrap();
        let progress = OnboardingProgress::load(storage).await.unwrap();
        assert_eq!(progress.initial_route(), Route::PrimaryStack);
    }
}
