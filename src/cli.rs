//! Interactive prompt loop driving the wizard from a terminal.

use std::sync::Arc;
use std::time::Duration;

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use tripglide_wizard::{
    config::IdentityMode,
    models::{IdentityForm, PreferencesForm, Step},
    render::{duration_label, RecommendationCard},
    view::{SelectId, TerminalView},
    wizard::WizardController,
};

const FALLBACK_POLL: Duration = Duration::from_millis(100);

/// Runs blocking prompt code off the async runtime
async fn blocking<T, F>(prompt: F) -> anyhow::Result<T>
where
    F: FnOnce(&ColorfulTheme) -> Result<T, dialoguer::Error> + Send + 'static,
    T: Send + 'static,
{
    let value = tokio::task::spawn_blocking(move || prompt(&ColorfulTheme::default())).await??;
    Ok(value)
}

fn choose_or_type(
    theme: &ColorfulTheme,
    prompt: &str,
    choices: &[String],
) -> Result<Option<String>, dialoguer::Error> {
    if choices.is_empty() {
        let value = Input::<String>::with_theme(theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        return Ok(Some(value));
    }

    let index = Select::with_theme(theme)
        .with_prompt(prompt)
        .items(choices)
        .default(0)
        .interact_opt()?;
    Ok(index.map(|i| choices[i].clone()))
}

fn text(theme: &ColorfulTheme, prompt: &str) -> Result<String, dialoguer::Error> {
    Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
}

fn identity_prompt(
    theme: &ColorfulTheme,
    mode: IdentityMode,
    locations: &[String],
) -> Result<Option<IdentityForm>, dialoguer::Error> {
    let form = match mode {
        IdentityMode::NameEmail => {
            let name = text(theme, "Name")?;
            let email = text(theme, "Email")?;
            let Some(location) = choose_or_type(theme, "Pickup location", locations)? else {
                return Ok(None);
            };
            IdentityForm::NameEmail {
                name,
                email,
                location,
            }
        }
        IdentityMode::UserId => {
            let user_id = text(theme, "User ID")?;
            let Some(location) = choose_or_type(theme, "Pickup location", locations)? else {
                return Ok(None);
            };
            IdentityForm::UserId { user_id, location }
        }
    };
    Ok(Some(form))
}

fn preferences_prompt(
    theme: &ColorfulTheme,
    car_types: &[String],
) -> Result<Option<PreferencesForm>, dialoguer::Error> {
    let Some(car_type) = choose_or_type(theme, "Car type", car_types)? else {
        return Ok(None);
    };

    let max_price = Input::<String>::with_theme(theme)
        .with_prompt("Maximum price per hour (blank for any)")
        .allow_empty(true)
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() || input.trim().parse::<f64>().is_ok() {
                Ok(())
            } else {
                Err("Enter a number")
            }
        })
        .interact_text()?;

    let ac_required = Confirm::with_theme(theme)
        .with_prompt("AC required?")
        .default(true)
        .interact()?;
    let unlimited_mileage = Confirm::with_theme(theme)
        .with_prompt("Unlimited mileage?")
        .default(true)
        .interact()?;

    Ok(Some(PreferencesForm {
        car_type,
        max_price: max_price.trim().parse().ok(),
        ac_required,
        unlimited_mileage,
    }))
}

enum ResultsChoice {
    Book { card: usize, days: u32 },
    ChangePreferences,
    Quit,
}

fn results_prompt(
    theme: &ColorfulTheme,
    cards: &[RecommendationCard],
) -> Result<ResultsChoice, dialoguer::Error> {
    let mut items: Vec<String> = cards
        .iter()
        .enumerate()
        .map(|(i, card)| format!("[{}] Book {} ({})", i + 1, card.title, card.price))
        .collect();
    items.push("Change preferences".to_string());
    items.push("Quit".to_string());

    let Some(index) = Select::with_theme(theme)
        .with_prompt("What next?")
        .items(&items)
        .default(0)
        .interact_opt()?
    else {
        return Ok(ResultsChoice::Quit);
    };

    if index == cards.len() {
        return Ok(ResultsChoice::ChangePreferences);
    }
    if index > cards.len() {
        return Ok(ResultsChoice::Quit);
    }

    let durations = cards[index].durations;
    let labels: Vec<String> = durations.iter().map(|d| duration_label(*d)).collect();
    let Some(choice) = Select::with_theme(theme)
        .with_prompt("Rental duration")
        .items(&labels)
        .default(0)
        .interact_opt()?
    else {
        return Ok(ResultsChoice::ChangePreferences);
    };

    Ok(ResultsChoice::Book {
        card: index,
        days: durations[choice],
    })
}

/// Drives the wizard until the user books a car or quits
pub async fn run(
    controller: WizardController,
    view: Arc<TerminalView>,
    mode: IdentityMode,
) -> anyhow::Result<()> {
    controller.start().await;

    loop {
        let state = controller.state().await;
        if state.booking.is_some() {
            return Ok(());
        }

        match state.current_step {
            Step::Identity => {
                if controller.fallback_pending() {
                    tokio::time::sleep(FALLBACK_POLL).await;
                    continue;
                }

                let locations = view.snapshot().select_values(SelectId::Location);
                let form = blocking(move |theme| identity_prompt(theme, mode, &locations)).await?;
                let Some(form) = form else {
                    return Ok(());
                };
                // Failures are already on screen; the loop re-prompts
                let _ = controller.submit_identity(form).await;
            }
            Step::Preferences => {
                let car_types = view.snapshot().select_values(SelectId::CarType);
                let form = blocking(move |theme| preferences_prompt(theme, &car_types)).await?;
                let Some(form) = form else {
                    return Ok(());
                };
                let _ = controller.submit_preferences(form).await;
            }
            Step::Results => {
                let cards = controller
                    .rendered()
                    .await
                    .map(|rendered| rendered.cards().to_vec())
                    .unwrap_or_default();

                let prompt_cards = cards.clone();
                let choice = blocking(move |theme| results_prompt(theme, &prompt_cards)).await?;
                match choice {
                    ResultsChoice::Book { card, days } => {
                        let _ = controller.book(cards[card].car_id.clone(), days).await;
                    }
                    ResultsChoice::ChangePreferences => {
                        controller.go_to_step(Step::Preferences).await;
                    }
                    ResultsChoice::Quit => return Ok(()),
                }
            }
        }
    }
}
