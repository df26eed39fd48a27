use colored::*;

use crate::models::Step;
use crate::render::{
    duration_label, CardImage, RecommendationCard, RenderedRecommendations, StarGlyph,
};

use super::{HeadlessView, SelectId, SelectOption, ViewSnapshot, WizardView};

/// Draws the wizard on stdout
///
/// Display state is mirrored into a `HeadlessView` so the prompt loop can read the
/// current selects and cards back.
#[derive(Debug, Default)]
pub struct TerminalView {
    state: HeadlessView,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.state.snapshot()
    }
}

fn step_title(step: Step) -> &'static str {
    match step {
        Step::Identity => "Tell us about yourself",
        Step::Preferences => "Your preferences",
        Step::Results => "Recommended cars",
    }
}

pub fn format_stars(stars: &[StarGlyph]) -> String {
    stars
        .iter()
        .map(|glyph| match glyph {
            StarGlyph::Full => "★",
            StarGlyph::Half => "⯪",
            StarGlyph::Empty => "☆",
        })
        .collect()
}

pub fn format_card(index: usize, card: &RecommendationCard) -> String {
    let mut out = format!(
        "{} {}  {}\n",
        format!("[{}]", index + 1).bold(),
        card.title.bold(),
        format_stars(&card.stars).yellow()
    );

    if let CardImage::Url(url) = &card.image {
        out.push_str(&format!("    {}\n", url.dimmed()));
    } else {
        out.push_str(&format!("    {}\n", "No Image".dimmed()));
    }

    for attribute in &card.attributes {
        out.push_str(&format!("    {:<13} {}\n", format!("{}:", attribute.label), attribute.value));
    }

    let durations: Vec<String> = card.durations.iter().map(|d| duration_label(*d)).collect();
    out.push_str(&format!(
        "    {}   {}\n",
        card.price.to_string().green().bold(),
        durations.join(" | ").dimmed()
    ));
    out
}

impl WizardView for TerminalView {
    fn set_step_visible(&self, step: Step) {
        self.state.set_step_visible(step);
        println!();
        println!(
            "{} {}",
            format!("Step {}:", step.number()).cyan().bold(),
            step_title(step).bold()
        );
    }

    fn show_error(&self, scope: Step, message: &str) {
        self.state.show_error(scope, message);
        eprintln!("{} {}", "[-]".red().bold(), message.red());
    }

    fn clear_errors(&self) {
        self.state.clear_errors();
    }

    fn set_loading(&self, scope: Step, loading: bool) {
        self.state.set_loading(scope, loading);
        if loading {
            println!("{}", "Loading...".dimmed());
        }
    }

    fn populate_select(&self, select: SelectId, options: Vec<SelectOption>) {
        tracing::debug!(?select, options = options.len(), "Select populated");
        self.state.populate_select(select, options);
    }

    fn render_recommendations(&self, rendered: &RenderedRecommendations) {
        self.state.render_recommendations(rendered);
        match rendered {
            RenderedRecommendations::Empty { message } => println!("{}", message.yellow()),
            RenderedRecommendations::Cards { cards } => {
                for (index, card) in cards.iter().enumerate() {
                    println!("{}", format_card(index, card));
                }
            }
        }
    }

    fn navigate(&self, url: &str) {
        self.state.navigate(url);
        println!("{} {}", "Continue your booking at".green().bold(), url.underline());
    }
}
