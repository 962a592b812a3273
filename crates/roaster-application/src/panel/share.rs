use reqwest::Url;
use roaster_core::config::RoasterConfig;
use roaster_core::generation::RoastResult;
use roaster_core::{Result, RoasterError};

/// Plain-text rendering of a roast for the clipboard.
pub fn roast_share_text(profile_name: Option<&str>, roast: &RoastResult) -> String {
    let mut text = format!(
        "🔥 LinkedIn Roast for {}\n\n",
        profile_name.unwrap_or("this profile")
    );

    if !roast.summary.is_empty() {
        text.push_str(&format!("🎯 FIRST IMPRESSION\n{}\n\n", roast.summary));
    }
    push_bullets(&mut text, "💪 WHAT'S WORKING", &roast.strengths);
    push_bullets(&mut text, "🔥 THE ROAST", &roast.weaknesses);
    push_bullets(&mut text, "💡 FEEDBACK", &roast.advice);

    if let Some(label) = roast.rating.filter(|r| *r > 0.0).and(roast.rating_label()) {
        text.push_str(&format!("📊 OVERALL RATING: {}\n\n", label));
    }

    text.push_str("Generated by 🔥 LinkedIn Roaster");
    text
}

fn push_bullets(text: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let bullets: Vec<String> = items.iter().map(|item| format!("• {}", item)).collect();
    text.push_str(&format!("{}\n{}\n\n", heading, bullets.join("\n")));
}

/// Daily-limit notice shown when a free user runs out of roasts.
pub fn limit_reached_notice(config: &RoasterConfig) -> String {
    format!(
        "🔥 Daily Roast Limit Reached ({limit}/{limit}). Upgrade to PRO ({price}) for unlimited burns and the Polish Surgeon!",
        limit = config.daily_roast_limit,
        price = config.pro_price_label
    )
}

/// Contact link with a prefilled upgrade request naming `email`.
pub fn upgrade_url(config: &RoasterConfig, email: &str) -> Result<Url> {
    let text = format!(
        "Hi! I want to upgrade my LinkedIn Roaster to PRO ({}). My email is: {}",
        config.pro_price_label, email
    );
    Url::parse_with_params(&config.upgrade_contact_url, &[("text", text)])
        .map_err(|e| RoasterError::config(format!("invalid upgrade_contact_url: {}", e)))
}
