use std::path::Path;

use anyhow::Result;
use roaster_application::PanelController;
use roaster_application::panel::ActivityState;

use super::Runtime;
use super::headless::ProfileFileTab;

/// Shows whatever the panel would show after an action.
fn report(panel: &mut PanelController) -> Result<()> {
    if let Some(notice) = panel.take_notice() {
        println!("⚠️  {}", notice);
    }
    if let Some(ActivityState::Error(err)) = panel.state().activity() {
        anyhow::bail!("{}", err.message);
    }
    Ok(())
}

/// Roasts the profile stored in `profile_path`.
pub async fn roast(runtime: &Runtime, profile_path: &Path) -> Result<()> {
    let tab = ProfileFileTab::load(profile_path)?;
    let mut panel = runtime.signed_in_panel(tab).await?;

    if panel.profile().is_none() {
        anyhow::bail!("{}", panel.status().text);
    }

    println!("🔥 Roasting {}...", panel.profile().map_or("", |p| p.display_name()));
    panel.roast().await?;
    report(&mut panel)?;

    if let Some(text) = panel.roast_share_text() {
        println!();
        println!("{}", text);
    }
    match panel.usage_summary().await? {
        Some(summary) => println!("🔥 Roasts left today: {}", summary),
        None => println!("💎 Pro: unlimited roasts"),
    }
    Ok(())
}

/// Runs the Pro rewrite for the profile in `profile_path`, optionally
/// grounded in a fresh roast.
pub async fn polish(runtime: &Runtime, profile_path: &Path, with_roast: bool) -> Result<()> {
    let tab = ProfileFileTab::load(profile_path)?;
    let mut panel = runtime.signed_in_panel(tab).await?;

    if with_roast {
        panel.roast().await?;
        report(&mut panel)?;
    }

    panel.polish().await?;
    report(&mut panel)?;

    if let Some(polished) = panel.last_polish() {
        println!("{}", serde_json::to_string_pretty(polished)?);
    } else if panel.user().is_some_and(|user| !user.is_pro) {
        println!("🔗 Upgrade: {}", panel.upgrade_url()?);
    }
    Ok(())
}
