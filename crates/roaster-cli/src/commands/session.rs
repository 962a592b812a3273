use anyhow::Result;
use roaster_core::session::User;

use super::Runtime;
use super::headless::ProfileFileTab;

fn describe(user: &User) -> String {
    let plan = if user.is_pro { "Pro" } else { "Free" };
    format!("{} <{}> ({})", user.display_name(), user.email, plan)
}

pub async fn status(runtime: &Runtime) -> Result<()> {
    let snapshot = runtime.store.load().await?;
    let limit = runtime.config.daily_roast_limit;

    println!("📂 Data directory: {}", runtime.paths.root().display());
    println!("🌐 Backend: {}", runtime.config.api_base());

    match &snapshot.session {
        Some(session) => println!("👤 Signed in as {}", describe(&session.user)),
        None => println!("👤 Not signed in"),
    }

    println!(
        "🔥 Roasts today ({}): {} used, {} left of {}",
        snapshot.usage.date,
        snapshot.usage.count,
        snapshot.usage.remaining(limit),
        limit
    );

    if let Some(stashed) = runtime.store.last_profile().await? {
        println!("📌 Stashed profile waiting for the panel: {}", stashed.url);
    }
    Ok(())
}

/// Exchanges `token` for a session the way the panel's sign-in does.
pub async fn sign_in(runtime: &Runtime, token: Option<String>) -> Result<()> {
    let mut panel = runtime.panel(ProfileFileTab::empty(), token).await?;

    if let Err(err) = panel.sign_in().await {
        if let Some(notice) = panel.take_notice() {
            eprintln!("⚠️  {}", notice);
        }
        return Err(err.into());
    }

    match panel.user() {
        Some(user) => {
            println!("✅ Signed in as {}", describe(user));
            Ok(())
        }
        None => anyhow::bail!("Sign-in was not completed"),
    }
}

/// Re-checks the subscription status of the signed-in user.
pub async fn sync_pro(runtime: &Runtime) -> Result<()> {
    let mut panel = runtime.signed_in_panel(ProfileFileTab::empty()).await?;
    let email = panel.user().map(|user| user.email.clone()).unwrap_or_default();
    panel.sync_pro_status(&email).await?;

    if let Some(user) = panel.user() {
        println!("💳 {}", describe(user));
    }
    if let Some(summary) = panel.usage_summary().await? {
        println!("🔥 Roasts left today: {}", summary);
    }
    Ok(())
}

pub async fn sign_out(runtime: &Runtime) -> Result<()> {
    let mut panel = runtime.panel(ProfileFileTab::empty(), None).await?;
    panel.sign_out().await?;
    println!("👋 Signed out. Today's usage is kept.");
    Ok(())
}
