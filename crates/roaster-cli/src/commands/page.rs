use roaster_core::profile::{TabPageState, profile_handle};

/// Prints how the router would classify `url`.
pub fn check_url(url: &str) {
    match TabPageState::classify(Some(url)) {
        TabPageState::ValidProfilePage { url } => {
            println!("✅ LinkedIn profile page: {}", url);
            if let Some(handle) = profile_handle(&url) {
                println!("   Handle: {}", handle);
            }
        }
        TabPageState::NotProfilePage => {
            println!("❌ Not a LinkedIn profile page: {}", url);
        }
    }
}
