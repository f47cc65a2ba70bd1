use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use anyhow::bail;

use crate::models::UserProfile;

const COLORS: [&str; 6] = ["blue", "purple", "pink", "indigo", "teal", "orange"];

/// Deterministic palette pick so the same username always renders with the
/// same color across sessions.
fn pick_color(username: &str) -> String {
    let mut hasher = DefaultHasher::new();
    username.hash(&mut hasher);
    COLORS[(hasher.finish() % COLORS.len() as u64) as usize].to_string()
}

/// Register a new local account and return its profile. The caller appends
/// it to the user list and treats it as logged in.
pub fn register(
    users: &[UserProfile],
    username: &str,
    password: &str,
) -> anyhow::Result<UserProfile> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        bail!("username and password are both required");
    }
    if users.iter().any(|u| u.username == username) {
        bail!("username '{username}' already exists");
    }

    Ok(UserProfile {
        username: username.to_string(),
        password: Some(password.to_string()),
        color: pick_color(username),
        external: false,
    })
}

/// Exact username/password match against the registered accounts. This is
/// attribution, not a security boundary: passwords are stored in plain
/// text in the local user blob.
pub fn login(users: &[UserProfile], username: &str, password: &str) -> anyhow::Result<UserProfile> {
    users
        .iter()
        .find(|u| u.username == username && u.password.as_deref() == Some(password))
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("invalid username or password"))
}

/// Fabricates an externally-authenticated profile. No identity is verified;
/// this mirrors the original's simulated third-party sign-in.
pub fn external_login(name: &str) -> anyhow::Result<UserProfile> {
    let name = name.trim();
    if name.is_empty() {
        bail!("a display name is required for external login");
    }
    Ok(UserProfile {
        username: name.to_string(),
        password: None,
        color: "red".to_string(),
        external: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_login() {
        let mut users = Vec::new();
        let profile = register(&users, "ops", "hunter2").unwrap();
        users.push(profile);

        let logged_in = login(&users, "ops", "hunter2").unwrap();
        assert_eq!(logged_in.username, "ops");
        assert!(!logged_in.external);
    }

    #[test]
    fn duplicate_username_rejected() {
        let users = vec![register(&[], "ops", "hunter2").unwrap()];
        assert!(register(&users, "ops", "other").is_err());
    }

    #[test]
    fn wrong_password_rejected() {
        let users = vec![register(&[], "ops", "hunter2").unwrap()];
        assert!(login(&users, "ops", "wrong").is_err());
        assert!(login(&users, "nobody", "hunter2").is_err());
    }

    #[test]
    fn external_login_needs_no_password() {
        let profile = external_login("Field Office").unwrap();
        assert!(profile.external);
        assert!(profile.password.is_none());
        assert_eq!(profile.color, "red");

        assert!(external_login("   ").is_err());
    }

    #[test]
    fn color_is_stable_per_username() {
        assert_eq!(pick_color("ops"), pick_color("ops"));
        assert!(COLORS.contains(&pick_color("ops").as_str()));
    }
}
