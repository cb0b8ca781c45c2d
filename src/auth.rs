use anyhow::{Context, Result, anyhow};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::User;
use crate::store::Store;

// Mock authentication. One shared password, an unsigned base64 token, a
// session file standing in for browser local storage. Not a security
// boundary: anyone can mint a token that passes these checks.

const MOCK_PASSWORD: &str = "password123";

const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;
const REFRESH_AFTER_SECS: i64 = 23 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPayload {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub company: Option<String>,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// The two fixed keys the original kept in local storage.
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    auth_token: String,
    auth_user: User,
}

pub fn issue_token(user: &User, now: i64) -> String {
    let payload = TokenPayload {
        user_id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        company: user.company.clone(),
        role: user.role.clone(),
        iat: now,
        exp: now + TOKEN_TTL_SECS,
    };
    encode_token(&payload)
}

pub fn encode_token(payload: &TokenPayload) -> String {
    // Serializing a plain struct cannot fail.
    let json = serde_json::to_vec(payload).expect("token payload serializes");
    BASE64.encode(json)
}

pub fn decode_token(token: &str) -> Result<TokenPayload> {
    let bytes = BASE64.decode(token).context("Malformed session token")?;
    serde_json::from_slice(&bytes).context("Malformed session token payload")
}

pub fn token_valid(payload: &TokenPayload, now: i64) -> bool {
    now < payload.exp
}

/// The original reissued the token on a 23-hour timer; here the check runs
/// whenever a session is loaded.
pub fn token_needs_refresh(payload: &TokenPayload, now: i64) -> bool {
    now - payload.iat >= REFRESH_AFTER_SECS
}

/// Validate credentials against the seed list. The error does not say which
/// part was wrong.
pub fn authenticate<'a>(store: &'a Store, email: &str, password: &str) -> Result<&'a User> {
    if password != MOCK_PASSWORD {
        return Err(anyhow!("Invalid email or password"));
    }
    store
        .user_by_email(email)
        .ok_or_else(|| anyhow!("Invalid email or password"))
}

pub fn login(store: &Store, email: &str, password: &str) -> Result<User> {
    let user = authenticate(store, email, password)?;
    let token = issue_token(user, Utc::now().timestamp());
    write_session(&StoredSession {
        auth_token: token,
        auth_user: user.clone(),
    })?;
    Ok(user.clone())
}

pub fn logout() -> Result<()> {
    let path = session_path()?;
    if path.exists() {
        std::fs::remove_file(&path)
            .with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Load the logged-in user, if the stored token is still valid. Refreshes
/// the token in place when it is close to expiry.
pub fn current_user() -> Result<Option<User>> {
    let path = session_path()?;
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let session: StoredSession = match serde_json::from_str(&raw) {
        Ok(s) => s,
        Err(_) => {
            // Unreadable session, treat as logged out.
            let _ = std::fs::remove_file(&path);
            return Ok(None);
        }
    };

    let payload = match decode_token(&session.auth_token) {
        Ok(p) => p,
        Err(_) => {
            let _ = std::fs::remove_file(&path);
            return Ok(None);
        }
    };

    let now = Utc::now().timestamp();
    if !token_valid(&payload, now) {
        let _ = std::fs::remove_file(&path);
        return Ok(None);
    }

    if token_needs_refresh(&payload, now) {
        let token = issue_token(&session.auth_user, now);
        write_session(&StoredSession {
            auth_token: token,
            auth_user: session.auth_user.clone(),
        })?;
    }

    Ok(Some(session.auth_user))
}

fn write_session(session: &StoredSession) -> Result<()> {
    let path = session_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(session)?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))
}

fn session_path() -> Result<PathBuf> {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "procure") {
        Ok(proj_dirs.data_dir().join("session.json"))
    } else {
        // Fallback to current directory
        Ok(PathBuf::from("procure-session.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_user() -> User {
        User {
            id: 7,
            email: "test@example.com".to_string(),
            name: "Test User".to_string(),
            company: Some("Test Co".to_string()),
            role: "user".to_string(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let user = seed_user();
        let token = issue_token(&user, 1_000_000);
        let payload = decode_token(&token).unwrap();
        assert_eq!(payload.user_id, 7);
        assert_eq!(payload.email, "test@example.com");
        assert_eq!(payload.role, "user");
        assert_eq!(payload.iat, 1_000_000);
        assert_eq!(payload.exp, 1_000_000 + TOKEN_TTL_SECS);
    }

    #[test]
    fn test_token_expiry_boundary() {
        let user = seed_user();
        let payload = decode_token(&issue_token(&user, 0)).unwrap();
        assert!(token_valid(&payload, TOKEN_TTL_SECS - 1));
        assert!(!token_valid(&payload, TOKEN_TTL_SECS));
        assert!(!token_valid(&payload, TOKEN_TTL_SECS + 1));
    }

    #[test]
    fn test_refresh_threshold_is_23_hours() {
        let user = seed_user();
        let payload = decode_token(&issue_token(&user, 0)).unwrap();
        assert!(!token_needs_refresh(&payload, REFRESH_AFTER_SECS - 1));
        assert!(token_needs_refresh(&payload, REFRESH_AFTER_SECS));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_token("not base64!!!").is_err());
        let not_json = BASE64.encode(b"hello");
        assert!(decode_token(&not_json).is_err());
    }

    #[test]
    fn test_authenticate_checks_password_and_email() {
        let store = Store::seed();
        assert!(authenticate(&store, "avery@citymetro.gov", "password123").is_ok());
        assert!(authenticate(&store, "avery@citymetro.gov", "wrong").is_err());
        assert!(authenticate(&store, "nobody@nowhere.test", "password123").is_err());
        // Email lookup is case-insensitive.
        assert!(authenticate(&store, "Avery@CityMetro.gov", "password123").is_ok());
    }
}
