//! Navigation seam between the session layer and whatever hosts it
//!
//! The HTTP layer needs to send the user to the login entry point when a
//! session dies; the guard needs to redirect between routes. Neither knows
//! how navigation is actually performed, so both go through [`Navigator`].

use std::fmt;

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";

/// Navigation target with an optional `redirect` query parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub redirect: Option<String>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            redirect: None,
        }
    }

    pub fn home() -> Self {
        Self::new(HOME_PATH)
    }

    pub fn login() -> Self {
        Self::new(LOGIN_PATH)
    }

    /// Login location that remembers where the user was heading
    pub fn login_with_redirect(intended: impl Into<String>) -> Self {
        Self {
            path: LOGIN_PATH.to_string(),
            redirect: Some(intended.into()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.redirect {
            Some(redirect) => write!(f, "{}?redirect={}", self.path, encode_query(redirect)),
            None => f.write_str(&self.path),
        }
    }
}

fn encode_query(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Performs a hard navigation
pub trait Navigator: Send + Sync {
    fn navigate(&self, location: Location);
}

/// Navigator that only records the request in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, location: Location) {
        tracing::info!(target = %location, "Navigation requested");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        assert_eq!(Location::home().to_string(), "/");
        assert_eq!(
            Location::login_with_redirect("/checkout").to_string(),
            "/login?redirect=%2Fcheckout"
        );
        assert_eq!(
            Location::login_with_redirect("/cart?step=2&x=y").to_string(),
            "/login?redirect=%2Fcart%3Fstep%3D2%26x%3Dy"
        );
    }
}
