//! User agent handling for outbound requests.

use rand::seq::SliceRandom;

/// Real browser user agents used to identify requests.
pub const BROWSER_USER_AGENTS: &[&str] = &[
    // Chrome on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
    // Chrome on Mac
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
    // Firefox on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    // Firefox on Mac
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
    // Safari on Mac
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.1 Safari/605.1.15",
    // Edge on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0",
];

/// Pick a random browser user agent.
pub fn random_user_agent() -> &'static str {
    BROWSER_USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(BROWSER_USER_AGENTS[0])
}

/// How the `User-Agent` header is chosen for each request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UserAgentPolicy {
    /// A different real browser user agent per request.
    #[default]
    Rotate,
    /// Always the first built-in browser user agent.
    Fixed,
    /// A caller-supplied string.
    Custom(String),
}

impl UserAgentPolicy {
    /// Parse a config value.
    /// - "rotate" => random browser user agent per request
    /// - "fixed" => one browser user agent for every request
    /// - other => custom user agent string
    pub fn from_config(value: &str) -> Self {
        match value.trim() {
            "" | "rotate" => UserAgentPolicy::Rotate,
            "fixed" => UserAgentPolicy::Fixed,
            custom => UserAgentPolicy::Custom(custom.to_string()),
        }
    }

    /// User agent for the next request.
    pub fn resolve(&self) -> String {
        match self {
            UserAgentPolicy::Rotate => random_user_agent().to_string(),
            UserAgentPolicy::Fixed => BROWSER_USER_AGENTS[0].to_string(),
            UserAgentPolicy::Custom(ua) => ua.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        assert_eq!(UserAgentPolicy::from_config("rotate"), UserAgentPolicy::Rotate);
        assert_eq!(UserAgentPolicy::from_config(""), UserAgentPolicy::Rotate);
        assert_eq!(UserAgentPolicy::from_config("fixed"), UserAgentPolicy::Fixed);
        assert_eq!(
            UserAgentPolicy::from_config("MyBot/1.0"),
            UserAgentPolicy::Custom("MyBot/1.0".to_string())
        );
    }

    #[test]
    fn test_rotate_resolves_to_browser_agent() {
        for _ in 0..20 {
            let ua = UserAgentPolicy::Rotate.resolve();
            assert!(BROWSER_USER_AGENTS.contains(&ua.as_str()));
        }
    }

    #[test]
    fn test_fixed_is_stable() {
        assert_eq!(UserAgentPolicy::Fixed.resolve(), UserAgentPolicy::Fixed.resolve());
        assert!(UserAgentPolicy::Fixed.resolve().contains("Mozilla"));
    }

    #[test]
    fn test_custom_passthrough() {
        let policy = UserAgentPolicy::Custom("MyBot/1.0".to_string());
        assert_eq!(policy.resolve(), "MyBot/1.0");
    }
}
