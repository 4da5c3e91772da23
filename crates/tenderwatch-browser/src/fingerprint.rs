use rand::seq::SliceRandom;

/// Common desktop user agents
const USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

/// Identity the browser presents to the listing site
#[derive(Debug, Clone)]
pub struct FingerprintConfig {
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl FingerprintConfig {
    /// Fixed viewport with a randomly chosen desktop user agent
    pub fn randomized(viewport_width: u32, viewport_height: u32) -> Self {
        let mut rng = rand::thread_rng();
        let user_agent = USER_AGENTS
            .choose(&mut rng)
            .copied()
            .unwrap_or(USER_AGENTS[0]);

        Self {
            user_agent: user_agent.to_string(),
            viewport_width,
            viewport_height,
        }
    }

    /// Use the configured user agent if any, otherwise randomize
    pub fn resolve(user_agent: Option<&str>, viewport_width: u32, viewport_height: u32) -> Self {
        match user_agent {
            Some(agent) if !agent.trim().is_empty() => Self {
                user_agent: agent.to_string(),
                viewport_width,
                viewport_height,
            },
            _ => Self::randomized(viewport_width, viewport_height),
        }
    }
}
