//! Host capability detection and environment classification.
//!
//! The controller asks three questions of its host: can it recognize speech at
//! all, is the page in a secure context, and is it a local-development host.
//! `HostEnvironment` answers them from a description of the hosting page;
//! `FixedCapabilities` answers them with constants.

use murmur_core::config::SpeechConfig;

/// Capability queries consumed at session start.
///
/// Implementations must never panic. A host without a page (headless, server
/// side) answers `false` to everything.
pub trait CapabilityProvider: Send {
    fn supports_recognition(&self) -> bool;
    fn is_secure_context(&self) -> bool;
    fn is_local_development(&self) -> bool;
}

/// Hostnames that count as local development.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalHostPolicy {
    hosts: Vec<String>,
}

impl Default for LocalHostPolicy {
    fn default() -> Self {
        Self::new(["localhost", "127.0.0.1"])
    }
}

impl LocalHostPolicy {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hosts: hosts
                .into_iter()
                .map(|h| h.into().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &SpeechConfig) -> Self {
        Self::new(config.local_hosts.iter().cloned())
    }

    pub fn matches(&self, hostname: &str) -> bool {
        let hostname = hostname.to_ascii_lowercase();
        self.hosts.iter().any(|h| *h == hostname)
    }
}

/// Which recognition entry points the host exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryPoints {
    /// Unprefixed `SpeechRecognition`.
    pub standard: bool,
    /// Vendor-prefixed `webkitSpeechRecognition`.
    pub webkit: bool,
}

impl EntryPoints {
    pub fn any(&self) -> bool {
        self.standard || self.webkit
    }
}

/// Location of the hosting page.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PageLocation {
    protocol: String,
    hostname: String,
}

/// Description of the page hosting the voice control.
#[derive(Debug, Clone)]
pub struct HostEnvironment {
    location: Option<PageLocation>,
    entry_points: EntryPoints,
    secure_context: bool,
    policy: LocalHostPolicy,
}

impl HostEnvironment {
    /// A host with no page at all.
    pub fn detached() -> Self {
        Self {
            location: None,
            entry_points: EntryPoints::default(),
            secure_context: false,
            policy: LocalHostPolicy::default(),
        }
    }

    /// A page served from `protocol` (e.g. `https:`) and `hostname`.
    pub fn page(protocol: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            location: Some(PageLocation {
                protocol: protocol.into(),
                hostname: hostname.into(),
            }),
            entry_points: EntryPoints::default(),
            secure_context: false,
            policy: LocalHostPolicy::default(),
        }
    }

    pub fn with_entry_points(mut self, entry_points: EntryPoints) -> Self {
        self.entry_points = entry_points;
        self
    }

    /// Whether the host itself reports a secure context.
    pub fn with_secure_context(mut self, secure: bool) -> Self {
        self.secure_context = secure;
        self
    }

    pub fn with_policy(mut self, policy: LocalHostPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn is_https(&self) -> bool {
        self.location
            .as_ref()
            .map(|l| l.protocol.trim_end_matches(':').eq_ignore_ascii_case("https"))
            .unwrap_or(false)
    }
}

impl CapabilityProvider for HostEnvironment {
    fn supports_recognition(&self) -> bool {
        self.location.is_some() && self.entry_points.any()
    }

    fn is_secure_context(&self) -> bool {
        if self.is_local_development() {
            return true;
        }
        self.location.is_some() && (self.secure_context || self.is_https())
    }

    fn is_local_development(&self) -> bool {
        self.location
            .as_ref()
            .map(|l| self.policy.matches(&l.hostname))
            .unwrap_or(false)
    }
}

/// Capability answers fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedCapabilities {
    pub supports_recognition: bool,
    pub secure_context: bool,
    pub local_development: bool,
}

impl FixedCapabilities {
    /// A secure, non-local host with recognition available.
    pub fn remote() -> Self {
        Self {
            supports_recognition: true,
            secure_context: true,
            local_development: false,
        }
    }

    /// A local-development host with recognition available.
    pub fn local() -> Self {
        Self {
            supports_recognition: true,
            secure_context: true,
            local_development: true,
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supports_recognition: false,
            secure_context: true,
            local_development: false,
        }
    }
}

impl CapabilityProvider for FixedCapabilities {
    fn supports_recognition(&self) -> bool {
        self.supports_recognition
    }

    fn is_secure_context(&self) -> bool {
        self.secure_context
    }

    fn is_local_development(&self) -> bool {
        self.local_development
    }
}
