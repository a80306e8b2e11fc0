use serde::Deserialize;

/// One LIFF app registration: the URL prefix it owns and its provider id.
#[derive(Debug, Clone, PartialEq)]
pub struct LiffRoute {
    pub liff_id: String,
    pub path_prefix: String,
    pub name: String,
}

/// Per-path LIFF ids from the environment. The prefixes are fixed by the
/// product surface; only the ids vary per deployment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LiffSettings {
    #[serde(default)]
    pub points_id: String,
    #[serde(default)]
    pub coupon_id: String,
    #[serde(default)]
    pub profile_id: String,
    #[serde(default)]
    pub setting_id: String,
    #[serde(default)]
    pub default_id: String,
}

/// Ordered path-prefix to LIFF id mapping. First match wins; there is no
/// overlap resolution beyond order.
#[derive(Debug, Clone, Default)]
pub struct LiffRouting {
    routes: Vec<LiffRoute>,
    default_liff_id: String,
}

impl LiffRouting {
    pub fn new(routes: Vec<LiffRoute>, default_liff_id: impl Into<String>) -> Self {
        Self {
            routes,
            default_liff_id: default_liff_id.into(),
        }
    }

    pub fn from_settings(settings: &LiffSettings) -> Self {
        let route = |liff_id: &str, path_prefix: &str, name: &str| LiffRoute {
            liff_id: liff_id.to_string(),
            path_prefix: path_prefix.to_string(),
            name: name.to_string(),
        };
        Self::new(
            vec![
                route(&settings.points_id, "/points", "Points"),
                route(&settings.coupon_id, "/coupon", "Coupon"),
                route(&settings.profile_id, "/profile", "Profile"),
                route(&settings.setting_id, "/setting", "Setting"),
            ],
            &settings.default_id,
        )
    }

    /// First route whose prefix matches, regardless of whether it carries a
    /// usable id.
    pub fn route_for(&self, path: &str) -> Option<&LiffRoute> {
        self.routes.iter().find(|r| path.starts_with(&r.path_prefix))
    }

    /// LIFF id for a path: the matching route's id, falling back to the
    /// default. `None` means no identity bootstrap is possible here.
    pub fn resolve(&self, path: &str) -> Option<&str> {
        let id = self
            .route_for(path)
            .map(|r| r.liff_id.as_str())
            .filter(|id| !id.is_empty())
            .unwrap_or(self.default_liff_id.as_str());
        if id.is_empty() {
            None
        } else {
            Some(id)
        }
    }

    /// True iff some route owns this path. Independent of id availability:
    /// a matching route with a missing id still requires bootstrap (which
    /// will then fail with a configuration error).
    pub fn requires_bootstrap(&self, path: &str) -> bool {
        self.route_for(path).is_some()
    }
}
