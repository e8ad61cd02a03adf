//! Route metadata for documentation and introspection.

use axum::http::Method;
use serde::Serialize;

/// Descriptive data attached to a route at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteMeta {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub deprecated: bool,
    pub version: Option<String>,
}

impl RouteMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append tags; repeated calls accumulate.
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Snapshot of one registered route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    #[serde(serialize_with = "serialize_method")]
    pub method: Method,
    pub pattern: String,
    #[serde(flatten)]
    pub meta: RouteMeta,
}

fn serialize_method<S: serde::Serializer>(method: &Method, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(method.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates_tags() {
        let meta = RouteMeta::new()
            .name("get-user")
            .tags(["users"])
            .tags(vec!["public".to_string()])
            .deprecated()
            .version("v2");

        assert_eq!(meta.name.as_deref(), Some("get-user"));
        assert_eq!(meta.tags, vec!["users", "public"]);
        assert!(meta.deprecated);
        assert_eq!(meta.version.as_deref(), Some("v2"));
    }

    #[test]
    fn test_route_info_serializes_flat() {
        let info = RouteInfo {
            method: Method::GET,
            pattern: "/users/:id".into(),
            meta: RouteMeta::new().name("get-user"),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["method"], "GET");
        assert_eq!(json["pattern"], "/users/:id");
        assert_eq!(json["name"], "get-user");
        assert_eq!(json["deprecated"], false);
    }
}
