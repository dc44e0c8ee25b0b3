// SPDX-License-Identifier: MIT OR Apache-2.0

//! Uptime checks.
//!
//! Configuration nests the check target, content matching and the
//! type-specific settings into blocks; the API takes one flat payload with a
//! `test_type` discriminator. Exactly one of `http_check`, `tcp_check`,
//! `dns_check` or `icmp_check` must be declared, and the check type cannot
//! change in place.
//!
//! `http_check.authentication.password` is write-only and is never present in
//! a flattened snapshot.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ResourceKind;
use crate::codec::{
    changed_fields, check_known, optional_block, optional_bool, optional_int, optional_set,
    optional_string, required_block, required_int, required_string, within, ResourceCodec,
    Snapshot, Value,
};
use crate::error::FieldError;
use crate::schema::validation::{
    int_between, int_in_slice, is_ip_address, is_url_or_ip_address, string_in_slice,
    string_is_numerical,
};
use crate::schema::{authentication, location_blocks, BasicAuth, MonitoringLocation};

/// Allowed `check_rate` values, in seconds.
pub const CHECK_RATES: &[i64] = &[0, 30, 60, 300, 900, 1800, 3600, 86400];

const MATCHERS: &[&str] = &["CONTAINS_STRING", "NOT_CONTAINS_STRING"];
const REQUEST_METHODS: &[&str] = &["HTTP", "HEAD"];
const CHECK_BLOCKS: &[&str] = &["dns_check", "http_check", "icmp_check", "tcp_check"];

const HTTP_FIELDS: &[&str] = &[
    "authentication",
    "body",
    "headers",
    "final_endpoint",
    "follow_redirects",
    "request_method",
    "status_codes",
    "timeout",
    "use_jar",
    "user_agent",
    "validate_ssl",
];
const TCP_FIELDS: &[&str] = &["authentication", "port", "timeout"];
const DNS_FIELDS: &[&str] = &["dns_ips", "dns_server"];

/// Wire shape of an uptime check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UptimeCheckPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_rate: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_rate: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_groups: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub find_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub do_not_find: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_header: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_body: Option<String>,
    /// Request headers as a JSON object encoded in a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_redirects: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_codes_csv: Option<String>,
    /// Returned by the API in place of `status_codes_csv`.
    #[serde(default, skip_serializing)]
    pub status_codes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_jar: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_ssl_alert: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_ips: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_server: Option<String>,
    /// Locations the check runs from. Read-only.
    #[serde(default, skip_serializing)]
    pub servers: Option<Vec<MonitoringLocation>>,
}

/// Wire `test_type` values this crate manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckType {
    Http,
    Head,
    Tcp,
    Dns,
    Ping,
}

impl CheckType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CheckType::Http => "HTTP",
            CheckType::Head => "HEAD",
            CheckType::Tcp => "TCP",
            CheckType::Dns => "DNS",
            CheckType::Ping => "PING",
        }
    }

    #[must_use]
    pub fn from_wire(test_type: &str) -> Option<Self> {
        match test_type {
            "HTTP" => Some(CheckType::Http),
            "HEAD" => Some(CheckType::Head),
            "TCP" => Some(CheckType::Tcp),
            "DNS" => Some(CheckType::Dns),
            "PING" => Some(CheckType::Ping),
            _ => None,
        }
    }

    /// Configuration block that declares this type.
    #[must_use]
    pub fn block(self) -> &'static str {
        match self {
            CheckType::Http | CheckType::Head => "http_check",
            CheckType::Tcp => "tcp_check",
            CheckType::Dns => "dns_check",
            CheckType::Ping => "icmp_check",
        }
    }

    /// Determine the declared type without validating the rest of the block.
    fn declared(snapshot: &Snapshot) -> Option<Self> {
        let declared = |field| optional_block(snapshot, field).ok().flatten();
        if let Some(http) = declared("http_check") {
            let head = matches!(http.get("request_method"), Some(Value::String(m)) if m == "HEAD");
            return Some(if head { CheckType::Head } else { CheckType::Http });
        }
        if declared("tcp_check").is_some() {
            return Some(CheckType::Tcp);
        }
        if declared("dns_check").is_some() {
            return Some(CheckType::Dns);
        }
        declared("icmp_check").map(|_| CheckType::Ping)
    }
}

/// Codec for `uptime_check`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UptimeCheck;

impl ResourceCodec for UptimeCheck {
    type Payload = UptimeCheckPayload;

    const KIND: ResourceKind = ResourceKind::UptimeCheck;
    const PATH: &'static str = "/uptime";
    const FIELDS: &'static [&'static str] = &[
        "name",
        "check_rate",
        "confirmation",
        "paused",
        "trigger_rate",
        "contact_groups",
        "regions",
        "tags",
        "monitored_resource",
        "content_matchers",
        "http_check",
        "tcp_check",
        "dns_check",
        "icmp_check",
    ];
    const IMMUTABLE: &'static [&'static str] = &["monitored_resource"];

    fn expand(snapshot: &Snapshot) -> Result<Self::Payload, FieldError> {
        let mut payload = UptimeCheckPayload {
            name: Some(required_string(snapshot, "name")?),
            ..Default::default()
        };

        let check_rate = required_int(snapshot, "check_rate")?;
        int_in_slice("check_rate", check_rate, CHECK_RATES)?;
        payload.check_rate = Some(check_rate);

        if let Some(confirmation) = optional_int(snapshot, "confirmation")? {
            int_between("confirmation", confirmation, 0, 3)?;
            payload.confirmation = Some(confirmation);
        }
        if let Some(trigger_rate) = optional_int(snapshot, "trigger_rate")? {
            int_between("trigger_rate", trigger_rate, 0, 60)?;
            payload.trigger_rate = Some(trigger_rate);
        }
        payload.paused = optional_bool(snapshot, "paused")?;

        payload.contact_groups = optional_set(snapshot, "contact_groups")?;
        for group in payload.contact_groups.iter().flatten() {
            string_is_numerical("contact_groups", group)?;
        }
        payload.regions = optional_set(snapshot, "regions")?;
        payload.tags = optional_set(snapshot, "tags")?;

        let target = required_block(snapshot, "monitored_resource")?;
        within("monitored_resource", target, |block| {
            check_known(block, &["address", "host"])?;
            let address = required_string(block, "address")?;
            is_url_or_ip_address("address", &address)?;
            payload.website_url = Some(address);
            payload.host = optional_string(block, "host")?;
            Ok(())
        })?;

        if let Some(matchers) = optional_block(snapshot, "content_matchers")? {
            within("content_matchers", matchers, |block| {
                check_known(block, &["content", "include_header", "matcher"])?;
                payload.find_string = Some(required_string(block, "content")?);
                payload.include_header = optional_bool(block, "include_header")?;
                if let Some(matcher) = optional_string(block, "matcher")? {
                    string_in_slice("matcher", &matcher, MATCHERS)?;
                    payload.do_not_find = Some(matcher == "NOT_CONTAINS_STRING");
                }
                Ok(())
            })?;
        }

        let declared: Vec<&str> = CHECK_BLOCKS
            .iter()
            .copied()
            .filter(|field| snapshot.get(field).is_some_and(|v| !v.is_empty_collection()))
            .collect();
        let check_type = match declared.as_slice() {
            ["http_check"] => expand_http(required_block(snapshot, "http_check")?, &mut payload)?,
            ["tcp_check"] => expand_tcp(required_block(snapshot, "tcp_check")?, &mut payload)?,
            ["dns_check"] => expand_dns(required_block(snapshot, "dns_check")?, &mut payload)?,
            ["icmp_check"] => {
                within("icmp_check", required_block(snapshot, "icmp_check")?, |block| {
                    check_known(block, &[])
                })?;
                CheckType::Ping
            }
            [] => {
                return Err(FieldError::new(
                    CHECK_BLOCKS.join(", "),
                    "exactly one check type block must be declared, got none",
                ))
            }
            many => {
                return Err(FieldError::new(
                    many.join(", "),
                    "exactly one check type block must be declared",
                ))
            }
        };
        payload.test_type = Some(check_type.as_str().to_string());

        Ok(payload)
    }

    fn flatten(payload: Self::Payload) -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.insert_opt("name", payload.name);
        snapshot.insert_opt("check_rate", payload.check_rate);
        snapshot.insert_opt("confirmation", payload.confirmation);
        snapshot.insert_opt("paused", payload.paused);
        snapshot.insert_opt("trigger_rate", payload.trigger_rate);
        snapshot.insert_set("contact_groups", payload.contact_groups);
        snapshot.insert_set("regions", payload.regions);
        snapshot.insert_set("tags", payload.tags);

        let mut target = Snapshot::new();
        target.insert_opt("address", payload.website_url);
        target.insert_opt("host", payload.host.filter(|h| !h.is_empty()));
        snapshot.insert_block("monitored_resource", target);

        if let Some(content) = payload.find_string.filter(|s| !s.is_empty()) {
            let mut matchers = Snapshot::new().with("content", content);
            matchers.insert_opt("include_header", payload.include_header);
            matchers.insert_opt(
                "matcher",
                payload.do_not_find.map(|negate| MATCHERS[usize::from(negate)]),
            );
            snapshot.insert_block("content_matchers", matchers);
        }

        let check_type = payload.test_type.as_deref().and_then(CheckType::from_wire);
        match check_type {
            Some(kind @ (CheckType::Http | CheckType::Head)) => {
                let mut http = Snapshot::new().with("request_method", kind.as_str());
                http.insert_block("authentication", authentication::flatten(payload.basic_username));
                http.insert_opt("body", payload.post_body.filter(|b| !b.is_empty()));
                http.insert_block("headers", flatten_headers(payload.custom_header.as_deref()));
                http.insert_opt("final_endpoint", payload.final_endpoint.filter(|e| !e.is_empty()));
                http.insert_opt("follow_redirects", payload.follow_redirects);
                http.insert_set("status_codes", status_codes(payload.status_codes, payload.status_codes_csv));
                http.insert_opt("timeout", payload.timeout);
                http.insert_opt("use_jar", payload.use_jar);
                http.insert_opt("user_agent", payload.user_agent.filter(|u| !u.is_empty()));
                http.insert_opt("validate_ssl", payload.enable_ssl_alert);
                snapshot.insert_block("http_check", http);
            }
            Some(CheckType::Tcp) => {
                let mut tcp = Snapshot::new();
                tcp.insert_block("authentication", authentication::flatten(payload.basic_username));
                tcp.insert_opt("port", payload.port);
                tcp.insert_opt("timeout", payload.timeout);
                snapshot.insert("tcp_check", Value::block(tcp));
            }
            Some(CheckType::Dns) => {
                let mut dns = Snapshot::new();
                dns.insert_set("dns_ips", payload.dns_ips);
                dns.insert_opt("dns_server", payload.dns_server.filter(|s| !s.is_empty()));
                snapshot.insert("dns_check", Value::block(dns));
            }
            Some(CheckType::Ping) => snapshot.insert("icmp_check", Value::block(Snapshot::new())),
            None => {}
        }

        if let Some(servers) = payload.servers.filter(|s| !s.is_empty()) {
            snapshot.insert("locations", location_blocks(&servers));
        }

        snapshot
    }

    fn strip_immutable(payload: &mut Self::Payload) {
        payload.website_url = None;
        payload.host = None;
        payload.test_type = None;
    }

    fn replacement_fields(prior: &Snapshot, desired: &Snapshot) -> Vec<String> {
        let mut fields = changed_fields(prior, desired, Self::IMMUTABLE);
        match (CheckType::declared(prior), CheckType::declared(desired)) {
            (Some(before), Some(after)) if before != after => {
                if before.block() == after.block() {
                    fields.push(format!("{}.request_method", after.block()));
                } else {
                    fields.push(after.block().to_string());
                }
            }
            _ => {}
        }
        fields
    }
}

fn expand_auth(block: &Snapshot, payload: &mut UptimeCheckPayload) -> Result<(), FieldError> {
    if let Some(auth) = optional_block(block, "authentication")? {
        let auth = within("authentication", auth, BasicAuth::expand)?;
        payload.basic_username = Some(auth.username);
        payload.basic_password = Some(auth.password);
    }
    Ok(())
}

fn expand_http(block: &Snapshot, payload: &mut UptimeCheckPayload) -> Result<CheckType, FieldError> {
    within("http_check", block, |block| {
        check_known(block, HTTP_FIELDS)?;
        expand_auth(block, payload)?;

        payload.post_body = optional_string(block, "body")?;
        payload.custom_header = expand_headers(block)?;
        payload.final_endpoint = optional_string(block, "final_endpoint")?;
        payload.follow_redirects = optional_bool(block, "follow_redirects")?;
        payload.use_jar = optional_bool(block, "use_jar")?;
        payload.user_agent = optional_string(block, "user_agent")?;
        payload.enable_ssl_alert = optional_bool(block, "validate_ssl")?;

        if let Some(codes) = optional_set(block, "status_codes")? {
            for code in &codes {
                string_is_numerical("status_codes", code)?;
            }
            payload.status_codes_csv = Some(codes.join(","));
        }

        if let Some(timeout) = optional_int(block, "timeout")? {
            int_between("timeout", timeout, 5, 75)?;
            payload.timeout = Some(timeout);
        }

        match optional_string(block, "request_method")? {
            Some(method) => {
                string_in_slice("request_method", &method, REQUEST_METHODS)?;
                Ok(if method == "HEAD" { CheckType::Head } else { CheckType::Http })
            }
            None => Ok(CheckType::Http),
        }
    })
}

fn expand_tcp(block: &Snapshot, payload: &mut UptimeCheckPayload) -> Result<CheckType, FieldError> {
    within("tcp_check", block, |block| {
        check_known(block, TCP_FIELDS)?;
        expand_auth(block, payload)?;
        if let Some(port) = optional_int(block, "port")? {
            int_between("port", port, 1, 65535)?;
            payload.port = Some(port);
        }
        payload.timeout = optional_int(block, "timeout")?;
        Ok(CheckType::Tcp)
    })
}

fn expand_dns(block: &Snapshot, payload: &mut UptimeCheckPayload) -> Result<CheckType, FieldError> {
    within("dns_check", block, |block| {
        check_known(block, DNS_FIELDS)?;
        let ips = optional_set(block, "dns_ips")?
            .filter(|ips| !ips.is_empty())
            .ok_or_else(|| FieldError::new("dns_ips", "at least one IP address is required"))?;
        for ip in &ips {
            is_ip_address("dns_ips", ip)?;
        }
        payload.dns_ips = Some(ips);

        if let Some(server) = optional_string(block, "dns_server")? {
            is_ip_address("dns_server", &server)?;
            payload.dns_server = Some(server);
        }
        Ok(CheckType::Dns)
    })
}

/// Encode the free-form `headers` block as the JSON object string the API expects.
fn expand_headers(block: &Snapshot) -> Result<Option<String>, FieldError> {
    let Some(headers) = optional_block(block, "headers")? else {
        return Ok(None);
    };
    let mut map = BTreeMap::new();
    for (name, value) in headers {
        match value {
            Value::String(v) => {
                map.insert(name.as_str(), v.as_str());
            }
            other => {
                return Err(FieldError::new(
                    format!("headers.{name}"),
                    format!("expected a string, got {}", other.type_name()),
                ))
            }
        }
    }
    serde_json::to_string(&map)
        .map(Some)
        .map_err(|e| FieldError::new("headers", e.to_string()))
}

fn flatten_headers(custom_header: Option<&str>) -> Snapshot {
    custom_header
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| serde_json::from_str::<BTreeMap<String, String>>(raw).ok())
        .map(|headers| headers.into_iter().collect())
        .unwrap_or_default()
}

fn status_codes(listed: Option<Vec<String>>, csv: Option<String>) -> Option<Vec<String>> {
    listed.or_else(|| {
        csv.map(|csv| {
            csv.split(',')
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(str::to_string)
                .collect()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{self, Scalar};
    use crate::error::StatusCakeError;

    fn http_check() -> Snapshot {
        Snapshot::new()
            .with("name", "homepage")
            .with("check_rate", 300)
            .with("confirmation", 2)
            .with("paused", false)
            .with("trigger_rate", 10)
            .with("contact_groups", Value::set(["12", "3"]))
            .with("tags", Value::set(["prod", "web"]))
            .with(
                "monitored_resource",
                Snapshot::new()
                    .with("address", "https://www.example.com")
                    .with("host", "AWS"),
            )
            .with(
                "content_matchers",
                Snapshot::new()
                    .with("content", "Welcome")
                    .with("include_header", false)
                    .with("matcher", "NOT_CONTAINS_STRING"),
            )
            .with(
                "http_check",
                Snapshot::new()
                    .with(
                        "authentication",
                        Snapshot::new().with("username", "kirk").with("password", "ncc-1701"),
                    )
                    .with("headers", Snapshot::new().with("X-Env", "prod"))
                    .with("follow_redirects", true)
                    .with("request_method", "HTTP")
                    .with("status_codes", Value::set(["500", "503"]))
                    .with("timeout", 40)
                    .with("validate_ssl", true),
            )
    }

    fn expect_field(result: Result<UptimeCheckPayload, StatusCakeError>, field: &str) -> String {
        match result {
            Err(StatusCakeError::Validation { kind, source }) => {
                assert_eq!(kind, ResourceKind::UptimeCheck);
                assert_eq!(source.field, field);
                source.message
            }
            other => panic!("expected validation error on {field}, got {other:?}"),
        }
    }

    #[test]
    fn test_expand_http_check_is_flat_on_the_wire() {
        let payload = codec::expand::<UptimeCheck>(&http_check()).unwrap();
        assert_eq!(payload.test_type.as_deref(), Some("HTTP"));
        assert_eq!(payload.website_url.as_deref(), Some("https://www.example.com"));
        assert_eq!(payload.find_string.as_deref(), Some("Welcome"));
        assert_eq!(payload.do_not_find, Some(true));
        assert_eq!(payload.basic_username.as_deref(), Some("kirk"));
        assert_eq!(payload.basic_password.as_deref(), Some("ncc-1701"));
        assert_eq!(payload.custom_header.as_deref(), Some(r#"{"X-Env":"prod"}"#));
        assert_eq!(payload.status_codes_csv.as_deref(), Some("500,503"));
        assert_eq!(payload.enable_ssl_alert, Some(true));
    }

    #[test]
    fn test_round_trip_except_password() {
        let snapshot = http_check();
        let payload = codec::expand::<UptimeCheck>(&snapshot).unwrap();
        let flattened = UptimeCheck::flatten(payload);

        let mut expected = snapshot.clone();
        let mut http = match expected.remove("http_check") {
            Some(Value::Blocks(mut blocks)) => blocks.remove(0),
            other => panic!("unexpected {other:?}"),
        };
        http.insert("authentication", Snapshot::new().with("username", "kirk"));
        expected.insert("http_check", http);

        assert_eq!(flattened, expected);
    }

    #[test]
    fn test_round_trip_dns_and_icmp() {
        let dns = Snapshot::new()
            .with("name", "resolver")
            .with("check_rate", 60)
            .with("monitored_resource", Snapshot::new().with("address", "8.8.8.8"))
            .with(
                "dns_check",
                Snapshot::new()
                    .with("dns_ips", Value::set(["1.1.1.1", "8.8.4.4"]))
                    .with("dns_server", "9.9.9.9"),
            );
        let payload = codec::expand::<UptimeCheck>(&dns).unwrap();
        assert_eq!(payload.test_type.as_deref(), Some("DNS"));
        assert_eq!(UptimeCheck::flatten(payload), dns);

        let icmp = Snapshot::new()
            .with("name", "router")
            .with("check_rate", 60)
            .with("monitored_resource", Snapshot::new().with("address", "10.0.0.1"))
            .with("icmp_check", Value::block(Snapshot::new()));
        let payload = codec::expand::<UptimeCheck>(&icmp).unwrap();
        assert_eq!(payload.test_type.as_deref(), Some("PING"));
        assert_eq!(UptimeCheck::flatten(payload), icmp);
    }

    #[test]
    fn test_check_rate_outside_allowed_set() {
        let message = expect_field(
            codec::expand::<UptimeCheck>(&http_check().with("check_rate", 120)),
            "check_rate",
        );
        assert_eq!(
            message,
            "expected check_rate to be one of {0, 30, 60, 300, 900, 1800, 3600, 86400}, got 120"
        );
    }

    #[test]
    fn test_range_checks() {
        expect_field(
            codec::expand::<UptimeCheck>(&http_check().with("confirmation", 4)),
            "confirmation",
        );
        expect_field(
            codec::expand::<UptimeCheck>(&http_check().with("trigger_rate", 61)),
            "trigger_rate",
        );
        let snapshot = http_check().with(
            "http_check",
            Snapshot::new().with("timeout", 90),
        );
        expect_field(codec::expand::<UptimeCheck>(&snapshot), "http_check.timeout");
    }

    #[test]
    fn test_exactly_one_check_type() {
        let mut none = http_check();
        none.remove("http_check");
        let message = expect_field(
            codec::expand::<UptimeCheck>(&none),
            "dns_check, http_check, icmp_check, tcp_check",
        );
        assert!(message.contains("got none"));

        let both = http_check().with("icmp_check", Value::block(Snapshot::new()));
        expect_field(codec::expand::<UptimeCheck>(&both), "http_check, icmp_check");
    }

    #[test]
    fn test_nested_errors_carry_block_path() {
        let snapshot = http_check().with(
            "monitored_resource",
            Snapshot::new().with("address", "www.example.com"),
        );
        expect_field(
            codec::expand::<UptimeCheck>(&snapshot),
            "monitored_resource.address",
        );

        let snapshot = http_check().with(
            "http_check",
            Snapshot::new().with("authentication", Snapshot::new().with("username", "kirk")),
        );
        expect_field(
            codec::expand::<UptimeCheck>(&snapshot),
            "http_check.authentication.password",
        );

        let snapshot = http_check().with(
            "dns_check",
            Snapshot::new().with("dns_ips", Value::set(["not-an-ip"])),
        );
        let mut snapshot = snapshot;
        snapshot.remove("http_check");
        expect_field(codec::expand::<UptimeCheck>(&snapshot), "dns_check.dns_ips");
    }

    #[test]
    fn test_header_values_must_be_strings() {
        let snapshot = http_check().with(
            "http_check",
            Snapshot::new().with("headers", Snapshot::new().with("X-Retry", 3)),
        );
        expect_field(
            codec::expand::<UptimeCheck>(&snapshot),
            "http_check.headers.X-Retry",
        );
    }

    #[test]
    fn test_flatten_api_response() {
        let payload: UptimeCheckPayload = serde_json::from_value(serde_json::json!({
            "id": "123",
            "name": "homepage",
            "test_type": "HEAD",
            "website_url": "https://www.example.com",
            "host": "",
            "check_rate": 300,
            "confirmation": 2,
            "paused": false,
            "trigger_rate": 0,
            "contact_groups": [],
            "tags": ["web"],
            "find_string": "",
            "do_not_find": false,
            "basic_username": null,
            "custom_header": "{\"X-Env\":\"prod\"}",
            "status_codes": ["500", "204"],
            "timeout": 15,
            "enable_ssl_alert": false,
            "servers": [{
                "description": "London 1",
                "region": "United Kingdom",
                "region_code": "london",
                "status": "up",
                "ipv4": "1.2.3.4"
            }]
        }))
        .unwrap();

        let snapshot = UptimeCheck::flatten(payload);
        assert!(!snapshot.contains("contact_groups"));
        assert!(!snapshot.contains("content_matchers"));
        assert_eq!(
            snapshot.get("monitored_resource"),
            Some(&Value::block(
                Snapshot::new().with("address", "https://www.example.com")
            ))
        );

        let Some(Value::Blocks(http)) = snapshot.get("http_check") else {
            panic!("missing http_check block");
        };
        assert_eq!(http[0].get("request_method"), Some(&Value::from("HEAD")));
        assert_eq!(
            http[0].get("status_codes"),
            Some(&Value::Set([Scalar::from("204"), Scalar::from("500")].into()))
        );
        assert_eq!(
            http[0].get("headers"),
            Some(&Value::block(Snapshot::new().with("X-Env", "prod")))
        );
        assert!(!http[0].contains("authentication"));

        let Some(Value::Blocks(locations)) = snapshot.get("locations") else {
            panic!("missing locations");
        };
        assert_eq!(locations[0].get("ipv4"), Some(&Value::from("1.2.3.4")));
    }

    #[test]
    fn test_update_payload_omits_immutable_fields() {
        let mut payload = codec::expand::<UptimeCheck>(&http_check()).unwrap();
        UptimeCheck::strip_immutable(&mut payload);
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("website_url").is_none());
        assert!(json.get("test_type").is_none());
        assert_eq!(json["check_rate"], 300);
    }

    #[test]
    fn test_replacement_fields() {
        let prior = http_check();

        let moved = http_check().with(
            "monitored_resource",
            Snapshot::new()
                .with("address", "https://new.example.com")
                .with("host", "AWS"),
        );
        assert_eq!(
            UptimeCheck::replacement_fields(&prior, &moved),
            vec!["monitored_resource".to_string()]
        );

        let mut retyped = http_check().with(
            "tcp_check",
            Snapshot::new().with("port", 443),
        );
        retyped.remove("http_check");
        assert_eq!(
            UptimeCheck::replacement_fields(&prior, &retyped),
            vec!["tcp_check".to_string()]
        );

        let head = http_check().with("http_check", Snapshot::new().with("request_method", "HEAD"));
        assert_eq!(
            UptimeCheck::replacement_fields(&prior, &head),
            vec!["http_check.request_method".to_string()]
        );

        let renamed = http_check().with("name", "new name").with("check_rate", 60);
        assert!(UptimeCheck::replacement_fields(&prior, &renamed).is_empty());
    }
}
