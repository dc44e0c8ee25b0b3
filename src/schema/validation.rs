// SPDX-License-Identifier: MIT OR Apache-2.0

//! Field validators shared by every resource kind.

use regex::Regex;
use std::fmt::Display;
use std::net::IpAddr;
use std::sync::LazyLock;
use url::Url;

use crate::codec::render_set;
use crate::error::FieldError;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*$")
        .expect("valid email pattern")
});

type Check = Result<(), FieldError>;

pub fn is_email_address(field: &str, value: &str) -> Check {
    if value.is_empty() {
        return Err(FieldError::new(
            field,
            format!("expected {field} email address to not be empty, got {value}"),
        ));
    }
    if !EMAIL_PATTERN.is_match(value) {
        return Err(FieldError::new(
            field,
            format!("expected {field} to be a valid email address, got {value}"),
        ));
    }
    Ok(())
}

pub fn string_is_numerical(field: &str, value: &str) -> Check {
    if value.is_empty() {
        return Err(FieldError::new(
            field,
            format!("expected {field} number to not be empty, got {value}"),
        ));
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FieldError::new(
            field,
            format!("expected {field} to be a valid number, got {value}"),
        ));
    }
    Ok(())
}

/// Membership check for API-defined numeric enumerations.
pub fn int_in_slice(field: &str, value: i64, allowed: &[i64]) -> Check {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(not_one_of(field, value, allowed))
}

/// Membership check for API-defined string enumerations. Case sensitive.
pub fn string_in_slice(field: &str, value: &str, allowed: &[&str]) -> Check {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(not_one_of(field, value, allowed))
}

fn not_one_of<V: Display, A: Display>(field: &str, value: V, allowed: &[A]) -> FieldError {
    FieldError::new(
        field,
        format!("expected {field} to be one of {}, got {value}", render_set(allowed)),
    )
}

/// Inclusive range check.
pub fn int_between(field: &str, value: i64, min: i64, max: i64) -> Check {
    if (min..=max).contains(&value) {
        return Ok(());
    }
    Err(FieldError::new(
        field,
        format!("expected {field} to be in the range ({min} - {max}), got {value}"),
    ))
}

pub fn int_at_least(field: &str, value: i64, min: i64) -> Check {
    if value >= min {
        return Ok(());
    }
    Err(FieldError::new(
        field,
        format!("expected {field} to be at least ({min}), got {value}"),
    ))
}

fn url_with_scheme(field: &str, value: &str, schemes: &[&str]) -> Check {
    let url = Url::parse(value).map_err(|e| {
        FieldError::new(field, format!("expected {field} to be a valid url, got {value}: {e}"))
    })?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(FieldError::new(
            field,
            format!("expected {field} to have a host, got {value}"),
        ));
    }
    if !schemes.contains(&url.scheme()) {
        return Err(FieldError::new(
            field,
            format!(
                "expected {field} to have a url with schema of: {:?}, got {value}",
                schemes.join(",")
            ),
        ));
    }
    Ok(())
}

pub fn is_url_with_http_or_https(field: &str, value: &str) -> Check {
    url_with_scheme(field, value, &["http", "https"])
}

pub fn is_url_with_https(field: &str, value: &str) -> Check {
    url_with_scheme(field, value, &["https"])
}

pub fn is_ip_address(field: &str, value: &str) -> Check {
    value.parse::<IpAddr>().map(|_| ()).map_err(|_| {
        FieldError::new(
            field,
            format!("expected {field} to contain a valid IP, got: {value}"),
        )
    })
}

/// Accept either an http(s) URL or a bare IP address.
pub fn is_url_or_ip_address(field: &str, value: &str) -> Check {
    if is_ip_address(field, value).is_ok() {
        return Ok(());
    }
    is_url_with_http_or_https(field, value).map_err(|_| {
        FieldError::new(
            field,
            format!("expected {field} to be an http(s) URL or an IP address, got {value}"),
        )
    })
}
