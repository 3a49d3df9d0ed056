use std::fmt;

/// Parsed `dialect[+driver]://[user[:password]@]host[:port][/database][?params]` URL.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionUrl {
    raw: String,
    pub scheme: String,
    pub user: Option<String>,
    password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
}

impl ConnectionUrl {
    /// Parse `input` as a connection URL, returning `None` when it is not one.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let scheme_end = input.find("://")?;
        let scheme = &input[..scheme_end];
        if !is_valid_scheme(scheme) {
            return None;
        }

        let after_scheme = &input[scheme_end + 3..];
        if after_scheme.is_empty() {
            return None;
        }

        let (auth_part, host_part) = match after_scheme.rfind('@') {
            Some(at_idx) => (&after_scheme[..at_idx], &after_scheme[at_idx + 1..]),
            None => ("", after_scheme),
        };

        let (user, password) = if auth_part.is_empty() {
            (None, None)
        } else if let Some((user, password)) = auth_part.split_once(':') {
            (Some(user.to_string()), Some(password.to_string()))
        } else {
            (Some(auth_part.to_string()), None)
        };

        let host_part = host_part.split('?').next().unwrap_or("");
        let (host_port, path) = host_part.split_once('/').unwrap_or((host_part, ""));

        let mut host = None;
        let mut port = None;
        if !host_port.is_empty() {
            let (name, port_text) = split_host_port(host_port);
            if let Some(port_text) = port_text {
                port = Some(port_text.parse::<u16>().ok()?);
            }
            host = Some(name.to_string());
        }

        let database = (!path.is_empty()).then(|| path.to_string());

        Some(Self {
            raw: input.to_string(),
            scheme: scheme.to_string(),
            user,
            password,
            host,
            port,
            database,
        })
    }

    /// Dialect part of the scheme (`postgresql` for `postgresql+asyncpg`).
    pub fn dialect(&self) -> &str {
        self.scheme
            .split_once('+')
            .map_or(self.scheme.as_str(), |(dialect, _)| dialect)
    }

    /// The URL with any `+driver` suffix dropped from the scheme.
    pub fn native_url(&self) -> String {
        match self.scheme.split_once('+') {
            Some((dialect, _)) => format!("{dialect}{}", &self.raw[self.scheme.len()..]),
            None => self.raw.clone(),
        }
    }

    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// The URL exactly as given, secrets included.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The URL with the password and sensitive query parameters masked.
    pub fn redacted(&self) -> String {
        redact_connection_string(&self.raw)
    }
}

impl fmt::Debug for ConnectionUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionUrl")
            .field("url", &self.redacted())
            .field("scheme", &self.scheme)
            .field("user", &self.user)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .finish()
    }
}

impl fmt::Display for ConnectionUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

/// Split `host[:port]`; colons inside a bracketed IPv6 literal belong to the host.
fn split_host_port(host_port: &str) -> (&str, Option<&str>) {
    let host_end = host_port.rfind(']').map_or(0, |idx| idx + 1);
    match host_port[host_end..].rfind(':') {
        Some(idx) => (
            &host_port[..host_end + idx],
            Some(&host_port[host_end + idx + 1..]),
        ),
        None => (host_port, None),
    }
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Redact secrets from a connection string for logs and error messages.
pub fn redact_connection_string(conn: &str) -> String {
    let mut redacted = conn.to_string();

    if let Some(scheme_end) = conn.find("://") {
        let after_scheme = &conn[scheme_end + 3..];
        if let Some(at_idx) = after_scheme.rfind('@') {
            let auth_part = &after_scheme[..at_idx];
            if let Some(colon_idx) = auth_part.find(':') {
                let password_start = scheme_end + 3 + colon_idx + 1;
                let password_end = scheme_end + 3 + at_idx;
                redacted.replace_range(password_start..password_end, "***");
            }
        }
    }

    redact_query_params(&redacted)
}

fn redact_query_params(conn: &str) -> String {
    let Some(query_start) = conn.find('?') else {
        return conn.to_string();
    };

    let (base, query) = conn.split_at(query_start + 1);
    let params: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if is_sensitive_key(key) => format!("{key}=***"),
            _ => pair.to_string(),
        })
        .collect();

    format!("{base}{}", params.join("&"))
}

fn is_sensitive_key(key: &str) -> bool {
    matches!(
        key.to_lowercase().as_str(),
        "password" | "pass" | "token" | "api_key" | "apikey"
    )
}
