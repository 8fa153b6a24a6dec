use crate::error::Error;

/// Parsed connection parameters, produced by [`ConnectOptions::parse`] from a
/// semicolon-separated `key=value` connection string.
///
/// Recognized keys: `host`, `user`, `pwd`, `db`, `port`. `port` defaults to `3306`
/// when absent. Any other key is a [`Error::ConnectOptions`].
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: Option<String>,
}

impl ConnectOptions {
    pub fn parse(s: &str) -> crate::Result<Self> {
        let mut host = None;
        let mut port = 3306u16;
        let mut user = None;
        let mut password = String::new();
        let mut database = None;

        for entry in s.split(';').filter(|e| !e.is_empty()) {
            // No escape convention is defined for a literal ';' inside a value (see
            // design notes); splitting on ';' first means such a value breaks apart
            // into fragments that fail the key=value check below, which is how this
            // case is rejected.
            let (key, value) = entry.split_once('=').ok_or_else(|| {
                Error::ConnectOptions(format!("expected key=value, found {:?}", entry).into())
            })?;

            match key {
                "host" => host = Some(value.to_owned()),
                "user" => user = Some(value.to_owned()),
                "pwd" => password = value.to_owned(),
                "db" => database = Some(value.to_owned()),
                "port" => {
                    port = value.parse().map_err(|_| {
                        Error::ConnectOptions(format!("invalid port: {:?}", value).into())
                    })?
                }
                other => {
                    return Err(Error::ConnectOptions(
                        format!("unrecognized connection option: {:?}", other).into(),
                    ))
                }
            }
        }

        Ok(Self {
            host: host.ok_or_else(|| Error::ConnectOptions("missing required key: host".into()))?,
            port,
            user: user.ok_or_else(|| Error::ConnectOptions("missing required key: user".into()))?,
            password,
            database,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_a_full_connection_string() {
        let opts = ConnectOptions::parse("host=localhost;user=root;pwd=hunter2;db=test;port=3307")
            .unwrap();

        assert_eq!(opts.host, "localhost");
        assert_eq!(opts.user, "root");
        assert_eq!(opts.password, "hunter2");
        assert_eq!(opts.database.as_deref(), Some("test"));
        assert_eq!(opts.port, 3307);
    }

    #[test]
    fn it_defaults_port_to_3306() {
        let opts = ConnectOptions::parse("host=localhost;user=root").unwrap();
        assert_eq!(opts.port, 3306);
    }

    #[test]
    fn it_rejects_unknown_keys() {
        assert!(ConnectOptions::parse("host=localhost;user=root;frobnicate=yes").is_err());
    }

    #[test]
    fn it_rejects_semicolons_inside_values() {
        // malformed input where a value itself would need escaping is rejected outright
        assert!(ConnectOptions::parse("host=localhost;user=root;pwd=a\\;b").is_err());
    }

    #[test]
    fn it_requires_host_and_user() {
        assert!(ConnectOptions::parse("db=test").is_err());
    }
}
