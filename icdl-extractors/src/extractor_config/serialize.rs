use icdl_common::{
    log::debug,
    serde::{self, Deserialize},
};
use std::collections::HashMap;
use std::io::Write;
use std::{
    fs::{read_to_string, File},
    path::Path,
};
use toml;

use super::{ServerConfig, CLIENT_UA_NAME, EXTRACTOR_UA_NAME};

const SAMPLE_CONFIG_TOML: &str = include_str!("sample.toml");

#[derive(Debug, Deserialize)]
#[serde(crate = "self::serde")]
struct Config {
    #[serde(rename = "access-token")]
    access_token: Option<String>,
    #[serde(default)]
    servers: HashMap<String, Server>,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "self::serde")]
struct Server {
    pretty_name: String,
    base_url: String,
    post_list_url: Option<String>,
    api_url: Option<String>,
}

/// User configuration read from disk: the optional API access token that
/// switches resolvers into API mode, and any server overrides.
#[derive(Debug, Default)]
pub struct UserConfig {
    pub access_token: Option<String>,
    pub servers: HashMap<String, ServerConfig>,
}

pub fn read_config_file(path: &Path) -> UserConfig {
    if !path.exists() {
        let mut sample_toml = File::create(path).unwrap();
        sample_toml
            .write_all(SAMPLE_CONFIG_TOML.as_bytes())
            .unwrap();
    }

    let contents = read_to_string(path).expect("Something went wrong reading the file");

    let config: Config = toml::from_str(&contents).unwrap();

    let mut smap = HashMap::with_capacity(config.servers.len());

    for (id, data) in config.servers {
        let server = ServerConfig {
            name: id.clone(),
            pretty_name: data.pretty_name,
            client_user_agent: format!("{}/{}", CLIENT_UA_NAME, env!("CARGO_PKG_VERSION")),
            extractor_user_agent: format!("{}/{}", EXTRACTOR_UA_NAME, env!("CARGO_PKG_VERSION")),
            base_url: data.base_url,
            post_list_url: data.post_list_url,
            api_url: data.api_url,
        };
        smap.insert(id, server);
    }

    debug!("Configured servers: {:?}", smap);

    UserConfig {
        access_token: config.access_token,
        servers: smap,
    }
}

#[cfg(test)]
mod test {
    use super::read_config_file;
    use std::fs::write;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_seeded_with_the_sample() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("servers.toml");

        let config = read_config_file(&path);

        assert!(path.exists());
        assert!(config.access_token.is_none());
        let server = config.servers.get("imagechest").unwrap();
        assert_eq!(server.base_url, "https://imgchest.com");
        assert_eq!(server.gallery_url("abcdefghijk"), "https://imgchest.com/p/abcdefghijk");
    }

    #[test]
    fn access_token_is_read_when_present() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("servers.toml");
        write(&path, "access-token = \"secret\"\n").unwrap();

        let config = read_config_file(&path);

        assert_eq!(config.access_token.as_deref(), Some("secret"));
        assert!(config.servers.is_empty());
    }
}
