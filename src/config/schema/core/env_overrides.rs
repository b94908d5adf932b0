use super::Config;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("NEKORELAY_API_KEY")
            && !key.is_empty()
        {
            self.api_key = Some(key);
        }

        if let Ok(model) = std::env::var("NEKORELAY_MODEL")
            && !model.is_empty()
        {
            self.default_model = model;
        }

        if let Ok(port_str) =
            std::env::var("NEKORELAY_GATEWAY_PORT").or_else(|_| std::env::var("PORT"))
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.gateway.port = port;
        }

        if let Ok(host) =
            std::env::var("NEKORELAY_GATEWAY_HOST").or_else(|_| std::env::var("HOST"))
            && !host.is_empty()
        {
            self.gateway.host = host;
        }

        if let Ok(key) = std::env::var("NEKORELAY_VISION_API_KEY")
            && !key.is_empty()
        {
            self.vision.api_key = Some(key);
        }

        if let Ok(key) = std::env::var("NEKORELAY_SEARCH_API_KEY")
            && !key.is_empty()
        {
            self.search.api_key = Some(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_env::{ENV_LOCK, EnvVarGuard};
    use super::*;

    #[test]
    fn env_overrides_replace_file_values() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _key = EnvVarGuard::set("NEKORELAY_API_KEY", "sk-env");
        let _model = EnvVarGuard::set("NEKORELAY_MODEL", "deepseek-reasoner");
        let _port = EnvVarGuard::set("NEKORELAY_GATEWAY_PORT", "9100");
        let _host = EnvVarGuard::set("NEKORELAY_GATEWAY_HOST", "0.0.0.0");
        let _vision = EnvVarGuard::set("NEKORELAY_VISION_API_KEY", "vk");
        let _search = EnvVarGuard::set("NEKORELAY_SEARCH_API_KEY", "bk");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.default_model, "deepseek-reasoner");
        assert_eq!(config.gateway.port, 9100);
        assert_eq!(config.gateway.host, "0.0.0.0");
        assert_eq!(config.vision.api_key.as_deref(), Some("vk"));
        assert_eq!(config.search.api_key.as_deref(), Some("bk"));
    }

    #[test]
    fn invalid_port_is_ignored() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _port = EnvVarGuard::set("NEKORELAY_GATEWAY_PORT", "not-a-port");
        let _fallback = EnvVarGuard::unset("PORT");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.gateway.port, 8888);
    }

    #[test]
    fn empty_values_do_not_override() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _key = EnvVarGuard::set("NEKORELAY_API_KEY", "");
        let _model = EnvVarGuard::unset("NEKORELAY_MODEL");

        let mut config = Config {
            api_key: Some("sk-file".into()),
            ..Config::default()
        };
        config.apply_env_overrides();

        assert_eq!(config.api_key.as_deref(), Some("sk-file"));
        assert_eq!(config.default_model, "deepseek-chat");
    }
}
